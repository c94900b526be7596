//! CLI command implementations.

pub mod cfc;
pub mod decode;
pub mod generate;
pub mod models;
pub mod plot;
