//! Degree of parallelism for batch computations.

use std::num::NonZeroUsize;
use std::thread;

/// How many worker threads a parallel batch may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Jobs {
    /// Use every available execution unit.
    #[default]
    All,
    /// Use exactly this many workers.
    Fixed(NonZeroUsize),
}

impl Jobs {
    /// A single worker.
    pub const SERIAL: Jobs = Jobs::Fixed(NonZeroUsize::MIN);

    /// Map a joblib-style `n_jobs` value.
    ///
    /// Positive values are used as-is, `0` and `-1` mean all units, and
    /// `-k` for `k > 1` leaves `k - 1` units free (never below one worker).
    pub fn from_n_jobs(n_jobs: i64) -> Self {
        match n_jobs {
            0 | -1 => Jobs::All,
            n if n > 0 => NonZeroUsize::new(n as usize).map_or(Jobs::All, Jobs::Fixed),
            n => {
                let spare = n.unsigned_abs().saturating_sub(1) as usize;
                let threads = available().get().saturating_sub(spare).max(1);
                NonZeroUsize::new(threads).map_or(Jobs::SERIAL, Jobs::Fixed)
            }
        }
    }

    /// Resolve to a concrete worker count.
    pub fn threads(self) -> usize {
        match self {
            Jobs::All => available().get(),
            Jobs::Fixed(n) => n.get(),
        }
    }

    /// Number of workers actually needed for `tasks` independent tasks.
    pub fn threads_for(self, tasks: usize) -> usize {
        self.threads().min(tasks).max(1)
    }
}

fn available() -> NonZeroUsize {
    thread::available_parallelism().unwrap_or(NonZeroUsize::MIN)
}
