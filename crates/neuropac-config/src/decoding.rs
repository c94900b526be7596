//! Decoding configuration.

use std::path::Path;

use neuropac_classify::{
    ClassifierKind, CrossValidation, CvKind, DEFAULT_FOLDS, DEFAULT_REPETITIONS, Decoder,
    FeatureMode,
};
use neuropac_core::Jobs;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, read_to_string, write_creating_dirs};
use crate::validation::{Problems, ValidationError, ValidationResult};

/// Settings for a cross-validated decoding run.
///
/// # TOML Format
///
/// ```toml
/// cv = "skfold"
/// n_folds = 10
/// repetitions = 10
/// n_jobs = -1
/// features = "single"
///
/// [classifier]
/// kind = "knn"
/// neighbors = 5
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DecodingConfig {
    /// Splitting scheme: `skfold`, `kfold`, `sss` or `ss`.
    #[serde(default)]
    pub cv: CvKind,

    /// Folds, or random splits for the shuffle schemes.
    #[serde(default = "default_folds")]
    pub n_folds: usize,

    /// Repetitions of the whole cross-validation.
    #[serde(default = "default_repetitions")]
    pub repetitions: usize,

    /// joblib-style worker count.
    #[serde(default = "default_jobs")]
    pub n_jobs: i64,

    /// Decode features one at a time or together.
    #[serde(default)]
    pub features: FeatureMode,

    /// Classifier, tagged by `kind`: `lda`, `svm`, `linearsvm`, `nusvm`, `gnb`,
    /// `knn`, `rf`, `lr` or `qda`.
    #[serde(default)]
    pub classifier: ClassifierKind,
}

fn default_folds() -> usize {
    DEFAULT_FOLDS
}

fn default_repetitions() -> usize {
    DEFAULT_REPETITIONS
}

fn default_jobs() -> i64 {
    -1
}

impl Default for DecodingConfig {
    fn default() -> Self {
        Self {
            cv: CvKind::default(),
            n_folds: DEFAULT_FOLDS,
            repetitions: DEFAULT_REPETITIONS,
            n_jobs: default_jobs(),
            features: FeatureMode::default(),
            classifier: ClassifierKind::default(),
        }
    }
}

impl DecodingConfig {
    /// Load a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml(&read_to_string(path.as_ref())?)
    }

    /// Load a configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the configuration to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        write_creating_dirs(path.as_ref(), &self.to_toml()?)
    }

    /// Convert the configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Worker count.
    pub fn jobs(&self) -> Jobs {
        Jobs::from_n_jobs(self.n_jobs)
    }

    /// Check every field, reporting all problems at once.
    pub fn validate(&self) -> ValidationResult<()> {
        let mut problems = Problems::default();
        problems.check(self.n_folds >= 2, || {
            ValidationError::out_of_range("n_folds", self.n_folds as f64, 2.0, f64::MAX)
        });
        problems.check(self.repetitions > 0, || {
            ValidationError::invalid("repetitions", "must be positive")
        });
        match self.classifier {
            ClassifierKind::Knn { neighbors } => problems.check(neighbors > 0, || {
                ValidationError::invalid("classifier.neighbors", "must be positive")
            }),
            ClassifierKind::RandomForest { trees } => problems.check(trees > 0, || {
                ValidationError::invalid("classifier.trees", "must be positive")
            }),
            _ => {}
        }
        problems.finish()
    }

    /// Validate, then build the decoder.
    pub fn build_decoder(&self) -> Result<Decoder, ConfigError> {
        self.validate()?;
        let cv = CrossValidation::new(self.cv, self.n_folds, self.repetitions)?;
        Ok(Decoder::new(self.classifier, cv))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neuropac_classify::SvmKernel;

    #[test]
    fn test_empty_toml_is_default() {
        let config = DecodingConfig::from_toml("").unwrap();
        assert_eq!(config, DecodingConfig::default());
        assert_eq!(config.classifier, ClassifierKind::Lda);
        assert_eq!(config.cv, CvKind::StratifiedKFold);
        assert_eq!(
            config.build_decoder().unwrap().describe(),
            "10-times, 10 Stratified k-folds with a Linear Discriminant Analysis"
        );
    }

    #[test]
    fn test_knn_table() {
        let toml = "cv = \"sss\"\nn_folds = 4\nfeatures = \"multi\"\n\n[classifier]\nkind = \"knn\"\nneighbors = 3\n";
        let config = DecodingConfig::from_toml(toml).unwrap();
        assert_eq!(config.classifier, ClassifierKind::Knn { neighbors: 3 });
        assert_eq!(config.cv, CvKind::StratifiedShuffleSplit);
        assert_eq!(config.features, FeatureMode::Multi);

        let parsed = DecodingConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_knn_default_neighbors() {
        let config = DecodingConfig::from_toml("[classifier]\nkind = \"knn\"\n").unwrap();
        assert_eq!(config.classifier, ClassifierKind::Knn { neighbors: 10 });
    }

    #[test]
    fn test_classifier_tables() {
        let config = DecodingConfig::from_toml("[classifier]\nkind = \"svm\"\nkernel = \"poly\"\n").unwrap();
        assert_eq!(config.classifier, ClassifierKind::Svm { kernel: SvmKernel::Poly });

        let config = DecodingConfig::from_toml("[classifier]\nkind = \"svm\"\n").unwrap();
        assert_eq!(config.classifier, ClassifierKind::Svm { kernel: SvmKernel::Rbf });

        let config = DecodingConfig::from_toml("[classifier]\nkind = \"rf\"\n").unwrap();
        assert_eq!(config.classifier, ClassifierKind::RandomForest { trees: 100 });
        assert_eq!(
            config.build_decoder().unwrap().describe(),
            "10-times, 10 Stratified k-folds with a Random Forest (tree=100)"
        );

        for (kind, expected) in [
            ("linearsvm", ClassifierKind::LinearSvm),
            ("nusvm", ClassifierKind::NuSvm),
            ("lr", ClassifierKind::LogisticRegression),
            ("qda", ClassifierKind::Qda),
        ] {
            let config = DecodingConfig::from_toml(&format!("[classifier]\nkind = \"{kind}\"\n")).unwrap();
            assert_eq!(config.classifier, expected);
            assert_eq!(DecodingConfig::from_toml(&config.to_toml().unwrap()).unwrap(), config);
        }
    }

    #[test]
    fn test_zero_trees_rejected() {
        let config = DecodingConfig {
            classifier: ClassifierKind::RandomForest { trees: 0 },
            ..DecodingConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err.problems().len(), 1);
    }

    #[test]
    fn test_validate() {
        let config = DecodingConfig {
            n_folds: 1,
            repetitions: 0,
            classifier: ClassifierKind::Knn { neighbors: 0 },
            ..DecodingConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err.problems().len(), 3);
        assert!(matches!(config.build_decoder(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_unknown_cv_rejected() {
        assert!(matches!(
            DecodingConfig::from_toml("cv = \"loo\""),
            Err(ConfigError::TomlParse(_))
        ));
    }
}
