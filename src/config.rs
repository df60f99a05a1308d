//! Shared configuration for training and serving.
//!
//! The k-mer size lives here and nowhere else: the training driver fits the
//! vectorizer with it and the prediction service refuses to start when the
//! loaded vectorizer was fitted with a different value.

use crate::classifier::ClassificationError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// K-mer window length used by both the training and the serving path.
pub const KMER_SIZE: usize = 6;

/// Seed for balancing, shuffling, splitting and the solver's coordinate order.
pub const RANDOM_STATE: u64 = 42;

/// File name of the persisted classifier.
pub const MODEL_FILE: &str = "dna_model.json";

/// File name of the persisted vectorizer.
pub const VECTORIZER_FILE: &str = "vectorizer.json";

/// Dataset looked up when neither `--dataset` nor `DNA_DATASET` is given.
pub const DEFAULT_DATASET: &str = "Coding_NonCoding_DNA_Sequences.csv";

/// Parameters of one training run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub dataset_path: PathBuf,
    pub artifact_dir: PathBuf,
    pub k: usize,
    /// Fraction of rows held out for evaluation.
    pub test_size: f64,
    pub seed: u64,
    /// Inverse regularisation strength of the linear SVM.
    pub c: f64,
    pub tol: f64,
    pub max_iter: usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig {
            dataset_path: PathBuf::from(DEFAULT_DATASET),
            artifact_dir: PathBuf::from("."),
            k: KMER_SIZE,
            test_size: 0.2,
            seed: RANDOM_STATE,
            c: 1.0,
            tol: 1e-4,
            max_iter: 20_000,
        }
    }
}

impl TrainConfig {
    /// Rejects run-level settings before any data is read.
    ///
    /// Solver hyperparameters are checked again by the classifier itself.
    pub fn validate(&self) -> Result<(), ClassificationError> {
        if self.k == 0 {
            return Err(ClassificationError::InvalidParameter {
                name: "k",
                value: 0.0,
                reason: "must be at least 1",
            });
        }
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(ClassificationError::InvalidParameter {
                name: "test_size",
                value: self.test_size,
                reason: "must lie strictly between 0 and 1",
            });
        }
        Ok(())
    }
}

/// Paths of the two artifacts inside `dir`.
pub fn artifact_paths(dir: &Path) -> (PathBuf, PathBuf) {
    (dir.join(MODEL_FILE), dir.join(VECTORIZER_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_uses_shared_kmer_size() {
        let config = TrainConfig::default();
        assert_eq!(config.k, KMER_SIZE);
        assert_eq!(config.seed, RANDOM_STATE);
        assert_eq!(config.max_iter, 20_000);
    }

    #[test]
    fn test_validate_test_size_bounds() {
        assert!(TrainConfig::default().validate().is_ok());
        for test_size in [0.0, 1.0, -0.1, 1.5, f64::NAN] {
            let config = TrainConfig {
                test_size,
                ..TrainConfig::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ClassificationError::InvalidParameter {
                    name: "test_size",
                    ..
                })
            ));
        }
    }

    #[test]
    fn test_validate_rejects_zero_k() {
        let config = TrainConfig {
            k: 0,
            ..TrainConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_artifact_paths() {
        let (model, vectorizer) = artifact_paths(Path::new("out"));
        assert_eq!(model, Path::new("out").join("dna_model.json"));
        assert_eq!(vectorizer, Path::new("out").join("vectorizer.json"));
    }
}
