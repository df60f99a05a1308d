//! Training driver.
//!
//! load -> prepare -> vectorize (fit) -> stratified split -> train ->
//! evaluate -> persist both artifacts -> sanity predictions.
//! Every failure aborts the run; there is nothing to retry.

use crate::bio::{normalize_sequence, KmerTokenizer};
use crate::classifier::{Label, LinearSvc, LinearSvcParams};
use crate::config::{artifact_paths, TrainConfig};
use crate::io::{load_dataset, save_json};
use crate::pipeline::dataset::{prepare, ClassCounts};
use crate::pipeline::split::stratified_split;
use crate::stats::ClassificationReport;
use crate::vectorizer::KmerVectorizer;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::path::PathBuf;
use std::time::Instant;

/// Reference sequences scored after every training run.
pub const SANITY_SEQUENCES: [(&str, &str); 2] = [
    (
        "coding-like",
        "GGCTACGACGTGACCGCGGGGCAGGTGCTCGTGACCAACGGCGGCAAGCAGGCGGTGGAGGAGACCTGCGCGACCATCCTCGATCCCGGCGACGAGGTGCTGCTGCCGGCCCC",
    ),
    (
        "non-coding-like",
        "TTGTACTTTTATGATAATTTGGTATATGCGTATACATTATTTGTGACATACATTTGTGAATAATGATATTAG",
    ),
];

/// Prediction for one sanity sequence; `None` when it is too short to tokenize.
#[derive(Debug, Clone)]
pub struct SanityPrediction {
    pub name: &'static str,
    pub sequence: &'static str,
    pub label: Option<Label>,
}

/// Everything a training run produced besides the artifacts themselves.
#[derive(Debug, Clone)]
pub struct TrainingSummary {
    pub counts_before_balance: ClassCounts,
    pub counts_after_balance: ClassCounts,
    /// (rows, features) of the full feature matrix.
    pub matrix_shape: (usize, usize),
    pub train_rows: usize,
    pub test_rows: usize,
    pub iterations: usize,
    pub converged: bool,
    pub report: ClassificationReport,
    pub model_path: PathBuf,
    pub vectorizer_path: PathBuf,
    pub sanity: Vec<SanityPrediction>,
    pub elapsed_seconds: f64,
}

/// Scores one raw sequence the same way the prediction service does.
pub fn predict_sequence(
    model: &LinearSvc,
    vectorizer: &KmerVectorizer,
    raw: &str,
) -> Result<Option<Label>> {
    let sequence = normalize_sequence(raw);
    if vectorizer.tokenizer().kmers(&sequence).is_empty() {
        return Ok(None);
    }
    let features = vectorizer.transform_sequence(&sequence);
    let labels = model.predict(&features)?;
    Ok(labels.first().copied())
}

/// Runs a full training job as described by `config`.
pub fn run_training(config: &TrainConfig) -> Result<TrainingSummary> {
    let start = Instant::now();
    config.validate()?;
    info!("Loading dataset from '{}'", config.dataset_path.display());
    let records = load_dataset(&config.dataset_path)?;

    let prepared = prepare(records, KmerTokenizer::new(config.k), config.seed)?;

    let mut vectorizer = KmerVectorizer::new(config.k);
    let features = vectorizer.fit_transform(&prepared.sentences);
    let matrix_shape = features.dimensions();
    info!(
        "Feature matrix shape: ({}, {}), {} non-zero entries",
        matrix_shape.0,
        matrix_shape.1,
        features.nnz()
    );

    let split = stratified_split(&prepared.labels, config.test_size, config.seed);
    let x_train = features.select_rows(&split.train);
    let x_test = features.select_rows(&split.test);
    let y_train: Vec<Label> = split.train.iter().map(|&i| prepared.labels[i]).collect();
    let y_test: Vec<Label> = split.test.iter().map(|&i| prepared.labels[i]).collect();
    info!(
        "Split: {} train, {} test rows",
        y_train.len(),
        y_test.len()
    );

    info!("Training linear SVM (C={}, max_iter={})", config.c, config.max_iter);
    let fitted = LinearSvcParams::new()
        .c(config.c)
        .tol(config.tol)
        .max_iter(config.max_iter)
        .seed(config.seed)
        .fit(&x_train, &y_train)
        .context("Classifier training failed")?;
    if !fitted.converged {
        warn!("Persisting a model that stopped at the iteration cap");
    }
    debug!(
        "Model has {} non-zero weights, bias {:.4}",
        fitted.model.weights().iter().filter(|w| **w != 0.0).count(),
        fitted.model.bias()
    );

    let y_pred = fitted.model.predict(&x_test)?;
    let report = ClassificationReport::from_predictions(&y_test, &y_pred)?;
    info!("Held-out accuracy: {:.4}", report.accuracy);

    let (model_path, vectorizer_path) = artifact_paths(&config.artifact_dir);
    save_json(&fitted.model, &model_path)?;
    save_json(&vectorizer, &vectorizer_path)?;
    info!(
        "Saved {} and {}",
        model_path.display(),
        vectorizer_path.display()
    );

    let sanity = SANITY_SEQUENCES
        .iter()
        .map(|&(name, sequence)| {
            Ok(SanityPrediction {
                name,
                sequence,
                label: predict_sequence(&fitted.model, &vectorizer, sequence)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(TrainingSummary {
        counts_before_balance: prepared.counts_before_balance,
        counts_after_balance: prepared.counts_after_balance,
        matrix_shape,
        train_rows: y_train.len(),
        test_rows: y_test.len(),
        iterations: fitted.iterations,
        converged: fitted.converged,
        report,
        model_path,
        vectorizer_path,
        sanity,
        elapsed_seconds: start.elapsed().as_secs_f64(),
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::classifier::ClassificationError;
    use crate::io::{load_json, DatasetError};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::fmt::Write as _;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn random_sequence(rng: &mut StdRng, alphabet: [char; 2], len: usize) -> String {
        (0..len)
            .map(|_| alphabet[usize::from(rng.random_bool(0.5))])
            .collect()
    }

    /// Writes a CSV where coding rows are GC-only and non-coding rows AT-only,
    /// with more coding than non-coding rows.
    pub(crate) fn write_synthetic_dataset(path: &Path) {
        let mut rng = StdRng::seed_from_u64(11);
        let mut csv = String::from("DNA_sequence,Target\n");
        for _ in 0..40 {
            let seq = random_sequence(&mut rng, ['G', 'C'], 60);
            writeln!(csv, "{},1", seq.to_lowercase()).unwrap();
        }
        for _ in 0..25 {
            let seq = random_sequence(&mut rng, ['A', 'T'], 60);
            writeln!(csv, "{},0", seq).unwrap();
        }
        csv.push_str("ACG,0\n,1\n");
        fs::write(path, csv).unwrap();
    }

    pub(crate) fn test_config(dir: &Path) -> TrainConfig {
        let dataset_path = dir.join("dataset.csv");
        write_synthetic_dataset(&dataset_path);
        TrainConfig {
            dataset_path,
            artifact_dir: dir.join("artifacts"),
            ..TrainConfig::default()
        }
    }

    #[test]
    fn test_run_training_end_to_end() {
        let dir = tempdir().unwrap();
        let config = test_config(dir.path());
        let summary = run_training(&config).unwrap();

        assert_eq!(
            summary.counts_before_balance,
            ClassCounts { non_coding: 26, coding: 40 }
        );
        assert_eq!(summary.counts_after_balance.coding, 26);
        assert_eq!(summary.counts_after_balance.non_coding, 26);
        // The 3-base row cannot yield a 6-mer.
        assert_eq!(summary.train_rows + summary.test_rows, summary.matrix_shape.0);
        assert!(summary.matrix_shape.0 <= 52);
        assert!(summary.report.accuracy > 0.9);
        assert_eq!(summary.sanity.len(), 2);

        let model: LinearSvc = load_json(&summary.model_path).unwrap();
        let vectorizer: KmerVectorizer = load_json(&summary.vectorizer_path).unwrap();
        assert_eq!(vectorizer.k(), config.k);
        assert_eq!(model.n_features(), vectorizer.n_features());

        let coding = predict_sequence(&model, &vectorizer, "GCGGCCGCGCGGGCCCGCGGCGCCGCGG").unwrap();
        assert_eq!(coding, Some(Label::Coding));
        let non_coding = predict_sequence(&model, &vectorizer, "ATTATAATTTATATAAATTATTAT").unwrap();
        assert_eq!(non_coding, Some(Label::NonCoding));
    }

    #[test]
    fn test_predict_sequence_too_short() {
        let dir = tempdir().unwrap();
        let summary = run_training(&test_config(dir.path())).unwrap();
        let model: LinearSvc = load_json(&summary.model_path).unwrap();
        let vectorizer: KmerVectorizer = load_json(&summary.vectorizer_path).unwrap();
        assert_eq!(predict_sequence(&model, &vectorizer, "ACGT").unwrap(), None);
    }

    #[test]
    fn test_missing_dataset_is_fatal() {
        let dir = tempdir().unwrap();
        let config = TrainConfig {
            dataset_path: dir.path().join("missing.csv"),
            artifact_dir: dir.path().to_path_buf(),
            ..TrainConfig::default()
        };
        let err = run_training(&config).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DatasetError>(),
            Some(DatasetError::NotFound(_))
        ));
        assert!(!dir.path().join("dna_model.json").exists());
    }

    #[test]
    fn test_out_of_range_test_size_is_rejected_before_loading() {
        let dir = tempdir().unwrap();
        for test_size in [0.0, 1.0] {
            let config = TrainConfig {
                dataset_path: dir.path().join("missing.csv"),
                artifact_dir: dir.path().to_path_buf(),
                test_size,
                ..TrainConfig::default()
            };
            let err = run_training(&config).unwrap_err();
            assert!(matches!(
                err.downcast_ref::<ClassificationError>(),
                Some(ClassificationError::InvalidParameter {
                    name: "test_size",
                    ..
                })
            ));
        }
    }

    #[test]
    fn test_non_positive_c_is_fatal() {
        let dir = tempdir().unwrap();
        let config = TrainConfig {
            c: 0.0,
            ..test_config(dir.path())
        };
        let err = run_training(&config).unwrap_err();
        assert!(err
            .chain()
            .any(|cause| matches!(
                cause.downcast_ref::<ClassificationError>(),
                Some(ClassificationError::InvalidParameter { name: "c", .. })
            )));
        assert!(!config.artifact_dir.join("dna_model.json").exists());
    }

    #[test]
    fn test_missing_columns_is_fatal() {
        let dir = tempdir().unwrap();
        let dataset_path = dir.path().join("bad.csv");
        fs::write(&dataset_path, "seq,label\nACGTACGT,1\n").unwrap();
        let config = TrainConfig {
            dataset_path,
            artifact_dir: dir.path().to_path_buf(),
            ..TrainConfig::default()
        };
        let err = run_training(&config).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DatasetError>(),
            Some(DatasetError::MissingColumns { .. })
        ));
    }
}
