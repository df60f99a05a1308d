//! Dataset preparation for training.
//!
//! Raw CSV rows go through, in order:
//! 1. dropping rows with a null sequence or label,
//! 2. parsing the label (rows whose label is not 0/1 are dropped),
//! 3. normalizing the sequence to uppercase ACGT,
//! 4. downsampling the majority class to the minority count,
//! 5. k-mer tokenization, dropping rows too short to yield a k-mer.

use crate::bio::{normalize_sequence, KmerTokenizer};
use crate::classifier::Label;
use crate::io::{DatasetError, RawRecord};
use log::{info, warn};
use rand::rngs::StdRng;
use rand::seq::{index, SliceRandom};
use rand::SeedableRng;
use rayon::prelude::*;
use std::fmt;

/// A normalized sequence with its label.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledSequence {
    pub sequence: String,
    pub label: Label,
}

/// Number of rows per class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassCounts {
    pub non_coding: usize,
    pub coding: usize,
}

impl ClassCounts {
    pub fn from_labels<'a>(labels: impl IntoIterator<Item = &'a Label>) -> Self {
        let mut counts = ClassCounts::default();
        for label in labels {
            match label {
                Label::NonCoding => counts.non_coding += 1,
                Label::Coding => counts.coding += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.non_coding + self.coding
    }
}

impl fmt::Display for ClassCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0: {}, 1: {}", self.non_coding, self.coding)
    }
}

/// Balanced, tokenized training corpus.
#[derive(Debug, Clone)]
pub struct PreparedDataset {
    /// Space-joined k-mer sentence per row.
    pub sentences: Vec<String>,
    pub labels: Vec<Label>,
    pub counts_before_balance: ClassCounts,
    pub counts_after_balance: ClassCounts,
}

/// Drops null and unlabelled rows and normalizes the remaining sequences.
pub fn clean_records(records: Vec<RawRecord>) -> Vec<LabeledSequence> {
    let total = records.len();
    let mut null_rows = 0;
    let mut bad_labels = 0;
    let mut cleaned = Vec::with_capacity(total);

    for record in records {
        let (Some(sequence), Some(target)) = (record.sequence, record.target) else {
            null_rows += 1;
            continue;
        };
        let Some(label) = Label::parse(&target) else {
            bad_labels += 1;
            continue;
        };
        cleaned.push(LabeledSequence {
            sequence: normalize_sequence(&sequence),
            label,
        });
    }

    if null_rows > 0 {
        info!("Dropped {} of {} rows with a missing field", null_rows, total);
    }
    if bad_labels > 0 {
        warn!(
            "Dropped {} rows whose Target is neither 0 nor 1",
            bad_labels
        );
    }
    cleaned
}

/// Downsamples the majority class to the size of the minority class.
///
/// Rows of the majority class are sampled without replacement, concatenated
/// with the minority class and shuffled. Equal class counts return `rows`
/// untouched.
pub fn balance(rows: Vec<LabeledSequence>, rng: &mut StdRng) -> Vec<LabeledSequence> {
    let coding_count = rows.iter().filter(|row| row.label == Label::Coding).count();
    if coding_count * 2 == rows.len() {
        return rows;
    }

    let (coding, non_coding): (Vec<_>, Vec<_>) =
        rows.into_iter().partition(|row| row.label == Label::Coding);
    let (major, minor) = if coding.len() > non_coding.len() {
        (coding, non_coding)
    } else {
        (non_coding, coding)
    };

    let sampled = index::sample(rng, major.len(), minor.len()).into_vec();
    let mut balanced: Vec<LabeledSequence> = sampled.into_iter().map(|i| major[i].clone()).collect();
    balanced.extend(minor);
    balanced.shuffle(rng);
    balanced
}

/// Runs the full preparation chain over raw dataset rows.
pub fn prepare(
    records: Vec<RawRecord>,
    tokenizer: KmerTokenizer,
    seed: u64,
) -> Result<PreparedDataset, DatasetError> {
    let cleaned = clean_records(records);
    let counts_before_balance = ClassCounts::from_labels(cleaned.iter().map(|r| &r.label));
    info!("Counts before balancing -> {}", counts_before_balance);

    let mut rng = StdRng::seed_from_u64(seed);
    let balanced = balance(cleaned, &mut rng);
    let counts_after_balance = ClassCounts::from_labels(balanced.iter().map(|r| &r.label));
    info!("Label counts after balancing -> {}", counts_after_balance);

    let tokenized: Vec<(String, Label)> = balanced
        .par_iter()
        .map(|row| (tokenizer.sentence(&row.sequence), row.label))
        .filter(|(sentence, _)| !sentence.is_empty())
        .collect();
    let (sentences, labels): (Vec<String>, Vec<Label>) = tokenized.into_iter().unzip();
    info!(
        "After {}-mer creation, sample count: {}",
        tokenizer.k(),
        labels.len()
    );

    if labels.is_empty() {
        return Err(DatasetError::Empty);
    }

    Ok(PreparedDataset {
        sentences,
        labels,
        counts_before_balance,
        counts_after_balance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(sequence: Option<&str>, target: Option<&str>) -> RawRecord {
        RawRecord {
            sequence: sequence.map(str::to_string),
            target: target.map(str::to_string),
        }
    }

    fn labeled(sequence: &str, label: Label) -> LabeledSequence {
        LabeledSequence {
            sequence: sequence.to_string(),
            label,
        }
    }

    #[test]
    fn test_clean_records_drops_nulls_and_bad_labels() {
        let cleaned = clean_records(vec![
            raw(Some("acgt nn"), Some("1")),
            raw(None, Some("0")),
            raw(Some("ACGT"), None),
            raw(Some("GGGG"), Some("7")),
            raw(Some("TTTT"), Some("0.0")),
        ]);
        assert_eq!(
            cleaned,
            vec![labeled("ACGT", Label::Coding), labeled("TTTT", Label::NonCoding)]
        );
    }

    #[test]
    fn test_balance_downsamples_majority() {
        let mut rows: Vec<LabeledSequence> = (0..10)
            .map(|i| labeled(&format!("C{}", i), Label::Coding))
            .collect();
        rows.extend((0..3).map(|i| labeled(&format!("N{}", i), Label::NonCoding)));

        let mut rng = StdRng::seed_from_u64(42);
        let balanced = balance(rows, &mut rng);
        let counts = ClassCounts::from_labels(balanced.iter().map(|r| &r.label));
        assert_eq!(counts, ClassCounts { non_coding: 3, coding: 3 });

        // Sampling is without replacement.
        let mut sequences: Vec<&str> = balanced.iter().map(|r| r.sequence.as_str()).collect();
        sequences.sort_unstable();
        sequences.dedup();
        assert_eq!(sequences.len(), 6);
    }

    #[test]
    fn test_balance_is_reproducible() {
        let rows: Vec<LabeledSequence> = (0..20)
            .map(|i| {
                let label = if i % 4 == 0 { Label::NonCoding } else { Label::Coding };
                labeled(&format!("S{}", i), label)
            })
            .collect();
        let first = balance(rows.clone(), &mut StdRng::seed_from_u64(42));
        let second = balance(rows, &mut StdRng::seed_from_u64(42));
        assert_eq!(first, second);
    }

    #[test]
    fn test_balance_equal_counts_returns_rows_untouched() {
        let rows = vec![
            labeled("A", Label::NonCoding),
            labeled("C", Label::Coding),
            labeled("G", Label::Coding),
            labeled("T", Label::NonCoding),
        ];
        let balanced = balance(rows.clone(), &mut StdRng::seed_from_u64(1));
        assert_eq!(balanced, rows);
    }

    #[test]
    fn test_prepare_tokenizes_and_drops_short_rows() {
        let records = vec![
            raw(Some("ATGCGTACGTTAGC"), Some("1")),
            raw(Some("ACG"), Some("1")),
            raw(Some("TTGTACTTTTATGA"), Some("0")),
            raw(Some("GATTACAGATTACA"), Some("0")),
        ];
        let prepared = prepare(records, KmerTokenizer::new(6), 42).unwrap();

        assert_eq!(
            prepared.counts_before_balance,
            ClassCounts { non_coding: 2, coding: 2 }
        );
        assert_eq!(prepared.labels.len(), 3);
        assert_eq!(prepared.sentences.len(), prepared.labels.len());
        for sentence in &prepared.sentences {
            assert!(sentence.split(' ').all(|kmer| kmer.len() == 6));
        }
    }

    #[test]
    fn test_prepare_single_class_leaves_nothing() {
        let records = vec![
            raw(Some("ATGCGTACGTTAGC"), Some("1")),
            raw(Some("GGCTACGACGTGAC"), Some("1")),
        ];
        let result = prepare(records, KmerTokenizer::new(6), 42);
        assert!(matches!(result, Err(DatasetError::Empty)));
    }
}
