//! Stratified train/test split.
//!
//! Each class is shuffled and split separately so both halves keep the
//! class proportions of the full dataset; the resulting index lists are then
//! shuffled so classes are interleaved.

use crate::classifier::Label;
use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Row indices of the two halves of a split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Splits row indices of `labels` into train and test sets.
///
/// `test_size` is the fraction of every class held out, rounded to the
/// nearest row and clamped to `[0, 1]`.
pub fn stratified_split(labels: &[Label], test_size: f64, seed: u64) -> SplitIndices {
    let test_size = test_size.clamp(0.0, 1.0);
    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::new();
    let mut test = Vec::new();

    for class in Label::ALL {
        let mut members: Vec<usize> = labels
            .iter()
            .enumerate()
            .filter(|&(_, &label)| label == class)
            .map(|(i, _)| i)
            .collect();
        members.shuffle(&mut rng);

        let n_test = ((members.len() as f64) * test_size).round() as usize;
        let n_test = n_test.min(members.len());
        let held_out = members.split_off(members.len() - n_test);
        train.extend(members);
        test.extend(held_out);
    }

    train.shuffle(&mut rng);
    test.shuffle(&mut rng);

    debug!(
        "Stratified split: {} train, {} test rows",
        train.len(),
        test.len()
    );
    SplitIndices { train, test }
}
