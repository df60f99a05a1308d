//! K-mer tokenization.
//!
//! A sequence is turned into every overlapping window of length k, in order,
//! and the windows are joined with single spaces into a "sentence" that the
//! vectorizer splits back into words. The training driver and the prediction
//! service both go through [`KmerTokenizer`], so the two paths cannot drift.

use itertools::Itertools;
use std::iter;

/// Represents a k-mer borrowed from its source sequence.
pub type Kmer<'a> = &'a str;

/// Sliding-window k-mer tokenizer with a fixed window length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KmerTokenizer {
    k: usize,
}

impl KmerTokenizer {
    pub fn new(k: usize) -> Self {
        KmerTokenizer { k }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// All windows of length k starting at offsets `0..=len - k`.
    ///
    /// Returns an empty vector when the sequence is shorter than k or k is 0.
    pub fn kmers<'a>(&self, sequence: &'a str) -> Vec<Kmer<'a>> {
        if self.k == 0 {
            return Vec::new();
        }

        // Character boundaries keep slicing valid for any UTF-8 input.
        let bounds: Vec<usize> = sequence
            .char_indices()
            .map(|(offset, _)| offset)
            .chain(iter::once(sequence.len()))
            .collect();

        bounds
            .windows(self.k + 1)
            .map(|w| &sequence[w[0]..w[self.k]])
            .collect()
    }

    /// The k-mers of `sequence` joined by single spaces.
    pub fn sentence(&self, sequence: &str) -> String {
        self.kmers(sequence).into_iter().join(" ")
    }
}
