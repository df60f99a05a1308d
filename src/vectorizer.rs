//! Bag-of-k-mers vectorizer.
//!
//! Fitting collects every distinct whitespace-separated word of the corpus
//! into a vocabulary sorted in byte order; a word's position in that
//! vocabulary is its column. Transforming counts word occurrences per
//! document against the fitted vocabulary and ignores words it has never
//! seen.

use crate::bio::KmerTokenizer;
use crate::count_table::CountTable;
use indexmap::IndexSet;
use itertools::Itertools;
use log::info;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maps k-mer sentences to sparse count vectors over a fitted vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KmerVectorizer {
    /// Window length of the k-mers the vocabulary was built from.
    k: usize,
    vocabulary: IndexSet<String>,
}

impl KmerVectorizer {
    /// Creates an unfitted vectorizer for k-mers of length `k`.
    pub fn new(k: usize) -> Self {
        KmerVectorizer {
            k,
            vocabulary: IndexSet::new(),
        }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// Tokenizer matching the k this vectorizer was built for.
    pub fn tokenizer(&self) -> KmerTokenizer {
        KmerTokenizer::new(self.k)
    }

    pub fn n_features(&self) -> usize {
        self.vocabulary.len()
    }

    /// Column of `token`, if it is part of the vocabulary.
    pub fn column_of(&self, token: &str) -> Option<usize> {
        self.vocabulary.get_index_of(token)
    }

    /// Builds the vocabulary from `corpus`, replacing any previous one.
    pub fn fit(&mut self, corpus: &[String]) -> &mut Self {
        self.vocabulary = corpus
            .iter()
            .flat_map(|doc| doc.split_whitespace())
            .unique()
            .sorted()
            .map(str::to_string)
            .collect();
        info!(
            "Fitted vocabulary of {} distinct {}-mers over {} documents",
            self.vocabulary.len(),
            self.k,
            corpus.len()
        );
        self
    }

    /// Fits the vocabulary on `corpus` and returns its count matrix.
    pub fn fit_transform(&mut self, corpus: &[String]) -> CountTable {
        self.fit(corpus);
        self.transform(corpus)
    }

    /// Count matrix of `corpus` against the fitted vocabulary.
    pub fn transform(&self, corpus: &[String]) -> CountTable {
        let rows: Vec<Vec<(usize, f64)>> = corpus
            .par_iter()
            .map(|doc| self.count_document(doc))
            .collect();
        CountTable::from_rows(rows, self.n_features())
    }

    /// Tokenizes one normalized sequence and vectorizes it as a single row.
    pub fn transform_sequence(&self, sequence: &str) -> CountTable {
        let sentence = self.tokenizer().sentence(sequence);
        self.transform(&[sentence])
    }

    fn count_document(&self, doc: &str) -> Vec<(usize, f64)> {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for column in doc.split_whitespace().filter_map(|w| self.column_of(w)) {
            *counts.entry(column).or_insert(0.0) += 1.0;
        }
        counts.into_iter().collect()
    }
}
