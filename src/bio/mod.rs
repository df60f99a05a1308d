//! Nucleotide sequence utilities.
//!
//! Normalization and k-mer tokenization shared by the training driver and
//! the prediction service.

pub mod kmers;

pub use kmers::KmerTokenizer;

/// The only characters a normalized sequence may contain.
pub const CANONICAL_BASES: &[u8] = b"ACGT";

/// Checks if a byte represents a valid DNA base (A, C, G, T).
/// Case-insensitive.
pub fn is_valid_base(base: u8) -> bool {
    CANONICAL_BASES.contains(&base.to_ascii_uppercase())
}

/// Uppercases `raw` and strips every character outside {A, C, G, T}.
///
/// Whitespace, line breaks, `N` and IUPAC ambiguity codes are all removed, so
/// `"acg tn\nA"` becomes `"ACGTA"`.
pub fn normalize_sequence(raw: &str) -> String {
    raw.bytes()
        .filter(|&b| is_valid_base(b))
        .map(|b| b.to_ascii_uppercase() as char)
        .collect()
}
