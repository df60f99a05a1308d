//! Input/Output operations module.
//!
//! Reads the labelled training dataset and persists the fitted artifacts.

pub mod artifacts;

pub use artifacts::{load_json, save_json, ArtifactError};

use log::info;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Column holding the raw nucleotide sequence.
pub const SEQUENCE_COLUMN: &str = "DNA_sequence";

/// Column holding the 0/1 label.
pub const TARGET_COLUMN: &str = "Target";

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Dataset not found at: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Dataset does not contain required columns: 'DNA_sequence' and 'Target' (found: {found:?})")]
    MissingColumns { found: Vec<String> },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No usable rows left after preparation")]
    Empty,
}

/// One dataset row restricted to the two required columns.
///
/// A field that is absent or blank is `None`, mirroring a null cell.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub sequence: Option<String>,
    pub target: Option<String>,
}

fn non_blank(field: Option<&str>) -> Option<String> {
    field
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Loads the `DNA_sequence` and `Target` columns of a CSV file.
///
/// Other columns are ignored. Fails with [`DatasetError::NotFound`] when the
/// file does not exist and [`DatasetError::MissingColumns`] when either
/// required header is absent.
pub fn load_dataset(path: &Path) -> Result<Vec<RawRecord>, DatasetError> {
    if !path.exists() {
        return Err(DatasetError::NotFound(path.to_path_buf()));
    }

    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_path(path)?;

    let headers = rdr.headers()?.clone();
    let sequence_col = headers.iter().position(|h| h.trim() == SEQUENCE_COLUMN);
    let target_col = headers.iter().position(|h| h.trim() == TARGET_COLUMN);

    let (sequence_col, target_col) = match (sequence_col, target_col) {
        (Some(s), Some(t)) => (s, t),
        _ => {
            return Err(DatasetError::MissingColumns {
                found: headers.iter().map(str::to_string).collect(),
            })
        }
    };

    let mut records = Vec::new();
    for result in rdr.records() {
        let record = result?;
        records.push(RawRecord {
            sequence: non_blank(record.get(sequence_col)),
            target: non_blank(record.get(target_col)),
        });
    }

    info!("Read {} rows from '{}'", records.len(), path.display());
    Ok(records)
}
