//! Persistence of fitted artifacts.
//!
//! Artifacts are plain JSON documents. Writes go to a temporary file in the
//! destination directory which is then renamed over the target, so a reader
//! never sees a half-written artifact.

use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("IO error on artifact {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed artifact {}: {source}", .path.display())]
    Serde {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to move artifact into place: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("Vectorizer was fitted with k={artifact} but this build uses k={configured}")]
    KmerMismatch { artifact: usize, configured: usize },

    #[error("Model expects {model} features but the vectorizer produces {vectorizer}")]
    FeatureMismatch { model: usize, vectorizer: usize },
}

/// Serializes `value` as JSON to `path`, replacing any existing file atomically.
pub fn save_json<T: Serialize>(value: &T, path: &Path) -> Result<(), ArtifactError> {
    let io_err = |source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(io_err)?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        serde_json::to_writer(&mut writer, value).map_err(|source| ArtifactError::Serde {
            path: path.to_path_buf(),
            source,
        })?;
        writer.flush().map_err(io_err)?;
    }
    tmp.persist(path)?;

    debug!("Wrote artifact {}", path.display());
    Ok(())
}

/// Reads a JSON artifact written by [`save_json`].
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let file = File::open(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| ArtifactError::Serde {
        path: path.to_path_buf(),
        source,
    })
}
