//! Binary coding / non-coding classification.

pub mod linear_svc;

pub use linear_svc::{LinearSvc, LinearSvcParams};

use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClassificationError {
    #[error("Cannot train on an empty feature matrix")]
    EmptyTrainingSet,

    #[error("Training labels contain a single class; both coding and non-coding rows are required")]
    SingleClass,

    #[error("Feature matrix has {rows} rows but {labels} labels were given")]
    LabelCountMismatch { rows: usize, labels: usize },

    #[error("Model expects {expected} features, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Invalid {name} = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
}

/// Class of a sequence: 1 means coding, 0 means non-coding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Label {
    NonCoding = 0,
    Coding = 1,
}

impl Label {
    /// Both labels in ascending numeric order.
    pub const ALL: [Label; 2] = [Label::NonCoding, Label::Coding];

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Human-readable name returned by the prediction service.
    pub fn meaning(self) -> &'static str {
        match self {
            Label::Coding => "Coding",
            Label::NonCoding => "Non-Coding",
        }
    }

    /// Parses a dataset cell such as `"1"`, `"0"` or `"1.0"`.
    pub fn parse(field: &str) -> Option<Label> {
        let value: f64 = field.trim().parse().ok()?;
        if value == 0.0 {
            Some(Label::NonCoding)
        } else if value == 1.0 {
            Some(Label::Coding)
        } else {
            None
        }
    }

    /// Margin sign used by the linear model (+1 coding, -1 non-coding).
    pub(crate) fn sign(self) -> f64 {
        match self {
            Label::Coding => 1.0,
            Label::NonCoding => -1.0,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}
