//! Error types for the sector-globe crate.

use std::fmt;

/// Result type for dataset loading.
pub type Result<T> = std::result::Result<T, DatasetError>;

/// Errors that make a dataset unusable.
///
/// These are configuration errors: they are raised once at load time and the
/// per-frame code assumes a dataset that passed validation.
#[derive(Debug)]
pub enum DatasetError {
    /// The dataset does not contain exactly five sectors.
    SectorCount {
        /// Number of sectors found.
        actual: usize,
    },
    /// A sector is missing a required field.
    MissingField {
        /// Index of the offending sector.
        sector: usize,
        /// The missing field.
        field: &'static str,
    },
    /// Two sectors share the same key.
    DuplicateKey {
        /// The repeated key.
        key: String,
    },
    /// A sector color could not be parsed.
    InvalidColor {
        /// Index of the offending sector.
        sector: usize,
        /// The unparsed color text.
        value: String,
    },
    /// The dataset file could not be read.
    Io {
        /// Path that failed to load.
        path: String,
        /// The error message.
        message: String,
    },
    /// The dataset file is not valid JSON for the expected shape.
    Parse {
        /// The error message.
        message: String,
    },
}

impl fmt::Display for DatasetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetError::SectorCount { actual } => {
                write!(f, "expected exactly 5 sectors, found {actual}")
            }
            DatasetError::MissingField { sector, field } => {
                write!(f, "sector {sector} is missing its {field}")
            }
            DatasetError::DuplicateKey { key } => {
                write!(f, "sector key '{key}' is used more than once")
            }
            DatasetError::InvalidColor { sector, value } => {
                write!(f, "sector {sector} has an invalid color '{value}'")
            }
            DatasetError::Io { path, message } => {
                write!(f, "failed to read dataset {path}: {message}")
            }
            DatasetError::Parse { message } => {
                write!(f, "failed to parse dataset: {message}")
            }
        }
    }
}

impl std::error::Error for DatasetError {}

impl From<serde_json::Error> for DatasetError {
    fn from(e: serde_json::Error) -> Self {
        DatasetError::Parse {
            message: e.to_string(),
        }
    }
}
