//! Error type shared by every module of the crate

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Malformed sense key: '{0}'")]
    MalformedSenseKey(String),

    #[error("Invalid vector dimension: expected {expected}, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },

    #[error("Sense store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("Corrupt vector blob: {bytes} bytes is not a whole number of f32 values")]
    CorruptVector { bytes: usize },

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unsupported file format: .{0}")]
    UnsupportedFormat(String),

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Malformed SPARQL result: {0}")]
    Sparql(String),

    #[error("Option index {index} out of range ({len} options)")]
    OptionOutOfRange { index: usize, len: usize },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(feature = "python")]
impl From<Error> for pyo3::PyErr {
    fn from(e: Error) -> Self {
        pyo3::exceptions::PyRuntimeError::new_err(e.to_string())
    }
}
