//! Centralized error handling for sifter.
//!
//! Every fallible engine operation returns [`Result<T>`], whose error type
//! [`SifterError`] carries one of a small closed set of kinds. Callers on the
//! outer surface (CLI, `serve` loop) never see raw Rust errors; they see an
//! [`ErrorResponse`] with a stable `kind` tag and a human-readable message.
//!
//! ## Error Kinds
//!
//! ```
//! use sifter::error::SifterError;
//!
//! fn describe(err: &SifterError) -> &'static str {
//!     match err {
//!         SifterError::Parse(_) => "the upload could not be read as CSV",
//!         SifterError::Validation(_) => "the request was malformed",
//!         SifterError::State(_) => "no dataset is loaded yet",
//!         _ => "something else went wrong",
//!     }
//! }
//! ```
//!
//! ## Context Extension Trait
//!
//! [`ResultExt`] adds `.context()` to any `Result` whose error converts into
//! [`SifterError`]. The kind of the original error is preserved, only the
//! message gains a prefix:
//!
//! ```no_run
//! use sifter::error::ResultExt as _;
//!
//! fn load() -> sifter::error::Result<Vec<u8>> {
//!     std::fs::read("data.csv").context("Failed to read upload")
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Main error type for sifter operations.
#[derive(Debug)]
pub enum SifterError {
    /// Malformed upload: bad encoding, ragged rows, missing header.
    Parse(String),

    /// Malformed request: unknown column, bad literal, unknown cleaning option.
    Validation(String),

    /// Operation that needs a dataset was issued before any upload.
    State(String),

    /// An export format failed to serialize.
    Export(String),

    /// I/O errors (reading uploads, writing exports)
    Io(std::io::Error),

    /// Configuration errors
    Config(String),

    /// Anything unexpected, such as a worker panic
    Other(String),
}

impl SifterError {
    /// Stable machine-readable tag used on the request surface.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Parse(_) => "parse_error",
            Self::Validation(_) => "validation_error",
            Self::State(_) => "state_error",
            Self::Export(_) => "export_error",
            Self::Io(_) => "io_error",
            Self::Config(_) => "config_error",
            Self::Other(_) => "internal_error",
        }
    }

    /// The message without the kind prefix that `Display` adds.
    pub fn message(&self) -> String {
        match self {
            Self::Parse(msg)
            | Self::Validation(msg)
            | Self::State(msg)
            | Self::Export(msg)
            | Self::Config(msg)
            | Self::Other(msg) => msg.clone(),
            Self::Io(e) => e.to_string(),
        }
    }

    /// Standard error for operations issued before any upload.
    pub fn no_dataset() -> Self {
        Self::State("No dataset loaded. Upload a CSV file first.".to_owned())
    }

    fn prefixed(self, prefix: &str) -> Self {
        match self {
            Self::Parse(msg) => Self::Parse(format!("{prefix}: {msg}")),
            Self::Validation(msg) => Self::Validation(format!("{prefix}: {msg}")),
            Self::State(msg) => Self::State(format!("{prefix}: {msg}")),
            Self::Export(msg) => Self::Export(format!("{prefix}: {msg}")),
            Self::Config(msg) => Self::Config(format!("{prefix}: {msg}")),
            Self::Io(e) => Self::Io(std::io::Error::new(e.kind(), format!("{prefix}: {e}"))),
            Self::Other(msg) => Self::Other(format!("{prefix}: {msg}")),
        }
    }
}

impl fmt::Display for SifterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "Parse error: {msg}"),
            Self::Validation(msg) => write!(f, "Validation error: {msg}"),
            Self::State(msg) => write!(f, "State error: {msg}"),
            Self::Export(msg) => write!(f, "Export error: {msg}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Config(msg) => write!(f, "Configuration error: {msg}"),
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for SifterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SifterError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<anyhow::Error> for SifterError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

impl From<serde_json::Error> for SifterError {
    fn from(err: serde_json::Error) -> Self {
        Self::Validation(format!("Malformed request: {err}"))
    }
}

impl From<polars::error::PolarsError> for SifterError {
    fn from(err: polars::error::PolarsError) -> Self {
        Self::Other(format!("Data frame operation failed: {err}"))
    }
}

impl From<rust_xlsxwriter::XlsxError> for SifterError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        Self::Export(format!("Excel workbook: {err}"))
    }
}

impl From<lopdf::Error> for SifterError {
    fn from(err: lopdf::Error) -> Self {
        Self::Export(format!("PDF document: {err}"))
    }
}

impl From<tokio::task::JoinError> for SifterError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Other(format!("Worker task failed: {err}"))
    }
}

/// Result type alias for sifter operations.
pub type Result<T> = std::result::Result<T, SifterError>;

/// Wire shape of a failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub kind: String,
    pub message: String,
}

impl From<&SifterError> for ErrorResponse {
    fn from(err: &SifterError) -> Self {
        Self {
            kind: err.kind().to_owned(),
            message: err.message(),
        }
    }
}

/// Extension trait to add context to results.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, msg: impl Into<String>) -> Result<T>;

    /// Add context using a closure (lazy evaluation).
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<SifterError>,
{
    fn context(self, msg: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().prefixed(&msg.into()))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.into().prefixed(&f()))
    }
}
