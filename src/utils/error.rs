//! Error handling for mdocx exports
//!
//! Only fatal conditions are errors: input that is not text, an unusable
//! configuration, and packaging or I/O failures. Everything else degrades
//! and is recorded in the export report.

use std::fmt;

use mdocx_docx_backend::PackageError;

/// Export error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportError {
    /// Input could not be read as UTF-8 text
    InvalidInput { message: String },
    /// The document packager failed
    Package { message: String },
    /// IO error (for file operations)
    Io { message: String },
    /// Configuration file could not be read or parsed
    Config { message: String },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::InvalidInput { message } => write!(f, "Invalid input: {}", message),
            ExportError::Package { message } => write!(f, "Packaging failed: {}", message),
            ExportError::Io { message } => write!(f, "IO error: {}", message),
            ExportError::Config { message } => write!(f, "Invalid configuration: {}", message),
        }
    }
}

impl std::error::Error for ExportError {}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        ExportError::Io {
            message: err.to_string(),
        }
    }
}

impl From<PackageError> for ExportError {
    fn from(err: PackageError) -> Self {
        ExportError::Package {
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for ExportError {
    fn from(err: toml::de::Error) -> Self {
        ExportError::Config {
            message: err.to_string(),
        }
    }
}

impl From<std::str::Utf8Error> for ExportError {
    fn from(err: std::str::Utf8Error) -> Self {
        ExportError::invalid(format!("input is not UTF-8 text ({})", err))
    }
}

/// Result type for export operations
pub type ExportResult<T> = Result<T, ExportError>;

// Convenience constructors for errors
impl ExportError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ExportError::InvalidInput {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        ExportError::Config {
            message: message.into(),
        }
    }
}
