//! Exit codes for CLI operations following Unix conventions.
//!
//! # Exit Code Semantics
//!
//! - `0`: Success
//! - `1`: General error
//! - `2`: Blocking error, the corpus cannot be indexed at all
//! - `3-125`: Specific recoverable errors
//! - `126-255`: Reserved by shell

use crate::error::IndexError;

/// Standard exit codes for CLI operations.
///
/// Zero means success and every non-zero value names one class of failure,
/// so scripts can react without parsing the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Operation succeeded (code 0)
    Success = 0,

    /// Unspecified error occurred (code 1)
    GeneralError = 1,

    /// The corpus is unusable (code 2)
    BlockingError = 2,

    /// Package, type, file or identifier not found (code 3)
    NotFound = 3,

    /// Corpus document could not be parsed (code 4)
    ParseError = 4,

    /// File I/O error (code 5)
    IoError = 5,

    /// Configuration error (code 6)
    ConfigError = 6,

    /// The index is still being built (code 7)
    NotReady = 7,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code as u8)
    }
}

impl ExitCode {
    /// Convert an `IndexError` to the appropriate exit code.
    ///
    /// Lookups that miss are recoverable. A corpus that fails validation
    /// is blocking.
    pub fn from_error(error: &IndexError) -> Self {
        match error {
            IndexError::PackageNotFound { .. }
            | IndexError::TypeNotFound { .. }
            | IndexError::FileNotFound { .. }
            | IndexError::IdentifierNotFound { .. } => ExitCode::NotFound,

            IndexError::InvalidCorpus { .. } | IndexError::DuplicatePackage { .. } => {
                ExitCode::BlockingError
            }

            IndexError::CorpusParse { .. } => ExitCode::ParseError,
            IndexError::CorpusRead { .. } => ExitCode::IoError,
            IndexError::ConfigError { .. } => ExitCode::ConfigError,
            IndexError::TooEarly => ExitCode::NotReady,

            IndexError::General(_) => ExitCode::GeneralError,
        }
    }

    /// Check if this exit code indicates a blocking error.
    #[must_use]
    pub fn is_blocking(&self) -> bool {
        matches!(self, ExitCode::BlockingError)
    }

    /// Check if this exit code indicates success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, ExitCode::Success)
    }

    /// Get a human-readable description of the exit code.
    pub fn description(&self) -> &str {
        match self {
            ExitCode::Success => "Success",
            ExitCode::GeneralError => "General error",
            ExitCode::BlockingError => "Blocking error - the corpus cannot be indexed",
            ExitCode::NotFound => "Not found",
            ExitCode::ParseError => "Corpus parse error",
            ExitCode::IoError => "I/O error",
            ExitCode::ConfigError => "Configuration error",
            ExitCode::NotReady => "Index not ready",
        }
    }
}
