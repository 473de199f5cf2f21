//! Error types for the package catalog engine
//!
//! This module provides structured error types using thiserror for better
//! error handling and actionable error messages.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for building and querying the index
#[derive(Error, Debug)]
pub enum IndexError {
    /// Corpus loading errors
    #[error("Failed to read corpus '{path}': {source}")]
    CorpusRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse corpus '{path}': {source}")]
    CorpusParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid corpus: {reason}")]
    InvalidCorpus { reason: String },

    #[error("Package '{path}' is declared more than once")]
    DuplicatePackage { path: String },

    /// Lookup errors
    #[error("Package '{path}' not found")]
    PackageNotFound { path: String },

    #[error("Type '{name}' not found in package '{package}'")]
    TypeNotFound { package: String, name: String },

    #[error("File '{name}' not found in package '{package}'")]
    FileNotFound { package: String, name: String },

    #[error("Identifier '{name}' not found in package '{package}'")]
    IdentifierNotFound { package: String, name: String },

    /// The index is still being built
    #[error("The index is not ready yet")]
    TooEarly,

    /// Configuration errors
    #[error("Invalid configuration: {reason}")]
    ConfigError { reason: String },

    /// General errors for cases where we need to preserve existing behavior
    #[error("{0}")]
    General(String),
}

impl IndexError {
    /// Get a stable status code for this error type.
    ///
    /// Returns a string identifier that can be used in JSON responses
    /// for programmatic error handling.
    pub fn status_code(&self) -> String {
        match self {
            Self::CorpusRead { .. } => "CORPUS_READ_ERROR",
            Self::CorpusParse { .. } => "CORPUS_PARSE_ERROR",
            Self::InvalidCorpus { .. } => "INVALID_CORPUS",
            Self::DuplicatePackage { .. } => "DUPLICATE_PACKAGE",
            Self::PackageNotFound { .. } => "PACKAGE_NOT_FOUND",
            Self::TypeNotFound { .. } => "TYPE_NOT_FOUND",
            Self::FileNotFound { .. } => "FILE_NOT_FOUND",
            Self::IdentifierNotFound { .. } => "IDENTIFIER_NOT_FOUND",
            Self::TooEarly => "TOO_EARLY",
            Self::ConfigError { .. } => "CONFIG_ERROR",
            Self::General(_) => "GENERAL_ERROR",
        }
        .to_string()
    }

    /// HTTP status the serve phase answers with for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::PackageNotFound { .. }
            | Self::TypeNotFound { .. }
            | Self::FileNotFound { .. }
            | Self::IdentifierNotFound { .. } => 404,
            Self::TooEarly => 425,
            _ => 500,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.http_status() == 404
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            Self::CorpusRead { .. } => vec![
                "Check that the corpus file exists and you have read permissions",
                "Re-run the front-end parser to regenerate the corpus",
            ],
            Self::CorpusParse { .. } | Self::InvalidCorpus { .. } => vec![
                "The corpus was produced by an incompatible parser version",
                "Re-run the front-end parser to regenerate the corpus",
            ],
            Self::DuplicatePackage { .. } => vec![
                "Each import path may appear only once in a corpus",
                "The 'builtin' package is synthesized by the engine and must not be supplied",
            ],
            Self::TooEarly => vec!["The index is still being built, retry in a moment"],
            Self::ConfigError { .. } => vec![
                "Run 'pkgdex config' to inspect the active settings",
                "Run 'pkgdex init --force' to regenerate the settings file",
            ],
            _ => vec![],
        }
    }
}

/// Errors raised while decoding resource identifiers
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ResourceError {
    #[error("Resource '{0}' has no kind prefix")]
    MissingKind(String),

    #[error("Unknown resource kind '{0}'")]
    UnknownKind(String),

    #[error("Malformed {kind} resource path '{path}'")]
    MalformedPath { kind: &'static str, path: String },

    #[error("Unknown static resource '{0}'")]
    UnknownStaticPath(String),
}

/// Result type alias for index operations
pub type IndexResult<T> = Result<T, IndexError>;

/// Result type alias for resource decoding
pub type ResourceResult<T> = Result<T, ResourceError>;

/// Helper trait for adding context to errors
pub trait ErrorContext<T> {
    /// Add context to an error
    fn context(self, msg: &str) -> Result<T, IndexError>;

    /// Add context with a path
    fn with_path(self, path: &std::path::Path) -> Result<T, IndexError>;
}

impl<T, E> ErrorContext<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, msg: &str) -> Result<T, IndexError> {
        self.map_err(|e| IndexError::General(format!("{msg}: {e}")))
    }

    fn with_path(self, path: &std::path::Path) -> Result<T, IndexError> {
        self.map_err(|e| {
            IndexError::General(format!("Error processing '{}': {}", path.display(), e))
        })
    }
}
