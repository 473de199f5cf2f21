//! Format definitions for CLI output.
//!
//! Provides structured format types for consistent JSON responses.

use crate::error::IndexError;
use crate::io::exit_code::ExitCode;
use serde::{Deserialize, Serialize};

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text (default)
    Text,
    /// JSON for tool integration
    Json,
}

impl OutputFormat {
    /// Pick the format from the `--json` flag.
    #[must_use]
    pub fn from_json_flag(json: bool) -> Self {
        if json { Self::Json } else { Self::Text }
    }

    /// Check if format is JSON.
    #[must_use]
    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json)
    }
}

/// Standard JSON response envelope.
///
/// Success and error responses share one shape so scripts can branch on
/// `status` or `exit_code` alone.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonResponse<T = serde_json::Value>
where
    T: Serialize,
{
    /// Status: "success" or "error"
    pub status: String,

    /// Result code (e.g., "OK", "PACKAGE_NOT_FOUND")
    pub code: String,

    /// Human-readable message
    pub message: String,

    /// Query result payload (only for success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    /// Error details and suggestions (only for errors)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetails>,

    /// Exit code for shell scripts
    pub exit_code: u8,

    /// Metadata (version, execution time)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

/// Error details for JSON responses.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Recovery suggestions
    pub suggestions: Vec<String>,
}

/// Response metadata.
#[derive(Debug, Serialize, Deserialize)]
pub struct ResponseMeta {
    /// Version of the tool
    pub version: String,
    /// Execution time in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_time_ms: Option<u64>,
}

impl ResponseMeta {
    /// Metadata stamped with this crate's version.
    pub fn new(execution_time_ms: Option<u64>) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            execution_time_ms,
        }
    }
}

impl<T> JsonResponse<T>
where
    T: Serialize,
{
    /// Create a success response with data.
    pub fn success(data: T) -> Self {
        Self {
            status: "success".to_string(),
            code: "OK".to_string(),
            message: "Operation completed successfully".to_string(),
            data: Some(data),
            error: None,
            exit_code: ExitCode::Success as u8,
            meta: None,
        }
    }

    /// Add metadata to the response.
    pub fn with_meta(mut self, meta: ResponseMeta) -> Self {
        self.meta = Some(meta);
        self
    }
}

impl JsonResponse<serde_json::Value> {
    /// Create an error response from IndexError.
    pub fn from_error(error: &IndexError) -> Self {
        Self {
            status: "error".to_string(),
            code: error.status_code(),
            message: error.to_string(),
            data: None,
            error: Some(ErrorDetails {
                suggestions: error
                    .recovery_suggestions()
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            }),
            exit_code: ExitCode::from_error(error) as u8,
            meta: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_from_flag() {
        assert_eq!(OutputFormat::from_json_flag(true), OutputFormat::Json);
        assert_eq!(OutputFormat::from_json_flag(false), OutputFormat::Text);
    }

    #[test]
    fn test_json_response_success() {
        let response = JsonResponse::success(vec!["fmt", "io"]).with_meta(ResponseMeta::new(Some(3)));
        assert_eq!(response.status, "success");
        assert_eq!(response.exit_code, 0);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["data"][1], "io");
        assert_eq!(json["meta"]["execution_time_ms"], 3);
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_json_response_from_error() {
        let error = IndexError::PackageNotFound {
            path: "example.com/missing".to_string(),
        };
        let response = JsonResponse::from_error(&error);
        assert_eq!(response.status, "error");
        assert_eq!(response.code, "PACKAGE_NOT_FOUND");
        assert_eq!(response.exit_code, 3);
        assert!(response.data.is_none());
    }
}
