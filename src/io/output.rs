//! Output management for CLI commands.
//!
//! Handles formatting and display for different output formats,
//! providing a unified interface for text and JSON output.

use crate::error::IndexError;
use crate::io::exit_code::ExitCode;
use crate::io::format::{JsonResponse, OutputFormat};
use serde::Serialize;
use std::io::{self, Write};

pub struct OutputManager {
    format: OutputFormat,
    stdout: Box<dyn Write>,
    stderr: Box<dyn Write>,
}

impl OutputManager {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            stdout: Box::new(io::stdout()),
            stderr: Box::new(io::stderr()),
        }
    }

    /// Create an output manager writing into custom writers.
    pub fn new_with_writers(
        format: OutputFormat,
        stdout: Box<dyn Write>,
        stderr: Box<dyn Write>,
    ) -> Self {
        Self {
            format,
            stdout,
            stderr,
        }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Output a successful result.
    ///
    /// In JSON mode, wraps the data in a success response.
    /// In text mode, prints what `text` renders.
    pub fn success<T, F>(&mut self, data: &T, text: F) -> io::Result<ExitCode>
    where
        T: Serialize,
        F: FnOnce(&T) -> String,
    {
        match self.format {
            OutputFormat::Json => {
                let response = JsonResponse::success(data);
                writeln!(self.stdout, "{}", serde_json::to_string_pretty(&response)?)?;
            }
            OutputFormat::Text => {
                writeln!(self.stdout, "{}", text(data))?;
            }
        }
        Ok(ExitCode::Success)
    }

    /// Output the result of a query, success or error.
    pub fn result<T, F>(&mut self, result: Result<T, IndexError>, text: F) -> io::Result<ExitCode>
    where
        T: Serialize,
        F: FnOnce(&T) -> String,
    {
        match result {
            Ok(data) => self.success(&data, text),
            Err(error) => self.error(&error),
        }
    }

    /// Output an error with suggestions.
    pub fn error(&mut self, error: &IndexError) -> io::Result<ExitCode> {
        match self.format {
            OutputFormat::Json => {
                let response = JsonResponse::from_error(error);
                writeln!(self.stderr, "{}", serde_json::to_string_pretty(&response)?)?;
            }
            OutputFormat::Text => {
                writeln!(self.stderr, "Error: {error}")?;
                for suggestion in error.recovery_suggestions() {
                    writeln!(self.stderr, "  Suggestion: {suggestion}")?;
                }
            }
        }
        Ok(ExitCode::from_error(error))
    }

    /// Output progress information (text mode only).
    pub fn progress(&mut self, message: &str) -> io::Result<()> {
        if matches!(self.format, OutputFormat::Text) {
            writeln!(self.stderr, "{message}")?;
        }
        Ok(())
    }
}
