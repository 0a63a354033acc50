//! Error types for applying templates

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::error::ParseError;

/// Errors that abort a single template application
///
/// None of these leave a partially written target behind: the target is only
/// written after every operation has been applied in memory.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Nothing says where the output should go
    #[error("configuration error: {0}")]
    Configuration(String),

    /// An operation cannot be applied (bad range, bad regex)
    #[error("validation error: {0}")]
    Validation(String),

    /// Reading the template or target, or writing the target, failed
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Strict parsing rejected the template
    #[error("parse errors: {}", format_parse_errors(.0))]
    Parse(Vec<ParseError>),
}

impl From<Vec<ParseError>> for TemplateError {
    fn from(errors: Vec<ParseError>) -> Self {
        TemplateError::Parse(errors)
    }
}

fn format_parse_errors(errors: &[ParseError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl TemplateError {
    /// Neither an output override nor `@target` was given
    pub fn no_target() -> Self {
        Self::Configuration("no target specified".to_string())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an I/O error bound to a path
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}
