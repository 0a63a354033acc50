//! Error types for template parsing
//!
//! Lenient parsing never produces these; strict parsing collects one per
//! dropped directive or stray line and returns them all at once.

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

use crate::parser::ast::Span;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// `@name` that is not one of the known directives
    #[error("line {line}: unknown directive '@{name}'")]
    UnknownDirective { name: String, line: usize, span: Span },

    /// Known directive whose argument does not have the required shape
    #[error("line {line}: invalid argument for @{directive}: {message}")]
    InvalidArgument {
        directive: String,
        message: String,
        expected: Vec<String>,
        line: usize,
        span: Span,
    },

    /// Non-comment text that is not part of any directive block
    #[error("line {line}: text outside of a directive block")]
    StrayText { line: usize, span: Span },
}

impl ParseError {
    /// Byte range of the offending text in the template source
    pub fn span(&self) -> Span {
        match self {
            ParseError::UnknownDirective { span, .. }
            | ParseError::InvalidArgument { span, .. }
            | ParseError::StrayText { span, .. } => span.clone(),
        }
    }

    /// 1-based line number of the offending text
    pub fn line(&self) -> usize {
        match self {
            ParseError::UnknownDirective { line, .. }
            | ParseError::InvalidArgument { line, .. }
            | ParseError::StrayText { line, .. } => *line,
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let span = self.span();
        let (message, note) = match self {
            ParseError::UnknownDirective { name, .. } => (
                format!("unknown directive '@{}'", name),
                Some("known directives: @target, @line, @lines, @match, @append, @prepend".to_string()),
            ),
            ParseError::InvalidArgument {
                directive,
                message,
                expected,
                ..
            } => {
                let note = if expected.is_empty() {
                    None
                } else {
                    Some(format!("expected: {}", expected.join(", ")))
                };
                (format!("invalid argument for @{}: {}", directive, message), note)
            }
            ParseError::StrayText { .. } => (
                "text outside of a directive block".to_string(),
                Some("content lines must follow a directive such as @append".to_string()),
            ),
        };

        let mut report = Report::build(ReportKind::Error, filename, span.start)
            .with_message(&message)
            .with_label(
                Label::new((filename, span))
                    .with_message(&message)
                    .with_color(Color::Red),
            );
        if let Some(note) = note {
            report = report.with_note(note);
        }

        let mut buf = Vec::new();
        if report
            .finish()
            .write((filename, Source::from(source)), &mut buf)
            .is_err()
        {
            return self.to_string();
        }
        String::from_utf8_lossy(&buf).into_owned()
    }
}

/// Render every error in `errors` against the same source
pub fn format_all(errors: &[ParseError], source: &str, filename: &str) -> String {
    errors
        .iter()
        .map(|e| e.format(source, filename))
        .collect::<Vec<_>>()
        .join("\n")
}
