//! Per-template outcome of a batch run

use std::fmt;

use serde::Serialize;

use crate::engine::TemplateError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedTemplate {
    pub name: String,
    pub error: String,
}

/// Which templates were applied and which failed, in run order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    pub succeeded: Vec<String>,
    pub failed: Vec<FailedTemplate>,
}

impl ApplyReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self, name: impl Into<String>) {
        self.succeeded.push(name.into());
    }

    pub fn record_failure(&mut self, name: impl Into<String>, error: &TemplateError) {
        self.failed.push(FailedTemplate {
            name: name.into(),
            error: error.to_string(),
        });
    }

    /// True when no template failed
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}

impl fmt::Display for ApplyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for name in &self.succeeded {
            writeln!(f, "applied {}", name)?;
        }
        for failure in &self.failed {
            writeln!(f, "failed  {}: {}", failure.name, failure.error)?;
        }
        write!(
            f,
            "{} of {} templates applied",
            self.succeeded.len(),
            self.total()
        )
    }
}
