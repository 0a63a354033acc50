//! Batch application of templates
//!
//! Every template is applied on its own: a failure is recorded against the
//! template's name and the run moves on to the next one.

mod config;
mod report;

use std::path::PathBuf;

use tracing::{info, warn};

use crate::palette::Palette;
use crate::{apply_template_with, ApplyOptions};

pub use config::{ConfigError, PipelineConfig, TemplateEntry};
pub use report::{ApplyReport, FailedTemplate};

/// A template scheduled for application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateJob {
    /// Name used in the report
    pub name: String,
    pub path: PathBuf,
    pub output: Option<PathBuf>,
}

impl TemplateJob {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            name,
            path,
            output: None,
        }
    }

    pub fn with_output(mut self, output: Option<PathBuf>) -> Self {
        self.output = output;
        self
    }
}

/// Build the job list described by a config
pub fn jobs_from_config(config: &PipelineConfig) -> Vec<TemplateJob> {
    config
        .templates
        .iter()
        .map(|entry| {
            let mut job = TemplateJob::new(config.template_path(entry))
                .with_output(entry.output_path());
            job.name = entry.path.clone();
            job
        })
        .collect()
}

/// Apply each job in order, collecting per-template results
///
/// `options.output` is ignored; each job carries its own override.
pub fn run_jobs<I>(jobs: I, palette: &Palette, options: &ApplyOptions) -> ApplyReport
where
    I: IntoIterator<Item = TemplateJob>,
{
    let mut report = ApplyReport::new();
    for job in jobs {
        let job_options = options.clone().with_output(job.output.clone());
        match apply_template_with(&job.path, palette, &job_options) {
            Ok(applied) => {
                info!(template = %job.name, path = %applied.target.display(), "applied template");
                report.record_success(job.name);
            }
            Err(e) => {
                warn!(template = %job.name, error = %e, "template failed");
                report.record_failure(job.name, &e);
            }
        }
    }
    report
}

/// Apply every template listed in `config`
///
/// Parsing is strict when either `options` or the config asks for it.
pub fn run(config: &PipelineConfig, palette: &Palette, options: &ApplyOptions) -> ApplyReport {
    run_jobs(
        jobs_from_config(config),
        palette,
        &config.apply_options(options),
    )
}
