//! prisma-template - palette templates for third-party config files
//!
//! A template is a small line-oriented directive file describing edits to a
//! target file. Color tokens such as `{background}` or `{color4.h}` in the
//! edit content are filled from a palette before the edit is applied.
//!
//! # Example
//!
//! ```rust
//! use prisma_template::{parse, render, Document, Palette};
//!
//! let template = parse("@line 1\nbackground={background}\n@append\ncolor0={color0}\n");
//! let palette: Palette = [("background", "#000000"), ("color0", "#1a1b26")]
//!     .into_iter()
//!     .collect();
//!
//! let document = render(&template, &palette, Document::new()).unwrap();
//! assert_eq!(document.to_text(), "background=#000000\ncolor0=#1a1b26");
//! ```

pub mod color;
pub mod engine;
pub mod error;
pub mod palette;
pub mod parser;
pub mod pipeline;

use std::fs;
use std::path::{Path, PathBuf};

pub use color::substitute;
pub use engine::{apply, prepare, render, Applied, Document, TemplateError};
pub use error::ParseError;
pub use palette::{Palette, PaletteError};
pub use parser::{parse, parse_strict, parse_with_mode, Operation, ParseMode, Template};
pub use pipeline::{ApplyReport, PipelineConfig};

/// Options for applying a template file
#[derive(Debug, Clone, Default)]
pub struct ApplyOptions {
    /// Write here instead of the template's `@target`
    pub output: Option<PathBuf>,
    /// How malformed directives are handled
    pub parse_mode: ParseMode,
    /// Render but do not write the target
    pub dry_run: bool,
}

impl ApplyOptions {
    /// Create options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output override
    pub fn with_output(mut self, output: Option<PathBuf>) -> Self {
        self.output = output;
        self
    }

    /// Set the parse mode
    pub fn with_parse_mode(mut self, mode: ParseMode) -> Self {
        self.parse_mode = mode;
        self
    }

    /// Enable or disable dry-run mode
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// Read and parse a template file
pub fn load_template(path: &Path, mode: ParseMode) -> Result<Template, TemplateError> {
    let source = fs::read_to_string(path).map_err(|e| TemplateError::io(path, e))?;
    let template = parse_with_mode(&source, mode)?;
    Ok(template.with_template_path(path))
}

/// Apply a template file with a palette, writing its target
///
/// `output` overrides the template's `@target`. Returns the path written.
pub fn apply_template(
    template_path: &Path,
    palette: &Palette,
    output: Option<&Path>,
) -> Result<PathBuf, TemplateError> {
    let template = load_template(template_path, ParseMode::Lenient)?;
    apply(&template, palette, output)
}

/// Apply a template file with explicit options
///
/// In dry-run mode the rendered document is returned without writing it.
pub fn apply_template_with(
    template_path: &Path,
    palette: &Palette,
    options: &ApplyOptions,
) -> Result<Applied, TemplateError> {
    let template = load_template(template_path, options.parse_mode)?;
    let applied = prepare(&template, palette, options.output.as_deref())?;
    if !options.dry_run {
        engine::write_document(&applied.target, &applied.document)?;
    }
    Ok(applied)
}
