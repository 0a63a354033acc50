//! Syntax types for the template directive language

use std::fmt;
use std::path::PathBuf;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// AST node with source location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

/// One edit against the target document
///
/// `content` is the raw block text as written in the template, before color
/// substitution. It may span several lines joined with `\n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// `@line N`: overwrite slot N (1-based)
    Line { line: usize, content: String },
    /// `@lines S-E`: replace slots S..=E with the content lines
    LineRange {
        start: usize,
        end: usize,
        content: String,
    },
    /// `@match "regex"`: replace every line containing a match
    Match { pattern: String, content: String },
    /// `@append`
    Append { content: String },
    /// `@prepend`
    Prepend { content: String },
}

impl Operation {
    /// Raw content block of this operation
    pub fn content(&self) -> &str {
        match self {
            Operation::Line { content, .. }
            | Operation::LineRange { content, .. }
            | Operation::Match { content, .. }
            | Operation::Append { content }
            | Operation::Prepend { content } => content,
        }
    }
}

/// Formats the directive header, e.g. `@lines 2-4`
impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Line { line, .. } => write!(f, "@line {}", line),
            Operation::LineRange { start, end, .. } => write!(f, "@lines {}-{}", start, end),
            Operation::Match { pattern, .. } => write!(f, "@match \"{}\"", pattern),
            Operation::Append { .. } => write!(f, "@append"),
            Operation::Prepend { .. } => write!(f, "@prepend"),
        }
    }
}

/// A parsed template file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Template {
    /// Where the template was read from, if it came from a file
    pub template_path: Option<PathBuf>,
    /// Path given by the last `@target` directive
    pub target_path: Option<String>,
    /// Operations in source order
    pub operations: Vec<Spanned<Operation>>,
}

impl Template {
    /// Attach the file the template was read from
    pub fn with_template_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.template_path = Some(path.into());
        self
    }

    /// Iterate over the operations without their spans
    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.operations.iter().map(|op| &op.node)
    }

    /// Display name used in reports: the template file name, or `<inline>`
    pub fn name(&self) -> String {
        self.template_path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "<inline>".to_string())
    }
}

/// How malformed directives are treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParseMode {
    /// Drop malformed directives silently
    #[default]
    Lenient,
    /// Report every malformed directive as a [`crate::ParseError`]
    Strict,
}
