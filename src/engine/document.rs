//! In-memory target document
//!
//! A document is the target file split on `\n`. DSL addressing is 1-based and
//! refers to slots of this vector, which is not always the physical line
//! count: `@line` stores its content in a single slot even when the content
//! spans several lines, so a later `@line`/`@lines` in the same template
//! counts that slot once.

use fancy_regex::Regex;

use super::error::TemplateError;

/// Highest slot a template may address with `@line` or `@lines`
pub const MAX_LINE: usize = 1 << 20;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    lines: Vec<String>,
}

/// Split operation content into the entries it occupies
fn content_lines(content: &str) -> impl Iterator<Item = String> + '_ {
    content.split('\n').map(String::from)
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Split text on `\n`; an empty string yields one empty slot
    pub fn from_text(text: &str) -> Self {
        Self {
            lines: content_lines(text).collect(),
        }
    }

    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Slot `line` (1-based)
    pub fn get(&self, line: usize) -> Option<&str> {
        line.checked_sub(1)
            .and_then(|idx| self.lines.get(idx))
            .map(String::as_str)
    }

    /// Pad with empty slots until the document has at least `len` of them
    fn extend_to(&mut self, len: usize) -> Result<(), TemplateError> {
        if len > MAX_LINE.max(self.lines.len()) {
            return Err(TemplateError::validation(format!(
                "line {} is beyond the addressable limit of {}",
                len, MAX_LINE
            )));
        }
        if self.lines.len() < len {
            self.lines.resize(len, String::new());
        }
        Ok(())
    }

    /// Overwrite slot `line` with `content` verbatim
    ///
    /// Multi-line content stays in the one slot and only becomes several
    /// lines when written, so later line numbers in the same template still
    /// count it as a single line.
    pub fn set_line(&mut self, line: usize, content: &str) -> Result<(), TemplateError> {
        if line < 1 {
            return Err(TemplateError::validation(format!(
                "line number must be >= 1, got {}",
                line
            )));
        }
        self.extend_to(line)?;
        self.lines[line - 1] = content.to_string();
        Ok(())
    }

    /// Replace slots `start..=end` (1-based) with the lines of `content`
    pub fn replace_range(
        &mut self,
        start: usize,
        end: usize,
        content: &str,
    ) -> Result<(), TemplateError> {
        if start < 1 {
            return Err(TemplateError::validation(format!(
                "line numbers must be >= 1, got start={}, end={}",
                start, end
            )));
        }
        if start > end {
            return Err(TemplateError::validation(format!(
                "start line ({}) must be <= end line ({})",
                start, end
            )));
        }
        self.extend_to(end)?;
        self.lines.splice(start - 1..end, content_lines(content));
        Ok(())
    }

    /// Replace every line containing a match for `pattern` with the lines of
    /// `content`. Inserted lines are never tested against the pattern.
    ///
    /// Returns the number of lines replaced. Fails when matching a line
    /// exceeds the regex backtracking limit; the document may then be partly
    /// rewritten, which callers discard.
    pub fn replace_matches(
        &mut self,
        pattern: &Regex,
        content: &str,
    ) -> Result<usize, TemplateError> {
        let replacement: Vec<String> = content_lines(content).collect();
        let mut replaced = 0;
        let mut i = 0;
        while i < self.lines.len() {
            let is_match = pattern.is_match(&self.lines[i]).map_err(|e| {
                TemplateError::validation(format!(
                    "matching '{}' failed: {}",
                    pattern.as_str(),
                    e
                ))
            })?;
            if is_match {
                self.lines.splice(i..i + 1, replacement.iter().cloned());
                i += replacement.len();
                replaced += 1;
            } else {
                i += 1;
            }
        }
        Ok(replaced)
    }

    pub fn append(&mut self, content: &str) {
        self.lines.extend(content_lines(content));
    }

    pub fn prepend(&mut self, content: &str) {
        self.lines.splice(0..0, content_lines(content));
    }

    /// Join slots with `\n` for writing
    pub fn to_text(&self) -> String {
        self.lines.join("\n")
    }
}
