//! Applying parsed templates to target files

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use fancy_regex::Regex;
use tracing::debug;

use super::document::Document;
use super::encoding::{decode_with, DECODE_CHAIN};
use super::error::TemplateError;
use super::path::expand_path;
use crate::color::substitute;
use crate::palette::Palette;
use crate::parser::{Operation, Template};

/// A fully rendered target that has not necessarily been written yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    pub target: PathBuf,
    pub document: Document,
}

/// Pick the output path: the override wins over `@target`, then expand it
pub fn resolve_target(
    template: &Template,
    output_override: Option<&Path>,
) -> Result<PathBuf, TemplateError> {
    match (output_override, template.target_path.as_deref()) {
        (Some(path), _) => Ok(match path.to_str() {
            Some(raw) => expand_path(raw),
            None => path.to_path_buf(),
        }),
        (None, Some(raw)) => Ok(expand_path(raw)),
        (None, None) => Err(TemplateError::no_target()),
    }
}

/// Read the target into a document, or start empty if it does not exist
pub fn load_document(path: &Path) -> Result<Document, TemplateError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "target does not exist, starting empty");
            return Ok(Document::new());
        }
        Err(e) => return Err(TemplateError::io(path, e)),
    };

    let (text, encoding) = decode_with(&bytes, &DECODE_CHAIN).ok_or_else(|| {
        TemplateError::io(
            path,
            io::Error::new(io::ErrorKind::InvalidData, "target could not be decoded"),
        )
    })?;
    debug!(path = %path.display(), %encoding, "loaded target");
    Ok(Document::from_text(&text))
}

/// Write the document, creating missing parent directories
pub fn write_document(path: &Path, document: &Document) -> Result<(), TemplateError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| TemplateError::io(parent, e))?;
    }
    fs::write(path, document.to_text()).map_err(|e| TemplateError::io(path, e))
}

/// Apply a single operation after substituting colors into its content
pub fn apply_operation(
    document: &mut Document,
    operation: &Operation,
    palette: &Palette,
) -> Result<(), TemplateError> {
    let content = substitute(operation.content(), palette);

    match operation {
        Operation::Line { line, .. } => document.set_line(*line, &content)?,
        Operation::LineRange { start, end, .. } => {
            document.replace_range(*start, *end, &content)?
        }
        Operation::Match { pattern, .. } => {
            let regex = Regex::new(pattern).map_err(|e| {
                TemplateError::validation(format!("invalid regex pattern '{}': {}", pattern, e))
            })?;
            let replaced = document.replace_matches(&regex, &content)?;
            debug!(pattern = %pattern, replaced, "applied match");
        }
        Operation::Append { .. } => document.append(&content),
        Operation::Prepend { .. } => document.prepend(&content),
    }
    Ok(())
}

/// Run every operation of `template` against `document`, in order
pub fn render(
    template: &Template,
    palette: &Palette,
    mut document: Document,
) -> Result<Document, TemplateError> {
    for op in &template.operations {
        debug!(operation = %op.node, len = document.len(), "applying operation");
        apply_operation(&mut document, &op.node, palette)?;
    }
    Ok(document)
}

/// Resolve, load and render without touching the filesystem
pub fn prepare(
    template: &Template,
    palette: &Palette,
    output_override: Option<&Path>,
) -> Result<Applied, TemplateError> {
    let target = resolve_target(template, output_override)?;
    let document = load_document(&target)?;
    let document = render(template, palette, document)?;
    Ok(Applied { target, document })
}

/// Apply `template` and write the target
///
/// The target is written only after every operation succeeded.
pub fn apply(
    template: &Template,
    palette: &Palette,
    output_override: Option<&Path>,
) -> Result<PathBuf, TemplateError> {
    let applied = prepare(template, palette, output_override)?;
    write_document(&applied.target, &applied.document)?;
    Ok(applied.target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use pretty_assertions::assert_eq;

    fn palette() -> Palette {
        [("background", "#000000"), ("color0", "#1a1b26")]
            .into_iter()
            .collect()
    }

    fn render_text(source: &str, existing: &[&str]) -> Result<String, TemplateError> {
        let template = parse(source);
        let document = Document::from_lines(existing.iter().copied());
        render(&template, &palette(), document).map(|d| d.to_text())
    }

    #[test]
    fn test_line_on_empty_document() {
        let out = render_text("@line 5\n{color0}\n", &[]).unwrap();
        assert_eq!(out, "\n\n\n\n#1a1b26");
    }

    #[test]
    fn test_range_then_line_uses_current_document() {
        let out = render_text(
            "@lines 2-4\nA\nB\n@line 4\nlast\n",
            &["1", "2", "3", "4", "5"],
        )
        .unwrap();
        assert_eq!(out, "1\nA\nB\nlast");
    }

    #[test]
    fn test_multiline_line_content_is_one_slot() {
        let out = render_text("@line 1\nx\ny\n@line 2\nsecond\n", &["a", "b"]).unwrap();
        assert_eq!(out, "x\ny\nsecond");
    }

    #[test]
    fn test_match_does_not_rescan_insertions() {
        let out = render_text("@match \"^foo\"\nfoobar\n", &["foo 1", "x", "foo 2"]).unwrap();
        assert_eq!(out, "foobar\nx\nfoobar");
    }

    #[test]
    fn test_invalid_regex() {
        let err = render_text("@match \"(unclosed\"\nx\n", &["a"]).unwrap_err();
        assert!(matches!(err, TemplateError::Validation(_)));
    }

    #[test]
    fn test_match_lookahead_pattern() {
        let out = render_text(
            "@match \"^(?!#)color\"\ncolor={color0}\n",
            &["# color=old", "color=old"],
        )
        .unwrap();
        assert_eq!(out, "# color=old\ncolor=#1a1b26");
    }

    #[test]
    fn test_huge_line_numbers_are_validation_errors() {
        let err = render_text("@line 18446744073709551615\nX\n", &[]).unwrap_err();
        assert!(matches!(err, TemplateError::Validation(_)));
        let err = render_text("@lines 1-18446744073709551615\nX\n", &[]).unwrap_err();
        assert!(matches!(err, TemplateError::Validation(_)));
    }

    #[test]
    fn test_reversed_range() {
        let err = render_text("@lines 5-2\nx\n", &["a"]).unwrap_err();
        assert!(matches!(err, TemplateError::Validation(_)));
    }

    #[test]
    fn test_substitution_before_matching() {
        let out = render_text(
            "@match \"^bg=\"\nbg={background}\n@prepend\n# {color0.r}\n",
            &["bg=#ffffff", "fg=#eeeeee"],
        )
        .unwrap();
        assert_eq!(out, "# 26\nbg=#000000\nfg=#eeeeee");
    }

    #[test]
    fn test_resolve_target_prefers_override() {
        let template = parse("@target from-template.conf\n");
        let target = resolve_target(&template, Some(Path::new("override.conf"))).unwrap();
        assert_eq!(target, PathBuf::from("override.conf"));
        let target = resolve_target(&template, None).unwrap();
        assert_eq!(target, PathBuf::from("from-template.conf"));
    }

    #[test]
    fn test_resolve_target_missing() {
        let template = parse("@append\nx\n");
        assert!(matches!(
            resolve_target(&template, None),
            Err(TemplateError::Configuration(_))
        ));
    }

    #[test]
    fn test_failed_operation_leaves_target_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("app.conf");
        fs::write(&target, "original").unwrap();

        let template = parse("@append\nadded\n@lines 3-1\nx\n");
        let result = apply(&template, &palette(), Some(&target));
        assert!(matches!(result, Err(TemplateError::Validation(_))));
        assert_eq!(fs::read_to_string(&target).unwrap(), "original");
    }

    #[test]
    fn test_write_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested/deeper/app.conf");
        let template = parse("@append\n{background}\n");
        let written = apply(&template, &palette(), Some(&target)).unwrap();
        assert_eq!(written, target);
        assert_eq!(fs::read_to_string(&target).unwrap(), "#000000");
    }

    #[test]
    fn test_load_cp850_target() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("legacy.ini");
        fs::write(&target, b"name=gr\x81n\nkey=old").unwrap();
        let document = load_document(&target).unwrap();
        assert_eq!(document.lines(), ["name=grün", "key=old"]);
    }
}
