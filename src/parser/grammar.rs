//! Directive scanner and argument grammars
//!
//! The template language is line oriented, so the top level is a plain scan
//! over source lines. Directive arguments with structure (`@line`, `@lines`)
//! are parsed with chumsky.

use chumsky::prelude::*;
use tracing::debug;

use crate::error::ParseError;
use crate::parser::ast::*;
use crate::parser::lexer::{lex_directive, Token};

/// Parse template source, silently dropping malformed directives
pub fn parse(source: &str) -> Template {
    let (template, errors) = scan(source, ParseMode::Lenient);
    for err in &errors {
        debug!(error = %err, "dropped malformed directive");
    }
    template
}

/// Parse template source, reporting malformed directives as errors
pub fn parse_strict(source: &str) -> Result<Template, Vec<ParseError>> {
    let (template, errors) = scan(source, ParseMode::Strict);
    if errors.is_empty() {
        Ok(template)
    } else {
        Err(errors)
    }
}

/// Parse with an explicit mode
pub fn parse_with_mode(source: &str, mode: ParseMode) -> Result<Template, Vec<ParseError>> {
    match mode {
        ParseMode::Lenient => Ok(parse(source)),
        ParseMode::Strict => parse_strict(source),
    }
}

/// A physical source line without its terminator
struct SourceLine<'a> {
    text: &'a str,
    /// Byte offset of the line start in the source
    offset: usize,
    /// 1-based line number
    number: usize,
}

impl SourceLine<'_> {
    fn span(&self) -> Span {
        self.offset..self.offset + self.text.len()
    }

    fn is_directive(&self) -> bool {
        self.text.starts_with('@')
    }

    fn is_comment_or_blank(&self) -> bool {
        let trimmed = self.text.trim();
        trimmed.is_empty() || trimmed.starts_with('#')
    }
}

fn split_lines(source: &str) -> Vec<SourceLine<'_>> {
    let mut offset = 0;
    source
        .split_inclusive('\n')
        .enumerate()
        .map(|(idx, raw)| {
            let text = raw.strip_suffix('\n').unwrap_or(raw);
            let text = text.strip_suffix('\r').unwrap_or(text);
            let line = SourceLine {
                text,
                offset,
                number: idx + 1,
            };
            offset += raw.len();
            line
        })
        .collect()
}

/// Scan the whole source, returning the template and every dropped directive
fn scan(source: &str, mode: ParseMode) -> (Template, Vec<ParseError>) {
    let lines = split_lines(source);
    let mut template = Template::default();
    let mut errors = Vec::new();

    let mut i = 0;
    while i < lines.len() {
        let line = &lines[i];
        i += 1;

        if line.is_comment_or_blank() {
            continue;
        }
        let Some((token, keyword_span)) = lex_directive(line.text) else {
            errors.push(ParseError::StrayText {
                line: line.number,
                span: line.span(),
            });
            continue;
        };

        let rest = &line.text[keyword_span.end..];
        let argument = rest.trim();
        let argument_offset = line.offset + keyword_span.end + (rest.len() - rest.trim_start().len());

        if !token.takes_block() {
            // `@target`: last one wins, an empty argument clears it
            if argument.is_empty() {
                errors.push(ParseError::InvalidArgument {
                    directive: token.name().to_string(),
                    message: "missing target path".to_string(),
                    expected: vec!["path".to_string()],
                    line: line.number,
                    span: line.span(),
                });
                template.target_path = None;
            } else {
                template.target_path = Some(argument.to_string());
            }
            continue;
        }

        let block_start = i;
        while i < lines.len() && !lines[i].is_directive() {
            i += 1;
        }
        let content = collect_block(&lines[block_start..i]);

        match build_operation(&token, argument, content, mode) {
            Ok(op) => template
                .operations
                .push(Spanned::new(op, line.span())),
            Err(BuildError::Unknown) => errors.push(ParseError::UnknownDirective {
                name: token.name().to_string(),
                line: line.number,
                span: line.span(),
            }),
            Err(BuildError::Argument(err)) => {
                errors.push(argument_error(&token, err, line.number, argument_offset))
            }
        }
    }

    (template, errors)
}

/// Join block lines, dropping trailing empty ones
fn collect_block(lines: &[SourceLine<'_>]) -> String {
    let mut block: Vec<&str> = lines.iter().map(|l| l.text).collect();
    while block.last().is_some_and(|l| l.is_empty()) {
        block.pop();
    }
    block.join("\n")
}

enum BuildError {
    Unknown,
    Argument(ArgumentError),
}

/// A chumsky error flattened to owned data
struct ArgumentError {
    span: Span,
    message: String,
    expected: Vec<String>,
}

impl<'a> From<Rich<'a, char>> for ArgumentError {
    fn from(err: Rich<'a, char>) -> Self {
        use chumsky::error::{RichPattern, RichReason};

        let message = match err.reason() {
            RichReason::ExpectedFound { found, .. } => match found {
                Some(c) => format!("unexpected {}", describe_char(c)),
                None => "unexpected end of argument".to_string(),
            },
            RichReason::Custom(msg) => msg.to_string(),
        };

        let expected = err
            .expected()
            .filter_map(|e| match e {
                RichPattern::Token(c) => Some(describe_char(c)),
                RichPattern::Label(label) => Some(label.to_string()),
                RichPattern::EndOfInput => Some("end of argument".to_string()),
                RichPattern::Identifier(s) => Some(format!("'{}'", s)),
                RichPattern::Any => Some("any character".to_string()),
                RichPattern::SomethingElse => None,
            })
            .collect();

        ArgumentError {
            span: err.span().into_range(),
            message,
            expected,
        }
    }
}

fn describe_char(c: &char) -> String {
    format!("'{}'", c.escape_default())
}

fn argument_error(token: &Token, err: ArgumentError, line: usize, offset: usize) -> ParseError {
    ParseError::InvalidArgument {
        directive: token.name().to_string(),
        message: err.message,
        expected: err.expected,
        line,
        span: offset + err.span.start..offset + err.span.end,
    }
}

fn build_operation(
    token: &Token,
    argument: &str,
    content: String,
    mode: ParseMode,
) -> Result<Operation, BuildError> {
    match token {
        Token::Line => match run(line_argument(), argument)? {
            0 => Err(BuildError::Argument(ArgumentError {
                span: 0..argument.len(),
                message: "line numbers start at 1".to_string(),
                expected: Vec::new(),
            })),
            line => Ok(Operation::Line { line, content }),
        },
        Token::Lines => {
            let (start, end) = match mode {
                ParseMode::Lenient => run(range_prefix(), argument)?,
                ParseMode::Strict => run(range_argument(), argument)?,
            };
            Ok(Operation::LineRange {
                start,
                end,
                content,
            })
        }
        Token::Match => Ok(Operation::Match {
            pattern: strip_quotes(argument).to_string(),
            content,
        }),
        Token::Append => Ok(Operation::Append { content }),
        Token::Prepend => Ok(Operation::Prepend { content }),
        Token::Target | Token::Unknown(_) => Err(BuildError::Unknown),
    }
}

fn run<'a, T>(
    parser: impl Parser<'a, &'a str, T, extra::Err<Rich<'a, char>>>,
    argument: &'a str,
) -> Result<T, BuildError> {
    parser.parse(argument).into_result().map_err(|errs| {
        let first = errs.into_iter().next().map(ArgumentError::from);
        BuildError::Argument(first.unwrap_or(ArgumentError {
            span: 0..argument.len(),
            message: "invalid argument".to_string(),
            expected: Vec::new(),
        }))
    })
}

/// Strip surrounding double quotes, then single quotes
fn strip_quotes(argument: &str) -> &str {
    argument.trim_matches('"').trim_matches('\'')
}

/// One or more ASCII digits as a number
fn number<'a>() -> impl Parser<'a, &'a str, usize, extra::Err<Rich<'a, char>>> + Clone {
    any()
        .filter(|c: &char| c.is_ascii_digit())
        .repeated()
        .at_least(1)
        .collect::<String>()
        .try_map(|digits: String, span: SimpleSpan| {
            digits
                .parse::<usize>()
                .map_err(|e| Rich::custom(span, format!("line number out of range ({})", e)))
        })
        .labelled("line number")
}

/// `@line` argument: a single number, zero is rejected by the caller
fn line_argument<'a>() -> impl Parser<'a, &'a str, usize, extra::Err<Rich<'a, char>>> + Clone {
    number().then_ignore(end())
}

/// `@lines` argument: `<start>-<end>`
///
/// Ordering is not checked here; `@lines 5-2` parses and is rejected when the
/// template is applied.
fn range_argument<'a>(
) -> impl Parser<'a, &'a str, (usize, usize), extra::Err<Rich<'a, char>>> + Clone {
    range_prefix_pair().then_ignore(end())
}

/// `@lines` argument in lenient mode: anything after `<start>-<end>` is
/// ignored, so `@lines 2-4  # swap fg/bg` still addresses lines 2 to 4
fn range_prefix<'a>(
) -> impl Parser<'a, &'a str, (usize, usize), extra::Err<Rich<'a, char>>> + Clone {
    range_prefix_pair().then_ignore(any().repeated())
}

fn range_prefix_pair<'a>(
) -> impl Parser<'a, &'a str, (usize, usize), extra::Err<Rich<'a, char>>> + Clone {
    number().then_ignore(just('-')).then(number())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ops(source: &str) -> Vec<Operation> {
        parse(source).operations.into_iter().map(|op| op.node).collect()
    }

    #[test]
    fn test_parse_end_to_end_example() {
        let template = parse("@target app.conf\n@line 1\nbackground={background}\n@append\ncolor0={color0}\n");
        assert_eq!(template.target_path.as_deref(), Some("app.conf"));
        assert_eq!(
            ops_of(&template),
            vec![
                Operation::Line {
                    line: 1,
                    content: "background={background}".to_string()
                },
                Operation::Append {
                    content: "color0={color0}".to_string()
                },
            ]
        );
    }

    fn ops_of(template: &Template) -> Vec<Operation> {
        template.operations().cloned().collect()
    }

    #[test]
    fn test_last_target_wins() {
        let template = parse("@target a.conf\n@target  b.conf  \n");
        assert_eq!(template.target_path.as_deref(), Some("b.conf"));
        assert!(template.operations.is_empty());
    }

    #[test]
    fn test_empty_target_clears() {
        let template = parse("@target a.conf\n@target\n");
        assert_eq!(template.target_path, None);
    }

    #[test]
    fn test_comments_and_blank_lines_skipped_outside_blocks() {
        let source = "# header comment\n\n   # indented comment\n@append\nx\n";
        assert_eq!(
            ops(source),
            vec![Operation::Append {
                content: "x".to_string()
            }]
        );
    }

    #[test]
    fn test_comments_kept_inside_blocks() {
        let source = "@append\n# not a comment here\n\nvalue\n\n\n";
        assert_eq!(
            ops(source),
            vec![Operation::Append {
                content: "# not a comment here\n\nvalue".to_string()
            }]
        );
    }

    #[test]
    fn test_whitespace_only_trailing_line_kept() {
        let source = "@append\nvalue\n  \n\n";
        assert_eq!(
            ops(source),
            vec![Operation::Append {
                content: "value\n  ".to_string()
            }]
        );
    }

    #[test]
    fn test_empty_block() {
        assert_eq!(
            ops("@append\n@prepend\n"),
            vec![
                Operation::Append {
                    content: String::new()
                },
                Operation::Prepend {
                    content: String::new()
                },
            ]
        );
    }

    #[test]
    fn test_crlf_source() {
        let source = "@line 2\r\nfoo\r\n@append\r\nbar\r\n";
        assert_eq!(
            ops(source),
            vec![
                Operation::Line {
                    line: 2,
                    content: "foo".to_string()
                },
                Operation::Append {
                    content: "bar".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_lines_range() {
        assert_eq!(
            ops("@lines 2-4\na\nb\n"),
            vec![Operation::LineRange {
                start: 2,
                end: 4,
                content: "a\nb".to_string()
            }]
        );
    }

    #[test]
    fn test_reversed_range_still_parses() {
        assert_eq!(
            ops("@lines 5-2\nx\n"),
            vec![Operation::LineRange {
                start: 5,
                end: 2,
                content: "x".to_string()
            }]
        );
    }

    #[test]
    fn test_match_quotes_stripped() {
        let expected = |p: &str| Operation::Match {
            pattern: p.to_string(),
            content: "bar".to_string(),
        };
        assert_eq!(ops("@match \"^foo\"\nbar\n"), vec![expected("^foo")]);
        assert_eq!(ops("@match '^foo'\nbar\n"), vec![expected("^foo")]);
        assert_eq!(ops("@match ^foo = .*\nbar\n"), vec![expected("^foo = .*")]);
    }

    #[test]
    fn test_malformed_directives_dropped_with_their_blocks() {
        let source = "@line abc\ndropped\n@line 0\nalso dropped\n@lines 1-\nnope\n@colour\nnope\n@append\nkept\n";
        assert_eq!(
            ops(source),
            vec![Operation::Append {
                content: "kept".to_string()
            }]
        );
    }

    #[test]
    fn test_indented_marker_is_content() {
        let source = "@append\n  @line 3\n";
        assert_eq!(
            ops(source),
            vec![Operation::Append {
                content: "  @line 3".to_string()
            }]
        );
    }

    #[test]
    fn test_lines_trailing_text_ignored_when_lenient() {
        let expected = vec![Operation::LineRange {
            start: 2,
            end: 4,
            content: "X".to_string(),
        }];
        assert_eq!(ops("@lines 2-4  # swap fg/bg\nX\n"), expected);
        assert_eq!(ops("@lines 2-4-6\nX\n"), expected);
    }

    #[test]
    fn test_lines_trailing_text_reported_when_strict() {
        let source = "@lines 2-4  # swap fg/bg\nX\n";
        let errors = parse_strict(source).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors[0],
            ParseError::InvalidArgument { directive, line: 1, .. } if directive == "lines"
        ));
    }

    #[test]
    fn test_leading_zeros_accepted() {
        assert_eq!(
            ops("@lines 02-04\nx\n"),
            vec![Operation::LineRange {
                start: 2,
                end: 4,
                content: "x".to_string()
            }]
        );
    }

    #[test]
    fn test_spans_point_at_directive_line() {
        let source = "# c\n@append\nx\n";
        let template = parse(source);
        let span = template.operations[0].span.clone();
        assert_eq!(&source[span], "@append");
    }

    #[test]
    fn test_strict_reports_every_problem() {
        let source = "stray\n@line abc\nx\n@bogus\ny\n@lines 3\nz\n@append\nok\n";
        let errors = parse_strict(source).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(matches!(errors[0], ParseError::StrayText { line: 1, .. }));
        assert!(matches!(
            &errors[1],
            ParseError::InvalidArgument { directive, line: 2, .. } if directive == "line"
        ));
        assert!(matches!(
            &errors[2],
            ParseError::UnknownDirective { name, line: 4, .. } if name == "bogus"
        ));
        assert!(matches!(
            &errors[3],
            ParseError::InvalidArgument { directive, line: 6, .. } if directive == "lines"
        ));
    }

    #[test]
    fn test_strict_argument_span_points_into_argument() {
        let source = "@line 1x\nfoo\n";
        let errors = parse_strict(source).unwrap_err();
        let span = errors[0].span();
        assert_eq!(&source[span], "x");
    }

    #[test]
    fn test_strict_zero_line() {
        let errors = parse_strict("@line 0\nfoo\n").unwrap_err();
        match &errors[0] {
            ParseError::InvalidArgument { message, .. } => {
                assert_eq!(message, "line numbers start at 1")
            }
            other => panic!("Expected InvalidArgument, got {:?}", other),
        }
    }

    #[test]
    fn test_strict_accepts_valid_template() {
        let template = parse_strict("# theme\n@target x\n@append\ny\n").expect("Should parse");
        assert_eq!(template.operations.len(), 1);
    }

    #[test]
    fn test_parse_with_mode() {
        let source = "@bogus\n@append\nx\n";
        assert!(parse_with_mode(source, ParseMode::Lenient).is_ok());
        assert!(parse_with_mode(source, ParseMode::Strict).is_err());
    }
}
