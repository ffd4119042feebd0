//! Post-edit parse validation.
//!
//! After a rewrite, the new text is re-parsed. If it has more ERROR nodes
//! than the original, the rewrite is refused and the file stays as it was.
//! Files that already had syntax errors can still be rewritten as long as
//! the edit does not add new ones.

use crate::pool;
use crate::syntax::{ParsedSource, SourceLang, SyntaxError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Parse error introduced: {count} new ERROR nodes{}", first_location(.errors))]
    ParseErrorIntroduced {
        count: usize,
        errors: Vec<ErrorLocation>,
    },

    #[error("Syntax error: {0}")]
    Syntax(#[from] SyntaxError),
}

fn first_location(errors: &[ErrorLocation]) -> String {
    errors
        .first()
        .map(|e| format!(" (first at {}:{}: {})", e.line, e.column, e.context))
        .unwrap_or_default()
}

/// Location of an error node in the source.
#[derive(Debug, Clone)]
pub struct ErrorLocation {
    pub byte_start: usize,
    pub byte_end: usize,
    /// 1-based line
    pub line: usize,
    /// 1-based column
    pub column: usize,
    /// The offending source line, trimmed
    pub context: String,
}

/// Validate that source has no parse errors.
pub fn validate(lang: SourceLang, source: &str) -> Result<(), ValidationError> {
    let errors = pool::with_parser(lang, |parser| {
        parser
            .parse_with_source(source)
            .map(|parsed| collect_errors(&parsed))
    })??;

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::ParseErrorIntroduced {
            count: errors.len(),
            errors,
        })
    }
}

/// Check that `edited` does not have more parse errors than `original`.
pub fn validate_edit(lang: SourceLang, original: &str, edited: &str) -> Result<(), ValidationError> {
    let (original_count, edited_errors) = pool::with_parser(lang, |parser| {
        let original_count = parser.parse_with_source(original)?.error_nodes().len();
        let edited = parser.parse_with_source(edited)?;
        Ok::<_, SyntaxError>((original_count, collect_errors(&edited)))
    })??;

    if edited_errors.len() > original_count {
        return Err(ValidationError::ParseErrorIntroduced {
            count: edited_errors.len() - original_count,
            errors: edited_errors,
        });
    }

    Ok(())
}

fn collect_errors(parsed: &ParsedSource<'_>) -> Vec<ErrorLocation> {
    if !parsed.has_errors() {
        return Vec::new();
    }
    parsed
        .error_nodes()
        .into_iter()
        .map(|node| {
            let line_text = parsed
                .source
                .lines()
                .nth(node.start_point.row)
                .unwrap_or("")
                .trim();
            ErrorLocation {
                byte_start: node.byte_start,
                byte_end: node.byte_end,
                line: node.start_point.row + 1,
                column: node.start_point.column + 1,
                context: line_text.chars().take(80).collect(),
            }
        })
        .collect()
}
