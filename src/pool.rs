//! Thread-local parser pooling.
//!
//! A directory run parses hundreds of screens; each thread keeps one parser
//! per language and reuses it for every file.

use crate::syntax::{SourceLang, SourceParser, SyntaxError};
use std::cell::RefCell;
use std::collections::HashMap;

thread_local! {
    static PARSERS: RefCell<HashMap<SourceLang, SourceParser>> = RefCell::new(HashMap::new());
}

/// Execute function with a pooled parser for `lang`.
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use fontscale_patcher::pool::with_parser;
/// use fontscale_patcher::syntax::SourceLang;
///
/// let has_errors = with_parser(SourceLang::JavaScript, |parser| {
///     parser.parse_with_source("<Text>Hi</Text>").map(|p| p.has_errors())
/// })??;
/// # Ok(())
/// # }
/// ```
pub fn with_parser<F, R>(lang: SourceLang, f: F) -> Result<R, SyntaxError>
where
    F: FnOnce(&mut SourceParser) -> R,
{
    PARSERS.with(|cell| {
        let mut parsers = cell.borrow_mut();
        let parser = match parsers.entry(lang) {
            std::collections::hash_map::Entry::Occupied(e) => e.into_mut(),
            std::collections::hash_map::Entry::Vacant(e) => e.insert(SourceParser::new(lang)?),
        };
        Ok(f(parser))
    })
}
