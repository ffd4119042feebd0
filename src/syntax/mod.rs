//! Tree-sitter integration for React Native sources.
//!
//! Parses JavaScript, TypeScript and TSX with the grammars bundled in
//! `ast-grep-language` and locates rewrite targets (JSX elements, style
//! object keys) as owned byte spans, so edits never depend on regex
//! heuristics about tag or brace boundaries.

pub mod errors;
pub mod lang;
pub mod locator;
pub mod parser;
pub mod query;

pub use errors::SyntaxError;
pub use lang::SourceLang;
pub use locator::{locate_all, Construct, ConstructKind, Entry, MatchSpan};
pub use parser::{ErrorNode, ParsedSource, SourceParser};
pub use query::{queries, QueryEngine};
