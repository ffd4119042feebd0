use crate::syntax::lang::SourceLang;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyntaxError {
    #[error("failed to set {lang} language for parser")]
    LanguageSet { lang: SourceLang },

    #[error("failed to parse {lang} source")]
    ParseFailed { lang: SourceLang },

    #[error("invalid tree-sitter query for {lang}: {message}")]
    InvalidQuery { lang: SourceLang, message: String },
}
