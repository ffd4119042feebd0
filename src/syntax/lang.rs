//! Source language detection.
//!
//! React Native projects mix `.js`, `.jsx`, `.ts` and `.tsx`. Plain `.ts`
//! files use the TypeScript grammar, which has no JSX; everything that may
//! carry JSX is parsed with a JSX-capable grammar.

pub use ast_grep_language::SupportLang;
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceLang {
    JavaScript,
    TypeScript,
    Tsx,
}

impl SourceLang {
    /// Pick the grammar for a file by extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        match ext.to_ascii_lowercase().as_str() {
            "js" | "jsx" | "mjs" | "cjs" => Some(SourceLang::JavaScript),
            "ts" | "mts" | "cts" => Some(SourceLang::TypeScript),
            "tsx" => Some(SourceLang::Tsx),
            _ => None,
        }
    }

    /// Grammar used when the extension is unknown. TSX accepts both JSX and
    /// type annotations, so it is the most permissive choice.
    pub fn fallback() -> Self {
        SourceLang::Tsx
    }

    /// The ast-grep language carrying the tree-sitter grammar.
    pub fn support_lang(self) -> SupportLang {
        match self {
            SourceLang::JavaScript => SupportLang::JavaScript,
            SourceLang::TypeScript => SupportLang::TypeScript,
            SourceLang::Tsx => SupportLang::Tsx,
        }
    }

    /// Whether the grammar has JSX element nodes.
    pub fn supports_jsx(self) -> bool {
        !matches!(self, SourceLang::TypeScript)
    }
}

impl fmt::Display for SourceLang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceLang::JavaScript => "javascript",
            SourceLang::TypeScript => "typescript",
            SourceLang::Tsx => "tsx",
        };
        f.write_str(name)
    }
}
