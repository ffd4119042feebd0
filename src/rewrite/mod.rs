//! Source rewrites.
//!
//! Each rewrite locates constructs in the syntax tree, turns them into
//! verified [`Edit`]s and applies them in memory. The result carries the
//! edits (so the driver can re-verify them against disk), the rewritten text,
//! and the number of constructs changed.

pub mod header_title;
pub mod inject;
pub mod revert;

pub use header_title::HeaderTitleHoister;
pub use inject::{inject, Injector};
pub use revert::{revert, RevertPolicy, Reverter};

use crate::edit::{self, Edit, EditError};
use crate::pool;
use crate::syntax::{locate_all, Construct, MatchSpan, SourceLang, SyntaxError};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RewriteError {
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    #[error("edit error: {0}")]
    Edit(#[from] EditError),
}

/// The key/value pair a rewrite inserts or removes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// JSX form: `allowFontScaling={false}`
    pub fn jsx(&self) -> String {
        format!("{}={{{}}}", self.name, self.value)
    }

    /// Object-literal form: `allowFontScaling: false`
    pub fn object_entry(&self) -> String {
        format!("{}: {}", self.name, self.value)
    }

    /// Whether a JSX attribute value (`{false}`, `{ false }`) is this value.
    pub(crate) fn matches_jsx_value(&self, written: &str) -> bool {
        strip_whitespace(written) == strip_whitespace(&format!("{{{}}}", self.value))
    }

    /// Whether an object entry value (`false`) is this value.
    pub(crate) fn matches_object_value(&self, written: &str) -> bool {
        strip_whitespace(written) == strip_whitespace(&self.value)
    }
}

impl Default for Attribute {
    fn default() -> Self {
        Attribute::new("allowFontScaling", "false")
    }
}

fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Outcome of one rewrite over one source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    /// Verified edits against the original text; `file` is unset
    pub edits: Vec<Edit>,
    /// The rewritten text
    pub output: String,
    /// Number of constructs changed
    pub count: usize,
}

impl Rewrite {
    fn from_edits(source: &str, edits: Vec<Edit>, count: usize) -> Result<Self, RewriteError> {
        let output = if edits.is_empty() {
            source.to_string()
        } else {
            edit::apply_to_str(source, &edits)?
        };
        Ok(Self {
            edits,
            output,
            count,
        })
    }

    pub fn is_noop(&self) -> bool {
        self.count == 0
    }

    /// The edits, bound to a file on disk.
    pub fn edits_for(&self, file: &Path) -> Vec<Edit> {
        self.edits
            .iter()
            .cloned()
            .map(|mut e| {
                e.file = file.to_path_buf();
                e
            })
            .collect()
    }
}

/// One of the supported rewrites, as configured for a run.
#[derive(Debug, Clone)]
pub enum Transform {
    Inject(Injector),
    Revert(Reverter),
    HoistHeaderTitle(HeaderTitleHoister),
}

impl Transform {
    /// Substring whose absence means the file cannot change.
    pub fn marker(&self) -> String {
        match self {
            Transform::Inject(t) => t.marker(),
            Transform::Revert(t) => t.marker(),
            Transform::HoistHeaderTitle(t) => t.marker(),
        }
    }

    pub fn rewrite(&self, lang: SourceLang, source: &str) -> Result<Rewrite, RewriteError> {
        match self {
            Transform::Inject(t) => t.rewrite(lang, source),
            Transform::Revert(t) => t.rewrite(lang, source),
            Transform::HoistHeaderTitle(t) => t.rewrite(lang, source),
        }
    }

    /// What one counted change is, for reports ("Text elements updated").
    pub fn unit(&self) -> String {
        match self {
            Transform::Inject(t) => format!("{} updated", t.construct_label()),
            Transform::Revert(t) => format!("{} attributes removed", t.attribute().name),
            Transform::HoistHeaderTitle(_) => "navigation headers converted".to_string(),
        }
    }
}

/// Parse `source` with the pooled parser and locate a construct.
fn locate(
    lang: SourceLang,
    source: &str,
    construct: &Construct,
) -> Result<Vec<MatchSpan>, RewriteError> {
    let spans = pool::with_parser(lang, |parser| {
        let parsed = parser.parse_with_source(source)?;
        locate_all(&parsed, construct)
    })??;
    Ok(spans)
}

/// The line ending a file already uses: `\r\n` when its first line ends
/// that way, `\n` otherwise.
pub(crate) fn line_ending(source: &str) -> &'static str {
    match source.find('\n') {
        Some(at) if source[..at].ends_with('\r') => "\r\n",
        _ => "\n",
    }
}
