use crate::edit::Edit;
use crate::rewrite::{locate, Attribute, Rewrite, RewriteError};
use crate::syntax::{Construct, ConstructKind, Entry, MatchSpan, SourceLang};

/// Which element occurrences a revert may remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RevertPolicy {
    /// Only the last attribute of a tag, and only when another attribute
    /// precedes it. A sole attribute is left in place.
    #[default]
    Trailing,

    /// Every matching attribute, wherever it sits in the tag.
    Any,
}

/// Removes a previously injected attribute.
#[derive(Debug, Clone)]
pub struct Reverter {
    scope: Construct,
    attribute: Attribute,
    policy: RevertPolicy,
}

impl Reverter {
    /// Revert `attribute` from every JSX element.
    pub fn new(attribute: Attribute) -> Self {
        Self {
            scope: Construct::AnyElement,
            attribute,
            policy: RevertPolicy::default(),
        }
    }

    pub fn with_scope(mut self, scope: Construct) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_policy(mut self, policy: RevertPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn attribute(&self) -> &Attribute {
        &self.attribute
    }

    pub fn marker(&self) -> String {
        self.attribute.name.clone()
    }

    pub fn rewrite(&self, lang: SourceLang, source: &str) -> Result<Rewrite, RewriteError> {
        let spans = locate(lang, source, &self.scope)?;

        let mut edits = Vec::new();
        for span in &spans {
            match span.kind {
                ConstructKind::Element => {
                    for entry in self.element_removals(span) {
                        edits.push(removal(source, entry.removal_start, entry.removal_end));
                    }
                }
                ConstructKind::Object => {
                    // Duplicate keys are left alone; their removal spans overlap.
                    if let Some(entry) = span.entries.iter().find(|e| self.matches_object(e)) {
                        let (start, end) = object_removal(source, entry);
                        edits.push(removal(source, start, end));
                    }
                }
            }
        }

        tracing::debug!(
            scope = ?self.scope,
            policy = ?self.policy,
            found = spans.len(),
            removed = edits.len(),
            "revert"
        );

        let count = edits.len();
        Rewrite::from_edits(source, edits, count)
    }

    fn element_removals<'s>(&self, span: &'s MatchSpan) -> Vec<&'s Entry> {
        match self.policy {
            RevertPolicy::Trailing => span
                .entries
                .split_last()
                .filter(|(last, rest)| !rest.is_empty() && self.matches_element(last))
                .map(|(last, _)| vec![last])
                .unwrap_or_default(),
            RevertPolicy::Any => span
                .entries
                .iter()
                .filter(|e| self.matches_element(e))
                .collect(),
        }
    }

    fn matches_element(&self, entry: &Entry) -> bool {
        entry.name.as_deref() == Some(self.attribute.name.as_str())
            && entry
                .value
                .as_deref()
                .is_some_and(|v| self.attribute.matches_jsx_value(v))
    }

    fn matches_object(&self, entry: &Entry) -> bool {
        entry.name.as_deref() == Some(self.attribute.name.as_str())
            && entry
                .value
                .as_deref()
                .is_some_and(|v| self.attribute.matches_object_value(v))
    }
}

/// Revert `attribute` from every JSX element under the default policy.
///
/// The returned count is the number of attributes removed. A value written
/// with extra whitespace such as `{ false }` still counts as one removal,
/// even though the literal `attr={false}` text never occurred.
pub fn revert(lang: SourceLang, source: &str, attribute: &Attribute) -> Result<Rewrite, RewriteError> {
    Reverter::new(attribute.clone()).rewrite(lang, source)
}

fn removal(source: &str, start: usize, end: usize) -> Edit {
    Edit::new("", start, end, "", &source[start..end])
}

/// `{a: 1, b: 2}` removing `a` also drops the space after its comma.
fn object_removal(source: &str, entry: &Entry) -> (usize, usize) {
    let mut end = entry.removal_end;
    if entry.removal_start == entry.byte_start && end > entry.byte_end {
        end += source[end..].len() - source[end..].trim_start_matches(' ').len();
    }
    (entry.removal_start, end)
}
