use crate::syntax::errors::SyntaxError;
use crate::syntax::parser::ParsedSource;
use crate::syntax::query::{queries, QueryEngine};
use tree_sitter::Node;

/// A syntactic unit targeted for rewriting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Construct {
    /// JSX elements whose tag name equals `name` (e.g. `Text`, `Animated.Text`)
    Element { name: String },

    /// Every named JSX element
    AnyElement,

    /// Object properties `key: { ... }` whose value is an object literal
    ObjectKey { key: String },
}

/// Whether a construct lives in JSX or in an object literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstructKind {
    Element,
    Object,
}

impl Construct {
    pub fn element(name: impl Into<String>) -> Self {
        Construct::Element { name: name.into() }
    }

    pub fn object_key(key: impl Into<String>) -> Self {
        Construct::ObjectKey { key: key.into() }
    }

    pub fn kind(&self) -> ConstructKind {
        match self {
            Construct::Element { .. } | Construct::AnyElement => ConstructKind::Element,
            Construct::ObjectKey { .. } => ConstructKind::Object,
        }
    }

    /// Substring that must appear in a file for this construct to occur.
    pub fn marker(&self) -> String {
        match self {
            Construct::Element { name } => format!("<{name}"),
            Construct::AnyElement => "<".to_string(),
            Construct::ObjectKey { key } => key.clone(),
        }
    }

    /// Convert to a tree-sitter query string.
    pub fn to_query(&self) -> String {
        match self {
            Construct::Element { name } => queries::elements_named(name),
            Construct::AnyElement => queries::ALL_ELEMENTS.to_string(),
            Construct::ObjectKey { .. } => queries::OBJECT_VALUED_PAIRS.to_string(),
        }
    }

    fn root_capture(&self) -> &'static str {
        match self.kind() {
            ConstructKind::Element => "element",
            ConstructKind::Object => "pair",
        }
    }
}

/// One attribute of an element, or one entry of an object literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Attribute or key name; `None` for spreads and computed keys
    pub name: Option<String>,
    /// Value text as written (`{false}`, `"x"`, `false`), if any
    pub value: Option<String>,
    pub byte_start: usize,
    pub byte_end: usize,
    /// Span that deletes this entry together with its separator, leaving
    /// the surrounding text as it was before the entry was written.
    pub removal_start: usize,
    pub removal_end: usize,
}

/// A located construct occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSpan {
    pub kind: ConstructKind,
    /// Tag name or property key (unquoted)
    pub name: String,
    /// Span of the whole construct: the opening tag, or the `key: {...}` pair
    pub byte_start: usize,
    pub byte_end: usize,
    /// End of the comma following an object pair, if any
    pub trailing_comma_end: Option<usize>,
    /// Attributes or object entries, in document order
    pub entries: Vec<Entry>,
    /// Where a new element attribute goes (after the last attribute or the
    /// tag name), or the end of an object's opening brace
    pub insert_at: usize,
    /// Start of the closing `>`/`/>` of a tag, or of an object's `}`
    pub close_start: usize,
}

impl MatchSpan {
    /// Find the entry with the given name.
    pub fn entry(&self, name: &str) -> Option<(usize, &Entry)> {
        self.entries
            .iter()
            .enumerate()
            .find(|(_, e)| e.name.as_deref() == Some(name))
    }

    pub fn has_entry(&self, name: &str) -> bool {
        self.entry(name).is_some()
    }
}

/// Locate every occurrence of a construct in parsed source.
///
/// Element constructs find nothing in grammars without JSX.
pub fn locate_all(
    parsed: &ParsedSource<'_>,
    construct: &Construct,
) -> Result<Vec<MatchSpan>, SyntaxError> {
    if construct.kind() == ConstructKind::Element && !parsed.lang.supports_jsx() {
        return Ok(Vec::new());
    }

    let engine = QueryEngine::new(parsed.lang, &construct.to_query())?;
    let nodes = engine.capture_nodes(parsed, construct.root_capture());

    let spans = match construct {
        Construct::Element { .. } | Construct::AnyElement => {
            nodes.into_iter().filter_map(|n| element_span(parsed, n)).collect()
        }
        Construct::ObjectKey { key } => nodes
            .into_iter()
            .filter_map(|n| object_span(parsed, n))
            .filter(|span| &span.name == key)
            .collect(),
    };

    Ok(spans)
}

fn element_span(parsed: &ParsedSource<'_>, element: Node<'_>) -> Option<MatchSpan> {
    let name_node = element.child_by_field_name("name")?;

    let mut insert_at = name_node.end_byte();
    let mut entries = Vec::new();

    let mut cursor = element.walk();
    for child in element.named_children(&mut cursor) {
        if child.kind() == "comment" {
            continue;
        }
        insert_at = insert_at.max(child.end_byte());

        match child.kind() {
            "jsx_attribute" => {
                let mut attr_cursor = child.walk();
                let mut parts = child
                    .named_children(&mut attr_cursor)
                    .map(|n| parsed.node_text(n).to_string());
                let name = parts.next();
                let value = parts.next();
                entries.push(element_entry(child, name, value));
            }
            "jsx_expression" => entries.push(element_entry(child, None, None)),
            _ => {}
        }
    }

    // `>` closes opening elements, `/>` self-closing ones
    let close_start = last_token_start(element, &["/>", "/", ">"]).unwrap_or(element.end_byte());

    Some(MatchSpan {
        kind: ConstructKind::Element,
        name: parsed.node_text(name_node).to_string(),
        byte_start: element.start_byte(),
        byte_end: element.end_byte(),
        trailing_comma_end: None,
        entries,
        insert_at,
        close_start,
    })
}

fn element_entry(attr: Node<'_>, name: Option<String>, value: Option<String>) -> Entry {
    let removal_start = attr
        .prev_sibling()
        .map(|p| p.end_byte())
        .unwrap_or(attr.start_byte());

    Entry {
        name,
        value,
        byte_start: attr.start_byte(),
        byte_end: attr.end_byte(),
        removal_start,
        removal_end: attr.end_byte(),
    }
}

fn object_span(parsed: &ParsedSource<'_>, pair: Node<'_>) -> Option<MatchSpan> {
    let key = pair.child_by_field_name("key")?;
    let object = pair.child_by_field_name("value")?;
    if object.kind() != "object" {
        return None;
    }

    let mut cursor = object.walk();
    let tokens: Vec<Node<'_>> = object.children(&mut cursor).collect();
    let open = *tokens.first().filter(|t| t.kind() == "{")?;
    let close_start = tokens
        .last()
        .filter(|t| t.kind() == "}")
        .map(|t| t.start_byte())
        .unwrap_or(object.end_byte());

    let mut entries = Vec::new();
    for child in tokens.iter().copied().filter(|t| t.is_named()) {
        let name = match child.kind() {
            "pair" => child
                .child_by_field_name("key")
                .map(|k| unquote(parsed.node_text(k)).to_string()),
            "shorthand_property_identifier" => Some(parsed.node_text(child).to_string()),
            "method_definition" => child
                .child_by_field_name("name")
                .map(|k| unquote(parsed.node_text(k)).to_string()),
            "spread_element" => None,
            _ => continue,
        };
        let value = child
            .child_by_field_name("value")
            .map(|v| parsed.node_text(v).to_string());
        let (removal_start, removal_end) = object_entry_removal(child, open, close_start);

        entries.push(Entry {
            name,
            value,
            byte_start: child.start_byte(),
            byte_end: child.end_byte(),
            removal_start,
            removal_end,
        });
    }

    let trailing_comma_end = pair
        .next_sibling()
        .filter(|s| s.kind() == ",")
        .map(|s| s.end_byte());

    Some(MatchSpan {
        kind: ConstructKind::Object,
        name: unquote(parsed.node_text(key)).to_string(),
        byte_start: pair.start_byte(),
        byte_end: pair.end_byte(),
        trailing_comma_end,
        entries,
        insert_at: open.end_byte(),
        close_start,
    })
}

/// Removal span for an object entry.
///
/// `{\n  a: 1,\n  b: 2\n}` removing `a` drops "\n  a: 1,"; removing the last
/// entry `b` drops ",\n  b: 2"; removing the only entry empties the braces.
fn object_entry_removal(entry: Node<'_>, open: Node<'_>, close_start: usize) -> (usize, usize) {
    let prev = entry.prev_sibling();
    let next = entry.next_sibling();

    if let Some(comma) = next.filter(|n| n.kind() == ",") {
        let start = prev.map(|p| p.end_byte()).unwrap_or(open.end_byte());
        return (start, comma.end_byte());
    }

    if let Some(comma) = prev.filter(|p| p.kind() == ",") {
        return (comma.start_byte(), entry.end_byte());
    }

    (open.end_byte(), close_start)
}

fn last_token_start(node: Node<'_>, kinds: &[&str]) -> Option<usize> {
    let mut start = None;
    let mut cursor = node.walk();
    for child in node.children(&mut cursor).collect::<Vec<_>>().into_iter().rev() {
        if kinds.contains(&child.kind()) {
            start = Some(child.start_byte());
        } else {
            break;
        }
    }
    start
}

fn unquote(text: &str) -> &str {
    let bytes = text.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && matches!(first, b'"' | b'\'' | b'`') {
            return &text[1..text.len() - 1];
        }
    }
    text
}
