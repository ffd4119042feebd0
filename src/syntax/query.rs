use crate::syntax::errors::SyntaxError;
use crate::syntax::lang::SourceLang;
use crate::syntax::parser::ParsedSource;
use ast_grep_language::LanguageExt;
use tree_sitter::{Node, Query, QueryCursor, StreamingIterator};

/// A tree-sitter query compiled for one grammar.
///
/// Queries are compiled per language: the TypeScript grammar has no JSX
/// node types, so a JSX query fails to compile there.
pub struct QueryEngine {
    query: Query,
}

impl QueryEngine {
    /// Compile `query_str` for `lang`.
    ///
    /// ```text
    /// (jsx_opening_element
    ///   name: (_) @name
    ///   (#eq? @name "Text")) @element
    /// ```
    pub fn new(lang: SourceLang, query_str: &str) -> Result<Self, SyntaxError> {
        let language = lang.support_lang().get_ts_language();
        let query = Query::new(&language, query_str).map_err(|e| SyntaxError::InvalidQuery {
            lang,
            message: e.to_string(),
        })?;
        Ok(Self { query })
    }

    /// Collect the nodes bound to one capture, in document order, without
    /// duplicates.
    pub fn capture_nodes<'t>(&self, parsed: &'t ParsedSource<'_>, capture: &str) -> Vec<Node<'t>> {
        let Some(index) = self.query.capture_index_for_name(capture) else {
            return Vec::new();
        };

        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&self.query, parsed.root_node(), parsed.source.as_bytes());

        let mut nodes = Vec::new();
        while let Some(m) = matches.next() {
            nodes.extend(
                m.captures
                    .iter()
                    .filter(|c| c.index == index)
                    .map(|c| c.node),
            );
        }

        nodes.sort_by_key(|n| (n.start_byte(), n.end_byte()));
        nodes.dedup_by_key(|n| n.id());
        nodes
    }
}

/// Queries for the React Native constructs this crate rewrites.
pub mod queries {
    /// JSX opening and self-closing elements with the given tag name.
    pub fn elements_named(name: &str) -> String {
        format!(
            r#"(jsx_opening_element
                name: (_) @name
                (#eq? @name {name:?})
            ) @element
            (jsx_self_closing_element
                name: (_) @name
                (#eq? @name {name:?})
            ) @element"#
        )
    }

    /// Every named JSX opening and self-closing element.
    pub const ALL_ELEMENTS: &str = r#"(jsx_opening_element
        name: (_) @name
    ) @element
    (jsx_self_closing_element
        name: (_) @name
    ) @element"#;

    /// Object properties whose value is an object literal.
    ///
    /// Keys may be identifiers or quoted strings, so the key is filtered by
    /// the caller after unquoting.
    pub const OBJECT_VALUED_PAIRS: &str = r#"(pair
        key: (_) @key
        value: (object) @object
    ) @pair"#;

    /// Top-level import statements.
    pub const IMPORTS: &str = r#"(import_statement) @import"#;

    /// A variable, function or import binding the given name.
    pub fn declaration_of(name: &str) -> String {
        format!(
            r#"(variable_declarator
                name: (identifier) @name
                (#eq? @name {name:?})
            ) @declaration
            (function_declaration
                name: (identifier) @name
                (#eq? @name {name:?})
            ) @declaration
            (import_clause
                (identifier) @name
                (#eq? @name {name:?})
            ) @declaration
            (import_specifier
                (identifier) @name
                (#eq? @name {name:?})
            ) @declaration"#
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parser::SourceParser;

    fn texts<'a>(parsed: &ParsedSource<'a>, nodes: &[Node<'_>]) -> Vec<&'a str> {
        nodes.iter().map(|n| parsed.node_text(*n)).collect()
    }

    #[test]
    fn finds_elements_by_name() {
        let mut parser = SourceParser::new(SourceLang::JavaScript).unwrap();
        let source = r#"
const Row = () => (
  <View>
    <Text style={styles.name}>Lakers</Text>
    <TextInput value={query} />
    <Text />
  </View>
);
"#;
        let parsed = parser.parse_with_source(source).unwrap();
        let engine = QueryEngine::new(SourceLang::JavaScript, &queries::elements_named("Text"))
            .unwrap();

        let elements = engine.capture_nodes(&parsed, "element");
        assert_eq!(
            texts(&parsed, &elements),
            ["<Text style={styles.name}>", "<Text />"]
        );
        let names = engine.capture_nodes(&parsed, "name");
        assert!(texts(&parsed, &names).iter().all(|n| *n == "Text"));
    }

    #[test]
    fn capture_nodes_in_document_order() {
        let mut parser = SourceParser::new(SourceLang::Tsx).unwrap();
        let source = "const a = <><Text>1</Text><Text>2</Text></>;";
        let parsed = parser.parse_with_source(source).unwrap();
        let engine = QueryEngine::new(SourceLang::Tsx, &queries::elements_named("Text")).unwrap();

        let nodes = engine.capture_nodes(&parsed, "element");
        assert_eq!(nodes.len(), 2);
        assert!(nodes[0].start_byte() < nodes[1].start_byte());
        assert_eq!(engine.capture_nodes(&parsed, "missing").len(), 0);
    }

    #[test]
    fn object_pairs_query() {
        let mut parser = SourceParser::new(SourceLang::TypeScript).unwrap();
        let source = r#"
const options = {
  headerTitleStyle: { fontWeight: 'bold' },
  'headerStyle': { backgroundColor: '#000' },
  title: 'Scores',
};
"#;
        let parsed = parser.parse_with_source(source).unwrap();
        let engine = QueryEngine::new(SourceLang::TypeScript, queries::OBJECT_VALUED_PAIRS).unwrap();

        let keys = engine.capture_nodes(&parsed, "key");
        assert_eq!(texts(&parsed, &keys), ["headerTitleStyle", "'headerStyle'"]);
        assert_eq!(engine.capture_nodes(&parsed, "pair").len(), 2);
    }

    #[test]
    fn jsx_query_rejected_by_typescript_grammar() {
        let result = QueryEngine::new(SourceLang::TypeScript, queries::ALL_ELEMENTS);
        assert!(matches!(result, Err(SyntaxError::InvalidQuery { .. })));
    }

    #[test]
    fn declaration_query() {
        let mut parser = SourceParser::new(SourceLang::JavaScript).unwrap();
        let source = "import Logo from './Logo';\nconst HeaderTitle = (props) => null;\nfunction Other() {}\n";
        let parsed = parser.parse_with_source(source).unwrap();

        for name in ["HeaderTitle", "Other", "Logo"] {
            let engine =
                QueryEngine::new(SourceLang::JavaScript, &queries::declaration_of(name)).unwrap();
            assert_eq!(engine.capture_nodes(&parsed, "declaration").len(), 1, "{name}");
        }

        let engine =
            QueryEngine::new(SourceLang::JavaScript, &queries::declaration_of("Missing")).unwrap();
        assert!(engine.capture_nodes(&parsed, "declaration").is_empty());
    }
}
