use crate::syntax::errors::SyntaxError;
use crate::syntax::lang::SourceLang;
use ast_grep_language::LanguageExt;
use tree_sitter::{Parser, Tree};

/// Tree-sitter parser wrapper bound to one source language.
pub struct SourceParser {
    parser: Parser,
    lang: SourceLang,
}

impl SourceParser {
    pub fn new(lang: SourceLang) -> Result<Self, SyntaxError> {
        let mut parser = Parser::new();
        // Get the tree-sitter Language from ast-grep-language
        let ts_lang = lang.support_lang().get_ts_language();
        parser
            .set_language(&ts_lang)
            .map_err(|_| SyntaxError::LanguageSet { lang })?;

        Ok(Self { parser, lang })
    }

    pub fn lang(&self) -> SourceLang {
        self.lang
    }

    /// Parse source code into a tree-sitter Tree.
    ///
    /// Tree-sitter recovers from syntax errors, so this only fails when the
    /// parser itself gives up (cancellation or timeout).
    pub fn parse(&mut self, source: &str) -> Result<Tree, SyntaxError> {
        self.parser
            .parse(source, None)
            .ok_or(SyntaxError::ParseFailed { lang: self.lang })
    }

    /// Parse source code and return the tree along with the source.
    pub fn parse_with_source<'a>(
        &mut self,
        source: &'a str,
    ) -> Result<ParsedSource<'a>, SyntaxError> {
        let tree = self.parse(source)?;
        Ok(ParsedSource {
            source,
            tree,
            lang: self.lang,
        })
    }
}

/// A parsed source file with its tree-sitter tree.
pub struct ParsedSource<'a> {
    pub source: &'a str,
    pub tree: Tree,
    pub lang: SourceLang,
}

impl<'a> ParsedSource<'a> {
    pub fn root_node(&self) -> tree_sitter::Node<'_> {
        self.tree.root_node()
    }

    /// Check if the tree contains any ERROR or MISSING nodes.
    pub fn has_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }

    /// Get all ERROR and MISSING nodes in the tree, in document order.
    pub fn error_nodes(&self) -> Vec<ErrorNode> {
        let mut errors = Vec::new();
        collect_error_nodes(self.tree.root_node(), &mut errors);
        errors
    }

    /// Extract text for a node's byte range.
    pub fn node_text(&self, node: tree_sitter::Node<'_>) -> &'a str {
        &self.source[node.byte_range()]
    }
}

/// Information about an ERROR node in the parse tree.
#[derive(Debug, Clone)]
pub struct ErrorNode {
    pub byte_start: usize,
    pub byte_end: usize,
    pub start_point: tree_sitter::Point,
    pub end_point: tree_sitter::Point,
}

fn collect_error_nodes(node: tree_sitter::Node<'_>, errors: &mut Vec<ErrorNode>) {
    if node.is_error() || node.is_missing() {
        errors.push(ErrorNode {
            byte_start: node.start_byte(),
            byte_end: node.end_byte(),
            start_point: node.start_position(),
            end_point: node.end_position(),
        });
    }

    // Subtrees without errors need no descent
    if !node.has_error() {
        return;
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_error_nodes(child, errors);
    }
}
