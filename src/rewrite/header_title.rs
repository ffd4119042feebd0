//! Replace `headerTitleStyle` objects with a custom header title component.
//!
//! React Navigation ignores `allowFontScaling` inside `headerTitleStyle`, so
//! a style object carrying it is swapped for a `headerTitle` render function
//! backed by a `<Text allowFontScaling={false}>` component declared in the
//! same file. The file is expected to import `Text` already.

use crate::edit::Edit;
use crate::pool;
use crate::rewrite::{line_ending, locate, Rewrite, RewriteError};
use crate::syntax::{queries, Construct, QueryEngine, SourceLang, SyntaxError};

#[derive(Debug, Clone)]
pub struct HeaderTitleHoister {
    style_key: String,
    attribute_name: String,
    component: String,
}

impl Default for HeaderTitleHoister {
    fn default() -> Self {
        Self {
            style_key: "headerTitleStyle".to_string(),
            attribute_name: "allowFontScaling".to_string(),
            component: "HeaderTitle".to_string(),
        }
    }
}

/// Where the component definition goes.
#[derive(Debug, PartialEq, Eq)]
enum Anchor {
    Declared,
    AfterImport(usize),
    Top,
}

impl HeaderTitleHoister {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            ..Self::default()
        }
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    pub fn marker(&self) -> String {
        self.style_key.clone()
    }

    pub fn rewrite(&self, lang: SourceLang, source: &str) -> Result<Rewrite, RewriteError> {
        if !lang.supports_jsx() {
            return Rewrite::from_edits(source, Vec::new(), 0);
        }

        let spans = locate(lang, source, &Construct::object_key(&self.style_key))?;

        let mut edits = Vec::new();
        let mut covered = 0;
        for span in spans.iter().filter(|s| s.has_entry(&self.attribute_name)) {
            if span.byte_start < covered {
                continue;
            }
            let end = span.trailing_comma_end.unwrap_or(span.byte_end);
            let comma = if span.trailing_comma_end.is_some() { "," } else { "" };
            edits.push(Edit::new(
                "",
                span.byte_start,
                end,
                format!("headerTitle: (props) => <{} {{...props}} />{comma}", self.component),
                &source[span.byte_start..end],
            ));
            covered = end;
        }

        let count = edits.len();
        if count > 0 {
            let eol = line_ending(source);
            let definition = self.definition(eol);
            match self.anchor(lang, source)? {
                Anchor::Declared => {}
                Anchor::AfterImport(at) => {
                    edits.push(Edit::insert("", at, format!("{eol}{eol}{definition}")))
                }
                Anchor::Top => edits.push(Edit::insert("", 0, format!("{definition}{eol}{eol}"))),
            }
        }

        tracing::debug!(component = %self.component, replaced = count, "hoist header title");

        Rewrite::from_edits(source, edits, count)
    }

    fn anchor(&self, lang: SourceLang, source: &str) -> Result<Anchor, RewriteError> {
        let anchor = pool::with_parser(lang, |parser| {
            let parsed = parser.parse_with_source(source)?;

            let declarations = QueryEngine::new(lang, &queries::declaration_of(&self.component))?;
            if !declarations.capture_nodes(&parsed, "declaration").is_empty() {
                return Ok(Anchor::Declared);
            }

            let imports = QueryEngine::new(lang, queries::IMPORTS)?;
            Ok::<_, SyntaxError>(
                imports
                    .capture_nodes(&parsed, "import")
                    .last()
                    .map(|n| Anchor::AfterImport(n.end_byte()))
                    .unwrap_or(Anchor::Top),
            )
        })??;
        Ok(anchor)
    }

    fn definition(&self, eol: &str) -> String {
        format!(
            "// Header title that ignores the system font scale
const {name} = ({{ children, style }}) => (
  <Text
    allowFontScaling={{false}}
    style={{[{{ fontSize: 17, fontWeight: 'bold', color: '#fff' }}, style]}}
  >
    {{children}}
  </Text>
);",
            name = self.component
        )
        .replace('\n', eol)
    }
}
