use crate::edit::Edit;
use crate::rewrite::{locate, Attribute, Rewrite, RewriteError};
use crate::syntax::{Construct, ConstructKind, MatchSpan, SourceLang};

/// Inserts a fixed attribute into every occurrence of a construct that does
/// not carry it yet.
#[derive(Debug, Clone)]
pub struct Injector {
    construct: Construct,
    attribute: Attribute,
}

impl Injector {
    pub fn new(construct: Construct, attribute: Attribute) -> Self {
        Self {
            construct,
            attribute,
        }
    }

    pub fn marker(&self) -> String {
        self.construct.marker()
    }

    pub(crate) fn construct_label(&self) -> String {
        match &self.construct {
            Construct::Element { name } => format!("{name} elements"),
            Construct::AnyElement => "elements".to_string(),
            Construct::ObjectKey { key } => format!("{key} objects"),
        }
    }

    pub fn rewrite(&self, lang: SourceLang, source: &str) -> Result<Rewrite, RewriteError> {
        let spans = locate(lang, source, &self.construct)?;

        let edits: Vec<Edit> = spans
            .iter()
            .filter(|span| !span.has_entry(&self.attribute.name))
            .map(|span| match span.kind {
                ConstructKind::Element => {
                    Edit::insert("", span.insert_at, format!(" {}", self.attribute.jsx()))
                }
                ConstructKind::Object => object_insertion(source, span, &self.attribute),
            })
            .collect();

        tracing::debug!(
            construct = ?self.construct,
            found = spans.len(),
            inserted = edits.len(),
            "inject"
        );

        let count = edits.len();
        Rewrite::from_edits(source, edits, count)
    }
}

/// Inject `attribute` into every un-patched occurrence of `construct`.
///
/// ```
/// use fontscale_patcher::rewrite::{inject, Attribute};
/// use fontscale_patcher::syntax::{Construct, SourceLang};
///
/// let rewrite = inject(
///     SourceLang::JavaScript,
///     "<Text>Hello</Text>",
///     &Construct::element("Text"),
///     &Attribute::default(),
/// )
/// .unwrap();
/// assert_eq!(rewrite.output, "<Text allowFontScaling={false}>Hello</Text>");
/// assert_eq!(rewrite.count, 1);
/// ```
pub fn inject(
    lang: SourceLang,
    source: &str,
    construct: &Construct,
    attribute: &Attribute,
) -> Result<Rewrite, RewriteError> {
    Injector::new(construct.clone(), attribute.clone()).rewrite(lang, source)
}

/// New entry right after the opening brace, following the object's layout.
fn object_insertion(source: &str, span: &MatchSpan, attribute: &Attribute) -> Edit {
    let entry = attribute.object_entry();

    let Some(first) = span.entries.first() else {
        let inner = &source[span.insert_at..span.close_start];
        if inner.trim().is_empty() {
            return Edit::new(
                "",
                span.insert_at,
                span.close_start,
                format!(" {entry} "),
                inner,
            );
        }
        return Edit::insert("", span.insert_at, format!(" {entry},"));
    };

    let gap = &source[span.insert_at..first.byte_start];
    let text = match gap.rfind('\n') {
        Some(newline) => {
            let eol = if gap[..newline].ends_with('\r') { "\r\n" } else { "\n" };
            let indent: String = gap[newline + 1..]
                .chars()
                .take_while(|c| c.is_whitespace())
                .collect();
            format!("{eol}{indent}{entry},")
        }
        None if gap.is_empty() => format!("{entry}, "),
        None => format!(" {entry},"),
    };

    Edit::insert("", span.insert_at, text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_injector() -> Injector {
        Injector::new(Construct::element("Text"), Attribute::default())
    }

    fn header_injector() -> Injector {
        Injector::new(
            Construct::object_key("headerTitleStyle"),
            Attribute::default(),
        )
    }

    #[test]
    fn injects_into_bare_tag() {
        let r = text_injector()
            .rewrite(SourceLang::JavaScript, "<Text>Hello</Text>")
            .unwrap();
        assert_eq!(r.output, "<Text allowFontScaling={false}>Hello</Text>");
        assert_eq!(r.count, 1);
    }

    #[test]
    fn appends_after_existing_attributes() {
        let r = text_injector()
            .rewrite(SourceLang::JavaScript, "<Text style={styles.title}>Hi</Text>")
            .unwrap();
        assert_eq!(
            r.output,
            "<Text style={styles.title} allowFontScaling={false}>Hi</Text>"
        );
    }

    #[test]
    fn self_closing_stays_well_formed() {
        let r = text_injector()
            .rewrite(SourceLang::Tsx, "const a = <Text style={s} />;")
            .unwrap();
        assert_eq!(r.output, "const a = <Text style={s} allowFontScaling={false} />;");
    }

    #[test]
    fn counts_every_occurrence_on_a_line() {
        let source = "const a = <View><Text>1</Text><Text>2</Text><Text>3</Text></View>;";
        let r = text_injector().rewrite(SourceLang::JavaScript, source).unwrap();
        assert_eq!(r.count, 3);
        assert_eq!(r.output.matches("allowFontScaling={false}").count(), 3);
    }

    #[test]
    fn nested_elements_each_patched_once() {
        let source = "const a = <Text>Outer <Text style={b}>inner</Text></Text>;";
        let r = text_injector().rewrite(SourceLang::JavaScript, source).unwrap();
        assert_eq!(
            r.output,
            "const a = <Text allowFontScaling={false}>Outer <Text style={b} allowFontScaling={false}>inner</Text></Text>;"
        );
        assert_eq!(r.count, 2);
    }

    #[test]
    fn skips_similar_tag_names() {
        let source = "const a = <View><TextInput value={v} /><Text>x</Text></View>;";
        let r = text_injector().rewrite(SourceLang::JavaScript, source).unwrap();
        assert_eq!(r.count, 1);
        assert!(r.output.contains("<TextInput value={v} />"));
    }

    #[test]
    fn already_patched_is_noop() {
        let source = "const a = <Text allowFontScaling={false}>x</Text>;\nconst b = <Text allowFontScaling={true} />;";
        let r = text_injector().rewrite(SourceLang::JavaScript, source).unwrap();
        assert!(r.is_noop());
        assert_eq!(r.output, source);
        assert!(r.edits.is_empty());
    }

    #[test]
    fn strings_and_comments_untouched() {
        let source = "// render <Text> here\nconst s = '<Text>';\nconst a = <Text>x</Text>;";
        let r = text_injector().rewrite(SourceLang::JavaScript, source).unwrap();
        assert_eq!(r.count, 1);
        assert!(r.output.starts_with("// render <Text> here\nconst s = '<Text>';"));
    }

    #[test]
    fn multiline_tag() {
        let source = "const a = (\n  <Text\n    style={styles.name}\n    numberOfLines={1}\n  >\n    {name}\n  </Text>\n);";
        let r = text_injector().rewrite(SourceLang::JavaScript, source).unwrap();
        assert!(r
            .output
            .contains("numberOfLines={1} allowFontScaling={false}\n  >"));
    }

    #[test]
    fn no_jsx_in_typescript() {
        let r = text_injector()
            .rewrite(SourceLang::TypeScript, "export const a: number = 1;")
            .unwrap();
        assert!(r.is_noop());
    }

    #[test]
    fn object_key_multiline() {
        let source = "const options = {\n  headerTitleStyle: {\n    fontWeight: 'bold',\n  },\n};";
        let r = header_injector().rewrite(SourceLang::JavaScript, source).unwrap();
        assert_eq!(
            r.output,
            "const options = {\n  headerTitleStyle: {\n    allowFontScaling: false,\n    fontWeight: 'bold',\n  },\n};"
        );
        assert_eq!(r.count, 1);
    }

    #[test]
    fn object_key_inline_and_empty() {
        let source = "const a = { headerTitleStyle: { fontWeight: 'bold' } };\nconst b = { headerTitleStyle: {} };";
        let r = header_injector().rewrite(SourceLang::JavaScript, source).unwrap();
        assert_eq!(
            r.output,
            "const a = { headerTitleStyle: { allowFontScaling: false, fontWeight: 'bold' } };\nconst b = { headerTitleStyle: { allowFontScaling: false } };"
        );
        assert_eq!(r.count, 2);
    }

    #[test]
    fn object_key_already_present_and_lookalikes() {
        let source = "const a = {\n  headerTitleStyle: { allowFontScaling: false },\n  headerTitleStyleExtra: { color: 'red' },\n  title: 'headerTitleStyle',\n};";
        let r = header_injector().rewrite(SourceLang::JavaScript, source).unwrap();
        assert!(r.is_noop());
        assert_eq!(r.output, source);
    }

    #[test]
    fn object_key_crlf() {
        let source = "const options = {\r\n  headerTitleStyle: {\r\n    fontWeight: 'bold',\r\n  },\r\n};\r\n";
        let r = header_injector().rewrite(SourceLang::JavaScript, source).unwrap();
        assert_eq!(
            r.output,
            "const options = {\r\n  headerTitleStyle: {\r\n    allowFontScaling: false,\r\n    fontWeight: 'bold',\r\n  },\r\n};\r\n"
        );

        let back = crate::rewrite::Reverter::new(Attribute::default())
            .with_scope(Construct::object_key("headerTitleStyle"))
            .rewrite(SourceLang::JavaScript, &r.output)
            .unwrap();
        assert_eq!(back.output, source);
    }
}
