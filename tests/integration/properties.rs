use fontscale_patcher::rewrite::{inject, Attribute, RevertPolicy, Reverter};
use fontscale_patcher::syntax::{Construct, SourceLang};
use proptest::prelude::*;

/// One `<Text>` element with 0-2 plain attributes, self-closing or not.
fn text_element() -> impl Strategy<Value = String> {
    (
        prop::collection::vec(
            prop_oneof![
                Just("style={styles.a}"),
                Just("numberOfLines={2}"),
                Just("testID=\"label\""),
                Just("{...rest}"),
            ],
            0..3,
        ),
        any::<bool>(),
        "[a-zA-Z ]{0,8}",
    )
        .prop_map(|(attrs, self_closing, body)| {
            let attrs: String = attrs.iter().map(|a| format!(" {a}")).collect();
            if self_closing {
                format!("<Text{attrs} />")
            } else {
                format!("<Text{attrs}>{body}</Text>")
            }
        })
}

fn screen() -> impl Strategy<Value = (String, usize)> {
    prop::collection::vec(text_element(), 0..6).prop_map(|elements| {
        let count = elements.len();
        let body: String = elements.iter().map(|e| format!("    {e}\n")).collect();
        (
            format!("const Screen = () => (\n  <View>\n{body}  </View>\n);\n"),
            count,
        )
    })
}

proptest! {
    #[test]
    fn inject_counts_every_element_and_is_idempotent((source, elements) in screen()) {
        let attribute = Attribute::default();
        let construct = Construct::element("Text");

        let first = inject(SourceLang::JavaScript, &source, &construct, &attribute).unwrap();
        prop_assert_eq!(first.count, elements);
        prop_assert_eq!(first.output.matches("allowFontScaling={false}").count(), elements);

        let second = inject(SourceLang::JavaScript, &first.output, &construct, &attribute).unwrap();
        prop_assert_eq!(second.count, 0);
        prop_assert_eq!(&second.output, &first.output);
    }

    #[test]
    fn revert_any_inverts_inject((source, _) in screen()) {
        let attribute = Attribute::default();
        let injected =
            inject(SourceLang::Tsx, &source, &Construct::element("Text"), &attribute).unwrap();

        let reverted = Reverter::new(attribute)
            .with_policy(RevertPolicy::Any)
            .rewrite(SourceLang::Tsx, &injected.output)
            .unwrap();
        prop_assert_eq!(reverted.output, source);
    }
}
