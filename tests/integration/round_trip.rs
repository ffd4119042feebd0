use fontscale_patcher::rewrite::{inject, revert, Attribute, RevertPolicy, Reverter};
use fontscale_patcher::syntax::{Construct, SourceLang};

const SCREEN: &str = r#"import React from 'react';
import { View, Text, TextInput } from 'react-native';

export default function StandingsScreen({ teams }) {
  return (
    <View style={styles.container}>
      <Text style={styles.header}>Standings</Text>
      {teams.map((team) => (
        <View key={team.id} style={styles.row}>
          <Text style={styles.rank} numberOfLines={1}>{team.rank}</Text>
          <Text>{team.name}</Text>
          <TextInput value={team.note} />
        </View>
      ))}
      <Text style={styles.footer} />
    </View>
  );
}
"#;

fn text() -> Construct {
    Construct::element("Text")
}

#[test]
fn revert_restores_tags_with_preceding_attributes() {
    let attribute = Attribute::default();
    let injected = inject(SourceLang::JavaScript, SCREEN, &text(), &attribute).unwrap();
    assert_eq!(injected.count, 4);

    let reverted = revert(SourceLang::JavaScript, &injected.output, &attribute).unwrap();
    assert_eq!(reverted.count, 3);

    // Only the bare `<Text>` keeps its injected attribute
    let expected = SCREEN.replace(
        "<Text>{team.name}</Text>",
        "<Text allowFontScaling={false}>{team.name}</Text>",
    );
    assert_eq!(reverted.output, expected);
}

#[test]
fn revert_any_restores_everything() {
    let attribute = Attribute::default();
    let injected = inject(SourceLang::Tsx, SCREEN, &text(), &attribute).unwrap();

    let reverted = Reverter::new(attribute)
        .with_policy(RevertPolicy::Any)
        .rewrite(SourceLang::Tsx, &injected.output)
        .unwrap();
    assert_eq!(reverted.count, injected.count);
    assert_eq!(reverted.output, SCREEN);
}

#[test]
fn text_input_never_touched() {
    let injected = inject(SourceLang::JavaScript, SCREEN, &text(), &Attribute::default()).unwrap();
    assert!(injected.output.contains("<TextInput value={team.note} />"));
}
