//! Rule files and presets driving real directory runs.

use fontscale_patcher::config::{load_from_path, presets, ConfigError, PRESETS};
use fontscale_patcher::driver::{process_directory, RunOptions};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// A minimal Expo project with one screen and a navigator in App.js.
fn setup_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();

    write(
        root,
        "package.json",
        r#"{ "name": "sports", "dependencies": { "expo": "~49.0.0", "react-native": "0.72.6" } }"#,
    );
    write(
        root,
        "App.js",
        r#"import React from 'react';
import { Text } from 'react-native';

const options = {
  headerTitleStyle: {
    fontWeight: 'bold',
  },
};
"#,
    );
    write(
        root,
        "src/screens/ScoreScreen.js",
        "export const ScoreScreen = () => <Text style={styles.score}>0-0</Text>;\n",
    );
    write(
        root,
        "node_modules/react-native/Text.js",
        "export const Text = () => <Text>inner</Text>;\n",
    );

    dir
}

fn run_config(project: &Path, config: &fontscale_patcher::RuleConfig) -> usize {
    config
        .rules
        .iter()
        .map(|rule| {
            process_directory(
                &project.join(&rule.root),
                &rule.patterns().unwrap(),
                &rule.transform(),
                &RunOptions::default(),
            )
            .unwrap()
            .total_changes
        })
        .sum()
}

#[test]
fn presets_reproduce_the_full_workflow() {
    let dir = setup_project();
    let project = dir.path();

    let text = presets::find("text-scaling").unwrap().load().unwrap();
    assert_eq!(run_config(project, &text), 1);
    assert_eq!(
        fs::read_to_string(project.join("src/screens/ScoreScreen.js")).unwrap(),
        "export const ScoreScreen = () => <Text style={styles.score} allowFontScaling={false}>0-0</Text>;\n"
    );

    let headers = presets::find("navigation-headers").unwrap().load().unwrap();
    assert_eq!(run_config(project, &headers), 1);
    assert_eq!(run_config(project, &headers), 0);

    let hoist = presets::find("header-title-component").unwrap().load().unwrap();
    assert_eq!(run_config(project, &hoist), 1);
    let app = fs::read_to_string(project.join("App.js")).unwrap();
    assert!(app.contains("headerTitle: (props) => <HeaderTitle {...props} />,"));

    let revert = presets::find("revert-text-scaling").unwrap().load().unwrap();
    assert_eq!(run_config(project, &revert), 1);
    assert_eq!(
        fs::read_to_string(project.join("src/screens/ScoreScreen.js")).unwrap(),
        "export const ScoreScreen = () => <Text style={styles.score}>0-0</Text>;\n"
    );

    // Dependencies are never touched
    assert_eq!(
        fs::read_to_string(project.join("node_modules/react-native/Text.js")).unwrap(),
        "export const Text = () => <Text>inner</Text>;\n"
    );
}

#[test]
fn rule_file_from_disk() {
    let dir = setup_project();
    let rules = dir.path().join("fontscale.toml");
    fs::write(
        &rules,
        r#"
[meta]
name = "custom"

[[rules]]
id = "labels"
root = "src"
include = ["screens/*.js"]

[rules.operation]
type = "inject"
construct = { kind = "element", name = "Text" }
attribute = { name = "maxFontSizeMultiplier", value = "1.2" }
"#,
    )
    .unwrap();

    let config = load_from_path(&rules).unwrap();
    assert_eq!(run_config(dir.path(), &config), 1);
    assert!(fs::read_to_string(dir.path().join("src/screens/ScoreScreen.js"))
        .unwrap()
        .contains("maxFontSizeMultiplier={1.2}"));
}

#[test]
fn invalid_rule_file_reports_path() {
    let dir = TempDir::new().unwrap();
    let rules = dir.path().join("broken.toml");
    fs::write(
        &rules,
        r#"
[[rules]]
id = "bad"
root = "/etc"
operation = { type = "revert", construct = { kind = "object-key", key = " " } }
"#,
    )
    .unwrap();

    let err = load_from_path(&rules).unwrap_err();
    let ConfigError::Validation { path, source } = &err else {
        panic!("expected validation error, got {err}");
    };
    assert_eq!(path.as_deref(), Some(rules.as_path()));
    assert_eq!(source.issues.len(), 2, "{source}");
    assert!(err.to_string().contains("broken.toml"));
}

#[test]
fn preset_names_are_unique() {
    let mut names: Vec<_> = PRESETS.iter().map(|p| p.name).collect();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), PRESETS.len());
}
