//! Built-in rule sets, embedded from `rules/`.

use crate::config::loader::{load_from_str, ConfigError};
use crate::config::schema::RuleConfig;

#[derive(Debug, Clone, Copy)]
pub struct Preset {
    pub name: &'static str,
    source: &'static str,
}

impl Preset {
    pub fn load(&self) -> Result<RuleConfig, ConfigError> {
        load_from_str(self.source)
    }
}

pub const PRESETS: &[Preset] = &[
    Preset {
        name: "text-scaling",
        source: include_str!("../../rules/text-scaling.toml"),
    },
    Preset {
        name: "navigation-headers",
        source: include_str!("../../rules/navigation-headers.toml"),
    },
    Preset {
        name: "header-title-component",
        source: include_str!("../../rules/header-title-component.toml"),
    },
    Preset {
        name: "revert-text-scaling",
        source: include_str!("../../rules/revert-text-scaling.toml"),
    },
];

/// Look up a preset by name, suggesting the closest one on a miss.
pub fn find(name: &str) -> Result<&'static Preset, ConfigError> {
    if let Some(preset) = PRESETS.iter().find(|p| p.name == name) {
        return Ok(preset);
    }

    let suggestion = PRESETS
        .iter()
        .map(|p| (strsim::levenshtein(name, p.name), p.name))
        .filter(|(distance, _)| *distance <= 4)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, name)| name.to_string());

    Err(ConfigError::UnknownPreset {
        name: name.to_string(),
        suggestion,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewrite::Transform;

    #[test]
    fn every_preset_loads() {
        for preset in PRESETS {
            let config = preset
                .load()
                .unwrap_or_else(|e| panic!("{}: {e}", preset.name));
            assert_eq!(config.meta.name, preset.name);
            assert!(config.meta.description.is_some());
        }
    }

    #[test]
    fn text_scaling_targets_screens() {
        let config = find("text-scaling").unwrap().load().unwrap();
        let rule = &config.rules[0];
        assert_eq!(rule.root, "src/screens");
        assert!(matches!(rule.transform(), Transform::Inject(_)));
    }

    #[test]
    fn suggestion_for_typo() {
        let err = find("text-scalling").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnknownPreset { suggestion: Some(ref s), .. } if s == "text-scaling"
        ));

        let err = find("completely-different-thing").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnknownPreset {
                suggestion: None,
                ..
            }
        ));
    }
}
