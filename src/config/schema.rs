use crate::driver::FilePatterns;
use crate::rewrite::{Attribute, HeaderTitleHoister, Injector, RevertPolicy, Reverter, Transform};
use crate::syntax::Construct;
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::path::{Component, Path};

#[derive(Debug, Deserialize, Default, Clone)]
pub struct RuleConfig {
    #[serde(default)]
    pub meta: Metadata,
    #[serde(default)]
    pub rules: Vec<RuleDefinition>,
}

impl RuleConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.rules.is_empty() {
            issues.push(ValidationIssue::EmptyRuleList);
        }

        let mut seen = HashSet::new();
        for rule in &self.rules {
            let id = Some(rule.id.clone());

            if rule.id.trim().is_empty() {
                issues.push(ValidationIssue::MissingField {
                    rule_id: None,
                    field: "id",
                });
            } else if !seen.insert(rule.id.as_str()) {
                issues.push(ValidationIssue::DuplicateId {
                    rule_id: rule.id.clone(),
                });
            }

            if rule.root.trim().is_empty() {
                issues.push(ValidationIssue::MissingField {
                    rule_id: id.clone(),
                    field: "root",
                });
            } else if !stays_inside(Path::new(&rule.root)) {
                issues.push(ValidationIssue::InvalidCombo {
                    rule_id: id.clone(),
                    message: format!("root '{}' must be a relative path inside the project", rule.root),
                });
            }

            if let Err(e) = rule.patterns() {
                issues.push(ValidationIssue::InvalidCombo {
                    rule_id: id.clone(),
                    message: e.to_string(),
                });
            }

            match &rule.operation {
                Operation::Inject {
                    construct,
                    attribute,
                } => {
                    check_construct(construct, &id, &mut issues);
                    check_attribute(attribute, &id, &mut issues);
                }
                Operation::Revert {
                    construct,
                    attribute,
                    ..
                } => {
                    if let Some(construct) = construct {
                        check_construct(construct, &id, &mut issues);
                    }
                    check_attribute(attribute, &id, &mut issues);
                }
                Operation::HoistHeaderTitle { component } => {
                    if !is_component_name(component) {
                        issues.push(ValidationIssue::InvalidCombo {
                            rule_id: id.clone(),
                            message: format!(
                                "component '{component}' must be a capitalized identifier"
                            ),
                        });
                    }
                }
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}

fn check_construct(construct: &ConstructSpec, id: &Option<String>, issues: &mut Vec<ValidationIssue>) {
    match construct {
        ConstructSpec::Element { name } if name.trim().is_empty() => {
            issues.push(ValidationIssue::MissingField {
                rule_id: id.clone(),
                field: "operation.construct.name",
            })
        }
        ConstructSpec::ObjectKey { key } if key.trim().is_empty() => {
            issues.push(ValidationIssue::MissingField {
                rule_id: id.clone(),
                field: "operation.construct.key",
            })
        }
        _ => {}
    }
}

fn check_attribute(attribute: &AttributeSpec, id: &Option<String>, issues: &mut Vec<ValidationIssue>) {
    if !is_identifier(&attribute.name) {
        issues.push(ValidationIssue::InvalidCombo {
            rule_id: id.clone(),
            message: format!("attribute name '{}' is not an identifier", attribute.name),
        });
    }
    if attribute.value.trim().is_empty() {
        issues.push(ValidationIssue::MissingField {
            rule_id: id.clone(),
            field: "operation.attribute.value",
        });
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn is_component_name(name: &str) -> bool {
    is_identifier(name) && name.starts_with(|c: char| c.is_ascii_uppercase())
}

fn stays_inside(path: &Path) -> bool {
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RuleDefinition {
    pub id: String,
    /// Directory the rule runs in, relative to the project root
    #[serde(default = "default_root")]
    pub root: String,
    /// Globs relative to `root`; the driver's defaults when empty
    #[serde(default)]
    pub include: Vec<String>,
    pub operation: Operation,
}

fn default_root() -> String {
    ".".to_string()
}

impl RuleDefinition {
    pub fn patterns(&self) -> Result<FilePatterns, crate::driver::DriverError> {
        if self.include.is_empty() {
            Ok(FilePatterns::default())
        } else {
            FilePatterns::new(self.include.iter().cloned())
        }
    }

    pub fn transform(&self) -> Transform {
        match &self.operation {
            Operation::Inject {
                construct,
                attribute,
            } => Transform::Inject(Injector::new(construct.into(), attribute.into())),
            Operation::Revert {
                construct,
                attribute,
                policy,
            } => {
                let mut reverter = Reverter::new(attribute.into()).with_policy((*policy).into());
                if let Some(construct) = construct {
                    reverter = reverter.with_scope(construct.into());
                }
                Transform::Revert(reverter)
            }
            Operation::HoistHeaderTitle { component } => {
                Transform::HoistHeaderTitle(HeaderTitleHoister::new(component.clone()))
            }
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Operation {
    Inject {
        construct: ConstructSpec,
        #[serde(default)]
        attribute: AttributeSpec,
    },
    Revert {
        /// Every JSX element when absent
        #[serde(default)]
        construct: Option<ConstructSpec>,
        #[serde(default)]
        attribute: AttributeSpec,
        #[serde(default)]
        policy: RevertMode,
    },
    HoistHeaderTitle {
        #[serde(default = "default_component")]
        component: String,
    },
}

fn default_component() -> String {
    "HeaderTitle".to_string()
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ConstructSpec {
    Element { name: String },
    AnyElement,
    ObjectKey { key: String },
}

impl From<&ConstructSpec> for Construct {
    fn from(spec: &ConstructSpec) -> Self {
        match spec {
            ConstructSpec::Element { name } => Construct::element(name.trim()),
            ConstructSpec::AnyElement => Construct::AnyElement,
            ConstructSpec::ObjectKey { key } => Construct::object_key(key.trim()),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct AttributeSpec {
    pub name: String,
    pub value: String,
}

impl Default for AttributeSpec {
    fn default() -> Self {
        let attribute = Attribute::default();
        Self {
            name: attribute.name,
            value: attribute.value,
        }
    }
}

impl From<&AttributeSpec> for Attribute {
    fn from(spec: &AttributeSpec) -> Self {
        Attribute::new(spec.name.trim(), spec.value.trim())
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum RevertMode {
    #[default]
    Trailing,
    Any,
}

impl From<RevertMode> for RevertPolicy {
    fn from(mode: RevertMode) -> Self {
        match mode {
            RevertMode::Trailing => RevertPolicy::Trailing,
            RevertMode::Any => RevertPolicy::Any,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone)]
pub enum ValidationIssue {
    EmptyRuleList,
    DuplicateId {
        rule_id: String,
    },
    MissingField {
        rule_id: Option<String>,
        field: &'static str,
    },
    InvalidCombo {
        rule_id: Option<String>,
        message: String,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::EmptyRuleList => write!(f, "rule config contains no rules"),
            ValidationIssue::DuplicateId { rule_id } => {
                write!(f, "rule id '{rule_id}' is used more than once")
            }
            ValidationIssue::MissingField { rule_id, field } => match rule_id {
                Some(id) => write!(f, "rule '{id}' missing required field '{field}'"),
                None => write!(f, "rule missing required field '{field}'"),
            },
            ValidationIssue::InvalidCombo { rule_id, message } => match rule_id {
                Some(id) => write!(f, "rule '{id}' has invalid configuration: {message}"),
                None => write!(f, "invalid rule configuration: {message}"),
            },
        }
    }
}
