pub mod loader;
pub mod presets;
pub mod schema;

pub use loader::{load_from_path, load_from_str, ConfigError};
pub use presets::{Preset, PRESETS};
pub use schema::{
    AttributeSpec, ConstructSpec, Metadata, Operation, RevertMode, RuleConfig, RuleDefinition,
    ValidationError, ValidationIssue,
};
