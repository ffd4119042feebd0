//! Fontscale Patcher: syntax-aware font-scaling fixes for React Native code
//!
//! Pins `allowFontScaling={false}` on JSX `Text` elements and navigation
//! header styles so an app's layout survives large system font settings, and
//! removes those pins again when they are no longer wanted.
//!
//! # Architecture
//!
//! Every rewrite compiles down to a single primitive: [`Edit`], a verified
//! byte-span replacement. Intelligence lives in span acquisition (tree-sitter
//! queries over the JavaScript/TypeScript/TSX grammars, see [`syntax`]), not
//! in the application logic.
//!
//! - [`rewrite`] turns located constructs into edits (inject, revert, header
//!   title hoisting)
//! - [`driver`] walks a directory and applies one [`Transform`] per file
//! - [`config`] loads TOML rule files and the built-in presets
//!
//! # Safety
//!
//! - All edits verify expected before-text before applying
//! - Atomic file writes (tempfile + fsync + rename)
//! - Root boundary enforcement, `node_modules` and native folders excluded
//! - Rewrites that add parse errors are refused
//! - Idempotent operations
//!
//! # Example
//!
//! ```
//! use fontscale_patcher::rewrite::{inject, Attribute};
//! use fontscale_patcher::syntax::{Construct, SourceLang};
//!
//! let rewrite = inject(
//!     SourceLang::Tsx,
//!     "const Title = () => <Text style={styles.title}>Hi</Text>;",
//!     &Construct::element("Text"),
//!     &Attribute::default(),
//! )?;
//! assert_eq!(rewrite.count, 1);
//! # Ok::<(), fontscale_patcher::rewrite::RewriteError>(())
//! ```

pub mod config;
pub mod driver;
pub mod edit;
pub mod pool;
pub mod rewrite;
pub mod safety;
pub mod syntax;
pub mod validate;

// Re-exports
pub use config::{load_from_path, load_from_str, ConfigError, RuleConfig};
pub use driver::{
    process_directory, DriverError, FileOutcome, FilePatterns, FileReport, RunOptions, Summary,
};
pub use edit::{Edit, EditError, EditResult, EditVerification};
pub use rewrite::{Attribute, RevertPolicy, Rewrite, RewriteError, Transform};
pub use safety::{SafetyError, WorkspaceGuard};
pub use syntax::{Construct, SourceLang, SyntaxError};
pub use validate::{ErrorLocation, ValidationError};
