use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use fontscale_patcher::config::{load_from_path, presets, RuleConfig, PRESETS};
use fontscale_patcher::driver::{process_directory, FileOutcome, FilePatterns, RunOptions, Summary};
use fontscale_patcher::rewrite::{Attribute, Injector, RevertPolicy, Reverter, Transform};
use fontscale_patcher::syntax::Construct;
use similar::{ChangeTag, TextDiff};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "fontscale-patcher")]
#[command(
    about = "Pin allowFontScaling on React Native Text elements and navigation headers",
    long_about = None
)]
#[command(version)]
struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add the attribute to every matching element or style object
    Inject {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Remove a previously injected attribute
    Revert {
        #[command(flatten)]
        target: TargetArgs,

        /// Remove every occurrence, including sole and non-trailing attributes
        #[arg(long)]
        all: bool,
    },

    /// Run a built-in preset or a TOML rule file against a project
    Apply {
        /// Project root (auto-detected if not specified)
        #[arg(short, long)]
        project: Option<PathBuf>,

        /// Built-in preset name (see `list`)
        #[arg(long, required_unless_present = "rules", conflicts_with = "rules")]
        preset: Option<String>,

        /// Rule file to apply
        #[arg(long)]
        rules: Option<PathBuf>,

        /// Dry run - show what would be changed without modifying files
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,
    },

    /// List built-in presets
    List,
}

#[derive(Args)]
struct TargetArgs {
    /// Directory to process (default: <project>/src/screens)
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// JSX element name to target (inject default: Text)
    #[arg(long, conflicts_with = "object_key")]
    element: Option<String>,

    /// Object key whose object value is targeted, e.g. headerTitleStyle
    #[arg(long)]
    object_key: Option<String>,

    /// Attribute name
    #[arg(long, default_value = "allowFontScaling")]
    attribute: String,

    /// Attribute value, as a JavaScript expression
    #[arg(long, default_value = "false")]
    value: String,

    /// Glob relative to the root (repeatable; default: JS/TS sources)
    #[arg(short, long = "include")]
    include: Vec<String>,

    /// Dry run - show what would be changed without modifying files
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Show unified diff of changes
    #[arg(short, long)]
    diff: bool,
}

impl TargetArgs {
    fn construct(&self) -> Option<Construct> {
        match (&self.element, &self.object_key) {
            (Some(name), _) => Some(Construct::element(name)),
            (None, Some(key)) => Some(Construct::object_key(key)),
            (None, None) => None,
        }
    }

    fn attribute(&self) -> Attribute {
        Attribute::new(&self.attribute, &self.value)
    }

    fn options(&self) -> RunOptions {
        RunOptions {
            dry_run: self.dry_run,
            capture_diff: self.diff,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Inject { target } => {
            let construct = target.construct().unwrap_or_else(|| Construct::element("Text"));
            let transform = Transform::Inject(Injector::new(construct, target.attribute()));
            cmd_run(&target, &transform)
        }

        Commands::Revert { target, all } => {
            let policy = if all {
                RevertPolicy::Any
            } else {
                RevertPolicy::Trailing
            };
            let mut reverter = Reverter::new(target.attribute()).with_policy(policy);
            if let Some(construct) = target.construct() {
                reverter = reverter.with_scope(construct);
            }
            cmd_run(&target, &Transform::Revert(reverter))
        }

        Commands::Apply {
            project,
            preset,
            rules,
            dry_run,
            diff,
        } => cmd_apply(
            project,
            preset,
            rules,
            RunOptions {
                dry_run,
                capture_diff: diff,
            },
        ),

        Commands::List => cmd_list(),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "fontscale_patcher=debug"
    } else {
        "warn"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Resolve the project root.
///
/// Priority order:
/// 1. Explicit flag
/// 2. FONTSCALE_PROJECT environment variable
/// 3. Nearest ancestor with a React Native / Expo package.json
fn resolve_project(cli_project: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = cli_project {
        return Ok(path);
    }

    if let Ok(env_path) = env::var("FONTSCALE_PROJECT") {
        let path = PathBuf::from(&env_path);
        if path.exists() {
            return Ok(path);
        }
        eprintln!(
            "{}",
            format!("Warning: FONTSCALE_PROJECT is set but path doesn't exist: {env_path}")
                .yellow()
        );
    }

    if let Some(path) = auto_detect_project() {
        println!(
            "{}",
            format!("Auto-detected project: {}", path.display()).dimmed()
        );
        return Ok(path);
    }

    anyhow::bail!(
        "{}\n{}\n  {}\n  {}\n  {}",
        "Could not find a React Native project.".red(),
        "Try one of:".bold(),
        "1. cd into your app directory (the one with package.json)",
        "2. Specify explicitly: fontscale-patcher inject --root /path/to/app/src/screens",
        "3. Set environment variable: export FONTSCALE_PROJECT=/path/to/app"
    )
}

/// Walk up from the current directory to a package.json that depends on
/// react-native or expo.
fn auto_detect_project() -> Option<PathBuf> {
    let current = env::current_dir().ok()?;
    current
        .ancestors()
        .find(|dir| is_react_native_project(dir))
        .map(Path::to_path_buf)
}

fn is_react_native_project(dir: &Path) -> bool {
    let Ok(contents) = fs::read_to_string(dir.join("package.json")) else {
        return false;
    };
    let Ok(package) = serde_json::from_str::<serde_json::Value>(&contents) else {
        tracing::debug!(dir = %dir.display(), "unparseable package.json");
        return false;
    };

    ["dependencies", "devDependencies"].iter().any(|section| {
        package
            .get(section)
            .is_some_and(|deps| deps.get("react-native").is_some() || deps.get("expo").is_some())
    })
}

/// `inject` / `revert`: one transform over one directory.
fn cmd_run(target: &TargetArgs, transform: &Transform) -> Result<()> {
    let root = match &target.root {
        Some(root) => root.clone(),
        None => match resolve_project(None) {
            Ok(project) => project.join("src").join("screens"),
            Err(e) => {
                eprintln!("{e}");
                return Ok(());
            }
        },
    };

    let patterns = if target.include.is_empty() {
        FilePatterns::default()
    } else {
        match FilePatterns::new(target.include.iter().cloned()) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("{} {e}", "✗".red());
                return Ok(());
            }
        }
    };

    println!("Searching in: {}", root.display());
    run_and_report(&root, &patterns, transform, &target.options());
    Ok(())
}

fn cmd_apply(
    project: Option<PathBuf>,
    preset: Option<String>,
    rules: Option<PathBuf>,
    options: RunOptions,
) -> Result<()> {
    // Rule problems are fatal; everything after is reported and survived.
    let config: RuleConfig = match (&preset, &rules) {
        (_, Some(path)) => load_from_path(path)?,
        (Some(name), None) => presets::find(name)?.load()?,
        (None, None) => anyhow::bail!("either --preset or --rules is required"),
    };

    let project = match resolve_project(project) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("{e}");
            return Ok(());
        }
    };

    println!("Project: {}", project.display());
    if !config.meta.name.is_empty() {
        println!("Rules: {}", config.meta.name.bold());
    }
    println!();

    for rule in &config.rules {
        let root = project.join(&rule.root);
        let patterns = rule.patterns()?;
        println!("{} {} ({})", "→".cyan(), rule.id.bold(), root.display());
        run_and_report(&root, &patterns, &rule.transform(), &options);
        println!();
    }

    Ok(())
}

fn run_and_report(root: &Path, patterns: &FilePatterns, transform: &Transform, options: &RunOptions) {
    if options.dry_run {
        println!("{}", "  [DRY RUN - showing what would be changed]".cyan());
    }

    match process_directory(root, patterns, transform, options) {
        Ok(summary) => {
            report_files(root, &summary);
            report_summary(&summary, &transform.unit());
        }
        Err(e) => eprintln!("{} {e}", "✗".red()),
    }
}

fn report_files(root: &Path, summary: &Summary) {
    for report in &summary.reports {
        match &report.outcome {
            FileOutcome::Modified { changes } => {
                let verb = if summary.dry_run { "Would update" } else { "Updated" };
                println!(
                    "{} {} {}: {} change(s)",
                    "✓".green(),
                    verb,
                    report.path.display(),
                    changes
                );
                if let Some(diff) = &report.diff {
                    display_diff(&root.join(&report.path), &diff.original, &diff.rewritten);
                }
            }
            FileOutcome::Failed { reason } => {
                eprintln!("{} {}: {}", "✗".red(), report.path.display(), reason);
            }
            FileOutcome::Unchanged | FileOutcome::NoMarker => {
                tracing::debug!(path = %report.path.display(), outcome = ?report.outcome, "skipped");
            }
        }
    }
}

fn report_summary(summary: &Summary, unit: &str) {
    println!("{}", "Summary:".bold());
    println!("  {} files scanned", summary.files_scanned);
    let modified = if summary.dry_run {
        "files would be modified"
    } else {
        "files modified"
    };
    println!(
        "  {} {}",
        summary.files_modified.to_string().green(),
        modified
    );
    println!("  {} {}", summary.total_changes.to_string().green(), unit);

    let failed = summary.failures().count();
    if failed > 0 {
        println!("  {} failed", failed.to_string().red());
    }
    if summary.files_modified == 0 && failed == 0 {
        println!("{}", "  No changes needed".dimmed());
    }
}

/// Show unified diff between original and modified content
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (patched)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for hunk in diff.unified_diff().context_radius(2).iter_hunks() {
        println!("{}", hunk.header().to_string().cyan());
        for change in hunk.iter_changes() {
            let line = match change.tag() {
                ChangeTag::Delete => format!("-{change}").red(),
                ChangeTag::Insert => format!("+{change}").green(),
                ChangeTag::Equal => format!(" {change}").normal(),
            };
            print!("{line}");
            if change.missing_newline() {
                println!();
            }
        }
    }
}

fn cmd_list() -> Result<()> {
    println!("{}", "Built-in presets:".bold());
    for preset in PRESETS {
        let description = preset
            .load()
            .ok()
            .and_then(|config| config.meta.description)
            .unwrap_or_default();
        println!("  {:<24} {}", preset.name.green(), description);
    }
    Ok(())
}
