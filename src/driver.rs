//! Directory driver: apply one transform to every matching file under a root.
//!
//! Files are processed one at a time. A file that cannot be read, decoded,
//! parsed or written is reported as failed and the run moves on; nothing
//! about one file affects another.

use crate::edit::{Edit, EditError};
use crate::rewrite::{RewriteError, Transform};
use crate::safety::{SafetyError, WorkspaceGuard, FORBIDDEN_DIRS};
use crate::syntax::SourceLang;
use crate::validate::{validate_edit, ValidationError};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

/// Globs used when none are given.
pub const DEFAULT_INCLUDE: &[&str] = &["**/*.js", "**/*.jsx", "**/*.ts", "**/*.tsx"];

#[derive(Error, Debug)]
pub enum DriverError {
    #[error("Target directory does not exist: {}", .path.display())]
    MissingRoot { path: PathBuf },

    #[error("Invalid include pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error(transparent)]
    Safety(#[from] SafetyError),
}

/// Why a single file could not be processed.
#[derive(Error, Debug)]
pub enum FileError {
    #[error(transparent)]
    Safety(#[from] SafetyError),

    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error(transparent)]
    Rewrite(#[from] RewriteError),

    #[error("rewrite refused: {0}")]
    Validation(#[from] ValidationError),

    #[error("write failed: {0}")]
    Edit(#[from] EditError),
}

/// Compiled include globs, matched against root-relative `/`-separated paths.
///
/// `*`, `?` and `[...]` stay within one path segment, `**` spans
/// directories, `{a,b}` picks alternatives, and a leading `**/` also
/// matches files directly under the root.
#[derive(Debug, Clone)]
pub struct FilePatterns {
    set: GlobSet,
}

impl FilePatterns {
    pub fn new<I, S>(globs: I) -> Result<Self, DriverError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = GlobSetBuilder::new();
        for glob in globs {
            let glob = glob.as_ref();
            let compiled = GlobBuilder::new(glob)
                .literal_separator(true)
                .build()
                .map_err(|source| DriverError::Pattern {
                    pattern: glob.to_string(),
                    source,
                })?;
            builder.add(compiled);
        }
        let set = builder.build().map_err(|source| DriverError::Pattern {
            pattern: String::new(),
            source,
        })?;
        Ok(Self { set })
    }

    pub fn matches(&self, relative: &Path) -> bool {
        let path = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        self.set.is_match(path)
    }
}

impl Default for FilePatterns {
    fn default() -> Self {
        Self::new(DEFAULT_INCLUDE).unwrap_or_else(|_| Self {
            set: GlobSet::empty(),
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Compute everything but write nothing
    pub dry_run: bool,
    /// Keep original and rewritten text of modified files
    pub capture_diff: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Rewritten (or would be, in a dry run)
    Modified { changes: usize },
    /// Marker present, nothing left to change
    Unchanged,
    /// Skipped without parsing
    NoMarker,
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    pub original: String,
    pub rewritten: String,
}

#[derive(Debug, Clone)]
pub struct FileReport {
    /// Path relative to the run root
    pub path: PathBuf,
    pub outcome: FileOutcome,
    pub diff: Option<FileDiff>,
}

impl fmt::Display for FileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            FileOutcome::Modified { changes } => {
                write!(f, "{}: {} change(s)", self.path.display(), changes)
            }
            FileOutcome::Unchanged => write!(f, "{}: already up to date", self.path.display()),
            FileOutcome::NoMarker => write!(f, "{}: nothing to do", self.path.display()),
            FileOutcome::Failed { reason } => {
                write!(f, "{}: failed: {}", self.path.display(), reason)
            }
        }
    }
}

/// Totals for one run.
#[derive(Debug, Clone, Default)]
pub struct Summary {
    pub files_scanned: usize,
    pub files_modified: usize,
    pub total_changes: usize,
    pub dry_run: bool,
    pub reports: Vec<FileReport>,
}

impl Summary {
    fn record(&mut self, report: FileReport) {
        self.files_scanned += 1;
        if let FileOutcome::Modified { changes } = report.outcome {
            self.files_modified += 1;
            self.total_changes += changes;
        }
        self.reports.push(report);
    }

    pub fn failures(&self) -> impl Iterator<Item = &FileReport> {
        self.reports
            .iter()
            .filter(|r| matches!(r.outcome, FileOutcome::Failed { .. }))
    }
}

/// Apply `transform` to every file under `root` matching `patterns`.
///
/// Only a missing root or an unusable root aborts the run; per-file problems
/// end up in the file's [`FileReport`].
pub fn process_directory(
    root: &Path,
    patterns: &FilePatterns,
    transform: &Transform,
    options: &RunOptions,
) -> Result<Summary, DriverError> {
    if !root.is_dir() {
        return Err(DriverError::MissingRoot {
            path: root.to_path_buf(),
        });
    }

    let guard = WorkspaceGuard::new(root)?;
    let marker = transform.marker();

    let mut summary = Summary {
        dry_run: options.dry_run,
        ..Summary::default()
    };

    for relative in collect_files(guard.workspace_root(), patterns) {
        let report = match process_file(&guard, &relative, transform, &marker, options) {
            Ok((outcome, diff)) => FileReport {
                path: relative,
                outcome,
                diff,
            },
            Err(e) => {
                tracing::warn!(path = %relative.display(), error = %e, "file failed");
                FileReport {
                    path: relative,
                    outcome: FileOutcome::Failed {
                        reason: e.to_string(),
                    },
                    diff: None,
                }
            }
        };
        summary.record(report);
    }

    tracing::debug!(
        root = %root.display(),
        scanned = summary.files_scanned,
        modified = summary.files_modified,
        changes = summary.total_changes,
        "run complete"
    );

    Ok(summary)
}

/// Root-relative paths of matching files, sorted.
fn collect_files(root: &Path, patterns: &FilePatterns) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_pruned(e))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable directory entry");
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.path().strip_prefix(root).ok().map(Path::to_path_buf))
        .filter(|relative| patterns.matches(relative))
        .collect()
}

fn is_pruned(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| FORBIDDEN_DIRS.contains(&name))
}

fn process_file(
    guard: &WorkspaceGuard,
    relative: &Path,
    transform: &Transform,
    marker: &str,
    options: &RunOptions,
) -> Result<(FileOutcome, Option<FileDiff>), FileError> {
    let path = guard.validate_path(relative)?;
    let content = String::from_utf8(fs::read(&path)?)?;

    if !content.contains(marker) {
        return Ok((FileOutcome::NoMarker, None));
    }

    let lang = SourceLang::from_path(&path).unwrap_or_else(SourceLang::fallback);
    let rewrite = transform.rewrite(lang, &content)?;
    if rewrite.is_noop() {
        return Ok((FileOutcome::Unchanged, None));
    }

    validate_edit(lang, &content, &rewrite.output)?;

    if !options.dry_run {
        Edit::apply_batch(rewrite.edits_for(&path))?;
    }

    tracing::debug!(
        path = %relative.display(),
        %lang,
        changes = rewrite.count,
        dry_run = options.dry_run,
        "rewrote file"
    );

    let diff = options.capture_diff.then(|| FileDiff {
        original: content,
        rewritten: rewrite.output,
    });

    Ok((
        FileOutcome::Modified {
            changes: rewrite.count,
        },
        diff,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewrite::{Attribute, Injector};
    use crate::syntax::Construct;

    fn text_transform() -> Transform {
        Transform::Inject(Injector::new(Construct::element("Text"), Attribute::default()))
    }

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn glob_translation() {
        let patterns = FilePatterns::new(["**/*.js", "screens/?ome.tsx"]).unwrap();
        assert!(patterns.matches(Path::new("App.js")));
        assert!(patterns.matches(Path::new("src/screens/Home.js")));
        assert!(!patterns.matches(Path::new("src/screens/Home.json")));
        assert!(patterns.matches(Path::new("screens/Home.tsx")));
        assert!(!patterns.matches(Path::new("screens/nested/Home.tsx")));
    }

    #[test]
    fn glob_classes_and_alternatives() {
        let patterns = FilePatterns::new(["**/*.[jt]s", "src/{screens,components}/*.js"]).unwrap();
        assert!(patterns.matches(Path::new("a.js")));
        assert!(patterns.matches(Path::new("lib/api.ts")));
        assert!(!patterns.matches(Path::new("lib/api.cs")));
        assert!(patterns.matches(Path::new("src/screens/A.js")));
        assert!(patterns.matches(Path::new("src/components/Card.js")));
        assert!(!patterns.matches(Path::new("src/hooks/useScore.jsx")));
    }

    #[test]
    fn unclosed_class_is_rejected() {
        let err = FilePatterns::new(["src/[abc.js"]).unwrap_err();
        assert!(matches!(err, DriverError::Pattern { ref pattern, .. } if pattern == "src/[abc.js"));
    }

    #[test]
    fn default_patterns_cover_sources() {
        let patterns = FilePatterns::default();
        for file in ["a.js", "b/c.jsx", "d.ts", "e/f/g.tsx"] {
            assert!(patterns.matches(Path::new(file)), "{file}");
        }
        assert!(!patterns.matches(Path::new("README.md")));
    }

    #[test]
    fn missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let result = process_directory(
            &dir.path().join("src/screens"),
            &FilePatterns::default(),
            &text_transform(),
            &RunOptions::default(),
        );
        assert!(matches!(result, Err(DriverError::MissingRoot { .. })));
    }

    #[test]
    fn pruned_directories_not_scanned() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "Home.js", "<Text>a</Text>;");
        write(dir.path(), "node_modules/lib/index.js", "<Text>b</Text>;");
        write(dir.path(), "android/app/index.js", "<Text>c</Text>;");

        let summary = process_directory(
            dir.path(),
            &FilePatterns::default(),
            &text_transform(),
            &RunOptions::default(),
        )
        .unwrap();

        assert_eq!(summary.files_scanned, 1);
        assert_eq!(
            fs::read_to_string(dir.path().join("node_modules/lib/index.js")).unwrap(),
            "<Text>b</Text>;"
        );
    }

    #[test]
    fn outcomes_per_file() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.js", "const a = <Text>a</Text>;");
        write(dir.path(), "b.js", "const b = <Text allowFontScaling={false}>b</Text>;");
        write(dir.path(), "c.js", "const c = 1;");
        fs::write(dir.path().join("d.js"), [0xff, 0xfe, b'<']).unwrap();

        let summary = process_directory(
            dir.path(),
            &FilePatterns::default(),
            &text_transform(),
            &RunOptions::default(),
        )
        .unwrap();

        let outcomes: Vec<_> = summary.reports.iter().map(|r| r.outcome.clone()).collect();
        assert_eq!(outcomes[0], FileOutcome::Modified { changes: 1 });
        assert_eq!(outcomes[1], FileOutcome::Unchanged);
        assert_eq!(outcomes[2], FileOutcome::NoMarker);
        assert!(matches!(outcomes[3], FileOutcome::Failed { .. }));
        assert_eq!(summary.files_scanned, 4);
        assert_eq!(summary.files_modified, 1);
        assert_eq!(summary.failures().count(), 1);
    }

    #[test]
    fn dry_run_writes_nothing_and_captures_diff() {
        let dir = tempfile::tempdir().unwrap();
        let source = "const a = <Text>a</Text>;";
        write(dir.path(), "a.js", source);

        let summary = process_directory(
            dir.path(),
            &FilePatterns::default(),
            &text_transform(),
            &RunOptions {
                dry_run: true,
                capture_diff: true,
            },
        )
        .unwrap();

        assert_eq!(summary.total_changes, 1);
        assert_eq!(fs::read_to_string(dir.path().join("a.js")).unwrap(), source);

        let diff = summary.reports[0].diff.as_ref().unwrap();
        assert_eq!(diff.original, source);
        assert_eq!(diff.rewritten, "const a = <Text allowFontScaling={false}>a</Text>;");
    }
}
