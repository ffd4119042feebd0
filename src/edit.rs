use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

/// The fundamental edit primitive: byte-span replacement with verification.
///
/// Every rewrite (attribute injection, revert, header hoisting) compiles down
/// to a list of these. Insertions are zero-width spans with an empty
/// expected before-text; deletions carry the text they remove.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "Edit does nothing until applied"]
pub struct Edit {
    /// Path to the file to edit
    pub file: PathBuf,
    /// Starting byte offset (inclusive)
    pub byte_start: usize,
    /// Ending byte offset (exclusive)
    pub byte_end: usize,
    /// New text to insert at [byte_start, byte_end)
    pub new_text: String,
    /// Verification of what we expect to find before applying
    pub expected_before: EditVerification,
}

/// Verification strategy for edit safety.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditVerification {
    /// Exact text match required
    ExactMatch(String),
    /// xxh3 hash of expected text (faster for large spans)
    Hash(u64),
}

impl EditVerification {
    /// Check if the provided text matches the verification criteria.
    pub fn matches(&self, text: &str) -> bool {
        match self {
            EditVerification::ExactMatch(expected) => text == expected,
            EditVerification::Hash(expected_hash) => xxh3_64(text.as_bytes()) == *expected_hash,
        }
    }

    /// Create verification from text, using hash for text over 1KB.
    pub fn from_text(text: &str) -> Self {
        if text.len() > 1024 {
            EditVerification::Hash(xxh3_64(text.as_bytes()))
        } else {
            EditVerification::ExactMatch(text.to_string())
        }
    }
}

#[derive(Error, Debug)]
pub enum EditError {
    #[error("Before-text verification failed at {file}:{byte_start}")]
    BeforeTextMismatch {
        file: PathBuf,
        byte_start: usize,
        byte_end: usize,
        expected: String,
        found: String,
    },

    #[error("Invalid byte range: [{byte_start}, {byte_end}) in file of length {file_len}")]
    InvalidByteRange {
        byte_start: usize,
        byte_end: usize,
        file_len: usize,
    },

    #[error("Overlapping edits in {file}: span ending at {first_end} overlaps span starting at {second_start}")]
    Overlap {
        file: PathBuf,
        first_end: usize,
        second_start: usize,
    },

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("UTF-8 validation error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("Invalid edit would create malformed UTF-8")]
    InvalidUtf8Edit,
}

/// Result of applying an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "EditResult should be checked for success/already-applied"]
pub enum EditResult {
    /// Edit was successfully applied
    Applied { file: PathBuf, bytes_changed: usize },
    /// Edit was already applied (current text matches new_text)
    AlreadyApplied { file: PathBuf },
}

impl EditResult {
    pub fn is_applied(&self) -> bool {
        matches!(self, EditResult::Applied { .. })
    }
}

impl Edit {
    /// Create a new edit with automatic verification generation.
    pub fn new(
        file: impl Into<PathBuf>,
        byte_start: usize,
        byte_end: usize,
        new_text: impl Into<String>,
        expected_before: impl Into<String>,
    ) -> Self {
        let expected = expected_before.into();
        Self {
            file: file.into(),
            byte_start,
            byte_end,
            new_text: new_text.into(),
            expected_before: EditVerification::from_text(&expected),
        }
    }

    /// Zero-width insertion at `at`.
    pub fn insert(file: impl Into<PathBuf>, at: usize, text: impl Into<String>) -> Self {
        Self::new(file, at, at, text, "")
    }

    /// Validate the edit against the current contents.
    ///
    /// Returns the current text at [byte_start, byte_end) if validation succeeds.
    fn validate<'a>(&self, content: &'a [u8]) -> Result<&'a str, EditError> {
        if self.byte_start > self.byte_end || self.byte_end > content.len() {
            return Err(EditError::InvalidByteRange {
                byte_start: self.byte_start,
                byte_end: self.byte_end,
                file_len: content.len(),
            });
        }

        let current_text = std::str::from_utf8(&content[self.byte_start..self.byte_end])?;

        // Already applied (idempotency)
        if current_text == self.new_text {
            return Ok(current_text);
        }

        if !self.expected_before.matches(current_text) {
            return Err(EditError::BeforeTextMismatch {
                file: self.file.clone(),
                byte_start: self.byte_start,
                byte_end: self.byte_end,
                expected: format!("{:?}", self.expected_before),
                found: current_text.to_string(),
            });
        }

        Ok(current_text)
    }

    /// Apply multiple edits, grouped per file, each file in a single atomic
    /// write.
    ///
    /// Every edit of a file is verified against the file as it is on disk
    /// now; if any check fails the file is left untouched.
    pub fn apply_batch(mut edits: Vec<Edit>) -> Result<Vec<EditResult>, EditError> {
        if edits.is_empty() {
            return Ok(Vec::new());
        }

        // Group by file, keeping document order within a file
        edits.sort_by(|a, b| {
            a.file
                .cmp(&b.file)
                .then(a.byte_start.cmp(&b.byte_start))
                .then(a.byte_end.cmp(&b.byte_end))
        });

        let mut results = Vec::with_capacity(edits.len());
        for file_edits in edits.chunk_by(|a, b| a.file == b.file) {
            results.extend(apply_file_edits(file_edits)?);
        }

        Ok(results)
    }
}

/// Apply edits to an in-memory buffer and return the new text.
///
/// Used for dry runs and for computing rewrites before anything touches
/// disk. The `file` of each edit only labels errors.
pub fn apply_to_str(source: &str, edits: &[Edit]) -> Result<String, EditError> {
    let (content, _) = splice(source.as_bytes(), edits)?;
    // splice validated the result as UTF-8
    String::from_utf8(content).map_err(|_| EditError::InvalidUtf8Edit)
}

/// Validate and splice edits into `content`, bottom-to-top to avoid offset
/// invalidation. Results are reported in the order the edits were given.
fn splice(content: &[u8], edits: &[Edit]) -> Result<(Vec<u8>, Vec<EditResult>), EditError> {
    for edit in edits {
        edit.validate(content)?;
    }

    let mut order: Vec<usize> = (0..edits.len()).collect();
    order.sort_by(|&a, &b| {
        edits[a]
            .byte_start
            .cmp(&edits[b].byte_start)
            .then(edits[a].byte_end.cmp(&edits[b].byte_end))
    });

    // Non-overlapping: earlier edit's end <= later edit's start
    for pair in order.windows(2) {
        let (earlier, later) = (&edits[pair[0]], &edits[pair[1]]);
        if earlier.byte_end > later.byte_start {
            return Err(EditError::Overlap {
                file: later.file.clone(),
                first_end: earlier.byte_end,
                second_start: later.byte_start,
            });
        }
    }

    let mut new_content = content.to_vec();
    let mut results: Vec<Option<EditResult>> = vec![None; edits.len()];

    for &idx in order.iter().rev() {
        let edit = &edits[idx];
        let current_text = std::str::from_utf8(&new_content[edit.byte_start..edit.byte_end])?;

        if current_text == edit.new_text {
            results[idx] = Some(EditResult::AlreadyApplied {
                file: edit.file.clone(),
            });
            continue;
        }

        new_content.splice(
            edit.byte_start..edit.byte_end,
            edit.new_text.as_bytes().iter().copied(),
        );

        results[idx] = Some(EditResult::Applied {
            file: edit.file.clone(),
            bytes_changed: edit.new_text.len(),
        });
    }

    std::str::from_utf8(&new_content).map_err(|_| EditError::InvalidUtf8Edit)?;

    Ok((new_content, results.into_iter().flatten().collect()))
}

/// Apply multiple edits to a single file atomically.
fn apply_file_edits(edits: &[Edit]) -> Result<Vec<EditResult>, EditError> {
    let Some(first) = edits.first() else {
        return Ok(Vec::new());
    };

    let file = &first.file;
    let original_content = fs::read(file)?;
    let (new_content, results) = splice(&original_content, edits)?;

    if results.iter().any(EditResult::is_applied) {
        atomic_write(file, &new_content)?;
    }

    Ok(results)
}

/// Atomic file write: tempfile + fsync + rename.
///
/// Either the full write succeeds or nothing changes.
fn atomic_write(path: &Path, content: &[u8]) -> Result<(), EditError> {
    // Create tempfile in same directory to ensure same filesystem
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        Some(_) => Path::new("."),
        None => {
            return Err(EditError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Path has no parent directory",
            )))
        }
    };

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;

    // Keep the original file's permissions across the rename
    if let Ok(metadata) = fs::metadata(path) {
        temp.as_file().set_permissions(metadata.permissions())?;
    }

    temp.persist(path).map_err(|e| e.error)?;

    Ok(())
}
