//! Chapter name derivation: sanitizing title paths and deduplicating names.

use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::{CHAPTER_EXTENSION, MAX_TITLE_BYTES, NAME_PLACEHOLDER, ORDINAL_WIDTH};
use crate::error::Result;
use crate::types::ChapterRecord;

/// Characters that may not appear in a chapter file name: `\ / * ? : " < > |`
/// and control characters.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static ILLEGAL_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[\\/*?:"<>|\p{Cc}]"#).expect("valid regex"));

/// Make a title safe for use in a file name.
///
/// Strips illegal characters and surrounding whitespace, caps the length at
/// [`MAX_TITLE_BYTES`], and falls back to a placeholder when nothing is left.
///
/// # Examples
/// ```
/// use outline_splitter::naming::sanitize_title;
///
/// assert_eq!(sanitize_title("Part 1_What? Why: \"Because\""), "Part 1_What Why Because");
/// assert_eq!(sanitize_title(" /// "), "chapter");
/// ```
#[must_use]
pub fn sanitize_title(title: &str) -> String {
    let stripped = ILLEGAL_NAME_PATTERN.replace_all(title, "");
    let capped = truncate_to_bytes(stripped.trim(), MAX_TITLE_BYTES).trim();

    if capped.is_empty() {
        NAME_PLACEHOLDER.to_string()
    } else {
        capped.to_string()
    }
}

/// Longest prefix of `text` that fits in `max_bytes` without splitting a char.
fn truncate_to_bytes(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Candidate name for a chapter: zero-padded ordinal plus sanitized title path.
///
/// ```
/// use outline_splitter::naming::chapter_name;
/// use outline_splitter::types::ChapterRecord;
///
/// let record = ChapterRecord {
///     ordinal: 7,
///     title_path: vec!["Part 1".to_string(), "Intro".to_string()],
///     body: String::new(),
/// };
/// assert_eq!(chapter_name(&record), "007_Part 1_Intro");
/// ```
#[must_use]
pub fn chapter_name(record: &ChapterRecord) -> String {
    format!(
        "{:0width$}_{}",
        record.ordinal,
        sanitize_title(&record.full_title()),
        width = ORDINAL_WIDTH
    )
}

/// Names already used in the current run's output directory.
///
/// Seeded from the chapter files present when the run starts and updated
/// as names are reserved, so a name is never handed out twice and an
/// existing file is never overwritten. Not shared between runs.
#[derive(Debug, Default)]
pub struct NameRegistry {
    taken: HashSet<String>,
}

impl NameRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the names of chapter files already in `dir`.
    ///
    /// Subdirectories are not chapter files and are not recorded. A directory
    /// that does not exist yet holds no names.
    pub fn from_directory(dir: &Path) -> Result<Self> {
        let mut registry = Self::new();

        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(registry),
            Err(e) => return Err(e.into()),
        };

        for entry in entries {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                continue;
            }
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(CHAPTER_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                registry.taken.insert(stem.to_string());
            }
        }

        if !registry.taken.is_empty() {
            tracing::debug!(
                dir = %dir.display(),
                existing = registry.taken.len(),
                "output directory already holds chapter files"
            );
        }

        Ok(registry)
    }

    /// Whether a name is already in use.
    #[must_use]
    pub fn is_taken(&self, name: &str) -> bool {
        self.taken.contains(name)
    }

    /// Reserve `base`, or the first free `base_1`, `base_2`, ... if taken.
    pub fn reserve(&mut self, base: &str) -> String {
        if self.taken.insert(base.to_string()) {
            return base.to_string();
        }

        let mut suffix = 1u32;
        loop {
            let candidate = format!("{base}_{suffix}");
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            suffix += 1;
        }
    }
}
