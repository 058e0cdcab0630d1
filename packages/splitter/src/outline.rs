//! Outline document loading.
//!
//! The source document is a format-neutral YAML (or JSON) outline:
//!
//! ```yaml
//! title: Example Book
//! documents:
//!   intro.xhtml: "<html><body><p>Welcome.</p></body></html>"
//! toc:
//!   - title: Part One
//!     href: intro.xhtml
//!     children:
//!       - title: Chapter 1
//!         href: chapters/ch1.txt
//! ```
//!
//! Entries reference content units by `href`. An href is looked up in the
//! inline `documents` map first and otherwise read from a file relative to
//! the outline file's directory.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use unicode_normalization::UnicodeNormalization;

use crate::config::MAX_OUTLINE_DEPTH;
use crate::error::{Result, SplitterError};
use crate::types::{ContentRef, NavNode, Outline};

/// Outline document as written on disk.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawOutlineDocument {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    documents: HashMap<String, String>,
    #[serde(default)]
    toc: Vec<RawEntry>,
}

/// One outline entry as written on disk.
#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(default)]
    title: String,
    #[serde(default)]
    href: Option<String>,
    #[serde(default)]
    children: Vec<RawEntry>,
}

/// A loaded outline together with the content units it references.
#[derive(Debug, Clone)]
pub struct OutlineDocument {
    outline: Outline,
    documents: HashMap<String, String>,
    base_dir: PathBuf,
}

impl OutlineDocument {
    /// Load an outline document from a file.
    ///
    /// The file's directory becomes the base for file-backed hrefs.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| SplitterError::Load {
            path: path.to_path_buf(),
            source,
        })?;
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let document = Self::from_yaml_str(&text, base_dir)?;
        tracing::debug!(
            path = %path.display(),
            entries = document.outline.entries.len(),
            documents = document.documents.len(),
            "loaded outline"
        );
        Ok(document)
    }

    /// Parse an outline document from YAML or JSON text.
    pub fn from_yaml_str(text: &str, base_dir: impl Into<PathBuf>) -> Result<Self> {
        let raw: RawOutlineDocument = serde_yaml_ng::from_str(text)?;

        let entries = raw
            .toc
            .into_iter()
            .map(|entry| convert_entry(entry, 1))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            outline: Outline {
                title: raw.title.map(|t| normalize_title(&t)),
                entries,
            },
            documents: raw.documents,
            base_dir: base_dir.into(),
        })
    }

    /// The outline tree.
    #[must_use]
    pub fn outline(&self) -> &Outline {
        &self.outline
    }

    /// Inline content unit for an href, if the document embeds one.
    #[must_use]
    pub fn inline_document(&self, href: &str) -> Option<&str> {
        self.documents.get(href).map(String::as_str)
    }

    /// Directory that file-backed hrefs are resolved against.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

/// Convert a raw entry into a node, rejecting outlines nested too deep.
fn convert_entry(entry: RawEntry, depth: usize) -> Result<NavNode> {
    if depth > MAX_OUTLINE_DEPTH {
        return Err(SplitterError::OutlineTooDeep {
            max_depth: MAX_OUTLINE_DEPTH,
        });
    }

    let content = entry
        .href
        .map(|href| href.trim().to_string())
        .filter(|href| !href.is_empty())
        .map(ContentRef::new);

    let children = entry
        .children
        .into_iter()
        .map(|child| convert_entry(child, depth + 1))
        .collect::<Result<Vec<_>>>()?;

    Ok(NavNode::branch(normalize_title(&entry.title), content, children))
}

/// NFC-normalize and trim a title.
fn normalize_title(title: &str) -> String {
    title.nfc().collect::<String>().trim().to_string()
}
