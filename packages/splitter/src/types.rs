//! Core data types for the splitter.
//!
//! The outline is a tree of [`NavNode`]s. Cutting it produces
//! [`ChapterRecord`]s, and writing those produces a [`SplitReport`].

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::{HEADER_SEPARATOR, TITLE_SEPARATOR};

/// Opaque handle to a content unit of the source document.
///
/// Typically an href such as `"chapter01.xhtml"` or `"chapter01.xhtml#s2"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentRef(String);

impl ContentRef {
    /// Create a new content reference.
    #[must_use]
    pub fn new(href: impl Into<String>) -> Self {
        Self(href.into())
    }

    /// The reference as written in the outline.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The reference without any `#fragment` part.
    #[must_use]
    pub fn document(&self) -> &str {
        self.0.split_once('#').map_or(self.0.as_str(), |(doc, _)| doc)
    }

    /// The `#fragment` part, if the reference has a non-empty one.
    #[must_use]
    pub fn fragment(&self) -> Option<&str> {
        self.0
            .split_once('#')
            .map(|(_, fragment)| fragment)
            .filter(|fragment| !fragment.is_empty())
    }
}

impl fmt::Display for ContentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A node in the outline tree.
///
/// A `Branch` always has at least one child; childless nodes are `Leaf`s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavNode {
    /// Node with children.
    Branch {
        title: String,
        content: Option<ContentRef>,
        children: Vec<NavNode>,
    },

    /// Node without children.
    Leaf {
        title: String,
        content: Option<ContentRef>,
    },
}

impl NavNode {
    /// Create a leaf node.
    #[must_use]
    pub fn leaf(title: impl Into<String>, content: Option<ContentRef>) -> Self {
        Self::Leaf {
            title: title.into(),
            content,
        }
    }

    /// Create a node with children.
    ///
    /// An empty child list yields a `Leaf`.
    #[must_use]
    pub fn branch(
        title: impl Into<String>,
        content: Option<ContentRef>,
        children: Vec<NavNode>,
    ) -> Self {
        if children.is_empty() {
            Self::leaf(title, content)
        } else {
            Self::Branch {
                title: title.into(),
                content,
                children,
            }
        }
    }

    /// Display title of this node.
    #[must_use]
    pub fn title(&self) -> &str {
        match self {
            Self::Branch { title, .. } | Self::Leaf { title, .. } => title,
        }
    }

    /// Content reference of this node, if it maps to a content unit.
    #[must_use]
    pub fn content(&self) -> Option<&ContentRef> {
        match self {
            Self::Branch { content, .. } | Self::Leaf { content, .. } => content.as_ref(),
        }
    }

    /// Children of this node in document order.
    #[must_use]
    pub fn children(&self) -> &[NavNode] {
        match self {
            Self::Branch { children, .. } => children,
            Self::Leaf { .. } => &[],
        }
    }
}

/// The outline of a document: its top-level entries in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outline {
    /// Optional document title.
    pub title: Option<String>,

    /// Top-level entries (depth 1).
    pub entries: Vec<NavNode>,
}

impl Outline {
    /// Create an outline from its top-level entries.
    #[must_use]
    pub fn new(entries: Vec<NavNode>) -> Self {
        Self {
            title: None,
            entries,
        }
    }

    /// Whether the outline has no entries at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One chapter produced at a cut point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterRecord {
    /// 1-based position in traversal order.
    pub ordinal: u32,

    /// Titles from the top-level entry down to the cut node, inclusive.
    pub title_path: Vec<String>,

    /// Aggregated text of the cut node and its descendants.
    pub body: String,
}

impl ChapterRecord {
    /// Title path joined for use as a file name candidate.
    #[must_use]
    pub fn full_title(&self) -> String {
        self.title_path.join(TITLE_SEPARATOR)
    }

    /// Title path joined for the chapter header line.
    #[must_use]
    pub fn header(&self) -> String {
        self.title_path.join(HEADER_SEPARATOR)
    }
}

/// A chapter that was persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrittenChapter {
    pub ordinal: u32,
    pub title_path: Vec<String>,
    /// File name without extension, unique within the output directory.
    pub name: String,
    pub path: PathBuf,
}

/// A chapter that could not be persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedChapter {
    pub ordinal: u32,
    pub title_path: Vec<String>,
    pub error: String,
}

/// Outcome of one split run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SplitReport {
    pub written: Vec<WrittenChapter>,
    pub failed: Vec<FailedChapter>,
    /// Number of content references that could not be resolved.
    pub extraction_failures: usize,
}

impl SplitReport {
    /// Number of chapters produced by the traversal.
    #[must_use]
    pub fn chapter_count(&self) -> usize {
        self.written.len() + self.failed.len()
    }

    /// Whether every chapter was written with fully resolved content.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.extraction_failures == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_ref_document_strips_fragment() {
        assert_eq!(ContentRef::new("ch1.xhtml#sec2").document(), "ch1.xhtml");
        assert_eq!(ContentRef::new("ch1.xhtml").document(), "ch1.xhtml");
    }

    #[test]
    fn test_content_ref_fragment() {
        assert_eq!(ContentRef::new("ch1.xhtml#sec2").fragment(), Some("sec2"));
        assert_eq!(ContentRef::new("ch1.xhtml#").fragment(), None);
        assert_eq!(ContentRef::new("ch1.xhtml").fragment(), None);
    }

    #[test]
    fn test_branch_without_children_is_leaf() {
        let node = NavNode::branch("Intro", None, Vec::new());
        assert!(matches!(node, NavNode::Leaf { .. }));
        assert!(node.children().is_empty());
    }

    #[test]
    fn test_node_accessors() {
        let node = NavNode::branch(
            "Part 1",
            Some(ContentRef::new("p1.xhtml")),
            vec![NavNode::leaf("Chapter 1", None)],
        );
        assert_eq!(node.title(), "Part 1");
        assert_eq!(node.content().map(ContentRef::as_str), Some("p1.xhtml"));
        assert_eq!(node.children().len(), 1);
    }

    #[test]
    fn test_chapter_record_titles() {
        let record = ChapterRecord {
            ordinal: 7,
            title_path: vec!["Part 1".to_string(), "Chapter 2".to_string()],
            body: String::new(),
        };
        assert_eq!(record.full_title(), "Part 1_Chapter 2");
        assert_eq!(record.header(), "Part 1 > Chapter 2");
    }

    #[test]
    fn test_report_counts() {
        let mut report = SplitReport::default();
        assert!(report.is_complete());
        report.failed.push(FailedChapter {
            ordinal: 1,
            title_path: vec!["A".to_string()],
            error: "disk full".to_string(),
        });
        assert_eq!(report.chapter_count(), 1);
        assert!(!report.is_complete());
    }
}
