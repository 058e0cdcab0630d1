//! Outline Splitter - Cut a document's navigation outline into chapter files.
//!
//! This crate walks the table of contents of a document, cuts it at a
//! requested depth, and writes each cut subtree's text to a numbered
//! plain-text file.
//!
//! # Example
//!
//! ```
//! use outline_splitter::outline::OutlineDocument;
//! use outline_splitter::content::DocumentContentResolver;
//! use outline_splitter::Splitter;
//!
//! let yaml = r#"
//! documents:
//!   intro.html: "Welcome."
//!   one.html: "First chapter."
//! toc:
//!   - title: Intro
//!     href: intro.html
//!   - title: Chapter 1
//!     href: one.html
//! "#;
//! let document = OutlineDocument::from_yaml_str(yaml, ".").unwrap();
//! let out = tempfile::tempdir().unwrap();
//!
//! let report = Splitter::new(DocumentContentResolver::new(&document))
//!     .split_outline(document.outline(), out.path(), 1)
//!     .unwrap();
//! assert_eq!(report.written[0].name, "001_Intro");
//! assert_eq!(report.written[1].name, "002_Chapter 1");
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Constants and split level handling
//! - [`types`]: Core data types (NavNode, Outline, ChapterRecord, SplitReport)
//! - [`error`]: Error types and Result alias
//! - [`outline`]: Outline document loading
//! - [`content`]: Content resolution and markup stripping
//! - [`splitting`]: Cut strategy and chapter aggregation
//! - [`naming`]: Chapter name sanitizing and deduplication
//! - [`writer`]: Chapter file output
//! - [`splitter`]: Split orchestration
//! - [`generation`]: Batch text generation over chapter files
//! - [`cli`]: Command-line interface

pub mod cli;
pub mod config;
pub mod content;
pub mod error;
pub mod generation;
pub mod naming;
pub mod outline;
pub mod splitter;
pub mod splitting;
pub mod types;
pub mod writer;

// Re-export main functions
pub use splitter::{split_document, Splitter};

// Re-export commonly used items
pub use content::ContentResolver;
pub use error::{Result, SplitterError};
pub use types::{ChapterRecord, ContentRef, NavNode, Outline, SplitReport};
