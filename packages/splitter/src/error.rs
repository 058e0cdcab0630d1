//! Error types for the outline splitter.
//!
//! Only the load family of errors (and failure to create the output
//! directory) is fatal to a split run. Content extraction and write errors
//! are reported per chapter and recovered by the caller.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the splitter library.
#[derive(Debug, Error)]
pub enum SplitterError {
    /// The source outline could not be read.
    #[error("Failed to load outline {}: {source}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The source outline is not a valid outline document.
    #[error("Failed to parse outline: {0}")]
    OutlineParse(#[from] serde_yaml_ng::Error),

    /// The outline nests deeper than the traversal accepts.
    #[error("Outline is nested deeper than {max_depth} levels")]
    OutlineTooDeep { max_depth: usize },

    /// A node's content could not be resolved to text.
    #[error("Failed to extract content for '{reference}': {reason}")]
    ContentExtraction { reference: String, reason: String },

    /// A chapter file could not be written.
    #[error("Failed to write chapter {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid caller input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The generation endpoint could not be reached.
    #[error("Generation request failed: {0}")]
    GenerationRequest(#[from] reqwest::Error),

    /// The generation endpoint answered with an error status.
    #[error("Generation API error (status {status}): {message}")]
    GenerationApi { status: u16, message: String },

    /// The generation endpoint answered without any text.
    #[error("Generation API returned an empty response")]
    GenerationEmptyResponse,

    /// A generation task panicked.
    #[error("Generation task panicked: {0}")]
    GenerationPanic(String),
}

impl SplitterError {
    /// Whether this error means the source document could not be loaded.
    #[must_use]
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            Self::Load { .. } | Self::OutlineParse(_) | Self::OutlineTooDeep { .. }
        )
    }
}

/// Result type alias for splitter operations.
pub type Result<T> = std::result::Result<T, SplitterError>;
