//! Batch text generation over chapter files.
//!
//! Sends each chapter produced by a split run to a chat completions
//! endpoint and saves the generated text under the chapter's name.

mod batch;
mod client;
mod config;

pub use batch::{
    load_chapters, BatchProcessor, ChapterGeneration, ChapterInput, GenerationOutcome,
    DEFAULT_INSTRUCTIONS,
};
pub use client::{ChatCompletionsClient, GenerationRequest, TextGenerator};
pub use config::{GenerationConfig, GenerationConfigBuilder};
