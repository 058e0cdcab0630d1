//! Outline splitting.
//!
//! Walks the outline depth-first in document order and cuts it into
//! chapters at a target depth. A cut collapses the whole subtree below the
//! cut node into one chapter body.

mod engine;
mod strategy;
mod types;

pub use engine::ChapterAggregator;
pub use strategy::{CutDecision, CutStrategy, DepthCutStrategy};
pub use types::SplitContext;
