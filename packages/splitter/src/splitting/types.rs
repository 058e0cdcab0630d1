//! Types for the splitting traversal.

use crate::config::normalize_level;

/// Per-run state threaded through the traversal.
///
/// Owns the ordinal counter, so every split run starts numbering at 1 and
/// concurrent runs never share a counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitContext {
    /// Depth at which nodes are cut (top-level entries are depth 1).
    pub target_depth: usize,

    /// Number of content references that failed to resolve so far.
    pub extraction_failures: usize,

    /// Last ordinal handed out (0 before the first cut).
    ordinal: u32,
}

impl SplitContext {
    /// Create a fresh context for a requested split level.
    ///
    /// Levels below 1 are treated as 1.
    #[must_use]
    pub fn new(level: i64) -> Self {
        Self {
            target_depth: normalize_level(level),
            extraction_failures: 0,
            ordinal: 0,
        }
    }

    /// Hand out the ordinal for the next cut point.
    pub fn next_ordinal(&mut self) -> u32 {
        self.ordinal += 1;
        self.ordinal
    }

    /// Number of ordinals handed out so far.
    #[must_use]
    pub fn chapters_cut(&self) -> u32 {
        self.ordinal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_context_starts_at_zero() {
        let context = SplitContext::new(2);
        assert_eq!(context.target_depth, 2);
        assert_eq!(context.chapters_cut(), 0);
        assert_eq!(context.extraction_failures, 0);
    }

    #[test]
    fn test_level_below_one_is_clamped() {
        assert_eq!(SplitContext::new(0).target_depth, 1);
        assert_eq!(SplitContext::new(-5).target_depth, 1);
    }

    #[test]
    fn test_ordinals_increase_from_one() {
        let mut context = SplitContext::new(1);
        assert_eq!(context.next_ordinal(), 1);
        assert_eq!(context.next_ordinal(), 2);
        assert_eq!(context.next_ordinal(), 3);
        assert_eq!(context.chapters_cut(), 3);
    }
}
