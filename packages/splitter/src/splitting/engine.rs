//! Chapter aggregator that walks the outline and produces chapters.

use super::strategy::{CutDecision, CutStrategy};
use super::types::SplitContext;
use crate::config::BODY_SEPARATOR;
use crate::content::ContentResolver;
use crate::types::{ChapterRecord, NavNode, Outline};

/// A node waiting to be visited, with the titles of its ancestors.
struct Frame<'a> {
    node: &'a NavNode,
    depth: usize,
    parent_titles: Vec<String>,
}

/// Engine for cutting an outline into chapters.
///
/// Walks the tree in document order using the cut strategy to find cut
/// points and the resolver to collect the text below each of them.
/// Traversal uses explicit stacks, so outline depth never grows the call
/// stack.
pub struct ChapterAggregator<R: ContentResolver, S: CutStrategy> {
    resolver: R,
    strategy: S,
}

impl<R: ContentResolver, S: CutStrategy> ChapterAggregator<R, S> {
    /// Create a new aggregator.
    #[must_use]
    pub fn new(resolver: R, strategy: S) -> Self {
        Self { resolver, strategy }
    }

    /// Cut the outline into chapters, in document order.
    ///
    /// Ordinals are taken from `context`, so a fresh context numbers the
    /// chapters `1..=N`.
    pub fn split(&self, outline: &Outline, context: &mut SplitContext) -> Vec<ChapterRecord> {
        let mut chapters = Vec::new();
        let mut stack: Vec<Frame<'_>> = outline
            .entries
            .iter()
            .rev()
            .map(|node| Frame {
                node,
                depth: 1,
                parent_titles: Vec::new(),
            })
            .collect();

        while let Some(frame) = stack.pop() {
            let mut title_path = frame.parent_titles;
            title_path.push(frame.node.title().to_string());

            match self.strategy.decide(frame.node, frame.depth, context) {
                CutDecision::Cut => {
                    let body = self.aggregate(frame.node, context);
                    let ordinal = context.next_ordinal();
                    tracing::debug!(
                        ordinal,
                        depth = frame.depth,
                        title = %frame.node.title(),
                        "cut chapter"
                    );
                    chapters.push(ChapterRecord {
                        ordinal,
                        title_path,
                        body,
                    });
                }
                CutDecision::Descend => {
                    for child in frame.node.children().iter().rev() {
                        stack.push(Frame {
                            node: child,
                            depth: frame.depth + 1,
                            parent_titles: title_path.clone(),
                        });
                    }
                }
            }
        }

        chapters
    }

    /// Collect the text of a node and all its descendants in pre-order.
    ///
    /// Pieces are separated by a blank line. Nodes without content, and
    /// references that fail to resolve, contribute nothing.
    fn aggregate(&self, node: &NavNode, context: &mut SplitContext) -> String {
        let mut pieces: Vec<String> = Vec::new();
        let mut stack = vec![node];

        while let Some(current) = stack.pop() {
            if let Some(content) = current.content() {
                match self.resolver.resolve(content) {
                    Ok(text) if !text.is_empty() => pieces.push(text),
                    Ok(_) => {}
                    Err(e) => {
                        context.extraction_failures += 1;
                        tracing::warn!(
                            reference = %content,
                            title = %current.title(),
                            error = %e,
                            "Content extraction failed, continuing with empty text"
                        );
                    }
                }
            }
            stack.extend(current.children().iter().rev());
        }

        pieces.join(BODY_SEPARATOR)
    }
}
