//! Split orchestration: load, cut, name and write.

use std::fs;
use std::path::Path;

use crate::content::{ContentResolver, DocumentContentResolver};
use crate::error::Result;
use crate::naming::{chapter_name, NameRegistry};
use crate::outline::OutlineDocument;
use crate::splitting::{ChapterAggregator, CutStrategy, DepthCutStrategy, SplitContext};
use crate::types::{FailedChapter, Outline, SplitReport, WrittenChapter};
use crate::writer::ChapterWriter;

/// Drives one split run over an outline.
///
/// Every call to [`Splitter::split_outline`] starts with a fresh ordinal
/// counter and a fresh name registry, so a `Splitter` can be reused.
/// Chapters are named and written strictly one after another.
pub struct Splitter<R: ContentResolver, S: CutStrategy = DepthCutStrategy> {
    aggregator: ChapterAggregator<R, S>,
}

impl<R: ContentResolver> Splitter<R, DepthCutStrategy> {
    /// Create a splitter using the default depth cut strategy.
    #[must_use]
    pub fn new(resolver: R) -> Self {
        Self::with_strategy(resolver, DepthCutStrategy)
    }
}

impl<R: ContentResolver, S: CutStrategy> Splitter<R, S> {
    /// Create a splitter with a custom cut strategy.
    #[must_use]
    pub fn with_strategy(resolver: R, strategy: S) -> Self {
        Self {
            aggregator: ChapterAggregator::new(resolver, strategy),
        }
    }

    /// Split an outline into chapter files in `output_dir`.
    ///
    /// Only failing to prepare the output directory is an error. Chapters
    /// that cannot be written, and content that cannot be resolved, are
    /// logged and recorded in the report.
    pub fn split_outline(
        &self,
        outline: &Outline,
        output_dir: &Path,
        level: i64,
    ) -> Result<SplitReport> {
        fs::create_dir_all(output_dir)?;

        let mut context = SplitContext::new(level);
        let mut names = NameRegistry::from_directory(output_dir)?;
        let writer = ChapterWriter::new(output_dir);

        let chapters = self.aggregator.split(outline, &mut context);
        tracing::debug!(
            target_depth = context.target_depth,
            chapters = chapters.len(),
            "outline cut into chapters"
        );

        let mut report = SplitReport {
            extraction_failures: context.extraction_failures,
            ..SplitReport::default()
        };

        for record in chapters {
            let name = names.reserve(&chapter_name(&record));

            match writer.write(&name, &record) {
                Ok(path) => {
                    tracing::info!(
                        ordinal = record.ordinal,
                        chapter = %record.header(),
                        path = %path.display(),
                        "Saved chapter"
                    );
                    report.written.push(WrittenChapter {
                        ordinal: record.ordinal,
                        title_path: record.title_path,
                        name,
                        path,
                    });
                }
                Err(e) => {
                    tracing::error!(
                        ordinal = record.ordinal,
                        chapter = %record.header(),
                        error = %e,
                        "Failed to save chapter"
                    );
                    report.failed.push(FailedChapter {
                        ordinal: record.ordinal,
                        title_path: record.title_path,
                        error: e.to_string(),
                    });
                }
            }
        }

        Ok(report)
    }
}

/// Load an outline document and split it into `output_dir`.
///
/// If the document cannot be loaded the error is returned before the
/// output directory is created.
///
/// # Arguments
/// * `source` - Path to the outline document (YAML or JSON)
/// * `output_dir` - Directory to write chapter files into (created if missing)
/// * `level` - Split depth; values below 1 are treated as 1
pub fn split_document(source: &Path, output_dir: &Path, level: i64) -> Result<SplitReport> {
    let document = OutlineDocument::load(source)?;
    let resolver = DocumentContentResolver::new(&document);
    Splitter::new(resolver).split_outline(document.outline(), output_dir, level)
}
