use std::any::Any;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;

use super::client::{GenerationRequest, TextGenerator};
use crate::config::CHAPTER_EXTENSION;
use crate::error::{Result, SplitterError};

/// Instructions used when the caller supplies none.
pub const DEFAULT_INSTRUCTIONS: &str = "Rewrite the following book chapter as a \
     self-contained text, keeping its arguments, evidence and key quotations.";

/// A chapter file loaded for generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterInput {
    /// File stem of the chapter, e.g. `003_Part 1_Intro`.
    pub name: String,
    pub text: String,
}

/// A chapter that was generated and saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationOutcome {
    pub chapter: String,
    pub path: PathBuf,
    pub characters: usize,
    pub generated_at: DateTime<Utc>,
}

/// Result of one chapter's generation task.
#[derive(Debug)]
pub struct ChapterGeneration {
    pub chapter: String,
    pub result: Result<GenerationOutcome>,
}

/// Read every chapter file in `dir`, sorted by name.
pub fn load_chapters(dir: &Path) -> Result<Vec<ChapterInput>> {
    let mut chapters = Vec::new();

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(CHAPTER_EXTENSION)
        {
            continue;
        }
        let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
            tracing::warn!(path = %path.display(), "skipping chapter with non UTF-8 name");
            continue;
        };
        chapters.push(ChapterInput {
            name: name.to_string(),
            text: fs::read_to_string(&path)?,
        });
    }

    chapters.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(chapters)
}

/// Runs one generation task per chapter on a bounded worker pool.
pub struct BatchProcessor<G: TextGenerator> {
    generator: G,
    max_workers: usize,
    book_title: String,
    instructions: String,
}

impl<G: TextGenerator> BatchProcessor<G> {
    pub fn new(generator: G, max_workers: usize) -> Self {
        Self {
            generator,
            max_workers: max_workers.max(1),
            book_title: String::new(),
            instructions: DEFAULT_INSTRUCTIONS.to_string(),
        }
    }

    #[must_use]
    pub fn with_book_title(mut self, book_title: impl Into<String>) -> Self {
        self.book_title = book_title.into();
        self
    }

    #[must_use]
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    /// Build the generation request for one chapter.
    pub fn build_request(&self, chapter: &ChapterInput) -> GenerationRequest {
        let mut prompt = String::new();
        if !self.book_title.is_empty() {
            prompt.push_str(&format!("Book: {}\n", self.book_title));
        }
        prompt.push_str(&format!("Chapter: {}\n\n{}", chapter.name, chapter.text));

        GenerationRequest {
            system: self.instructions.clone(),
            prompt,
        }
    }

    /// Generate every chapter into `output_dir`.
    ///
    /// Only preparing the pool and the output directory can fail the batch.
    /// A failing chapter is reported in its own entry and never cancels the
    /// others. Entries are not guaranteed to follow input order.
    pub fn run(
        &self,
        chapters: &[ChapterInput],
        output_dir: &Path,
    ) -> Result<Vec<ChapterGeneration>> {
        fs::create_dir_all(output_dir)?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_workers)
            .thread_name(|i| format!("generate-{i}"))
            .build()
            .map_err(|e| SplitterError::Config(format!("failed to start worker pool: {e}")))?;

        tracing::info!(
            chapters = chapters.len(),
            workers = self.max_workers,
            "starting generation batch"
        );

        let results = pool.install(|| {
            chapters
                .par_iter()
                .map(|chapter| ChapterGeneration {
                    chapter: chapter.name.clone(),
                    result: panic::catch_unwind(AssertUnwindSafe(|| {
                        self.process(chapter, output_dir)
                    }))
                    .unwrap_or_else(|payload| {
                        Err(SplitterError::GenerationPanic(panic_message(payload.as_ref())))
                    }),
                })
                .collect::<Vec<_>>()
        });

        for generation in &results {
            if let Err(e) = &generation.result {
                tracing::error!(chapter = %generation.chapter, error = %e, "chapter generation failed");
            }
        }

        Ok(results)
    }

    fn process(&self, chapter: &ChapterInput, output_dir: &Path) -> Result<GenerationOutcome> {
        let text = self.generator.generate(&self.build_request(chapter))?;

        let path = output_dir.join(format!("{}.{CHAPTER_EXTENSION}", chapter.name));
        fs::write(&path, &text).map_err(|source| SplitterError::Write {
            path: path.clone(),
            source,
        })?;

        tracing::info!(chapter = %chapter.name, path = %path.display(), "generated chapter");

        Ok(GenerationOutcome {
            chapter: chapter.name.clone(),
            path,
            characters: text.chars().count(),
            generated_at: Utc::now(),
        })
    }
}

/// Text of a panic payload, when it carries one.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tempfile::tempdir;

    use super::*;

    /// Generator that uppercases the prompt and fails for chapters named in `failing`.
    struct FakeGenerator {
        failing: &'static str,
        calls: AtomicUsize,
    }

    impl FakeGenerator {
        fn new(failing: &'static str) -> Self {
            Self {
                failing,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl TextGenerator for FakeGenerator {
        fn generate(&self, request: &GenerationRequest) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if request.prompt.contains(self.failing) {
                return Err(SplitterError::GenerationApi {
                    status: 500,
                    message: "boom".into(),
                });
            }
            Ok(request.prompt.to_uppercase())
        }
    }

    fn chapter(name: &str, text: &str) -> ChapterInput {
        ChapterInput {
            name: name.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_load_chapters_sorted_and_filtered() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("002_B.txt"), "bee").unwrap();
        fs::write(dir.path().join("001_A.txt"), "ay").unwrap();
        fs::write(dir.path().join("notes.md"), "skip").unwrap();

        let chapters = load_chapters(dir.path()).unwrap();

        assert_eq!(chapters, vec![chapter("001_A", "ay"), chapter("002_B", "bee")]);
    }

    #[test]
    fn test_load_chapters_missing_dir() {
        let dir = tempdir().unwrap();
        assert!(load_chapters(&dir.path().join("missing")).is_err());
    }

    #[test]
    fn test_build_request() {
        let processor = BatchProcessor::new(FakeGenerator::new("-"), 2)
            .with_book_title("Money")
            .with_instructions("Summarize.");

        let request = processor.build_request(&chapter("001_Intro", "Text."));

        assert_eq!(request.system, "Summarize.");
        assert_eq!(request.prompt, "Book: Money\nChapter: 001_Intro\n\nText.");
    }

    #[test]
    fn test_build_request_without_title() {
        let processor = BatchProcessor::new(FakeGenerator::new("-"), 2);
        let request = processor.build_request(&chapter("001_Intro", "Text."));
        assert_eq!(request.system, DEFAULT_INSTRUCTIONS);
        assert_eq!(request.prompt, "Chapter: 001_Intro\n\nText.");
    }

    #[test]
    fn test_run_isolates_failures() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("generated");
        let chapters = vec![
            chapter("001_A", "first"),
            chapter("002_B", "second"),
            chapter("003_C", "third"),
        ];
        let processor = BatchProcessor::new(FakeGenerator::new("002_B"), 3);

        let results = processor.run(&chapters, &out).unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(processor.generator.calls.load(Ordering::SeqCst), 3);

        let failed: Vec<&str> = results
            .iter()
            .filter(|r| r.result.is_err())
            .map(|r| r.chapter.as_str())
            .collect();
        assert_eq!(failed, vec!["002_B"]);

        assert_eq!(
            fs::read_to_string(out.join("001_A.txt")).unwrap(),
            "CHAPTER: 001_A\n\nFIRST"
        );
        assert!(out.join("003_C.txt").exists());
        assert!(!out.join("002_B.txt").exists());
    }

    /// Generator that panics for one chapter.
    struct PanickingGenerator;

    impl TextGenerator for PanickingGenerator {
        #[allow(clippy::panic)]
        fn generate(&self, request: &GenerationRequest) -> Result<String> {
            if request.prompt.contains("002_B") {
                panic!("generator crashed");
            }
            Ok("done".to_string())
        }
    }

    #[test]
    fn test_run_isolates_panics() {
        let dir = tempdir().unwrap();
        let chapters = vec![chapter("001_A", "first"), chapter("002_B", "second")];
        let processor = BatchProcessor::new(PanickingGenerator, 2);

        let results = processor.run(&chapters, dir.path()).unwrap();

        assert_eq!(results.len(), 2);
        let crashed = results.iter().find(|r| r.chapter == "002_B").unwrap();
        match &crashed.result {
            Err(SplitterError::GenerationPanic(message)) => {
                assert_eq!(message, "generator crashed");
            }
            other => panic!("expected a panic error, got {other:?}"),
        }
        assert_eq!(fs::read_to_string(dir.path().join("001_A.txt")).unwrap(), "done");
    }

    #[test]
    fn test_run_empty_batch() {
        let dir = tempdir().unwrap();
        let processor = BatchProcessor::new(FakeGenerator::new("-"), 1);
        let results = processor.run(&[], dir.path()).unwrap();
        assert!(results.is_empty());
    }
}
