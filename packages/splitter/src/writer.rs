//! Chapter file writer.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::CHAPTER_EXTENSION;
use crate::error::{Result, SplitterError};
use crate::types::ChapterRecord;

/// Render a chapter file: the title path header, a blank line, the body.
///
/// ```
/// use outline_splitter::types::ChapterRecord;
/// use outline_splitter::writer::render_chapter;
///
/// let record = ChapterRecord {
///     ordinal: 1,
///     title_path: vec!["Part 1".to_string(), "Intro".to_string()],
///     body: "Hello.".to_string(),
/// };
/// assert_eq!(render_chapter(&record), "Part 1 > Intro\n\nHello.");
/// ```
#[must_use]
pub fn render_chapter(record: &ChapterRecord) -> String {
    format!("{}\n\n{}", record.header(), record.body)
}

/// Writes chapters into one output directory.
#[derive(Debug, Clone)]
pub struct ChapterWriter {
    output_dir: PathBuf,
}

impl ChapterWriter {
    /// Create a writer for an existing output directory.
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Directory chapters are written into.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path of the chapter file with the given name.
    #[must_use]
    pub fn chapter_path(&self, name: &str) -> PathBuf {
        self.output_dir.join(format!("{name}.{CHAPTER_EXTENSION}"))
    }

    /// Write a chapter under `name`.
    ///
    /// Never replaces an existing file: if the file already exists the
    /// write fails. A partially written file is removed again.
    pub fn write(&self, name: &str, record: &ChapterRecord) -> Result<PathBuf> {
        let path = self.chapter_path(name);

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|source| SplitterError::Write {
                path: path.clone(),
                source,
            })?;

        let written = file
            .write_all(render_chapter(record).as_bytes())
            .and_then(|()| file.sync_all());

        if let Err(source) = written {
            drop(file);
            if let Err(e) = fs::remove_file(&path) {
                tracing::warn!(path = %path.display(), error = %e, "Failed to remove partial chapter");
            }
            return Err(SplitterError::Write { path, source });
        }

        Ok(path)
    }
}
