//! Command-line interface for the outline splitter.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::DEFAULT_SPLIT_LEVEL;
use crate::error::{Result, SplitterError};
use crate::generation::{load_chapters, BatchProcessor, ChatCompletionsClient, GenerationConfig};
use crate::splitter::split_document;

/// Outline Splitter - Cut a document outline into numbered chapter files.
#[derive(Parser)]
#[command(name = "outline-splitter")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Split an outline document into chapter files.
    Split {
        /// Outline document (YAML or JSON)
        source: PathBuf,

        /// Directory to write chapters into (created if missing)
        output_dir: PathBuf,

        /// Outline depth to cut at; values below 1 are treated as 1
        #[arg(short, long, default_value_t = DEFAULT_SPLIT_LEVEL, allow_negative_numbers = true)]
        level: i64,
    },

    /// Generate text for every chapter file in a directory.
    Generate {
        /// Directory holding chapter files from a split run
        chapters_dir: PathBuf,

        /// Directory to write generated chapters into
        output_dir: PathBuf,

        /// Number of chapters to generate concurrently (default: LLM_MAX_WORKERS)
        #[arg(short, long)]
        workers: Option<usize>,

        /// Book title passed along with every chapter
        #[arg(short, long)]
        book_title: Option<String>,

        /// File with generation instructions
        #[arg(short, long)]
        instructions: Option<PathBuf>,
    },
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Split {
            source,
            output_dir,
            level,
        } => split_command(&source, &output_dir, level),
        Commands::Generate {
            chapters_dir,
            output_dir,
            workers,
            book_title,
            instructions,
        } => generate_command(
            &chapters_dir,
            &output_dir,
            workers,
            book_title.as_deref(),
            instructions.as_deref(),
        ),
    }
}

fn spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Execute the split command.
fn split_command(source: &Path, output_dir: &Path, level: i64) -> Result<()> {
    println!(
        "{} {} at level {}",
        style("Splitting").bold(),
        style(source.display()).cyan(),
        style(level).green()
    );
    println!();

    let pb = spinner();
    pb.set_message("Writing chapters...");

    let report = match split_document(source, output_dir, level) {
        Ok(report) => report,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };

    pb.finish_and_clear();

    println!("  Chapters: {}", report.chapter_count());
    println!("  Written: {}", style(report.written.len()).green());
    if !report.failed.is_empty() {
        println!("  Failed: {}", style(report.failed.len()).red().bold());
    }
    if report.extraction_failures > 0 {
        println!(
            "  Missing content: {}",
            style(report.extraction_failures).yellow().bold()
        );
    }

    println!();
    println!(
        "{} {}",
        style("Saved to:").green().bold(),
        output_dir.display()
    );

    Ok(())
}

/// Execute the generate command.
fn generate_command(
    chapters_dir: &Path,
    output_dir: &Path,
    workers: Option<usize>,
    book_title: Option<&str>,
    instructions: Option<&Path>,
) -> Result<()> {
    let config = GenerationConfig::from_env()?;

    // Read inputs before starting any requests
    let instructions = instructions.map(fs::read_to_string).transpose()?;
    if !chapters_dir.is_dir() {
        return Err(SplitterError::InvalidInput(format!(
            "Chapters directory does not exist: {}",
            chapters_dir.display()
        )));
    }
    let chapters = load_chapters(chapters_dir)?;

    println!(
        "{} {} chapters with {}",
        style("Generating").bold(),
        style(chapters.len()).cyan(),
        style(&config.model).green()
    );
    println!();

    let client = ChatCompletionsClient::new(&config)?;
    let mut processor = BatchProcessor::new(client, workers.unwrap_or(config.max_workers));
    if let Some(title) = book_title {
        processor = processor.with_book_title(title);
    }
    if let Some(text) = instructions {
        processor = processor.with_instructions(text);
    }

    let pb = spinner();
    pb.set_message("Waiting for generated chapters...");

    let results = match processor.run(&chapters, output_dir) {
        Ok(results) => results,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };

    pb.finish_and_clear();

    let failed: Vec<_> = results.iter().filter(|r| r.result.is_err()).collect();
    println!("  Generated: {}", style(results.len() - failed.len()).green());
    if !failed.is_empty() {
        println!("  Failed: {}", style(failed.len()).red().bold());
        for generation in failed {
            if let Err(e) = &generation.result {
                println!("    {} {e}", style(&generation.chapter).yellow());
            }
        }
    }

    println!();
    println!(
        "{} {}",
        style("Saved to:").green().bold(),
        output_dir.display()
    );

    Ok(())
}
