mod error;
mod parser;
mod settings;
mod stamp;
mod store;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use error::ClippingsError;
use parser::book::BookRecord;
use parser::Mode;
use settings::Settings;
use store::DiskStore;

#[derive(Parser)]
#[command(name = "clippings", about = "Split a Kindle clippings export into one file per book")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write one deduplicated file per book
    Parse {
        /// Clippings export (default: "My Clippings - Kindle.txt")
        input: Option<PathBuf>,
        /// Output folder (default: "Parsed Annotations")
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Replace existing book files instead of merging into them
        #[arg(long)]
        overwrite: bool,
        /// Do not record the parse date
        #[arg(long)]
        no_stamp: bool,
        /// No progress spinner
        #[arg(short, long)]
        quiet: bool,
    },
    /// List books found in the export without writing anything
    Books {
        input: Option<PathBuf>,
        /// Max rows to display
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
    },
    /// Show when the last successful parse ran
    Last,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let Some(ClippingsError::InputNotFound(path)) = err.downcast_ref::<ClippingsError>() {
                eprintln!("File not found: {}", path.display());
                return ExitCode::from(2);
            }
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let t0 = Instant::now();
    let mut settings = Settings::load().context("Failed to load settings")?;

    match cli.command {
        Commands::Parse {
            input,
            output,
            overwrite,
            no_stamp,
            quiet,
        } => {
            if let Some(input) = input {
                settings.input = input;
            }
            if let Some(output) = output {
                settings.output = output;
            }
            if overwrite {
                settings.merge = false;
            }
            if no_stamp {
                settings.date_stamp = false;
            }
            info!(?settings, "Starting parse");

            let count = if quiet {
                let mode = Mode::from_merge_flag(settings.merge);
                parser::parse(&DiskStore, &settings.input, &settings.output, mode)?
            } else {
                parse_books(&settings)?
            };
            println!("Parsing complete.\n{} annotation entries created.", count);

            if settings.date_stamp {
                let now = chrono::Local::now().naive_local();
                stamp::append(&settings.stamp_file, now).with_context(|| {
                    format!("Failed to write {}", settings.stamp_file.display())
                })?;
            }
        }
        Commands::Books { input, limit } => {
            if let Some(input) = input {
                settings.input = input;
            }
            let books = parser::load(&DiskStore, &settings.input)?;
            if books.is_empty() {
                println!("No books found in {}.", settings.input.display());
                return Ok(());
            }

            println!("{:>3} | {:<40} | {:<24} | {:>6} | {}", "#", "Title", "Author", "Blocks", "File");
            println!("{}", "-".repeat(110));
            for (i, header) in books.headers().take(limit).enumerate() {
                let blocks = books.get(header).map_or(0, BookRecord::len);
                let (title, author) = parser::writer::title_author(header);
                println!(
                    "{:>3} | {:<40} | {:<24} | {:>6} | {}",
                    i + 1,
                    truncate(title, 40),
                    truncate(author, 24),
                    blocks,
                    parser::writer::file_name(header)
                );
            }
            let blocks: usize = books.iter().map(|(_, r)| r.len()).sum();
            println!("\n{} books, {} unique blocks", books.len(), blocks);
        }
        Commands::Last => match stamp::last(&settings.stamp_file)? {
            Some(when) => println!("Last parse: {}", when),
            None => println!("No parse recorded in {}.", settings.stamp_file.display()),
        },
    }

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }
    Ok(())
}

fn parse_books(settings: &Settings) -> anyhow::Result<usize> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {pos} books {msg}")?,
    );

    let mode = Mode::from_merge_flag(settings.merge);
    let count = parser::parse_with(&DiskStore, &settings.input, &settings.output, mode, |w| {
        let file = w.path.file_name().unwrap_or_default().to_string_lossy();
        pb.set_message(format!("{} ({} blocks) -> {}", truncate(&w.header, 40), w.blocks, file));
        pb.inc(1);
    })?;

    pb.finish_and_clear();
    Ok(count)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}
