//! # CLI Module
//!
//! Command-line interface for garment image similarity.
//!
//! ## Usage
//! ```bash
//! # Score candidates against a reference (name=path, or just a path)
//! wardrobe-sim compare shirt.jpg red=red_shirt.png blue_shirt.webp
//!
//! # Show per-channel agreement
//! wardrobe-sim compare shirt.jpg a.png --verbose
//!
//! # Answer a JSON request body
//! wardrobe-sim request body.json --base-dir ./clothes --output json
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::thread;
use wardrobe_similarity::core::batch::{BatchComparator, BatchReport, CandidateOutcome};
use wardrobe_similarity::core::decoder::ImageSource;
use wardrobe_similarity::core::request::{SimilarityRequest, SimilarityResponse};
use wardrobe_similarity::core::scorer::{ResizeFilter, CHANNEL_NAMES};
use wardrobe_similarity::error::{Result, WardrobeError};
use wardrobe_similarity::events::{BatchEvent, Event, EventChannel, ReferenceEvent};

/// Wardrobe Similarity - How alike are these garments?
#[derive(Parser, Debug)]
#[command(name = "wardrobe-sim")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score candidate images against a reference image
    Compare {
        /// Reference image
        reference: PathBuf,

        /// Candidates as NAME=PATH, or PATH to name by file stem.
        /// Anything before the first '=' is taken as the name, so a path
        /// containing '=' needs an explicit name: x=out=v2/a.png
        #[arg(required = true, value_parser = parse_candidate)]
        candidates: Vec<(String, PathBuf)>,

        #[command(flatten)]
        options: RunOptions,
    },
    /// Answer a JSON similarity request: {"image": ..., "images": {...}}
    Request {
        /// Request body file
        file: PathBuf,

        /// Directory that relative identifiers are resolved against
        #[arg(long)]
        base_dir: Option<PathBuf>,

        #[command(flatten)]
        options: RunOptions,
    },
}

#[derive(clap::Args, Debug)]
struct RunOptions {
    /// Resampling filter for the 256x256 resize
    #[arg(short, long, default_value = "bilinear")]
    filter: Filter,

    /// Worker threads (defaults to one per core)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Output format
    #[arg(short, long, default_value = "pretty")]
    output: OutputFormat,

    /// Show per-channel agreement
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Filter {
    /// Nearest neighbour - fastest
    Nearest,
    /// Bilinear - good balance (default)
    Bilinear,
    /// Lanczos3 - sharpest
    Lanczos3,
}

impl From<Filter> for ResizeFilter {
    fn from(filter: Filter) -> Self {
        match filter {
            Filter::Nearest => ResizeFilter::Nearest,
            Filter::Bilinear => ResizeFilter::Bilinear,
            Filter::Lanczos3 => ResizeFilter::Lanczos3,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON response body
    Json,
    /// One "name score" line per candidate
    Minimal,
}

/// Parse `NAME=PATH`, or `PATH` named after its file stem
fn parse_candidate(arg: &str) -> std::result::Result<(String, PathBuf), String> {
    if let Some((name, path)) = arg.split_once('=') {
        if name.is_empty() || path.is_empty() {
            return Err(format!("expected NAME=PATH, got '{}'", arg));
        }
        return Ok((name.to_string(), PathBuf::from(path)));
    }

    let path = PathBuf::from(arg);
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| format!("cannot derive a candidate name from '{}'", arg))?
        .to_string();
    Ok((name, path))
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Compare {
            reference,
            candidates,
            options,
        } => {
            let mut sources = BTreeMap::new();
            for (name, path) in candidates {
                if sources.insert(name.clone(), ImageSource::Path(path)).is_some() {
                    return Err(WardrobeError::Config(format!(
                        "candidate name '{}' given more than once",
                        name
                    )));
                }
            }
            run_batch(ImageSource::Path(reference), sources, &options)
        }
        Commands::Request {
            file,
            base_dir,
            options,
        } => {
            let request = SimilarityRequest::from_file(&file)?;
            let base_dir = base_dir.or_else(|| file.parent().map(Path::to_path_buf));
            let (reference, candidates) = request.into_sources(base_dir.as_deref())?;
            run_batch(reference, candidates, &options)
        }
    }
}

fn run_batch(
    reference: ImageSource,
    candidates: BTreeMap<String, ImageSource>,
    options: &RunOptions,
) -> Result<()> {
    let term = Term::stderr();
    let pretty = matches!(options.output, OutputFormat::Pretty);

    if pretty {
        term.write_line(&format!(
            "{} {}",
            style("Wardrobe Similarity").bold().cyan(),
            style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
        term.write_line("").ok();
    }

    let mut builder = BatchComparator::builder().filter(options.filter.into());
    if let Some(threads) = options.threads {
        builder = builder.threads(threads);
    }
    let comparator = builder.build()?;

    let (sender, receiver) = EventChannel::new();

    let progress = if pretty {
        let pb = ProgressBar::new(candidates.len() as u64);
        if let Ok(bar_style) =
            ProgressStyle::default_bar().template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(bar_style.progress_chars("█▓░"));
        }
        Some(pb)
    } else {
        None
    };

    let progress_clone = progress.clone();

    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            let Some(ref pb) = progress_clone else {
                continue;
            };
            match event {
                Event::Reference(ReferenceEvent::Prepared { name, width, height }) => {
                    pb.set_message(format!("reference {} ({}x{})", name, width, height));
                }
                Event::Batch(BatchEvent::Progress(p)) => {
                    pb.set_position(p.completed as u64);
                    pb.set_message(p.current_name);
                }
                Event::Batch(BatchEvent::Completed { .. }) => {
                    pb.finish_and_clear();
                }
                _ => {}
            }
        }
    });

    let result = comparator.compare_with_events(&reference, &candidates, &sender);

    // Dropping the sender ends the event thread's loop
    drop(sender);
    event_thread.join().ok();
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let report = result?;

    match options.output {
        OutputFormat::Pretty => print_pretty_results(&term, &report, options.verbose),
        OutputFormat::Json => print_json_results(&report, options.verbose)?,
        OutputFormat::Minimal => print_minimal_results(&report),
    }

    Ok(())
}

fn print_pretty_results(term: &Term, report: &BatchReport, verbose: bool) {
    term.write_line(&format!(
        "{} Compared {} candidates against {} in {:.1}s",
        style("✓").green().bold(),
        style(report.outcomes.len()).cyan(),
        style(&report.reference).bold(),
        report.duration_ms as f64 / 1000.0
    ))
    .ok();
    term.write_line("").ok();

    let best = report.best_match().map(|(name, _)| name);

    for (name, outcome) in &report.outcomes {
        match outcome {
            CandidateOutcome::Scored(breakdown) => {
                let marker = if Some(name.as_str()) == best {
                    style("★").green().to_string()
                } else {
                    style("○").dim().to_string()
                };
                term.write_line(&format!(
                    "  {} {:>3}  {}",
                    marker,
                    style(breakdown.score).yellow().bold(),
                    name
                ))
                .ok();

                if verbose {
                    let channels = CHANNEL_NAMES
                        .iter()
                        .zip(breakdown.channels.iter())
                        .map(|(channel, value)| format!("{} {:.3}", channel, value))
                        .collect::<Vec<_>>()
                        .join(", ");
                    term.write_line(&format!(
                        "         {} (weakest: {})",
                        style(channels).dim(),
                        breakdown.weakest_channel()
                    ))
                    .ok();
                }
            }
            CandidateOutcome::Failed { reason } => {
                term.write_line(&format!(
                    "  {} {:>3}  {} {}",
                    style("✗").red(),
                    style("--").red(),
                    name,
                    style(reason).dim()
                ))
                .ok();
            }
        }
    }

    term.write_line("").ok();
    term.write_line(&format!(
        "{}",
        style("Scores compare colour distributions, not shapes: 100 means identical histograms.").dim()
    ))
    .ok();
}

fn print_json_results(report: &BatchReport, verbose: bool) -> Result<()> {
    let rendered = match verbose {
        true => serde_json::to_string_pretty(report),
        false => serde_json::to_string_pretty(&SimilarityResponse::from(report)),
    };
    let rendered = rendered.map_err(|e| WardrobeError::Output(e.to_string()))?;

    println!("{}", rendered);
    Ok(())
}

fn print_minimal_results(report: &BatchReport) {
    for (name, outcome) in &report.outcomes {
        match outcome.score() {
            Some(score) => println!("{} {}", name, score),
            None => println!("{} -", name),
        }
    }
}
