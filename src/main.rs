use clap::{Parser, Subcommand};
use metaclean::config::{self, CleanConfig};
use metaclean::session::Session;
use metaclean::types::RecordSummary;
use metaclean::{naming, output, scan};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Shared flags for commands that collect files.
#[derive(clap::Args, Clone)]
struct InputArgs {
    /// Image files and/or directories
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Descend into subdirectories of directory arguments
    #[arg(short, long)]
    recursive: bool,
}

#[derive(Parser)]
#[command(name = "metaclean")]
#[command(about = "Strip EXIF metadata (GPS, camera, author) from photos")]
#[command(long_about = "\
Strip EXIF metadata (GPS, camera, author) from photos

Every image is fully decoded and re-encoded from its pixels alone, so GPS
coordinates, camera make/model, timestamps, author and copyright tags are
left behind. Nothing leaves your machine.

Supported: JPEG (re-encoded at quality 100), PNG and WebP (lossless).
HEIC files can be inspected but not cleaned.

Cleaned copies are written as cleaned_<name>, next to the original unless
--output is given. Originals are never modified.

Run 'metaclean gen-config' to generate a documented config file.")]
#[command(version)]
struct Cli {
    /// Config file (TOML). Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the metadata that cleaning would remove
    Inspect {
        #[command(flatten)]
        input: InputArgs,

        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write metadata-free copies of images
    Clean {
        #[command(flatten)]
        input: InputArgs,

        /// Directory for cleaned files (default: next to each original)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Replace existing output files
        #[arg(long)]
        overwrite: bool,
    },
    /// Print a stock config file with all options documented
    GenConfig,
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();
    let config = CleanConfig::load_or_default(cli.config.as_deref())?;
    init_thread_pool(&config.processing);

    match cli.command {
        Command::Inspect { input, json } => {
            let scanned = scan::collect(
                &input.paths,
                input.recursive,
                config.limits.max_file_size,
                &config.output.prefix,
            )?;
            output::print_skipped(&scanned.skipped);
            let (_, uploads) = scanned.into_parts();

            let mut session = Session::new().with_prefix(config.output.prefix.clone());
            let records = session.add_files(uploads);
            if json {
                let summaries: Vec<RecordSummary> = records.iter().map(RecordSummary::from).collect();
                println!("{}", serde_json::to_string_pretty(&summaries)?);
            } else {
                output::print_preview(records);
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Clean {
            input,
            output: out_dir,
            overwrite,
        } => {
            let overwrite = overwrite || config.output.overwrite;
            let scanned = scan::collect(
                &input.paths,
                input.recursive,
                config.limits.max_file_size,
                &config.output.prefix,
            )?;
            output::print_skipped(&scanned.skipped);
            if let Some(dir) = &out_dir {
                std::fs::create_dir_all(dir)?;
            }
            let (sources, uploads) = scanned.into_parts();

            let mut session = Session::new().with_prefix(config.output.prefix.clone());
            output::print_preview(session.add_files(uploads));
            println!();

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_scrub_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            session.process_all_with_events(Some(tx));
            printer
                .join()
                .map_err(|_| "progress printer thread panicked")?;

            let mut write_failures = 0;
            let mut plan = naming::OutputPlan::new();
            // Records were added in scan order, so they pair up with their sources.
            for (record, source) in session.records().iter().zip(&sources) {
                let Ok(download) = session.download(record.id()) else {
                    continue;
                };
                let target = plan.claim(naming::output_path(source, &download.name, out_dir.as_deref()));
                match naming::write_output(&target, &download.bytes, overwrite) {
                    Ok(()) => println!("{}", output::format_written(&target)),
                    Err(e) => {
                        write_failures += 1;
                        eprintln!("could not write {}: {}", target.display(), e);
                    }
                }
            }

            let counts = session.counts();
            output::print_summary(&counts);
            if counts.failed > 0 || write_failures > 0 {
                Ok(ExitCode::FAILURE)
            } else {
                Ok(ExitCode::SUCCESS)
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Log to stderr, filtered by `RUST_LOG` (default: warnings only).
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available CPU cores.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
