//! Pixguard CLI - invisible image watermarking and copy detection.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use pixguard_core::EngineConfig;
use tracing_subscriber::EnvFilter;

mod commands;
mod exit_codes;
mod utils;

use exit_codes::ExitCode;

const EXIT_CODES_HELP: &str = "\
Exit codes:
  0   Success
  1   General error
  64  Usage or configuration error
  65  Data error (undecodable image, missing or mismatched payload)
  66  Input file or index not found
  74  Cannot write output file or index";

#[derive(Parser)]
#[command(name = "pixguard")]
#[command(author, version, about = "Invisible image watermarking and copy detection", long_about = None)]
#[command(after_help = EXIT_CODES_HELP)]
struct Cli {
    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Embed an owner secret into an image and record its fingerprint
    Protect {
        /// Path to the image to protect
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Owner secret to hide in the pixels
        #[arg(short, long, env = "PIXGUARD_OWNER_SECRET", hide_env_values = true)]
        secret: String,

        /// Output PNG path (defaults to <FILE>.protected.png)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// JSON fingerprint index to append to
        #[arg(long)]
        index: Option<PathBuf>,

        /// Identifier stored in the index (defaults to the file stem)
        #[arg(long)]
        id: Option<String>,
    },

    /// Extract the hidden owner secret from a protected image
    Reveal {
        /// Path to the protected image
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Fail unless the image carries this owner secret
        #[arg(long, value_name = "SECRET")]
        expect: Option<String>,
    },

    /// Print the perceptual fingerprint of an image
    Hash {
        /// Path to the image
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Hash algorithm (average or difference)
        #[arg(short, long)]
        algorithm: Option<String>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Compare two images and score how much one was altered
    Compare {
        /// Reference image
        #[arg(value_name = "ORIGINAL")]
        original: PathBuf,

        /// Image to check against the reference
        #[arg(value_name = "CANDIDATE")]
        candidate: PathBuf,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Search a fingerprint index for copies of an image
    Detect {
        /// Path to the suspect image
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// JSON fingerprint index written by `protect`
        #[arg(long)]
        index: PathBuf,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Overlay a semi-transparent visible mark on an image
    Stamp {
        /// Path to the image to stamp
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Mark image (PNG with alpha recommended)
        #[arg(short, long, value_name = "MARK")]
        mark: PathBuf,

        /// top-left, top-right, bottom-left, bottom-right or center
        #[arg(short, long, default_value = "bottom-right")]
        position: String,

        /// Mark opacity between 0 and 1
        #[arg(long, default_value_t = 0.3)]
        opacity: f32,

        /// Gap in pixels between the mark and the image edges
        #[arg(long, default_value_t = 20)]
        margin: u32,

        /// Output PNG path (defaults to <FILE>_watermarked.png)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show image format, dimensions and watermark capacity
    Inspect {
        /// Path to the image
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = EngineConfig::from_env().context("Invalid configuration")?;

    match cli.command {
        Commands::Protect {
            file,
            secret,
            output,
            index,
            id,
        } => commands::protect::execute(&config, file, &secret, output, index, id),
        Commands::Reveal { file, expect } => commands::reveal::execute(&config, file, expect),
        Commands::Hash {
            file,
            algorithm,
            json,
        } => commands::hash::execute(&config, file, algorithm, json),
        Commands::Compare {
            original,
            candidate,
            json,
        } => commands::compare::execute(&config, original, candidate, json),
        Commands::Detect { file, index, json } => {
            commands::detect::execute(&config, file, index, json)
        }
        Commands::Stamp {
            file,
            mark,
            position,
            opacity,
            margin,
            output,
        } => commands::stamp::execute(file, mark, &position, opacity, margin, output),
        Commands::Inspect { file, json } => commands::inspect::execute(file, json),
    }
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // --help and --version
        Err(err) if !err.use_stderr() => err.exit(),
        Err(err) => {
            let _ = err.print();
            std::process::exit(exit_codes::USAGE_ERROR);
        }
    };

    init_tracing(cli.verbose);

    if let Err(err) = run(cli) {
        let exit = ExitCode::from_anyhow(&err);
        if let Some(message) = exit.message {
            eprintln!("{} {}", "error:".red().bold(), message);
        }
        std::process::exit(exit.code);
    }
}
