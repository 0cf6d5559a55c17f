//! dotz - compress(1) compatible `.Z` tool
//!
//! A Pure Rust front end for the Unix compress format.

mod commands;
mod utils;

use clap::{Parser, Subcommand};
use commands::{FileOptions, cmd_compress, cmd_decompress, cmd_info, cmd_test};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dotz")]
#[command(author, version, about = "Unix compress (.Z) in Pure Rust")]
#[command(long_about = "
dotz reads and writes the LZW '.Z' format of compress(1). With 10 to 16 bit
codes the streams it writes are byte-for-byte identical to those of the
classic tool. Streams written with -b 9 keep every code at 9 bits, which
legacy decoders (they widen to 10 bits regardless) reject.

Examples:
  dotz compress notes.txt
  dotz compress -b 12 -k big.log
  dotz decompress notes.txt.Z
  cat data | dotz compress > data.Z
  dotz info --json notes.txt.Z
  dotz test *.Z
")]
struct Cli {
    /// Show verbose output (debug logging, per-file statistics)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress files to FILE.Z (stdin to stdout when no files are given)
    #[command(alias = "c")]
    Compress {
        /// Files to compress
        files: Vec<PathBuf>,

        /// Maximum code width in bits (9-16; 9 is not readable by legacy decoders)
        #[arg(short, long, default_value_t = dotz_lzw::MAX_BITS, value_parser = clap::value_parser!(u8).range(9..=16))]
        bits: u8,

        /// Disable block mode (no CLEAR codes)
        #[arg(short = 'C', long)]
        no_block: bool,

        /// Write to standard output, keep the input files
        #[arg(short = 'c', long)]
        stdout: bool,

        /// Keep the input files
        #[arg(short, long)]
        keep: bool,

        /// Overwrite existing outputs and compress even without a gain
        #[arg(short, long)]
        force: bool,

        /// Show a progress bar
        #[arg(short = 'P', long)]
        progress: bool,
    },

    /// Decompress FILE.Z to FILE (stdin to stdout when no files are given)
    #[command(alias = "d")]
    Decompress {
        /// Files to decompress
        files: Vec<PathBuf>,

        /// Write to standard output, keep the input files
        #[arg(short = 'c', long)]
        stdout: bool,

        /// Keep the input files
        #[arg(short, long)]
        keep: bool,

        /// Overwrite existing outputs without asking
        #[arg(short, long)]
        force: bool,

        /// Show a progress bar
        #[arg(short = 'P', long)]
        progress: bool,
    },

    /// Show header fields and sizes of a .Z file
    #[command(alias = "i")]
    Info {
        /// File to inspect
        file: PathBuf,

        /// Output as JSON (machine-readable)
        #[arg(short, long)]
        json: bool,
    },

    /// Test integrity of .Z files
    #[command(alias = "t")]
    Test {
        /// Files to test
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let result = match cli.command {
        Commands::Compress {
            files,
            bits,
            no_block,
            stdout,
            keep,
            force,
            progress,
        } => {
            let options = FileOptions {
                stdout,
                keep,
                force,
                progress,
                verbose: cli.verbose,
            };
            cmd_compress(&files, bits, !no_block, &options)
        }
        Commands::Decompress {
            files,
            stdout,
            keep,
            force,
            progress,
        } => {
            let options = FileOptions {
                stdout,
                keep,
                force,
                progress,
                verbose: cli.verbose,
            };
            cmd_decompress(&files, &options)
        }
        Commands::Info { file, json } => cmd_info(&file, json),
        Commands::Test { files } => cmd_test(&files, cli.verbose),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
