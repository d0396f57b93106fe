//! samslider: sliding genomic windows over sorted SAM/BAM files
//!
//! Usage: samslider <COMMAND> [OPTIONS]

use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use std::process;

use samslider::commands::{verify_sorted, WindowsCommand};
use samslider::error::Result;
use samslider::ReadMode;

#[derive(Parser)]
#[command(name = "samslider")]
#[command(version)]
#[command(about = "Sliding, optionally overlapping windows over coordinate-sorted alignments", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize mapping quality in sliding windows
    Windows {
        /// Input SAM/BAM file, coordinate sorted (use - for stdin)
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        /// Input format: auto, sam or bam
        #[arg(short = 'f', long, default_value = "auto")]
        format: ReadMode,

        /// Window size in bases
        #[arg(short = 'w', long, default_value = "10000")]
        size: u64,

        /// Offset between consecutive window starts
        #[arg(short = 's', long, default_value = "5000")]
        step: u64,

        /// Genome file (name<TAB>length) overriding the input header
        #[arg(short = 'g', long)]
        genome: Option<PathBuf>,

        /// Count a proper pair once, at its first mate inside a window
        #[arg(long)]
        pairs: bool,

        /// Append the MAPQ of every window member
        #[arg(long)]
        mapq: bool,

        /// Print statistics to stderr
        #[arg(long)]
        stats: bool,
    },

    /// Check that a SAM/BAM file is coordinate sorted
    Check {
        /// Input SAM/BAM file (use - for stdin)
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        /// Input format: auto, sam or bam
        #[arg(short = 'f', long, default_value = "auto")]
        format: ReadMode,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Windows {
            input,
            format,
            size,
            step,
            genome,
            pairs,
            mapq,
            stats,
        } => run_windows(input, format, size, step, genome, pairs, mapq, stats),

        Commands::Check { input, format } => run_check(input, format),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

#[allow(clippy::too_many_arguments)]
fn run_windows(
    input: PathBuf,
    format: ReadMode,
    size: u64,
    step: u64,
    genome: Option<PathBuf>,
    pairs: bool,
    mapq: bool,
    stats: bool,
) -> Result<()> {
    let cmd = WindowsCommand {
        size,
        step,
        collapse_pairs: pairs,
        list_mapq: mapq,
        format,
        genome,
    };

    let stdout = io::stdout();
    let handle = stdout.lock();

    let result = cmd.run(&input, handle)?;
    if stats {
        eprintln!("Windows stats: {}", result);
    }
    Ok(())
}

fn run_check(input: PathBuf, format: ReadMode) -> Result<()> {
    let records = verify_sorted(&input, format)?;
    eprintln!("{}: sorted ({} records)", input.display(), records);
    Ok(())
}
