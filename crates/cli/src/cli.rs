//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Still Syncer - Multi-camera still capture alignment pipeline
#[derive(Parser, Debug)]
#[command(
    name = "still-syncer",
    author,
    version,
    about = "Multi-camera still capture alignment pipeline",
    long_about = "Aligns still captures from several independently-clocked cameras\n\
                  into time-matched batches and encodes each batch as a looping\n\
                  animated GIF.\n\n\
                  Calibrates per-camera clock offsets from each source's first\n\
                  capture, filters underexposed frames, and matches captures across\n\
                  sources with an escalating tolerance window."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "STILL_SYNCER_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "STILL_SYNCER_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the alignment and encoding pipeline
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "config.toml",
        env = "STILL_SYNCER_CONFIG"
    )]
    pub config: PathBuf,

    /// Override session root folder from configuration
    #[arg(long, env = "STILL_SYNCER_ROOT")]
    pub root: Option<PathBuf>,

    /// Override output folder name from configuration
    #[arg(long, env = "STILL_SYNCER_OUTPUT")]
    pub output: Option<String>,

    /// Maximum number of batches to encode (0 = unlimited)
    #[arg(long, default_value = "0", env = "STILL_SYNCER_MAX_BATCHES")]
    pub max_batches: u64,

    /// Copy each batch's source frames into batches/ subdirectories
    #[arg(long)]
    pub copy_frames: bool,

    /// Skip batches recorded as completed for this exact configuration
    #[arg(long)]
    pub resume: bool,

    /// Validate configuration and exit without running pipeline
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show resolved source folder paths
    #[arg(long)]
    pub sources: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
