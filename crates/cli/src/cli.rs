//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use contracts::AspectRatio;
use std::path::PathBuf;

/// Banner Gen - AI advertising banner generator
#[derive(Parser, Debug)]
#[command(
    name = "banner-gen",
    author,
    version,
    about = "AI advertising banner generator",
    long_about = "Turns a short campaign topic (and optional product images) into a finished \n\
                  advertising banner: extracts campaign details with a text model, generates \n\
                  an image, critiques it and repairs the background with inpainting edits."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "BANNER_GEN_VERBOSE")]
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
        env = "BANNER_GEN_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a banner for a topic
    Generate(GenerateArgs),

    /// Validate configuration file without generating
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `generate` command
#[derive(Parser, Debug, Clone)]
pub struct GenerateArgs {
    /// Campaign topic, e.g. "Diwali Sale on Premium Ghee 1kg Jar"
    #[arg(short, long)]
    pub topic: String,

    /// Reference image (product shot, logo); repeatable
    #[arg(short, long = "image", value_name = "PATH")]
    pub images: Vec<PathBuf>,

    /// Aspect ratio of the generated image (1:1, 9:16, 16:9, 4:3, 3:4)
    #[arg(short, long)]
    pub aspect_ratio: Option<AspectRatio>,

    /// Run a second critique and repair pass
    #[arg(long)]
    pub quality_check: bool,

    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, default_value = "config.toml", env = "BANNER_GEN_CONFIG")]
    pub config: PathBuf,

    /// Validate configuration and request, then exit without calling any model
    #[arg(long)]
    pub dry_run: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "BANNER_GEN_METRICS_PORT")]
    pub metrics_port: u16,

    /// Print the run outcome as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "config.toml", env = "BANNER_GEN_CONFIG")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml", env = "BANNER_GEN_CONFIG")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
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
