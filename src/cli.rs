use std::path::PathBuf;

use clap::Parser;

use crate::output::OutputFormat;

/// Extract four accent colors from cover artwork.
#[derive(Parser, Debug)]
#[command(name = "coverhue", version, about)]
pub struct Args {
    /// Image paths or file:// URLs
    #[arg(required = true)]
    pub images: Vec<String>,

    /// Read settings from this TOML file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Plain)]
    pub format: OutputFormat,

    /// Write output to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Number of candidate colors to quantize before filtering
    #[arg(short = 'n', long)]
    pub candidates: Option<usize>,

    /// Abandon an image load after this many milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Print a colored terminal preview of the accents
    #[arg(long)]
    pub preview: bool,

    /// Show debug logging
    #[arg(short, long)]
    pub verbose: bool,
}
