//! Command line arguments

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "folio-book", version, about = "Read a branching book in the terminal")]
pub struct Args {
    /// Story JSON: a file path or an http(s) URL
    #[arg(value_name = "STORY")]
    pub story: String,

    /// Keep progress in this file between runs
    #[arg(long = "save-file", value_name = "PATH", env = "FOLIO_SAVE_FILE")]
    pub save_file: Option<PathBuf>,

    /// Seed for effect randomness
    #[arg(long)]
    pub seed: Option<u64>,

    /// Real-time multiplier for typing delays (0 prints pages at once)
    #[arg(long, default_value_t = 1.0)]
    pub speed: f64,

    /// JSON config file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}
