use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tileforged")]
#[command(author, version, about = "Texture optimizer for b3dm 3D tiles")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Shrink and re-encode the textures of every tile under a directory
    Optimize {
        /// Directory containing .b3dm tiles
        #[arg(required = true)]
        input: PathBuf,

        /// Output directory (default: <input>_optimized)
        #[arg(short, long, conflicts_with = "inplace")]
        output_dir: Option<PathBuf>,

        /// Rewrite tiles in place instead of mirroring to an output directory
        #[arg(short, long)]
        inplace: bool,

        /// Maximum texture edge in pixels
        #[arg(short = 's', long)]
        max_size: Option<u32>,

        /// JPEG quality (1-100)
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=100))]
        quality: Option<u8>,

        /// Number of worker threads (default: CPU count)
        #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
        workers: Option<u64>,
    },

    /// List the embedded images of one or more tiles
    Inspect {
        /// Tiles to inspect
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
