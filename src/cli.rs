//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

/// Download card images for a Magic: The Gathering decklist.
///
/// Reads a decklist from a file or stdin, resolves every card through the
/// Scryfall collection API, and saves one image per copy (or per printing
/// with --unique) under the output directory.
#[derive(Parser, Debug, Clone)]
#[command(name = "card-downloader")]
#[command(author, version, about)]
pub struct Args {
    /// Decklist file (reads stdin when omitted)
    #[arg(short, long, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Output directory (defaults to the input file name, or ./cards)
    #[arg(short, long, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// Image size: png, large, normal, small, art_crop, border_crop [default: png]
    #[arg(short, long, value_name = "SIZE")]
    pub size: Option<String>,

    /// Save images in one sub-folder per set code
    #[arg(long)]
    pub by_set: bool,

    /// Save one image per printing regardless of quantity
    #[arg(long)]
    pub unique: bool,

    /// Replace images that already exist
    #[arg(long)]
    pub overwrite: bool,

    /// Pause between image downloads in milliseconds (max 60000)
    #[arg(long, value_name = "MS", value_parser = clap::value_parser!(u64).range(0..=60000))]
    pub delay: Option<u64>,

    /// Total timeout per HTTP request in seconds (1-3600) [default: 30]
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub timeout: Option<u64>,

    /// Card data API base URL
    #[arg(long, value_name = "URL", hide = true)]
    pub api_url: Option<String>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}
