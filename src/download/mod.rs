//! Card image naming and downloading.
//!
//! This module turns resolved printings into download tasks and streams each
//! image to disk.
//!
//! # Features
//!
//! - Deterministic destination names, optionally grouped by set
//! - One file per copy, or one per printing in unique mode
//! - Existing files are kept unless overwrite is requested
//! - Partial files are removed when a download fails
//! - Optional pacing between image requests
//!
//! # Example
//!
//! ```no_run
//! use card_downloader_core::download::{ImageClient, ImageFetcher, NamingOptions, plan_tasks};
//! use card_downloader_core::resolver::{HttpTimeouts, ResolvedCard};
//! use card_downloader_core::{NoopProgress, RunSummary};
//!
//! # async fn example(card: ResolvedCard) -> Result<(), Box<dyn std::error::Error>> {
//! let options = NamingOptions::new("cards");
//! let tasks = plan_tasks(&card, 4, &options)?;
//!
//! let fetcher = ImageFetcher::new(ImageClient::new(HttpTimeouts::default())?, false);
//! let mut summary = RunSummary::new();
//! fetcher.fetch_all(&tasks, &mut summary, &NoopProgress).await;
//! print!("{summary}");
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod fetcher;
mod filename;
pub mod rate_limiter;
mod size;

pub use client::ImageClient;
pub use error::DownloadError;
pub use fetcher::{DownloadTask, ImageFetcher, TaskOutcome, card_label, plan_tasks};
pub use filename::{
    DEFAULT_OUTPUT_DIR, NamingOptions, default_output_root, destination_path, extension_for,
    sanitize_component,
};
pub use rate_limiter::{RateLimiter, extract_domain};
pub use size::{ImageSize, UnknownImageSize};

// Note: we do NOT define module-local Result aliases.
// Use `Result<T, DownloadError>` explicitly in function signatures.
