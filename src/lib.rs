//! Card Downloader Core Library
//!
//! This library provides the core functionality for the card downloader tool,
//! which turns a Magic: The Gathering decklist into a folder of card images
//! fetched through the Scryfall collection API.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`parser`] - Decklist line parsing into card references
//! - [`resolver`] - Identifier batching and bulk collection lookups
//! - [`download`] - Destination naming and image downloads
//! - [`summary`] - Run outcome accumulator
//! - [`config`] - File configuration and validation
//! - [`pipeline`] - Sequential parse/resolve/download pipeline

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod download;
pub mod parser;
pub mod pipeline;
pub mod resolver;
pub mod summary;
#[cfg(test)]
mod test_support;
mod user_agent;

// Re-export commonly used types
pub use config::{ConfigError, FileConfig, LoadedConfig, VerbositySetting};
pub use download::{
    DownloadError, DownloadTask, ImageClient, ImageFetcher, ImageSize, NamingOptions,
    TaskOutcome, default_output_root, plan_tasks,
};
pub use parser::{CardReference, DecklistParse, LineOutcome, SkipReason, parse_decklist, parse_line};
pub use pipeline::{NoopProgress, ProgressReporter, RunOptions, run_pipeline};
pub use resolver::{
    CollectionResolver, LookupIdentifier, LookupOutcome, LookupRequest, MAX_BATCH_SIZE,
    ResolveError, ResolvedCard, batch_requests, collect_requests,
};
pub use summary::RunSummary;
