//! Sequential parse, resolve, and download pipeline.
//!
//! Every fatal condition is checked before the first request: an empty
//! decklist, an output root that cannot be created, or HTTP clients that
//! cannot be built. After that point nothing aborts the run; per-batch and
//! per-image failures land in the returned [`RunSummary`].

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use crate::config::ConfigError;
use crate::download::{ImageClient, ImageFetcher, NamingOptions, card_label, plan_tasks};
use crate::parser::parse_decklist;
use crate::resolver::{
    CollectionResolver, DEFAULT_API_BASE_URL, HttpTimeouts, LookupRequest, MAX_BATCH_SIZE,
    ResolvedCard, batch_requests, collect_requests,
};
use crate::summary::RunSummary;

/// Receives download progress.
///
/// The binary renders a progress bar; library callers and tests can pass
/// [`NoopProgress`].
pub trait ProgressReporter: Send + Sync {
    /// Called once with the number of download tasks.
    fn start(&self, total: u64);
    /// Called after each task, with the printing it belonged to.
    fn advance(&self, label: &str);
    /// Called when every task has run.
    fn finish(&self);
}

/// Progress reporter that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn start(&self, _total: u64) {}
    fn advance(&self, _label: &str) {}
    fn finish(&self) {}
}

/// Effective settings for one run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Output layout and image size
    pub naming: NamingOptions,
    /// Replace files that already exist
    pub overwrite: bool,
    /// Pause between image requests to the same host
    pub delay: Duration,
    /// Timeouts for every HTTP call
    pub timeouts: HttpTimeouts,
    /// Card data API base URL
    pub api_base_url: String,
    /// Largest number of identifiers per lookup
    pub batch_size: usize,
    /// Input name used in messages (`stdin` or the file path)
    pub source_name: String,
}

impl RunOptions {
    /// Default settings writing under `output_root`.
    #[must_use]
    pub fn new(output_root: impl Into<std::path::PathBuf>) -> Self {
        Self {
            naming: NamingOptions::new(output_root),
            overwrite: false,
            delay: Duration::ZERO,
            timeouts: HttpTimeouts::default(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            batch_size: MAX_BATCH_SIZE,
            source_name: "stdin".to_string(),
        }
    }
}

/// Creates the output root and confirms it is a directory.
///
/// # Errors
///
/// Returns [`ConfigError::UnwritableOutput`] when the directory cannot be
/// created or the path names a file.
pub fn prepare_output_root(root: &Path) -> Result<(), ConfigError> {
    std::fs::create_dir_all(root).map_err(|e| ConfigError::unwritable_output(root, e))?;
    let metadata = std::fs::metadata(root).map_err(|e| ConfigError::unwritable_output(root, e))?;
    if metadata.permissions().readonly() {
        return Err(ConfigError::unwritable_output(
            root,
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "directory is read-only"),
        ));
    }
    Ok(())
}

/// Merges resolved requests that landed on the same printing.
///
/// Different lines (`Opt` and `Opt (ELD)`) can resolve to one set and
/// collector number; their quantities are summed so copy numbering runs
/// across both and no two tasks share a destination. First-seen order is kept.
fn group_by_printing(resolved: Vec<(LookupRequest, ResolvedCard)>) -> Vec<(ResolvedCard, u32)> {
    let mut printings: Vec<(ResolvedCard, u32)> = Vec::new();
    let mut index_by_key = HashMap::new();

    for (request, card) in resolved {
        let key = (
            card.set_code.to_lowercase(),
            card.collector_number.to_lowercase(),
        );
        if let Some(&index) = index_by_key.get(&key) {
            let entry: &mut (ResolvedCard, u32) = &mut printings[index];
            entry.1 = entry.1.saturating_add(request.quantity);
            debug!(card = %entry.0.canonical_name, quantity = entry.1, "merged duplicate printing");
        } else {
            index_by_key.insert(key, printings.len());
            printings.push((card, request.quantity));
        }
    }

    printings
}

/// Runs the whole pipeline over a decklist.
///
/// # Errors
///
/// Returns [`ConfigError`] only for conditions detected before any network
/// activity.
#[instrument(skip_all, fields(source = %options.source_name))]
pub async fn run_pipeline(
    input: &str,
    options: &RunOptions,
    progress: &dyn ProgressReporter,
) -> Result<RunSummary, ConfigError> {
    let parsed = parse_decklist(input);
    if parsed.is_empty() {
        return Err(ConfigError::no_cards(&options.source_name));
    }

    prepare_output_root(&options.naming.output_root)?;
    let resolver = CollectionResolver::with_base_url(&options.api_base_url, options.timeouts)
        .map_err(ConfigError::client_setup)?;
    let image_client = ImageClient::new(options.timeouts).map_err(ConfigError::client_setup)?;
    let fetcher = ImageFetcher::new(image_client, options.overwrite).with_delay(options.delay);

    let requests = collect_requests(&parsed.references);
    let batches = batch_requests(requests, options.batch_size);
    info!(
        references = parsed.len(),
        copies = parsed.total_quantity(),
        batches = batches.len(),
        "Resolving cards"
    );

    let mut summary = RunSummary::new();
    let resolved = resolver.resolve_all(batches, &mut summary).await;

    let mut tasks = Vec::new();
    for (card, quantity) in &group_by_printing(resolved) {
        match plan_tasks(card, *quantity, &options.naming) {
            Ok(planned) => {
                debug!(card = %card.canonical_name, tasks = planned.len(), "planned downloads");
                tasks.extend(planned);
            }
            Err(error) => {
                warn!(card = %card.canonical_name, error = %error, "cannot plan downloads");
                summary.record_card_failure(&card_label(card), &error.to_string());
            }
        }
    }

    fetcher.fetch_all(&tasks, &mut summary, progress).await;

    info!(
        resolved = summary.resolved(),
        not_found = summary.not_found().len(),
        downloaded = summary.downloaded().len(),
        skipped = summary.skipped_existing().len(),
        failed = summary.failed(),
        "Run complete"
    );
    Ok(summary)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_empty_decklist_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let mut options = RunOptions::new(temp_dir.path().join("out"));
        options.source_name = "deck.txt".to_string();

        let err = run_pipeline("# only a comment\n\nSideboard\n", &options, &NoopProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::NoCards { ref source_name } if source_name == "deck.txt"));
        assert!(!temp_dir.path().join("out").exists());
    }

    #[test]
    fn test_prepare_output_root_creates_nested_directories() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("a").join("b");
        prepare_output_root(&root).unwrap();
        assert!(root.is_dir());
    }

    #[test]
    fn test_prepare_output_root_rejects_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("taken");
        std::fs::write(&file, b"x").unwrap();
        let err = prepare_output_root(&file).unwrap_err();
        assert!(matches!(err, ConfigError::UnwritableOutput { .. }));
    }

    fn printing(name: &str, set: &str, number: &str) -> ResolvedCard {
        ResolvedCard {
            canonical_name: name.to_string(),
            set_code: set.to_string(),
            collector_number: number.to_string(),
            faces: Vec::new(),
        }
    }

    #[test]
    fn test_group_by_printing_sums_lines_resolving_to_same_printing() {
        let requests = collect_requests(
            &crate::parser::parse_decklist(
                "2 Lightning Bolt\n3 Lightning Bolt (M11)\n1 Opt\n1 Lightning Bolt (M11) 149\n",
            )
            .references,
        );
        assert_eq!(requests.len(), 4);
        let cards = [
            printing("Lightning Bolt", "m11", "149"),
            printing("Lightning Bolt", "m11", "149"),
            printing("Opt", "eld", "59"),
            printing("Lightning Bolt", "M11", "149"),
        ];
        let resolved = requests.into_iter().zip(cards).collect();

        let grouped = group_by_printing(resolved);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].0.canonical_name, "Lightning Bolt");
        assert_eq!(grouped[0].1, 6);
        assert_eq!(grouped[1].0.canonical_name, "Opt");
        assert_eq!(grouped[1].1, 1);
    }

    #[test]
    fn test_group_by_printing_keeps_distinct_printings_apart() {
        let requests = collect_requests(
            &crate::parser::parse_decklist("1 Opt (ELD)\n1 Opt (XLN)\n").references,
        );
        let cards = [printing("Opt", "eld", "59"), printing("Opt", "xln", "65")];
        let grouped = group_by_printing(requests.into_iter().zip(cards).collect());
        assert_eq!(grouped.len(), 2);
        assert!(grouped.iter().all(|(_, quantity)| *quantity == 1));
    }

    #[test]
    fn test_run_options_defaults() {
        let options = RunOptions::new("cards");
        assert_eq!(options.batch_size, 75);
        assert_eq!(options.api_base_url, "https://api.scryfall.com");
        assert!(!options.overwrite);
        assert!(options.delay.is_zero());
    }
}
