//! End-of-run outcome accumulator.
//!
//! Every recoverable condition (unmatched cards, failed lookup batches, failed
//! or skipped downloads) is recorded here instead of being raised, and the
//! binary prints the result once the run finishes.

use std::fmt;
use std::path::PathBuf;

use crate::download::TaskOutcome;
use crate::resolver::LookupRequest;

/// A recoverable failure with the text that identifies it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureRecord {
    /// Raw decklist line, card label, or URL
    pub subject: String,
    /// Human-readable reason
    pub reason: String,
}

/// Counts and details for one pipeline run.
#[derive(Debug, Default, Clone)]
pub struct RunSummary {
    resolved: usize,
    not_found: Vec<String>,
    lookup_failures: Vec<FailureRecord>,
    downloaded: Vec<PathBuf>,
    skipped_existing: Vec<PathBuf>,
    download_failures: Vec<FailureRecord>,
}

impl RunSummary {
    /// Creates an empty summary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a request the API matched.
    pub fn record_resolved(&mut self) {
        self.resolved += 1;
    }

    /// Records every line of a request the API did not match.
    pub fn record_not_found(&mut self, request: &LookupRequest) {
        self.not_found
            .extend(request.raw_lines().map(str::to_string));
    }

    /// Records every line of a request whose lookup batch failed.
    pub fn record_lookup_failure(&mut self, request: &LookupRequest, reason: &str) {
        self.lookup_failures
            .extend(request.raw_lines().map(|line| FailureRecord {
                subject: line.to_string(),
                reason: reason.to_string(),
            }));
    }

    /// Records a card whose images could not be planned (e.g. missing size).
    pub fn record_card_failure(&mut self, label: &str, reason: &str) {
        self.download_failures.push(FailureRecord {
            subject: label.to_string(),
            reason: reason.to_string(),
        });
    }

    /// Records the outcome of one download task.
    pub fn record_task(&mut self, outcome: &TaskOutcome) {
        match outcome {
            TaskOutcome::Downloaded { path, .. } => self.downloaded.push(path.clone()),
            TaskOutcome::Skipped { path } => self.skipped_existing.push(path.clone()),
            TaskOutcome::Failed { url, reason, .. } => self.download_failures.push(FailureRecord {
                subject: url.clone(),
                reason: reason.clone(),
            }),
        }
    }

    /// Number of unique printings matched.
    #[must_use]
    pub fn resolved(&self) -> usize {
        self.resolved
    }

    /// Raw lines the API reported as not found.
    #[must_use]
    pub fn not_found(&self) -> &[String] {
        &self.not_found
    }

    /// Raw lines whose lookup batch failed.
    #[must_use]
    pub fn lookup_failures(&self) -> &[FailureRecord] {
        &self.lookup_failures
    }

    /// Files written during the run.
    #[must_use]
    pub fn downloaded(&self) -> &[PathBuf] {
        &self.downloaded
    }

    /// Files left untouched because they already existed.
    #[must_use]
    pub fn skipped_existing(&self) -> &[PathBuf] {
        &self.skipped_existing
    }

    /// Download or planning failures.
    #[must_use]
    pub fn download_failures(&self) -> &[FailureRecord] {
        &self.download_failures
    }

    /// Total failures of any kind (lookup batches and downloads).
    #[must_use]
    pub fn failed(&self) -> usize {
        self.lookup_failures.len() + self.download_failures.len()
    }

    /// Not-found lines plus failures of any kind.
    #[must_use]
    pub fn problems(&self) -> usize {
        self.not_found.len() + self.failed()
    }

    /// True when nothing went wrong.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.problems() == 0
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Resolved: {}  Not found: {}  Downloaded: {}  Skipped (already exists): {}  Failed: {}",
            self.resolved,
            self.not_found.len(),
            self.downloaded.len(),
            self.skipped_existing.len(),
            self.failed()
        )?;

        if !self.not_found.is_empty() {
            writeln!(f, "\nNot found (check spelling/printing):")?;
            for line in &self.not_found {
                writeln!(f, "  - {line}")?;
            }
        }
        if !self.lookup_failures.is_empty() {
            writeln!(f, "\nLookup failed:")?;
            for failure in &self.lookup_failures {
                writeln!(f, "  - {}: {}", failure.subject, failure.reason)?;
            }
        }
        if !self.download_failures.is_empty() {
            writeln!(f, "\nErrors while downloading:")?;
            for failure in &self.download_failures {
                writeln!(f, "  - {}: {}", failure.subject, failure.reason)?;
            }
        }
        Ok(())
    }
}
