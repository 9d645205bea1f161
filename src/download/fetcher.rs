//! Download planning and sequential image fetching.
//!
//! A resolved printing expands into one [`DownloadTask`] per face and copy.
//! Tasks run one at a time; a failed task is recorded and the next one
//! still runs.

use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use super::client::ImageClient;
use super::error::DownloadError;
use super::filename::{NamingOptions, destination_path};
use super::rate_limiter::RateLimiter;
use crate::pipeline::ProgressReporter;
use crate::resolver::ResolvedCard;
use crate::summary::RunSummary;

/// One image to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    /// Final path of the image
    pub destination: PathBuf,
    /// Image URL
    pub source_url: String,
    /// Index into the printing's faces
    pub face_index: usize,
    /// Printing label for progress and error reporting
    pub card_label: String,
}

/// Result of one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// The image was written
    Downloaded {
        /// Written file
        path: PathBuf,
        /// Bytes written
        bytes: u64,
    },
    /// The destination already existed and overwrite was off
    Skipped {
        /// Existing file
        path: PathBuf,
    },
    /// The download failed
    Failed {
        /// Image URL
        url: String,
        /// Intended destination
        path: PathBuf,
        /// Error message
        reason: String,
    },
}

/// Label used for a printing in progress output and failure reports.
#[must_use]
pub fn card_label(card: &ResolvedCard) -> String {
    format!(
        "{} ({}) {}",
        card.canonical_name, card.set_code, card.collector_number
    )
}

/// Expands a printing into its download tasks.
///
/// Produces `faces x copies` tasks, where copies is 1 in unique mode and the
/// requested quantity otherwise.
///
/// # Errors
///
/// Returns [`DownloadError::MissingImage`] when any face lacks the requested
/// size; no task is planned for that printing.
pub fn plan_tasks(
    card: &ResolvedCard,
    quantity: u32,
    options: &NamingOptions,
) -> Result<Vec<DownloadTask>, DownloadError> {
    let label = card_label(card);
    if card.faces.is_empty() {
        return Err(DownloadError::missing_image(label, options.size));
    }

    let urls = card
        .faces
        .iter()
        .map(|face| {
            face.image_urls
                .get(options.size.as_str())
                .cloned()
                .ok_or_else(|| DownloadError::missing_image(label.clone(), options.size))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let quantity = quantity.max(1);
    let copies: Vec<Option<u32>> = if options.unique || quantity == 1 {
        vec![None]
    } else {
        (1..=quantity).map(Some).collect()
    };

    let mut tasks = Vec::with_capacity(urls.len() * copies.len());
    for (face_index, url) in urls.iter().enumerate() {
        for copy in &copies {
            tasks.push(DownloadTask {
                destination: destination_path(&options.output_root, card, face_index, *copy, options),
                source_url: url.clone(),
                face_index,
                card_label: label.clone(),
            });
        }
    }
    Ok(tasks)
}

/// Runs download tasks sequentially.
#[derive(Debug)]
pub struct ImageFetcher {
    client: ImageClient,
    overwrite: bool,
    limiter: RateLimiter,
}

impl ImageFetcher {
    /// Creates a fetcher; existing files are kept unless `overwrite` is set.
    #[must_use]
    pub fn new(client: ImageClient, overwrite: bool) -> Self {
        Self {
            client,
            overwrite,
            limiter: RateLimiter::disabled(),
        }
    }

    /// Waits at least `delay` between image requests to the same host.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.limiter = RateLimiter::new(delay);
        self
    }

    /// Runs one task.
    #[instrument(skip(self, task), fields(card = %task.card_label, path = %task.destination.display()))]
    pub async fn fetch(&self, task: &DownloadTask) -> TaskOutcome {
        if !self.overwrite && task.destination.exists() {
            debug!("destination exists; skipping");
            return TaskOutcome::Skipped {
                path: task.destination.clone(),
            };
        }

        self.limiter.acquire(&task.source_url).await;
        match self
            .client
            .download_to_path(&task.source_url, &task.destination)
            .await
        {
            Ok(bytes) => TaskOutcome::Downloaded {
                path: task.destination.clone(),
                bytes,
            },
            Err(error) => {
                warn!(error = %error, "image download failed");
                TaskOutcome::Failed {
                    url: task.source_url.clone(),
                    path: task.destination.clone(),
                    reason: error.to_string(),
                }
            }
        }
    }

    /// Runs every task, recording each outcome in `summary`.
    pub async fn fetch_all(
        &self,
        tasks: &[DownloadTask],
        summary: &mut RunSummary,
        progress: &dyn ProgressReporter,
    ) {
        progress.start(tasks.len() as u64);
        for task in tasks {
            let outcome = self.fetch(task).await;
            summary.record_task(&outcome);
            progress.advance(&task.card_label);
        }
        progress.finish();

        info!(
            tasks = tasks.len(),
            downloaded = summary.downloaded().len(),
            skipped = summary.skipped_existing().len(),
            "Downloads complete"
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use crate::download::ImageSize;
    use crate::resolver::{Face, HttpTimeouts};
    use crate::test_support::socket_guard::start_mock_server_or_skip;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, ResponseTemplate};

    fn face(name: &str, urls: &[(&str, &str)]) -> Face {
        Face {
            face_name: name.to_string(),
            image_urls: urls
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect::<HashMap<_, _>>(),
        }
    }

    fn card(name: &str, faces: Vec<Face>) -> ResolvedCard {
        ResolvedCard {
            canonical_name: name.to_string(),
            set_code: "tst".to_string(),
            collector_number: "1".to_string(),
            faces,
        }
    }

    #[derive(Default)]
    struct RecordingProgress {
        events: Mutex<Vec<String>>,
    }

    impl ProgressReporter for RecordingProgress {
        fn start(&self, total: u64) {
            self.events.lock().unwrap().push(format!("start {total}"));
        }
        fn advance(&self, label: &str) {
            self.events.lock().unwrap().push(format!("advance {label}"));
        }
        fn finish(&self) {
            self.events.lock().unwrap().push("finish".to_string());
        }
    }

    #[test]
    fn test_plan_tasks_faces_times_quantity() {
        let dfc = card(
            "Front // Back",
            vec![
                face("Front", &[("png", "https://x.example/f.png")]),
                face("Back", &[("png", "https://x.example/b.png")]),
            ],
        );
        let options = NamingOptions::new("out");
        let tasks = plan_tasks(&dfc, 3, &options).unwrap();
        assert_eq!(tasks.len(), 6);

        let unique = NamingOptions {
            unique: true,
            ..NamingOptions::new("out")
        };
        assert_eq!(plan_tasks(&dfc, 3, &unique).unwrap().len(), 2);
    }

    #[test]
    fn test_plan_tasks_destinations_are_distinct() {
        let single = card("Opt", vec![face("Opt", &[("png", "https://x.example/o.png")])]);
        let tasks = plan_tasks(&single, 4, &NamingOptions::new("out")).unwrap();
        let mut paths: Vec<_> = tasks.iter().map(|t| t.destination.clone()).collect();
        paths.sort();
        paths.dedup();
        assert_eq!(paths.len(), 4);
    }

    #[test]
    fn test_plan_tasks_missing_size_is_card_failure() {
        let single = card("Opt", vec![face("Opt", &[("png", "https://x.example/o.png")])]);
        let options = NamingOptions {
            size: ImageSize::ArtCrop,
            ..NamingOptions::new("out")
        };
        let err = plan_tasks(&single, 1, &options).unwrap_err();
        assert!(matches!(err, DownloadError::MissingImage { .. }));
    }

    #[tokio::test]
    async fn test_existing_file_is_skipped_without_request() {
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };
        let temp_dir = TempDir::new().unwrap();

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"new"))
            .expect(0)
            .mount(&mock_server)
            .await;

        let destination = temp_dir.path().join("Opt (tst) 1.png");
        std::fs::write(&destination, b"old").unwrap();
        let task = DownloadTask {
            destination: destination.clone(),
            source_url: format!("{}/o.png", mock_server.uri()),
            face_index: 0,
            card_label: "Opt (tst) 1".to_string(),
        };

        let fetcher = ImageFetcher::new(ImageClient::new(HttpTimeouts::default()).unwrap(), false);
        let mut summary = RunSummary::new();
        let progress = RecordingProgress::default();
        fetcher
            .fetch_all(std::slice::from_ref(&task), &mut summary, &progress)
            .await;

        assert_eq!(summary.skipped_existing(), &[destination.clone()]);
        assert_eq!(std::fs::read(&destination).unwrap(), b"old");
        assert_eq!(
            *progress.events.lock().unwrap(),
            vec!["start 1", "advance Opt (tst) 1", "finish"]
        );
    }

    #[tokio::test]
    async fn test_failure_does_not_abort_siblings() {
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };
        let temp_dir = TempDir::new().unwrap();

        Mock::given(method("GET"))
            .and(path("/bad.png"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/good.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ok"))
            .mount(&mock_server)
            .await;

        let tasks: Vec<DownloadTask> = ["bad", "good"]
            .iter()
            .map(|name| DownloadTask {
                destination: temp_dir.path().join(format!("{name}.png")),
                source_url: format!("{}/{name}.png", mock_server.uri()),
                face_index: 0,
                card_label: (*name).to_string(),
            })
            .collect();

        let fetcher = ImageFetcher::new(ImageClient::new(HttpTimeouts::default()).unwrap(), true);
        let mut summary = RunSummary::new();
        fetcher
            .fetch_all(&tasks, &mut summary, &crate::pipeline::NoopProgress)
            .await;

        assert_eq!(summary.download_failures().len(), 1);
        assert!(summary.download_failures()[0].reason.contains("500"));
        assert_eq!(summary.downloaded().len(), 1);
        assert!(!temp_dir.path().join("bad.png").exists());
        assert!(temp_dir.path().join("good.png").exists());
    }
}
