//! End-to-end pipeline tests: decklist text in, image files out.

use std::sync::Mutex;

use card_downloader_core::{ConfigError, NoopProgress, ProgressReporter, RunOptions, run_pipeline};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod support;
use support::socket_guard::start_mock_server_or_skip;

#[derive(Default)]
struct RecordingProgress {
    events: Mutex<Vec<String>>,
}

impl ProgressReporter for RecordingProgress {
    fn start(&self, total: u64) {
        self.events.lock().unwrap().push(format!("start:{total}"));
    }

    fn advance(&self, label: &str) {
        self.events.lock().unwrap().push(format!("advance:{label}"));
    }

    fn finish(&self) {
        self.events.lock().unwrap().push("finish".to_string());
    }
}

async fn mount_deck_api(server: &MockServer) {
    let base = server.uri();
    Mock::given(method("POST"))
        .and(path("/cards/collection"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "not_found": [{"name": "Not A Real Card"}],
            "data": [
                {
                    "name": "Lightning Bolt",
                    "set": "m11",
                    "collector_number": "149",
                    "image_uris": {"png": format!("{base}/img/bolt.png")}
                },
                {
                    "name": "Boseiju, Who Endures",
                    "set": "neo",
                    "collector_number": "266",
                    "image_uris": {"png": format!("{base}/img/boseiju.png")}
                }
            ]
        })))
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/img/bolt.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"BOLT".to_vec()))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/img/boseiju.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"BOSEIJU".to_vec()))
        .mount(server)
        .await;
}

const DECK: &str = "\
// Burn
Deck
3 Lightning Bolt
1 Boseiju, Who Endures (NEO)
1 Not A Real Card
";

#[tokio::test]
async fn test_pipeline_downloads_every_copy_and_reports_missing_cards() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_deck_api(&server).await;

    let temp_dir = TempDir::new().unwrap();
    let out = temp_dir.path().join("burn");
    let mut options = RunOptions::new(&out);
    options.api_base_url = server.uri();

    let progress = RecordingProgress::default();
    let summary = run_pipeline(DECK, &options, &progress).await.unwrap();

    assert_eq!(summary.resolved(), 2);
    assert_eq!(summary.not_found(), &["1 Not A Real Card".to_string()]);
    assert_eq!(summary.downloaded().len(), 4);
    assert_eq!(summary.failed(), 0);

    for copy in 1..=3 {
        assert!(out.join(format!("Lightning Bolt (m11) 149_{copy}.png")).exists());
    }
    assert_eq!(
        std::fs::read(out.join("Boseiju, Who Endures (neo) 266.png")).unwrap(),
        b"BOSEIJU"
    );

    let events = progress.events.lock().unwrap();
    assert_eq!(events.first().map(String::as_str), Some("start:4"));
    assert_eq!(events.last().map(String::as_str), Some("finish"));
    assert_eq!(events.len(), 6);
}

#[tokio::test]
async fn test_second_run_skips_existing_images() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    let temp_dir = TempDir::new().unwrap();
    let mut options = RunOptions::new(temp_dir.path().join("out"));
    options.api_base_url = server.uri();
    options.naming.unique = true;

    mount_deck_api(&server).await;
    let first = run_pipeline(DECK, &options, &NoopProgress).await.unwrap();
    assert_eq!(first.downloaded().len(), 2);

    server.reset().await;
    mount_deck_api(&server).await;
    let second = run_pipeline(DECK, &options, &NoopProgress).await.unwrap();
    assert_eq!(second.downloaded().len(), 0);
    assert_eq!(second.skipped_existing().len(), 2);
}

#[tokio::test]
async fn test_pipeline_records_missing_size_as_card_failure() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_deck_api(&server).await;

    let temp_dir = TempDir::new().unwrap();
    let mut options = RunOptions::new(temp_dir.path());
    options.api_base_url = server.uri();
    options.naming.size = card_downloader_core::ImageSize::ArtCrop;

    let summary = run_pipeline(DECK, &options, &NoopProgress).await.unwrap();
    assert_eq!(summary.downloaded().len(), 0);
    assert_eq!(summary.download_failures().len(), 2);
    assert!(summary.download_failures()[0].reason.contains("art_crop"));
}

#[tokio::test]
async fn test_pipeline_rejects_decklist_without_cards() {
    let temp_dir = TempDir::new().unwrap();
    let options = RunOptions::new(temp_dir.path().join("never"));

    let err = run_pipeline("\n# nothing here\nSideboard\n", &options, &NoopProgress)
        .await
        .unwrap_err();
    assert!(matches!(err, ConfigError::NoCards { .. }));
}

#[tokio::test]
async fn test_lines_resolving_to_same_printing_get_distinct_files() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    let bolt = json!({
        "name": "Lightning Bolt",
        "set": "m11",
        "collector_number": "149",
        "image_uris": {"png": format!("{}/img/bolt.png", server.uri())}
    });
    Mock::given(method("POST"))
        .and(path("/cards/collection"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "not_found": [],
            "data": [bolt.clone(), bolt]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/img/bolt.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"BOLT".to_vec()))
        .expect(4)
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let out = temp_dir.path().join("out");
    let mut options = RunOptions::new(&out);
    options.api_base_url = server.uri();

    let summary = run_pipeline(
        "2 Lightning Bolt\n2 Lightning Bolt (M11)\n",
        &options,
        &NoopProgress,
    )
    .await
    .unwrap();

    assert_eq!(summary.resolved(), 2);
    assert_eq!(summary.downloaded().len(), 4);
    assert!(summary.skipped_existing().is_empty());
    for copy in 1..=4 {
        assert!(out.join(format!("Lightning Bolt (m11) 149_{copy}.png")).exists());
    }
    assert_eq!(std::fs::read_dir(&out).unwrap().count(), 4);
}
