//! CLI entry point for the card downloader.

use std::process::ExitCode;

mod app;
mod cli;

#[tokio::main]
async fn main() -> ExitCode {
    match app::runtime::run_card_downloader().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("Error: {error:#}");
            ExitCode::FAILURE
        }
    }
}
