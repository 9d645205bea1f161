//! Decklist input: read from `--input` or stdin.

use std::io::{self, IsTerminal, Read};
use std::path::Path;

use card_downloader_core::ConfigError;
use tracing::info;

/// Decklist text plus the name used for it in messages.
#[derive(Debug)]
pub(crate) struct DecklistInput {
    pub(crate) text: String,
    pub(crate) source_name: String,
}

/// Reads the decklist from `path`, or from stdin when no path is given.
///
/// # Errors
///
/// Returns [`ConfigError::UnreadableInput`] when the file or stdin cannot be read.
pub(crate) fn read_decklist(path: Option<&Path>) -> Result<DecklistInput, ConfigError> {
    if let Some(path) = path {
        let text =
            std::fs::read_to_string(path).map_err(|e| ConfigError::unreadable_input(path, e))?;
        return Ok(DecklistInput {
            text,
            source_name: path.display().to_string(),
        });
    }

    if io::stdin().is_terminal() {
        info!("Paste your decklist, then press Ctrl-D (Ctrl-Z on Windows)");
    }
    let mut text = String::new();
    io::stdin()
        .read_to_string(&mut text)
        .map_err(|e| ConfigError::unreadable_input("stdin", e))?;
    Ok(DecklistInput {
        text,
        source_name: "stdin".to_string(),
    })
}
