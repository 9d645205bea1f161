//! File configuration and fatal configuration errors.
//!
//! The optional config file lives at
//! `$XDG_CONFIG_HOME/card-downloader/config.toml` (or
//! `$HOME/.config/card-downloader/config.toml`) and holds simple
//! `key = value` lines:
//!
//! ```text
//! output_dir = "/home/me/proxies"
//! size = "large"        # png, large, normal, small, art_crop, border_crop
//! by_set = true
//! unique = false
//! overwrite = false
//! delay_ms = 100
//! timeout_secs = 30
//! api_url = "https://api.scryfall.com"
//! verbosity = "verbose" # default, verbose, quiet, debug
//! ```
//!
//! Values given on the command line win over file values.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use thiserror::Error;
use url::Url;

use crate::download::ImageSize;

/// Longest accepted pause between image downloads.
pub const MAX_DELAY_MS: u64 = 60_000;

/// Configuration problems that stop a run before any network activity.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Unknown image size keyword
    #[error("invalid image size '{value}'\n  Suggestion: Use one of: {valid}")]
    InvalidSize {
        /// Keyword as given
        value: String,
        /// Accepted keywords
        valid: String,
    },

    /// Decklist file could not be read
    #[error("cannot read decklist '{path}': {source}\n  Suggestion: Check the path passed to --input")]
    UnreadableInput {
        /// Input path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Output root could not be created or written
    #[error("cannot write to output directory '{path}': {source}\n  Suggestion: Choose another --out directory or fix its permissions")]
    UnwritableOutput {
        /// Output root
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Config file is malformed or holds out-of-range values
    #[error("invalid config file '{path}': {reason}")]
    InvalidConfig {
        /// Config file path
        path: PathBuf,
        /// Parser message with line context
        reason: String,
    },

    /// HTTP clients could not be constructed
    #[error("cannot set up HTTP client: {reason}")]
    ClientSetup {
        /// Builder message
        reason: String,
    },

    /// The decklist held no card lines
    #[error("no card entries found in {source_name}\n  Suggestion: Lines look like '4 Lightning Bolt' or '1 Opt (ELD) 59'")]
    NoCards {
        /// `stdin` or the input path
        source_name: String,
    },
}

impl ConfigError {
    /// Creates an invalid size error listing the accepted keywords.
    pub fn invalid_size(value: impl Into<String>) -> Self {
        Self::InvalidSize {
            value: value.into(),
            valid: ImageSize::valid_keywords(),
        }
    }

    /// Creates an unreadable input error.
    pub fn unreadable_input(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::UnreadableInput {
            path: path.into(),
            source,
        }
    }

    /// Creates an unwritable output error.
    pub fn unwritable_output(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::UnwritableOutput {
            path: path.into(),
            source,
        }
    }

    /// Creates a client setup error.
    pub fn client_setup(reason: impl ToString) -> Self {
        Self::ClientSetup {
            reason: reason.to_string(),
        }
    }

    /// Creates an empty decklist error.
    pub fn no_cards(source_name: impl Into<String>) -> Self {
        Self::NoCards {
            source_name: source_name.into(),
        }
    }
}

/// Values read from the config file. Absent keys stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    /// Default output root.
    pub output_dir: Option<PathBuf>,
    /// Default image size.
    pub size: Option<ImageSize>,
    /// Group images by set.
    pub by_set: Option<bool>,
    /// One image per printing.
    pub unique: Option<bool>,
    /// Replace existing files.
    pub overwrite: Option<bool>,
    /// Pause between image downloads in milliseconds.
    pub delay_ms: Option<u64>,
    /// Total request timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Card data API base URL.
    pub api_url: Option<String>,
    /// Default verbosity mode.
    pub verbosity: Option<VerbositySetting>,
}

impl FileConfig {
    /// Validates config values against runtime and CLI constraints.
    ///
    /// # Errors
    ///
    /// Returns an error naming the offending key.
    pub fn validate(&self) -> Result<()> {
        if let Some(delay_ms) = self.delay_ms
            && delay_ms > MAX_DELAY_MS
        {
            bail!("Invalid config value for `delay_ms`: {delay_ms}. Expected range: 0..={MAX_DELAY_MS}");
        }
        if let Some(timeout_secs) = self.timeout_secs
            && !(1..=3600).contains(&timeout_secs)
        {
            bail!("Invalid config value for `timeout_secs`: {timeout_secs}. Expected range: 1..=3600");
        }
        if let Some(api_url) = &self.api_url {
            validate_api_url(api_url)
                .with_context(|| format!("Invalid config value for `api_url`: '{api_url}'"))?;
        }
        Ok(())
    }
}

/// Checks that an API base URL is an absolute http(s) URL.
///
/// # Errors
///
/// Returns an error when the URL does not parse or uses another scheme.
pub fn validate_api_url(raw: &str) -> Result<()> {
    let url = Url::parse(raw).context("Expected an absolute URL")?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("Expected an http or https URL");
    }
    Ok(())
}

/// Supported config verbosity labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbositySetting {
    /// Info-level logging
    Default,
    /// Debug-level logging for this crate
    Verbose,
    /// Errors only, no progress bar
    Quiet,
    /// Debug-level logging everywhere
    Debug,
}

impl VerbositySetting {
    /// Returns the stable string label for display output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Verbose => "verbose",
            Self::Quiet => "quiet",
            Self::Debug => "debug",
        }
    }
}

/// Loaded config metadata.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Resolved config path if a base directory is known.
    pub path: Option<PathBuf>,
    /// Parsed file config when a config file exists and was valid.
    pub config: Option<FileConfig>,
}

impl LoadedConfig {
    /// Indicates whether configuration was loaded from disk.
    #[must_use]
    pub fn loaded_from_file(&self) -> bool {
        self.config.is_some()
    }

    /// Parsed config, or an empty one when no file was loaded.
    #[must_use]
    pub fn file_config(&self) -> FileConfig {
        self.config.clone().unwrap_or_default()
    }
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/card-downloader/config.toml`
/// 2. `$HOME/.config/card-downloader/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("card-downloader")
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("card-downloader")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads config from the default path if present.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidConfig`] when the file exists but cannot be
/// read or parsed.
pub fn load_default_file_config() -> Result<LoadedConfig, ConfigError> {
    let path = resolve_default_config_path();
    let config = match path.as_deref() {
        Some(path_ref) if path_ref.exists() => Some(load_file_config(path_ref)?),
        _ => None,
    };
    Ok(LoadedConfig { path, config })
}

/// Loads and validates one config file.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidConfig`] with the line that failed.
pub fn load_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let parsed = fs::read_to_string(path)
        .context("Failed to read config file")
        .and_then(|raw| parse_config_str(&raw));
    parsed.map_err(|err| ConfigError::InvalidConfig {
        path: path.to_path_buf(),
        reason: format!("{err:#}"),
    })
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line_no = line_index + 1;
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!("Invalid config syntax on line {line_no}: expected key = value");
        };

        let key = raw_key.trim();
        let value = raw_value.trim();
        let context = || format!("Invalid `{key}` value on line {line_no}");

        match key {
            "output_dir" => {
                cfg.output_dir = Some(PathBuf::from(parse_string_literal(value).with_context(context)?));
            }
            "size" => {
                let parsed = parse_string_literal(value).with_context(context)?;
                let size = parsed
                    .parse::<ImageSize>()
                    .map_err(anyhow::Error::from)
                    .with_context(context)?;
                cfg.size = Some(size);
            }
            "by_set" => cfg.by_set = Some(parse_boolean(value).with_context(context)?),
            "unique" => cfg.unique = Some(parse_boolean(value).with_context(context)?),
            "overwrite" => cfg.overwrite = Some(parse_boolean(value).with_context(context)?),
            "delay_ms" => cfg.delay_ms = Some(parse_integer_u64(value).with_context(context)?),
            "timeout_secs" => {
                cfg.timeout_secs = Some(parse_integer_u64(value).with_context(context)?);
            }
            "api_url" => cfg.api_url = Some(parse_string_literal(value).with_context(context)?),
            "verbosity" => {
                let parsed = parse_string_literal(value).with_context(context)?;
                cfg.verbosity = Some(parse_verbosity(&parsed).with_context(|| {
                    format!("Invalid `verbosity` value '{parsed}' on line {line_no}")
                })?);
            }
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_no}");
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        bail!("Expected double-quoted string");
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_integer_u64(raw_value: &str) -> Result<u64> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    let value = token.parse::<i128>()?;
    if value < 0 {
        bail!("Expected non-negative integer");
    }
    u64::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u64"))
}

fn parse_verbosity(value: &str) -> Result<VerbositySetting> {
    match value {
        "default" => Ok(VerbositySetting::Default),
        "verbose" => Ok(VerbositySetting::Verbose),
        "quiet" => Ok(VerbositySetting::Quiet),
        "debug" => Ok(VerbositySetting::Debug),
        _ => bail!("Expected one of: default, verbose, quiet, debug"),
    }
}

fn parse_boolean(raw_value: &str) -> Result<bool> {
    match raw_value.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => bail!("Expected 'true' or 'false'"),
    }
}
