//! CLI parsing with value sources, file-config merge, and run option assembly.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use card_downloader_core::config::validate_api_url;
use card_downloader_core::resolver::{DEFAULT_API_BASE_URL, HttpTimeouts, MAX_BATCH_SIZE};
use card_downloader_core::{
    ConfigError, FileConfig, ImageSize, NamingOptions, RunOptions, VerbositySetting,
    default_output_root,
};
use clap::{ArgMatches, CommandFactory, FromArgMatches, parser::ValueSource};

use crate::cli::Args;

/// Which options were given explicitly on the command line.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct CliValueSources {
    pub(crate) out: bool,
    pub(crate) size: bool,
    pub(crate) by_set: bool,
    pub(crate) unique: bool,
    pub(crate) overwrite: bool,
    pub(crate) delay: bool,
    pub(crate) timeout: bool,
    pub(crate) api_url: bool,
    pub(crate) verbose: bool,
    pub(crate) quiet: bool,
}

pub(crate) fn parse_cli_with_sources() -> (Args, CliValueSources) {
    let matches = Args::command().get_matches();
    let args = Args::from_arg_matches(&matches).unwrap_or_else(|err| err.exit());
    let sources = sources_from_matches(&matches);
    (args, sources)
}

fn sources_from_matches(matches: &ArgMatches) -> CliValueSources {
    CliValueSources {
        out: is_commandline_value(matches, "out"),
        size: is_commandline_value(matches, "size"),
        by_set: is_commandline_value(matches, "by_set"),
        unique: is_commandline_value(matches, "unique"),
        overwrite: is_commandline_value(matches, "overwrite"),
        delay: is_commandline_value(matches, "delay"),
        timeout: is_commandline_value(matches, "timeout"),
        api_url: is_commandline_value(matches, "api_url"),
        verbose: is_commandline_value(matches, "verbose"),
        quiet: is_commandline_value(matches, "quiet"),
    }
}

fn is_commandline_value(matches: &ArgMatches, id: &str) -> bool {
    matches.value_source(id) == Some(ValueSource::CommandLine)
}

/// Fills every option not given on the command line from the config file.
pub(crate) fn apply_config_defaults(
    mut args: Args,
    cli_sources: &CliValueSources,
    file_config: Option<&FileConfig>,
) -> Args {
    let Some(file_config) = file_config else {
        return args;
    };

    if !cli_sources.out
        && let Some(output_dir) = &file_config.output_dir
    {
        args.out = Some(output_dir.clone());
    }
    if !cli_sources.size
        && let Some(size) = file_config.size
    {
        args.size = Some(size.as_str().to_string());
    }
    if !cli_sources.by_set
        && let Some(by_set) = file_config.by_set
    {
        args.by_set = by_set;
    }
    if !cli_sources.unique
        && let Some(unique) = file_config.unique
    {
        args.unique = unique;
    }
    if !cli_sources.overwrite
        && let Some(overwrite) = file_config.overwrite
    {
        args.overwrite = overwrite;
    }
    if !cli_sources.delay
        && let Some(delay_ms) = file_config.delay_ms
    {
        args.delay = Some(delay_ms);
    }
    if !cli_sources.timeout
        && let Some(timeout_secs) = file_config.timeout_secs
    {
        args.timeout = Some(timeout_secs);
    }
    if !cli_sources.api_url
        && let Some(api_url) = &file_config.api_url
    {
        args.api_url = Some(api_url.clone());
    }
    if !cli_sources.verbose
        && !cli_sources.quiet
        && let Some(verbosity) = file_config.verbosity
    {
        apply_config_verbosity(&mut args, verbosity);
    }
    args
}

fn apply_config_verbosity(args: &mut Args, verbosity: VerbositySetting) {
    match verbosity {
        VerbositySetting::Default => {
            args.quiet = false;
            args.verbose = 0;
        }
        VerbositySetting::Verbose => {
            args.quiet = false;
            args.verbose = 1;
        }
        VerbositySetting::Quiet => {
            args.quiet = true;
            args.verbose = 0;
        }
        VerbositySetting::Debug => {
            args.quiet = false;
            args.verbose = 2;
        }
    }
}

pub(crate) fn resolve_default_log_level(args: &Args) -> &'static str {
    if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

/// Validates merged arguments and turns them into run options.
///
/// # Errors
///
/// Fails on an unknown size keyword or a malformed API URL.
pub(crate) fn build_run_options(args: &Args, source_name: &str) -> Result<RunOptions> {
    let size = match args.size.as_deref() {
        Some(raw) => raw
            .parse::<ImageSize>()
            .map_err(|_| ConfigError::invalid_size(raw))?,
        None => ImageSize::default(),
    };

    let api_base_url = args
        .api_url
        .clone()
        .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
    validate_api_url(&api_base_url)
        .with_context(|| format!("Invalid API URL '{api_base_url}'"))?;

    let output_root: PathBuf = args
        .out
        .clone()
        .unwrap_or_else(|| default_output_root(args.input.as_deref()));

    let timeouts = args
        .timeout
        .map_or_else(HttpTimeouts::default, HttpTimeouts::from_request_secs);

    Ok(RunOptions {
        naming: NamingOptions {
            output_root,
            by_set: args.by_set,
            unique: args.unique,
            size,
        },
        overwrite: args.overwrite,
        delay: Duration::from_millis(args.delay.unwrap_or(0)),
        timeouts,
        api_base_url,
        batch_size: MAX_BATCH_SIZE,
        source_name: source_name.to_string(),
    })
}
