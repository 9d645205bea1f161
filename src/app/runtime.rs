//! Top-level run: configuration, input, pipeline, summary.

use std::io::{self, IsTerminal};
use std::path::Path;

use anyhow::Result;
use card_downloader_core::config::load_default_file_config;
use card_downloader_core::{RunSummary, run_pipeline};
use tracing::{debug, info};

use crate::app::{config_runtime, input_processor, progress_manager, terminal};

pub(crate) async fn run_card_downloader() -> Result<()> {
    let (cli, cli_sources) = config_runtime::parse_cli_with_sources();

    let loaded_config = load_default_file_config()?;
    let args = config_runtime::apply_config_defaults(cli, &cli_sources, loaded_config.config.as_ref());

    terminal::init_tracing(config_runtime::resolve_default_log_level(&args));
    debug!(?args, "CLI arguments parsed");
    if let Some(path) = loaded_config.path.as_deref().filter(|_| loaded_config.loaded_from_file()) {
        debug!(path = %path.display(), "Loaded config file");
    }

    let input = input_processor::read_decklist(args.input.as_deref())?;
    let options = config_runtime::build_run_options(&args, &input.source_name)?;
    info!(
        output = %options.naming.output_root.display(),
        size = %options.naming.size,
        "Card downloader starting"
    );

    let use_progress = terminal::should_use_progress_bar(
        io::stderr().is_terminal(),
        args.quiet,
        terminal::is_dumb_terminal(),
    );
    let progress = progress_manager::make_progress(use_progress);

    let summary = run_pipeline(&input.text, &options, progress.as_ref()).await?;

    print!("{summary}");
    println!("{}", closing_line(&summary, &options.naming.output_root));
    Ok(())
}

fn closing_line(summary: &RunSummary, output_root: &Path) -> String {
    if summary.is_clean() {
        format!("Done. Images saved under {}", output_root.display())
    } else {
        let problems = summary.problems();
        let noun = if problems == 1 { "problem" } else { "problems" };
        format!(
            "Done with {problems} {noun} (listed above). Images saved under {}",
            output_root.display()
        )
    }
}
