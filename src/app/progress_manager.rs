//! Progress bar for the download phase.

use card_downloader_core::{NoopProgress, ProgressReporter};
use indicatif::{ProgressBar, ProgressStyle};

/// Renders download progress on stderr.
pub(crate) struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    fn new() -> Self {
        let bar = ProgressBar::hidden();
        bar.set_style(
            ProgressStyle::with_template("{bar:30.cyan/blue} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Self { bar }
    }
}

impl ProgressReporter for BarProgress {
    fn start(&self, total: u64) {
        self.bar.set_length(total);
        self.bar.set_position(0);
        self.bar
            .set_draw_target(indicatif::ProgressDrawTarget::stderr());
    }

    fn advance(&self, label: &str) {
        self.bar.set_message(label.to_string());
        self.bar.inc(1);
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

/// Returns a progress bar when enabled, otherwise a reporter that draws nothing.
pub(crate) fn make_progress(enabled: bool) -> Box<dyn ProgressReporter> {
    if enabled {
        Box::new(BarProgress::new())
    } else {
        Box::new(NoopProgress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_progress_counts_tasks() {
        let progress = BarProgress::new();
        progress.start(3);
        progress.advance("Opt (eld) 59");
        progress.advance("Opt (eld) 59");
        assert_eq!(progress.bar.position(), 2);
        assert_eq!(progress.bar.length(), Some(3));
        progress.finish();
        assert!(progress.bar.is_finished());
    }

    #[test]
    fn test_disabled_progress_is_noop() {
        let progress = make_progress(false);
        progress.start(1);
        progress.advance("x");
        progress.finish();
    }
}
