use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Archive-level progress shared by every worker of a run
///
/// Workers call [`Progress::archive_done`] from their own threads; the bar
/// is optional so library callers and tests can run without a terminal.
pub struct Progress {
    bar: Option<ProgressBar>,
    completed: AtomicUsize,
    total: usize,
}

impl Progress {
    /// Progress that only counts, never draws
    pub fn hidden(total: usize) -> Self {
        Self {
            bar: None,
            completed: AtomicUsize::new(0),
            total,
        }
    }

    /// Progress with a terminal bar labelled with the strategy name
    pub fn bar(total: usize, label: &str) -> Self {
        let bar = ProgressBar::with_draw_target(Some(total as u64), ProgressDrawTarget::stderr());
        if let Ok(style) = ProgressStyle::with_template(
            "{prefix:>10} [{elapsed_precise}] {bar:40.cyan/blue} {pos:>6}/{len:6} archives {msg}",
        ) {
            bar.set_style(style.progress_chars("█▉▊▋▌▍▎▏  "));
        }
        bar.set_prefix(label.to_string());

        Self {
            bar: Some(bar),
            completed: AtomicUsize::new(0),
            total,
        }
    }

    /// Record one finished archive, returns the running total
    pub fn archive_done(&self) -> usize {
        let current = self.completed.fetch_add(1, Ordering::Relaxed) + 1;
        if let Some(bar) = &self.bar {
            bar.set_position(current as u64);
        }
        current
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Finish and clear the bar
    pub fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}
