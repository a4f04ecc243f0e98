use std::time::Duration;

use indicatif::{HumanDuration, ProgressBar, ProgressStyle};

/// Assumed remote throughput used for ETAs, in saved-track items per second.
pub const LIBRARY_ITEMS_PER_SEC: f64 = 100.0;
/// Artists resolved per second.
pub const ARTISTS_PER_SEC: f64 = 100.0;
/// Track URIs appended to a playlist per second.
pub const TRACKS_APPENDED_PER_SEC: f64 = 200.0;

/// Share of `total` that is done, clamped to `0..=100`.
///
/// An empty workload counts as finished.
pub fn percent(done: usize, total: usize) -> f64 {
    if total == 0 {
        return 100.0;
    }
    done.min(total) as f64 / total as f64 * 100.0
}

pub fn estimate_remaining(done: usize, total: usize, per_second: f64) -> Duration {
    let remaining = total.saturating_sub(done);
    if remaining == 0 || per_second <= 0.0 {
        return Duration::ZERO;
    }
    Duration::from_secs_f64(remaining as f64 / per_second)
}

/// Spinner showing percentage and time left for one stage.
pub struct Progress {
    label: String,
    done: usize,
    total: usize,
    per_second: f64,
    bar: ProgressBar,
}

impl Progress {
    pub fn new(label: impl Into<String>, total: usize, per_second: f64, quiet: bool) -> Self {
        let bar = if quiet {
            ProgressBar::hidden()
        } else {
            ProgressBar::new_spinner()
        };
        bar.enable_steady_tick(Duration::from_millis(100));
        if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
            bar.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
        }

        let progress = Self {
            label: label.into(),
            done: 0,
            total,
            per_second,
            bar,
        };
        progress.render();
        progress
    }

    pub fn advance(&mut self, count: usize) {
        self.done += count;
        self.render();
    }

    pub fn done(&self) -> usize {
        self.done
    }

    pub fn percent(&self) -> f64 {
        percent(self.done, self.total)
    }

    pub fn remaining(&self) -> Duration {
        estimate_remaining(self.done, self.total, self.per_second)
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    fn render(&self) {
        self.bar.set_message(format!(
            "{label} {percent:.1}% ({done}/{total}), about {eta} left",
            label = self.label,
            percent = self.percent(),
            done = self.done.min(self.total),
            total = self.total,
            eta = HumanDuration(self.remaining()),
        ));
    }
}

impl Drop for Progress {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advancing_updates_percent_and_eta() {
        let mut progress = Progress::new("Appending", 1200, TRACKS_APPENDED_PER_SEC, true);
        assert_eq!(progress.percent(), 0.0);
        assert_eq!(progress.remaining(), Duration::from_secs(6));

        progress.advance(600);
        assert_eq!(progress.done(), 600);
        assert_eq!(progress.percent(), 50.0);
        assert_eq!(progress.remaining(), Duration::from_secs(3));

        progress.advance(600);
        assert_eq!(progress.percent(), 100.0);
        assert_eq!(progress.remaining(), Duration::ZERO);
        progress.finish();
    }

    #[test]
    fn empty_workload_is_finished() {
        let progress = Progress::new("Downloading", 0, LIBRARY_ITEMS_PER_SEC, true);
        assert_eq!(progress.percent(), 100.0);
        assert_eq!(progress.remaining(), Duration::ZERO);
    }

    #[test]
    fn overshoot_is_clamped() {
        assert_eq!(percent(120, 100), 100.0);
        assert_eq!(estimate_remaining(120, 100, ARTISTS_PER_SEC), Duration::ZERO);
        assert_eq!(estimate_remaining(0, 100, 0.0), Duration::ZERO);
    }
}
