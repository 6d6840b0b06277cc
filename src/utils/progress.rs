use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner shown while a ticker is processed. Hidden when `enabled` is
/// false so output stays clean when piped.
#[derive(Clone)]
pub struct ProgressTracker {
    progress_bar: Option<ProgressBar>,
    ticker: String,
}

impl ProgressTracker {
    pub fn new(enabled: bool, ticker: &str) -> Self {
        let progress_bar = enabled.then(|| {
            let pb = ProgressBar::new_spinner();
            if let Ok(style) =
                ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")
            {
                pb.set_style(style);
            }
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        });
        Self {
            progress_bar,
            ticker: ticker.to_string(),
        }
    }

    pub fn update_message(&self, message: &str) {
        if let Some(pb) = &self.progress_bar {
            pb.set_message(format!("[{}] {}", self.ticker, message));
        }
    }

    pub fn finish(&self, message: &str) {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message(format!("[{}] {}", self.ticker, message));
        }
    }

    pub fn abandon(&self) {
        if let Some(pb) = &self.progress_bar {
            pb.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_tracker_is_silent() {
        let tracker = ProgressTracker::new(false, "ACME");
        assert!(tracker.progress_bar.is_none());
        tracker.update_message("locating filing");
        tracker.finish("done");
    }
}
