use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::io::{self, IsTerminal};
use std::sync::Arc;

/// Progress indicator manager
pub struct ProgressManager {
    multi: Arc<MultiProgress>,
    enabled: bool,
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new(quiet: bool) -> Self {
        // Bars go to stderr; only draw them on a terminal
        let enabled = !quiet && io::stderr().is_terminal();

        Self {
            multi: Arc::new(MultiProgress::new()),
            enabled,
        }
    }

    /// A manager that never draws, for tests and non-interactive runs
    pub fn hidden() -> Self {
        Self::new(true)
    }

    /// Create a progress bar for a stage with a known number of calls
    pub fn create_stage_progress(&self, total: u64, message: &str) -> Option<ProgressBar> {
        if !self.enabled || total == 0 {
            return None;
        }

        let pb = self.multi.add(ProgressBar::new(total));
        let style = ProgressStyle::default_bar()
            .template("{msg}\n{bar:40.cyan/blue} {pos}/{len} ({percent}%) {elapsed_precise}")
            .map(|s| s.progress_chars("█▓░"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        pb.set_style(style);
        pb.set_message(message.to_string());

        Some(pb)
    }
}

/// Progress context for one stage; a no-op when drawing is disabled
pub struct StageProgress {
    bar: Option<ProgressBar>,
}

impl StageProgress {
    pub fn new(manager: &ProgressManager, total: u64, message: &str) -> Self {
        Self {
            bar: manager.create_stage_progress(total, message),
        }
    }

    pub fn set_message(&self, message: &str) {
        if let Some(ref pb) = self.bar {
            pb.set_message(message.to_string());
        }
    }

    pub fn inc(&self) {
        if let Some(ref pb) = self.bar {
            pb.inc(1);
        }
    }

    pub fn finish_with_message(&self, message: &str) {
        if let Some(ref pb) = self.bar {
            pb.finish_with_message(format!("✅ {}", message));
        }
    }
}

impl Drop for StageProgress {
    fn drop(&mut self) {
        if let Some(ref pb) = self.bar {
            if !pb.is_finished() {
                pb.finish_and_clear();
            }
        }
    }
}

/// Progress messages for the pipeline stages
pub mod messages {
    pub fn fetching_pair(lang: &str, content_type: &str, region_code: &str) -> String {
        format!(
            "[{}] contentTypeId={}, lDongRegnCd={} 수신 중...",
            lang, content_type, region_code
        )
    }

    pub fn fetch_complete(lang: &str, count: usize) -> String {
        format!("[{}] 총 {}건 수신 완료", lang, count)
    }

    pub fn pair_progress(current: usize, total: usize) -> String {
        format!("({}/{})", current, total)
    }
}
