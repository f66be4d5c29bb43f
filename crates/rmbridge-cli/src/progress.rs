//! Terminal progress for the rmapi download.

use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use rmbridge_runtime::ProgressCallback;

/// Progress bar fed by the provisioner's download callback.
///
/// Nothing is drawn unless a download actually happens.
pub struct DownloadProgress {
    bar: ProgressBar,
}

impl DownloadProgress {
    pub fn new() -> Self {
        let bar = ProgressBar::hidden();
        if let Ok(style) = ProgressStyle::default_bar().template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec})",
        ) {
            bar.set_style(style.progress_chars("█▓░"));
        }
        Self { bar }
    }

    /// Callback handed to the provisioner.
    pub fn callback(&self) -> ProgressCallback {
        let bar = self.bar.clone();
        Arc::new(move |downloaded, total| {
            if bar.is_hidden() {
                bar.set_draw_target(indicatif::ProgressDrawTarget::stderr());
            }
            if total > 0 && bar.length() != Some(total) {
                bar.set_length(total);
            }
            bar.set_position(downloaded);
        })
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for DownloadProgress {
    fn default() -> Self {
        Self::new()
    }
}
