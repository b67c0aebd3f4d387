use crate::error::Result;
use crate::probe::RemoteSizeProbe;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::Duration;

pub struct ProgressManager {
    multi_progress: MultiProgress,
    enabled: bool,
}

impl ProgressManager {
    pub fn new(enabled: bool) -> Self {
        Self {
            multi_progress: MultiProgress::new(),
            enabled,
        }
    }

    pub fn create_spinner(&self, message: &str) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }

        let pb = self.multi_progress.add(ProgressBar::new_spinner());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_style(
            ProgressStyle::with_template("{spinner:.green} {msg} ({elapsed})")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        pb.set_message(message.to_string());
        pb
    }

    pub fn suspend<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        if self.enabled {
            self.multi_progress.suspend(f)
        } else {
            f()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Shows a spinner while a HEAD request is in flight.
pub struct SpinnerProbe<'a> {
    inner: &'a dyn RemoteSizeProbe,
    progress: &'a ProgressManager,
}

impl<'a> SpinnerProbe<'a> {
    pub fn new(inner: &'a dyn RemoteSizeProbe, progress: &'a ProgressManager) -> Self {
        Self { inner, progress }
    }
}

impl RemoteSizeProbe for SpinnerProbe<'_> {
    fn remote_size(&self, url: &str) -> Result<u64> {
        let spinner = self
            .progress
            .create_spinner(&format!("Checking remote size of {}", url));
        let size = self.inner.remote_size(url);
        spinner.finish_and_clear();
        size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimpleExtractError;

    struct Fixed(Option<u64>);

    impl RemoteSizeProbe for Fixed {
        fn remote_size(&self, url: &str) -> Result<u64> {
            self.0.ok_or_else(|| SimpleExtractError::NetworkError {
                url: url.to_string(),
                message: "unreachable".to_string(),
            })
        }
    }

    #[test]
    fn test_progress_manager_creation() {
        let manager = ProgressManager::new(true);
        assert!(manager.is_enabled());

        let disabled_manager = ProgressManager::new(false);
        assert!(!disabled_manager.is_enabled());
    }

    #[test]
    fn test_disabled_spinner_is_hidden() {
        let manager = ProgressManager::new(false);
        let spinner = manager.create_spinner("test");
        assert!(spinner.is_hidden());
    }

    #[test]
    fn test_suspend_returns_closure_value() {
        let manager = ProgressManager::new(false);
        assert_eq!(manager.suspend(|| 7), 7);
    }

    #[test]
    fn test_spinner_probe_passes_through() {
        let manager = ProgressManager::new(false);

        let found = Fixed(Some(2048));
        let probe = SpinnerProbe::new(&found, &manager);
        assert_eq!(probe.remote_size("https://example.com/a.zip").unwrap(), 2048);

        let missing = Fixed(None);
        let probe = SpinnerProbe::new(&missing, &manager);
        assert!(matches!(
            probe.remote_size("https://example.com/a.zip"),
            Err(SimpleExtractError::NetworkError { .. })
        ));
    }
}
