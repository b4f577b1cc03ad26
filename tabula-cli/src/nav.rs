//! Navigation side effect: hand a resolved URL to the system browser.

use std::sync::Arc;

/// Launch boundary, so the submit path can be tested without spawning a
/// browser.
pub trait UrlOpener: Send + Sync {
    fn open(&self, url: &str) -> std::io::Result<()>;
}

/// Opens URLs with the platform handler.
pub struct SystemOpener;

impl UrlOpener for SystemOpener {
    fn open(&self, url: &str) -> std::io::Result<()> {
        open::that_detached(url)
    }
}

/// Records opened URLs instead of launching anything.
#[cfg(test)]
pub(crate) struct RecordingOpener {
    pub(crate) opened: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl RecordingOpener {
    pub(crate) fn new() -> Self {
        Self {
            opened: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn urls(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl UrlOpener for RecordingOpener {
    fn open(&self, url: &str) -> std::io::Result<()> {
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

/// Opens URLs, honoring the global new-tab flag. In the terminal rendition
/// "new tab" means the dashboard keeps running after navigating; "same tab"
/// means it exits, like a page being replaced.
pub struct Navigator {
    opener: Arc<dyn UrlOpener>,
    new_tab: bool,
}

impl Navigator {
    pub fn new(new_tab: bool) -> Self {
        Self::with_opener(Arc::new(SystemOpener), new_tab)
    }

    pub fn with_opener(opener: Arc<dyn UrlOpener>, new_tab: bool) -> Self {
        Self { opener, new_tab }
    }

    /// Open `url` in the default browser. Returns whether the dashboard
    /// should keep running. Launch failures are logged, not surfaced; the
    /// dashboard has nothing useful to do with them.
    pub fn open(&self, url: &str) -> bool {
        tracing::info!(%url, new_tab = self.new_tab, "navigating");
        if let Err(e) = self.opener.open(url) {
            tracing::warn!(%url, error = %e, "failed to launch browser");
        }
        self.new_tab
    }
}
