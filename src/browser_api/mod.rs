//! Contains logic for learning what the browser is currently showing.
//! The daemon itself never talks to a browser directly; a browser-side companion maintains a
//! small status file and [status_file::StatusFileProbe] reads it back.

pub mod status_file;

use std::sync::Arc;

use anyhow::Result;

/// One look at the browser taken at sampling time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabSample {
    /// Url of the active tab, if the browser reported one.
    pub url: Option<Arc<str>>,
    /// Whether the browser window currently has focus. No time is attributed while unfocused.
    pub focused: bool,
}

impl TabSample {
    pub fn inactive() -> Self {
        Self {
            url: None,
            focused: false,
        }
    }
}

/// Intended to serve as a contract any active-tab source must implement.
#[cfg_attr(test, mockall::automock)]
pub trait TabProbe: Send {
    fn sample(&mut self) -> Result<TabSample>;
}

/// Extracts the domain a url should be attributed to. A url is trackable when its host portion
/// is dotted, or when it is a local file. Everything else (new-tab pages, bare schemes) yields
/// nothing.
pub fn extract_domain(url: &str) -> Option<Arc<str>> {
    // Local files all land in one pseudo-domain bucket.
    if url.starts_with("file://") {
        return Some(Arc::from("file://"));
    }
    let host = url.split('/').nth(2)?;
    if host.is_empty() || !host.contains('.') {
        return None;
    }
    Some(Arc::from(host))
}
