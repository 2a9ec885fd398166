use std::sync::Arc;

use chrono::{DateTime, Local};

/// One sampled look at the browser: which url was active at a certain point in time. `domain` is
/// absent when the active page has no usable host (new-tab pages, bare schemes and the like).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservationEvent {
    pub domain: Option<Arc<str>>,
    pub url: Arc<str>,
    pub timestamp: DateTime<Local>,
}
