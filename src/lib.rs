//! Tracks how much active time is spent on each web domain and rolls it up into daily, weekly
//! and monthly summaries. A background daemon counts focused browser ticks into per-date record
//! files; the cli reads them back out.
//!

pub mod browser_api;
pub mod cli;
pub mod daemon;
pub mod stats;
pub mod transfer;
pub mod utils;
