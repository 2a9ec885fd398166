//! Storage is organized through [day_store::DayStoreImpl].
//! The basic idea is:
//!  - There is a directory with all the records.
//!  - Each record file holds everything observed for one local calendar date.
//!  - A record maps domains to their ordered session lists.

pub mod day_store;
pub mod entities;
pub mod observation;
