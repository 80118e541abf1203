//! Guestlist: per-day guest list library
//!
//! Fetches or loads event registrants, buckets them by day ticket while
//! replicating all-days holders into every day, and writes per-day guest
//! lists as CSV or upload-ready JSON.

pub mod cli;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod utils;

pub use error::{ErrorKind, GuestlistError, Result};
