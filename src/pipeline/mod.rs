//! Pipeline module - fetching, loading and classifying registrants

pub mod classify;
pub mod fetch;
pub mod loader;

pub use classify::*;
pub use fetch::*;
pub use loader::*;
