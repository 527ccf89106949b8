//! Lookup Module
//!
//! Composes the positive and negative stores with a remote fetcher.

mod fetcher;
mod orchestrator;
mod stats;

pub use fetcher::{Fetcher, Session};
pub use orchestrator::{normalize, Lookup};
pub use stats::LookupStats;
