//! Data models shared by the lookup client and its collaborators
//!
//! Defines the record returned for a call sign and the outcome of a lookup.

pub mod outcome;
pub mod record;

// Re-export commonly used types
pub use outcome::LookupOutcome;
pub use record::{FieldValue, Record};
