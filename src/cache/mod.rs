//! Cache Module
//!
//! Provides persistent key-value storage with lazy TTL expiration.

mod clock;
mod entry;
mod store;
mod ttl;


// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use store::ExpiringStore;
pub use ttl::Ttl;
