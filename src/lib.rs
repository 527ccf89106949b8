//! QRZ Lookup - call-sign directory client with a persistent expiring cache
//!
//! Records fetched from the QRZ.com XML service are kept in a long-lived
//! positive cache; call signs the service does not know are remembered in a
//! shorter-lived negative cache so they are not queried again.

pub mod cache;
pub mod config;
pub mod error;
pub mod lookup;
pub mod models;
pub mod qrz;

pub use cache::{ExpiringStore, Ttl};
pub use config::Config;
pub use error::{CacheError, LookupError};
pub use lookup::{Fetcher, Lookup, LookupStats, Session};
pub use models::{FieldValue, LookupOutcome, Record};
pub use qrz::QrzClient;
