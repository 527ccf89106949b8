//! Contract of the directory behind the cache.

use std::fmt;

use crate::error::LookupResult;
use crate::models::Record;

// == Session ==
/// Authenticated session key issued by the directory.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    key: String,
}

impl Session {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

// Keep session keys out of logs.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").field("key", &"<redacted>").finish()
    }
}

// == Fetcher Trait ==
/// Remote source of call-sign records.
///
/// `fetch` fails with `LookupError::RemoteNotFound` when the directory
/// answers that the call sign does not exist; every other failure is
/// reported with another variant and is never cached.
pub trait Fetcher {
    fn authenticate(&self, username: &str, password: &str) -> LookupResult<Session>;

    fn fetch(&self, session: &Session, callsign: &str) -> LookupResult<Record>;
}
