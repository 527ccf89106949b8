//! Lookup Orchestrator
//!
//! Answers call-sign lookups from the positive cache, then the negative
//! cache, and only then from the directory.

use std::fs;
use std::path::Path;

use tracing::{debug, error, info, warn};

use crate::cache::{Clock, ExpiringStore, SystemClock, Ttl};
use crate::config::Config;
use crate::error::{CacheError, LookupError, LookupResult, Result};
use crate::lookup::{Fetcher, LookupStats, Session};
use crate::models::{LookupOutcome, Record};

// == Lookup ==
/// Call-sign resolver backed by a positive and a negative expiring store.
#[derive(Debug)]
pub struct Lookup<F, C: Clock = SystemClock> {
    /// Records fetched successfully
    positive: ExpiringStore<C>,
    /// Reasons for call signs the directory does not know
    negative: ExpiringStore<C>,
    /// Remote directory
    fetcher: F,
    /// Session obtained by `authenticate`
    session: Option<Session>,
    stats: LookupStats,
}

impl<F: Fetcher> Lookup<F, SystemClock> {
    /// Opens both stores from the configuration.
    ///
    /// Both TTL expressions are validated before either file is touched.
    pub fn from_config(config: &Config, fetcher: F) -> Result<Self> {
        let positive_ttl = Ttl::parse(&config.cache_ttl)?;
        let negative_ttl = Ttl::parse(&config.negative_ttl)?;

        let positive =
            ExpiringStore::with_clock(config.positive_cache_path(), positive_ttl, SystemClock)?;
        let negative =
            ExpiringStore::with_clock(config.negative_cache_path(), negative_ttl, SystemClock)?;
        Self::new(positive, negative, fetcher)
    }
}

impl<F: Fetcher, C: Clock> Lookup<F, C> {
    // == Constructor ==
    /// Combines two stores with a fetcher. The stores must not share a file.
    pub fn new(positive: ExpiringStore<C>, negative: ExpiringStore<C>, fetcher: F) -> Result<Self> {
        if same_file(positive.path(), negative.path()) {
            return Err(CacheError::Configuration(format!(
                "positive and negative caches both use {}",
                positive.path().display()
            )));
        }

        info!(
            positive = %positive.path().display(),
            positive_ttl = %positive.ttl(),
            negative = %negative.path().display(),
            negative_ttl = %negative.ttl(),
            "Lookup caches ready"
        );

        Ok(Self {
            positive,
            negative,
            fetcher,
            session: None,
            stats: LookupStats::new(),
        })
    }

    // == Authenticate ==
    /// Logs in to the directory and keeps the session for later fetches.
    pub fn authenticate(&mut self, username: &str, password: &str) -> LookupResult<()> {
        match self.fetcher.authenticate(username, password) {
            Ok(session) => {
                info!(username, "Authenticated");
                self.session = Some(session);
                Ok(())
            }
            Err(e) => {
                error!(username, error = %e, "Authentication error");
                self.session = None;
                Err(e)
            }
        }
    }

    // == Is Authenticated ==
    /// Returns whether a session is held.
    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    // == Lookup ==
    /// Resolves `callsign`, consulting the network only on a double miss.
    ///
    /// A "not found" answer from the directory is remembered in the negative
    /// store; any other fetch failure is returned without being cached. Cache
    /// failures are logged and bypassed.
    pub fn lookup(&mut self, callsign: &str) -> LookupResult<LookupOutcome> {
        let key = normalize(callsign);
        if key.is_empty() {
            return Err(LookupError::InvalidCallsign(callsign.to_string()));
        }

        match self.positive.get::<Record>(&key) {
            Ok(record) => {
                self.stats.record_hit();
                return Ok(LookupOutcome::Found(record));
            }
            Err(e) if e.is_not_found() => {}
            Err(e) => {
                warn!(callsign = %key, error = %e, "Positive cache unreadable, bypassing");
                self.stats.record_cache_error();
            }
        }

        match self.negative.get::<String>(&key) {
            Ok(reason) => {
                debug!(callsign = %key, %reason, "Known absent");
                self.stats.record_negative_hit();
                return Ok(LookupOutcome::KnownAbsent {
                    callsign: key,
                    reason,
                });
            }
            Err(e) if e.is_not_found() => {}
            Err(e) => {
                warn!(callsign = %key, error = %e, "Negative cache unreadable, bypassing");
                self.stats.record_cache_error();
            }
        }

        let session = self
            .session
            .as_ref()
            .ok_or_else(|| LookupError::RemoteSession("First authenticate".to_string()))?;

        info!(callsign = %key, "Loading from directory");
        self.stats.record_fetch();

        match self.fetcher.fetch(session, &key) {
            Ok(record) => {
                if let Err(e) = self.positive.put(&key, &record) {
                    warn!(callsign = %key, error = %e, "Could not cache record");
                    self.stats.record_cache_error();
                }
                Ok(LookupOutcome::Found(record))
            }
            Err(LookupError::RemoteNotFound { reason, .. }) => {
                debug!(callsign = %key, %reason, "Not found");
                if let Err(e) = self.negative.put(&key, &reason) {
                    warn!(callsign = %key, error = %e, "Could not cache failed lookup");
                    self.stats.record_cache_error();
                }
                Ok(LookupOutcome::KnownAbsent {
                    callsign: key,
                    reason,
                })
            }
            Err(e) => Err(e),
        }
    }

    // == Forget ==
    /// Drops `callsign` from both stores. Returns whether anything was removed.
    pub fn forget(&self, callsign: &str) -> Result<bool> {
        let key = normalize(callsign);
        let positive = self.positive.remove(&key)?;
        let negative = self.negative.remove(&key)?;
        Ok(positive || negative)
    }

    // == Stats ==
    /// Returns the counters gathered so far.
    pub fn stats(&self) -> &LookupStats {
        &self.stats
    }

    // == Positive Store ==
    /// Returns the store of fetched records.
    pub fn positive(&self) -> &ExpiringStore<C> {
        &self.positive
    }

    // == Negative Store ==
    /// Returns the store of "not found" reasons.
    pub fn negative(&self) -> &ExpiringStore<C> {
        &self.negative
    }
}

// Both files exist once the stores are open, so canonical paths are comparable.
fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

// == Normalize ==
/// Cache keys are trimmed, upper-case call signs.
pub fn normalize(callsign: &str) -> String {
    callsign.trim().to_uppercase()
}
