//! Integration Tests for the Lookup Caches
//!
//! Drives the public API end to end with a scripted directory and real
//! backing files in a temporary directory.

use std::cell::Cell;
use std::path::Path;

use qrz_lookup::cache::{Clock, ExpiringStore, ManualClock, Ttl};
use qrz_lookup::error::LookupResult;
use qrz_lookup::{
    CacheError, FieldValue, Fetcher, Lookup, LookupError, LookupOutcome, Record, Session,
};
use serde_json::{json, Value};
use tempfile::TempDir;

// == Helper Types ==

const DAY: u64 = 86_400;

/// Directory that knows a single call sign and counts its fetches.
#[derive(Default)]
struct ScriptedDirectory {
    fetches: Cell<usize>,
}

impl Fetcher for ScriptedDirectory {
    fn authenticate(&self, _username: &str, _password: &str) -> LookupResult<Session> {
        Ok(Session::new("session-key"))
    }

    fn fetch(&self, session: &Session, callsign: &str) -> LookupResult<Record> {
        assert_eq!(session.key(), "session-key");
        self.fetches.set(self.fetches.get() + 1);

        if callsign == "W6BSD" {
            Ok([
                ("call", "W6BSD"),
                ("name_fmt", "Fred C"),
                ("grid", "CM87tl"),
                ("dxcc", "291"),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), FieldValue::from_raw(k, v)))
            .collect())
        } else {
            Err(LookupError::RemoteNotFound {
                callsign: callsign.to_string(),
                reason: format!("Not found: {}", callsign),
            })
        }
    }
}

fn open_lookup(
    dir: &Path,
    clock: &ManualClock,
    positive_ttl: Ttl,
    negative_ttl: Ttl,
) -> Lookup<ScriptedDirectory, ManualClock> {
    let positive =
        ExpiringStore::with_clock(dir.join("qrz-cache.json"), positive_ttl, clock.clone())
            .unwrap();
    let negative =
        ExpiringStore::with_clock(dir.join("qrz-cache-errors.json"), negative_ttl, clock.clone())
            .unwrap();
    let mut lookup = Lookup::new(positive, negative, ScriptedDirectory::default()).unwrap();
    lookup.authenticate("W6BSD", "key").unwrap();
    lookup
}

// == Store Tests ==

#[test]
fn test_put_then_get_with_never_expiring_ttl() {
    let dir = TempDir::new().unwrap();
    let store = ExpiringStore::open(dir.path().join("cache.json"), "0").unwrap();

    store.put("K1ABC", &json!({"call": "K1ABC", "dxcc": 291})).unwrap();

    let value: Value = store.get("K1ABC").unwrap();
    assert_eq!(value, json!({"call": "K1ABC", "dxcc": 291}));
}

#[test]
fn test_store_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cache.json");

    {
        let store = ExpiringStore::open(&path, "1Y").unwrap();
        store.put("K1ABC", "first run").unwrap();
    }

    let store = ExpiringStore::open(&path, "1Y").unwrap();
    assert_eq!(store.get::<String>("K1ABC").unwrap(), "first run");
    assert_eq!(store.len().unwrap(), 1);
}

#[test]
fn test_reopen_with_shorter_ttl_applies_new_policy() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cache.json");
    let clock = ManualClock::default();

    let long = ExpiringStore::with_clock(&path, Ttl::from_secs(10 * DAY), clock.clone()).unwrap();
    long.put("K1ABC", "value").unwrap();
    clock.advance((2 * DAY) as i64);

    let short = ExpiringStore::with_clock(&path, Ttl::from_secs(DAY), clock.clone()).unwrap();
    assert!(matches!(short.get::<String>("K1ABC"), Err(CacheError::NotFound(_))));
    assert_eq!(long.get::<String>("K1ABC").unwrap(), "value");
}

#[test]
fn test_size_counts_stale_entries_until_overwritten_or_removed() {
    let dir = TempDir::new().unwrap();
    let clock = ManualClock::default();
    let store = ExpiringStore::with_clock(
        dir.path().join("cache.json"),
        Ttl::parse("1H").unwrap(),
        clock.clone(),
    )
    .unwrap();

    store.put("K1ABC", "value").unwrap();
    clock.advance(3600);

    assert!(matches!(store.get::<String>("K1ABC"), Err(CacheError::NotFound(_))));
    assert_eq!(store.len().unwrap(), 1);

    store.put("K1ABC", "fresh").unwrap();
    assert_eq!(store.len().unwrap(), 1);
    assert_eq!(store.get::<String>("K1ABC").unwrap(), "fresh");

    assert!(store.remove("K1ABC").unwrap());
    assert_eq!(store.len().unwrap(), 0);
}

#[test]
fn test_remove_twice_on_absent_key() {
    let dir = TempDir::new().unwrap();
    let store = ExpiringStore::open(dir.path().join("cache.json"), "1D").unwrap();

    assert!(!store.remove("NOBODY").unwrap());
    assert!(!store.remove("NOBODY").unwrap());
}

#[test]
fn test_bad_ttl_expressions() {
    let dir = TempDir::new().unwrap();
    for expr in ["abc", "-5D", "5Q"] {
        let result = ExpiringStore::open(dir.path().join("cache.json"), expr);
        assert!(matches!(result, Err(CacheError::Configuration(_))), "{}", expr);
    }
}

// == Lookup Tests ==

#[test]
fn test_negative_cache_scenario() {
    let dir = TempDir::new().unwrap();
    let clock = ManualClock::default();
    let mut lookup = open_lookup(
        dir.path(),
        &clock,
        Ttl::parse("3Y").unwrap(),
        Ttl::parse("3M").unwrap(),
    );

    let first = lookup.lookup("ZZ9ZZZ").unwrap();
    clock.advance((30 * DAY) as i64);
    let second = lookup.lookup("zz9zzz").unwrap();

    let expected = LookupOutcome::KnownAbsent {
        callsign: "ZZ9ZZZ".to_string(),
        reason: "Not found: ZZ9ZZZ".to_string(),
    };
    assert_eq!(first, expected);
    assert_eq!(second, expected);
    assert_eq!(lookup.stats().fetches, 1);
    assert_eq!(lookup.stats().negative_hits, 1);
}

#[test]
fn test_positive_entry_uses_positive_ttl_only() {
    let dir = TempDir::new().unwrap();
    let clock = ManualClock::default();
    let mut lookup = open_lookup(
        dir.path(),
        &clock,
        Ttl::from_secs(100 * DAY),
        Ttl::from_secs(DAY),
    );

    lookup.lookup("W6BSD").unwrap();
    // Well past the negative TTL, still inside the positive one.
    clock.advance((50 * DAY) as i64);
    let outcome = lookup.lookup("W6BSD").unwrap();

    assert_eq!(outcome.record().and_then(Record::grid), Some("CM87tl"));
    assert_eq!(lookup.stats().fetches, 1);
    assert!(!lookup.negative().contains("W6BSD").unwrap());

    clock.advance((50 * DAY) as i64);
    lookup.lookup("W6BSD").unwrap();
    assert_eq!(lookup.stats().fetches, 2);
}

#[test]
fn test_cached_results_survive_a_new_process() {
    let dir = TempDir::new().unwrap();
    let clock = ManualClock::default();

    {
        let mut first_run = open_lookup(dir.path(), &clock, Ttl::NEVER, Ttl::from_secs(DAY));
        first_run.lookup("W6BSD").unwrap();
        first_run.lookup("ZZ9ZZZ").unwrap();
        assert_eq!(first_run.stats().fetches, 2);
    }

    let mut second_run = open_lookup(dir.path(), &clock, Ttl::NEVER, Ttl::from_secs(DAY));
    let found = second_run.lookup("W6BSD").unwrap();
    let absent = second_run.lookup("ZZ9ZZZ").unwrap();

    assert_eq!(
        found.record().and_then(|r| r.get("dxcc")),
        Some(&FieldValue::Integer(291))
    );
    assert!(!absent.is_found());
    assert_eq!(second_run.stats().fetches, 0);
    assert_eq!(second_run.stats().hit_rate(), 1.0);
}

#[test]
fn test_expiration_time_reports_positive_policy() {
    let dir = TempDir::new().unwrap();
    let clock = ManualClock::default();
    let mut lookup = open_lookup(dir.path(), &clock, Ttl::from_secs(7 * DAY), Ttl::from_secs(DAY));

    let before = clock.now();
    lookup.lookup("W6BSD").unwrap();

    let expires = lookup.positive().expiration_time("W6BSD").unwrap();
    assert_eq!((expires - before).num_seconds(), (7 * DAY) as i64);
}

#[test]
fn test_lookup_requires_session_only_on_miss() {
    let dir = TempDir::new().unwrap();
    let clock = ManualClock::default();
    {
        let mut warm = open_lookup(dir.path(), &clock, Ttl::NEVER, Ttl::from_secs(DAY));
        warm.lookup("W6BSD").unwrap();
    }

    let positive = ExpiringStore::with_clock(
        dir.path().join("qrz-cache.json"),
        Ttl::NEVER,
        clock.clone(),
    )
    .unwrap();
    let negative = ExpiringStore::with_clock(
        dir.path().join("qrz-cache-errors.json"),
        Ttl::from_secs(DAY),
        clock.clone(),
    )
    .unwrap();
    let mut cold = Lookup::new(positive, negative, ScriptedDirectory::default()).unwrap();

    assert!(cold.lookup("W6BSD").unwrap().is_found());
    assert!(matches!(
        cold.lookup("K1ABC"),
        Err(LookupError::RemoteSession(_))
    ));
}
