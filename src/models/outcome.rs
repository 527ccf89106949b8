//! Outcome of resolving one call sign

use std::fmt;

use crate::models::Record;

/// Result of a lookup that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    /// Record from the cache or freshly fetched
    Found(Record),
    /// The directory does not know this call sign (possibly remembered)
    KnownAbsent { callsign: String, reason: String },
}

impl LookupOutcome {
    pub fn record(&self) -> Option<&Record> {
        match self {
            LookupOutcome::Found(record) => Some(record),
            LookupOutcome::KnownAbsent { .. } => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, LookupOutcome::Found(_))
    }
}

/// One-line summary: `CALL fullname zip latlon grid email`, `-` for blanks.
impl fmt::Display for LookupOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupOutcome::Found(record) => {
                let latlon = record
                    .latlon()
                    .map(|(lat, lon)| format!("({}, {})", lat, lon));
                write!(
                    f,
                    "{} {} {} {} {} {}",
                    record.call().unwrap_or("-"),
                    record.fullname().unwrap_or("-"),
                    record.zip().unwrap_or("-"),
                    latlon.as_deref().unwrap_or("-"),
                    record.grid().unwrap_or("-"),
                    record.email().unwrap_or("-"),
                )
            }
            LookupOutcome::KnownAbsent { callsign, reason } => {
                write!(f, "{} not found: {}", callsign, reason)
            }
        }
    }
}
