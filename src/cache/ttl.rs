//! Time-To-Live Module
//!
//! Parses expiration expressions such as `3Y`, `6M`, `12H` or `90`.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{CacheError, Result};

static TTL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^([0-9]+)([YMWDH]?)$").expect("TTL pattern is a valid regex")
});

// == Unit Multipliers (seconds) ==
const MINUTE: u64 = 60;
const HOUR: u64 = 3600;
const DAY: u64 = HOUR * 24;
const WEEK: u64 = DAY * 7;
/// 30.5 days
const MONTH: u64 = DAY * 61 / 2;
/// 52 weeks
const YEAR: u64 = WEEK * 52;

// == Ttl ==
/// Expiration policy of a store, in whole seconds. Zero never expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Ttl {
    seconds: u64,
}

impl Ttl {
    /// Entries never expire.
    pub const NEVER: Ttl = Ttl { seconds: 0 };

    pub const fn from_secs(seconds: u64) -> Self {
        Self { seconds }
    }

    pub const fn as_secs(&self) -> u64 {
        self.seconds
    }

    pub const fn never_expires(&self) -> bool {
        self.seconds == 0
    }

    // == Parse ==
    /// Parses `<magnitude><unit>?`, unit one of `H`, `D`, `W`, `M`, `Y`
    /// (case-insensitive). Without a unit the magnitude counts minutes.
    pub fn parse(expression: &str) -> Result<Self> {
        let caps = TTL_PATTERN.captures(expression).ok_or_else(|| {
            CacheError::Configuration(format!("\"{}\" does not match <number>[YMWDH]", expression))
        })?;

        let magnitude: u64 = caps[1].parse().map_err(|_| {
            CacheError::Configuration(format!("\"{}\" magnitude is out of range", expression))
        })?;

        let multiplier = match caps[2].to_ascii_uppercase().as_str() {
            "" => MINUTE,
            "H" => HOUR,
            "D" => DAY,
            "W" => WEEK,
            "M" => MONTH,
            "Y" => YEAR,
            unit => {
                return Err(CacheError::Configuration(format!(
                    "\"{}\" has unknown unit {}",
                    expression, unit
                )))
            }
        };

        magnitude
            .checked_mul(multiplier)
            .map(Self::from_secs)
            .ok_or_else(|| {
                CacheError::Configuration(format!("\"{}\" overflows", expression))
            })
    }
}

impl FromStr for Ttl {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Ttl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.never_expires() {
            write!(f, "never")
        } else {
            write!(f, "{}s", self.seconds)
        }
    }
}
