//! Configuration Module
//!
//! Handles loading the client configuration from environment variables.

use std::env;
use std::path::PathBuf;

/// QRZ XML API endpoint
pub const DEFAULT_URL: &str = "https://xmldata.qrz.com/xml/current/";
/// Positive cache expiration
pub const DEFAULT_CACHE_TTL: &str = "3Y";
/// Negative cache expiration
pub const DEFAULT_NEGATIVE_TTL: &str = "3M";

const POSITIVE_CACHE_FILE: &str = "qrz-cache.json";
const NEGATIVE_CACHE_FILE: &str = "qrz-cache-errors.json";

/// Client configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
/// TTL expressions are kept as text and validated when the stores are opened.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Login name, prompted for when absent
    pub username: Option<String>,
    /// Password or XML data key, prompted for when absent
    pub password: Option<String>,
    /// XML API endpoint
    pub url: String,
    /// Directory holding both cache files
    pub cache_dir: PathBuf,
    /// TTL expression of the positive cache
    pub cache_ttl: String,
    /// TTL expression of the negative cache
    pub negative_ttl: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `QRZ_CALL` - Login name (default: none)
    /// - `QRZ_KEY` - Password (default: none)
    /// - `QRZ_URL` - API endpoint (default: QRZ.com XML current)
    /// - `QRZ_CACHE_DIR` - Cache directory (default: `$HOME/.local`)
    /// - `QRZ_CACHE_TTL` - Positive cache TTL (default: 3Y)
    /// - `QRZ_NEGATIVE_TTL` - Negative cache TTL (default: 3M)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            username: non_empty_var("QRZ_CALL"),
            password: non_empty_var("QRZ_KEY"),
            url: non_empty_var("QRZ_URL").unwrap_or(defaults.url),
            cache_dir: non_empty_var("QRZ_CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.cache_dir),
            cache_ttl: non_empty_var("QRZ_CACHE_TTL").unwrap_or(defaults.cache_ttl),
            negative_ttl: non_empty_var("QRZ_NEGATIVE_TTL").unwrap_or(defaults.negative_ttl),
        }
    }

    pub fn positive_cache_path(&self) -> PathBuf {
        self.cache_dir.join(POSITIVE_CACHE_FILE)
    }

    pub fn negative_cache_path(&self) -> PathBuf {
        self.cache_dir.join(NEGATIVE_CACHE_FILE)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            username: None,
            password: None,
            url: DEFAULT_URL.to_string(),
            cache_dir: default_cache_dir(),
            cache_ttl: DEFAULT_CACHE_TTL.to_string(),
            negative_ttl: DEFAULT_NEGATIVE_TTL.to_string(),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn default_cache_dir() -> PathBuf {
    env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".local")
}
