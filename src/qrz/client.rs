//! QRZ XML API Client
//!
//! Blocking HTTP transport for the login and lookup calls.

use std::time::Duration;

use reqwest::blocking::Client;
use tracing::debug;

use crate::error::LookupResult;
use crate::lookup::{Fetcher, Session};
use crate::models::Record;
use crate::qrz::parser::{parse_login, parse_lookup};

/// Agent name sent with every request
pub const AGENT: &str = concat!("qrz_lookup/", env!("CARGO_PKG_VERSION"));

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// == QRZ Client ==
/// Talks to the QRZ XML endpoint with form-encoded POST requests.
#[derive(Debug, Clone)]
pub struct QrzClient {
    http: Client,
    url: String,
}

impl QrzClient {
    pub fn new(url: impl Into<String>) -> LookupResult<Self> {
        let http = Client::builder()
            .user_agent(AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn post(&self, form: &[(&str, &str)]) -> LookupResult<String> {
        let body = self
            .http
            .post(&self.url)
            .form(form)
            .send()?
            .error_for_status()?
            .text()?;
        debug!(bytes = body.len(), "XML answer received");
        Ok(body)
    }
}

impl Fetcher for QrzClient {
    fn authenticate(&self, username: &str, password: &str) -> LookupResult<Session> {
        let body = self.post(&[
            ("username", username),
            ("password", password),
            ("agent", AGENT),
        ])?;
        parse_login(&body)
    }

    fn fetch(&self, session: &Session, callsign: &str) -> LookupResult<Record> {
        let body = self.post(&[
            ("s", session.key()),
            ("callsign", callsign),
            ("agent", AGENT),
        ])?;
        parse_lookup(&body, callsign)
    }
}
