//! QRZ XML Response Parser
//!
//! Reads the `<Callsign>` and `<Session>` sections of a `<QRZDatabase>` answer.

use std::collections::BTreeMap;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{LookupError, LookupResult};
use crate::lookup::Session;
use crate::models::{FieldValue, Record};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Section {
    Callsign,
    Session,
}

// == Response ==
/// The parts of an XML answer the client cares about.
#[derive(Debug, Default)]
pub struct Response {
    /// Present when the directory returned a record
    pub callsign: Option<Record>,
    /// Children of `<Session>`: Key, Count, SubExp, GMTime, Message, Error
    pub session: BTreeMap<String, String>,
}

impl Response {
    pub fn session_value(&self, name: &str) -> Option<&str> {
        self.session
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    fn store(&mut self, section: Section, field: String, text: String) {
        match section {
            Section::Callsign => {
                let value = FieldValue::from_raw(&field, &text);
                self.callsign.get_or_insert_with(Record::new).insert(field, value);
            }
            Section::Session => {
                self.session.insert(field, text);
            }
        }
    }
}

// == Parse Response ==
/// Parses an XML answer into its callsign and session sections.
pub fn parse_response(xml: &str) -> LookupResult<Response> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut response = Response::default();
    let mut section: Option<Section> = None;
    let mut field: Option<String> = None;
    let mut text = String::new();

    loop {
        let event = reader.read_event().map_err(|e| {
            LookupError::Protocol(format!(
                "malformed XML at byte {}: {}",
                reader.buffer_position(),
                e
            ))
        })?;

        match event {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                if section.is_some() {
                    field = Some(name);
                    text.clear();
                } else if name == "Callsign" {
                    section = Some(Section::Callsign);
                    response.callsign.get_or_insert_with(Record::new);
                } else if name == "Session" {
                    section = Some(Section::Session);
                }
            }
            Event::Empty(e) => {
                if let (Some(current), None) = (section, field.as_ref()) {
                    let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                    response.store(current, name, String::new());
                }
            }
            Event::Text(e) => {
                if field.is_some() {
                    let unescaped = e
                        .unescape()
                        .map_err(|e| LookupError::Protocol(format!("bad XML text: {}", e)))?;
                    text.push_str(&unescaped);
                }
            }
            Event::CData(e) => {
                if field.is_some() {
                    text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Event::End(e) => {
                let name = e.local_name();
                let name = name.as_ref();
                if field.as_deref().map(str::as_bytes) == Some(name) {
                    if let (Some(current), Some(done)) = (section, field.take()) {
                        response.store(current, done, std::mem::take(&mut text));
                    }
                } else if (section == Some(Section::Callsign) && name == b"Callsign")
                    || (section == Some(Section::Session) && name == b"Session")
                {
                    section = None;
                    field = None;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(response)
}

// == Parse Login ==
/// Extracts the session key of a login answer.
pub fn parse_login(xml: &str) -> LookupResult<Session> {
    let response = parse_response(xml)?;
    match response.session_value("Key") {
        Some(key) => Ok(Session::new(key)),
        None => Err(LookupError::RemoteSession(
            response
                .session_value("Error")
                .unwrap_or("no session key returned")
                .to_string(),
        )),
    }
}

// == Parse Lookup ==
/// Extracts the record of a lookup answer.
///
/// Only an error starting with "Not found" is reported as
/// `RemoteNotFound`; other errors (expired or invalid session, exhausted
/// subscription) are session errors.
pub fn parse_lookup(xml: &str, callsign: &str) -> LookupResult<Record> {
    let response = parse_response(xml)?;
    if let Some(record) = response.callsign {
        return Ok(record);
    }

    match response.session_value("Error") {
        Some(error) if error.to_ascii_lowercase().starts_with("not found") => {
            Err(LookupError::RemoteNotFound {
                callsign: callsign.to_string(),
                reason: error.to_string(),
            })
        }
        Some(error) => Err(LookupError::RemoteSession(error.to_string())),
        None => Err(LookupError::Protocol(
            "answer carries neither a record nor an error".to_string(),
        )),
    }
}
