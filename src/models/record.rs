//! Call-sign record returned by the directory.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const INTEGER_FIELDS: &[&str] = &[
    "dxcc", "cqzone", "ituzone", "u_views", "serial", "born", "eqsl", "mqsl", "lotw",
];
const FLOAT_FIELDS: &[&str] = &["lat", "lon", "GMTOffset"];
const DATE_FIELDS: &[&str] = &["efdate", "expdate"];
const DATETIME_FIELDS: &[&str] = &["moddate"];

// == Field Value ==
/// A single typed scalar of a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl FieldValue {
    /// Types the raw text of `field`, falling back to text when it does not
    /// parse as the expected kind.
    pub fn from_raw(field: &str, raw: &str) -> Self {
        let text = raw.trim();
        let typed = if INTEGER_FIELDS.contains(&field) {
            text.parse().ok().map(FieldValue::Integer)
        } else if FLOAT_FIELDS.contains(&field) {
            text.parse().ok().map(FieldValue::Float)
        } else if DATE_FIELDS.contains(&field) {
            NaiveDate::parse_from_str(text, DATE_FORMAT)
                .ok()
                .map(FieldValue::Date)
        } else if DATETIME_FIELDS.contains(&field) {
            NaiveDateTime::parse_from_str(text, DATETIME_FORMAT)
                .ok()
                .map(FieldValue::DateTime)
        } else {
            None
        };
        typed.unwrap_or_else(|| FieldValue::Text(raw.to_string()))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(f) => Some(*f),
            FieldValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    fn to_json(&self) -> serde_json::Value {
        match self {
            FieldValue::Text(s) => serde_json::Value::from(s.as_str()),
            FieldValue::Integer(i) => serde_json::Value::from(*i),
            FieldValue::Float(f) => serde_json::Value::from(*f),
            FieldValue::Date(_) | FieldValue::DateTime(_) => {
                serde_json::Value::from(self.to_string())
            }
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::Integer(i) => write!(f, "{}", i),
            FieldValue::Float(v) => write!(f, "{}", v),
            FieldValue::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            FieldValue::DateTime(dt) => write!(f, "{}", dt.format(DATETIME_FORMAT)),
        }
    }
}

// == Record ==
/// Flat mapping of field name to value, as returned for one call sign.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, value: FieldValue) {
        self.fields.insert(field.into(), value);
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Text of `field`, if present, textual and not blank.
    pub fn text(&self, field: &str) -> Option<&str> {
        self.get(field)
            .and_then(FieldValue::as_str)
            .filter(|s| !s.trim().is_empty())
    }

    pub fn call(&self) -> Option<&str> {
        self.text("call")
    }

    pub fn first_name(&self) -> Option<&str> {
        self.text("fname")
    }

    pub fn name(&self) -> Option<&str> {
        self.text("name")
    }

    pub fn fullname(&self) -> Option<&str> {
        self.text("name_fmt")
    }

    pub fn zip(&self) -> Option<&str> {
        self.text("zip")
    }

    pub fn state(&self) -> Option<&str> {
        self.text("state")
    }

    pub fn country(&self) -> Option<&str> {
        self.text("country")
    }

    pub fn grid(&self) -> Option<&str> {
        self.text("grid")
    }

    pub fn email(&self) -> Option<&str> {
        self.text("email")
    }

    /// Latitude and longitude, when both are known.
    pub fn latlon(&self) -> Option<(f64, f64)> {
        let lat = self.get("lat").and_then(FieldValue::as_f64)?;
        let lon = self.get("lon").and_then(FieldValue::as_f64)?;
        Some((lat, lon))
    }

    /// Renders the record as a JSON object with natural JSON types.
    pub fn to_json(&self) -> String {
        let object: serde_json::Map<String, serde_json::Value> = self
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect();
        serde_json::Value::Object(object).to_string()
    }
}

impl FromIterator<(String, FieldValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}
