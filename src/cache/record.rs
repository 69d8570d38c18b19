//! Record Codec Module
//!
//! Encodes a value plus its write timestamp into the persisted record string
//! `<timestamp>:<tag>:<payload>` and decodes it back.

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;

use crate::convert::{smart_cast_float, smart_cast_int};
use crate::error::CodecError;

// == Value Kind ==
/// Shape tag carried in the second field of every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValueKind {
    /// JSON object or list payload
    Object,
    /// Integer scalar
    Int,
    /// Floating point scalar
    Float,
    /// Scalar stored as text, no quoting
    RawString,
}

impl ValueKind {
    /// The tag written to the record.
    pub fn tag(self) -> &'static str {
        match self {
            ValueKind::Object => "object",
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::RawString => "raw-string",
        }
    }

    /// Reads a tag back. `obj` is accepted for records written by older
    /// builds; any unknown tag reads as a raw string.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "object" | "obj" => ValueKind::Object,
            "int" => ValueKind::Int,
            "float" => ValueKind::Float,
            _ => ValueKind::RawString,
        }
    }
}

// == Stored Value ==
/// A cached payload, tagged at encode time.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredValue {
    Object(Value),
    Int(i64),
    Float(f64),
    Raw(String),
}

impl StoredValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            StoredValue::Object(_) => ValueKind::Object,
            StoredValue::Int(_) => ValueKind::Int,
            StoredValue::Float(_) => ValueKind::Float,
            StoredValue::Raw(_) => ValueKind::RawString,
        }
    }

    /// Tags a JSON value: objects and lists become `Object`, numbers keep
    /// their numeric kind, everything else is stored as text.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Object(_) | Value::Array(_) => StoredValue::Object(value),
            Value::Number(num) => match num.as_i64() {
                Some(int) => StoredValue::Int(int),
                None => StoredValue::Float(num.as_f64().unwrap_or(0.0)),
            },
            Value::String(text) => StoredValue::Raw(text),
            other => StoredValue::Raw(other.to_string()),
        }
    }

    fn payload(&self) -> String {
        match self {
            StoredValue::Object(value) => value.to_string(),
            StoredValue::Int(int) => int.to_string(),
            StoredValue::Float(float) => float.to_string(),
            StoredValue::Raw(text) => text.clone(),
        }
    }
}

impl From<Value> for StoredValue {
    fn from(value: Value) -> Self {
        StoredValue::from_json(value)
    }
}

impl From<String> for StoredValue {
    fn from(text: String) -> Self {
        StoredValue::Raw(text)
    }
}

impl From<&str> for StoredValue {
    fn from(text: &str) -> Self {
        StoredValue::Raw(text.to_string())
    }
}

impl From<i64> for StoredValue {
    fn from(int: i64) -> Self {
        StoredValue::Int(int)
    }
}

impl From<f64> for StoredValue {
    fn from(float: f64) -> Self {
        StoredValue::Float(float)
    }
}

// == Record ==
/// A decoded record.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Write time, Unix seconds
    pub timestamp: i64,
    /// The payload
    pub value: StoredValue,
}

impl Record {
    pub fn new(value: StoredValue, timestamp: i64) -> Self {
        Self { timestamp, value }
    }

    pub fn kind(&self) -> ValueKind {
        self.value.kind()
    }

    /// Fresh while `now <= timestamp + max_age`.
    pub fn is_fresh(&self, max_age_secs: i64, now: i64) -> bool {
        now <= self.timestamp.saturating_add(max_age_secs)
    }

    pub fn encode(&self) -> String {
        encode(&self.value, self.timestamp)
    }
}

// == Encode ==
/// Produces `<timestamp>:<tag>:<payload>`.
pub fn encode(value: &StoredValue, timestamp: i64) -> String {
    format!("{}:{}:{}", timestamp, value.kind().tag(), value.payload())
}

// == Decode ==
/// Parses a record string.
///
/// Only the first two colons delimit fields; the payload keeps any further
/// colons. Returns `Ok(None)` for a record with fewer than three segments and
/// an error only when an `object` payload is not valid JSON.
pub fn decode(record: &str) -> Result<Option<Record>, CodecError> {
    let mut parts = record.splitn(3, ':');
    let (Some(ts), Some(tag), Some(payload)) = (parts.next(), parts.next(), parts.next()) else {
        return Ok(None);
    };

    let timestamp = smart_cast_int(ts);
    let value = match ValueKind::from_tag(tag) {
        ValueKind::Object => StoredValue::Object(
            serde_json::from_str(payload).map_err(|source| CodecError::InvalidJson { source })?,
        ),
        ValueKind::Int => StoredValue::Int(smart_cast_int(payload)),
        ValueKind::Float => StoredValue::Float(decode_float(payload)),
        ValueKind::RawString => StoredValue::Raw(payload.to_string()),
    };

    Ok(Some(Record { timestamp, value }))
}

/// `inf`, `-inf` and `NaN` are what `f64` formats non-finite values as, so
/// they are read back as such rather than coerced to zero.
fn decode_float(payload: &str) -> f64 {
    match payload.trim() {
        "inf" => f64::INFINITY,
        "-inf" => f64::NEG_INFINITY,
        "NaN" => f64::NAN,
        other => smart_cast_float(other),
    }
}

/// Reads only the leading timestamp field, without decoding the payload.
///
/// Returns `None` when the field is missing or not a positive number.
pub fn leading_timestamp(record: &str) -> Option<i64> {
    let (ts, _) = record.split_once(':')?;
    let timestamp = smart_cast_int(ts);
    (timestamp > 0).then_some(timestamp)
}

// == Cache View ==
/// Result of a cache lookup.
///
/// An absent key and a stale key look the same in `valid`/`expired`.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheView {
    pub expired: bool,
    pub valid: bool,
    /// Write time of the record, 0 when absent
    pub timestamp: i64,
    pub kind: Option<ValueKind>,
    /// Decoded payload; present for stale records too
    pub value: Option<StoredValue>,
}

impl CacheView {
    /// The view returned for missing, malformed or unreadable entries.
    pub fn absent() -> Self {
        Self {
            expired: true,
            valid: false,
            timestamp: 0,
            kind: None,
            value: None,
        }
    }

    /// Builds the view of a decoded record against a max age.
    pub fn from_record(record: Record, max_age_secs: i64, now: i64) -> Self {
        let valid = record.is_fresh(max_age_secs, now);
        Self {
            expired: !valid,
            valid,
            timestamp: record.timestamp,
            kind: Some(record.kind()),
            value: Some(record.value),
        }
    }

    /// The value, only if the view is valid.
    pub fn fresh_value(&self) -> Option<&StoredValue> {
        self.value.as_ref().filter(|_| self.valid)
    }

    /// The JSON payload of a valid `Object` record.
    pub fn into_fresh_json(self) -> Option<Value> {
        if !self.valid {
            return None;
        }
        match self.value {
            Some(StoredValue::Object(value)) => Some(value),
            _ => None,
        }
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in seconds.
pub fn current_timestamp() -> i64 {
    Utc::now().timestamp()
}
