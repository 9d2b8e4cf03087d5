//! # Keys and Ranges
//!
//! Primary keys ([`RecordKey`]), secondary index values ([`IndexKey`]) and
//! the range type used by filtered scans ([`KeyRange`]).
//!
//! ## Ordering
//!
//! Integer keys sort before string keys. The byte encoding produced by
//! [`RecordKey::encode`] preserves that order so that an ordered backend
//! returns records in primary-key order from a plain prefix scan.

use crate::errors::SchemaError;
use crate::json_type_name;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;
use std::ops::Bound;

const TAG_INT: u8 = 0x01;
const TAG_TEXT: u8 = 0x02;

const INDEX_TAG_BOOL: u8 = 0x01;
const INDEX_TAG_NUMBER: u8 = 0x02;
const INDEX_TAG_TEXT: u8 = 0x03;
/// Ends an encoded index string. A literal NUL inside it is written
/// `0x00 0xFF`.
const TEXT_TERMINATOR: u8 = 0x00;
const TEXT_NUL_ESCAPE: u8 = 0xFF;

/// Primary key of a stored record.
///
/// Client-generated identifiers are millisecond timestamps (`Int`); singleton
/// documents such as settings entries use names (`Text`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum RecordKey {
    Int(i64),
    Text(String),
}

impl RecordKey {
    /// Extract the key stored at `key_path` from a record field value.
    pub fn from_value(value: &Value, key_path: &'static str) -> Result<Self, SchemaError> {
        match value {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    return Ok(RecordKey::Int(i));
                }
                // Form input arrives as floats; accept whole numbers only.
                match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                        Ok(RecordKey::Int(f as i64))
                    }
                    _ => Err(SchemaError::InvalidKey {
                        key_path,
                        found: "fractional number",
                    }),
                }
            }
            Value::String(s) => Ok(RecordKey::Text(s.clone())),
            other => Err(SchemaError::InvalidKey {
                key_path,
                found: json_type_name(other),
            }),
        }
    }

    /// JSON form of the key, as written into the record.
    pub fn to_value(&self) -> Value {
        match self {
            RecordKey::Int(i) => Value::from(*i),
            RecordKey::Text(s) => Value::from(s.as_str()),
        }
    }

    /// Order-preserving byte encoding.
    pub fn encode(&self) -> Vec<u8> {
        match self {
            RecordKey::Int(i) => {
                let mut out = Vec::with_capacity(9);
                out.push(TAG_INT);
                // Flip the sign bit so negative keys sort first.
                out.extend_from_slice(&((*i as u64) ^ (1 << 63)).to_be_bytes());
                out
            }
            RecordKey::Text(s) => {
                let mut out = Vec::with_capacity(1 + s.len());
                out.push(TAG_TEXT);
                out.extend_from_slice(s.as_bytes());
                out
            }
        }
    }

    /// Inverse of [`RecordKey::encode`].
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        let (tag, rest) = bytes.split_first()?;
        match *tag {
            TAG_INT => {
                let raw: [u8; 8] = rest.try_into().ok()?;
                Some(RecordKey::Int((u64::from_be_bytes(raw) ^ (1 << 63)) as i64))
            }
            TAG_TEXT => String::from_utf8(rest.to_vec()).ok().map(RecordKey::Text),
            _ => None,
        }
    }

    /// The key viewed as an index value, for range scans over primary keys.
    pub fn as_index_key(&self) -> IndexKey {
        match self {
            RecordKey::Int(i) => IndexKey::Number(*i as f64),
            RecordKey::Text(s) => IndexKey::Text(s.clone()),
        }
    }
}

impl<'de> Deserialize<'de> for RecordKey {
    /// Same rules as [`RecordKey::from_value`], so a whole-number float id
    /// decodes to the key it is stored under.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        RecordKey::from_value(&value, "id").map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKey::Int(i) => write!(f, "{}", i),
            RecordKey::Text(s) => write!(f, "'{}'", s),
        }
    }
}

impl From<i64> for RecordKey {
    fn from(value: i64) -> Self {
        RecordKey::Int(value)
    }
}

impl From<&str> for RecordKey {
    fn from(value: &str) -> Self {
        RecordKey::Text(value.to_string())
    }
}

impl From<String> for RecordKey {
    fn from(value: String) -> Self {
        RecordKey::Text(value)
    }
}

/// Value of a secondary index field.
///
/// Booleans sort before numbers, numbers before strings. Dates are ISO-8601
/// strings and therefore compare chronologically when written in one format.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndexKey {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl IndexKey {
    /// Index value of a field, or `None` when the field is not indexable
    /// (null, arrays, objects). Records without an indexable value are left
    /// out of index scans.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(IndexKey::Bool(*b)),
            Value::Number(n) => n.as_f64().map(IndexKey::Number),
            Value::String(s) => Some(IndexKey::Text(s.clone())),
            _ => None,
        }
    }

    /// Order-preserving, self-delimiting byte encoding.
    ///
    /// Byte order of two encodings matches [`Ord`] on the keys, and no
    /// encoding is a prefix of another, so bytes appended after it (the
    /// owning record's primary key) never change the relative order.
    pub fn encode(&self) -> Vec<u8> {
        match self {
            IndexKey::Bool(b) => vec![INDEX_TAG_BOOL, u8::from(*b)],
            IndexKey::Number(n) => {
                let bits = n.to_bits();
                // Same total order as `f64::total_cmp`.
                let ordered = if bits >> 63 == 1 { !bits } else { bits | (1 << 63) };
                let mut out = Vec::with_capacity(9);
                out.push(INDEX_TAG_NUMBER);
                out.extend_from_slice(&ordered.to_be_bytes());
                out
            }
            IndexKey::Text(s) => {
                let mut out = Vec::with_capacity(s.len() + 2);
                out.push(INDEX_TAG_TEXT);
                for byte in s.bytes() {
                    out.push(byte);
                    if byte == TEXT_TERMINATOR {
                        out.push(TEXT_NUL_ESCAPE);
                    }
                }
                out.push(TEXT_TERMINATOR);
                out
            }
        }
    }

    fn rank(&self) -> u8 {
        match self {
            IndexKey::Bool(_) => 0,
            IndexKey::Number(_) => 1,
            IndexKey::Text(_) => 2,
        }
    }
}

impl Ord for IndexKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (IndexKey::Bool(a), IndexKey::Bool(b)) => a.cmp(b),
            (IndexKey::Number(a), IndexKey::Number(b)) => a.total_cmp(b),
            (IndexKey::Text(a), IndexKey::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for IndexKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for IndexKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for IndexKey {}

impl From<bool> for IndexKey {
    fn from(value: bool) -> Self {
        IndexKey::Bool(value)
    }
}

impl From<f64> for IndexKey {
    fn from(value: f64) -> Self {
        IndexKey::Number(value)
    }
}

impl From<i64> for IndexKey {
    fn from(value: i64) -> Self {
        IndexKey::Number(value as f64)
    }
}

impl From<&str> for IndexKey {
    fn from(value: &str) -> Self {
        IndexKey::Text(value.to_string())
    }
}

impl From<String> for IndexKey {
    fn from(value: String) -> Self {
        IndexKey::Text(value)
    }
}

/// Range over index values, with inclusive or exclusive ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRange {
    lower: Bound<IndexKey>,
    upper: Bound<IndexKey>,
}

impl KeyRange {
    /// Exactly `key`.
    pub fn only(key: impl Into<IndexKey>) -> Self {
        let key = key.into();
        Self {
            lower: Bound::Included(key.clone()),
            upper: Bound::Included(key),
        }
    }

    /// `[lower, upper]`, both ends inclusive.
    pub fn bound(lower: impl Into<IndexKey>, upper: impl Into<IndexKey>) -> Self {
        Self {
            lower: Bound::Included(lower.into()),
            upper: Bound::Included(upper.into()),
        }
    }

    /// Everything at or above `lower` (above, when `open`).
    pub fn lower_bound(lower: impl Into<IndexKey>, open: bool) -> Self {
        let lower = lower.into();
        Self {
            lower: if open {
                Bound::Excluded(lower)
            } else {
                Bound::Included(lower)
            },
            upper: Bound::Unbounded,
        }
    }

    /// Everything at or below `upper` (below, when `open`).
    pub fn upper_bound(upper: impl Into<IndexKey>, open: bool) -> Self {
        let upper = upper.into();
        Self {
            lower: Bound::Unbounded,
            upper: if open {
                Bound::Excluded(upper)
            } else {
                Bound::Included(upper)
            },
        }
    }

    pub fn lower(&self) -> Bound<&IndexKey> {
        self.lower.as_ref()
    }

    pub fn upper(&self) -> Bound<&IndexKey> {
        self.upper.as_ref()
    }

    pub fn contains(&self, key: &IndexKey) -> bool {
        let above = match &self.lower {
            Bound::Included(lo) => key >= lo,
            Bound::Excluded(lo) => key > lo,
            Bound::Unbounded => true,
        };
        let below = match &self.upper {
            Bound::Included(hi) => key <= hi,
            Bound::Excluded(hi) => key < hi,
            Bound::Unbounded => true,
        };
        above && below
    }
}
