//! Tabular records and the typed cells the aligner produces from them.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::Error;

/// Column written with the assigned cluster id
pub const CLUSTER_COLUMN: &str = "cluster";

/// Column written with the resolved cluster label
pub const LABEL_COLUMN: &str = "arti_cluster";

/// A schema-less row of named scalar cells
pub type Record = serde_json::Map<String, Value>;

/// Cluster id produced by a model, meaningful only within its scheme
pub type ClusterId = u32;

/// Classification scheme identifier (the SDG number)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct SchemeId(u32);

impl SchemeId {
    /// Create a scheme id, rejecting zero
    pub fn new(id: u32) -> Option<Self> {
        (id > 0).then_some(Self(id))
    }

    /// Parse a scheme id from a loosely typed JSON value.
    ///
    /// Accepts positive integers and strings holding one (`"4"`).
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_u64().and_then(|u| u32::try_from(u).ok()).and_then(Self::new),
            Value::String(s) => s.trim().parse::<u32>().ok().and_then(Self::new),
            _ => None,
        }
    }

    #[inline]
    pub fn get(self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for SchemeId {
    type Error = String;

    fn try_from(id: u32) -> std::result::Result<Self, Self::Error> {
        Self::new(id).ok_or_else(|| "scheme id must be a positive integer".to_string())
    }
}

impl From<SchemeId> for u32 {
    fn from(id: SchemeId) -> Self {
        id.0
    }
}

impl fmt::Display for SchemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single model-ready matrix cell
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    Text(String),
}

impl Cell {
    /// Numeric view of the cell. Text cells are parsed the way an
    /// array cast to float would parse them.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            Cell::Text(s) => parse_number(s),
        }
    }

    /// Textual view of the cell
    pub fn to_text(&self) -> String {
        match self {
            Cell::Number(n) => float_text(*n),
            Cell::Text(s) => s.clone(),
        }
    }

    /// Whether the cell equals a category. Numbers match any spelling of
    /// the same value, so `1` matches both `"1"` and `"1.0"`.
    pub fn matches(&self, category: &str) -> bool {
        match self {
            Cell::Text(s) => s == category,
            Cell::Number(n) if n.is_nan() => category.eq_ignore_ascii_case("nan"),
            Cell::Number(n) => parse_number(category) == Some(*n),
        }
    }
}

/// Parse a numeric string, accepting the spellings `nan` and `inf`
pub(crate) fn parse_number(s: &str) -> Option<f64> {
    let s = s.trim();
    match s.to_ascii_lowercase().as_str() {
        "nan" => Some(f64::NAN),
        "inf" | "+inf" | "infinity" => Some(f64::INFINITY),
        "-inf" | "-infinity" => Some(f64::NEG_INFINITY),
        _ => s.parse::<f64>().ok(),
    }
}

/// Text form of a float as the training pipeline wrote it: integral
/// values keep a trailing `.0`.
pub(crate) fn float_text(f: f64) -> String {
    if f.is_nan() {
        "nan".to_string()
    } else if f.is_infinite() {
        if f > 0.0 { "inf".to_string() } else { "-inf".to_string() }
    } else if f.fract() == 0.0 && f.abs() < 1e16 {
        format!("{:.1}", f)
    } else {
        format!("{}", f)
    }
}

/// Coerce any JSON scalar to the text used for categorical comparison
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                float_text(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Null => "nan".to_string(),
        other => other.to_string(),
    }
}

/// Input record plus its cluster assignment and resolved label.
///
/// Serializes flat: the original columns followed by [`CLUSTER_COLUMN`]
/// and [`LABEL_COLUMN`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "Record", try_from = "Record")]
pub struct EnrichedRecord {
    pub record: Record,
    pub cluster: ClusterId,
    pub label: Option<String>,
}

impl EnrichedRecord {
    pub fn new(mut record: Record, cluster: ClusterId, label: Option<String>) -> Self {
        // Stale assignments from a previous run must not shadow the new one
        record.remove(CLUSTER_COLUMN);
        record.remove(LABEL_COLUMN);
        Self { record, cluster, label }
    }

    /// Look up an original column
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.record.get(column)
    }
}

impl From<EnrichedRecord> for Record {
    fn from(enriched: EnrichedRecord) -> Self {
        let mut record = enriched.record;
        record.insert(CLUSTER_COLUMN.to_string(), Value::from(enriched.cluster));
        record.insert(
            LABEL_COLUMN.to_string(),
            enriched.label.map(Value::String).unwrap_or(Value::Null),
        );
        record
    }
}

impl TryFrom<Record> for EnrichedRecord {
    type Error = Error;

    fn try_from(mut record: Record) -> std::result::Result<Self, Self::Error> {
        let cluster = record
            .remove(CLUSTER_COLUMN)
            .and_then(|v| v.as_u64())
            .and_then(|u| ClusterId::try_from(u).ok())
            .ok_or_else(|| Error::Serialization(format!("missing or invalid '{}'", CLUSTER_COLUMN)))?;
        let label = match record.remove(LABEL_COLUMN) {
            Some(Value::String(s)) => Some(s),
            _ => None,
        };
        Ok(Self { record, cluster, label })
    }
}
