//! Tagged probe values.

use serde::{Deserialize, Serialize};

/// One extracted value at one probe point.
///
/// Exactly one payload is meaningful, selected by the variant. Missing data
/// is its own variant rather than a sentinel number, so a numeric payload is
/// always a real value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeValue {
    /// A numeric value in the record's unit.
    Numeric(f64),
    /// A textual value (weather type strings only).
    Text(String),
    /// No data at this point for this record.
    Missing,
}

impl ProbeValue {
    /// Whether this value is the missing marker.
    pub fn is_missing(&self) -> bool {
        matches!(self, ProbeValue::Missing)
    }

    /// Numeric payload, if any.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ProbeValue::Numeric(v) => Some(*v),
            _ => None,
        }
    }

    /// Text payload, if any.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ProbeValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProbeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbeValue::Numeric(v) => write!(f, "{:.2}", v),
            ProbeValue::Text(s) => write!(f, "{}", s),
            ProbeValue::Missing => write!(f, "--"),
        }
    }
}
