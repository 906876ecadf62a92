//! Valid-time filtering for probe queries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An optional [start, end] valid-time filter.
///
/// Both bounds are inclusive. An unset bound does not constrain that side;
/// a fully unset window passes every time. The window is a performance
/// filter: messages outside it are skipped, never errored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
}

impl TimeWindow {
    /// A window that passes every valid time.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// A window between two instants, both inclusive.
    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Whether no temporal filtering applies.
    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Inclusive containment test.
    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        if let Some(start) = self.start {
            if t < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if t > end {
                return false;
            }
        }
        true
    }
}
