//! Probe point geometry.

use serde::{Deserialize, Serialize};

/// One caller-supplied probe location.
///
/// The point order given to a query is fixed for the life of that query:
/// every match record's value array is indexed by this order, and downstream
/// formatters treat it as the single source of truth for "which column is
/// which point".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbePoint {
    /// Optional caller label (station id, city name).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// The geometry being probed.
    #[serde(flatten)]
    pub geometry: PointGeometry,
}

/// What a probe point actually represents on the ground.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PointGeometry {
    /// A single geographic location.
    Location { lat: f64, lon: f64 },

    /// A small lat/lon extent standing in for a polygon or grid-cell
    /// coverage. Area-average extraction reads every cell whose center
    /// falls inside it.
    Coverage {
        min_lat: f64,
        min_lon: f64,
        max_lat: f64,
        max_lon: f64,
    },
}

impl ProbePoint {
    /// Create a single-location probe point.
    pub fn location(lat: f64, lon: f64) -> Self {
        Self {
            label: None,
            geometry: PointGeometry::Location { lat, lon },
        }
    }

    /// Create a coverage-extent probe point.
    pub fn coverage(min_lat: f64, min_lon: f64, max_lat: f64, max_lon: f64) -> Self {
        Self {
            label: None,
            geometry: PointGeometry::Coverage {
                min_lat,
                min_lon,
                max_lat,
                max_lon,
            },
        }
    }

    /// Attach a label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// The representative position used for sector resolution: the location
    /// itself, or the center of a coverage extent.
    pub fn position(&self) -> (f64, f64) {
        match &self.geometry {
            PointGeometry::Location { lat, lon } => (*lat, *lon),
            PointGeometry::Coverage {
                min_lat,
                min_lon,
                max_lat,
                max_lon,
            } => ((min_lat + max_lat) / 2.0, (min_lon + max_lon) / 2.0),
        }
    }

    /// Whether this point declares a coverage extent.
    pub fn is_coverage(&self) -> bool {
        matches!(self.geometry, PointGeometry::Coverage { .. })
    }

    /// Basic sanity check on the coordinates.
    pub fn validate(&self) -> Result<(), String> {
        let check = |lat: f64, lon: f64| {
            if !(-90.0..=90.0).contains(&lat) {
                return Err(format!("latitude {} out of range", lat));
            }
            if !(-360.0..=360.0).contains(&lon) {
                return Err(format!("longitude {} out of range", lon));
            }
            Ok(())
        };
        match &self.geometry {
            PointGeometry::Location { lat, lon } => check(*lat, *lon),
            PointGeometry::Coverage {
                min_lat,
                min_lon,
                max_lat,
                max_lon,
            } => {
                check(*min_lat, *min_lon)?;
                check(*max_lat, *max_lon)?;
                if min_lat > max_lat || min_lon > max_lon {
                    return Err("coverage extent is inverted".to_string());
                }
                Ok(())
            }
        }
    }
}
