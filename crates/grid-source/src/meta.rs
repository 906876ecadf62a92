//! Message identification metadata.
//!
//! Every message of an opened grid source carries the GRIB2-style
//! identification fields the element matcher tests descriptors against.
//! The engine never sees the bytes behind them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identification metadata for one grid message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageMeta {
    /// Producing center.
    pub center: u16,
    /// Producing sub-center.
    pub sub_center: u16,
    /// Generating process id.
    pub gen_process: u8,
    /// Product definition template number.
    pub template: u16,
    /// Product parameter category.
    pub category: u8,
    /// Product parameter number within the category.
    pub sub_category: u8,
    /// Fixed surface the product applies to.
    pub surface: SurfaceSpec,
    /// Probability metadata for probability products.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub probability: Option<ProbabilitySpec>,
    /// Length of the forecast period in hours (0 for instantaneous).
    pub forecast_duration_hours: u32,
    /// Model run time.
    pub reference_time: DateTime<Utc>,
    /// Time the value applies to.
    pub valid_time: DateTime<Utc>,
    /// Sector this grid belongs to.
    pub sector_id: String,
    /// Native unit string as encoded in the source.
    pub units: String,
    /// Whether cell values are text (weather type strings).
    #[serde(default)]
    pub textual: bool,
}

/// Fixed-surface description: type, value, and an optional second value for
/// layer products.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceSpec {
    pub surface_type: u8,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub second_value: Option<f64>,
}

impl SurfaceSpec {
    /// A single fixed surface.
    pub fn single(surface_type: u8, value: f64) -> Self {
        Self {
            surface_type,
            value,
            second_value: None,
        }
    }

    /// A layer between two surface values.
    pub fn layer(surface_type: u8, first: f64, second: f64) -> Self {
        Self {
            surface_type,
            value: first,
            second_value: Some(second),
        }
    }
}

/// Probability product metadata.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbabilitySpec {
    /// Probability type code.
    pub prob_type: u8,
    /// Lower threshold.
    pub lower: f64,
    /// Upper threshold.
    pub upper: f64,
}
