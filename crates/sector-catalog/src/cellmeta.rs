//! Per-cell static metadata.
//!
//! Each sector carries metadata that formatters need per probe point: the
//! local clock rules, the serving forecast office, and terrain elevation.
//! Offsets and flags are uniform across a sector; elevation optionally comes
//! from a per-cell field.

use serde::{Deserialize, Serialize};

/// Metadata resolved for one grid cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CellMeta {
    /// Hours east of UTC for the local standard time.
    pub utc_offset_hours: i8,
    /// Whether the location observes daylight saving time.
    pub observes_dst: bool,
    /// County Warning Area code, when known.
    pub cwa: Option<String>,
    /// Terrain elevation in meters; `None` means undetermined.
    pub elevation_m: Option<f64>,
}

/// Sector-wide metadata defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniformCellMeta {
    #[serde(default)]
    pub utc_offset_hours: i8,
    #[serde(default)]
    pub observes_dst: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwa: Option<String>,
}

impl Default for UniformCellMeta {
    fn default() -> Self {
        Self {
            utc_offset_hours: 0,
            observes_dst: false,
            cwa: None,
        }
    }
}

/// An optional per-cell elevation field, row-major with `null` for cells
/// whose elevation is undetermined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElevationField {
    pub width: usize,
    pub height: usize,
    pub values: Vec<Option<f64>>,
}

impl ElevationField {
    /// Elevation at the cell nearest to fractional grid coordinates.
    pub fn at(&self, grid_x: f64, grid_y: f64) -> Option<f64> {
        let x = grid_x.round();
        let y = grid_y.round();
        if x < 0.0 || y < 0.0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return None;
        }
        self.values.get(y * self.width + x).copied().flatten()
    }

    /// Shape/payload consistency check.
    pub fn validate(&self) -> Result<(), String> {
        if self.values.len() != self.width * self.height {
            return Err(format!(
                "elevation field payload length {} does not match {}x{}",
                self.values.len(),
                self.width,
                self.height
            ));
        }
        Ok(())
    }
}
