//! The sector catalog.
//!
//! A catalog is the static table of every known sector: its projection, its
//! grid extent, and its per-cell metadata policy. Catalog order is the
//! resolver's scan order and therefore the membership priority order —
//! CONUS first, then the overlapping hemispheric/tropical grids, then the
//! regional OCONUS sectors.

use crate::cellmeta::{CellMeta, ElevationField, UniformCellMeta};
use probe_common::{ProbeError, ProbeResult};
use projection::{ConformalProjection, Ellipsoid};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Serialized catalog document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Catalog version tag; membership caches are only valid within one
    /// version.
    #[serde(default)]
    pub version: Option<String>,
    pub sectors: Vec<SectorConfig>,
}

/// Serialized definition of one sector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectorConfig {
    pub id: String,
    pub projection: ProjectionConfig,
    pub grid: GridConfig,
    #[serde(default)]
    pub meta: UniformCellMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevations: Option<ElevationField>,
}

/// Projection family selection for a sector.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ProjectionConfig {
    /// Lambert conformal conic through one or two standard parallels.
    Lambert { lat1: f64, lat2: f64, reflon: f64 },
    /// Polar stereographic.
    PolarStereographic { north: bool, reflon: f64 },
    /// Mercator.
    Mercator { reflon: f64 },
}

/// Grid extent and calibration for a sector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    /// Number of cells along x.
    pub nx: usize,
    /// Number of cells along y.
    pub ny: usize,
    /// Latitude of grid point (0, 0).
    pub lat1: f64,
    /// Longitude of grid point (0, 0).
    pub lon1: f64,
    /// Cell size in meters, true at `size_at_lat`.
    pub cell_size_m: f64,
    /// Latitude where `cell_size_m` holds.
    pub size_at_lat: f64,
    /// Grid rotation in degrees (rarely used).
    #[serde(default)]
    pub orient: f64,
}

/// One built sector: a calibrated projection plus extent and metadata.
#[derive(Debug, Clone)]
pub struct Sector {
    pub id: String,
    pub projection: ConformalProjection,
    pub nx: usize,
    pub ny: usize,
    pub meta: UniformCellMeta,
    pub elevations: Option<ElevationField>,
}

/// Slack applied to the extent test, in cells. Absorbs projection roundtrip
/// noise so a point exactly on the grid boundary stays inside; one cell of
/// resolution outside is still firmly excluded.
const EXTENT_EPS: f64 = 1e-6;

impl Sector {
    /// Inclusive extent test on fractional grid coordinates. A point exactly
    /// on the grid boundary belongs to the sector.
    pub fn contains(&self, grid_x: f64, grid_y: f64) -> bool {
        grid_x >= -EXTENT_EPS
            && grid_x <= (self.nx - 1) as f64 + EXTENT_EPS
            && grid_y >= -EXTENT_EPS
            && grid_y <= (self.ny - 1) as f64 + EXTENT_EPS
    }

    /// Clamp fractional grid coordinates onto the extent. Only meaningful
    /// for coordinates that already passed [`Sector::contains`].
    pub fn clamp(&self, grid_x: f64, grid_y: f64) -> (f64, f64) {
        (
            grid_x.clamp(0.0, (self.nx - 1) as f64),
            grid_y.clamp(0.0, (self.ny - 1) as f64),
        )
    }

    /// Metadata for the cell nearest to fractional grid coordinates.
    pub fn cell_meta(&self, grid_x: f64, grid_y: f64) -> CellMeta {
        CellMeta {
            utc_offset_hours: self.meta.utc_offset_hours,
            observes_dst: self.meta.observes_dst,
            cwa: self.meta.cwa.clone(),
            elevation_m: self
                .elevations
                .as_ref()
                .and_then(|field| field.at(grid_x, grid_y)),
        }
    }
}

/// The built, validated sector table.
#[derive(Debug, Clone)]
pub struct SectorCatalog {
    version: String,
    sectors: Vec<Sector>,
}

impl SectorCatalog {
    /// Build and validate a catalog from its serialized form.
    ///
    /// Any defect here is a configuration error and fatal: a process with a
    /// bad catalog must not serve queries.
    pub fn from_config(config: CatalogConfig) -> ProbeResult<Self> {
        if config.sectors.is_empty() {
            return Err(ProbeError::config("catalog has no sectors"));
        }

        let mut sectors = Vec::with_capacity(config.sectors.len());
        for sc in config.sectors {
            if sc.id.trim().is_empty() {
                return Err(ProbeError::config("sector with empty id"));
            }
            if sectors.iter().any(|s: &Sector| s.id == sc.id) {
                return Err(ProbeError::config(format!("duplicate sector id '{}'", sc.id)));
            }
            if sc.grid.nx < 2 || sc.grid.ny < 2 {
                return Err(ProbeError::config(format!(
                    "sector '{}' grid extent {}x{} too small",
                    sc.id, sc.grid.nx, sc.grid.ny
                )));
            }
            if let Some(field) = &sc.elevations {
                field
                    .validate()
                    .map_err(|e| ProbeError::config(format!("sector '{}': {}", sc.id, e)))?;
            }

            let base = match sc.projection {
                ProjectionConfig::Lambert { lat1, lat2, reflon } => {
                    ConformalProjection::secant_lambert(Ellipsoid::ncep_sphere(), lat1, lat2, reflon)
                        .map_err(|e| ProbeError::config(format!("sector '{}': {}", sc.id, e)))?
                }
                ProjectionConfig::PolarStereographic { north, reflon } => {
                    ConformalProjection::polar_stereographic(Ellipsoid::ncep_sphere(), north, reflon)
                }
                ProjectionConfig::Mercator { reflon } => {
                    ConformalProjection::mercator(Ellipsoid::ncep_sphere(), reflon)
                }
            };
            let projection = base
                .with_one_point(
                    0.0,
                    0.0,
                    sc.grid.lat1,
                    sc.grid.lon1,
                    sc.grid.cell_size_m,
                    sc.grid.size_at_lat,
                    sc.grid.orient,
                )
                .map_err(|e| ProbeError::config(format!("sector '{}': {}", sc.id, e)))?;

            sectors.push(Sector {
                id: sc.id,
                projection,
                nx: sc.grid.nx,
                ny: sc.grid.ny,
                meta: sc.meta,
                elevations: sc.elevations,
            });
        }

        Ok(Self {
            version: config.version.unwrap_or_else(|| "unversioned".to_string()),
            sectors,
        })
    }

    /// Parse a YAML catalog document.
    pub fn from_yaml_str(yaml: &str) -> ProbeResult<Self> {
        let config: CatalogConfig =
            serde_yaml::from_str(yaml).map_err(|e| ProbeError::config(e.to_string()))?;
        Self::from_config(config)
    }

    /// Load a YAML catalog file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> ProbeResult<Self> {
        let text = std::fs::read_to_string(&path)
            .map_err(|e| ProbeError::config(format!("cannot read catalog: {}", e)))?;
        Self::from_yaml_str(&text)
    }

    /// The built-in NDFD sector table.
    ///
    /// Priority order: conus, nhemi (tropical overlap grid), then the
    /// regional OCONUS sectors.
    pub fn ndfd_default() -> Self {
        let config = CatalogConfig {
            version: Some("ndfd-builtin-1".to_string()),
            sectors: vec![
                SectorConfig {
                    id: "conus".to_string(),
                    projection: ProjectionConfig::Lambert {
                        lat1: 25.0,
                        lat2: 25.0,
                        reflon: -95.0,
                    },
                    grid: GridConfig {
                        nx: 1073,
                        ny: 689,
                        lat1: 20.191999,
                        lon1: -121.554001,
                        cell_size_m: 5079.406,
                        size_at_lat: 25.0,
                        orient: 0.0,
                    },
                    meta: UniformCellMeta {
                        utc_offset_hours: -6,
                        observes_dst: true,
                        cwa: None,
                    },
                    elevations: None,
                },
                SectorConfig {
                    id: "nhemi".to_string(),
                    projection: ProjectionConfig::Mercator { reflon: -105.0 },
                    grid: GridConfig {
                        nx: 1473,
                        ny: 623,
                        lat1: -0.481,
                        lon1: -175.0,
                        cell_size_m: 10_000.0,
                        size_at_lat: 20.0,
                        orient: 0.0,
                    },
                    meta: UniformCellMeta {
                        utc_offset_hours: 0,
                        observes_dst: false,
                        cwa: None,
                    },
                    elevations: None,
                },
                SectorConfig {
                    id: "puertori".to_string(),
                    projection: ProjectionConfig::Mercator { reflon: -66.5 },
                    grid: GridConfig {
                        nx: 217,
                        ny: 169,
                        lat1: 16.828,
                        lon1: -68.196,
                        cell_size_m: 1250.0,
                        size_at_lat: 20.0,
                        orient: 0.0,
                    },
                    meta: UniformCellMeta {
                        utc_offset_hours: -4,
                        observes_dst: false,
                        cwa: Some("SJU".to_string()),
                    },
                    elevations: None,
                },
                SectorConfig {
                    id: "hawaii".to_string(),
                    projection: ProjectionConfig::Mercator { reflon: -157.5 },
                    grid: GridConfig {
                        nx: 321,
                        ny: 225,
                        lat1: 18.073,
                        lon1: -161.626,
                        cell_size_m: 2500.0,
                        size_at_lat: 20.0,
                        orient: 0.0,
                    },
                    meta: UniformCellMeta {
                        utc_offset_hours: -10,
                        observes_dst: false,
                        cwa: Some("HFO".to_string()),
                    },
                    elevations: None,
                },
                SectorConfig {
                    id: "guam".to_string(),
                    projection: ProjectionConfig::Mercator { reflon: 144.5 },
                    grid: GridConfig {
                        nx: 193,
                        ny: 193,
                        lat1: 12.35,
                        lon1: 143.687,
                        cell_size_m: 2500.0,
                        size_at_lat: 20.0,
                        orient: 0.0,
                    },
                    meta: UniformCellMeta {
                        utc_offset_hours: 10,
                        observes_dst: false,
                        cwa: Some("GUM".to_string()),
                    },
                    elevations: None,
                },
                SectorConfig {
                    id: "alaska".to_string(),
                    projection: ProjectionConfig::PolarStereographic {
                        north: true,
                        reflon: -150.0,
                    },
                    grid: GridConfig {
                        nx: 825,
                        ny: 553,
                        lat1: 40.530101,
                        lon1: 178.571,
                        cell_size_m: 5953.125,
                        size_at_lat: 60.0,
                        orient: 0.0,
                    },
                    meta: UniformCellMeta {
                        utc_offset_hours: -9,
                        observes_dst: true,
                        cwa: None,
                    },
                    elevations: None,
                },
            ],
        };
        // The built-in table is known good; a failure here is a programming
        // error, not a runtime condition.
        Self::from_config(config).expect("built-in catalog must validate")
    }

    /// Catalog version tag.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Sectors in priority order.
    pub fn sectors(&self) -> &[Sector] {
        &self.sectors
    }

    /// Look up a sector by id.
    pub fn get(&self, id: &str) -> Option<&Sector> {
        self.sectors.iter().find(|s| s.id == id)
    }
}
