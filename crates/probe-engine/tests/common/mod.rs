//! Shared fixtures for probe engine scenario tests.
//!
//! Builds a small two-sector catalog (overlapping Mercator grids "alpha"
//! and "beta") and synthetic in-memory grid sources against it. Alpha spans
//! roughly 0..0.9 degrees of longitude, beta is shifted east by 0.45
//! degrees, so points can sit in alpha only, in the overlap, or in beta
//! only.

use chrono::{DateTime, Duration, TimeZone, Utc};
use grid_source::{MemoryGrid, MessageMeta, SurfaceSpec};
use sector_catalog::{
    CatalogConfig, GridConfig, ProjectionConfig, SectorCatalog, SectorConfig, UniformCellMeta,
};
use test_utils::constant_field;

pub const NX: usize = 10;
pub const NY: usize = 10;

/// A point well inside alpha and outside beta.
pub const ALPHA_ONLY: (f64, f64) = (0.4, 0.2);
/// A point inside both sectors.
pub const OVERLAP: (f64, f64) = (0.4, 0.6);
/// A point well inside beta and outside alpha.
pub const BETA_ONLY: (f64, f64) = (0.4, 1.2);
/// A point outside every sector.
pub const NOWHERE: (f64, f64) = (5.0, 5.0);

fn sector(id: &str, lon1: f64) -> SectorConfig {
    SectorConfig {
        id: id.to_string(),
        projection: ProjectionConfig::Mercator { reflon: 0.0 },
        grid: GridConfig {
            nx: NX,
            ny: NY,
            lat1: 0.0,
            lon1,
            cell_size_m: 10_000.0,
            size_at_lat: 0.0,
            orient: 0.0,
        },
        meta: UniformCellMeta {
            utc_offset_hours: -5,
            observes_dst: true,
            cwa: Some("TST".to_string()),
        },
        elevations: None,
    }
}

/// Two overlapping sectors, alpha with catalog priority.
pub fn test_catalog() -> SectorCatalog {
    SectorCatalog::from_config(CatalogConfig {
        version: Some("scenario-1".to_string()),
        sectors: vec![sector("alpha", 0.0), sector("beta", 0.45)],
    })
    .expect("test catalog must validate")
}

/// Model run time shared by all fixture messages.
pub fn reference_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
}

/// Metadata for a 2-m temperature message.
pub fn temp_meta(sector_id: &str, forecast_hour: u32) -> MessageMeta {
    MessageMeta {
        center: 8,
        sub_center: 0,
        gen_process: 96,
        template: 0,
        category: 0,
        sub_category: 0,
        surface: SurfaceSpec::single(103, 2.0),
        probability: None,
        forecast_duration_hours: 0,
        reference_time: reference_time(),
        valid_time: reference_time() + Duration::hours(forecast_hour as i64),
        sector_id: sector_id.to_string(),
        units: "K".to_string(),
        textual: false,
    }
}

/// Metadata for a sky cover message.
pub fn sky_meta(sector_id: &str, forecast_hour: u32) -> MessageMeta {
    MessageMeta {
        category: 6,
        sub_category: 1,
        units: "%".to_string(),
        ..temp_meta(sector_id, forecast_hour)
    }
}

/// Metadata for a textual weather message.
pub fn wx_meta(sector_id: &str, forecast_hour: u32) -> MessageMeta {
    MessageMeta {
        category: 1,
        sub_category: 226,
        units: "wx".to_string(),
        textual: true,
        ..temp_meta(sector_id, forecast_hour)
    }
}

/// A full-sector grid holding one value everywhere.
pub fn uniform_grid(meta: MessageMeta, value: f64) -> MemoryGrid {
    MemoryGrid::numeric(meta, NX, NY, constant_field(NX, NY, value))
}
