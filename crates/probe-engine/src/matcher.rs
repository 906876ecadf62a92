//! The element matcher: the central query operation.
//!
//! Given probe points, element descriptors, and a set of opened grid
//! sources, the matcher produces one [`MatchRecord`] per satisfied
//! (descriptor, valid time, sector) combination, holding one value per
//! probe point in caller order. Coverage gaps are explicit missing values;
//! a record is either fully populated or not produced at all.
//!
//! Sources are scanned in parallel with per-source buffers merged back in
//! input order, so duplicate rejection and downstream collation tie-breaks
//! are deterministic regardless of worker scheduling.

use crate::cancel::CancelToken;
use crate::descriptor::{dedup_descriptors, ElementDescriptor};
use crate::{interpolate, units};
use chrono::{DateTime, Utc};
use grid_source::{CellValue, GridMessage, GridSource};
use probe_common::{
    PointGeometry, ProbeError, ProbePoint, ProbeResult, ProbeValue, TimeWindow, UnitSystem,
};
use rayon::prelude::*;
use sector_catalog::{SectorCatalog, SectorMembership, SectorResolver};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// How a value is extracted at a probe position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InterpolationMode {
    /// Read the single closest grid cell.
    Nearest,
    /// Blend the four bounding cells by fractional offset.
    #[default]
    Bilinear,
    /// Average every cell inside a coverage point's extent. Location
    /// points fall back to nearest-cell under this mode.
    AreaAverage,
}

impl InterpolationMode {
    /// Parse from string (case-insensitive).
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "nearest" => Self::Nearest,
            "area-average" | "average" => Self::AreaAverage,
            _ => Self::Bilinear,
        }
    }
}

impl std::fmt::Display for InterpolationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nearest => write!(f, "nearest"),
            Self::Bilinear => write!(f, "bilinear"),
            Self::AreaAverage => write!(f, "area-average"),
        }
    }
}

/// One query's full context: points, requests, and extraction policy.
///
/// Explicit and query-scoped; nothing here is process-global, so any number
/// of queries can run concurrently over the same catalog.
#[derive(Debug, Clone)]
pub struct ProbeQuery {
    /// Probe points; value arrays follow this order for the whole query.
    pub points: Vec<ProbePoint>,
    /// Requested variables; de-duplicated by the matcher.
    pub descriptors: Vec<ElementDescriptor>,
    /// Optional valid-time filter.
    pub window: TimeWindow,
    /// Extraction policy.
    pub interpolation: InterpolationMode,
    /// Output unit system.
    pub units: UnitSystem,
    /// Optional sector allow-list.
    pub sectors: Option<Vec<String>>,
}

impl ProbeQuery {
    /// Create a query with default policy: unbounded window, bilinear
    /// extraction, native units, all sectors.
    pub fn new(points: Vec<ProbePoint>, descriptors: Vec<ElementDescriptor>) -> Self {
        Self {
            points,
            descriptors,
            window: TimeWindow::unbounded(),
            interpolation: InterpolationMode::default(),
            units: UnitSystem::default(),
            sectors: None,
        }
    }

    /// Set the valid-time window.
    pub fn with_window(mut self, window: TimeWindow) -> Self {
        self.window = window;
        self
    }

    /// Set the extraction policy.
    pub fn with_interpolation(mut self, mode: InterpolationMode) -> Self {
        self.interpolation = mode;
        self
    }

    /// Set the output unit system.
    pub fn with_units(mut self, units: UnitSystem) -> Self {
        self.units = units;
        self
    }

    /// Restrict resolution to an allow-list of sectors.
    pub fn with_sectors(mut self, sectors: Vec<String>) -> Self {
        self.sectors = Some(sectors);
        self
    }
}

/// One element evaluated at one valid time, across all probe points.
#[derive(Debug, Clone)]
pub struct MatchRecord {
    /// The satisfied descriptor.
    pub descriptor: ElementDescriptor,
    /// Model run time.
    pub reference_time: DateTime<Utc>,
    /// Time the values apply to.
    pub valid_time: DateTime<Utc>,
    /// Originating sector.
    pub sector_id: String,
    /// Unit of the numeric values.
    pub units: String,
    /// One value per probe point, in the query's point order.
    pub values: Vec<ProbeValue>,
}

/// Matches element requests against grid sources.
pub struct ElementMatcher {
    resolver: Arc<SectorResolver>,
}

impl ElementMatcher {
    /// Create a matcher over a resolver (and through it, a catalog).
    pub fn new(resolver: Arc<SectorResolver>) -> Self {
        Self { resolver }
    }

    /// Run a query to completion.
    pub fn run(
        &self,
        query: &ProbeQuery,
        sources: &[&dyn GridSource],
    ) -> ProbeResult<Vec<MatchRecord>> {
        self.run_cancellable(query, sources, &CancelToken::new())
    }

    /// Run a query, checking the cancellation token between source scans.
    pub fn run_cancellable(
        &self,
        query: &ProbeQuery,
        sources: &[&dyn GridSource],
        cancel: &CancelToken,
    ) -> ProbeResult<Vec<MatchRecord>> {
        // Input validation happens before any source is touched.
        if query.points.is_empty() {
            return Err(ProbeError::NoPoints);
        }
        for point in &query.points {
            point
                .validate()
                .map_err(ProbeError::InvalidPoint)?;
        }
        let descriptors = dedup_descriptors(query.descriptors.clone())?;

        // Memberships are resolved once per point and shared by every
        // source scan.
        let memberships: Vec<SectorMembership> = query
            .points
            .iter()
            .map(|point| {
                let (lat, lon) = point.position();
                let membership = self.resolver.resolve(lat, lon);
                match &query.sectors {
                    Some(allowed) => membership.filtered(allowed),
                    None => (*membership).clone(),
                }
            })
            .collect();

        let catalog = self.resolver.catalog();
        let scans: Vec<ProbeResult<Vec<PendingRecord>>> = sources
            .par_iter()
            .map(|source| {
                if cancel.is_cancelled() {
                    return Err(ProbeError::Cancelled);
                }
                Ok(scan_source(
                    *source,
                    query,
                    &descriptors,
                    &memberships,
                    catalog,
                ))
            })
            .collect();

        // Merge in source input order; the first (descriptor, valid time,
        // sector) wins and later duplicates are rejected, never overwritten.
        let mut seen: HashSet<(usize, DateTime<Utc>, String)> = HashSet::new();
        let mut records = Vec::new();
        for scan in scans {
            for pending in scan? {
                let key = (
                    pending.descriptor_index,
                    pending.record.valid_time,
                    pending.record.sector_id.clone(),
                );
                if !seen.insert(key) {
                    debug!(
                        element = %pending.record.descriptor.element,
                        valid_time = %pending.record.valid_time,
                        sector = %pending.record.sector_id,
                        "duplicate descriptor/time/sector match rejected"
                    );
                    continue;
                }
                debug_assert_eq!(pending.record.values.len(), query.points.len());
                records.push(pending.record);
            }
        }
        Ok(records)
    }
}

struct PendingRecord {
    descriptor_index: usize,
    record: MatchRecord,
}

fn scan_source(
    source: &dyn GridSource,
    query: &ProbeQuery,
    descriptors: &[ElementDescriptor],
    memberships: &[SectorMembership],
    catalog: &SectorCatalog,
) -> Vec<PendingRecord> {
    let mut out = Vec::new();
    for message in source.messages() {
        let meta = message.meta();

        if !query.window.contains(meta.valid_time) {
            debug!(
                source = source.id(),
                valid_time = %meta.valid_time,
                "message outside query window"
            );
            continue;
        }

        // First satisfied descriptor wins for this message.
        let Some(index) = descriptors.iter().position(|d| d.matches(meta)) else {
            debug!(
                source = source.id(),
                sector = %meta.sector_id,
                category = meta.category,
                sub_category = meta.sub_category,
                "message matches no descriptor"
            );
            continue;
        };
        let descriptor = &descriptors[index];

        let values: Vec<ProbeValue> = query
            .points
            .iter()
            .zip(memberships.iter())
            .map(|(point, membership)| {
                extract_value(message, point, membership, query, descriptor, catalog)
            })
            .collect();

        let unit_string = match query.units {
            UnitSystem::Native => meta.units.clone(),
            system => units::unit_label(descriptor.element, system).to_string(),
        };

        out.push(PendingRecord {
            descriptor_index: index,
            record: MatchRecord {
                descriptor: descriptor.clone(),
                reference_time: meta.reference_time,
                valid_time: meta.valid_time,
                sector_id: meta.sector_id.clone(),
                units: unit_string,
                values,
            },
        });
    }
    out
}

fn extract_value(
    message: &dyn GridMessage,
    point: &ProbePoint,
    membership: &SectorMembership,
    query: &ProbeQuery,
    descriptor: &ElementDescriptor,
    catalog: &SectorCatalog,
) -> ProbeValue {
    let meta = message.meta();
    let Some(hit) = membership.hit_for(&meta.sector_id) else {
        return ProbeValue::Missing;
    };

    let cell = match (query.interpolation, &point.geometry) {
        (
            InterpolationMode::AreaAverage,
            PointGeometry::Coverage {
                min_lat,
                min_lon,
                max_lat,
                max_lon,
            },
        ) => match coverage_cell_range(catalog, &meta.sector_id, *min_lat, *min_lon, *max_lat, *max_lon) {
            Some((min_x, min_y, max_x, max_y)) => {
                interpolate::area_average(message, min_x, min_y, max_x, max_y)
            }
            None => CellValue::Missing,
        },
        (InterpolationMode::Bilinear, _) => interpolate::bilinear(message, hit.grid_x, hit.grid_y),
        _ => interpolate::nearest(message, hit.grid_x, hit.grid_y),
    };

    match cell {
        CellValue::Missing => ProbeValue::Missing,
        CellValue::Text(s) => ProbeValue::Text(s),
        CellValue::Numeric(v) => {
            ProbeValue::Numeric(units::convert(descriptor.element, query.units, v))
        }
    }
}

/// Project a coverage extent into a sector's grid and return the bounding
/// fractional cell range.
fn coverage_cell_range(
    catalog: &SectorCatalog,
    sector_id: &str,
    min_lat: f64,
    min_lon: f64,
    max_lat: f64,
    max_lon: f64,
) -> Option<(f64, f64, f64, f64)> {
    let sector = catalog.get(sector_id)?;
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for (lat, lon) in [
        (min_lat, min_lon),
        (min_lat, max_lon),
        (max_lat, min_lon),
        (max_lat, max_lon),
    ] {
        let (x, y) = sector.projection.latlon_to_grid(lat, lon);
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }
    Some((min_x, min_y, max_x, max_y))
}
