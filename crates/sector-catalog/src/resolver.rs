//! Point-to-sector membership resolution.
//!
//! For one probe position, the resolver walks the catalog in priority order,
//! projects the position into each sector's grid, and records a hit for
//! every sector whose extent contains it. The first hit is the primary
//! membership; later hits are secondary, tertiary, and so on. The ordering
//! is deterministic for a given catalog, which is what makes first-wins
//! duplicate resolution downstream reproducible.

use crate::catalog::{Sector, SectorCatalog};
use crate::cellmeta::CellMeta;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Upper bound on simultaneous sector memberships for one point. Real
/// points fall in at most a handful of overlapping grids.
pub const MAX_SECTOR_OVERLAP: usize = 4;

/// Default capacity of the membership cache.
const MEMBERSHIP_CACHE_CAPACITY: usize = 4096;

/// One of the four grid cells surrounding a fractional grid position,
/// with its geographic location for bilinear weighting.
#[derive(Debug, Clone, PartialEq)]
pub struct CellCorner {
    pub cell_x: i64,
    pub cell_y: i64,
    pub lat: f64,
    pub lon: f64,
}

/// Membership of one point in one sector.
#[derive(Debug, Clone)]
pub struct SectorHit {
    pub sector_id: String,
    /// 0 = primary, 1 = secondary, ...
    pub rank: usize,
    /// Fractional grid coordinates in this sector.
    pub grid_x: f64,
    pub grid_y: f64,
    /// The four bounding cells: (floor, floor), (ceil, floor),
    /// (floor, ceil), (ceil, ceil).
    pub corners: [CellCorner; 4],
    /// Static metadata at the nearest cell.
    pub meta: CellMeta,
}

/// All sector memberships of one point, primary first.
///
/// Empty membership means the point lies outside every sector — a valid
/// data-coverage condition, not an error.
#[derive(Debug, Clone, Default)]
pub struct SectorMembership {
    pub hits: Vec<SectorHit>,
}

impl SectorMembership {
    /// Whether the point is outside every sector.
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// The primary (highest-priority) membership.
    pub fn primary(&self) -> Option<&SectorHit> {
        self.hits.first()
    }

    /// The membership in a specific sector, if any.
    pub fn hit_for(&self, sector_id: &str) -> Option<&SectorHit> {
        self.hits.iter().find(|h| h.sector_id == sector_id)
    }

    /// A copy restricted to an allow-list, ranks reassigned.
    pub fn filtered(&self, allowed: &[String]) -> SectorMembership {
        let mut hits: Vec<SectorHit> = self
            .hits
            .iter()
            .filter(|h| allowed.iter().any(|a| a == &h.sector_id))
            .cloned()
            .collect();
        for (rank, hit) in hits.iter_mut().enumerate() {
            hit.rank = rank;
        }
        SectorMembership { hits }
    }
}

/// Resolves points against one catalog, caching memberships.
///
/// The cache is keyed by the position quantized to about a tenth of a
/// meter, which is far below any grid's resolution; it is valid only for
/// the catalog this resolver was built with.
pub struct SectorResolver {
    catalog: Arc<SectorCatalog>,
    cache: Mutex<LruCache<(i64, i64), Arc<SectorMembership>>>,
}

impl SectorResolver {
    /// Create a resolver over a catalog.
    pub fn new(catalog: Arc<SectorCatalog>) -> Self {
        Self {
            catalog,
            cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(MEMBERSHIP_CACHE_CAPACITY).unwrap(),
            )),
        }
    }

    /// The catalog this resolver serves.
    pub fn catalog(&self) -> &SectorCatalog {
        &self.catalog
    }

    /// Resolve a geographic position to its sector memberships.
    pub fn resolve(&self, lat: f64, lon: f64) -> Arc<SectorMembership> {
        let key = quantize(lat, lon);
        if let Some(hit) = self.cache.lock().unwrap().get(&key) {
            return Arc::clone(hit);
        }
        let membership = Arc::new(self.resolve_uncached(lat, lon));
        self.cache
            .lock()
            .unwrap()
            .put(key, Arc::clone(&membership));
        membership
    }

    fn resolve_uncached(&self, lat: f64, lon: f64) -> SectorMembership {
        let mut hits = Vec::new();
        for sector in self.catalog.sectors() {
            if hits.len() >= MAX_SECTOR_OVERLAP {
                break;
            }
            let (x, y) = sector.projection.latlon_to_grid(lat, lon);
            if !sector.contains(x, y) {
                continue;
            }
            let (x, y) = sector.clamp(x, y);
            let rank = hits.len();
            hits.push(build_hit(sector, rank, x, y));
            debug!(
                sector = %sector.id,
                rank,
                grid_x = x,
                grid_y = y,
                "sector membership"
            );
        }
        SectorMembership { hits }
    }
}

fn build_hit(sector: &Sector, rank: usize, x: f64, y: f64) -> SectorHit {
    let x0 = x.floor();
    let y0 = y.floor();
    let x1 = x.ceil();
    let y1 = y.ceil();
    let corner = |cx: f64, cy: f64| {
        let (lat, lon) = sector.projection.grid_to_latlon(cx, cy);
        CellCorner {
            cell_x: cx as i64,
            cell_y: cy as i64,
            lat,
            lon,
        }
    };
    SectorHit {
        sector_id: sector.id.clone(),
        rank,
        grid_x: x,
        grid_y: y,
        corners: [
            corner(x0, y0),
            corner(x1, y0),
            corner(x0, y1),
            corner(x1, y1),
        ],
        meta: sector.cell_meta(x, y),
    }
}

fn quantize(lat: f64, lon: f64) -> (i64, i64) {
    ((lat * 1e6).round() as i64, (lon * 1e6).round() as i64)
}
