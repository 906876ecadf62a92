//! Sector catalog and membership resolution.
//!
//! A sector is one named grid/projection covering a geographic region. The
//! catalog is the process-wide, read-only table of known sectors; the
//! resolver determines, for any probe position, every sector whose grid
//! contains it and in which priority order.

pub mod catalog;
pub mod cellmeta;
pub mod resolver;

pub use catalog::{
    CatalogConfig, GridConfig, ProjectionConfig, Sector, SectorCatalog, SectorConfig,
};
pub use cellmeta::{CellMeta, ElevationField, UniformCellMeta};
pub use resolver::{
    CellCorner, SectorHit, SectorMembership, SectorResolver, MAX_SECTOR_OVERLAP,
};
