//! Conformal map projections for sector grids.
//!
//! Implements the γ-parameterized conformal family (stereographic, Lambert
//! conformal conic, Mercator) from scratch without external dependencies.

pub mod conformal;
pub mod ellipsoid;

pub use conformal::{ConformalProjection, ProjectionError, YMERC_POLE_LIMIT};
pub use ellipsoid::Ellipsoid;
