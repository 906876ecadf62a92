//! The γ-parameterized conformal projection family.
//!
//! Stereographic, Lambert conformal conic, and Mercator projections are all
//! conformal maps that differ only in a cone constant. This module unifies
//! them behind one continuous shape parameter γ:
//!
//! - γ = +1: north polar stereographic
//! - γ = -1: south polar stereographic
//! - 0 < |γ| < 1: Lambert conformal conic (γ = sin of the tangent latitude)
//! - γ = 0: Mercator
//!
//! The map works in isometric-latitude space. With `ψ` the isometric
//! latitude and `Δλ` the longitude offset from the reference meridian, the
//! map-space coordinates are
//!
//! ```text
//! ξ = exp(-γψ) sin(γΔλ) / γ        η = (1 - exp(-γψ) cos(γΔλ)) / γ
//! ```
//!
//! with the γ→0 limits ξ = Δλ, η = ψ. A linear transform (rotation, scale,
//! origin offset) fixed by one-point calibration carries map space into grid
//! cell coordinates.

use crate::ellipsoid::Ellipsoid;
use std::f64::consts::PI;
use thiserror::Error;

/// Isometric-latitude magnitude beyond which the direct grid-size formula is
/// numerically unstable and the closed-form polar limit is used instead.
/// 17 isometric units is within about 1e-5 degrees of the pole.
pub const YMERC_POLE_LIMIT: f64 = 17.0;

/// Below this |γ| the Mercator limit formulas are used.
const GAMMA_ZERO_EPS: f64 = 1e-8;

/// Within this distance of |γ| = 1 the projection is treated as exactly
/// stereographic for the polar branches.
const GAMMA_UNITY_EPS: f64 = 1e-12;

/// Errors raised while constructing or calibrating a projection.
#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("invalid standard parallel {0}: must be strictly between -90 and 90")]
    InvalidParallel(f64),

    #[error("invalid cell size {0}: must be positive")]
    InvalidCellSize(f64),

    #[error("calibration latitude {0} too close to a pole for a non-polar projection")]
    CalibrationAtPole(f64),
}

/// A calibrated conformal projection for one sector grid.
///
/// Construct with one of the family constructors, then fix the grid origin,
/// cell size, and orientation with [`ConformalProjection::with_one_point`].
#[derive(Debug, Clone)]
pub struct ConformalProjection {
    /// Shape parameter (cone constant).
    gamma: f64,
    /// Reference ellipsoid.
    ellipsoid: Ellipsoid,
    /// Reference (central meridian) longitude in radians.
    reflon: f64,
    /// Grid cell size in meters where the isometric latitude is zero.
    gridszeq: f64,
    /// Grid coordinates of the map-space origin.
    x0: f64,
    y0: f64,
    /// Grid rotation.
    crot: f64,
    srot: f64,
}

impl ConformalProjection {
    /// Lambert conformal conic tangent to one standard parallel.
    pub fn tangent_lambert(
        ellipsoid: Ellipsoid,
        tangent_lat_deg: f64,
        reflon_deg: f64,
    ) -> Result<Self, ProjectionError> {
        if !(-90.0..=90.0).contains(&tangent_lat_deg) || tangent_lat_deg.abs() >= 90.0 {
            return Err(ProjectionError::InvalidParallel(tangent_lat_deg));
        }
        Ok(Self::raw(
            tangent_lat_deg.to_radians().sin(),
            ellipsoid,
            reflon_deg,
        ))
    }

    /// Lambert conformal conic secant through two standard parallels.
    ///
    /// With equal parallels this degenerates to the tangent form.
    pub fn secant_lambert(
        ellipsoid: Ellipsoid,
        lat1_deg: f64,
        lat2_deg: f64,
        reflon_deg: f64,
    ) -> Result<Self, ProjectionError> {
        for lat in [lat1_deg, lat2_deg] {
            if lat.abs() >= 90.0 {
                return Err(ProjectionError::InvalidParallel(lat));
            }
        }
        if (lat1_deg - lat2_deg).abs() < 1e-10 {
            return Self::tangent_lambert(ellipsoid, lat1_deg, reflon_deg);
        }
        let lat1 = lat1_deg.to_radians();
        let lat2 = lat2_deg.to_radians();
        let psi1 = ellipsoid.isometric_latitude(lat1);
        let psi2 = ellipsoid.isometric_latitude(lat2);
        let gamma = (lat1.cos() / lat2.cos()).ln() / (psi2 - psi1);
        Ok(Self::raw(gamma, ellipsoid, reflon_deg))
    }

    /// Polar stereographic, north or south.
    pub fn polar_stereographic(ellipsoid: Ellipsoid, north: bool, reflon_deg: f64) -> Self {
        Self::raw(if north { 1.0 } else { -1.0 }, ellipsoid, reflon_deg)
    }

    /// Mercator.
    pub fn mercator(ellipsoid: Ellipsoid, reflon_deg: f64) -> Self {
        Self::raw(0.0, ellipsoid, reflon_deg)
    }

    fn raw(gamma: f64, ellipsoid: Ellipsoid, reflon_deg: f64) -> Self {
        Self {
            gamma,
            gridszeq: ellipsoid.semi_major,
            ellipsoid,
            reflon: reflon_deg.to_radians(),
            x0: 0.0,
            y0: 0.0,
            crot: 1.0,
            srot: 0.0,
        }
    }

    /// Calibrate the grid transform from one known point.
    ///
    /// `(grid_x, grid_y)` are the grid coordinates of the point at
    /// `(lat_deg, lon_deg)`; `cell_size_m` is the physical cell size that
    /// holds at latitude `size_at_lat_deg`; `orient_deg` rotates the grid
    /// axes counterclockwise relative to the unrotated map axes.
    pub fn with_one_point(
        mut self,
        grid_x: f64,
        grid_y: f64,
        lat_deg: f64,
        lon_deg: f64,
        cell_size_m: f64,
        size_at_lat_deg: f64,
        orient_deg: f64,
    ) -> Result<Self, ProjectionError> {
        if cell_size_m <= 0.0 {
            return Err(ProjectionError::InvalidCellSize(cell_size_m));
        }

        // Cell size at the reference latitude fixes the equatorial size.
        let lat_sz = size_at_lat_deg.to_radians();
        let cos_sz = lat_sz.cos();
        if cos_sz < 1e-9 {
            // Reference latitude at a pole only makes sense for the
            // stereographic members of the family.
            if 1.0 - self.gamma.abs() > GAMMA_UNITY_EPS {
                return Err(ProjectionError::CalibrationAtPole(size_at_lat_deg));
            }
            let ell = &self.ellipsoid;
            self.gridszeq =
                cell_size_m * (1.0 - ell.e2()).sqrt() / (2.0 * ell.polar_correction());
        } else {
            let psi = self.ellipsoid.isometric_latitude(lat_sz);
            let denom = self.ellipsoid.curvature_denom(lat_sz.sin());
            self.gridszeq = cell_size_m * denom / (cos_sz * (self.gamma * psi).exp());
        }

        let orient = orient_deg.to_radians();
        self.crot = orient.cos();
        self.srot = orient.sin();

        // Origin offset pins the known point to its grid coordinates.
        self.x0 = 0.0;
        self.y0 = 0.0;
        let (x_raw, y_raw) = self.latlon_to_grid(lat_deg, lon_deg);
        self.x0 = grid_x - x_raw;
        self.y0 = grid_y - y_raw;

        Ok(self)
    }

    /// Shape parameter of this projection.
    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    /// Reference ellipsoid.
    pub fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }

    fn cells_per_radius(&self) -> f64 {
        self.ellipsoid.semi_major / self.gridszeq
    }

    fn map_to_grid(&self, xi: f64, eta: f64) -> (f64, f64) {
        let k = self.cells_per_radius();
        (
            self.x0 + k * (self.crot * xi + self.srot * eta),
            self.y0 + k * (self.crot * eta - self.srot * xi),
        )
    }

    fn grid_to_map(&self, x: f64, y: f64) -> (f64, f64) {
        let k = self.cells_per_radius();
        let u = (x - self.x0) / k;
        let v = (y - self.y0) / k;
        (self.crot * u - self.srot * v, self.srot * u + self.crot * v)
    }

    /// Forward projection: geographic degrees to fractional grid coordinates.
    pub fn latlon_to_grid(&self, lat_deg: f64, lon_deg: f64) -> (f64, f64) {
        let lat = lat_deg.to_radians();
        let dlon = normalize_lon(lon_deg.to_radians() - self.reflon);
        let ymerc = self.ellipsoid.isometric_latitude(lat);

        let (xi, eta) = if self.gamma.abs() < GAMMA_ZERO_EPS {
            (dlon, ymerc)
        } else {
            let expv = (-self.gamma * ymerc).exp();
            (
                expv * (self.gamma * dlon).sin() / self.gamma,
                (1.0 - expv * (self.gamma * dlon).cos()) / self.gamma,
            )
        };
        self.map_to_grid(xi, eta)
    }

    /// Inverse projection: fractional grid coordinates to geographic degrees.
    ///
    /// Longitudes are normalized to (-180, 180]. At the projection's own
    /// pole the reference longitude is returned.
    pub fn grid_to_latlon(&self, x: f64, y: f64) -> (f64, f64) {
        let (xi, eta) = self.grid_to_map(x, y);
        let radial = 2.0 * eta - self.gamma * (xi * xi + eta * eta);

        let ymerc = if self.gamma.abs() < GAMMA_ZERO_EPS {
            radial / 2.0
        } else {
            let t = 1.0 - self.gamma * radial;
            if t <= 0.0 {
                // At (or numerically beyond) the cone point.
                let pole_lat = if self.gamma > 0.0 { 90.0 } else { -90.0 };
                return (pole_lat, normalize_lon(self.reflon).to_degrees());
            }
            -t.ln() / (2.0 * self.gamma)
        };

        let dlon = if self.gamma.abs() < GAMMA_ZERO_EPS {
            xi
        } else {
            (self.gamma * xi).atan2(1.0 - self.gamma * eta) / self.gamma
        };

        let (sin_lat, cos_lat) = self.ellipsoid.sincos_from_isometric(ymerc);
        let lat = sin_lat.atan2(cos_lat);
        let lon = normalize_lon(self.reflon + dlon);
        (lat.to_degrees(), lon.to_degrees())
    }

    /// Physical size in meters of one grid cell at grid location (x, y).
    ///
    /// There is no error return: numerical edge cases branch to closed-form
    /// limits. A returned zero means the projection is infinitely distorted
    /// at that location (the opposite pole of a stereographic projection, or
    /// the cone point of a Lambert cone) and interpolation there must not be
    /// trusted.
    pub fn grid_size(&self, x: f64, y: f64) -> f64 {
        let (xi, eta) = self.grid_to_map(x, y);
        let radial = 2.0 * eta - self.gamma * (xi * xi + eta * eta);

        let ymerc = if self.gamma.abs() < GAMMA_ZERO_EPS {
            radial / 2.0
        } else {
            let t = 1.0 - self.gamma * radial;
            if t <= 0.0 {
                // The cone point itself: finite for a true stereographic
                // projection, degenerate for every other cone.
                return if 1.0 - self.gamma.abs() < GAMMA_UNITY_EPS {
                    self.polar_limit_size()
                } else {
                    0.0
                };
            }
            -t.ln() / (2.0 * self.gamma)
        };

        if ymerc.abs() >= YMERC_POLE_LIMIT {
            return self.near_pole_size(ymerc);
        }

        let (sin_lat, cos_lat) = self.ellipsoid.sincos_from_isometric(ymerc);
        self.gridszeq * cos_lat * (self.gamma * ymerc).exp()
            / self.ellipsoid.curvature_denom(sin_lat)
    }

    /// Closed-form cell size of a stereographic projection at its own pole.
    fn polar_limit_size(&self) -> f64 {
        2.0 * self.ellipsoid.polar_correction() * self.gridszeq
            / (1.0 - self.ellipsoid.e2()).sqrt()
    }

    /// Cell size in the near-pole regime, where recovering the geodetic
    /// latitude from the isometric latitude is unstable. Uses
    /// `cos(lat) ~ 2 C exp(-|ymerc|)` with C the ellipsoidal polar factor.
    fn near_pole_size(&self, ymerc: f64) -> f64 {
        let side = if ymerc > 0.0 { 1.0 } else { -1.0 };
        if self.gamma * side <= -1.0 + GAMMA_UNITY_EPS {
            // The opposite pole of a stereographic projection.
            return 0.0;
        }
        2.0 * self.ellipsoid.polar_correction() * self.gridszeq
            * ((self.gamma * side - 1.0) * ymerc.abs()).exp()
            / (1.0 - self.ellipsoid.e2()).sqrt()
    }
}

/// Wrap a longitude in radians into (-pi, pi].
fn normalize_lon(mut lon: f64) -> f64 {
    while lon > PI {
        lon -= 2.0 * PI;
    }
    while lon <= -PI {
        lon += 2.0 * PI;
    }
    lon
}
