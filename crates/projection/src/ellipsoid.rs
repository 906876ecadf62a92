//! Reference ellipsoids and isometric-latitude conversions.
//!
//! The conformal projection works in isometric (Mercator) latitude space.
//! This module holds the ellipsoid parameters and the conversions between
//! geodetic and isometric latitude, including the ellipsoidal correction
//! term that vanishes on a sphere.

/// An ellipsoid of revolution, described by its semi-major axis and first
/// eccentricity. A sphere has eccentricity zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    /// Semi-major axis in meters.
    pub semi_major: f64,
    /// First eccentricity (not squared).
    pub eccentricity: f64,
}

impl Ellipsoid {
    /// A sphere of the given radius.
    pub fn sphere(radius: f64) -> Self {
        Self {
            semi_major: radius,
            eccentricity: 0.0,
        }
    }

    /// The spherical earth used by NCEP gridded products (6371.2 km).
    pub fn ncep_sphere() -> Self {
        Self::sphere(6_371_200.0)
    }

    /// WGS84.
    pub fn wgs84() -> Self {
        Self {
            semi_major: 6_378_137.0,
            eccentricity: 0.081_819_190_842_622,
        }
    }

    /// Eccentricity squared.
    pub fn e2(&self) -> f64 {
        self.eccentricity * self.eccentricity
    }

    /// Isometric (Mercator) latitude for a geodetic latitude in radians.
    ///
    /// `asinh(tan lat) - e * atanh(e * sin lat)`; the second term is the
    /// ellipsoidal correction.
    pub fn isometric_latitude(&self, lat: f64) -> f64 {
        let e = self.eccentricity;
        lat.tan().asinh() - e * (e * lat.sin()).atanh()
    }

    /// Recover sin/cos of the geodetic latitude from an isometric latitude.
    ///
    /// On a sphere the answer is closed-form (`sin lat = tanh(ymerc)`); on
    /// an ellipsoid the correction term is folded in by fixed-point
    /// iteration, which converges in a handful of rounds for any
    /// geodetically meaningful eccentricity.
    pub fn sincos_from_isometric(&self, ymerc: f64) -> (f64, f64) {
        let e = self.eccentricity;
        let mut lat = ymerc.sinh().atan();
        if e > 0.0 {
            for _ in 0..10 {
                let adjusted = ymerc + e * (e * lat.sin()).atanh();
                let next = adjusted.sinh().atan();
                if (next - lat).abs() < 1e-14 {
                    lat = next;
                    break;
                }
                lat = next;
            }
        }
        (lat.sin(), lat.cos())
    }

    /// `sqrt(1 - e^2 sin^2 lat)`, the denominator of the prime vertical
    /// radius of curvature.
    pub fn curvature_denom(&self, sin_lat: f64) -> f64 {
        (1.0 - self.e2() * sin_lat * sin_lat).sqrt()
    }

    /// `exp(-e * atanh(e))`, the ellipsoidal factor that survives in the
    /// polar limit of `cos(lat) * exp(isometric latitude)`.
    pub fn polar_correction(&self) -> f64 {
        let e = self.eccentricity;
        (-e * e.atanh()).exp()
    }
}
