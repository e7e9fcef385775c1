//! Projection implementations behind a fixed Forward/Reverse contract.
//!
//! Every central-meridian projection implements [`ConicProjection`]. The polar
//! stereographic projection takes a pole flag instead and exposes the same shape
//! through inherent methods.

mod albers;
mod lambert;
mod polar;
mod transverse_mercator;

pub use albers::AlbersEqualArea;
pub use lambert::LambertConformalConic;
pub use polar::PolarStereographic;
pub use transverse_mercator::TransverseMercator;

use crate::{ProjError, Result};
use geo::Coord;

/// Position plus the local convergence and scale of one transform
///
/// For a forward transform `position` is (easting, northing) in meters; for a
/// reverse transform it is (longitude, latitude) in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformResult {
    /// Projected or geographic position
    pub position: Coord<f64>,
    /// Meridian convergence in degrees
    pub convergence: f64,
    /// Point scale factor
    pub scale: f64,
}

impl TransformResult {
    #[inline]
    pub(crate) fn new(x: f64, y: f64, convergence: f64, scale: f64) -> Self {
        Self {
            position: Coord { x, y },
            convergence,
            scale,
        }
    }

    /// Latitude of a reverse result
    #[inline]
    pub fn latitude(&self) -> f64 {
        self.position.y
    }

    /// Longitude of a reverse result
    #[inline]
    pub fn longitude(&self) -> f64 {
        self.position.x
    }
}

/// Forward/Reverse contract of a projection parameterized by a central meridian
pub trait ConicProjection: Send + Sync {
    /// Project a geodetic position (degrees) to planar coordinates (meters)
    fn forward(&self, lon0: f64, lat: f64, lon: f64) -> Result<TransformResult>;

    /// Recover the geodetic position (degrees) of planar coordinates (meters)
    fn reverse(&self, lon0: f64, x: f64, y: f64) -> Result<TransformResult>;
}

pub(crate) fn check_latitude(lat: f64) -> Result<()> {
    if lat.abs() > 90.0 || lat.is_nan() {
        return Err(ProjError::OutOfRange(format!(
            "Latitude {lat}d not in [-90d, 90d]"
        )));
    }
    Ok(())
}

pub(crate) fn check_finite(value: f64, what: &str) -> Result<()> {
    if !value.is_finite() {
        return Err(ProjError::OutOfRange(format!("{what} is not finite: {value}")));
    }
    Ok(())
}

pub(crate) fn check_radius_and_scale(a: f64, f: f64, k: f64) -> Result<()> {
    if !(a.is_finite() && a > 0.0) {
        return Err(ProjError::InvalidParameter(format!(
            "Equatorial radius is not positive: {a}"
        )));
    }
    if !(f.is_finite() && f < 1.0) {
        return Err(ProjError::InvalidParameter(format!(
            "Polar semi-axis is not positive: flattening {f}"
        )));
    }
    if !(k.is_finite() && k > 0.0) {
        return Err(ProjError::InvalidParameter(format!(
            "Scale is not positive: {k}"
        )));
    }
    Ok(())
}

pub(crate) fn check_standard_parallel(lat: f64) -> Result<()> {
    if !(lat.abs() <= 90.0) {
        return Err(ProjError::InvalidParameter(format!(
            "Standard latitude not in [-90d, 90d]: {lat}"
        )));
    }
    Ok(())
}
