//! Ellipsoid parameters and the closed catalog of datum names understood by
//! the reference datasets.

use crate::math::{DEGREE, ang_diff, signed_eccentricity};
use crate::{ProjError, Result};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;

/// WGS84 equatorial radius in meters
pub const WGS84_A: f64 = 6_378_137.0;

/// WGS84 inverse flattening
pub const WGS84_R: f64 = 298.257_223_563;

/// Recognized datum tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Datum {
    /// Global reference ellipsoid (WGS84)
    Wge,
    /// Sphere whose quarter meridian is exactly 10000 km
    TestSphere,
    /// Strongly flattened synthetic ellipsoid for numerical edge cases
    TestSrmMax,
}

impl Datum {
    /// Look up a datum by the token used in reference headers
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "WGE" => Ok(Datum::Wge),
            "Test_sphere" => Ok(Datum::TestSphere),
            "Test_SRMmax" => Ok(Datum::TestSrmMax),
            other => Err(ProjError::UnsupportedDatum(other.to_string())),
        }
    }

    /// The header token for this datum
    pub fn name(self) -> &'static str {
        match self {
            Datum::Wge => "WGE",
            Datum::TestSphere => "Test_sphere",
            Datum::TestSrmMax => "Test_SRMmax",
        }
    }

    /// The ellipsoid this datum stands for
    pub fn ellipsoid(self) -> Ellipsoid {
        match self {
            Datum::Wge => Ellipsoid::new(WGS84_A, WGS84_R),
            Datum::TestSphere => Ellipsoid::new(20_000_000.0 / std::f64::consts::PI, 0.0),
            Datum::TestSrmMax => Ellipsoid::new(6_400_000.0, 150.0),
        }
    }
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Two reference streams must name the same datum before any record is compared
pub fn ensure_same_datum(geodetic: &str, projected: &str) -> Result<()> {
    if geodetic == projected {
        Ok(())
    } else {
        Err(ProjError::DatumMismatch {
            geodetic: geodetic.to_string(),
            projected: projected.to_string(),
        })
    }
}

/// An oblate (or prolate) ellipsoid of revolution
///
/// An inverse flattening of 0 denotes a sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Ellipsoid {
    equatorial_radius: f64,
    inverse_flattening: f64,
}

impl Default for Ellipsoid {
    fn default() -> Self {
        Datum::Wge.ellipsoid()
    }
}

impl Ellipsoid {
    /// Create an ellipsoid from its equatorial radius and inverse flattening
    pub const fn new(equatorial_radius: f64, inverse_flattening: f64) -> Self {
        Self {
            equatorial_radius,
            inverse_flattening,
        }
    }

    /// Create an ellipsoid from a flattening (0 for a sphere)
    pub fn from_flattening(equatorial_radius: f64, flattening: f64) -> Result<Self> {
        if !(equatorial_radius.is_finite() && equatorial_radius > 0.0) {
            return Err(ProjError::InvalidParameter(format!(
                "Equatorial radius is not positive: {equatorial_radius}"
            )));
        }
        if !(flattening.is_finite() && flattening < 1.0) {
            return Err(ProjError::InvalidParameter(format!(
                "Flattening is not less than 1: {flattening}"
            )));
        }
        let inverse_flattening = if flattening == 0.0 { 0.0 } else { 1.0 / flattening };
        Ok(Self::new(equatorial_radius, inverse_flattening))
    }

    /// Resolve a datum token through the catalog
    pub fn from_datum(name: &str) -> Result<Self> {
        Datum::from_name(name).map(Datum::ellipsoid)
    }

    /// Equatorial radius in meters
    #[inline]
    pub fn equatorial_radius(&self) -> f64 {
        self.equatorial_radius
    }

    /// Inverse flattening, 0 for a sphere
    #[inline]
    pub fn inverse_flattening(&self) -> f64 {
        self.inverse_flattening
    }

    /// Flattening, derived from the inverse flattening
    #[inline]
    pub fn flattening(&self) -> f64 {
        if self.inverse_flattening == 0.0 {
            0.0
        } else {
            1.0 / self.inverse_flattening
        }
    }

    /// Eccentricity squared
    #[inline]
    pub fn e2(&self) -> f64 {
        let f = self.flattening();
        f * (2.0 - f)
    }

    /// Signed eccentricity (negative for prolate ellipsoids)
    #[inline]
    pub fn es(&self) -> f64 {
        signed_eccentricity(self.flattening())
    }

    /// Meridional radius of curvature at a latitude, in meters
    pub fn meridional_radius(&self, lat: f64) -> f64 {
        let e2 = self.e2();
        let s = (lat * DEGREE).sin();
        let n = 1.0 / (1.0 - e2 * s * s).sqrt();
        self.equatorial_radius * (1.0 - e2) * n * n * n
    }

    /// Radius of the parallel circle at a latitude, in meters
    pub fn parallel_radius(&self, lat: f64) -> f64 {
        let e2 = self.e2();
        let phi = lat * DEGREE;
        let s = phi.sin();
        self.equatorial_radius * phi.cos() / (1.0 - e2 * s * s).sqrt()
    }

    /// Approximate ground distance between two nearby points, in meters
    ///
    /// Latitude and longitude differences are scaled by the local meridional and
    /// parallel radii at the first point and combined with a Euclidean norm.
    pub fn tangent_plane_distance(&self, lat0: f64, lon0: f64, lat1: f64, lon1: f64) -> f64 {
        let dlat = lat1 - lat0;
        let dlon = ang_diff(lon0, lon1);
        DEGREE
            * (dlat * self.meridional_radius(lat0)).hypot(dlon * self.parallel_radius(lat0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_lookup() {
        let wge = Ellipsoid::from_datum("WGE").unwrap();
        assert_eq!(wge.equatorial_radius(), WGS84_A);
        assert_eq!(wge.inverse_flattening(), WGS84_R);

        let sphere = Ellipsoid::from_datum("Test_sphere").unwrap();
        assert_eq!(sphere.flattening(), 0.0);
        // Quarter meridian of exactly 10000 km
        assert!((sphere.equatorial_radius() * std::f64::consts::FRAC_PI_2 - 1e7).abs() < 1e-6);

        let srm = Ellipsoid::from_datum("Test_SRMmax").unwrap();
        assert_eq!(srm.equatorial_radius(), 6_400_000.0);
        assert!((srm.flattening() - 1.0 / 150.0).abs() < 1e-18);
    }

    #[test]
    fn test_unsupported_datum() {
        let err = Ellipsoid::from_datum("NAD27").unwrap_err();
        assert!(matches!(err, ProjError::UnsupportedDatum(ref name) if name == "NAD27"));
    }

    #[test]
    fn test_datum_mismatch() {
        assert!(ensure_same_datum("WGE", "WGE").is_ok());
        let err = ensure_same_datum("WGE", "Test_sphere").unwrap_err();
        assert!(matches!(err, ProjError::DatumMismatch { .. }));
    }

    #[test]
    fn test_from_flattening() {
        let e = Ellipsoid::from_flattening(WGS84_A, 1.0 / WGS84_R).unwrap();
        assert!((e.inverse_flattening() - WGS84_R).abs() < 1e-9);
        let s = Ellipsoid::from_flattening(1.0, 0.0).unwrap();
        assert_eq!(s.inverse_flattening(), 0.0);
        assert!(Ellipsoid::from_flattening(-1.0, 0.0).is_err());
        assert!(Ellipsoid::from_flattening(1.0, 1.0).is_err());
    }

    #[test]
    fn test_tangent_plane_distance() {
        let sphere = Datum::TestSphere.ellipsoid();
        // One degree of latitude on the 10000 km quarter-meridian sphere
        let d = sphere.tangent_plane_distance(10.0, 20.0, 11.0, 20.0);
        assert!((d - 1e7 / 90.0).abs() < 1e-6);

        // Longitude differences wrap across the antimeridian
        let wrap = sphere.tangent_plane_distance(0.0, 179.5, 0.0, -179.5);
        let direct = sphere.tangent_plane_distance(0.0, 0.0, 0.0, 1.0);
        assert!((wrap - direct).abs() < 1e-6);

        assert_eq!(sphere.tangent_plane_distance(45.0, 10.0, 45.0, 10.0), 0.0);
    }

    #[test]
    fn test_radii_on_ellipsoid() {
        let wge = Ellipsoid::default();
        // Meridional radius grows toward the pole, parallel radius vanishes there
        assert!(wge.meridional_radius(60.0) > wge.meridional_radius(0.0));
        assert!(wge.parallel_radius(90.0).abs() < 1e-9);
        assert!((wge.parallel_radius(0.0) - WGS84_A).abs() < 1e-9);
    }
}
