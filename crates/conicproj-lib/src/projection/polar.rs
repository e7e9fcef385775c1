//! Polar stereographic projection, parameterized by the pole in use rather than
//! a central meridian.

use super::{TransformResult, check_finite, check_latitude, check_radius_and_scale};
use crate::math::{DEGREE, ang_normalize, atand, eatanhe, tand, tauf, taupf};
use crate::{Ellipsoid, Result};

/// Polar stereographic projection with central scale `k0` at the pole
#[derive(Debug, Clone)]
pub struct PolarStereographic {
    a: f64,
    k0: f64,
    es: f64,
    e2: f64,
    e2m: f64,
    /// `sqrt(1 - e^2) * exp(e atanh(e))`
    c: f64,
}

impl PolarStereographic {
    pub fn new(ellipsoid: Ellipsoid, k0: f64) -> Result<Self> {
        let a = ellipsoid.equatorial_radius();
        check_radius_and_scale(a, ellipsoid.flattening(), k0)?;
        let (es, e2) = (ellipsoid.es(), ellipsoid.e2());
        let e2m = 1.0 - e2;
        Ok(Self {
            a,
            k0,
            es,
            e2,
            e2m,
            c: e2m.sqrt() * eatanhe(1.0, es).exp(),
        })
    }

    /// Central scale at the pole
    #[inline]
    pub fn central_scale(&self) -> f64 {
        self.k0
    }

    fn point_scale(&self, rho: f64, tau: f64) -> f64 {
        let secphi = 1.0_f64.hypot(tau);
        rho / self.a * secphi * (self.e2m + self.e2 / (secphi * secphi)).sqrt()
    }

    /// Project about the north (`north = true`) or south pole
    pub fn forward(&self, north: bool, lat: f64, lon: f64) -> Result<TransformResult> {
        check_latitude(lat)?;
        let lat = if north { lat } else { -lat };
        let lon = ang_normalize(lon);
        let tau = tand(lat);
        let taup = taupf(tau, self.es);
        // exp(-psi), computed without cancellation on the near side of the pole
        let t = if taup >= 0.0 {
            if lat == 90.0 { 0.0 } else { 1.0 / (1.0_f64.hypot(taup) + taup) }
        } else {
            1.0_f64.hypot(taup) - taup
        };
        let rho = 2.0 * self.k0 * self.a / self.c * t;
        check_finite(rho, "Polar radius at the opposite pole")?;
        let k = if lat == 90.0 { self.k0 } else { self.point_scale(rho, tau) };
        let (s, c) = (lon * DEGREE).sin_cos();
        let y = if north { -rho * c } else { rho * c };
        Ok(TransformResult::new(
            rho * s,
            y,
            if north { lon } else { -lon },
            k,
        ))
    }

    pub fn reverse(&self, north: bool, x: f64, y: f64) -> Result<TransformResult> {
        check_finite(x, "Easting")?;
        check_finite(y, "Northing")?;
        let rho = x.hypot(y);
        let t = if rho != 0.0 {
            rho / (2.0 * self.k0 * self.a / self.c)
        } else {
            f64::EPSILON * f64::EPSILON
        };
        let taup = (1.0 / t - t) / 2.0;
        let tau = tauf(taup, self.es);
        let lat = atand(tau);
        let lon = x.atan2(if north { -y } else { y }) / DEGREE;
        let k = if rho != 0.0 { self.point_scale(rho, tau) } else { self.k0 };
        Ok(TransformResult::new(
            lon,
            if north { lat } else { -lat },
            if north { lon } else { -lon },
            k,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LambertConformalConic;
    use crate::math::ang_diff;

    #[test]
    fn test_round_trip_both_poles() {
        let ups = PolarStereographic::new(Ellipsoid::default(), 0.994).unwrap();
        for north in [true, false] {
            let sign = if north { 1.0 } else { -1.0 };
            for lat in [0.0, 30.0, 60.0, 84.0, 89.999] {
                for lon in [-179.0, -45.0, 0.0, 30.0, 120.0] {
                    let fwd = ups.forward(north, sign * lat, lon).unwrap();
                    let rev = ups.reverse(north, fwd.position.x, fwd.position.y).unwrap();
                    assert!((rev.latitude() - sign * lat).abs() < 1e-8);
                    assert!(ang_diff(lon, rev.longitude()).abs() < 1e-8);
                    assert!((rev.scale - fwd.scale).abs() < 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_pole_maps_to_origin() {
        let ups = PolarStereographic::new(Ellipsoid::default(), 0.994).unwrap();
        let fwd = ups.forward(true, 90.0, 0.0).unwrap();
        assert_eq!(fwd.position.x, 0.0);
        assert_eq!(fwd.position.y.abs(), 0.0);
        assert_eq!(fwd.scale, 0.994);
        assert_eq!(fwd.scale, ups.central_scale());

        let rev = ups.reverse(false, 0.0, 0.0).unwrap();
        assert!((rev.latitude() + 90.0).abs() < 1e-12);
        assert_eq!(rev.scale, 0.994);

        assert!(ups.forward(true, -90.0, 0.0).is_err());
    }

    #[test]
    fn test_agrees_with_polar_conic() {
        let ellipsoid = Ellipsoid::default();
        let ups = PolarStereographic::new(ellipsoid, 0.97).unwrap();
        let conic = LambertConformalConic::new(ellipsoid, -90.0, -90.0, 0.97).unwrap();
        for (lat, lon) in [(-70.0, 10.0), (-45.0, -120.0), (-88.0, 179.0)] {
            let a = ups.forward(false, lat, lon).unwrap();
            let b = conic.forward(0.0, lat, lon).unwrap();
            assert!((a.position.x - b.position.x).abs() < 1e-6);
            assert!((a.position.y - b.position.y).abs() < 1e-6);
            assert!((a.scale - b.scale).abs() < 1e-12);
            assert!((a.convergence - b.convergence).abs() < 1e-12);
        }
    }
}
