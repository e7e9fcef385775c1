//! Albers Equal Area conic on an ellipsoid.
//!
//! Uses the authalic function `q(phi)`; the cone radius is
//! `rho = a k1 sqrt(C - n q) / n` with `C = m1^2 + n q1`. Cone constant 0 (standard
//! parallels symmetric about the equator) degenerates to the cylindrical equal area
//! projection. Northings are measured from latitude `asin(n)`.

use super::{
    ConicProjection, TransformResult, check_finite, check_latitude, check_radius_and_scale,
    check_standard_parallel,
};
use crate::math::{DEGREE, ang_diff, ang_normalize, atanhee};
use crate::{Ellipsoid, ProjError, Result};

/// Newton iterations when inverting the authalic function
const MAX_ITERATIONS: usize = 30;

/// Albers Equal Area conic projection
#[derive(Debug, Clone)]
pub struct AlbersEqualArea {
    a: f64,
    k1: f64,
    es: f64,
    e2: f64,
    e2m: f64,
    n: f64,
    c: f64,
    /// Reduced parallel radius on the first standard parallel
    m1: f64,
    /// Authalic function at the pole
    qp: f64,
    rho0: f64,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl AlbersEqualArea {
    /// Conic with scale `k1` along both standard parallels
    pub fn new(ellipsoid: Ellipsoid, lat1: f64, lat2: f64, k1: f64) -> Result<Self> {
        let a = ellipsoid.equatorial_radius();
        check_radius_and_scale(a, ellipsoid.flattening(), k1)?;
        check_standard_parallel(lat1)?;
        check_standard_parallel(lat2)?;
        if lat1 == -lat2 && lat1.abs() == 90.0 {
            return Err(ProjError::InvalidParameter(
                "Standard latitudes cannot be opposite poles".to_string(),
            ));
        }

        let e2 = ellipsoid.e2();
        let mut proj = Self {
            a,
            k1,
            es: ellipsoid.es(),
            e2,
            e2m: 1.0 - e2,
            n: 0.0,
            c: 0.0,
            m1: 0.0,
            qp: 0.0,
            rho0: 0.0,
        };
        proj.qp = proj.authalic(90.0);

        let (m1sq, q1) = (proj.parallel_radius_sq(lat1), proj.authalic(lat1));
        proj.n = if lat1 == lat2 {
            (lat1 * DEGREE).sin()
        } else {
            (m1sq - proj.parallel_radius_sq(lat2)) / (proj.authalic(lat2) - q1)
        };
        proj.c = m1sq + proj.n * q1;
        proj.m1 = m1sq.sqrt();
        if proj.n != 0.0 {
            proj.rho0 = proj.cone_radius(proj.n.asin() / DEGREE);
        }

        tracing::debug!(n = proj.n, c = proj.c, rho0 = proj.rho0, "Albers equal area constructed");
        Ok(proj)
    }

    /// Tangent conic with scale `k0` on its single standard parallel
    pub fn with_single_parallel(ellipsoid: Ellipsoid, lat: f64, k0: f64) -> Result<Self> {
        Self::new(ellipsoid, lat, lat, k0)
    }

    /// Cone constant
    #[inline]
    pub fn cone_constant(&self) -> f64 {
        self.n
    }

    /// Square of `cos(phi) / sqrt(1 - e^2 sin^2(phi))`
    fn parallel_radius_sq(&self, lat: f64) -> f64 {
        let phi = lat * DEGREE;
        let (s, c) = phi.sin_cos();
        c * c / (1.0 - self.e2 * s * s)
    }

    /// Authalic function q(phi), equal to 2 sin(phi) on a sphere
    fn authalic(&self, lat: f64) -> f64 {
        let s = (lat * DEGREE).sin();
        self.e2m * (s / (1.0 - self.e2 * s * s) + atanhee(s, self.es))
    }

    fn cone_radius(&self, lat: f64) -> f64 {
        let q = self.authalic(lat);
        self.a * self.k1 * (self.c - self.n * q).max(0.0).sqrt() / self.n
    }

    /// Latitude in degrees whose authalic function is `q`
    fn latitude_from_authalic(&self, q: f64) -> f64 {
        if q.abs() >= self.qp {
            return 90.0_f64.copysign(q);
        }
        let mut phi = (q / self.qp).clamp(-1.0, 1.0).asin();
        for _ in 0..MAX_ITERATIONS {
            let (s, c) = phi.sin_cos();
            let w = 1.0 - self.e2 * s * s;
            let dphi = w * w / (2.0 * c) * (q / self.e2m - s / w - atanhee(s, self.es));
            phi += dphi;
            if !(dphi.abs() >= 1e-15) {
                break;
            }
        }
        phi / DEGREE
    }

    fn point_scale(&self, lat: f64, q: f64) -> f64 {
        let m = self.parallel_radius_sq(lat).sqrt();
        if self.n == 0.0 {
            return self.k1 * self.m1 / m;
        }
        self.k1 * (self.c - self.n * q).max(0.0).sqrt() / m
    }

    pub fn forward(&self, lon0: f64, lat: f64, lon: f64) -> Result<TransformResult> {
        check_latitude(lat)?;
        let lam = ang_diff(lon0, lon);
        let q = self.authalic(lat);

        if self.n == 0.0 {
            let x = self.a * self.k1 * self.m1 * lam * DEGREE;
            let y = self.a * self.k1 * q / (2.0 * self.m1);
            return Ok(TransformResult::new(x, y, 0.0, self.point_scale(lat, q)));
        }

        let rho = self.a * self.k1 * (self.c - self.n * q).max(0.0).sqrt() / self.n;
        let theta = self.n * lam * DEGREE;
        Ok(TransformResult::new(
            rho * theta.sin(),
            self.rho0 - rho * theta.cos(),
            self.n * lam,
            self.point_scale(lat, q),
        ))
    }

    pub fn reverse(&self, lon0: f64, x: f64, y: f64) -> Result<TransformResult> {
        check_finite(x, "Easting")?;
        check_finite(y, "Northing")?;

        let (lam, q) = if self.n == 0.0 {
            (
                x / (self.a * self.k1 * self.m1) / DEGREE,
                2.0 * y * self.m1 / (self.a * self.k1),
            )
        } else {
            let sign = self.n.signum();
            let dy = self.rho0 - y;
            let lam = (sign * x).atan2(sign * dy) / self.n / DEGREE;
            let r = x.hypot(dy) * self.n / (self.a * self.k1);
            (lam, (self.c - r * r) / self.n)
        };
        let lat = self.latitude_from_authalic(q);
        Ok(TransformResult::new(
            ang_normalize(lon0 + lam),
            lat,
            self.n * lam,
            self.point_scale(lat, q),
        ))
    }
}

impl ConicProjection for AlbersEqualArea {
    fn forward(&self, lon0: f64, lat: f64, lon: f64) -> Result<TransformResult> {
        AlbersEqualArea::forward(self, lon0, lat, lon)
    }

    fn reverse(&self, lon0: f64, x: f64, y: f64) -> Result<TransformResult> {
        AlbersEqualArea::reverse(self, lon0, x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Datum;

    fn assert_round_trip(proj: &AlbersEqualArea) {
        let lon0 = -96.0;
        for lat in [-80.0, -45.0, -10.0, 0.0, 12.3, 33.0, 45.0, 60.0, 80.0] {
            for lon in [-170.0, -96.0, -30.0, 0.0, 10.0, 75.0] {
                let fwd = proj.forward(lon0, lat, lon).unwrap();
                let rev = proj.reverse(lon0, fwd.position.x, fwd.position.y).unwrap();
                assert!((rev.latitude() - lat).abs() < 1e-8, "lat {lat} lon {lon}");
                assert!(ang_diff(lon, rev.longitude()).abs() < 1e-8, "lat {lat} lon {lon}");
            }
        }
    }

    #[test]
    fn test_round_trips() {
        let wge = Ellipsoid::default();
        assert_round_trip(&AlbersEqualArea::new(wge, 29.5, 45.5, 1.0).unwrap());
        assert_round_trip(&AlbersEqualArea::with_single_parallel(wge, 40.0, 1.0).unwrap());
        assert_round_trip(&AlbersEqualArea::new(wge, -20.0, -50.0, 1.0).unwrap());
        assert_round_trip(&AlbersEqualArea::new(Datum::TestSphere.ellipsoid(), 20.0, 60.0, 1.0).unwrap());
    }

    #[test]
    fn test_cylindrical_limit() {
        let proj = AlbersEqualArea::new(Ellipsoid::default(), 30.0, -30.0, 1.0).unwrap();
        assert_eq!(proj.cone_constant(), 0.0);
        assert_round_trip(&proj);
    }

    #[test]
    fn test_cylindrical_limit_scales_with_k1() {
        let wge = Ellipsoid::default();
        let unit = AlbersEqualArea::new(wge, 30.0, -30.0, 1.0).unwrap();
        let doubled = AlbersEqualArea::new(wge, 30.0, -30.0, 2.0).unwrap();
        let near = AlbersEqualArea::new(wge, 30.0, -29.9999, 2.0).unwrap();
        assert_ne!(near.cone_constant(), 0.0);

        let y1 = unit.forward(0.0, 40.0, 0.0).unwrap().position.y;
        let y2 = doubled.forward(0.0, 40.0, 0.0).unwrap().position.y;
        let y_near = near.forward(0.0, 40.0, 0.0).unwrap().position.y;
        assert!((y2 / y1 - 2.0).abs() < 1e-12);
        assert!((y2 / y_near - 1.0).abs() < 1e-5, "{y2} vs {y_near}");

        let x2 = doubled.forward(0.0, 40.0, 10.0).unwrap().position.x;
        let x_near = near.forward(0.0, 40.0, 10.0).unwrap().position.x;
        assert!((x2 / x_near - 1.0).abs() < 1e-5, "{x2} vs {x_near}");

        let back = doubled.reverse(0.0, x2, y2).unwrap();
        assert!((back.latitude() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_scale_on_standard_parallels() {
        let proj = AlbersEqualArea::new(Ellipsoid::default(), 29.5, 45.5, 1.0).unwrap();
        for lat in [29.5, 45.5] {
            let fwd = proj.forward(-96.0, lat, -90.0).unwrap();
            assert!((fwd.scale - 1.0).abs() < 1e-12, "lat {lat}");
        }
    }

    #[test]
    fn test_sphere_cone_constant() {
        let proj = AlbersEqualArea::new(Datum::TestSphere.ellipsoid(), 20.0, 60.0, 1.0).unwrap();
        let expected = (20.0_f64.to_radians().sin() + 60.0_f64.to_radians().sin()) / 2.0;
        assert!((proj.cone_constant() - expected).abs() < 1e-15);
    }

    #[test]
    fn test_opposite_poles_rejected() {
        assert!(AlbersEqualArea::new(Ellipsoid::default(), 90.0, -90.0, 1.0).is_err());
    }
}
