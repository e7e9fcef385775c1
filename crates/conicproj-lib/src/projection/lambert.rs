//! Lambert Conformal Conic on an ellipsoid.
//!
//! One implementation covers the whole conformal family: the tangent and secant
//! conics, Mercator (cone constant 0, standard parallels symmetric about the
//! equator) and polar stereographic (cone constant ±1, standard parallel at a pole).
//!
//! With `psi` the isometric latitude and `m` the reduced parallel radius, the cone
//! radius is `rho = a k1 / n * exp(ln_c - n psi)` and the point scale is
//! `k = k1 * exp(ln_c - n psi) / m`, where `ln_c = ln m1 + n psi1` pins the scale to
//! `k1` on the standard parallels. Northings are measured from the latitude of
//! minimum scale, `asin(n)`.

use super::{
    ConicProjection, TransformResult, check_finite, check_latitude, check_radius_and_scale,
    check_standard_parallel,
};
use crate::math::{
    DEGREE, ang_diff, ang_normalize, eatanhe, isometric_latitude, latitude_from_isometric,
    ln_parallel_radius, taupf,
};
use crate::{Ellipsoid, ProjError, Result};

/// Lambert Conformal Conic projection with one or two standard parallels
#[derive(Debug, Clone)]
pub struct LambertConformalConic {
    a: f64,
    k1: f64,
    es: f64,
    e2m: f64,
    /// Cone constant
    n: f64,
    /// `ln m1 + n psi1`, the same on both standard parallels
    ln_c: f64,
    /// Cone radius at the latitude of minimum scale
    rho0: f64,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl LambertConformalConic {
    /// Secant (or tangent, when both are equal) conic with scale `k1` on both standard parallels
    pub fn new(ellipsoid: Ellipsoid, lat1: f64, lat2: f64, k1: f64) -> Result<Self> {
        let a = ellipsoid.equatorial_radius();
        check_radius_and_scale(a, ellipsoid.flattening(), k1)?;
        check_standard_parallel(lat1)?;
        check_standard_parallel(lat2)?;

        let es = ellipsoid.es();
        let e2m = 1.0 - ellipsoid.e2();

        let (n, ln_c) = if lat1 == lat2 {
            if lat1.abs() == 90.0 {
                // Polar limit of m1 * exp(n psi1)
                let n = 1.0_f64.copysign(lat1);
                (n, std::f64::consts::LN_2 - 0.5 * e2m.ln() - eatanhe(1.0, es))
            } else {
                let n = (lat1 * DEGREE).sin();
                (n, ln_parallel_radius(lat1, e2m) + n * isometric_latitude(lat1, es))
            }
        } else {
            if lat1.abs() == 90.0 || lat2.abs() == 90.0 {
                return Err(ProjError::InvalidParameter(format!(
                    "Standard latitudes {lat1}d and {lat2}d: a polar parallel must be repeated"
                )));
            }
            let (lnm1, lnm2) = (ln_parallel_radius(lat1, e2m), ln_parallel_radius(lat2, e2m));
            let (psi1, psi2) = (isometric_latitude(lat1, es), isometric_latitude(lat2, es));
            let n = (lnm1 - lnm2) / (psi2 - psi1);
            (n, lnm1 + n * psi1)
        };

        let rho0 = if n == 0.0 || n.abs() == 1.0 {
            0.0
        } else {
            let psi0 = taupf(n / (1.0 - n * n).sqrt(), es).asinh();
            a * k1 / n * (ln_c - n * psi0).exp()
        };

        tracing::debug!(n, ln_c, rho0, "Lambert conformal conic constructed");

        Ok(Self {
            a,
            k1,
            es,
            e2m,
            n,
            ln_c,
            rho0,
        })
    }

    /// Tangent conic with scale `k0` on its single standard parallel
    pub fn with_single_parallel(ellipsoid: Ellipsoid, lat: f64, k0: f64) -> Result<Self> {
        Self::new(ellipsoid, lat, lat, k0)
    }

    /// Cone constant (0 for Mercator, ±1 for polar stereographic)
    #[inline]
    pub fn cone_constant(&self) -> f64 {
        self.n
    }

    /// Latitude of minimum scale, where northings are zero on the central meridian
    #[inline]
    pub fn origin_latitude(&self) -> f64 {
        self.n.asin() / DEGREE
    }

    /// Scale on the standard parallels
    #[inline]
    pub fn central_scale(&self) -> f64 {
        self.k1
    }

    /// Point scale from the isometric latitude, handling the apex pole
    fn point_scale(&self, lat: f64, psi: f64) -> f64 {
        if lat.abs() == 90.0 && self.n * psi > 0.0 {
            return if self.n.abs() == 1.0 { self.k1 } else { f64::INFINITY };
        }
        self.k1 * (self.ln_c - self.n * psi - ln_parallel_radius(lat, self.e2m)).exp()
    }

    pub fn forward(&self, lon0: f64, lat: f64, lon: f64) -> Result<TransformResult> {
        check_latitude(lat)?;
        let lam = ang_diff(lon0, lon);
        let psi = isometric_latitude(lat, self.es);

        if self.n == 0.0 {
            check_finite(psi, "Mercator northing at the pole")?;
            let m1 = self.ln_c.exp();
            let x = self.a * self.k1 * m1 * lam * DEGREE;
            let y = self.a * self.k1 * m1 * psi;
            return Ok(TransformResult::new(x, y, 0.0, self.point_scale(lat, psi)));
        }

        let rho = self.a * self.k1 / self.n * (self.ln_c - self.n * psi).exp();
        check_finite(rho, "Cone radius at the opposite pole")?;
        let theta = self.n * lam * DEGREE;
        let x = rho * theta.sin();
        let y = self.rho0 - rho * theta.cos();
        Ok(TransformResult::new(
            x,
            y,
            self.n * lam,
            self.point_scale(lat, psi),
        ))
    }

    pub fn reverse(&self, lon0: f64, x: f64, y: f64) -> Result<TransformResult> {
        check_finite(x, "Easting")?;
        check_finite(y, "Northing")?;

        if self.n == 0.0 {
            let m1 = self.ln_c.exp();
            let lam = x / (self.a * self.k1 * m1) / DEGREE;
            let psi = y / (self.a * self.k1 * m1);
            let lat = latitude_from_isometric(psi, self.es);
            return Ok(TransformResult::new(
                ang_normalize(lon0 + lam),
                lat,
                0.0,
                self.point_scale(lat, psi),
            ));
        }

        let sign = self.n.signum();
        let dy = self.rho0 - y;
        let r = x.hypot(dy);
        let lam = (sign * x).atan2(sign * dy) / self.n / DEGREE;
        let (lat, psi) = if r == 0.0 {
            (90.0 * sign, f64::INFINITY * sign)
        } else {
            let psi = (self.ln_c - (r * self.n.abs() / (self.a * self.k1)).ln()) / self.n;
            (latitude_from_isometric(psi, self.es), psi)
        };
        Ok(TransformResult::new(
            ang_normalize(lon0 + lam),
            lat,
            self.n * lam,
            self.point_scale(lat, psi),
        ))
    }
}

impl ConicProjection for LambertConformalConic {
    fn forward(&self, lon0: f64, lat: f64, lon: f64) -> Result<TransformResult> {
        LambertConformalConic::forward(self, lon0, lat, lon)
    }

    fn reverse(&self, lon0: f64, x: f64, y: f64) -> Result<TransformResult> {
        LambertConformalConic::reverse(self, lon0, x, y)
    }
}
