//! Numeric helpers shared by the projections: angle normalization and the
//! conformal/isometric latitude transforms on an ellipsoid.

/// Radians per degree
pub const DEGREE: f64 = std::f64::consts::PI / 180.0;

/// Machine epsilon for the working precision
pub const EPSILON: f64 = f64::EPSILON;

/// Maximum number of Newton steps when inverting the conformal latitude
const TAUF_ITERATIONS: usize = 5;

/// Normalize an angle in degrees into [-180, 180)
#[inline]
pub fn ang_normalize(x: f64) -> f64 {
    let y = x.rem_euclid(360.0);
    if y >= 180.0 { y - 360.0 } else { y }
}

/// Difference `y - x` in degrees, reduced into (-180, 180]
#[inline]
pub fn ang_diff(x: f64, y: f64) -> f64 {
    let mut d = (y - x) % 360.0;
    if d > 180.0 {
        d -= 360.0;
    } else if d <= -180.0 {
        d += 360.0;
    }
    d
}

/// Signed eccentricity from a flattening: positive for oblate, negative for prolate
#[inline]
pub fn signed_eccentricity(f: f64) -> f64 {
    let e2 = f * (2.0 - f);
    e2.abs().sqrt().copysign(e2)
}

/// `es * atanh(es * x)` for oblate ellipsoids, the analytic continuation for prolate ones
#[inline]
pub fn eatanhe(x: f64, es: f64) -> f64 {
    if es > 0.0 {
        es * (es * x).atanh()
    } else {
        -es * (es * x).atan()
    }
}

/// `atanh(es * x) / es`, which tends to `x` on a sphere
#[inline]
pub fn atanhee(x: f64, es: f64) -> f64 {
    if es > 0.0 {
        (es * x).atanh() / es
    } else if es < 0.0 {
        (-es * x).atan() / -es
    } else {
        x
    }
}

/// Tangent of the conformal latitude given the tangent of the geodetic latitude
#[inline]
pub fn taupf(tau: f64, es: f64) -> f64 {
    if !tau.is_finite() {
        return tau;
    }
    let tau1 = 1.0_f64.hypot(tau);
    let sig = eatanhe(tau / tau1, es).sinh();
    1.0_f64.hypot(sig) * tau - sig * tau1
}

/// Tangent of the geodetic latitude given the tangent of the conformal latitude
///
/// Newton's method started from a guess that is already close for all latitudes;
/// converges to full precision in two or three steps.
pub fn tauf(taup: f64, es: f64) -> f64 {
    if !taup.is_finite() {
        return taup;
    }
    let e2m = 1.0 - es * es.abs();
    let mut tau = if taup.abs() > 70.0 {
        taup * eatanhe(1.0, es).exp()
    } else {
        taup / e2m
    };
    let stol = EPSILON.sqrt() / 10.0 * taup.abs().max(1.0);
    for _ in 0..TAUF_ITERATIONS {
        let taupa = taupf(tau, es);
        let dtau = (taup - taupa) * (1.0 + e2m * tau * tau)
            / (e2m * 1.0_f64.hypot(tau) * 1.0_f64.hypot(taupa));
        tau += dtau;
        if !(dtau.abs() >= stol) {
            break;
        }
    }
    tau
}

/// Tangent of a latitude given in degrees, exact at the poles
#[inline]
pub fn tand(lat: f64) -> f64 {
    if lat.abs() == 90.0 {
        f64::INFINITY.copysign(lat)
    } else {
        (lat * DEGREE).tan()
    }
}

/// Latitude in degrees from its tangent
#[inline]
pub fn atand(tau: f64) -> f64 {
    tau.atan() / DEGREE
}

/// Isometric latitude psi for a latitude in degrees
#[inline]
pub fn isometric_latitude(lat: f64, es: f64) -> f64 {
    taupf(tand(lat), es).asinh()
}

/// Latitude in degrees from the isometric latitude
#[inline]
pub fn latitude_from_isometric(psi: f64, es: f64) -> f64 {
    atand(tauf(psi.sinh(), es))
}

/// Natural log of the reduced parallel radius `cos(phi) / sqrt(1 - e^2 sin^2(phi))`
#[inline]
pub fn ln_parallel_radius(lat: f64, e2m: f64) -> f64 {
    let tau = tand(lat);
    -0.5 * (e2m * tau * tau).ln_1p()
}

#[cfg(test)]
mod tests {
    use super::*;

    const WGS84_ES: f64 = 0.081_819_190_842_621_5;

    #[test]
    fn test_ang_normalize() {
        assert_eq!(ang_normalize(0.0), 0.0);
        assert_eq!(ang_normalize(180.0), -180.0);
        assert_eq!(ang_normalize(-180.0), -180.0);
        assert_eq!(ang_normalize(190.0), -170.0);
        assert_eq!(ang_normalize(-540.0), -180.0);
        assert!((ang_normalize(359.5) + 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_ang_diff_half_open_interval() {
        assert_eq!(ang_diff(0.0, 180.0), 180.0);
        assert_eq!(ang_diff(180.0, 0.0), 180.0);
        assert_eq!(ang_diff(170.0, -170.0), 20.0);
        assert_eq!(ang_diff(-170.0, 170.0), -20.0);
    }

    #[test]
    fn test_tauf_inverts_taupf() {
        for lat in [-89.9, -60.0, -12.5, 0.0, 1e-9, 33.0, 45.0, 80.0, 89.999] {
            let tau = tand(lat);
            let back = tauf(taupf(tau, WGS84_ES), WGS84_ES);
            assert!((atand(back) - lat).abs() < 1e-12, "lat {lat}");
        }
    }

    #[test]
    fn test_isometric_latitude_on_sphere() {
        let lat = 40.0_f64;
        let expected = (std::f64::consts::FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln();
        assert!((isometric_latitude(lat, 0.0) - expected).abs() < 1e-14);
        assert!((latitude_from_isometric(expected, 0.0) - lat).abs() < 1e-12);
    }

    #[test]
    fn test_ln_parallel_radius_at_pole() {
        let e2m = 1.0 - WGS84_ES * WGS84_ES;
        assert_eq!(ln_parallel_radius(90.0, e2m), f64::NEG_INFINITY);
        assert_eq!(ln_parallel_radius(0.0, e2m), 0.0);
    }

    #[test]
    fn test_atanhee_sphere_limit() {
        assert_eq!(atanhee(0.3, 0.0), 0.3);
        assert!((atanhee(0.3, 1e-8) - 0.3).abs() < 1e-12);
    }
}
