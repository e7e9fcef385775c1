//! Decoding of angles written in degrees, minutes and seconds.
//!
//! Accepted notation:
//!
//! ```text
//! Decimal:          40.5   -75.25   1.5e1
//! Unit markers:     40d30'15"   40°30'   40*30'15''
//! Colon-separated:  40:30:15.5
//! Hemisphere:       40d30'N   W75.5   75:15E
//! ```
//!
//! A sign may only lead the string. Only the last component may carry a
//! fractional part, and minutes or seconds must be below 60. A hemisphere letter
//! may appear first or last; `S` and `W` negate the value and also tag whether
//! the angle is a latitude or a longitude.

use crate::{ProjError, Result};
use once_cell::sync::Lazy;
use regex::Regex;

/// What a hemisphere letter says about an angle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hemisphere {
    /// No hemisphere letter was given
    None,
    /// `N` or `S`
    Latitude,
    /// `E` or `W`
    Longitude,
}

impl Hemisphere {
    fn other(self) -> Self {
        match self {
            Hemisphere::Latitude => Hemisphere::Longitude,
            Hemisphere::Longitude => Hemisphere::Latitude,
            Hemisphere::None => Hemisphere::None,
        }
    }
}

/// One numeric component followed by an optional unit marker
static COMPONENT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?x)
        ^\s*
        (\d+\.?\d*(?:[eE][+-]?\d+)?|\.\d+(?:[eE][+-]?\d+)?)   # number
        \s*
        (''|[dD°*'":])?                                        # unit marker
        \s*
        "#,
    )
    .expect("component pattern is valid")
});

fn bad(s: &str, why: &str) -> ProjError {
    ProjError::InputFormat(format!("{why} in {s}"))
}

/// Split a leading or trailing hemisphere letter off `s`
fn split_hemisphere(s: &str) -> Result<(&str, Hemisphere, f64)> {
    let classify = |c: char| match c.to_ascii_uppercase() {
        'N' => Some((Hemisphere::Latitude, 1.0)),
        'S' => Some((Hemisphere::Latitude, -1.0)),
        'E' => Some((Hemisphere::Longitude, 1.0)),
        'W' => Some((Hemisphere::Longitude, -1.0)),
        _ => None,
    };
    let first = s.chars().next().and_then(classify);
    let last = s.chars().last().and_then(classify);
    match (first, last) {
        (Some(_), Some(_)) if s.chars().count() > 1 => {
            Err(bad(s, "Hemisphere indicator given twice"))
        }
        (Some((h, sign)), _) => Ok((s[1..].trim_start(), h, sign)),
        (None, Some((h, sign))) => Ok((s[..s.len() - 1].trim_end(), h, sign)),
        (None, None) => Ok((s, Hemisphere::None, 1.0)),
    }
}

/// Decode an angle in degrees together with its hemisphere tag
pub fn decode(dms: &str) -> Result<(f64, Hemisphere)> {
    let s = dms.trim();
    if s.is_empty() {
        return Err(ProjError::InputFormat("Empty or incomplete DMS string".to_string()));
    }
    let (body, hemisphere, hemisphere_sign) = split_hemisphere(s)?;
    let (body, sign) = match body.strip_prefix('-') {
        Some(rest) => (rest, -1.0),
        None => (body.strip_prefix('+').unwrap_or(body), 1.0),
    };
    if body.is_empty() {
        return Err(bad(dms, "Missing number"));
    }

    let mut components = [0.0_f64; 3];
    let mut next = 0usize;
    let mut rest = body;
    let mut last_fractional = false;
    while !rest.is_empty() {
        let caps = COMPONENT_REGEX
            .captures(rest)
            .ok_or_else(|| bad(dms, "Unexpected characters"))?;
        let whole = caps.get(0).map_or(0, |m| m.end());
        let number = &caps[1];
        if last_fractional {
            return Err(bad(dms, "Only the last component may have a fraction"));
        }
        let value: f64 = number
            .parse()
            .map_err(|_| bad(dms, "Cannot decode number"))?;
        let index = match caps.get(2).map(|m| m.as_str()) {
            Some("d" | "D" | "°" | "*") => 0,
            Some("'") => 1,
            Some("\"" | "''") => 2,
            Some(":") | None => next,
            Some(other) => return Err(bad(dms, &format!("Unknown marker {other}"))),
        };
        if index < next || index > 2 {
            return Err(bad(dms, "Components out of order"));
        }
        if next > 0 && number.contains(['e', 'E']) {
            return Err(bad(dms, "Exponent in a minutes or seconds component"));
        }
        components[index] = value;
        next = index + 1;
        last_fractional = value.fract() != 0.0 || number.contains('.');
        rest = &rest[whole..];
    }

    let [degrees, minutes, seconds] = components;
    if minutes >= 60.0 {
        return Err(bad(dms, "Minutes not in range [0, 60)"));
    }
    if seconds >= 60.0 {
        return Err(bad(dms, "Seconds not in range [0, 60)"));
    }
    let value = hemisphere_sign * sign * (degrees + (minutes + seconds / 60.0) / 60.0);
    Ok((value, hemisphere))
}

/// Decode a latitude/longitude pair
///
/// Hemisphere letters decide which token is the latitude; without them
/// `longfirst` does. Both tokens tagged the same way is an error.
pub fn decode_lat_lon(a: &str, b: &str, longfirst: bool) -> Result<(f64, f64)> {
    let (va, mut ia) = decode(a)?;
    let (vb, mut ib) = decode(b)?;
    match (ia, ib) {
        (Hemisphere::None, Hemisphere::None) => {
            (ia, ib) = if longfirst {
                (Hemisphere::Longitude, Hemisphere::Latitude)
            } else {
                (Hemisphere::Latitude, Hemisphere::Longitude)
            };
        }
        (Hemisphere::None, _) => ia = ib.other(),
        (_, Hemisphere::None) => ib = ia.other(),
        _ => {}
    }
    if ia == ib {
        let kind = if ia == Hemisphere::Latitude { "latitudes" } else { "longitudes" };
        return Err(ProjError::InputFormat(format!(
            "Both {a} and {b} interpreted as {kind}"
        )));
    }
    let (lat, lon) = if ia == Hemisphere::Latitude { (va, vb) } else { (vb, va) };
    if lat.abs() > 90.0 {
        return Err(ProjError::OutOfRange(format!("Latitude {lat}d not in [-90d, 90d]")));
    }
    Ok((lat, lon))
}

/// Decode an angle that must not carry an `E`/`W` hemisphere
pub fn decode_latitude(s: &str) -> Result<f64> {
    match decode(s)? {
        (_, Hemisphere::Longitude) => Err(ProjError::InputFormat("Bad hemisphere".to_string())),
        (value, _) => Ok(value),
    }
}

/// Decode an angle that must not carry an `N`/`S` hemisphere
pub fn decode_longitude(s: &str) -> Result<f64> {
    match decode(s)? {
        (_, Hemisphere::Latitude) => Err(ProjError::InputFormat("Bad hemisphere".to_string())),
        (value, _) => Ok(value),
    }
}

/// Parse a plain decimal number, rejecting trailing garbage
pub fn parse_number(s: &str) -> Result<f64> {
    let t = s.trim();
    match t.to_ascii_lowercase().as_str() {
        "nan" => return Ok(f64::NAN),
        "inf" | "+inf" => return Ok(f64::INFINITY),
        "-inf" => return Ok(f64::NEG_INFINITY),
        _ => {}
    }
    t.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ProjError::InputFormat(format!("Cannot decode {s} as a number")))
}

/// Parse a number that may be written as a fraction `p/q`
pub fn parse_fraction(s: &str) -> Result<f64> {
    match s.split_once('/') {
        Some((num, den)) => Ok(parse_number(num)? / parse_number(den)?),
        None => parse_number(s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_decimal_and_sexagesimal() {
        assert_eq!(decode("40.5").unwrap(), (40.5, Hemisphere::None));
        assert_eq!(decode("-75.25").unwrap().0, -75.25);
        assert!(close(decode("40d30'15\"").unwrap().0, 40.0 + 30.0 / 60.0 + 15.0 / 3600.0));
        assert!(close(decode("40°30'").unwrap().0, 40.5));
        assert!(close(decode("40*30'15''").unwrap().0, 40.0 + 30.0 / 60.0 + 15.0 / 3600.0));
        assert!(close(decode("40:30:36").unwrap().0, 40.51));
        assert!(close(decode("-0:30").unwrap().0, -0.5));
        assert!(close(decode("1.5e1").unwrap().0, 15.0));
    }

    #[test]
    fn test_hemisphere_letters() {
        assert_eq!(decode("40d30'N").unwrap(), (40.5, Hemisphere::Latitude));
        assert_eq!(decode("S40.5").unwrap(), (-40.5, Hemisphere::Latitude));
        assert_eq!(decode("W75.5").unwrap(), (-75.5, Hemisphere::Longitude));
        assert_eq!(decode("75:30e").unwrap(), (75.5, Hemisphere::Longitude));
    }

    #[test]
    fn test_malformed_strings() {
        assert!(decode("").is_err());
        assert!(decode("abc").is_err());
        assert!(decode("40.5d30'").is_err());
        assert!(decode("40d60'").is_err());
        assert!(decode("40d30'75\"").is_err());
        assert!(decode("40'30d").is_err());
        assert!(decode("N40S").is_err());
        assert!(decode("40-30").is_err());
    }

    #[test]
    fn test_lat_lon_order() {
        assert_eq!(decode_lat_lon("33", "-96", false).unwrap(), (33.0, -96.0));
        assert_eq!(decode_lat_lon("-96", "33", true).unwrap(), (33.0, -96.0));
        // Hemisphere letters override the order flag
        assert_eq!(decode_lat_lon("96W", "33N", false).unwrap(), (33.0, -96.0));
        assert_eq!(decode_lat_lon("96W", "33", false).unwrap(), (33.0, -96.0));
        assert!(decode_lat_lon("33N", "34S", false).is_err());
        assert!(decode_lat_lon("91", "0", false).is_err());
    }

    #[test]
    fn test_bad_hemisphere() {
        assert_eq!(decode_latitude("33N").unwrap(), 33.0);
        assert!(decode_latitude("33E").is_err());
        assert_eq!(decode_longitude("96W").unwrap(), -96.0);
        assert!(decode_longitude("96N").is_err());
    }

    #[test]
    fn test_numbers_and_fractions() {
        assert_eq!(parse_number(" 1.25 ").unwrap(), 1.25);
        assert!(parse_number("1.25x").is_err());
        assert!(parse_number("nan").unwrap().is_nan());
        assert!((parse_fraction("1/298.257223563").unwrap() - 1.0 / 298.257223563).abs() < 1e-18);
        assert_eq!(parse_fraction("0").unwrap(), 0.0);
    }
}
