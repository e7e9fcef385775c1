//! Maps a projection-family name and its header fields to a canonical
//! parameter set, and builds the projection instance for it.

use crate::projection::{
    ConicProjection, LambertConformalConic, PolarStereographic, TransformResult,
    TransverseMercator,
};
use crate::{Ellipsoid, ProjError, ReferenceHeader, Result};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Longitude at which the polar true-scale probe is evaluated
const POLAR_PROBE_LONGITUDE: f64 = 10.0;

/// Projection families recognized in reference headers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ProjectionFamily {
    /// Conformal conic with a single standard parallel
    Conic1,
    /// Conformal conic with two standard parallels
    Conic2,
    Mercator,
    PolarStereo,
    TransverseMercator,
}

impl ProjectionFamily {
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "Lambert Conformal Conic (1 parallel)" => Ok(ProjectionFamily::Conic1),
            "Lambert Conformal Conic (2 parallel)" => Ok(ProjectionFamily::Conic2),
            "Mercator" => Ok(ProjectionFamily::Mercator),
            "Polar Stereographic" => Ok(ProjectionFamily::PolarStereo),
            "Transverse Mercator" => Ok(ProjectionFamily::TransverseMercator),
            other => Err(ProjError::UnsupportedProjection(other.to_string())),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ProjectionFamily::Conic1 => "Lambert Conformal Conic (1 parallel)",
            ProjectionFamily::Conic2 => "Lambert Conformal Conic (2 parallel)",
            ProjectionFamily::Mercator => "Mercator",
            ProjectionFamily::PolarStereo => "Polar Stereographic",
            ProjectionFamily::TransverseMercator => "Transverse Mercator",
        }
    }
}

/// Which implementation evaluates a resolved configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ProjectionKind {
    /// Lambert conformal conic, including its Mercator and polar limits
    Conic,
    /// Dedicated polar stereographic
    Polar,
    Transverse,
}

/// Canonical, immutable parameter set of one projection
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProjectionConfig {
    pub family: ProjectionFamily,
    pub kind: ProjectionKind,
    pub ellipsoid: Ellipsoid,
    pub central_meridian: f64,
    pub origin_latitude: f64,
    pub standard_parallel_1: f64,
    pub standard_parallel_2: f64,
    pub scale_factor: f64,
    pub false_easting: f64,
    pub false_northing: f64,
}

fn require(value: f64, field: &'static str) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ProjError::MissingField(field))
    }
}

fn or_default(value: f64, default: f64) -> f64 {
    if value.is_finite() { value } else { default }
}

/// Resolve the projection named `name` from the numeric fields of `header`
///
/// Fails with [`ProjError::UnsupportedProjection`] for an unknown family and
/// with [`ProjError::MissingField`] when a field the family needs is unset.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn resolve_projection(
    name: &str,
    header: &ReferenceHeader,
    ellipsoid: Ellipsoid,
) -> Result<ProjectionConfig> {
    let family = ProjectionFamily::from_name(name)?;
    let false_easting = require(header.false_easting, "FALSE EASTING")?;
    let false_northing = require(header.false_northing, "FALSE NORTHING")?;

    let mut kind = ProjectionKind::Conic;
    let (central_meridian, origin_latitude, lat1, lat2, scale_factor) = match family {
        ProjectionFamily::Conic1 => {
            let lat0 = require(header.origin_latitude, "ORIGIN LATITUDE")?;
            (
                require(header.central_meridian, "CENTRAL MERIDIAN")?,
                lat0,
                lat0,
                lat0,
                require(header.scale_factor, "SCALE FACTOR")?,
            )
        }
        ProjectionFamily::Conic2 => (
            require(header.central_meridian, "CENTRAL MERIDIAN")?,
            require(header.origin_latitude, "ORIGIN LATITUDE")?,
            require(header.standard_parallel_one, "STANDARD PARALLEL ONE")?,
            require(header.standard_parallel_two, "STANDARD PARALLEL TWO")?,
            1.0,
        ),
        ProjectionFamily::Mercator => {
            let latts = or_default(header.latitude_of_true_scale, 0.0);
            (
                require(header.central_meridian, "CENTRAL MERIDIAN")?,
                0.0,
                latts,
                -latts,
                or_default(header.scale_factor, 1.0),
            )
        }
        ProjectionFamily::PolarStereo => {
            let lon0 = require(header.longitude_down_from_pole, "LONGITUDE DOWN FROM POLE")?;
            let latts = header.latitude_of_true_scale;
            let mut lat0 = 90.0;
            let mut k1 = or_default(header.scale_factor, 1.0);
            if latts.is_finite() {
                if latts < 0.0 {
                    lat0 = -lat0;
                }
                // Scale at the true-scale latitude of a unit-scale conic at the pole
                let probe = LambertConformalConic::new(ellipsoid, lat0, lat0, 1.0)?.forward(
                    0.0,
                    latts,
                    POLAR_PROBE_LONGITUDE,
                )?;
                k1 = 1.0 / probe.scale;
            }
            if lon0 == 0.0 {
                kind = ProjectionKind::Polar;
            }
            (lon0, lat0, lat0, lat0, k1)
        }
        ProjectionFamily::TransverseMercator => {
            let lat0 = require(header.origin_latitude, "ORIGIN LATITUDE")?;
            kind = ProjectionKind::Transverse;
            (
                require(header.central_meridian, "CENTRAL MERIDIAN")?,
                lat0,
                lat0,
                lat0,
                require(header.scale_factor, "SCALE FACTOR")?,
            )
        }
    };

    let config = ProjectionConfig {
        family,
        kind,
        ellipsoid,
        central_meridian,
        origin_latitude,
        standard_parallel_1: lat1,
        standard_parallel_2: lat2,
        scale_factor,
        false_easting,
        false_northing,
    };
    tracing::debug!(?config, "Resolved projection configuration");
    Ok(config)
}

impl ProjectionConfig {
    /// The polar stereographic projection sits on the north pole
    pub fn is_north_polar(&self) -> bool {
        self.standard_parallel_1 > 0.0
    }

    /// Construct the projection this configuration describes
    pub fn instantiate(&self) -> Result<ProjectionInstance> {
        Ok(match self.kind {
            ProjectionKind::Conic => ProjectionInstance::Conic(LambertConformalConic::new(
                self.ellipsoid,
                self.standard_parallel_1,
                self.standard_parallel_2,
                self.scale_factor,
            )?),
            ProjectionKind::Polar => ProjectionInstance::Polar {
                projection: PolarStereographic::new(self.ellipsoid, self.scale_factor)?,
                north: self.is_north_polar(),
            },
            ProjectionKind::Transverse => ProjectionInstance::Transverse(TransverseMercator::new(
                self.ellipsoid,
                self.scale_factor,
            )?),
        })
    }
}

/// A constructed projection behind the central-meridian contract
///
/// The polar variant carries its pole flag and ignores the central meridian.
#[derive(Debug, Clone)]
pub enum ProjectionInstance {
    Conic(LambertConformalConic),
    Polar {
        projection: PolarStereographic,
        north: bool,
    },
    Transverse(TransverseMercator),
}

impl ConicProjection for ProjectionInstance {
    fn forward(&self, lon0: f64, lat: f64, lon: f64) -> Result<TransformResult> {
        match self {
            ProjectionInstance::Conic(p) => p.forward(lon0, lat, lon),
            ProjectionInstance::Polar { projection, north } => projection.forward(*north, lat, lon),
            ProjectionInstance::Transverse(p) => p.forward(lon0, lat, lon),
        }
    }

    fn reverse(&self, lon0: f64, x: f64, y: f64) -> Result<TransformResult> {
        match self {
            ProjectionInstance::Conic(p) => p.reverse(lon0, x, y),
            ProjectionInstance::Polar { projection, north } => projection.reverse(*north, x, y),
            ProjectionInstance::Transverse(p) => p.reverse(lon0, x, y),
        }
    }
}
