//! Streaming transform engine: binds one pre-built projection to the line driver.

use conicproj_lib::dms::{decode_lat_lon, parse_number};
use conicproj_lib::{
    AlbersEqualArea, ConicProjection, Ellipsoid, LambertConformalConic, ProjError,
};
use line_entrypoints::{FormatConfig, LineHandler, format_fixed};

/// The two mutually exclusive conic families of the transform tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConicFamily {
    /// Lambert conformal conic (`-c`)
    Conformal,
    /// Albers equal area (`-a`)
    EqualArea,
}

/// Forward or reverse transform of every record through one projection
pub struct ConicTransformer {
    projection: Box<dyn ConicProjection>,
    lon0: f64,
    reverse: bool,
}

impl ConicTransformer {
    pub fn new(projection: Box<dyn ConicProjection>, lon0: f64, reverse: bool) -> Self {
        Self {
            projection,
            lon0,
            reverse,
        }
    }

    /// Build the projection of `family` once for the whole run
    pub fn from_family(
        family: ConicFamily,
        ellipsoid: Ellipsoid,
        (lat1, lat2): (f64, f64),
        k1: f64,
        lon0: f64,
        reverse: bool,
    ) -> conicproj_lib::Result<Self> {
        let projection: Box<dyn ConicProjection> = match family {
            ConicFamily::Conformal => {
                Box::new(LambertConformalConic::new(ellipsoid, lat1, lat2, k1)?)
            }
            ConicFamily::EqualArea => Box::new(AlbersEqualArea::new(ellipsoid, lat1, lat2, k1)?),
        };
        tracing::debug!(?family, lat1, lat2, k1, lon0, reverse, "Projection constructed");
        Ok(Self::new(projection, lon0, reverse))
    }
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl LineHandler for ConicTransformer {
    type Error = ProjError;

    fn handle(&self, [a, b]: [&str; 2], format: &FormatConfig) -> Result<String, ProjError> {
        let prec = format.precision;
        if self.reverse {
            let (x, y) = (parse_number(a)?, parse_number(b)?);
            let r = self.projection.reverse(self.lon0, x, y)?;
            let (lat, lon) = (r.latitude(), r.longitude());
            let (first, second) = if format.longfirst { (lon, lat) } else { (lat, lon) };
            Ok(format!(
                "{} {} {} {}",
                format_fixed(first, prec.plus(5)),
                format_fixed(second, prec.plus(5)),
                format_fixed(r.convergence, prec.plus(6)),
                format_fixed(r.scale, prec.plus(6)),
            ))
        } else {
            let (lat, lon) = decode_lat_lon(a, b, format.longfirst)?;
            let r = self.projection.forward(self.lon0, lat, lon)?;
            Ok(format!(
                "{} {} {} {}",
                format_fixed(r.position.x, prec.digits()),
                format_fixed(r.position.y, prec.digits()),
                format_fixed(r.convergence, prec.plus(6)),
                format_fixed(r.scale, prec.plus(6)),
            ))
        }
    }
}
