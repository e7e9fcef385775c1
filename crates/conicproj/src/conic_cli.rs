//! `conic-proj`: convert between geographic and Lambert conformal conic or
//! Albers equal area coordinates, one record per line.

use crate::transform::{ConicFamily, ConicTransformer};
use crate::{AppError, Result};
use clap::{ArgAction, Parser};
use conicproj_lib::Ellipsoid;
use conicproj_lib::dms::{decode_latitude, decode_longitude, parse_fraction, parse_number};
use conicproj_lib::math::ang_normalize;
use line_entrypoints::{FormatConfig, InputSource, LineDriver, OutputSink, Precision};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "conic-proj",
    version,
    about = "Perform conversions between geographic and conic projection coordinates",
    after_help = "Each input line holds two coordinates: latitude and longitude for the \
                  forward projection, easting and northing (meters) with -r. Output lines \
                  add the meridian convergence (degrees) and the point scale."
)]
pub struct ConicProjArgs {
    /// Reverse projection: planar (x, y) to geographic
    #[arg(short = 'r')]
    pub reverse: bool,

    /// Lambert conformal conic with standard parallels LAT1 and LAT2
    #[arg(
        short = 'c',
        num_args = 2,
        value_names = ["LAT1", "LAT2"],
        allow_hyphen_values = true,
        conflicts_with = "albers"
    )]
    pub conformal: Option<Vec<String>>,

    /// Albers equal area with standard parallels LAT1 and LAT2
    #[arg(short = 'a', num_args = 2, value_names = ["LAT1", "LAT2"], allow_hyphen_values = true)]
    pub albers: Option<Vec<String>>,

    /// Central meridian
    #[arg(short = 'l', value_name = "LON0", default_value = "0", allow_hyphen_values = true)]
    pub lon0: String,

    /// Scale on the standard parallels
    #[arg(short = 'k', value_name = "K1", default_value = "1", allow_hyphen_values = true)]
    pub k1: String,

    /// Ellipsoid equatorial radius and flattening (flattening may be written p/q)
    #[arg(
        short = 'e',
        num_args = 2,
        value_names = ["A", "F"],
        allow_hyphen_values = true
    )]
    pub ellipsoid: Option<Vec<String>>,

    /// Toggle longitude-first order for geographic coordinates
    #[arg(short = 'w', action = ArgAction::Count)]
    pub longfirst: u8,

    /// Output precision, clamped to [0, 10]
    #[arg(short = 'p', value_name = "PREC", default_value_t = 6, allow_negative_numbers = true)]
    pub precision: i64,

    /// Read records from this string instead of standard input
    #[arg(long, value_name = "STRING", allow_hyphen_values = true)]
    pub input_string: Option<String>,

    /// Read records from this file; `-` is standard input
    #[arg(long, value_name = "FILE")]
    pub input_file: Option<String>,

    /// Write results to this file; `-` is standard output
    #[arg(long, value_name = "FILE")]
    pub output_file: Option<String>,

    /// Character standing for a line break in --input-string
    #[arg(long, value_name = "CHAR", default_value = ";")]
    pub line_separator: String,

    /// Text from this delimiter on is echoed after each result
    #[arg(long, value_name = "DELIM")]
    pub comment_delimiter: Option<String>,
}

/// Everything the transform needs, decoded from the arguments
#[derive(Debug, Clone, PartialEq)]
pub struct ConicProjConfig {
    pub family: Option<ConicFamily>,
    pub parallels: (f64, f64),
    pub lon0: f64,
    pub k1: f64,
    pub ellipsoid: Ellipsoid,
    pub reverse: bool,
    pub format: FormatConfig,
}

fn decode_parallels(flag: &'static str, values: &[String]) -> Result<(f64, f64)> {
    let decode =
        |lat: &str| decode_latitude(lat).map_err(|source| AppError::Arguments { flag, source });
    match values {
        [lat1, lat2] => Ok((decode(lat1)?, decode(lat2)?)),
        _ => Err(AppError::MissingFamily),
    }
}

impl ConicProjArgs {
    /// Decode angles and numbers of the arguments
    pub fn config(&self) -> Result<ConicProjConfig> {
        let (family, parallels) = match (&self.conformal, &self.albers) {
            (Some(values), _) => (Some(ConicFamily::Conformal), decode_parallels("-c", values)?),
            (None, Some(values)) => (Some(ConicFamily::EqualArea), decode_parallels("-a", values)?),
            (None, None) => (None, (0.0, 0.0)),
        };
        let lon0 = decode_longitude(&self.lon0)
            .map(ang_normalize)
            .map_err(|source| AppError::Argument { flag: "-l", source })?;
        let k1 = parse_number(&self.k1).map_err(|source| AppError::Argument { flag: "-k", source })?;
        let ellipsoid = match self.ellipsoid.as_deref() {
            Some([a, f]) => {
                let decode = || -> conicproj_lib::Result<Ellipsoid> {
                    Ellipsoid::from_flattening(parse_number(a)?, parse_fraction(f)?)
                };
                decode().map_err(|source| AppError::Arguments { flag: "-e", source })?
            }
            _ => Ellipsoid::default(),
        };
        Ok(ConicProjConfig {
            family,
            parallels,
            lon0,
            k1,
            ellipsoid,
            reverse: self.reverse,
            format: FormatConfig {
                precision: Precision::clamped(self.precision),
                longfirst: self.longfirst % 2 == 1,
            },
        })
    }
}

/// Run the transform over the configured input; returns the process exit code
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn run(args: ConicProjArgs) -> Result<i32> {
    let config = args.config()?;
    let input = InputSource::from_args(args.input_string, args.input_file, &args.line_separator)?;
    let input = input.open()?;
    let mut output = OutputSink::from_arg(args.output_file).open()?;

    let family = config.family.ok_or(AppError::MissingFamily)?;
    let transformer = ConicTransformer::from_family(
        family,
        config.ellipsoid,
        config.parallels,
        config.k1,
        config.lon0,
        config.reverse,
    )?;
    tracing::info!(
        ?family,
        reverse = config.reverse,
        precision = config.format.precision.digits(),
        longfirst = config.format.longfirst,
        "Transforming records"
    );

    let driver = LineDriver::new(config.format).with_comment_delimiter(args.comment_delimiter);
    let stats = driver.run(&transformer, input, &mut *output)?;
    Ok(stats.exit_code())
}
