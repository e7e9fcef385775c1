//! Reader for reference datasets: a `KEY: value` header block closed by an
//! `END OF HEADER` line, followed by one coordinate tuple per line.

use crate::{ProjError, Result};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::str::FromStr;

/// Prefix of the line that closes the header block
const END_OF_HEADER: &str = "END OF HEADER";

/// Header value used for string fields that never appear
const UNSET: &str = "NONE";

/// The closed set of header keys understood by the reader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaderKey {
    Coordinates,
    Projection,
    Datum,
    CentralMeridian,
    FalseEasting,
    FalseNorthing,
    LatitudeOfTrueScale,
    LongitudeDownFromPole,
    OriginLatitude,
    ScaleFactor,
    StandardParallelOne,
    StandardParallelTwo,
}

impl HeaderKey {
    pub const ALL: [HeaderKey; 12] = [
        HeaderKey::Coordinates,
        HeaderKey::Projection,
        HeaderKey::Datum,
        HeaderKey::CentralMeridian,
        HeaderKey::FalseEasting,
        HeaderKey::FalseNorthing,
        HeaderKey::LatitudeOfTrueScale,
        HeaderKey::LongitudeDownFromPole,
        HeaderKey::OriginLatitude,
        HeaderKey::ScaleFactor,
        HeaderKey::StandardParallelOne,
        HeaderKey::StandardParallelTwo,
    ];

    /// The key exactly as it is spelled in a header line
    pub fn label(self) -> &'static str {
        match self {
            HeaderKey::Coordinates => "COORDINATES",
            HeaderKey::Projection => "PROJECTION",
            HeaderKey::Datum => "DATUM",
            HeaderKey::CentralMeridian => "CENTRAL MERIDIAN",
            HeaderKey::FalseEasting => "FALSE EASTING",
            HeaderKey::FalseNorthing => "FALSE NORTHING",
            HeaderKey::LatitudeOfTrueScale => "LATITUDE OF TRUE SCALE",
            HeaderKey::LongitudeDownFromPole => "LONGITUDE DOWN FROM POLE",
            HeaderKey::OriginLatitude => "ORIGIN LATITUDE",
            HeaderKey::ScaleFactor => "SCALE FACTOR",
            HeaderKey::StandardParallelOne => "STANDARD PARALLEL ONE",
            HeaderKey::StandardParallelTwo => "STANDARD PARALLEL TWO",
        }
    }

    /// String-valued keys; all others hold a number
    pub fn is_text(self) -> bool {
        matches!(
            self,
            HeaderKey::Coordinates | HeaderKey::Projection | HeaderKey::Datum
        )
    }
}

impl FromStr for HeaderKey {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        HeaderKey::ALL
            .into_iter()
            .find(|key| key.label() == s)
            .ok_or(())
    }
}

/// Values collected from a header block
///
/// String fields default to `NONE`; numeric fields default to NaN so that a
/// missing value can be told apart from an explicit zero.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReferenceHeader {
    pub coordinates: String,
    pub projection: String,
    pub datum: String,
    pub central_meridian: f64,
    pub false_easting: f64,
    pub false_northing: f64,
    pub latitude_of_true_scale: f64,
    pub longitude_down_from_pole: f64,
    pub origin_latitude: f64,
    pub scale_factor: f64,
    pub standard_parallel_one: f64,
    pub standard_parallel_two: f64,
}

impl Default for ReferenceHeader {
    fn default() -> Self {
        Self {
            coordinates: UNSET.to_string(),
            projection: UNSET.to_string(),
            datum: UNSET.to_string(),
            central_meridian: f64::NAN,
            false_easting: f64::NAN,
            false_northing: f64::NAN,
            latitude_of_true_scale: f64::NAN,
            longitude_down_from_pole: f64::NAN,
            origin_latitude: f64::NAN,
            scale_factor: f64::NAN,
            standard_parallel_one: f64::NAN,
            standard_parallel_two: f64::NAN,
        }
    }
}

impl ReferenceHeader {
    /// Numeric value of a key, NaN for string keys and unset values
    pub fn number(&self, key: HeaderKey) -> f64 {
        match key {
            HeaderKey::CentralMeridian => self.central_meridian,
            HeaderKey::FalseEasting => self.false_easting,
            HeaderKey::FalseNorthing => self.false_northing,
            HeaderKey::LatitudeOfTrueScale => self.latitude_of_true_scale,
            HeaderKey::LongitudeDownFromPole => self.longitude_down_from_pole,
            HeaderKey::OriginLatitude => self.origin_latitude,
            HeaderKey::ScaleFactor => self.scale_factor,
            HeaderKey::StandardParallelOne => self.standard_parallel_one,
            HeaderKey::StandardParallelTwo => self.standard_parallel_two,
            HeaderKey::Coordinates | HeaderKey::Projection | HeaderKey::Datum => f64::NAN,
        }
    }

    /// Store a trimmed value. Numeric keys keep only a leading number; anything
    /// else leaves the field unset.
    pub fn set(&mut self, key: HeaderKey, value: &str) {
        let number = || {
            value
                .split_whitespace()
                .next()
                .and_then(|token| token.parse::<f64>().ok())
                .unwrap_or(f64::NAN)
        };
        match key {
            HeaderKey::Coordinates => self.coordinates = value.to_string(),
            HeaderKey::Projection => self.projection = value.to_string(),
            HeaderKey::Datum => self.datum = value.to_string(),
            HeaderKey::CentralMeridian => self.central_meridian = number(),
            HeaderKey::FalseEasting => self.false_easting = number(),
            HeaderKey::FalseNorthing => self.false_northing = number(),
            HeaderKey::LatitudeOfTrueScale => self.latitude_of_true_scale = number(),
            HeaderKey::LongitudeDownFromPole => self.longitude_down_from_pole = number(),
            HeaderKey::OriginLatitude => self.origin_latitude = number(),
            HeaderKey::ScaleFactor => self.scale_factor = number(),
            HeaderKey::StandardParallelOne => self.standard_parallel_one = number(),
            HeaderKey::StandardParallelTwo => self.standard_parallel_two = number(),
        }
    }

    /// Apply one header line; returns false once the end-of-header line is seen
    fn apply_line(&mut self, line: &str) -> bool {
        if line.is_empty() || line.starts_with('#') {
            return true;
        }
        if line.starts_with(END_OF_HEADER) {
            return false;
        }
        let Some((key, value)) = line.split_once(':') else {
            return true;
        };
        let value = value.trim();
        if value.is_empty() {
            return true;
        }
        match key.parse::<HeaderKey>() {
            Ok(key) => self.set(key, value),
            Err(()) => tracing::trace!(key, "Ignoring unrecognized header key"),
        }
        true
    }
}

/// Streaming reader over one reference dataset
///
/// The header is consumed on construction; iterating yields the leading two
/// numeric fields of every following record line.
pub struct ReferenceReader<R> {
    header: ReferenceHeader,
    lines: io::Lines<R>,
    line_number: usize,
}

impl ReferenceReader<Box<dyn BufRead + Send>> {
    /// Open a dataset by path; `-` reads standard input
    pub fn open(path: &str) -> Result<Self> {
        let reader: Box<dyn BufRead + Send> = if path.is_empty() || path == "-" {
            Box::new(BufReader::new(io::stdin()))
        } else {
            let file = File::open(path).map_err(|source| ProjError::Open {
                path: path.to_string(),
                source,
            })?;
            Box::new(BufReader::new(file))
        };
        Self::new(reader)
    }
}

impl<R: BufRead> ReferenceReader<R> {
    /// Read the header block from `reader`
    pub fn new(reader: R) -> Result<Self> {
        let mut header = ReferenceHeader::default();
        let mut lines = reader.lines();
        let mut line_number = 0;
        for line in lines.by_ref() {
            let line = line?;
            line_number += 1;
            if !header.apply_line(&line) {
                break;
            }
        }
        tracing::debug!(
            projection = %header.projection,
            datum = %header.datum,
            line_number,
            "Read reference header"
        );
        Ok(Self {
            header,
            lines,
            line_number,
        })
    }

    pub fn header(&self) -> &ReferenceHeader {
        &self.header
    }

    /// Line number of the most recently read line
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Leading two numbers of a record; any punctuation or spacing separates fields
    fn parse_record(&self, line: &str) -> Result<(f64, f64)> {
        let fields: Vec<&str> = line
            .split(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '+' | '-')))
            .filter(|field| !field.is_empty())
            .collect();
        if fields.len() < 2 || fields.len() > 3 {
            return Err(ProjError::InputFormat(format!(
                "Expected 2 or 3 fields at line {}: {line}",
                self.line_number
            )));
        }
        let value = |field: &str| {
            field.parse::<f64>().map_err(|_| {
                ProjError::InputFormat(format!(
                    "Cannot decode {field} at line {}",
                    self.line_number
                ))
            })
        };
        Ok((value(fields[0])?, value(fields[1])?))
    }
}

impl<R: BufRead> Iterator for ReferenceReader<R> {
    type Item = Result<(f64, f64)>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(err) => return Some(Err(err.into())),
            };
            self.line_number += 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            return Some(self.parse_record(trimmed));
        }
    }
}
