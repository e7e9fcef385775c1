//! Round-trip verification of a projection against paired reference streams.
//!
//! Every record is reverse-projected and compared with the reference geodetic
//! position on the local tangent plane, then forward-projected and compared with
//! the reference projected position. Records are independent, so they are checked
//! in parallel chunks; reports and error maxima are applied in input order.

use crate::projection::ConicProjection;
use crate::resolver::{ProjectionConfig, ProjectionInstance, ProjectionKind};
use crate::{Datum, ProjError, ReferenceHeader, Result, ensure_same_datum, resolve_projection};
use rayon::prelude::*;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;

/// Errors at or above this size (meters, scale-normalized) are reported per record
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// Records checked per parallel batch
const CHUNK_SIZE: usize = 4096;

/// Coordinate system the geodetic reference stream must declare
const GEODETIC_COORDINATES: &str = "Geodetic";

/// Which half of a round trip a report refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CheckDirection {
    Reverse,
    Forward,
}

impl CheckDirection {
    fn tag(self) -> &'static str {
        match self {
            CheckDirection::Reverse => "REV",
            CheckDirection::Forward => "FOR",
        }
    }
}

/// A record whose error exceeded the tolerance
///
/// `x` and `y` are the reference planar coordinates, shifted to the projection
/// origin and divided by the central scale.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RecordReport {
    pub direction: CheckDirection,
    pub lat: f64,
    pub lon: f64,
    pub x: f64,
    pub y: f64,
    pub error: f64,
}

impl fmt::Display for RecordReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {:.7} {:.7} {:.7} {:.7} {:.7}",
            self.direction.tag(),
            self.lat,
            self.lon,
            self.x,
            self.y,
            self.error
        )
    }
}

/// Errors measured for one record; NaN where a transform failed
#[derive(Debug, Clone, PartialEq)]
pub struct RecordCheck {
    pub err_x: f64,
    pub err_y: f64,
    pub err: f64,
    /// Forward error divided by `max(1, k)`
    pub err_k: f64,
    /// Reverse error on the tangent plane
    pub err_reverse: f64,
    pub reports: Vec<RecordReport>,
}

impl RecordCheck {
    /// True when a transform failed for this record
    pub fn failed(&self) -> bool {
        self.err_reverse.is_nan() || self.err_k.is_nan()
    }
}

/// Running maxima over one verification run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorAccumulator {
    count: usize,
    failed: usize,
    skipped: usize,
    max_err_x: f64,
    max_err_y: f64,
    max_err: f64,
    max_err_k: f64,
    max_err_reverse: f64,
}

impl ErrorAccumulator {
    /// Fold one record into the maxima
    pub fn record(&mut self, check: &RecordCheck) {
        self.count += 1;
        if check.failed() {
            self.failed += 1;
        }
        self.max_err_x = self.max_err_x.max(check.err_x);
        self.max_err_y = self.max_err_y.max(check.err_y);
        self.max_err = self.max_err.max(check.err);
        self.max_err_k = self.max_err_k.max(check.err_k);
        self.max_err_reverse = self.max_err_reverse.max(check.err_reverse);
    }

    /// Count a record pair that could not be decoded
    pub fn skip(&mut self) {
        self.skipped += 1;
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn summary(&self) -> VerificationSummary {
        VerificationSummary {
            count: self.count,
            failed: self.failed,
            skipped: self.skipped,
            max_err_x: self.max_err_x,
            max_err_y: self.max_err_y,
            max_err: self.max_err,
            max_err_k: self.max_err_k,
            max_err_reverse: self.max_err_reverse,
        }
    }
}

/// Final statistics of a verification run
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VerificationSummary {
    pub count: usize,
    /// Records for which a transform returned an error
    pub failed: usize,
    /// Record pairs skipped because a line could not be decoded
    pub skipped: usize,
    pub max_err_x: f64,
    pub max_err_y: f64,
    pub max_err: f64,
    pub max_err_k: f64,
    pub max_err_reverse: f64,
}

impl fmt::Display for VerificationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} records; maxerr {:.7} {:.7}",
            self.count, self.max_err_k, self.max_err_reverse
        )
    }
}

/// Replays paired reference records through one resolved projection
pub struct VerificationHarness {
    config: ProjectionConfig,
    projection: ProjectionInstance,
    /// Planar coordinates of the projection origin
    x0: f64,
    y0: f64,
    tolerance: f64,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl VerificationHarness {
    /// Validate a pair of reference headers and build the harness for them
    ///
    /// Checks the coordinate system and datum of both streams before any record
    /// is read; every failure here is fatal for the run.
    pub fn from_headers(geodetic: &ReferenceHeader, projected: &ReferenceHeader) -> Result<Self> {
        if geodetic.coordinates != GEODETIC_COORDINATES {
            return Err(ProjError::UnsupportedCoordinates(geodetic.coordinates.clone()));
        }
        let ellipsoid = Datum::from_name(&geodetic.datum)?.ellipsoid();
        ensure_same_datum(&geodetic.datum, &projected.datum)?;
        let config = resolve_projection(&projected.projection, projected, ellipsoid)?;
        Self::new(config)
    }

    /// Build the projection once and locate its origin
    pub fn new(config: ProjectionConfig) -> Result<Self> {
        let projection = config.instantiate()?;
        let (x0, y0) = match config.kind {
            ProjectionKind::Polar => (0.0, 0.0),
            ProjectionKind::Conic | ProjectionKind::Transverse => {
                let origin = projection.forward(
                    config.central_meridian,
                    config.origin_latitude,
                    config.central_meridian,
                )?;
                (origin.position.x, origin.position.y)
            }
        };
        tracing::info!(
            projection = config.family.name(),
            a = config.ellipsoid.equatorial_radius(),
            r = config.ellipsoid.inverse_flattening(),
            k1 = config.scale_factor,
            x0,
            y0,
            "Verification harness ready"
        );
        Ok(Self {
            config,
            projection,
            x0,
            y0,
            tolerance: DEFAULT_TOLERANCE,
        })
    }

    /// Report records whose error reaches `tolerance` instead of the default
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Check one record pair: reference geodetic (lat, lon) against reference planar (x, y)
    pub fn check(&self, lat: f64, lon: f64, xa: f64, ya: f64) -> RecordCheck {
        let c = &self.config;
        let x = xa - c.false_easting + self.x0;
        let y = ya - c.false_northing + self.y0;
        let (xx, yy) = (x / c.scale_factor, y / c.scale_factor);
        let mut reports = Vec::new();
        let report = |direction, error| RecordReport {
            direction,
            lat,
            lon,
            x: xx,
            y: yy,
            error,
        };

        let err_reverse = match self.projection.reverse(c.central_meridian, x, y) {
            Ok(rev) => {
                c.ellipsoid
                    .tangent_plane_distance(lat, lon, rev.latitude(), rev.longitude())
            }
            Err(err) => {
                tracing::debug!(lat, lon, %err, "Reverse transform failed");
                f64::NAN
            }
        };
        if !(err_reverse < self.tolerance) {
            reports.push(report(CheckDirection::Reverse, err_reverse));
        }

        let (err_x, err_y, err, err_k) = match self.projection.forward(c.central_meridian, lat, lon)
        {
            Ok(fwd) => {
                let px = fwd.position.x - self.x0 + c.false_easting;
                let py = fwd.position.y - self.y0 + c.false_northing;
                let (ex, ey) = ((px - xa).abs(), (py - ya).abs());
                let err = ex.hypot(ey);
                (ex, ey, err, err / fwd.scale.max(1.0))
            }
            Err(err) => {
                tracing::debug!(lat, lon, %err, "Forward transform failed");
                (f64::NAN, f64::NAN, f64::NAN, f64::NAN)
            }
        };
        if !(err_k < self.tolerance) {
            reports.push(report(CheckDirection::Forward, err_k));
        }

        RecordCheck {
            err_x,
            err_y,
            err,
            err_k,
            err_reverse,
            reports,
        }
    }

    /// Check every aligned record pair until either stream ends
    ///
    /// `on_report` receives the out-of-tolerance reports in input order. A record
    /// line that cannot be decoded skips its pair; I/O failures end the run.
    pub fn run<G, P, F>(&self, geodetic: G, projected: P, mut on_report: F) -> Result<VerificationSummary>
    where
        G: Iterator<Item = Result<(f64, f64)>>,
        P: Iterator<Item = Result<(f64, f64)>>,
        F: FnMut(&RecordReport) -> std::io::Result<()>,
    {
        let mut accumulator = ErrorAccumulator::default();
        let mut pairs = geodetic.zip(projected);
        loop {
            let chunk: Vec<_> = pairs.by_ref().take(CHUNK_SIZE).collect();
            if chunk.is_empty() {
                break;
            }
            let checks: Vec<Result<RecordCheck>> = chunk
                .into_par_iter()
                .map(|(geo, proj)| {
                    let (lat, lon) = geo?;
                    let (x, y) = proj?;
                    Ok(self.check(lat, lon, x, y))
                })
                .collect();

            for check in checks {
                match check {
                    Ok(check) => {
                        for report in &check.reports {
                            on_report(report)?;
                        }
                        accumulator.record(&check);
                    }
                    Err(err) if !err.is_fatal() => {
                        tracing::warn!(%err, "Skipping malformed record pair");
                        accumulator.skip();
                    }
                    Err(err) => return Err(err),
                }
            }
        }

        let summary = accumulator.summary();
        tracing::info!(
            count = summary.count,
            failed = summary.failed,
            skipped = summary.skipped,
            "Verification finished"
        );
        Ok(summary)
    }
}
