//! Conic Projection Library - Core Geodesy for Batch Conversion and Verification
//!
//! This library resolves textual datum and projection descriptions into immutable
//! parameter sets, exposes conic-family projections behind a fixed Forward/Reverse
//! contract, and replays reference datasets through them to measure worst-case
//! round-trip error.
//!
//! # Architecture
//!
//! - **[`Ellipsoid`]**: Equatorial radius and inverse flattening, resolved from a datum catalog
//! - **[`ProjectionConfig`]**: Canonical parameter tuple derived from a reference header
//! - **[`ConicProjection`]**: Forward/Reverse contract implemented by every central-meridian projection
//! - **[`VerificationHarness`]**: Drives paired reference streams and accumulates error maxima
//!
//! # Lifecycle
//!
//! Ellipsoids, configurations and projection instances are built once before any record is
//! read and stay immutable for the rest of the run. Records and results are per line.

pub mod dms;
mod ellipsoid;
pub mod math;
pub mod projection;
mod reference;
mod resolver;
mod verify;

// Public API exports
pub use ellipsoid::{Datum, Ellipsoid, ensure_same_datum};
pub use projection::{
    AlbersEqualArea, ConicProjection, LambertConformalConic, PolarStereographic, TransformResult,
    TransverseMercator,
};
pub use reference::{HeaderKey, ReferenceHeader, ReferenceReader};
pub use resolver::{
    ProjectionConfig, ProjectionFamily, ProjectionInstance, ProjectionKind, resolve_projection,
};
pub use verify::{
    CheckDirection, ErrorAccumulator, RecordCheck, RecordReport, VerificationHarness,
    VerificationSummary, DEFAULT_TOLERANCE,
};

/// Broad classification used by front-ends to decide between aborting and skipping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Setup problems; always fatal before any record is processed
    Configuration,
    /// A single record could not be decoded
    InputFormat,
    /// A projection could not evaluate a decoded record
    Computation,
}

/// Error types for the projection library
#[derive(Debug, thiserror::Error)]
pub enum ProjError {
    #[error("Unsupported datum {0}")]
    UnsupportedDatum(String),

    #[error("Datum mismatch {geodetic} {projected}")]
    DatumMismatch { geodetic: String, projected: String },

    #[error("Unsupported projection {0}")]
    UnsupportedProjection(String),

    #[error("Unsupported coordinates {0}")]
    UnsupportedCoordinates(String),

    #[error("Missing or non-numeric header field: {0}")]
    MissingField(&'static str),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("{0}")]
    InputFormat(String),

    #[error("{0}")]
    OutOfRange(String),

    #[error("Cannot open {path}: {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProjError {
    /// Classify this error for the fatal/recoverable policy
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProjError::UnsupportedDatum(_)
            | ProjError::DatumMismatch { .. }
            | ProjError::UnsupportedProjection(_)
            | ProjError::UnsupportedCoordinates(_)
            | ProjError::MissingField(_)
            | ProjError::InvalidParameter(_)
            | ProjError::Open { .. }
            | ProjError::Io(_) => ErrorKind::Configuration,
            ProjError::InputFormat(_) => ErrorKind::InputFormat,
            ProjError::OutOfRange(_) => ErrorKind::Computation,
        }
    }

    /// True when the whole run must stop
    pub fn is_fatal(&self) -> bool {
        self.kind() == ErrorKind::Configuration
    }
}

pub type Result<T> = std::result::Result<T, ProjError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_exports() {
        // Verify that all public types are accessible
        let _: fn(&str) -> Result<Ellipsoid> = Ellipsoid::from_datum;
        let _: fn() -> ErrorAccumulator = ErrorAccumulator::default;
    }

    #[test]
    fn test_error_kinds() {
        assert!(ProjError::UnsupportedProjection("Sinusoidal".into()).is_fatal());
        assert!(ProjError::MissingField("FALSE EASTING").is_fatal());
        assert_eq!(
            ProjError::InputFormat("Incomplete input: 1".into()).kind(),
            ErrorKind::InputFormat
        );
        assert!(!ProjError::OutOfRange("Latitude 91d not in [-90d, 90d]".into()).is_fatal());
    }

    #[test]
    fn test_error_messages() {
        let err = ProjError::DatumMismatch {
            geodetic: "WGE".into(),
            projected: "Test_sphere".into(),
        };
        assert_eq!(err.to_string(), "Datum mismatch WGE Test_sphere");
        assert_eq!(
            ProjError::UnsupportedProjection("Sinusoidal".into()).to_string(),
            "Unsupported projection Sinusoidal"
        );
    }
}
