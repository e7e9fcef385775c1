//! ConicProj and ProjTest command front-ends
//!
//! - `conic-proj` streams coordinates through a Lambert conformal conic or an
//!   Albers equal area projection, one record per line.
//! - `proj-test` replays a pair of reference datasets through the projection
//!   their headers describe and reports the worst round-trip errors.
//!
//! Both binaries are thin: argument structs and `run` functions live here so
//! integration tests and benchmarks can drive them directly.

pub mod conic_cli;
pub mod transform;

pub use transform::{ConicFamily, ConicTransformer};

use conicproj_lib::ProjError;
use line_entrypoints::DriverError;

/// Setup failures of the front-ends
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Error decoding arguments of {flag}: {source}")]
    Arguments {
        flag: &'static str,
        source: ProjError,
    },

    #[error("Error decoding argument of {flag}: {source}")]
    Argument {
        flag: &'static str,
        source: ProjError,
    },

    #[error("Must specify \"-c lat1 lat2\" or \"-a lat1 lat2\"")]
    MissingFamily,

    #[error(transparent)]
    Projection(#[from] ProjError),

    #[error(transparent)]
    Driver(#[from] DriverError),

    #[error("Cannot write JSON summary: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;
