//! Error type for the command-line front end.

use std::path::PathBuf;

pub type CliResult<T> = Result<T, CliError>;

/// Wraps the error of every backend crate the CLI drives.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Design file error: {0}")]
    Project(#[from] nc_project::ProjectError),

    #[error("Design validation failed: {0}")]
    Validation(#[from] nc_project::ValidationError),

    #[error("Thermochemistry table error: {0}")]
    Thermo(#[from] nc_thermo::ProviderError),

    #[error("Geometry error: {0}")]
    Geometry(#[from] nc_geometry::GeometryError),

    #[error("Sweep failed ({kind}): {source}")]
    Sweep {
        kind: nc_pipeline::ErrorKind,
        #[source]
        source: nc_pipeline::SweepError,
    },

    #[error("Results error: {0}")]
    Results(#[from] nc_results::ResultsError),

    #[error("Failed to read {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<nc_pipeline::SweepError> for CliError {
    fn from(source: nc_pipeline::SweepError) -> Self {
        CliError::Sweep {
            kind: source.kind(),
            source,
        }
    }
}
