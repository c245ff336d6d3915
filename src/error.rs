//! Error types for the exporter.

use std::path::PathBuf;

use crate::integration::SceneError;
use crate::motion::Frame;

/// A specialized Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Boxed error produced by a scene sampler implementation.
pub type SamplerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that abort an export run or a single entity's export.
///
/// Color resolution failures are not represented here: they are recovered
/// with a fallback color and never abort anything.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid frame range: start {start} is after end {end}")]
    InvalidFrameRange { start: Frame, end: Frame },

    #[error("entity name {0:?} cannot be used as a file name")]
    InvalidEntityName(String),

    #[error("'{entity}' would overwrite {file:?}, already written for '{previous}'")]
    OutputCollision {
        entity: String,
        previous: String,
        file: String,
    },

    #[error("trajectory of '{entity}' expected frame {expected}, got {got}")]
    Trajectory {
        entity: String,
        expected: Frame,
        got: Frame,
    },

    #[error("could not create output directory {path:?}: {source}")]
    OutputDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("sampler failed for '{entity}' on frame {frame}: {source}")]
    Sampler {
        entity: String,
        frame: Frame,
        #[source]
        source: SamplerError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid scene: {0}")]
    InvalidScene(#[from] SceneError),

    #[error("scene parse error: {0}")]
    Scene(#[from] serde_json::Error),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

impl ExportError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        ExportError::Config(message.into())
    }

    /// Wrap a sampler failure with the entity and frame it happened on.
    pub fn sampler(
        entity: impl Into<String>,
        frame: Frame,
        source: impl Into<SamplerError>,
    ) -> Self {
        ExportError::Sampler {
            entity: entity.into(),
            frame,
            source: source.into(),
        }
    }
}
