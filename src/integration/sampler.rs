//! Trait for the host scene the exporter samples from.

use tracing::warn;

use crate::error::{ExportError, ExportResult};
use crate::integration::color::ColorResolutionError;
use crate::motion::{Frame, FrameRange, Position, Rgb};

/// A tracked object in the scene. One output file is written per entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Entity {
    name: String,
}

impl Entity {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the entity belongs to the set selected by a name identifier.
    ///
    /// Matching is a case-sensitive substring test.
    pub fn matches_filter(&self, identifier: &str) -> bool {
        self.name.contains(identifier)
    }

    /// Output file name: the lower-cased entity name with a `.csv` extension.
    pub fn file_name(&self) -> String {
        format!("{}.csv", self.name.to_lowercase())
    }
}

/// Source of per-frame entity state.
///
/// Implement this trait to connect a scene (a live host application, a
/// recorded dump, a simulator) to the exporter.
///
/// The sampler owns a time cursor. Queries always answer for the frame last
/// passed to [`SceneSampler::set_time_cursor`].
///
/// # Example
///
/// ```ignore
/// use droneshow_export::{Entity, Frame, SceneSampler};
///
/// struct MyScene { /* ... */ }
///
/// impl SceneSampler for MyScene {
///     type Error = std::io::Error;
///
///     fn set_time_cursor(&mut self, frame: Frame) {
///         // Evaluate the scene at `frame`
///     }
///     // ...
/// }
/// ```
pub trait SceneSampler {
    /// Error type for sampling failures.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Identifier of the scene, written as the first row of every file.
    fn source_identifier(&self) -> String;

    /// Inclusive frame range of the scene.
    fn frame_range(&self) -> (Frame, Frame);

    /// Visible entities, in scene order.
    fn entities(&self) -> Vec<Entity>;

    /// Move the scene to `frame`. This is a globally observable side effect.
    fn set_time_cursor(&mut self, frame: Frame);

    /// World-space position of the entity at the current frame.
    fn position(&self, entity: &Entity) -> Result<Position, Self::Error>;

    /// Yaw of the entity at the current frame, in radians.
    fn heading(&self, entity: &Entity) -> Result<f64, Self::Error>;

    /// Display color of the entity at the current frame.
    fn resolve_color(&self, entity: &Entity) -> Result<Rgb, ColorResolutionError>;

    /// Display color, falling back to black when it cannot be resolved.
    fn color(&self, entity: &Entity) -> Rgb {
        match self.resolve_color(entity) {
            Ok(color) => color,
            Err(err) => {
                warn!(
                    "Could not resolve color of '{}', using {:?}: {}",
                    entity.name(),
                    Rgb::BLACK.to_array(),
                    err
                );
                Rgb::BLACK
            }
        }
    }

    /// Validated frame range, rejecting `start > end`.
    fn checked_frame_range(&self) -> ExportResult<FrameRange> {
        let (start, end) = self.frame_range();
        FrameRange::new(start, end).ok_or(ExportError::InvalidFrameRange { start, end })
    }
}
