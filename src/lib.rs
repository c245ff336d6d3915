//! Drone show animation exporter.
//!
//! Samples every tracked drone of a scene frame by frame, checks speed and
//! inter-drone distance limits, and writes one CSV animation file per drone.

pub mod config;
pub mod error;
pub mod integration;
pub mod motion;

pub use config::ExportConfig;
pub use error::{ExportError, ExportResult, SamplerError};
pub use integration::{
    Entity, ExportPipeline, ExportReport, ExportRun, FieldSelection, RecordedScene, SceneSampler,
    TrajectoryWriter,
};
pub use motion::{
    Frame, FrameRange, FrameSample, MotionValidator, Position, Rgb, Trajectory,
    ValidationThresholds, Violation,
};
