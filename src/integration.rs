//! Integration module connecting scene samplers with the exporter.
//!
//! This module provides the sampler trait the exporter pulls frame data
//! through, a recorded-scene implementation of it, color resolution
//! strategies, the CSV writer and the export pipeline tying them together.

mod builder;
mod color;
mod pipeline;
mod recorded;
mod sampler;
mod writer;

pub use builder::{ObjectBuilder, SceneBuilder};
pub use color::{
    ColorResolutionError, ColorResolver, Material, MaterialColorResolver, NodeInput, NodeKind,
    ObjectKind, ShaderNode, SocketKind,
};
pub use pipeline::{CheckReport, EntityOutcome, ExportPipeline, ExportReport, ExportRun};
pub use recorded::{BakedTransform, RecordedScene, SceneDump, SceneError, SceneObject};
pub use sampler::{Entity, SceneSampler};
pub use writer::{FieldSelection, TrajectoryWriter, ensure_output_dir, format_number, output_path};
