//! Per-entity trajectory accumulated during one export run.

use crate::error::{ExportError, ExportResult};
use crate::motion::sample::{Frame, FrameSample, Position};

/// Ordered frame samples of a single entity.
///
/// Frames are strictly increasing and contiguous: every pushed sample must
/// carry the frame directly after the previous one.
#[derive(Debug, Clone, Default)]
pub struct Trajectory {
    entity: String,
    samples: Vec<FrameSample>,
}

impl Trajectory {
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            samples: Vec::new(),
        }
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Append the next sample.
    pub fn push(&mut self, sample: FrameSample) -> ExportResult<()> {
        if let Some(expected) = self.next_frame() {
            if sample.frame != expected {
                return Err(ExportError::Trajectory {
                    entity: self.entity.clone(),
                    expected,
                    got: sample.frame,
                });
            }
        }
        self.samples.push(sample);
        Ok(())
    }

    /// Frame the next sample must carry, or `None` for an empty trajectory.
    pub fn next_frame(&self) -> Option<Frame> {
        self.samples.last().map(|s| s.frame + 1)
    }

    /// Position of the most recent sample, used as the speed reference.
    pub fn previous_position(&self) -> Option<Position> {
        self.samples.last().map(|s| s.position)
    }

    pub fn samples(&self) -> &[FrameSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
