//! Builders for assembling recorded scenes in code.

use crate::integration::color::{Material, ObjectKind};
use crate::integration::recorded::{
    BakedTransform, RecordedScene, SceneDump, SceneError, SceneObject,
};
use crate::motion::Frame;

/// Builder for a single scene object and its baked transforms.
#[derive(Debug, Clone)]
pub struct ObjectBuilder {
    object: SceneObject,
}

impl ObjectBuilder {
    /// Create a visible mesh object without materials.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            object: SceneObject {
                name: name.into(),
                visible: true,
                kind: ObjectKind::Mesh,
                materials: Vec::new(),
                frames: Vec::new(),
            },
        }
    }

    pub fn kind(mut self, kind: ObjectKind) -> Self {
        self.object.kind = kind;
        self
    }

    /// Hide the object from the visible entity set.
    pub fn hidden(mut self) -> Self {
        self.object.visible = false;
        self
    }

    /// Append a material slot.
    pub fn material(mut self, material: Material) -> Self {
        self.object.materials.push(material);
        self
    }

    /// Bake a location at `frame` with no rotation.
    pub fn at(self, frame: Frame, location: [f64; 3]) -> Self {
        self.transform(BakedTransform {
            frame,
            location,
            rotation: [0.0; 3],
            color: None,
        })
    }

    /// Bake a location and an XYZ Euler rotation at `frame`.
    pub fn posed(self, frame: Frame, location: [f64; 3], rotation: [f64; 3]) -> Self {
        self.transform(BakedTransform {
            frame,
            location,
            rotation,
            color: None,
        })
    }

    /// Bake consecutive locations starting at `first_frame`.
    pub fn path(mut self, first_frame: Frame, locations: &[[f64; 3]]) -> Self {
        for (frame, location) in (first_frame..).zip(locations) {
            self = self.at(frame, *location);
        }
        self
    }

    pub fn transform(mut self, transform: BakedTransform) -> Self {
        self.object.frames.push(transform);
        self
    }

    /// Build the final `SceneObject`.
    pub fn build(self) -> SceneObject {
        self.object
    }
}

/// Builder for a `RecordedScene`.
#[derive(Debug, Clone)]
pub struct SceneBuilder {
    dump: SceneDump,
}

impl SceneBuilder {
    /// Create a scene named `source` covering frame 1 only.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            dump: SceneDump {
                source: Some(source.into()),
                frame_start: 1,
                frame_end: 1,
                objects: Vec::new(),
            },
        }
    }

    /// Set the inclusive frame range.
    pub fn frames(mut self, start: Frame, end: Frame) -> Self {
        self.dump.frame_start = start;
        self.dump.frame_end = end;
        self
    }

    pub fn object(mut self, object: ObjectBuilder) -> Self {
        self.dump.objects.push(object.build());
        self
    }

    /// Serialized form of the scene built so far.
    pub fn dump(&self) -> &SceneDump {
        &self.dump
    }

    /// Build the final `RecordedScene`.
    pub fn build(self) -> Result<RecordedScene, SceneError> {
        RecordedScene::from_dump(self.dump, "")
    }
}
