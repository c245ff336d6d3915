//! Scene sampler backed by a recorded (baked) scene dump.
//!
//! The dump is a JSON document listing every object with its materials and
//! one baked transform per frame:
//!
//! ```json
//! {
//!   "source": "finale",
//!   "frame_start": 1,
//!   "frame_end": 250,
//!   "objects": [
//!     {
//!       "name": "drone_001",
//!       "materials": [{"name": "led", "diffuse_color": [1.0, 0.0, 0.0]}],
//!       "frames": [{"frame": 1, "location": [0.0, 0.0, 1.0], "rotation": [0.0, 0.0, 1.57]}]
//!     }
//!   ]
//! }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use nalgebra::UnitQuaternion;
use serde::{Deserialize, Serialize};

use crate::error::ExportResult;
use crate::integration::color::{
    ColorResolutionError, ColorResolver, Material, MaterialColorResolver, ObjectKind,
};
use crate::integration::sampler::{Entity, SceneSampler};
use crate::motion::{Frame, Position, Rgb};

/// Errors raised while building or sampling a recorded scene.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SceneError {
    #[error("object '{entity}' has no baked transform for frame {frame}")]
    MissingSample { entity: String, frame: Frame },

    #[error("unknown object '{0}'")]
    UnknownEntity(String),

    #[error("object name '{0}' is used more than once")]
    DuplicateEntity(String),

    #[error("object '{entity}' has more than one transform for frame {frame}")]
    DuplicateFrame { entity: String, frame: Frame },
}

/// Serialized form of a recorded scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDump {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub frame_start: Frame,
    pub frame_end: Frame,
    #[serde(default)]
    pub objects: Vec<SceneObject>,
}

/// One object of a scene dump.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub name: String,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub kind: ObjectKind,
    #[serde(default)]
    pub materials: Vec<Material>,
    #[serde(default)]
    pub frames: Vec<BakedTransform>,
}

fn default_visible() -> bool {
    true
}

/// World transform of an object at one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BakedTransform {
    pub frame: Frame,
    pub location: [f64; 3],
    /// XYZ Euler rotation in radians.
    #[serde(default)]
    pub rotation: [f64; 3],
    /// Animated display color in `[0, 1]`, overriding the material color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<[f32; 3]>,
}

#[derive(Debug, Clone)]
struct RecordedObject {
    visible: bool,
    kind: ObjectKind,
    materials: Vec<Material>,
    frames: BTreeMap<Frame, BakedTransform>,
}

/// In-memory scene answering sampler queries from baked transforms.
#[derive(Debug, Clone)]
pub struct RecordedScene<R: ColorResolver = MaterialColorResolver> {
    source: String,
    frame_start: Frame,
    frame_end: Frame,
    order: Vec<String>,
    objects: HashMap<String, RecordedObject>,
    cursor: Frame,
    resolver: R,
}

impl RecordedScene {
    /// Build a scene from its serialized form.
    ///
    /// `default_source` names the scene when the dump carries no `source`.
    pub fn from_dump(dump: SceneDump, default_source: &str) -> Result<Self, SceneError> {
        let mut order = Vec::with_capacity(dump.objects.len());
        let mut objects = HashMap::with_capacity(dump.objects.len());

        for object in dump.objects {
            let mut frames = BTreeMap::new();
            for transform in object.frames {
                if frames.insert(transform.frame, transform).is_some() {
                    return Err(SceneError::DuplicateFrame {
                        entity: object.name,
                        frame: transform.frame,
                    });
                }
            }
            if objects.contains_key(&object.name) {
                return Err(SceneError::DuplicateEntity(object.name));
            }
            order.push(object.name.clone());
            objects.insert(
                object.name,
                RecordedObject {
                    visible: object.visible,
                    kind: object.kind,
                    materials: object.materials,
                    frames,
                },
            );
        }

        Ok(Self {
            source: dump.source.unwrap_or_else(|| default_source.to_string()),
            frame_start: dump.frame_start,
            frame_end: dump.frame_end,
            order,
            objects,
            cursor: dump.frame_start,
            resolver: MaterialColorResolver,
        })
    }

    /// Load a JSON scene dump. The file stem is the default source identifier.
    pub fn load(path: &Path) -> ExportResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let dump: SceneDump = serde_json::from_str(&contents)?;
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::from_dump(dump, &stem)?)
    }
}

impl<R: ColorResolver> RecordedScene<R> {
    /// Replace the color resolution strategy.
    pub fn with_resolver<R2: ColorResolver>(self, resolver: R2) -> RecordedScene<R2> {
        RecordedScene {
            source: self.source,
            frame_start: self.frame_start,
            frame_end: self.frame_end,
            order: self.order,
            objects: self.objects,
            cursor: self.cursor,
            resolver,
        }
    }

    /// Frame the time cursor is on.
    pub fn cursor(&self) -> Frame {
        self.cursor
    }

    fn object(&self, entity: &Entity) -> Result<&RecordedObject, SceneError> {
        self.objects
            .get(entity.name())
            .ok_or_else(|| SceneError::UnknownEntity(entity.name().to_string()))
    }

    fn transform(&self, entity: &Entity) -> Result<&BakedTransform, SceneError> {
        self.object(entity)?
            .frames
            .get(&self.cursor)
            .ok_or_else(|| SceneError::MissingSample {
                entity: entity.name().to_string(),
                frame: self.cursor,
            })
    }
}

impl<R: ColorResolver> SceneSampler for RecordedScene<R> {
    type Error = SceneError;

    fn source_identifier(&self) -> String {
        self.source.clone()
    }

    fn frame_range(&self) -> (Frame, Frame) {
        (self.frame_start, self.frame_end)
    }

    fn entities(&self) -> Vec<Entity> {
        self.order
            .iter()
            .filter(|name| self.objects.get(*name).is_some_and(|o| o.visible))
            .map(Entity::new)
            .collect()
    }

    fn set_time_cursor(&mut self, frame: Frame) {
        self.cursor = frame;
    }

    fn position(&self, entity: &Entity) -> Result<Position, Self::Error> {
        let [x, y, z] = self.transform(entity)?.location;
        Ok(Position::new(x, y, z))
    }

    fn heading(&self, entity: &Entity) -> Result<f64, Self::Error> {
        let [rx, ry, rz] = self.transform(entity)?.rotation;
        let (_, _, yaw) = UnitQuaternion::from_euler_angles(rx, ry, rz).euler_angles();
        Ok(yaw)
    }

    fn resolve_color(&self, entity: &Entity) -> Result<Rgb, ColorResolutionError> {
        let object = self
            .object(entity)
            .map_err(|_| ColorResolutionError::NoMaterial)?;
        if let Some(color) = object.frames.get(&self.cursor).and_then(|t| t.color) {
            return Ok(Rgb::from_unit(color));
        }
        self.resolver.resolve(object.kind, &object.materials)
    }
}
