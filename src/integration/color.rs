//! Display color resolution from a host-independent material description.
//!
//! Only the first material slot of an object is considered. A material that
//! does not use nodes contributes its diffuse color; a node material must
//! route a Principled BSDF into its material output, and the BSDF's
//! `Base Color` input value is used.

use serde::{Deserialize, Serialize};

use crate::motion::Rgb;

/// Why a display color could not be determined.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ColorResolutionError {
    #[error("object is not a mesh")]
    NotAMesh,

    #[error("object has no materials")]
    NoMaterial,

    #[error("material '{0}' has no material output node")]
    NoOutputNode(String),

    #[error("material output of '{0}' has no shader input")]
    NoShaderInput(String),

    #[error("shader input of '{0}' is not linked to any node")]
    UnlinkedShader(String),

    #[error("material '{material}' links to missing node #{index}")]
    DanglingLink { material: String, index: usize },

    #[error("shader of '{material}' is {kind:?}, expected a Principled BSDF")]
    UnsupportedShader { material: String, kind: NodeKind },

    #[error("Principled BSDF of '{0}' has no 'Base Color' input")]
    NoBaseColor(String),
}

/// Kind of scene object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    #[default]
    Mesh,
    Empty,
    Light,
    Camera,
    Curve,
    #[serde(other)]
    Other,
}

/// Shader node types the resolver distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeKind {
    OutputMaterial,
    BsdfPrincipled,
    BsdfDiffuse,
    Emission,
    #[serde(other)]
    Other,
}

/// Socket data type of a node input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SocketKind {
    Shader,
    Rgba,
    Value,
    Vector,
    #[serde(other)]
    Other,
}

/// Input socket of a shader node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeInput {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: SocketKind,
    /// Unlinked value of the socket. Colors carry RGB(A) in `[0, 1]`.
    #[serde(default)]
    pub default_value: Vec<f32>,
    /// Index of the node linked into this socket, within the material's nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_node: Option<usize>,
}

/// Node of a material's shader graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShaderNode {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default)]
    pub inputs: Vec<NodeInput>,
}

/// Material assigned to an object slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_diffuse")]
    pub diffuse_color: [f32; 3],
    #[serde(default)]
    pub use_nodes: bool,
    #[serde(default)]
    pub nodes: Vec<ShaderNode>,
}

fn default_diffuse() -> [f32; 3] {
    [0.8, 0.8, 0.8]
}

impl Material {
    /// Plain material without a node tree.
    pub fn diffuse(name: impl Into<String>, color: [f32; 3]) -> Self {
        Self {
            name: name.into(),
            diffuse_color: color,
            use_nodes: false,
            nodes: Vec::new(),
        }
    }

    /// Node material routing a Principled BSDF with `base_color` into the output.
    pub fn principled(name: impl Into<String>, base_color: [f32; 3]) -> Self {
        let [r, g, b] = base_color;
        Self {
            name: name.into(),
            diffuse_color: default_diffuse(),
            use_nodes: true,
            nodes: vec![
                ShaderNode {
                    name: "Material Output".into(),
                    kind: NodeKind::OutputMaterial,
                    inputs: vec![NodeInput {
                        name: "Surface".into(),
                        kind: SocketKind::Shader,
                        default_value: Vec::new(),
                        from_node: Some(1),
                    }],
                },
                ShaderNode {
                    name: "Principled BSDF".into(),
                    kind: NodeKind::BsdfPrincipled,
                    inputs: vec![NodeInput {
                        name: "Base Color".into(),
                        kind: SocketKind::Rgba,
                        default_value: vec![r, g, b, 1.0],
                        from_node: None,
                    }],
                },
            ],
        }
    }
}

/// Strategy turning an object's materials into a display color.
pub trait ColorResolver {
    fn resolve(
        &self,
        kind: ObjectKind,
        materials: &[Material],
    ) -> Result<Rgb, ColorResolutionError>;
}

/// Resolver following the material slot and shader node conventions above.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaterialColorResolver;

impl ColorResolver for MaterialColorResolver {
    fn resolve(
        &self,
        kind: ObjectKind,
        materials: &[Material],
    ) -> Result<Rgb, ColorResolutionError> {
        if kind != ObjectKind::Mesh {
            return Err(ColorResolutionError::NotAMesh);
        }
        let material = materials.first().ok_or(ColorResolutionError::NoMaterial)?;

        if !material.use_nodes {
            return Ok(Rgb::from_unit(material.diffuse_color));
        }

        let output = material
            .nodes
            .iter()
            .find(|n| n.kind == NodeKind::OutputMaterial)
            .ok_or_else(|| ColorResolutionError::NoOutputNode(material.name.clone()))?;

        let shader_input = output
            .inputs
            .iter()
            .find(|i| i.kind == SocketKind::Shader)
            .ok_or_else(|| ColorResolutionError::NoShaderInput(material.name.clone()))?;

        let index = shader_input
            .from_node
            .ok_or_else(|| ColorResolutionError::UnlinkedShader(material.name.clone()))?;
        let shader = material
            .nodes
            .get(index)
            .ok_or_else(|| ColorResolutionError::DanglingLink {
                material: material.name.clone(),
                index,
            })?;

        if shader.kind != NodeKind::BsdfPrincipled {
            return Err(ColorResolutionError::UnsupportedShader {
                material: material.name.clone(),
                kind: shader.kind,
            });
        }

        let base_color = shader
            .inputs
            .iter()
            .find(|i| i.name == "Base Color")
            .ok_or_else(|| ColorResolutionError::NoBaseColor(material.name.clone()))?;

        let channel = |i: usize| base_color.default_value.get(i).copied().unwrap_or(0.0);
        Ok(Rgb::from_unit([channel(0), channel(1), channel(2)]))
    }
}
