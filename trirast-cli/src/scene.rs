use std::path::Path;

use anyhow::Context as _;
use trirast::{
    DrawCall, Fragment, FragmentOutput, FragmentShader, GeometryVertex, InterpRule, RenderMode,
    VertexShader,
};

/// Row-major 4x4 matrix.
pub type Mat4 = [[f32; 4]; 4];

const IDENTITY: Mat4 = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// One render call described as JSON.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scene {
    pub width: usize,
    pub height: usize,
    #[serde(default = "default_mode")]
    pub mode: RenderMode,
    pub floats_per_vertex: usize,
    pub interp_rules: Vec<InterpRule>,
    pub vertices: Vec<f32>,
    #[serde(default)]
    pub indices: Option<Vec<u32>>,
    #[serde(default = "identity")]
    pub transform: Mat4,
    #[serde(default)]
    pub vertex_shader: VertexPreset,
    pub fragment_shader: FragmentPreset,
}

fn default_mode() -> RenderMode {
    RenderMode::Triangle
}

fn identity() -> Mat4 {
    IDENTITY
}

/// Built-in vertex stages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VertexPreset {
    /// Slots 0..4 already hold the clip-space position.
    #[default]
    Passthrough,
    /// Slots 0..3 hold a point; the clip position is `transform * [x, y, z, 1]`.
    Transform,
}

/// Built-in fragment stages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FragmentPreset {
    /// Three consecutive slots starting at `offset` are red, green, blue.
    Rgb {
        #[serde(default)]
        offset: usize,
    },
    /// One slot drives all three channels.
    Gray { slot: usize },
}

/// Data shared by both stages for one render call.
#[derive(Clone, Copy, Debug)]
pub struct Uniforms {
    pub transform: Mat4,
}

impl Uniforms {
    fn apply(&self, p: [f32; 4]) -> [f32; 4] {
        self.transform
            .map(|row| row[0] * p[0] + row[1] * p[1] + row[2] * p[2] + row[3] * p[3])
    }
}

impl VertexShader<Uniforms> for VertexPreset {
    fn transform(&self, vertex: &[f32], uniforms: &Uniforms) -> GeometryVertex {
        let position = match self {
            Self::Passthrough => [vertex[0], vertex[1], vertex[2], vertex[3]],
            Self::Transform => uniforms.apply([vertex[0], vertex[1], vertex[2], 1.0]),
        };
        GeometryVertex::new(position, vertex)
    }
}

impl FragmentShader<Uniforms> for FragmentPreset {
    fn shade(&self, fragment: &Fragment<'_>, _uniforms: &Uniforms) -> FragmentOutput {
        let c = |slot: usize| fragment.data[slot].clamp(0.0, 1.0);
        match *self {
            Self::Rgb { offset } => FragmentOutput::rgb(c(offset), c(offset + 1), c(offset + 2)),
            Self::Gray { slot } => FragmentOutput::gray(c(slot)),
        }
    }
}

impl Scene {
    /// Read and check a scene file.
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read scene '{}'", path.display()))?;
        let scene: Scene = serde_json::from_str(&text)
            .with_context(|| format!("parse scene '{}'", path.display()))?;
        scene.validate()?;
        Ok(scene)
    }

    /// Reject presets that would read slots the records do not have.
    ///
    /// Everything else (stream length, rule count, indices) is checked by the pipeline.
    pub fn validate(&self) -> anyhow::Result<()> {
        let fpv = self.floats_per_vertex;
        let position_slots = match self.vertex_shader {
            VertexPreset::Passthrough => 4,
            VertexPreset::Transform => 3,
        };
        if fpv < position_slots {
            anyhow::bail!(
                "vertex shader {:?} reads {position_slots} slots but floats_per_vertex is {fpv}",
                self.vertex_shader
            );
        }
        let fragment_end = match self.fragment_shader {
            FragmentPreset::Rgb { offset } => offset.checked_add(3),
            FragmentPreset::Gray { slot } => slot.checked_add(1),
        };
        let Some(fragment_end) = fragment_end else {
            anyhow::bail!(
                "fragment shader {:?} slot index overflows",
                self.fragment_shader
            );
        };
        if fragment_end > fpv {
            anyhow::bail!(
                "fragment shader {:?} reads slots up to {} but floats_per_vertex is {fpv}",
                self.fragment_shader,
                fragment_end - 1
            );
        }
        Ok(())
    }

    pub fn uniforms(&self) -> Uniforms {
        Uniforms {
            transform: self.transform,
        }
    }

    pub fn draw_call(&self) -> DrawCall<'_> {
        let mut draw = DrawCall::new(
            self.mode,
            &self.vertices,
            self.floats_per_vertex,
            &self.interp_rules,
        );
        if let Some(indices) = &self.indices {
            draw.indices = Some(indices);
            draw.num_triangles = indices.len() / 3;
        }
        draw
    }
}

#[cfg(test)]
#[path = "../tests/unit/scene.rs"]
mod tests;
