//! Programmable stages of the pipeline.
//!
//! The pipeline owns the fixed-function work (assembly, clipping, rasterization, depth test);
//! callers supply a [`VertexShader`] and a [`FragmentShader`]. Both are treated as pure functions
//! of their inputs and the caller's uniform data, which the pipeline passes through untouched.
//!
//! Closures with the matching signature implement both traits, which keeps test stubs short:
//!
//! ```
//! use trirast::{Fragment, FragmentOutput, GeometryVertex};
//!
//! let vs = |v: &[f32], _: &()| GeometryVertex::new([v[0], v[1], 0.0, 1.0], &v[2..]);
//! let fs = |f: &Fragment<'_>, _: &()| FragmentOutput::gray(f.data[0]);
//! # let _ = (vs, fs);
//! ```

use crate::{foundation::core::Pixel, geometry::vertex::GeometryVertex};

/// Per-vertex stage: turns one raw vertex record into a clip-space vertex.
pub trait VertexShader<U: ?Sized> {
    /// Transform the `floats_per_vertex` floats of one record.
    ///
    /// The returned vertex must carry exactly `floats_per_vertex` attribute slots.
    fn transform(&self, vertex: &[f32], uniforms: &U) -> GeometryVertex;
}

impl<U: ?Sized, F> VertexShader<U> for F
where
    F: Fn(&[f32], &U) -> GeometryVertex,
{
    fn transform(&self, vertex: &[f32], uniforms: &U) -> GeometryVertex {
        self(vertex, uniforms)
    }
}

/// Per-pixel stage: colors one fragment that passed the depth test.
pub trait FragmentShader<U: ?Sized> {
    /// Produce the color for `fragment`.
    fn shade(&self, fragment: &Fragment<'_>, uniforms: &U) -> FragmentOutput;
}

impl<U: ?Sized, F> FragmentShader<U> for F
where
    F: Fn(&Fragment<'_>, &U) -> FragmentOutput,
{
    fn shade(&self, fragment: &Fragment<'_>, uniforms: &U) -> FragmentOutput {
        self(fragment, uniforms)
    }
}

/// Reconstructed per-pixel attributes handed to the fragment shader.
#[derive(Clone, Copy, Debug)]
pub struct Fragment<'a> {
    /// Pixel column.
    pub x: usize,
    /// Pixel row (row 0 is the bottom of normalized device space).
    pub y: usize,
    /// Screen-space depth that passed the depth test.
    pub depth: f32,
    /// One value per attribute slot, reconstructed with the slot's [`crate::InterpRule`].
    pub data: &'a [f32],
}

/// Color produced by a fragment shader, nominally in `[0, 1]` per channel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FragmentOutput {
    /// Red, green, blue.
    pub color: [f32; 3],
}

impl FragmentOutput {
    /// Build an RGB output.
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { color: [r, g, b] }
    }

    /// Build a grayscale output.
    pub fn gray(v: f32) -> Self {
        Self { color: [v, v, v] }
    }

    /// Pack into the frame buffer's pixel format (truncating, unclamped).
    pub fn to_pixel(self) -> Pixel {
        let [r, g, b] = self.color;
        Pixel::from_unit_rgb(r, g, b)
    }
}
