//! trirast is a software triangle rasterizer.
//!
//! It is the CPU equivalent of a GPU's fixed-function front end: a flat vertex stream goes
//! through a caller-supplied [`VertexShader`], is grouped into triangles by a [`RenderMode`],
//! clipped against the homogeneous view volume, scan converted with barycentric weights, depth
//! tested, and colored by a caller-supplied [`FragmentShader`].
//!
//! - Create a [`Pipeline`] for an image size
//! - Describe geometry with a [`DrawCall`]
//! - Call [`Pipeline::render`] and read the [`FrameBuffer`]
//!
//! ```
//! use trirast::{
//!     DrawCall, Fragment, FragmentOutput, GeometryVertex, InterpRule, Pipeline, RenderMode,
//!     RenderSettings,
//! };
//!
//! // x, y, shade
//! let data = [-1.0, -1.0, 0.0, 1.0, -1.0, 0.5, -1.0, 1.0, 1.0];
//! let rules = [InterpRule::Noperspective; 3];
//! let draw = DrawCall::new(RenderMode::Triangle, &data, 3, &rules);
//!
//! let vs = |v: &[f32], _: &()| GeometryVertex::new([v[0], v[1], 0.0, 1.0], v);
//! let fs = |f: &Fragment<'_>, _: &()| FragmentOutput::gray(f.data[2]);
//!
//! let mut pipeline = Pipeline::new(8, 8, RenderSettings::default())?;
//! let stats = pipeline.render(&draw, &vs, &fs, &())?;
//! assert_eq!(stats.triangles_rasterized, 1);
//! # Ok::<(), trirast::RasterError>(())
//! ```
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;
mod geometry;
mod render;

pub use crate::foundation::core::{InterpRule, MAX_FLOATS_PER_VERTEX, Pixel, RenderMode};
pub use crate::foundation::error::{RasterError, RasterResult};

pub use crate::geometry::assembly::{DrawCall, assemble};
pub use crate::geometry::clip::{
    CLIP_PLANE_COUNT, ClipOutcome, ClipPlane, ClipStats, clip_against_plane, clip_triangle,
};
pub use crate::geometry::vertex::{Attributes, GeometryVertex, Triangle};

pub use crate::render::framebuffer::FrameBuffer;
pub use crate::render::pipeline::{Pipeline, RenderSettings, RenderStats, RenderThreading};
pub use crate::render::shader::{Fragment, FragmentOutput, FragmentShader, VertexShader};
