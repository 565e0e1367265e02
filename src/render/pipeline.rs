use rayon::prelude::*;

use crate::{
    foundation::error::{RasterError, RasterResult},
    geometry::{
        assembly::{DrawCall, assemble},
        clip::{ClipStats, clip_triangle},
    },
    render::{
        framebuffer::FrameBuffer,
        raster::{self, ScreenTriangle},
        shader::{FragmentShader, VertexShader},
    },
};

/// How a render call spreads rasterization across threads.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderThreading {
    /// Rasterize horizontal bands on a rayon pool instead of the calling thread.
    pub parallel: bool,
    /// Worker count for the pool; `None` uses rayon's default.
    pub threads: Option<usize>,
    /// Rows per band; `0` is treated as `1`.
    pub rows_per_band: usize,
}

impl Default for RenderThreading {
    fn default() -> Self {
        Self {
            parallel: false,
            threads: None,
            rows_per_band: 16,
        }
    }
}

/// Pipeline-wide render settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Threading configuration.
    pub threading: RenderThreading,
}

/// Counters collected by one render call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct RenderStats {
    /// Triangles produced by primitive assembly.
    pub triangles_assembled: u64,
    /// Assembled triangles that left nothing after clipping.
    pub triangles_culled: u64,
    /// Assembled triangles cut by at least one clip plane.
    pub triangles_clipped: u64,
    /// Post-clip triangles skipped before the pixel loop (zero area, unusable `w`).
    pub triangles_degenerate: u64,
    /// Post-clip triangles that entered the pixel loop.
    pub triangles_rasterized: u64,
    /// Fragment shader invocations, one per pixel that passed the depth test.
    pub fragments_shaded: u64,
}

impl RenderStats {
    fn record_clip(&mut self, clip: ClipStats) {
        self.triangles_assembled += 1;
        if clip.emitted == 0 {
            self.triangles_culled += 1;
        }
        if clip.split {
            self.triangles_clipped += 1;
        }
    }
}

/// A render target plus the settings used to draw into it.
///
/// Create one per image size; call [`Pipeline::render`] any number of times to accumulate
/// geometry under the depth test, and [`Pipeline::clear`] to start a new frame.
#[derive(Clone, Debug)]
pub struct Pipeline {
    framebuffer: FrameBuffer,
    settings: RenderSettings,
}

impl Pipeline {
    /// Allocate a cleared `width x height` target.
    pub fn new(width: usize, height: usize, settings: RenderSettings) -> RasterResult<Self> {
        Ok(Self {
            framebuffer: FrameBuffer::new(width, height)?,
            settings,
        })
    }

    /// The render target.
    pub fn framebuffer(&self) -> &FrameBuffer {
        &self.framebuffer
    }

    /// Give up the pipeline and keep the rendered image.
    pub fn into_framebuffer(self) -> FrameBuffer {
        self.framebuffer
    }

    /// Current settings.
    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Mutable settings; changes apply to the next render call.
    pub fn settings_mut(&mut self) -> &mut RenderSettings {
        &mut self.settings
    }

    /// Reset color to black and depth to `+inf`.
    pub fn clear(&mut self) {
        self.framebuffer.clear();
    }

    /// Draw `draw` into the frame buffer.
    ///
    /// The call is validated first; a rejected call runs no shader and leaves the frame buffer
    /// untouched. Triangles are assembled and clipped in submission order. With
    /// `threading.parallel` set, set-up triangles are rasterized per row band on a rayon pool,
    /// which produces the same image as the sequential path.
    ///
    /// A vertex shader that returns the wrong number of attribute slots aborts the call with
    /// [`RasterError::InvalidConfig`]; on the sequential path, triangles drawn before it stay.
    #[tracing::instrument(
        skip(self, draw, vertex_shader, fragment_shader, uniforms),
        fields(
            mode = %draw.mode,
            width = self.framebuffer.width(),
            height = self.framebuffer.height(),
            parallel = self.settings.threading.parallel,
        )
    )]
    pub fn render<U, V, F>(
        &mut self,
        draw: &DrawCall<'_>,
        vertex_shader: &V,
        fragment_shader: &F,
        uniforms: &U,
    ) -> RasterResult<RenderStats>
    where
        U: Sync + ?Sized,
        V: VertexShader<U> + ?Sized,
        F: FragmentShader<U> + Sync + ?Sized,
    {
        draw.validate()?;
        let threading = &self.settings.threading;
        let stats = if threading.parallel {
            let pool = build_thread_pool(threading.threads)?;
            let rows_per_band =
                normalized_rows_per_band(threading.rows_per_band, self.framebuffer.height());
            self.render_banded(
                draw,
                vertex_shader,
                fragment_shader,
                uniforms,
                &pool,
                rows_per_band,
            )?
        } else {
            self.render_sequential(draw, vertex_shader, fragment_shader, uniforms)?
        };

        tracing::debug!(?stats, "render finished");
        Ok(stats)
    }

    fn render_sequential<U, V, F>(
        &mut self,
        draw: &DrawCall<'_>,
        vertex_shader: &V,
        fragment_shader: &F,
        uniforms: &U,
    ) -> RasterResult<RenderStats>
    where
        U: ?Sized,
        V: VertexShader<U> + ?Sized,
        F: FragmentShader<U> + ?Sized,
    {
        let (width, height) = (self.framebuffer.width(), self.framebuffer.height());
        let rules = draw.interp_rules;
        let mut band = self.framebuffer.as_band();
        let mut stats = RenderStats::default();

        assemble(draw, vertex_shader, uniforms, |tri| {
            let clip = clip_triangle(tri, rules, |piece| {
                match raster::setup(piece, width, height) {
                    Some(screen) => {
                        stats.triangles_rasterized += 1;
                        stats.fragments_shaded +=
                            raster::rasterize(&mut band, &screen, rules, fragment_shader, uniforms);
                    }
                    None => stats.triangles_degenerate += 1,
                }
            });
            stats.record_clip(clip);
        })?;

        Ok(stats)
    }

    fn render_banded<U, V, F>(
        &mut self,
        draw: &DrawCall<'_>,
        vertex_shader: &V,
        fragment_shader: &F,
        uniforms: &U,
        pool: &rayon::ThreadPool,
        rows_per_band: usize,
    ) -> RasterResult<RenderStats>
    where
        U: Sync + ?Sized,
        V: VertexShader<U> + ?Sized,
        F: FragmentShader<U> + Sync + ?Sized,
    {
        let (width, height) = (self.framebuffer.width(), self.framebuffer.height());
        let rules = draw.interp_rules;
        let mut stats = RenderStats::default();
        let mut prepared = Vec::<ScreenTriangle>::new();

        assemble(draw, vertex_shader, uniforms, |tri| {
            let clip = clip_triangle(tri, rules, |piece| {
                match raster::setup(piece, width, height) {
                    Some(screen) => prepared.push(screen),
                    None => stats.triangles_degenerate += 1,
                }
            });
            stats.record_clip(clip);
        })?;
        stats.triangles_rasterized = prepared.len() as u64;

        let framebuffer = &mut self.framebuffer;
        stats.fragments_shaded = pool.install(|| {
            framebuffer
                .par_bands_mut(rows_per_band)
                .map(|mut band| {
                    prepared
                        .iter()
                        .map(|tri| {
                            raster::rasterize(&mut band, tri, rules, fragment_shader, uniforms)
                        })
                        .sum::<u64>()
                })
                .sum()
        });

        Ok(stats)
    }
}

fn build_thread_pool(threads: Option<usize>) -> RasterResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(RasterError::threading(
            "render threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| RasterError::threading(format!("failed to build rayon thread pool: {e}")))
}

/// Band height in `1..=height`; zero means one row, anything past the target means one band.
fn normalized_rows_per_band(rows_per_band: usize, height: usize) -> usize {
    rows_per_band.clamp(1, height.max(1))
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
