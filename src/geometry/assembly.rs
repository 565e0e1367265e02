use crate::{
    foundation::core::{InterpRule, MAX_FLOATS_PER_VERTEX, RenderMode},
    foundation::error::{RasterError, RasterResult},
    geometry::vertex::{GeometryVertex, Triangle},
    render::shader::VertexShader,
};

/// Everything one render invocation draws.
///
/// The vertex stream is a flat run of floats grouped into records of `floats_per_vertex`; the
/// grouping is opaque to the pipeline beyond that stride. `interp_rules` has one entry per slot.
#[derive(Clone, Copy, Debug)]
pub struct DrawCall<'a> {
    /// Topology used to group vertices into triangles.
    pub mode: RenderMode,
    /// Raw vertex records, back to back.
    pub vertex_data: &'a [f32],
    /// Number of records to consume from `vertex_data`.
    pub num_vertices: usize,
    /// Record stride and attribute slot count.
    pub floats_per_vertex: usize,
    /// Reconstruction rule per attribute slot.
    pub interp_rules: &'a [InterpRule],
    /// Index array (indexed mode only).
    pub indices: Option<&'a [u32]>,
    /// Number of index triples to consume (indexed mode only).
    pub num_triangles: usize,
}

impl<'a> DrawCall<'a> {
    /// Non-indexed draw covering every whole record in `vertex_data`.
    pub fn new(
        mode: RenderMode,
        vertex_data: &'a [f32],
        floats_per_vertex: usize,
        interp_rules: &'a [InterpRule],
    ) -> Self {
        Self {
            mode,
            vertex_data,
            num_vertices: vertex_data.len().checked_div(floats_per_vertex).unwrap_or(0),
            floats_per_vertex,
            interp_rules,
            indices: None,
            num_triangles: 0,
        }
    }

    /// Indexed draw consuming every whole index triple in `indices`.
    pub fn indexed(
        vertex_data: &'a [f32],
        floats_per_vertex: usize,
        interp_rules: &'a [InterpRule],
        indices: &'a [u32],
    ) -> Self {
        Self {
            indices: Some(indices),
            num_triangles: indices.len() / 3,
            ..Self::new(
                RenderMode::Indexed,
                vertex_data,
                floats_per_vertex,
                interp_rules,
            )
        }
    }

    /// Reject contract violations before any shader runs.
    pub fn validate(&self) -> RasterResult<()> {
        let fpv = self.floats_per_vertex;
        if fpv == 0 || fpv > MAX_FLOATS_PER_VERTEX {
            return Err(RasterError::invalid_config(format!(
                "floats_per_vertex must be in 1..={MAX_FLOATS_PER_VERTEX}, got {fpv}"
            )));
        }
        if self.interp_rules.len() != fpv {
            return Err(RasterError::invalid_config(format!(
                "interp_rules has {} entries, expected floats_per_vertex = {fpv}",
                self.interp_rules.len()
            )));
        }
        let needed = self.num_vertices.checked_mul(fpv).ok_or_else(|| {
            RasterError::invalid_config("num_vertices * floats_per_vertex overflows")
        })?;
        if self.vertex_data.len() < needed {
            return Err(RasterError::invalid_config(format!(
                "vertex stream holds {} floats, {} vertices x {fpv} need {needed}",
                self.vertex_data.len(),
                self.num_vertices
            )));
        }

        if self.mode == RenderMode::Indexed {
            let indices = self.indices.ok_or_else(|| {
                RasterError::invalid_config("indexed mode requires an index array")
            })?;
            let needed = self.num_triangles.checked_mul(3).ok_or_else(|| {
                RasterError::invalid_config("num_triangles * 3 overflows")
            })?;
            if indices.len() < needed {
                return Err(RasterError::invalid_config(format!(
                    "index array holds {} entries, {} triangles need {needed}",
                    indices.len(),
                    self.num_triangles
                )));
            }
            if let Some(bad) = indices[..needed]
                .iter()
                .find(|&&i| i as usize >= self.num_vertices)
            {
                return Err(RasterError::invalid_config(format!(
                    "index {bad} out of range for {} vertices",
                    self.num_vertices
                )));
            }
        }
        Ok(())
    }

    /// Number of triangles the topology yields for this call.
    pub fn triangle_count(&self) -> usize {
        match self.mode {
            RenderMode::Triangle => self.num_vertices / 3,
            RenderMode::Indexed => self.num_triangles,
            RenderMode::Fan | RenderMode::Strip => self.num_vertices.saturating_sub(2),
        }
    }

    fn record(&self, index: usize) -> &'a [f32] {
        let start = index * self.floats_per_vertex;
        &self.vertex_data[start..start + self.floats_per_vertex]
    }
}

/// Walk the vertex stream, run the vertex shader, and emit triangles in topology order.
///
/// Triangle, fan and strip modes transform each consumed record once and reuse the result for
/// every triangle that shares it. Indexed mode transforms once per index reference. `draw` is
/// validated first, so a call that breaks its contract fails before any shader runs. Returns the
/// number of emitted triangles.
pub fn assemble<U, V>(
    draw: &DrawCall<'_>,
    shader: &V,
    uniforms: &U,
    mut emit: impl FnMut(Triangle),
) -> RasterResult<usize>
where
    U: ?Sized,
    V: VertexShader<U> + ?Sized,
{
    draw.validate()?;
    let fetch = |index: usize| transform_record(draw, shader, uniforms, index);
    let mut emitted = 0;

    match draw.mode {
        RenderMode::Triangle => {
            for t in 0..draw.num_vertices / 3 {
                let a = fetch(3 * t)?;
                let b = fetch(3 * t + 1)?;
                let c = fetch(3 * t + 2)?;
                emit(Triangle::new(a, b, c));
                emitted += 1;
            }
        }
        RenderMode::Indexed => {
            let indices = draw.indices.ok_or_else(|| {
                RasterError::invalid_config("indexed mode requires an index array")
            })?;
            for tri in indices[..draw.num_triangles * 3].chunks_exact(3) {
                let a = fetch(tri[0] as usize)?;
                let b = fetch(tri[1] as usize)?;
                let c = fetch(tri[2] as usize)?;
                emit(Triangle::new(a, b, c));
                emitted += 1;
            }
        }
        RenderMode::Fan => {
            if draw.num_vertices < 3 {
                return Ok(0);
            }
            let hub = fetch(0)?;
            let mut prev = fetch(1)?;
            for k in 2..draw.num_vertices {
                let next = fetch(k)?;
                let rim = std::mem::replace(&mut prev, next.clone());
                emit(Triangle::new(hub.clone(), rim, next));
                emitted += 1;
            }
        }
        RenderMode::Strip => {
            if draw.num_vertices < 3 {
                return Ok(0);
            }
            let mut a = fetch(0)?;
            let mut b = fetch(1)?;
            for k in 2..draw.num_vertices {
                let c = fetch(k)?;
                let first = std::mem::replace(&mut a, b.clone());
                let second = std::mem::replace(&mut b, c.clone());
                emit(Triangle::new(first, second, c));
                emitted += 1;
            }
        }
    }

    Ok(emitted)
}

fn transform_record<U, V>(
    draw: &DrawCall<'_>,
    shader: &V,
    uniforms: &U,
    index: usize,
) -> RasterResult<GeometryVertex>
where
    U: ?Sized,
    V: VertexShader<U> + ?Sized,
{
    let out = shader.transform(draw.record(index), uniforms);
    if out.data.len() != draw.floats_per_vertex {
        return Err(RasterError::invalid_config(format!(
            "vertex shader returned {} attribute slots for vertex {index}, expected {}",
            out.data.len(),
            draw.floats_per_vertex
        )));
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/assembly.rs"]
mod tests;
