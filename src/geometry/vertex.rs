use smallvec::SmallVec;

use crate::foundation::math::lerp;

/// Interpolable attribute slots carried by a vertex.
///
/// Inline storage covers the common layouts (position + color + normal) without a heap
/// allocation per vertex.
pub type Attributes = SmallVec<[f32; 12]>;

/// Output of the vertex transform: clip-space position plus attribute slots.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GeometryVertex {
    /// Homogeneous clip-space position `[x, y, z, w]`.
    pub position: [f32; 4],
    /// Attribute slots, one per interpolation rule.
    pub data: Attributes,
}

impl GeometryVertex {
    /// Create a vertex from a clip position and attribute slots.
    pub fn new(position: [f32; 4], data: &[f32]) -> Self {
        Self {
            position,
            data: SmallVec::from_slice(data),
        }
    }

    /// Homogeneous `w`.
    #[inline]
    pub fn w(&self) -> f32 {
        self.position[3]
    }

    /// Interpolate position and every attribute slot linearly in clip space.
    pub(crate) fn lerp(&self, other: &Self, t: f32) -> Self {
        let mut position = [0.0; 4];
        for (i, p) in position.iter_mut().enumerate() {
            *p = lerp(self.position[i], other.position[i], t);
        }
        let data = self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(&a, &b)| lerp(a, b, t))
            .collect();
        Self { position, data }
    }
}

/// Three vertices in submission order; vertex 0 is the provoking vertex.
#[derive(Clone, Debug, PartialEq)]
pub struct Triangle {
    /// Vertices in the order the assembler emitted them.
    pub vertices: [GeometryVertex; 3],
}

impl Triangle {
    /// Build a triangle from three vertices.
    pub fn new(a: GeometryVertex, b: GeometryVertex, c: GeometryVertex) -> Self {
        Self {
            vertices: [a, b, c],
        }
    }

    /// Twice the signed area of the triangle's `(x, y)` projection in clip space.
    ///
    /// Used to measure clipped coverage; the rasterizer works on screen coordinates instead.
    pub fn clip_area2(&self) -> f32 {
        let [a, b, c] = &self.vertices;
        let (ax, ay) = (a.position[0], a.position[1]);
        let (bx, by) = (b.position[0], b.position[1]);
        let (cx, cy) = (c.position[0], c.position[1]);
        (bx - ax) * (cy - ay) - (by - ay) * (cx - ax)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/vertex.rs"]
mod tests;
