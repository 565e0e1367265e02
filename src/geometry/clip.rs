//! Homogeneous clip-space clipping against the canonical view volume.
//!
//! The volume is `-w <= x <= w`, `-w <= y <= w`, `-w <= z <= w`. Each bound is one half-space
//! `w ± c >= 0`; a triangle is clipped against the six half-spaces in a fixed order, and every
//! plane can turn one triangle into zero, one, or two triangles.

use smallvec::SmallVec;

use crate::{
    foundation::core::InterpRule,
    geometry::vertex::{GeometryVertex, Triangle},
};

/// Number of clip planes; reaching this plane index means "inside the whole volume".
pub const CLIP_PLANE_COUNT: usize = 6;

/// One half-space of the canonical view volume.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClipPlane {
    /// `x <= w`
    Right,
    /// `x >= -w`
    Left,
    /// `y <= w`
    Top,
    /// `y >= -w`
    Bottom,
    /// `z <= w`
    Far,
    /// `z >= -w`
    Near,
}

impl ClipPlane {
    /// Planes in clipping order; the array index is the plane index.
    pub const ALL: [ClipPlane; CLIP_PLANE_COUNT] = [
        ClipPlane::Right,
        ClipPlane::Left,
        ClipPlane::Top,
        ClipPlane::Bottom,
        ClipPlane::Far,
        ClipPlane::Near,
    ];

    /// Signed distance of a clip-space position; `>= 0` is inside.
    #[inline]
    pub fn signed_distance(self, p: &[f32; 4]) -> f32 {
        let [x, y, z, w] = *p;
        match self {
            Self::Right => w - x,
            Self::Left => w + x,
            Self::Top => w - y,
            Self::Bottom => w + y,
            Self::Far => w - z,
            Self::Near => w + z,
        }
    }

    fn distances(self, tri: &Triangle) -> [f32; 3] {
        tri.vertices
            .each_ref()
            .map(|v| self.signed_distance(&v.position))
    }

    /// Whether the plane cuts `tri` (some but not all vertices inside).
    pub fn straddles(self, tri: &Triangle) -> bool {
        let inside = self.distances(tri).iter().filter(|&&d| d >= 0.0).count();
        inside == 1 || inside == 2
    }
}

/// Result of clipping one triangle against one plane.
#[derive(Clone, Debug, PartialEq)]
pub enum ClipOutcome {
    /// Entirely outside the half-space.
    Culled,
    /// Entirely inside (returned unchanged) or one vertex inside.
    One(Triangle),
    /// Two vertices inside: the clipped quad split along a diagonal.
    Two(Triangle, Triangle),
}

/// Per-triangle clipping summary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClipStats {
    /// Triangles forwarded past the last plane.
    pub emitted: usize,
    /// Whether any plane actually cut the triangle (or a piece of it).
    pub split: bool,
}

/// Clip `tri` against a single plane.
///
/// A vertex exactly on the plane counts as inside. A vertex with a NaN coordinate counts as
/// outside. New vertices interpolate position and every attribute slot linearly in clip space;
/// `flat` slots of each output triangle's vertex 0 are then reset to the input's provoking
/// vertex so flat shading survives re-triangulation.
pub fn clip_against_plane(tri: Triangle, plane: ClipPlane, rules: &[InterpRule]) -> ClipOutcome {
    let d = plane.distances(&tri);
    let inside = d.map(|v| v >= 0.0);
    match inside.iter().filter(|&&i| i).count() {
        3 => return ClipOutcome::One(tri),
        0 => return ClipOutcome::Culled,
        _ => {}
    }

    let mut poly: SmallVec<[GeometryVertex; 4]> = SmallVec::new();
    for i in 0..3 {
        let j = (i + 1) % 3;
        let a = &tri.vertices[i];
        if inside[i] {
            poly.push(a.clone());
        }
        if inside[i] != inside[j] {
            let t = d[i] / (d[i] - d[j]);
            poly.push(a.lerp(&tri.vertices[j], t));
        }
    }

    let provoking = &tri.vertices[0];
    let mut first = Triangle::new(poly[0].clone(), poly[1].clone(), poly[2].clone());
    inherit_flat(&mut first, provoking, rules);
    if poly.len() == 4 {
        let mut second = Triangle::new(poly[0].clone(), poly[2].clone(), poly[3].clone());
        inherit_flat(&mut second, provoking, rules);
        ClipOutcome::Two(first, second)
    } else {
        ClipOutcome::One(first)
    }
}

fn inherit_flat(tri: &mut Triangle, provoking: &GeometryVertex, rules: &[InterpRule]) {
    let target = &mut tri.vertices[0].data;
    for ((slot, &value), rule) in target.iter_mut().zip(provoking.data.iter()).zip(rules) {
        if *rule == InterpRule::Flat {
            *slot = value;
        }
    }
}

/// Clip `tri` against all six planes and hand every surviving piece to `emit`.
///
/// Pending pieces live on an explicit stack instead of the call stack; each plane at most
/// doubles the piece count, so one input yields at most 64 outputs. Pieces are emitted in
/// the order the polygon splits produce them.
pub fn clip_triangle(
    tri: Triangle,
    rules: &[InterpRule],
    mut emit: impl FnMut(Triangle),
) -> ClipStats {
    let mut stats = ClipStats::default();
    let mut pending: SmallVec<[(Triangle, usize); 8]> = SmallVec::new();
    pending.push((tri, 0));

    while let Some((tri, plane_idx)) = pending.pop() {
        if plane_idx == CLIP_PLANE_COUNT {
            stats.emitted += 1;
            emit(tri);
            continue;
        }
        let plane = ClipPlane::ALL[plane_idx];
        stats.split |= plane.straddles(&tri);
        match clip_against_plane(tri, plane, rules) {
            ClipOutcome::Culled => {}
            ClipOutcome::One(t) => pending.push((t, plane_idx + 1)),
            ClipOutcome::Two(a, b) => {
                pending.push((b, plane_idx + 1));
                pending.push((a, plane_idx + 1));
            }
        }
    }

    stats
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/clip.rs"]
mod tests;
