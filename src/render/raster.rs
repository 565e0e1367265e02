//! Scan conversion of clipped triangles.
//!
//! Setup runs once per triangle: perspective divide, viewport mapping to integer pixel
//! coordinates, bounding box and signed area. The pixel loop then walks the box, evaluates edge
//! functions at integer pixel coordinates, depth-tests, reconstructs attributes and shades.

use crate::{
    foundation::{core::InterpRule, math::edge},
    geometry::vertex::{Attributes, Triangle},
    render::{
        framebuffer::FrameBand,
        shader::{Fragment, FragmentShader},
    },
};

/// A clipped triangle mapped to the pixel grid, ready for the pixel loop.
#[derive(Clone, Debug)]
pub(crate) struct ScreenTriangle {
    /// Pixel coordinates, truncated after the viewport transform.
    pub(crate) xy: [(i64, i64); 3],
    /// Screen-space depths (integral values).
    pub(crate) z: [f32; 3],
    /// Clip-space `w`, kept for perspective correction.
    pub(crate) w: [f32; 3],
    /// Attribute slots per vertex.
    pub(crate) attrs: [Attributes; 3],
    /// Twice the signed screen-space area; never zero.
    pub(crate) area2: i64,
    /// Inclusive pixel bounds `(min_x, max_x, min_y, max_y)`, clamped to the buffer.
    pub(crate) bounds: (usize, usize, usize, usize),
}

/// Map a clipped triangle to the pixel grid.
///
/// Returns `None` for triangles that cannot produce pixels: non-positive or non-finite `w`,
/// non-finite coordinates, zero screen-space area, or a bounding box off the buffer.
pub(crate) fn setup(tri: Triangle, width: usize, height: usize) -> Option<ScreenTriangle> {
    let half_w = width as f32 / 2.0;
    let half_h = height as f32 / 2.0;

    let mut xy = [(0i64, 0i64); 3];
    let mut z = [0.0f32; 3];
    let mut w = [0.0f32; 3];
    for (i, v) in tri.vertices.iter().enumerate() {
        let [px, py, pz, pw] = v.position;
        if !(pw > 0.0 && pw.is_finite()) {
            tracing::trace!(w = pw, "skipping triangle with unusable w");
            return None;
        }
        let sx = half_w * (px / pw) + (half_w - 0.5);
        let sy = half_h * (py / pw) + (half_h - 0.5);
        let sz = half_w * (pz / pw) + (half_w - 0.5);
        if !(sx.is_finite() && sy.is_finite() && sz.is_finite()) {
            tracing::trace!("skipping triangle with non-finite screen position");
            return None;
        }
        xy[i] = (sx as i64, sy as i64);
        z[i] = (sz as i64) as f32;
        w[i] = pw;
    }

    let area2 = edge(xy[0], xy[1], xy[2]);
    if area2 == 0 {
        tracing::trace!(?xy, "skipping zero-area triangle");
        return None;
    }

    let min_x = xy.iter().map(|p| p.0).min()?.max(0);
    let max_x = xy.iter().map(|p| p.0).max()?.min(width as i64 - 1);
    let min_y = xy.iter().map(|p| p.1).min()?.max(0);
    let max_y = xy.iter().map(|p| p.1).max()?.min(height as i64 - 1);
    if min_x > max_x || min_y > max_y {
        return None;
    }

    let [a, b, c] = tri.vertices;
    Some(ScreenTriangle {
        xy,
        z,
        w,
        attrs: [a.data, b.data, c.data],
        area2,
        bounds: (
            min_x as usize,
            max_x as usize,
            min_y as usize,
            max_y as usize,
        ),
    })
}

impl ScreenTriangle {
    /// Barycentric weights `[alpha, beta, gamma]` of pixel `(x, y)`.
    #[inline]
    pub(crate) fn barycentric(&self, x: i64, y: i64) -> [f32; 3] {
        let [v0, v1, v2] = self.xy;
        let p = (x, y);
        let area = self.area2 as f32;
        [
            edge(v1, v2, p) as f32 / area,
            edge(v2, v0, p) as f32 / area,
            edge(v0, v1, p) as f32 / area,
        ]
    }
}

/// Reweight screen-space barycentrics by `1/w` so the combination is linear in clip space.
#[inline]
pub(crate) fn perspective_weights(bary: [f32; 3], w: [f32; 3]) -> [f32; 3] {
    let [alpha, beta, gamma] = bary;
    let kc = alpha / w[0] + beta / w[1] + gamma / w[2];
    [
        alpha / (kc * w[0]),
        beta / (kc * w[1]),
        gamma / (kc * w[2]),
    ]
}

/// Final combination step shared by `smooth` and `noperspective`.
#[inline]
pub(crate) fn combine(weights: [f32; 3], values: [f32; 3]) -> f32 {
    weights[0] * values[0] + weights[1] * values[1] + weights[2] * values[2]
}

/// Fill `out` with one reconstructed value per slot.
pub(crate) fn reconstruct(
    tri: &ScreenTriangle,
    rules: &[InterpRule],
    bary: [f32; 3],
    out: &mut [f32],
) {
    let mut corrected = None;
    for (k, (slot, rule)) in out.iter_mut().zip(rules).enumerate() {
        let values = [tri.attrs[0][k], tri.attrs[1][k], tri.attrs[2][k]];
        *slot = match rule {
            InterpRule::Flat => values[0],
            InterpRule::Smooth => {
                let weights = *corrected.get_or_insert_with(|| perspective_weights(bary, tri.w));
                combine(weights, values)
            }
            InterpRule::Noperspective => combine(bary, values),
        };
    }
}

/// Run the pixel loop for `tri` over the rows `band` owns.
///
/// Returns the number of fragments shaded.
pub(crate) fn rasterize<U, F>(
    band: &mut FrameBand<'_>,
    tri: &ScreenTriangle,
    rules: &[InterpRule],
    shader: &F,
    uniforms: &U,
) -> u64
where
    U: ?Sized,
    F: FragmentShader<U> + ?Sized,
{
    let (min_x, max_x, min_y, max_y) = tri.bounds;
    if band.rows == 0 {
        return 0;
    }
    let y_lo = min_y.max(band.y0);
    let y_hi = max_y.min(band.y0 + band.rows - 1);
    if y_lo > y_hi {
        return 0;
    }

    let mut frag: Attributes = smallvec::smallvec![0.0; rules.len()];
    let mut shaded = 0;
    for y in y_lo..=y_hi {
        for x in min_x..=max_x {
            let bary = tri.barycentric(x as i64, y as i64);
            if !(bary[0] >= 0.0 && bary[1] >= 0.0 && bary[2] >= 0.0) {
                continue;
            }
            let depth = combine(bary, tri.z);
            let Some(cell) = band.depth_test(x, y, depth) else {
                continue;
            };

            reconstruct(tri, rules, bary, &mut frag);
            let fragment = Fragment {
                x,
                y,
                depth,
                data: &frag,
            };
            let out = shader.shade(&fragment, uniforms);
            band.write(cell, out.to_pixel());
            shaded += 1;
        }
    }
    shaded
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
