/// Linear interpolation `a + (b - a) * t`.
#[inline]
pub(crate) fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Twice the signed area of the triangle `(a, b, p)`.
///
/// Positive when `p` lies to the left of the directed edge `a -> b` in a y-up frame. Integer
/// inputs keep the inside test exact; callers divide by the full triangle's value to get
/// barycentric weights.
#[inline]
pub(crate) fn edge(a: (i64, i64), b: (i64, i64), p: (i64, i64)) -> i64 {
    (b.0 - a.0) * (p.1 - a.1) - (b.1 - a.1) * (p.0 - a.0)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
