/// Upper bound on interpolable attribute slots per vertex.
pub const MAX_FLOATS_PER_VERTEX: usize = 64;

/// Packed 8-bit-per-channel pixel, laid out as `0xRRGGBBAA`.
///
/// Alpha is always opaque; the pipeline has no blending stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Pixel(pub u32);

impl Pixel {
    /// Opaque black, the initial color of every frame buffer cell.
    pub const BLACK: Pixel = Pixel::from_rgb(0, 0, 0);

    /// Pack 8-bit channels.
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u32) << 24) | ((g as u32) << 16) | ((b as u32) << 8) | 0xff)
    }

    /// Pack unit-range float channels by truncation.
    ///
    /// Values are not clamped: `c * 255` is truncated toward zero and only the low 8 bits are
    /// kept, so out-of-range inputs wrap. Fragment shaders are expected to clamp.
    pub fn from_unit_rgb(r: f32, g: f32, b: f32) -> Self {
        fn channel(c: f32) -> u8 {
            (c * 255.0) as i32 as u8
        }
        Self::from_rgb(channel(r), channel(g), channel(b))
    }

    /// Red channel.
    pub const fn r(self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Green channel.
    pub const fn g(self) -> u8 {
        (self.0 >> 16) as u8
    }

    /// Blue channel.
    pub const fn b(self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// Alpha channel.
    pub const fn a(self) -> u8 {
        self.0 as u8
    }

    /// Channels as `[r, g, b, a]`.
    pub const fn to_rgba8(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }
}

impl Default for Pixel {
    fn default() -> Self {
        Self::BLACK
    }
}

/// Per-slot attribute reconstruction rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpRule {
    /// Constant across the triangle: the provoking vertex (vertex 0) value.
    Flat,
    /// Perspective-correct interpolation using each vertex's clip-space `w`.
    Smooth,
    /// Affine interpolation in screen space.
    #[serde(alias = "no_perspective")]
    Noperspective,
}

/// Topology used to group the vertex stream into triangles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// Consecutive, non-overlapping groups of three vertices.
    Triangle,
    /// Groups of three entries of a separate index array.
    Indexed,
    /// Vertex 0 shared by every triangle: `{0, k, k+1}`.
    Fan,
    /// Sliding window of three: `{k, k+1, k+2}`.
    Strip,
}

impl RenderMode {
    /// Stable lowercase name, as used in scene files and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Triangle => "triangle",
            Self::Indexed => "indexed",
            Self::Fan => "fan",
            Self::Strip => "strip",
        }
    }
}

impl std::fmt::Display for RenderMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
