use rayon::prelude::*;

use crate::foundation::{
    core::Pixel,
    error::{RasterError, RasterResult},
};

/// Color and depth storage for one render target.
///
/// Both arrays are row-major with `width * height` cells. Row 0 is the bottom of normalized
/// device space (`ndc_y = -1`); use [`FrameBuffer::to_rgba8_flipped`] for top-down images.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameBuffer {
    width: usize,
    height: usize,
    color: Vec<Pixel>,
    depth: Vec<f32>,
}

impl FrameBuffer {
    /// Allocate a cleared buffer: depth `+inf`, color black.
    pub fn new(width: usize, height: usize) -> RasterResult<Self> {
        if width == 0 || height == 0 {
            return Err(RasterError::invalid_config(format!(
                "frame buffer dimensions must be non-zero, got {width}x{height}"
            )));
        }
        let len = width.checked_mul(height).ok_or_else(|| {
            RasterError::invalid_config(format!("frame buffer {width}x{height} overflows"))
        })?;
        Ok(Self {
            width,
            height,
            color: vec![Pixel::BLACK; len],
            depth: vec![f32::INFINITY; len],
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Packed color cells, row-major.
    pub fn color(&self) -> &[Pixel] {
        &self.color
    }

    /// Depth cells, row-major.
    pub fn depth(&self) -> &[f32] {
        &self.depth
    }

    /// Color at `(x, y)`, or `None` outside the buffer.
    pub fn pixel(&self, x: usize, y: usize) -> Option<Pixel> {
        self.index(x, y).map(|i| self.color[i])
    }

    /// Depth at `(x, y)`, or `None` outside the buffer.
    pub fn depth_at(&self, x: usize, y: usize) -> Option<f32> {
        self.index(x, y).map(|i| self.depth[i])
    }

    /// Restore the initial state so the buffer can take another frame.
    pub fn clear(&mut self) {
        self.color.fill(Pixel::BLACK);
        self.depth.fill(f32::INFINITY);
    }

    /// RGBA8 bytes in storage row order (bottom row first).
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.color.iter().flat_map(|p| p.to_rgba8()).collect()
    }

    /// RGBA8 bytes with the top row first, as image files expect.
    pub fn to_rgba8_flipped(&self) -> Vec<u8> {
        self.color
            .chunks_exact(self.width)
            .rev()
            .flat_map(|row| row.iter().flat_map(|p| p.to_rgba8()))
            .collect()
    }

    fn index(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    /// The whole buffer as one band.
    pub(crate) fn as_band(&mut self) -> FrameBand<'_> {
        FrameBand {
            width: self.width,
            y0: 0,
            rows: self.height,
            color: &mut self.color,
            depth: &mut self.depth,
        }
    }

    /// Disjoint horizontal bands of `rows_per_band` rows (the last may be shorter), in parallel.
    ///
    /// `rows_per_band` must be in `1..=height`.
    pub(crate) fn par_bands_mut(
        &mut self,
        rows_per_band: usize,
    ) -> impl IndexedParallelIterator<Item = FrameBand<'_>> {
        let width = self.width;
        debug_assert!((1..=self.height).contains(&rows_per_band));
        let cells = width * rows_per_band;
        self.color
            .par_chunks_mut(cells)
            .zip(self.depth.par_chunks_mut(cells))
            .enumerate()
            .map(move |(i, (color, depth))| FrameBand {
                width,
                y0: i * rows_per_band,
                rows: color.len() / width,
                color,
                depth,
            })
    }
}

/// Mutable view of a contiguous run of rows.
///
/// Every pixel belongs to exactly one band, so a band's depth test and color write can never
/// interleave with another band's.
pub(crate) struct FrameBand<'a> {
    /// Full buffer width.
    pub(crate) width: usize,
    /// First row covered by this band.
    pub(crate) y0: usize,
    /// Number of rows covered.
    pub(crate) rows: usize,
    color: &'a mut [Pixel],
    depth: &'a mut [f32],
}

impl FrameBand<'_> {
    /// Depth-test `z` at a pixel inside this band; on pass, store it and return the cell.
    #[inline]
    pub(crate) fn depth_test(&mut self, x: usize, y: usize, z: f32) -> Option<usize> {
        let cell = (y - self.y0) * self.width + x;
        if z < self.depth[cell] {
            self.depth[cell] = z;
            Some(cell)
        } else {
            None
        }
    }

    /// Write the color for a cell returned by [`FrameBand::depth_test`].
    #[inline]
    pub(crate) fn write(&mut self, cell: usize, pixel: Pixel) {
        self.color[cell] = pixel;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/framebuffer.rs"]
mod tests;
