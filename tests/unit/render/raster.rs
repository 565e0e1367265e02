use rayon::prelude::*;

use super::*;
use crate::{
    foundation::core::Pixel,
    geometry::vertex::GeometryVertex,
    render::{framebuffer::FrameBuffer, shader::FragmentOutput},
};

fn v(x: f32, y: f32, z: f32, w: f32, data: &[f32]) -> GeometryVertex {
    GeometryVertex::new([x, y, z, w], data)
}

// Lower-left half of an 8x8 target: screen corners (0,0), (7,0), (0,7).
fn half_screen(data: [&[f32]; 3]) -> Triangle {
    Triangle::new(
        v(-1.0, -1.0, 0.0, 1.0, data[0]),
        v(1.0, -1.0, 0.0, 1.0, data[1]),
        v(-1.0, 1.0, 0.0, 1.0, data[2]),
    )
}

fn first_slot(f: &Fragment<'_>, _: &()) -> FragmentOutput {
    FragmentOutput::gray(f.data[0])
}

#[test]
fn setup_maps_ndc_corners_to_edge_pixels() {
    let tri = setup(half_screen([&[], &[], &[]]), 8, 8).unwrap();
    assert_eq!(tri.xy, [(0, 0), (7, 0), (0, 7)]);
    assert_eq!(tri.area2, 49);
    assert_eq!(tri.bounds, (0, 7, 0, 7));
    assert_eq!(tri.z, [3.0; 3]);
}

#[test]
fn barycentric_weights_partition_unity() {
    let tri = setup(half_screen([&[], &[], &[]]), 8, 8).unwrap();
    let mut inside = 0;
    for y in 0..8 {
        for x in 0..8 {
            let b = tri.barycentric(x, y);
            assert!((b[0] + b[1] + b[2] - 1.0).abs() < 1e-5);
            if b.iter().all(|&w| w >= 0.0) {
                inside += 1;
            }
        }
    }
    // x + y <= 7
    assert_eq!(inside, 36);
}

#[test]
fn degenerate_triangles_are_skipped() {
    let collinear = Triangle::new(
        v(-0.5, -0.5, 0.0, 1.0, &[]),
        v(0.0, 0.0, 0.0, 1.0, &[]),
        v(0.5, 0.5, 0.0, 1.0, &[]),
    );
    assert!(setup(collinear, 8, 8).is_none());

    let zero_w = Triangle::new(
        v(0.0, 0.0, 0.0, 0.0, &[]),
        v(0.5, 0.0, 0.0, 1.0, &[]),
        v(0.0, 0.5, 0.0, 1.0, &[]),
    );
    assert!(setup(zero_w, 8, 8).is_none());

    let nan = Triangle::new(
        v(f32::NAN, 0.0, 0.0, 1.0, &[]),
        v(0.5, 0.0, 0.0, 1.0, &[]),
        v(0.0, 0.5, 0.0, 1.0, &[]),
    );
    assert!(setup(nan, 8, 8).is_none());
}

#[test]
fn flat_slots_are_constant_across_the_triangle() {
    let mut fb = FrameBuffer::new(8, 8).unwrap();
    let tri = setup(half_screen([&[0.25], &[0.9], &[0.1]]), 8, 8).unwrap();
    let shaded = rasterize(
        &mut fb.as_band(),
        &tri,
        &[InterpRule::Flat],
        &first_slot,
        &(),
    );
    assert_eq!(shaded, 36);

    let flat = Pixel::from_rgb(63, 63, 63);
    for y in 0..8 {
        for x in 0..8 {
            let expected = if x + y <= 7 { flat } else { Pixel::BLACK };
            assert_eq!(fb.pixel(x, y), Some(expected), "pixel ({x}, {y})");
        }
    }
}

#[test]
fn second_pass_at_equal_depth_fails_the_strict_test() {
    let mut fb = FrameBuffer::new(8, 8).unwrap();
    let tri = setup(half_screen([&[1.0], &[1.0], &[1.0]]), 8, 8).unwrap();
    let rules = [InterpRule::Smooth];
    assert_eq!(rasterize(&mut fb.as_band(), &tri, &rules, &first_slot, &()), 36);
    assert_eq!(rasterize(&mut fb.as_band(), &tri, &rules, &first_slot, &()), 0);
    assert_eq!(fb.depth_at(0, 0), Some(3.0));
}

#[test]
fn bands_cover_exactly_the_same_pixels_as_one_pass() {
    let tri = setup(half_screen([&[0.5], &[0.5], &[0.5]]), 8, 8).unwrap();
    let rules = [InterpRule::Noperspective];

    let mut whole = FrameBuffer::new(8, 8).unwrap();
    let expected = rasterize(&mut whole.as_band(), &tri, &rules, &first_slot, &());

    let mut banded = FrameBuffer::new(8, 8).unwrap();
    let mut bands: Vec<_> = banded.par_bands_mut(3).collect();
    let total: u64 = bands
        .iter_mut()
        .map(|band| rasterize(band, &tri, &rules, &first_slot, &()))
        .sum();
    drop(bands);

    assert_eq!(total, expected);
    assert_eq!(banded, whole);
}

#[test]
fn perspective_weights_match_affine_when_w_is_uniform() {
    let bary = [0.2, 0.3, 0.5];
    let corrected = perspective_weights(bary, [2.0, 2.0, 2.0]);
    for (a, b) in corrected.iter().zip(bary) {
        assert!((a - b).abs() < 1e-6);
    }
}

#[test]
fn perspective_weights_favor_near_vertices() {
    let bary = [1.0 / 3.0; 3];
    let corrected = perspective_weights(bary, [1.0, 2.0, 4.0]);
    assert!((corrected.iter().sum::<f32>() - 1.0).abs() < 1e-6);
    assert!(corrected[0] > corrected[1] && corrected[1] > corrected[2]);
    // Weights are proportional to 1/w: 4/7, 2/7, 1/7.
    assert!((corrected[0] - 4.0 / 7.0).abs() < 1e-6);
}

#[test]
fn smooth_and_noperspective_differ_only_under_perspective() {
    let slots: [&[f32]; 3] = [&[0.0, 0.0], &[1.0, 1.0], &[0.0, 0.0]];
    let rules = [InterpRule::Smooth, InterpRule::Noperspective];
    let bary = [0.25, 0.5, 0.25];
    let mut out = [0.0; 2];

    let affine = setup(half_screen(slots), 8, 8).unwrap();
    reconstruct(&affine, &rules, bary, &mut out);
    assert!((out[0] - out[1]).abs() < 1e-6);
    assert!((out[1] - 0.5).abs() < 1e-6);

    let mut skewed = half_screen(slots);
    for vert in &mut skewed.vertices[1..] {
        vert.position = vert.position.map(|c| c * 3.0);
    }
    let skewed = setup(skewed, 8, 8).unwrap();
    reconstruct(&skewed, &rules, bary, &mut out);
    assert!((out[1] - 0.5).abs() < 1e-6);
    // Vertex 1 sits at w = 3, so its weight shrinks from 1/2 to 1/3.
    assert!(out[0] < out[1]);
    assert!((out[0] - 1.0 / 3.0).abs() < 1e-6);
}

#[test]
fn combine_is_a_weighted_sum() {
    assert_eq!(combine([0.5, 0.25, 0.25], [4.0, 8.0, 0.0]), 4.0);
}
