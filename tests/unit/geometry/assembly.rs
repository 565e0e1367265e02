use std::cell::Cell;

use super::*;

const RULES: [InterpRule; 1] = [InterpRule::Flat];

fn ids(n: usize) -> Vec<f32> {
    (0..n).map(|i| i as f32).collect()
}

fn collect(draw: &DrawCall<'_>, calls: &Cell<usize>) -> Vec<[u32; 3]> {
    let shader = |v: &[f32], _: &()| {
        calls.set(calls.get() + 1);
        GeometryVertex::new([0.0, 0.0, 0.0, 1.0], v)
    };
    let mut out = Vec::new();
    let n = assemble(draw, &shader, &(), |t| {
        out.push(t.vertices.map(|v| v.data[0] as u32));
    })
    .unwrap();
    assert_eq!(n, out.len());
    assert_eq!(n, draw.triangle_count());
    out
}

#[test]
fn triangle_mode_groups_consecutive_and_ignores_trailing() {
    let data = ids(8);
    let draw = DrawCall::new(RenderMode::Triangle, &data, 1, &RULES);
    let calls = Cell::new(0);
    let tris = collect(&draw, &calls);
    assert_eq!(tris, vec![[0, 1, 2], [3, 4, 5]]);
    assert_eq!(calls.get(), 6);
}

#[test]
fn indexed_mode_transforms_once_per_reference() {
    let data = ids(4);
    let indices = [0, 1, 2, 2, 1, 3, 3];
    let draw = DrawCall::indexed(&data, 1, &RULES, &indices);
    let calls = Cell::new(0);
    let tris = collect(&draw, &calls);
    assert_eq!(tris, vec![[0, 1, 2], [2, 1, 3]]);
    assert_eq!(calls.get(), 6);
}

#[test]
fn fan_with_five_vertices_shares_vertex_zero() {
    let data = ids(5);
    let draw = DrawCall::new(RenderMode::Fan, &data, 1, &RULES);
    let calls = Cell::new(0);
    let tris = collect(&draw, &calls);
    assert_eq!(tris, vec![[0, 1, 2], [0, 2, 3], [0, 3, 4]]);
    assert!(tris.iter().all(|t| t[0] == 0));
    assert_eq!(calls.get(), 5);
}

#[test]
fn strip_with_five_vertices_reuses_two_prior_vertices() {
    let data = ids(5);
    let draw = DrawCall::new(RenderMode::Strip, &data, 1, &RULES);
    let calls = Cell::new(0);
    let tris = collect(&draw, &calls);
    assert_eq!(tris, vec![[0, 1, 2], [1, 2, 3], [2, 3, 4]]);
    for pair in tris.windows(2) {
        assert_eq!(pair[0][1..], pair[1][..2]);
    }
    assert_eq!(calls.get(), 5);
}

#[test]
fn short_streams_emit_nothing() {
    let data = ids(2);
    for mode in [RenderMode::Triangle, RenderMode::Fan, RenderMode::Strip] {
        let draw = DrawCall::new(mode, &data, 1, &RULES);
        let calls = Cell::new(0);
        assert!(collect(&draw, &calls).is_empty());
    }
}

#[test]
fn records_use_the_stride() {
    let data = [0.0, 10.0, 1.0, 11.0, 2.0, 12.0];
    let rules = [InterpRule::Flat, InterpRule::Smooth];
    let draw = DrawCall::new(RenderMode::Triangle, &data, 2, &rules);
    let shader = |v: &[f32], _: &()| GeometryVertex::new([0.0, 0.0, 0.0, 1.0], v);
    let mut seen = Vec::new();
    assemble(&draw, &shader, &(), |t| seen.push(t)).unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].vertices[2].data.as_slice(), &[2.0, 12.0]);
}

#[test]
fn validate_rejects_contract_violations() {
    let data = ids(6);
    let two_rules = [InterpRule::Flat, InterpRule::Flat];

    let mismatched = DrawCall::new(RenderMode::Triangle, &data, 1, &two_rules);
    assert!(matches!(
        mismatched.validate(),
        Err(RasterError::InvalidConfig(_))
    ));

    let zero = DrawCall::new(RenderMode::Triangle, &data, 0, &[]);
    assert!(zero.validate().is_err());

    let mut short = DrawCall::new(RenderMode::Triangle, &data, 1, &RULES);
    short.num_vertices = 7;
    assert!(short.validate().is_err());

    let mut no_indices = DrawCall::new(RenderMode::Indexed, &data, 1, &RULES);
    no_indices.num_triangles = 1;
    assert!(no_indices.validate().is_err());

    let out_of_range = [0, 1, 6];
    let bad = DrawCall::indexed(&data, 1, &RULES, &out_of_range);
    let err = bad.validate().unwrap_err();
    assert!(err.to_string().contains("out of range"));

    let mut too_many = DrawCall::indexed(&data, 1, &RULES, &[0, 1, 2]);
    too_many.num_triangles = 2;
    assert!(too_many.validate().is_err());

    let ok = DrawCall::indexed(&data, 1, &RULES, &[0, 1, 2, 3, 4, 5]);
    assert!(ok.validate().is_ok());
}

#[test]
fn shader_output_width_is_checked() {
    let data = ids(3);
    let draw = DrawCall::new(RenderMode::Triangle, &data, 1, &RULES);
    let shader = |_: &[f32], _: &()| GeometryVertex::new([0.0, 0.0, 0.0, 1.0], &[1.0, 2.0]);
    let err = assemble(&draw, &shader, &(), |_| {}).unwrap_err();
    assert!(matches!(err, RasterError::InvalidConfig(_)));
}

#[test]
fn unvalidated_short_stream_is_rejected() {
    let data = [0.0; 4];
    let rules = [InterpRule::Flat; 2];
    let mut draw = DrawCall::new(RenderMode::Triangle, &data, 2, &rules);
    draw.num_vertices = 3;

    let calls = Cell::new(0);
    let shader = |v: &[f32], _: &()| {
        calls.set(calls.get() + 1);
        GeometryVertex::new([0.0, 0.0, 0.0, 1.0], v)
    };
    let mut emitted = 0;
    let err = assemble(&draw, &shader, &(), |_| emitted += 1).unwrap_err();
    assert!(matches!(err, RasterError::InvalidConfig(_)));
    assert_eq!(calls.get(), 0);
    assert_eq!(emitted, 0);
}
