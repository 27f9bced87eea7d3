//! Shared helpers for the integration tests.

#![allow(dead_code)]

use geometry_mesh::resources::POSITION_SLOT;
use geometry_mesh::{import_obj, ImportOptions, ImportReport, IndexedGeometryMesh};

/// The unit cube: 6 quads, `red` sides and `blue` caps
pub const CUBE_OBJ: &str = include_str!("../data/cube.obj");

pub const TRIANGLE_OBJ: &str = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";

pub const QUAD_OBJ: &str = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n";

/// Route `log` output to the test harness, once per process.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn import(text: &str, max_vertices: usize, max_indices: usize) -> (IndexedGeometryMesh, ImportReport) {
    init_logging();
    let mut mesh = IndexedGeometryMesh::new(max_vertices, max_indices);
    let report = import_obj(&mut mesh, text, &ImportOptions::default());
    (mesh, report)
}

/// OBJ text with `n` positions on a circle and one `n`-gon face
pub fn polygon_obj(n: usize) -> String {
    let mut text = String::new();
    for i in 0..n {
        let angle = i as f32 / n as f32 * std::f32::consts::TAU;
        text.push_str(&format!("v {} {} 0\n", angle.cos(), angle.sin()));
    }
    text.push('f');
    for i in 1..=n {
        text.push_str(&format!(" {i}"));
    }
    text.push('\n');
    text
}

/// Emit `count` vertices through the position slot.
pub fn emit_points(mesh: &mut IndexedGeometryMesh, count: usize) {
    for i in 0..count {
        mesh.set_vertex_attrib2(POSITION_SLOT, i as f32, 0.0);
    }
}
