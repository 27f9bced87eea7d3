//! Load an OBJ file, render it once against the recording backend and print
//! what the mesh would submit.
//!
//! ```text
//! cargo run --example obj_stats -- assets/teapot.obj --material brass
//! ```

use std::path::PathBuf;

use clap::Parser;
use geometry_mesh::{
    load_object, FileSource, ImportOptions, IndexedGeometryMesh, MeshConfig, NamedAttribLocations,
    RecordingBackend,
};

/// Print surface and draw statistics for an OBJ file.
#[derive(Parser, Debug)]
#[command(name = "obj_stats", version)]
struct Args {
    /// OBJ file to load
    path: PathBuf,

    /// Maximum number of vertices
    #[arg(long, default_value = "32767")]
    max_vertices: usize,

    /// Maximum number of indices (32768 or more selects 32-bit indices)
    #[arg(long, default_value = "32767")]
    max_indices: usize,

    /// Only draw surfaces with this material
    #[arg(long)]
    material: Option<String>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let root = args.path.parent().map(PathBuf::from).unwrap_or_default();
    let Some(file_name) = args.path.file_name().and_then(|n| n.to_str()) else {
        eprintln!("not a file: {}", args.path.display());
        std::process::exit(2);
    };

    let mut mesh = IndexedGeometryMesh::with_config(&MeshConfig {
        max_vertices: args.max_vertices,
        max_indices: args.max_indices,
        label: Some(file_name.to_string()),
    });
    let source = FileSource::new(root);
    let report = pollster::block_on(load_object(
        &mut mesh,
        &source,
        file_name,
        &ImportOptions::default(),
    ));
    if report.skipped {
        eprintln!("nothing loaded from {}", args.path.display());
        std::process::exit(1);
    }

    println!("{report:#?}");
    println!("index format: {:?}", mesh.index_format());
    for (i, surface) in mesh.surfaces().iter().enumerate() {
        println!(
            "surface {i}: material={:?} g={:?} o={:?} first={} count={}",
            surface.material(),
            surface.property("g"),
            surface.property("o"),
            surface.first(),
            surface.count()
        );
    }

    let mut backend = RecordingBackend::new();
    let shader = NamedAttribLocations::standard();
    match mesh.render(&mut backend, &shader, args.material.as_deref()) {
        Ok(stats) => println!(
            "{}: {} draw calls, {} indices, {} attributes bound",
            backend.name(),
            stats.draw_calls,
            stats.indices,
            stats.bound_attribs
        ),
        Err(err) => {
            eprintln!("render failed: {err}");
            std::process::exit(1);
        }
    }
    println!("{:#?}", mesh.diagnostics());
}
