//! Geometry Mesh - An indexed geometry mesh builder with a Wavefront OBJ importer
//!
//! The mesh collects interleaved vertices and surface-grouped indices on the
//! CPU and uploads them through a [`RenderContext`] on the first render after
//! a change.
//!
//! # Features
//! - Fixed-capacity vertex and index storage with 16- or 32-bit indices
//! - Eight named vertex attribute slots bound to shaders by name
//! - Surfaces: material-tagged index ranges, drawn one call each
//! - OBJ import with fan triangulation and relative indices
//! - Asynchronous text sources (memory, filesystem, browser fetch)
//! - WebGL support via WebAssembly

pub mod backend;
pub mod obj;
pub mod resources;
pub mod shader;
pub mod source;

// Web-specific modules
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use backend::{BackendError, BackendResult, RecordingBackend, RenderContext};
pub use obj::{import_obj, ImportOptions, ImportReport};
pub use resources::{IndexRef, IndexStatus, IndexedGeometryMesh, PendingVertex, Surface, SurfaceId};
pub use shader::{NamedAttribLocations, ShaderBinding, ShaderId};
pub use source::{load_object, MemorySource, SourceError, TextSource};

#[cfg(not(target_arch = "wasm32"))]
pub use source::FileSource;

/// Configuration for creating a mesh
#[derive(Debug, Clone)]
pub struct MeshConfig {
    /// Maximum number of vertices the mesh can hold
    pub max_vertices: usize,
    /// Maximum number of indices the mesh can hold.
    /// Below 32768 the index buffer uses 16-bit indices.
    pub max_indices: usize,
    /// Debug label used for GPU buffers and log lines
    pub label: Option<String>,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            max_vertices: 32767,
            max_indices: 32767,
            label: None,
        }
    }
}

// Web initialization helper
#[cfg(target_arch = "wasm32")]
pub fn init_web_logging() {
    // Set up panic hook for better error messages in console
    console_error_panic_hook::set_once();
    // A second init only fails because a logger is already installed
    let _ = console_log::init_with_level(log::Level::Info);
}
