//! Wavefront OBJ import
//!
//! Supports the `v`, `vn`, `vc`, `vt`, `va1`..`va4`, `f`, `g`, `o`, `s`,
//! `usemtl` and `mtllib` records. Faces are fan-triangulated and every
//! triangle corner becomes its own vertex.

mod import;
pub mod parser;

pub use import::*;
pub use parser::{FaceRef, ObjRecord, StateKey};

/// Text handed to the importer when there is nothing to load.
///
/// Failed and empty fetches are turned into this value.
pub const UNKNOWN_OBJECT: &str = "unknown";

/// Options for [`import_obj`]
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Reset the mesh before importing, dropping its current geometry
    pub reset_mesh: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self { reset_mesh: true }
    }
}

/// Statistics about one import
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// The text was the "nothing to load" marker and the mesh was not touched
    pub skipped: bool,
    /// Mesh vertex count after the import
    pub vertices: usize,
    /// Mesh index count after the import
    pub indices: usize,
    pub surfaces: usize,
    pub faces: usize,
    pub triangles: usize,
    /// Faces with fewer than three references
    pub skipped_faces: usize,
    /// Attribute lookups that did not resolve to a table row
    pub missing_lookups: usize,
    pub invalid_numbers: usize,
    pub unknown_records: usize,
}
