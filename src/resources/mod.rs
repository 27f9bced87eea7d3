//! Resource management
//!
//! Attribute slots, surfaces and the indexed geometry mesh built from them.

mod attrib;
mod mesh;
mod surface;

pub use attrib::*;
pub use mesh::*;
pub use surface::*;
