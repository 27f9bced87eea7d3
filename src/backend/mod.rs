//! Backend abstraction layer
//!
//! Provides the resource-context trait the mesh builder draws through, and the
//! backends implementing it.

pub mod recording;
pub mod traits;
pub mod types;

// WebGL backend is only available in the browser
#[cfg(target_arch = "wasm32")]
pub mod webgl;

pub use recording::*;
pub use traits::*;
pub use types::*;
