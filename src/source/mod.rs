//! Asynchronous text sources
//!
//! OBJ text is fetched through the [`TextSource`] trait. Sources return boxed
//! futures that the caller drives: `pollster::block_on` natively,
//! `wasm_bindgen_futures::spawn_local` in the browser. The futures are not
//! `Send` because browser fetch futures are not.
//!
//! # Sources
//!
//! - [`MemorySource`] - in-memory text for tests and embedded assets
//! - [`FileSource`] - native filesystem access (native only)
//! - `FetchSource` - HTTP fetch through the browser (wasm32 only, in `web`)

#[cfg(not(target_arch = "wasm32"))]
mod filesystem;
mod memory;

#[cfg(not(target_arch = "wasm32"))]
pub use filesystem::FileSource;
pub use memory::MemorySource;

use std::future::Future;
use std::pin::Pin;

use crate::obj::{import_obj, ImportOptions, ImportReport, UNKNOWN_OBJECT};
use crate::resources::IndexedGeometryMesh;

/// Errors that can occur while fetching text.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("fetch of {url} failed: {reason}")]
    Fetch { url: String, reason: String },

    #[error("{0} is not valid UTF-8")]
    InvalidUtf8(String),
}

/// A boxed future returning a `Result`.
pub type SourceFuture<T> = Pin<Box<dyn Future<Output = Result<T, SourceError>>>>;

/// Something that can fetch the text behind a URL or path.
pub trait TextSource {
    /// Fetch the whole text at `url`.
    fn fetch(&self, url: &str) -> SourceFuture<String>;
}

/// Fetch an OBJ file from `source` and import it into `mesh`.
///
/// A failed or empty fetch is logged and imports nothing, leaving the mesh
/// untouched. The mesh stays mutably borrowed until the import is complete.
pub async fn load_object(
    mesh: &mut IndexedGeometryMesh,
    source: &dyn TextSource,
    url: &str,
    options: &ImportOptions,
) -> ImportReport {
    let text = match source.fetch(url).await {
        Ok(text) if !text.is_empty() => text,
        Ok(_) => {
            log::warn!("{url} is empty");
            UNKNOWN_OBJECT.to_string()
        }
        Err(err) => {
            log::error!("Failed to load {url}: {err}");
            UNKNOWN_OBJECT.to_string()
        }
    };
    import_obj(mesh, &text, options)
}
