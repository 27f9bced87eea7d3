//! Core backend abstraction traits
//!
//! The mesh builder talks to the GPU only through [`RenderContext`]. The
//! recording backend and the WebGL backend both implement it.

use crate::backend::types::*;
use thiserror::Error;

/// Backend error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("Failed to create buffer: {0}")]
    BufferCreationFailed(String),
    #[error("Context lost")]
    ContextLost,
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Handle to a GPU buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub(crate) u64);

impl BufferHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Graphics-resource context consumed by the mesh builder
pub trait RenderContext {
    /// Create a buffer and upload `data` into it
    fn create_buffer(&mut self, desc: &BufferDescriptor, data: &[u8])
        -> BackendResult<BufferHandle>;

    /// Destroy a buffer
    fn destroy_buffer(&mut self, buffer: BufferHandle);

    /// Bind (or unbind with `None`) the vertex buffer used by attribute pointers
    fn bind_vertex_buffer(&mut self, buffer: Option<BufferHandle>);

    /// Bind (or unbind with `None`) the index buffer used by indexed draws
    fn bind_index_buffer(&mut self, buffer: Option<BufferHandle>);

    /// Enable the vertex attribute array at `location`
    fn enable_vertex_attrib(&mut self, location: u32);

    /// Disable the vertex attribute array at `location`
    fn disable_vertex_attrib(&mut self, location: u32);

    /// Point the attribute at `location` into the bound vertex buffer
    fn vertex_attrib_pointer(&mut self, location: u32, pointer: &VertexAttribPointer);

    /// Draw `count` indices starting `byte_offset` bytes into the bound index buffer
    fn draw_indexed(
        &mut self,
        topology: PrimitiveTopology,
        count: u32,
        format: IndexFormat,
        byte_offset: u64,
    );
}
