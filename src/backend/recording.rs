//! Recording backend for testing and tooling.
//!
//! This backend doesn't perform GPU work. It keeps uploaded buffer contents in
//! memory and records every call made through [`RenderContext`] so tests and
//! command-line tools can inspect what a mesh would have submitted.

use std::collections::HashMap;

use crate::backend::traits::*;
use crate::backend::types::*;

/// One recorded context call
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCommand {
    CreateBuffer {
        buffer: BufferHandle,
        label: Option<String>,
        size: u64,
        usage: BufferUsage,
    },
    DestroyBuffer(BufferHandle),
    BindVertexBuffer(Option<BufferHandle>),
    BindIndexBuffer(Option<BufferHandle>),
    EnableVertexAttrib(u32),
    DisableVertexAttrib(u32),
    VertexAttribPointer {
        location: u32,
        pointer: VertexAttribPointer,
    },
    DrawIndexed {
        topology: PrimitiveTopology,
        count: u32,
        format: IndexFormat,
        byte_offset: u64,
    },
}

/// A draw call as seen by the recording backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCall {
    pub topology: PrimitiveTopology,
    pub count: u32,
    pub format: IndexFormat,
    pub byte_offset: u64,
}

/// Command-recording [`RenderContext`].
#[derive(Debug, Default)]
pub struct RecordingBackend {
    buffers: HashMap<u64, Vec<u8>>,
    next_buffer_id: u64,
    commands: Vec<RecordedCommand>,
    fail_buffer_creation: bool,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the backend name.
    pub fn name(&self) -> &'static str {
        "Recording Backend"
    }

    /// Make every following `create_buffer` call fail (or succeed again).
    pub fn set_fail_buffer_creation(&mut self, fail: bool) {
        self.fail_buffer_creation = fail;
    }

    /// All commands recorded so far, oldest first.
    pub fn commands(&self) -> &[RecordedCommand] {
        &self.commands
    }

    /// Forget recorded commands. Live buffers are kept.
    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    /// Contents uploaded into a live buffer.
    pub fn buffer_data(&self, buffer: BufferHandle) -> Option<&[u8]> {
        self.buffers.get(&buffer.0).map(Vec::as_slice)
    }

    /// Number of buffers that are created and not yet destroyed.
    pub fn live_buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Number of `create_buffer` calls recorded.
    pub fn buffer_creations(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, RecordedCommand::CreateBuffer { .. }))
            .count()
    }

    /// The indexed draw calls recorded, in submission order.
    pub fn draw_calls(&self) -> Vec<DrawCall> {
        self.commands
            .iter()
            .filter_map(|c| match *c {
                RecordedCommand::DrawIndexed {
                    topology,
                    count,
                    format,
                    byte_offset,
                } => Some(DrawCall {
                    topology,
                    count,
                    format,
                    byte_offset,
                }),
                _ => None,
            })
            .collect()
    }

    /// Attribute locations enabled during the recorded commands.
    pub fn enabled_locations(&self) -> Vec<u32> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                RecordedCommand::EnableVertexAttrib(location) => Some(*location),
                _ => None,
            })
            .collect()
    }

    /// Attribute locations disabled during the recorded commands.
    pub fn disabled_locations(&self) -> Vec<u32> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                RecordedCommand::DisableVertexAttrib(location) => Some(*location),
                _ => None,
            })
            .collect()
    }
}

impl RenderContext for RecordingBackend {
    fn create_buffer(
        &mut self,
        desc: &BufferDescriptor,
        data: &[u8],
    ) -> BackendResult<BufferHandle> {
        if self.fail_buffer_creation {
            log::trace!("RecordingBackend: refusing buffer {:?}", desc.label);
            return Err(BackendError::BufferCreationFailed(format!(
                "{} refused by recording backend",
                desc.label.as_deref().unwrap_or("buffer")
            )));
        }

        let id = self.next_buffer_id;
        self.next_buffer_id += 1;
        self.buffers.insert(id, data.to_vec());

        let buffer = BufferHandle(id);
        log::trace!(
            "RecordingBackend: creating buffer {:?} (size: {})",
            desc.label,
            desc.size
        );
        self.commands.push(RecordedCommand::CreateBuffer {
            buffer,
            label: desc.label.clone(),
            size: desc.size,
            usage: desc.usage,
        });
        Ok(buffer)
    }

    fn destroy_buffer(&mut self, buffer: BufferHandle) {
        self.buffers.remove(&buffer.0);
        self.commands.push(RecordedCommand::DestroyBuffer(buffer));
    }

    fn bind_vertex_buffer(&mut self, buffer: Option<BufferHandle>) {
        self.commands.push(RecordedCommand::BindVertexBuffer(buffer));
    }

    fn bind_index_buffer(&mut self, buffer: Option<BufferHandle>) {
        self.commands.push(RecordedCommand::BindIndexBuffer(buffer));
    }

    fn enable_vertex_attrib(&mut self, location: u32) {
        self.commands.push(RecordedCommand::EnableVertexAttrib(location));
    }

    fn disable_vertex_attrib(&mut self, location: u32) {
        self.commands.push(RecordedCommand::DisableVertexAttrib(location));
    }

    fn vertex_attrib_pointer(&mut self, location: u32, pointer: &VertexAttribPointer) {
        self.commands.push(RecordedCommand::VertexAttribPointer {
            location,
            pointer: *pointer,
        });
    }

    fn draw_indexed(
        &mut self,
        topology: PrimitiveTopology,
        count: u32,
        format: IndexFormat,
        byte_offset: u64,
    ) {
        log::trace!(
            "RecordingBackend: draw_indexed {:?} count={} offset={}",
            topology,
            count,
            byte_offset
        );
        self.commands.push(RecordedCommand::DrawIndexed {
            topology,
            count,
            format,
            byte_offset,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertex_desc(size: u64) -> BufferDescriptor {
        BufferDescriptor {
            label: Some("test vertices".into()),
            size,
            usage: BufferUsage::VERTEX | BufferUsage::COPY_DST,
        }
    }

    #[test]
    fn create_and_destroy_buffer() {
        let mut backend = RecordingBackend::new();
        let buffer = backend.create_buffer(&vertex_desc(4), &[1, 2, 3, 4]).unwrap();

        assert_eq!(backend.buffer_data(buffer), Some(&[1u8, 2, 3, 4][..]));
        assert_eq!(backend.live_buffer_count(), 1);

        backend.destroy_buffer(buffer);
        assert_eq!(backend.live_buffer_count(), 0);
        assert!(backend.buffer_data(buffer).is_none());
        assert_eq!(backend.buffer_creations(), 1);
    }

    #[test]
    fn handles_are_unique() {
        let mut backend = RecordingBackend::new();
        let a = backend.create_buffer(&vertex_desc(0), &[]).unwrap();
        let b = backend.create_buffer(&vertex_desc(0), &[]).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn failing_creation_records_nothing() {
        let mut backend = RecordingBackend::new();
        backend.set_fail_buffer_creation(true);

        let result = backend.create_buffer(&vertex_desc(4), &[0; 4]);
        assert!(matches!(result, Err(BackendError::BufferCreationFailed(_))));
        assert_eq!(backend.buffer_creations(), 0);
        assert_eq!(backend.live_buffer_count(), 0);
    }

    #[test]
    fn draw_calls_are_collected_in_order() {
        let mut backend = RecordingBackend::new();
        backend.draw_indexed(PrimitiveTopology::Triangles, 6, IndexFormat::Uint16, 0);
        backend.enable_vertex_attrib(3);
        backend.draw_indexed(PrimitiveTopology::TriangleFan, 4, IndexFormat::Uint16, 12);

        let draws = backend.draw_calls();
        assert_eq!(draws.len(), 2);
        assert_eq!(draws[0].count, 6);
        assert_eq!(draws[1].topology, PrimitiveTopology::TriangleFan);
        assert_eq!(draws[1].byte_offset, 12);
        assert_eq!(backend.enabled_locations(), vec![3]);
    }
}
