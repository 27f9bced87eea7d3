//! WebGL backend implementation

use std::collections::HashMap;

use web_sys::{WebGlBuffer, WebGlProgram, WebGlRenderingContext as Gl};

use crate::backend::traits::*;
use crate::backend::types::*;
use crate::shader::{ShaderBinding, ShaderId};

/// [`RenderContext`] over a WebGL 1 rendering context
pub struct WebGlContext {
    gl: Gl,
    buffers: HashMap<u64, WebGlBuffer>,
    next_buffer_id: u64,
    uint32_indices: bool,
}

impl WebGlContext {
    /// Wrap `gl`, enabling 32-bit index support when the browser offers it.
    pub fn new(gl: Gl) -> Self {
        let uint32_indices = matches!(gl.get_extension("OES_element_index_uint"), Ok(Some(_)));
        if !uint32_indices {
            log::warn!("OES_element_index_uint unavailable, 32-bit index meshes will not draw");
        }
        log::info!("WebGL context ready");
        Self {
            gl,
            buffers: HashMap::new(),
            next_buffer_id: 0,
            uint32_indices,
        }
    }

    pub fn gl(&self) -> &Gl {
        &self.gl
    }

    fn convert_topology(topology: PrimitiveTopology) -> u32 {
        match topology {
            PrimitiveTopology::Points => Gl::POINTS,
            PrimitiveTopology::LineStrip => Gl::LINE_STRIP,
            PrimitiveTopology::LineLoop => Gl::LINE_LOOP,
            PrimitiveTopology::Triangles => Gl::TRIANGLES,
            PrimitiveTopology::TriangleStrip => Gl::TRIANGLE_STRIP,
            PrimitiveTopology::TriangleFan => Gl::TRIANGLE_FAN,
        }
    }

    fn convert_index_format(format: IndexFormat) -> u32 {
        match format {
            IndexFormat::Uint16 => Gl::UNSIGNED_SHORT,
            IndexFormat::Uint32 => Gl::UNSIGNED_INT,
        }
    }

    fn buffer_target(usage: BufferUsage) -> u32 {
        if usage.contains(BufferUsage::INDEX) {
            Gl::ELEMENT_ARRAY_BUFFER
        } else {
            Gl::ARRAY_BUFFER
        }
    }
}

impl RenderContext for WebGlContext {
    fn create_buffer(
        &mut self,
        desc: &BufferDescriptor,
        data: &[u8],
    ) -> BackendResult<BufferHandle> {
        if self.gl.is_context_lost() {
            return Err(BackendError::ContextLost);
        }
        let buffer = self.gl.create_buffer().ok_or_else(|| {
            BackendError::BufferCreationFailed(
                desc.label.clone().unwrap_or_else(|| "buffer".to_string()),
            )
        })?;

        let target = Self::buffer_target(desc.usage);
        self.gl.bind_buffer(target, Some(&buffer));
        self.gl.buffer_data_with_u8_array(target, data, Gl::STATIC_DRAW);
        self.gl.bind_buffer(target, None);

        let id = self.next_buffer_id;
        self.next_buffer_id += 1;
        self.buffers.insert(id, buffer);
        log::trace!("WebGL: created buffer {:?} ({} bytes)", desc.label, desc.size);

        Ok(BufferHandle(id))
    }

    fn destroy_buffer(&mut self, buffer: BufferHandle) {
        if let Some(buf) = self.buffers.remove(&buffer.0) {
            self.gl.delete_buffer(Some(&buf));
        }
    }

    fn bind_vertex_buffer(&mut self, buffer: Option<BufferHandle>) {
        let buf = buffer.and_then(|b| self.buffers.get(&b.0));
        self.gl.bind_buffer(Gl::ARRAY_BUFFER, buf);
    }

    fn bind_index_buffer(&mut self, buffer: Option<BufferHandle>) {
        let buf = buffer.and_then(|b| self.buffers.get(&b.0));
        self.gl.bind_buffer(Gl::ELEMENT_ARRAY_BUFFER, buf);
    }

    fn enable_vertex_attrib(&mut self, location: u32) {
        self.gl.enable_vertex_attrib_array(location);
    }

    fn disable_vertex_attrib(&mut self, location: u32) {
        self.gl.disable_vertex_attrib_array(location);
    }

    fn vertex_attrib_pointer(&mut self, location: u32, pointer: &VertexAttribPointer) {
        self.gl.vertex_attrib_pointer_with_i32(
            location,
            pointer.format.components() as i32,
            Gl::FLOAT,
            pointer.normalized,
            pointer.stride as i32,
            pointer.offset as i32,
        );
    }

    fn draw_indexed(
        &mut self,
        topology: PrimitiveTopology,
        count: u32,
        format: IndexFormat,
        byte_offset: u64,
    ) {
        if format == IndexFormat::Uint32 && !self.uint32_indices {
            return;
        }
        self.gl.draw_elements_with_i32(
            Self::convert_topology(topology),
            count as i32,
            Self::convert_index_format(format),
            byte_offset as i32,
        );
    }
}

/// [`ShaderBinding`] answering attribute lookups from a linked WebGL program
pub struct WebGlShaderBinding {
    id: ShaderId,
    gl: Gl,
    program: WebGlProgram,
}

impl WebGlShaderBinding {
    pub fn new(gl: Gl, program: WebGlProgram) -> Self {
        Self {
            id: ShaderId::allocate(),
            gl,
            program,
        }
    }

    pub fn program(&self) -> &WebGlProgram {
        &self.program
    }
}

impl ShaderBinding for WebGlShaderBinding {
    fn id(&self) -> ShaderId {
        self.id
    }

    fn attrib_location(&self, name: &str) -> Option<u32> {
        // -1 for attributes the program does not use
        u32::try_from(self.gl.get_attrib_location(&self.program, name)).ok()
    }
}
