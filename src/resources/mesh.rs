//! Indexed geometry mesh
//!
//! An append-only builder over fixed-capacity vertex and index storage.
//! Vertices are interleaved records of [`ATTRIB_SLOT_COUNT`] attributes of
//! four floats each. Indices are grouped into [`Surface`]s. GPU buffers are
//! only (re)built on the first render after a mutation.
//!
//! Nothing here fails on bad geometry: writes past capacity are dropped and
//! out-of-range indices are clamped to 0. Both are counted in
//! [`MeshDiagnostics`] and reported by the return values of the mutating
//! calls. Only GPU buffer creation can fail a render.

use glam::{Vec2, Vec3, Vec4};

use crate::backend::traits::*;
use crate::backend::types::*;
use crate::shader::{AttribBindings, ShaderBinding};
use crate::MeshConfig;

use super::attrib::*;
use super::surface::*;

/// Which vertex an index refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexRef {
    /// An explicit vertex index
    Vertex(u32),
    /// The running index counter, i.e. the vertex emitted for this index
    /// position when every vertex gets exactly one index in emission order
    Sequential,
}

impl From<u32> for IndexRef {
    fn from(vertex: u32) -> Self {
        IndexRef::Vertex(vertex)
    }
}

/// Outcome of [`IndexedGeometryMesh::add_index`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexStatus {
    /// Stored as the given vertex index
    Stored(u32),
    /// Referenced a vertex that does not exist; stored as 0
    Clamped { requested: usize },
    /// Index storage is full
    Dropped,
    /// The surface is not the open surface
    Rejected,
}

impl IndexStatus {
    /// Whether an index was written
    pub fn is_written(&self) -> bool {
        matches!(self, IndexStatus::Stored(_) | IndexStatus::Clamped { .. })
    }
}

/// Counters for the conditions the mesh silently tolerates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeshDiagnostics {
    pub dropped_vertices: usize,
    pub dropped_indices: usize,
    pub clamped_indices: usize,
    pub rejected_indices: usize,
    /// Successful `build_buffers` calls over the mesh's lifetime
    pub buffer_builds: usize,
}

/// What one [`IndexedGeometryMesh::render`] call submitted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub rebuilt: bool,
    pub bound_attribs: usize,
    pub draw_calls: u32,
    pub indices: u32,
}

#[derive(Debug, Clone)]
enum IndexStorage {
    Uint16(Vec<u16>),
    Uint32(Vec<u32>),
}

impl IndexStorage {
    fn new(format: IndexFormat, capacity: usize) -> Self {
        match format {
            IndexFormat::Uint16 => IndexStorage::Uint16(vec![0; capacity]),
            IndexFormat::Uint32 => IndexStorage::Uint32(vec![0; capacity]),
        }
    }

    fn format(&self) -> IndexFormat {
        match self {
            IndexStorage::Uint16(_) => IndexFormat::Uint16,
            IndexStorage::Uint32(_) => IndexFormat::Uint32,
        }
    }

    /// `value` must fit the storage format.
    fn set(&mut self, position: usize, value: u32) {
        match self {
            IndexStorage::Uint16(data) => data[position] = value as u16,
            IndexStorage::Uint32(data) => data[position] = value,
        }
    }

    fn get(&self, position: usize) -> Option<u32> {
        match self {
            IndexStorage::Uint16(data) => data.get(position).map(|&i| i as u32),
            IndexStorage::Uint32(data) => data.get(position).copied(),
        }
    }

    fn as_bytes(&self) -> &[u8] {
        match self {
            IndexStorage::Uint16(data) => bytemuck::cast_slice(data),
            IndexStorage::Uint32(data) => bytemuck::cast_slice(data),
        }
    }
}

/// Fixed-capacity indexed mesh with lazily built GPU buffers.
#[derive(Debug)]
pub struct IndexedGeometryMesh {
    label: String,
    slots: AttribSlots,
    max_vertices: usize,
    max_indices: usize,
    vertices: Vec<f32>,
    vertex_count: usize,
    indices: IndexStorage,
    index_count: usize,
    surfaces: Vec<Surface>,
    open_surface: Option<SurfaceId>,
    material_name: String,
    dirty: bool,
    vertex_buffer: Option<BufferHandle>,
    index_buffer: Option<BufferHandle>,
    bindings: AttribBindings,
    diagnostics: MeshDiagnostics,
}

impl Default for IndexedGeometryMesh {
    fn default() -> Self {
        Self::with_config(&MeshConfig::default())
    }
}

impl IndexedGeometryMesh {
    /// Create a mesh holding at most `max_vertices` vertices and `max_indices`
    /// indices. Fewer than 32768 indices selects 16-bit index storage.
    pub fn new(max_vertices: usize, max_indices: usize) -> Self {
        Self::with_config(&MeshConfig {
            max_vertices,
            max_indices,
            ..Default::default()
        })
    }

    pub fn with_config(config: &MeshConfig) -> Self {
        let format = IndexFormat::for_capacity(config.max_indices);
        log::debug!(
            "creating mesh {:?}: {} vertices, {} {:?} indices",
            config.label,
            config.max_vertices,
            config.max_indices,
            format
        );
        Self {
            label: config.label.clone().unwrap_or_else(|| "mesh".to_string()),
            slots: AttribSlots::default(),
            max_vertices: config.max_vertices,
            max_indices: config.max_indices,
            vertices: vec![0.0; config.max_vertices * VERTEX_FLOATS],
            vertex_count: 0,
            indices: IndexStorage::new(format, config.max_indices),
            index_count: 0,
            surfaces: Vec::new(),
            open_surface: None,
            material_name: DEFAULT_MATERIAL.to_string(),
            dirty: true,
            vertex_buffer: None,
            index_buffer: None,
            bindings: AttribBindings::default(),
            diagnostics: MeshDiagnostics::default(),
        }
    }

    /// Drop all geometry and surfaces, keeping capacities and attribute slots.
    pub fn reset(&mut self) {
        self.vertices = vec![0.0; self.max_vertices * VERTEX_FLOATS];
        self.indices = IndexStorage::new(self.index_format(), self.max_indices);
        self.vertex_count = 0;
        self.index_count = 0;
        self.surfaces.clear();
        self.open_surface = None;
        self.material_name = DEFAULT_MATERIAL.to_string();
        self.dirty = true;
        self.diagnostics = MeshDiagnostics {
            buffer_builds: self.diagnostics.buffer_builds,
            ..Default::default()
        };
    }

    // Accessors

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn vertex_capacity(&self) -> usize {
        self.max_vertices
    }

    pub fn index_count(&self) -> usize {
        self.index_count
    }

    pub fn index_capacity(&self) -> usize {
        self.max_indices
    }

    pub fn index_format(&self) -> IndexFormat {
        self.indices.format()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn diagnostics(&self) -> &MeshDiagnostics {
        &self.diagnostics
    }

    pub fn surfaces(&self) -> &[Surface] {
        &self.surfaces
    }

    pub fn surface(&self, id: SurfaceId) -> Option<&Surface> {
        self.surfaces.get(id.0)
    }

    pub fn surface_mut(&mut self, id: SurfaceId) -> Option<&mut Surface> {
        self.surfaces.get_mut(id.0)
    }

    /// The surface currently receiving indices
    pub fn open_surface(&self) -> Option<SurfaceId> {
        self.open_surface
    }

    /// The interleaved record of vertex `index`
    pub fn vertex(&self, index: usize) -> Option<PendingVertex> {
        if index >= self.vertex_count {
            return None;
        }
        let record = &self.vertices[index * VERTEX_FLOATS..(index + 1) * VERTEX_FLOATS];
        let mut values = [Vec4::ZERO; ATTRIB_SLOT_COUNT];
        for (value, chunk) in values.iter_mut().zip(record.chunks_exact(ATTRIB_COMPONENTS)) {
            *value = Vec4::from_slice(chunk);
        }
        Some(PendingVertex::from_values(values))
    }

    /// The stored value at index position `position`
    pub fn index(&self, position: usize) -> Option<u32> {
        if position >= self.index_count {
            return None;
        }
        self.indices.get(position)
    }

    /// All stored indices in order
    pub fn indices(&self) -> Vec<u32> {
        (0..self.index_count)
            .filter_map(|i| self.indices.get(i))
            .collect()
    }

    /// Full vertex storage as uploaded to the GPU
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Full index storage as uploaded to the GPU
    pub fn index_bytes(&self) -> &[u8] {
        self.indices.as_bytes()
    }

    // Attribute slots

    pub fn attribs(&self) -> &AttribSlots {
        &self.slots
    }

    pub fn enable_attrib(&mut self, slot: usize) -> bool {
        self.slots.enable(slot)
    }

    pub fn disable_attrib(&mut self, slot: usize) -> bool {
        self.slots.disable(slot)
    }

    /// Rebind the shader attribute name slot `slot` is bound by.
    pub fn set_attrib_name(&mut self, slot: usize, name: impl Into<String>) -> bool {
        self.slots.set_name(slot, name)
    }

    /// Write an attribute slot. Writing the position slot also commits the
    /// current slot values as a new vertex, so every other slot must be set
    /// before the position of the vertex they belong to.
    ///
    /// Returns the index of the committed vertex, if one was emitted.
    pub fn set_vertex_attrib4(&mut self, slot: usize, x: f32, y: f32, z: f32, w: f32) -> Option<u32> {
        if !self.slots.set4(slot, x, y, z, w) {
            return None;
        }
        self.emit_if_position(slot)
    }

    pub fn set_vertex_attrib1(&mut self, slot: usize, x: f32) -> Option<u32> {
        self.set_vertex_attrib4(slot, x, 0.0, 0.0, 1.0)
    }

    pub fn set_vertex_attrib2(&mut self, slot: usize, x: f32, y: f32) -> Option<u32> {
        self.set_vertex_attrib4(slot, x, y, 0.0, 1.0)
    }

    pub fn set_vertex_attrib3(&mut self, slot: usize, x: f32, y: f32, z: f32) -> Option<u32> {
        self.set_vertex_attrib4(slot, x, y, z, 1.0)
    }

    pub fn set_vertex_attrib_vec2(&mut self, slot: usize, v: Vec2) -> Option<u32> {
        self.set_vertex_attrib2(slot, v.x, v.y)
    }

    pub fn set_vertex_attrib_vec3(&mut self, slot: usize, v: Vec3) -> Option<u32> {
        self.set_vertex_attrib3(slot, v.x, v.y, v.z)
    }

    pub fn set_vertex_attrib_vec4(&mut self, slot: usize, v: Vec4) -> Option<u32> {
        self.set_vertex_attrib4(slot, v.x, v.y, v.z, v.w)
    }

    fn emit_if_position(&mut self, slot: usize) -> Option<u32> {
        if slot != POSITION_SLOT {
            return None;
        }
        let pending = self.slots.pending();
        self.commit(&pending)
    }

    /// Append one vertex. Returns its index, or `None` once vertex storage is full.
    pub fn commit(&mut self, vertex: &PendingVertex) -> Option<u32> {
        if self.vertex_count >= self.max_vertices {
            self.diagnostics.dropped_vertices += 1;
            log::trace!("{}: vertex storage full, dropping vertex", self.label);
            return None;
        }

        let base = self.vertex_count * VERTEX_FLOATS;
        self.vertices[base..base + VERTEX_FLOATS].copy_from_slice(vertex.as_floats());
        let index = self.vertex_count as u32;
        self.vertex_count += 1;
        self.dirty = true;
        Some(index)
    }

    // Surfaces

    /// The material name new surfaces are tagged with
    pub fn material_name(&self) -> &str {
        &self.material_name
    }

    pub fn set_material_name(&mut self, name: impl Into<String>) {
        self.material_name = name.into();
    }

    /// Open a new surface starting at the current end of the index buffer.
    ///
    /// A surface that is still open is closed first.
    pub fn begin_surface(&mut self, topology: PrimitiveTopology) -> SurfaceId {
        if let Some(open) = self.open_surface {
            log::debug!("{}: surface {} implicitly closed", self.label, open.0);
        }

        let id = SurfaceId(self.surfaces.len());
        let byte_offset = self.index_count as u64 * self.index_format().size();
        self.surfaces.push(Surface::new(
            &self.material_name,
            topology,
            self.index_count as u32,
            byte_offset,
        ));
        self.open_surface = Some(id);
        log::trace!(
            "{}: begin surface {} ({:?}, material {})",
            self.label,
            id.0,
            topology,
            self.material_name
        );
        id
    }

    /// Close `surface` if it is the open one.
    pub fn end_surface(&mut self, surface: SurfaceId) {
        if self.open_surface == Some(surface) {
            self.open_surface = None;
        } else {
            log::trace!("{}: end_surface on closed surface {}", self.label, surface.0);
        }
    }

    /// Append one index to the open surface.
    pub fn add_index(&mut self, surface: SurfaceId, index: impl Into<IndexRef>) -> IndexStatus {
        if self.open_surface != Some(surface) {
            self.diagnostics.rejected_indices += 1;
            log::warn!(
                "{}: index added to surface {} which is not open",
                self.label,
                surface.0
            );
            return IndexStatus::Rejected;
        }
        if self.index_count >= self.max_indices {
            self.diagnostics.dropped_indices += 1;
            log::trace!("{}: index storage full, dropping index", self.label);
            return IndexStatus::Dropped;
        }

        let requested = match index.into() {
            IndexRef::Vertex(vertex) => vertex as usize,
            IndexRef::Sequential => self.index_count,
        };
        let in_range = requested < self.vertex_count
            && requested <= self.index_format().max_value() as usize;
        let status = if in_range {
            self.indices.set(self.index_count, requested as u32);
            IndexStatus::Stored(requested as u32)
        } else {
            self.diagnostics.clamped_indices += 1;
            self.indices.set(self.index_count, 0);
            IndexStatus::Clamped { requested }
        };

        self.index_count += 1;
        self.surfaces[surface.0].add();
        self.dirty = true;
        status
    }

    // GPU side

    /// Recreate and upload the GPU buffers from the full CPU storage.
    ///
    /// On failure no buffer is kept and the mesh stays dirty.
    pub fn build_buffers(&mut self, ctx: &mut dyn RenderContext) -> BackendResult<()> {
        self.release(ctx);

        let vertex_bytes: &[u8] = bytemuck::cast_slice(&self.vertices);
        let vertex_buffer = ctx.create_buffer(
            &BufferDescriptor {
                label: Some(format!("{} vertices", self.label)),
                size: vertex_bytes.len() as u64,
                usage: BufferUsage::VERTEX | BufferUsage::COPY_DST,
            },
            vertex_bytes,
        )?;

        let index_bytes = self.indices.as_bytes();
        let index_buffer = match ctx.create_buffer(
            &BufferDescriptor {
                label: Some(format!("{} indices", self.label)),
                size: index_bytes.len() as u64,
                usage: BufferUsage::INDEX | BufferUsage::COPY_DST,
            },
            index_bytes,
        ) {
            Ok(buffer) => buffer,
            Err(err) => {
                ctx.destroy_buffer(vertex_buffer);
                return Err(err);
            }
        };

        self.vertex_buffer = Some(vertex_buffer);
        self.index_buffer = Some(index_buffer);
        self.dirty = false;
        self.diagnostics.buffer_builds += 1;
        log::debug!(
            "{}: built buffers ({} vertices, {} indices)",
            self.label,
            self.vertex_count,
            self.index_count
        );
        Ok(())
    }

    /// Delete the GPU buffers. The next render rebuilds them.
    pub fn release(&mut self, ctx: &mut dyn RenderContext) {
        if let Some(buffer) = self.vertex_buffer.take() {
            ctx.destroy_buffer(buffer);
        }
        if let Some(buffer) = self.index_buffer.take() {
            ctx.destroy_buffer(buffer);
        }
        self.dirty = true;
    }

    /// Forget the cached attribute locations, e.g. after the context was
    /// recreated with programs that reuse old ids.
    pub fn invalidate_bindings(&mut self) {
        self.bindings.invalidate();
    }

    /// Draw every surface, or only those tagged `material_filter`.
    ///
    /// Enabled slots are bound by name through `shader`; names the shader does
    /// not know are skipped. Fails only if the buffers had to be rebuilt and
    /// buffer creation failed, in which case nothing is drawn.
    pub fn render(
        &mut self,
        ctx: &mut dyn RenderContext,
        shader: &dyn ShaderBinding,
        material_filter: Option<&str>,
    ) -> BackendResult<RenderStats> {
        let mut stats = RenderStats::default();
        if self.dirty {
            self.build_buffers(ctx)?;
            stats.rebuilt = true;
        }
        self.bindings.refresh(shader, &self.slots);

        ctx.bind_vertex_buffer(self.vertex_buffer);
        ctx.bind_index_buffer(self.index_buffer);

        for (slot, location) in self.bindings.iter() {
            ctx.enable_vertex_attrib(location);
            ctx.vertex_attrib_pointer(
                location,
                &VertexAttribPointer {
                    format: VertexFormat::Float32x4,
                    normalized: false,
                    stride: VERTEX_STRIDE,
                    offset: slot as u64 * ATTRIB_SIZE,
                },
            );
            stats.bound_attribs += 1;
        }

        let format = self.index_format();
        for surface in &self.surfaces {
            if material_filter.is_some_and(|name| surface.material() != name) {
                continue;
            }
            ctx.draw_indexed(
                surface.topology(),
                surface.count(),
                format,
                surface.byte_offset(),
            );
            stats.draw_calls += 1;
            stats.indices += surface.count();
        }

        for (_, location) in self.bindings.iter() {
            ctx.disable_vertex_attrib(location);
        }
        ctx.bind_vertex_buffer(None);
        ctx.bind_index_buffer(None);

        Ok(stats)
    }
}
