//! Common types shared between backends

/// Primitive topology used when drawing a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrimitiveTopology {
    Points,
    LineStrip,
    LineLoop,
    #[default]
    Triangles,
    TriangleStrip,
    TriangleFan,
}

impl PrimitiveTopology {
    /// Number of indices per primitive, `None` for strips, loops and fans.
    pub fn indices_per_primitive(&self) -> Option<u32> {
        match self {
            Self::Points => Some(1),
            Self::Triangles => Some(3),
            Self::LineStrip | Self::LineLoop | Self::TriangleStrip | Self::TriangleFan => None,
        }
    }
}

/// Index element format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexFormat {
    Uint16,
    Uint32,
}

impl IndexFormat {
    /// Index capacity from which 32-bit indices are used.
    pub const UINT32_THRESHOLD: usize = 32768;

    /// Pick the index format for a mesh holding `max_indices` indices.
    pub fn for_capacity(max_indices: usize) -> Self {
        if max_indices < Self::UINT32_THRESHOLD {
            IndexFormat::Uint16
        } else {
            IndexFormat::Uint32
        }
    }

    /// Size of one index in bytes
    pub fn size(&self) -> u64 {
        match self {
            IndexFormat::Uint16 => 2,
            IndexFormat::Uint32 => 4,
        }
    }

    /// Largest index value representable in this format
    pub fn max_value(&self) -> u32 {
        match self {
            IndexFormat::Uint16 => u16::MAX as u32,
            IndexFormat::Uint32 => u32::MAX,
        }
    }
}

/// Buffer usage flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferUsage(u32);

impl BufferUsage {
    pub const VERTEX: Self = Self(1 << 0);
    pub const INDEX: Self = Self(1 << 1);
    pub const COPY_DST: Self = Self(1 << 2);

    pub fn contains(&self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }
}

impl std::ops::BitOr for BufferUsage {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

/// Buffer descriptor
#[derive(Debug, Clone)]
pub struct BufferDescriptor {
    pub label: Option<String>,
    pub size: u64,
    pub usage: BufferUsage,
}

/// Vertex attribute component format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexFormat {
    Float32,
    Float32x2,
    Float32x3,
    Float32x4,
}

impl VertexFormat {
    pub fn components(&self) -> u32 {
        match self {
            VertexFormat::Float32 => 1,
            VertexFormat::Float32x2 => 2,
            VertexFormat::Float32x3 => 3,
            VertexFormat::Float32x4 => 4,
        }
    }
}

/// Where one vertex attribute lives inside the bound vertex buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribPointer {
    pub format: VertexFormat,
    pub normalized: bool,
    pub stride: u64,
    pub offset: u64,
}
