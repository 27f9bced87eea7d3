//! Surfaces: material-tagged ranges of a mesh's index buffer

use std::collections::BTreeMap;

use crate::backend::types::PrimitiveTopology;

/// Material name used when none has been set
pub const DEFAULT_MATERIAL: &str = "unknown";

/// Starting value of the `o`, `g` and `s` surface properties
pub const UNKNOWN_PROPERTY: &str = "unknown";

/// Index of a surface within its mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub(crate) usize);

impl SurfaceId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// A contiguous index range drawn with one material and one topology.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    material: String,
    topology: PrimitiveTopology,
    first: u32,
    byte_offset: u64,
    count: u32,
    properties: BTreeMap<String, String>,
}

impl Surface {
    /// Create an empty surface starting at index `first`.
    ///
    /// Properties start as `o`, `g`, `s` = `"unknown"`, `usemtl` = the
    /// material name and `mtllib` = `""`.
    pub fn new(material: &str, topology: PrimitiveTopology, first: u32, byte_offset: u64) -> Self {
        let mut properties = BTreeMap::new();
        properties.insert("o".to_string(), UNKNOWN_PROPERTY.to_string());
        properties.insert("g".to_string(), UNKNOWN_PROPERTY.to_string());
        properties.insert("s".to_string(), UNKNOWN_PROPERTY.to_string());
        properties.insert("usemtl".to_string(), material.to_string());
        properties.insert("mtllib".to_string(), String::new());

        Self {
            material: material.to_string(),
            topology,
            first,
            byte_offset,
            count: 0,
            properties,
        }
    }

    pub fn material(&self) -> &str {
        &self.material
    }

    pub fn topology(&self) -> PrimitiveTopology {
        self.topology
    }

    /// Position of the first index in the mesh's index buffer
    pub fn first(&self) -> u32 {
        self.first
    }

    /// Byte offset of the first index in the mesh's index buffer
    pub fn byte_offset(&self) -> u64 {
        self.byte_offset
    }

    /// Number of indices in this surface
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Number of whole primitives, `None` for strips, loops and fans.
    pub fn primitive_count(&self) -> Option<u32> {
        self.topology
            .indices_per_primitive()
            .map(|per| self.count / per)
    }

    pub(crate) fn add(&mut self) {
        self.count += 1;
    }

    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }

    /// Property value, `""` when the key is not set.
    pub fn property(&self, key: &str) -> &str {
        self.properties.get(key).map(String::as_str).unwrap_or("")
    }

    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_surface_defaults() {
        let surface = Surface::new("brick", PrimitiveTopology::Triangles, 6, 12);
        assert_eq!(surface.material(), "brick");
        assert_eq!(surface.first(), 6);
        assert_eq!(surface.byte_offset(), 12);
        assert_eq!(surface.count(), 0);
        assert_eq!(surface.property("usemtl"), "brick");
        for key in ["o", "g", "s"] {
            assert_eq!(surface.property(key), UNKNOWN_PROPERTY);
        }
        assert_eq!(surface.property("mtllib"), "");
        assert_eq!(surface.property("nonexistent"), "");
    }

    #[test]
    fn primitive_count_follows_topology() {
        let mut tris = Surface::new("a", PrimitiveTopology::Triangles, 0, 0);
        let mut fan = Surface::new("a", PrimitiveTopology::TriangleFan, 0, 0);
        for _ in 0..6 {
            tris.add();
            fan.add();
        }
        assert_eq!(tris.primitive_count(), Some(2));
        assert_eq!(fan.primitive_count(), None);
    }

    #[test]
    fn properties_can_be_overwritten() {
        let mut surface = Surface::new("a", PrimitiveTopology::Triangles, 0, 0);
        surface.set_property("g", "body");
        surface.set_property("custom", "value");
        assert_eq!(surface.property("g"), "body");
        assert_eq!(surface.properties().len(), 6);
    }
}
