//! Vertex attribute slots
//!
//! Every vertex carries exactly [`ATTRIB_SLOT_COUNT`] attributes of four
//! `f32` components each. Slot 0 is the position; the others are normal,
//! color, texture coordinate and four generic channels.

use glam::{Vec2, Vec3, Vec4};

/// Number of attribute slots per vertex
pub const ATTRIB_SLOT_COUNT: usize = 8;
/// Components per attribute
pub const ATTRIB_COMPONENTS: usize = 4;
/// Floats in one interleaved vertex record
pub const VERTEX_FLOATS: usize = ATTRIB_SLOT_COUNT * ATTRIB_COMPONENTS;
/// Size of one attribute in bytes
pub const ATTRIB_SIZE: u64 = (ATTRIB_COMPONENTS * std::mem::size_of::<f32>()) as u64;
/// Size of one interleaved vertex record in bytes
pub const VERTEX_STRIDE: u64 = ATTRIB_SLOT_COUNT as u64 * ATTRIB_SIZE;

pub const POSITION_SLOT: usize = 0;
pub const NORMAL_SLOT: usize = 1;
pub const COLOR_SLOT: usize = 2;
pub const TEXCOORD_SLOT: usize = 3;
pub const GENERIC1_SLOT: usize = 4;
pub const GENERIC2_SLOT: usize = 5;
pub const GENERIC3_SLOT: usize = 6;
pub const GENERIC4_SLOT: usize = 7;

/// One named attribute channel
#[derive(Debug, Clone, PartialEq)]
pub struct AttribSlot {
    /// Attribute name looked up in the shader at bind time
    pub name: String,
    /// Disabled slots are still stored per vertex but never bound
    pub enabled: bool,
    pub value: Vec4,
}

impl AttribSlot {
    fn new(name: &str, enabled: bool, value: Vec4) -> Self {
        Self {
            name: name.to_string(),
            enabled,
            value,
        }
    }
}

/// The fixed set of attribute slots owned by a mesh.
///
/// Value writes mutate the slot in place. Name and enable changes bump a
/// generation counter so cached shader bindings know to re-resolve.
#[derive(Debug, Clone, PartialEq)]
pub struct AttribSlots {
    slots: [AttribSlot; ATTRIB_SLOT_COUNT],
    generation: u64,
}

impl Default for AttribSlots {
    fn default() -> Self {
        Self {
            slots: [
                AttribSlot::new("aPosition", true, Vec4::new(0.0, 0.0, 0.0, 1.0)),
                AttribSlot::new("aNormal", true, Vec4::ZERO),
                AttribSlot::new("aColor", true, Vec4::ONE),
                AttribSlot::new("aTexCoord", true, Vec4::ZERO),
                AttribSlot::new("aGeneric1", false, Vec4::W),
                AttribSlot::new("aGeneric2", false, Vec4::W),
                AttribSlot::new("aGeneric3", false, Vec4::W),
                AttribSlot::new("aGeneric4", false, Vec4::W),
            ],
            generation: 0,
        }
    }
}

impl AttribSlots {
    pub fn get(&self, slot: usize) -> Option<&AttribSlot> {
        self.slots.get(slot)
    }

    pub fn value(&self, slot: usize) -> Option<Vec4> {
        self.get(slot).map(|s| s.value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AttribSlot> {
        self.slots.iter()
    }

    /// Changes whenever a slot name or enabled flag changes.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Set a slot from four components. Out-of-range slots are ignored and
    /// return `false`.
    pub fn set4(&mut self, slot: usize, x: f32, y: f32, z: f32, w: f32) -> bool {
        match self.slots.get_mut(slot) {
            Some(s) => {
                s.value = Vec4::new(x, y, z, w);
                true
            }
            None => {
                log::trace!("ignoring write to attribute slot {slot}");
                false
            }
        }
    }

    pub fn set1(&mut self, slot: usize, x: f32) -> bool {
        self.set4(slot, x, 0.0, 0.0, 1.0)
    }

    pub fn set2(&mut self, slot: usize, x: f32, y: f32) -> bool {
        self.set4(slot, x, y, 0.0, 1.0)
    }

    pub fn set3(&mut self, slot: usize, x: f32, y: f32, z: f32) -> bool {
        self.set4(slot, x, y, z, 1.0)
    }

    pub fn set_vec2(&mut self, slot: usize, v: Vec2) -> bool {
        self.set2(slot, v.x, v.y)
    }

    pub fn set_vec3(&mut self, slot: usize, v: Vec3) -> bool {
        self.set3(slot, v.x, v.y, v.z)
    }

    pub fn set_vec4(&mut self, slot: usize, v: Vec4) -> bool {
        self.set4(slot, v.x, v.y, v.z, v.w)
    }

    pub fn enable(&mut self, slot: usize) -> bool {
        self.set_enabled(slot, true)
    }

    pub fn disable(&mut self, slot: usize) -> bool {
        self.set_enabled(slot, false)
    }

    fn set_enabled(&mut self, slot: usize, enabled: bool) -> bool {
        let Some(s) = self.slots.get_mut(slot) else {
            return false;
        };
        if s.enabled != enabled {
            s.enabled = enabled;
            self.generation += 1;
        }
        true
    }

    /// Rebind the shader attribute name a slot is looked up by.
    pub fn set_name(&mut self, slot: usize, name: impl Into<String>) -> bool {
        let Some(s) = self.slots.get_mut(slot) else {
            return false;
        };
        let name = name.into();
        if s.name != name {
            s.name = name;
            self.generation += 1;
        }
        true
    }

    /// Snapshot of the current slot values.
    pub fn pending(&self) -> PendingVertex {
        let mut values = [Vec4::ZERO; ATTRIB_SLOT_COUNT];
        for (value, slot) in values.iter_mut().zip(self.slots.iter()) {
            *value = slot.value;
        }
        PendingVertex { values }
    }
}

/// The attribute values one commit turns into a vertex record.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PendingVertex {
    values: [Vec4; ATTRIB_SLOT_COUNT],
}

impl Default for PendingVertex {
    /// Values of freshly created slots.
    fn default() -> Self {
        AttribSlots::default().pending()
    }
}

impl PendingVertex {
    pub fn from_values(values: [Vec4; ATTRIB_SLOT_COUNT]) -> Self {
        Self { values }
    }

    /// Every slot set to `value`.
    pub fn filled(value: Vec4) -> Self {
        Self {
            values: [value; ATTRIB_SLOT_COUNT],
        }
    }

    /// Set one slot. Out-of-range slots are ignored and return `false`.
    pub fn set(&mut self, slot: usize, value: Vec4) -> bool {
        match self.values.get_mut(slot) {
            Some(v) => {
                *v = value;
                true
            }
            None => false,
        }
    }

    pub fn with(mut self, slot: usize, value: Vec4) -> Self {
        self.set(slot, value);
        self
    }

    pub fn get(&self, slot: usize) -> Option<Vec4> {
        self.values.get(slot).copied()
    }

    pub fn position(&self) -> Vec4 {
        self.values[POSITION_SLOT]
    }

    pub fn values(&self) -> &[Vec4; ATTRIB_SLOT_COUNT] {
        &self.values
    }

    /// The interleaved 32-float record.
    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(std::slice::from_ref(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_slots() {
        let slots = AttribSlots::default();
        assert_eq!(slots.iter().count(), ATTRIB_SLOT_COUNT);
        assert_eq!(slots.get(POSITION_SLOT).unwrap().name, "aPosition");
        assert_eq!(slots.value(POSITION_SLOT), Some(Vec4::new(0.0, 0.0, 0.0, 1.0)));
        assert_eq!(slots.value(COLOR_SLOT), Some(Vec4::ONE));
        assert!(slots.get(TEXCOORD_SLOT).unwrap().enabled);
        assert!(!slots.get(GENERIC1_SLOT).unwrap().enabled);
        assert_eq!(slots.get(GENERIC4_SLOT).unwrap().name, "aGeneric4");
    }

    #[test]
    fn missing_components_default_to_w_one() {
        let mut slots = AttribSlots::default();
        slots.set1(4, 2.0);
        assert_eq!(slots.value(4), Some(Vec4::new(2.0, 0.0, 0.0, 1.0)));
        slots.set2(3, 0.25, 0.75);
        assert_eq!(slots.value(3), Some(Vec4::new(0.25, 0.75, 0.0, 1.0)));
        slots.set_vec3(1, Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(slots.value(1), Some(Vec4::new(0.0, 1.0, 0.0, 1.0)));
        slots.set_vec2(2, Vec2::new(0.5, 0.5));
        assert_eq!(slots.value(2), Some(Vec4::new(0.5, 0.5, 0.0, 1.0)));
    }

    #[test]
    fn out_of_range_slot_is_a_no_op() {
        let mut slots = AttribSlots::default();
        let before = slots.clone();
        assert!(!slots.set4(8, 1.0, 2.0, 3.0, 4.0));
        assert!(!slots.set_vec4(usize::MAX, Vec4::ONE));
        assert!(!slots.enable(9));
        assert!(!slots.set_name(8, "aBogus"));
        assert_eq!(slots, before);
    }

    #[test]
    fn generation_tracks_binding_changes_only() {
        let mut slots = AttribSlots::default();
        let start = slots.generation();

        slots.set3(1, 1.0, 0.0, 0.0);
        assert_eq!(slots.generation(), start);

        slots.enable(0);
        assert_eq!(slots.generation(), start, "already enabled");

        slots.enable(5);
        slots.set_name(5, "aWeight");
        assert_eq!(slots.generation(), start + 2);
    }

    #[test]
    fn pending_vertex_layout() {
        let pending = PendingVertex::filled(Vec4::W)
            .with(POSITION_SLOT, Vec4::new(1.0, 2.0, 3.0, 1.0))
            .with(GENERIC4_SLOT, Vec4::new(9.0, 8.0, 7.0, 6.0));

        let floats = pending.as_floats();
        assert_eq!(floats.len(), VERTEX_FLOATS);
        assert_eq!(&floats[0..4], &[1.0, 2.0, 3.0, 1.0]);
        assert_eq!(&floats[4..8], &[0.0, 0.0, 0.0, 1.0]);
        assert_eq!(&floats[28..32], &[9.0, 8.0, 7.0, 6.0]);

        let mut pending = PendingVertex::default();
        assert!(!pending.set(ATTRIB_SLOT_COUNT, Vec4::ONE));
        assert_eq!(pending, PendingVertex::default());
    }

    #[test]
    fn stride_constants() {
        assert_eq!(ATTRIB_SIZE, 16);
        assert_eq!(VERTEX_STRIDE, 128);
    }
}
