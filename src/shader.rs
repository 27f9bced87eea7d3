//! Shader attribute binding
//!
//! A mesh does not compile or link shaders. It only needs to know, for each
//! attribute slot, which bind location the active program expects. That
//! question is answered by a [`ShaderBinding`], and the answers are cached in
//! an [`AttribBindings`] table until the shader or the slot naming changes.

use std::cell::Cell;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::resources::{AttribSlots, ATTRIB_SLOT_COUNT};

/// Identity of a linked shader program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderId(pub u64);

impl ShaderId {
    /// Allocate a process-unique id.
    pub fn allocate() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Resolves attribute names against the active attributes of a program.
pub trait ShaderBinding {
    /// Identity of the program, used to invalidate cached bindings.
    fn id(&self) -> ShaderId;

    /// Bind location of an active attribute, `None` if the program does not use it.
    fn attrib_location(&self, name: &str) -> Option<u32>;
}

/// Slot index to bind location table for one (shader, slot configuration) pair.
#[derive(Debug, Clone, Default)]
pub struct AttribBindings {
    key: Option<(ShaderId, u64)>,
    locations: [Option<u32>; ATTRIB_SLOT_COUNT],
}

impl AttribBindings {
    /// Resolve every enabled slot against `shader`.
    ///
    /// Disabled slots and names the shader does not know stay unbound.
    pub fn resolve(shader: &dyn ShaderBinding, slots: &AttribSlots) -> Self {
        let mut locations = [None; ATTRIB_SLOT_COUNT];
        for (index, slot) in slots.iter().enumerate() {
            if !slot.enabled {
                continue;
            }
            locations[index] = shader.attrib_location(&slot.name);
            if locations[index].is_none() {
                log::trace!("attribute {} not active in shader {:?}", slot.name, shader.id());
            }
        }
        Self {
            key: Some((shader.id(), slots.generation())),
            locations,
        }
    }

    /// Re-resolve if `shader` or the slot configuration changed since the last
    /// resolve. Returns `true` when the table was recomputed.
    pub fn refresh(&mut self, shader: &dyn ShaderBinding, slots: &AttribSlots) -> bool {
        if self.key == Some((shader.id(), slots.generation())) {
            return false;
        }
        *self = Self::resolve(shader, slots);
        true
    }

    /// Forget the cached table.
    pub fn invalidate(&mut self) {
        *self = Self::default();
    }

    pub fn location(&self, slot: usize) -> Option<u32> {
        self.locations.get(slot).copied().flatten()
    }

    /// `(slot, location)` pairs of every bound slot.
    pub fn iter(&self) -> impl Iterator<Item = (usize, u32)> + '_ {
        self.locations
            .iter()
            .enumerate()
            .filter_map(|(slot, location)| location.map(|l| (slot, l)))
    }
}

/// A [`ShaderBinding`] backed by a fixed name to location map.
///
/// Useful for tools and tests, and for programs whose attribute locations are
/// assigned explicitly before linking.
#[derive(Debug)]
pub struct NamedAttribLocations {
    id: ShaderId,
    locations: HashMap<String, u32>,
    lookups: Cell<usize>,
}

impl NamedAttribLocations {
    pub fn new() -> Self {
        Self {
            id: ShaderId::allocate(),
            locations: HashMap::new(),
            lookups: Cell::new(0),
        }
    }

    /// Locations matching the default slot names, slot index = location.
    pub fn standard() -> Self {
        let mut binding = Self::new();
        for (index, slot) in AttribSlots::default().iter().enumerate() {
            binding.locations.insert(slot.name.clone(), index as u32);
        }
        binding
    }

    pub fn with(mut self, name: impl Into<String>, location: u32) -> Self {
        self.locations.insert(name.into(), location);
        self
    }

    /// Number of `attrib_location` queries answered so far.
    pub fn lookups(&self) -> usize {
        self.lookups.get()
    }
}

impl Default for NamedAttribLocations {
    fn default() -> Self {
        Self::new()
    }
}

impl ShaderBinding for NamedAttribLocations {
    fn id(&self) -> ShaderId {
        self.id
    }

    fn attrib_location(&self, name: &str) -> Option<u32> {
        self.lookups.set(self.lookups.get() + 1);
        self.locations.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_enabled_slots_only() {
        let shader = NamedAttribLocations::standard();
        let bindings = AttribBindings::resolve(&shader, &AttribSlots::default());

        // generic slots are disabled by default
        assert_eq!(bindings.iter().count(), 4);
        assert_eq!(bindings.location(0), Some(0));
        assert_eq!(bindings.location(3), Some(3));
        assert_eq!(bindings.location(4), None);
    }

    #[test]
    fn unknown_names_are_skipped() {
        let shader = NamedAttribLocations::new()
            .with("aPosition", 5)
            .with("aColor", 1);
        let bindings = AttribBindings::resolve(&shader, &AttribSlots::default());

        let bound: Vec<_> = bindings.iter().collect();
        assert_eq!(bound, vec![(0, 5), (2, 1)]);
    }

    #[test]
    fn refresh_reuses_table_until_something_changes() {
        let shader = NamedAttribLocations::standard();
        let mut slots = AttribSlots::default();
        let mut bindings = AttribBindings::default();

        assert!(bindings.refresh(&shader, &slots));
        let lookups = shader.lookups();
        assert!(!bindings.refresh(&shader, &slots));
        assert_eq!(shader.lookups(), lookups);

        slots.set_name(1, "aNormalOS");
        assert!(bindings.refresh(&shader, &slots));
        assert_eq!(bindings.location(1), None);

        let other = NamedAttribLocations::standard();
        assert!(bindings.refresh(&other, &slots));
    }

    #[test]
    fn shader_ids_are_unique() {
        assert_ne!(ShaderId::allocate(), ShaderId::allocate());
    }
}
