//! Generational slab storing nodes, connections and grids.
//!
//! Removed entries bump their slot's generation, so ids held by deferred
//! work or by a stale ancestor link resolve to `None` instead of to
//! whatever reused the slot.

use std::marker::PhantomData;

use gridlink_core::{ConnectionId, GridId, NodeId};

/// Ids that address a [`Slab`] slot.
pub trait SlabKey: Copy {
    /// Build the key from a slot index and generation.
    fn from_parts(slot: u32, generation: u32) -> Self;
    /// Slot index.
    fn slot(self) -> u32;
    /// Generation at allocation.
    fn generation(self) -> u32;
}

macro_rules! slab_key {
    ($($ty:ty),*) => {$(
        impl SlabKey for $ty {
            fn from_parts(slot: u32, generation: u32) -> Self {
                <$ty>::from_parts(slot, generation)
            }
            fn slot(self) -> u32 {
                <$ty>::slot(self)
            }
            fn generation(self) -> u32 {
                <$ty>::generation(self)
            }
        }
    )*};
}

slab_key!(NodeId, ConnectionId, GridId);

struct Slot<T> {
    generation: u32,
    data: Option<T>,
}

/// Slot+generation storage keyed by a typed id.
///
/// Reuses slots via a free list. A slot whose generation wraps is retired
/// rather than recycled so an id from the first epoch can never alias.
pub struct Slab<K, T> {
    slots: Vec<Slot<T>>,
    free_list: Vec<u32>,
    len: usize,
    _key: PhantomData<K>,
}

impl<K: SlabKey, T> Default for Slab<K, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: SlabKey, T> Slab<K, T> {
    /// Create an empty slab.
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            _key: PhantomData,
        }
    }

    /// Store `value` and return its id.
    pub fn insert(&mut self, value: T) -> K {
        self.len += 1;
        if let Some(slot_idx) = self.free_list.pop() {
            let slot = &mut self.slots[slot_idx as usize];
            slot.data = Some(value);
            K::from_parts(slot_idx, slot.generation)
        } else {
            let slot_idx = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                data: Some(value),
            });
            K::from_parts(slot_idx, 0)
        }
    }

    /// The value behind `key`, or `None` when stale.
    pub fn get(&self, key: K) -> Option<&T> {
        let slot = self.slots.get(key.slot() as usize)?;
        if slot.generation != key.generation() {
            return None;
        }
        slot.data.as_ref()
    }

    /// Mutable access to the value behind `key`.
    pub fn get_mut(&mut self, key: K) -> Option<&mut T> {
        let slot = self.slots.get_mut(key.slot() as usize)?;
        if slot.generation != key.generation() {
            return None;
        }
        slot.data.as_mut()
    }

    /// Whether `key` resolves.
    pub fn contains(&self, key: K) -> bool {
        self.get(key).is_some()
    }

    /// Remove and return the value behind `key`. Stale keys are a no-op.
    pub fn remove(&mut self, key: K) -> Option<T> {
        let slot_idx = key.slot();
        let slot = self.slots.get_mut(slot_idx as usize)?;
        if slot.generation != key.generation() {
            return None;
        }
        let value = slot.data.take()?;
        self.len -= 1;
        slot.generation = slot.generation.wrapping_add(1);
        if slot.generation != 0 {
            self.free_list.push(slot_idx);
        }
        Some(value)
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the slab holds nothing.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Live entries in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (K, &T)> {
        self.slots.iter().enumerate().filter_map(|(idx, slot)| {
            slot.data
                .as_ref()
                .map(|v| (K::from_parts(idx as u32, slot.generation), v))
        })
    }

    /// Ids of live entries in slot order.
    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.iter().map(|(k, _)| k)
    }
}
