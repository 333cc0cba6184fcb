//! Ephemeral color entries (e.g. a painted entity) that expire after a
//! number of ticks.

use indexmap::IndexMap;

use gridlink_core::Color;

/// An entity tinted with a color for a limited number of ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColorEntry {
    /// The tinted entity.
    pub entity: u32,
    /// The tint.
    pub color: Color,
    ticks_left: i32,
}

impl ColorEntry {
    /// Create an entry that lives for `ticks` ticks.
    pub fn new(entity: u32, color: Color, ticks: i32) -> Self {
        Self {
            entity,
            color,
            ticks_left: ticks,
        }
    }

    /// Ticks remaining before eviction.
    pub fn ticks_left(&self) -> i32 {
        self.ticks_left
    }
}

/// Map of live [`ColorEntry`]s keyed by entity, ticked once per phase.
#[derive(Clone, Debug, Default)]
pub struct ColorTracker {
    entries: IndexMap<u32, ColorEntry>,
}

impl ColorTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the entry for `entry.entity`.
    pub fn insert(&mut self, entry: ColorEntry) {
        self.entries.insert(entry.entity, entry);
    }

    /// The live entry for `entity`.
    pub fn get(&self, entity: u32) -> Option<&ColorEntry> {
        self.entries.get(&entity)
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries are live.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over live entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &ColorEntry> {
        self.entries.values()
    }

    /// Decrement every entry and evict those that reach zero or below.
    ///
    /// Returns the number of evicted entries.
    pub fn tick(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, e| {
            e.ticks_left -= 1;
            e.ticks_left > 0
        });
        before - self.entries.len()
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_tick_entry_expires_on_third_tick() {
        let mut tracker = ColorTracker::new();
        tracker.insert(ColorEntry::new(1, Color::Red, 3));

        assert_eq!(tracker.tick(), 0);
        assert_eq!(tracker.tick(), 0);
        assert_eq!(tracker.get(1).map(|e| e.ticks_left()), Some(1));
        assert_eq!(tracker.tick(), 1);
        assert!(tracker.get(1).is_none());
    }

    #[test]
    fn non_positive_entries_evicted_immediately() {
        let mut tracker = ColorTracker::new();
        tracker.insert(ColorEntry::new(1, Color::Blue, 0));
        tracker.insert(ColorEntry::new(2, Color::Blue, -4));
        tracker.insert(ColorEntry::new(3, Color::Blue, 2));
        assert_eq!(tracker.tick(), 2);
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn insert_replaces_same_entity() {
        let mut tracker = ColorTracker::new();
        tracker.insert(ColorEntry::new(5, Color::Red, 1));
        tracker.insert(ColorEntry::new(5, Color::Green, 10));
        assert_eq!(tracker.len(), 1);
        assert_eq!(tracker.get(5).map(|e| e.color), Some(Color::Green));
    }
}
