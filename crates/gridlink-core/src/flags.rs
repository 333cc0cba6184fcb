//! Node capability flags.

use std::fmt;

/// A single capability a node may advertise.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum NodeFlag {
    /// The node only works when it has been granted a channel.
    RequireChannel = 0,
    /// The node needs a compressed channel; every ancestor on its route
    /// must allow compressed channels.
    CompressedChannel = 1,
    /// The node carries no channels at all (capacity zero).
    CannotCarry = 2,
    /// The node blocks compressed channels for its subtree.
    CannotCarryCompressed = 3,
    /// The node has dense capacity.
    DenseCapacity = 4,
}

impl NodeFlag {
    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// Bitset of [`NodeFlag`]s.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct NodeFlags(u8);

impl NodeFlags {
    /// No flags set.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Build a set from a slice of flags.
    pub fn of(flags: &[NodeFlag]) -> Self {
        flags.iter().copied().collect()
    }

    /// Whether `flag` is set.
    pub fn contains(self, flag: NodeFlag) -> bool {
        self.0 & flag.bit() != 0
    }

    /// Set `flag`.
    pub fn insert(&mut self, flag: NodeFlag) {
        self.0 |= flag.bit();
    }

    /// Clear `flag`.
    pub fn remove(&mut self, flag: NodeFlag) {
        self.0 &= !flag.bit();
    }

    /// Builder-style insert.
    pub fn with(mut self, flag: NodeFlag) -> Self {
        self.insert(flag);
        self
    }

    /// Raw mask.
    pub fn bits(self) -> u8 {
        self.0
    }
}

impl FromIterator<NodeFlag> for NodeFlags {
    fn from_iter<I: IntoIterator<Item = NodeFlag>>(iter: I) -> Self {
        let mut flags = NodeFlags::empty();
        for f in iter {
            flags.insert(f);
        }
        flags
    }
}

impl fmt::Debug for NodeFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(NodeFlag, &str); 5] = [
            (NodeFlag::RequireChannel, "RequireChannel"),
            (NodeFlag::CompressedChannel, "CompressedChannel"),
            (NodeFlag::CannotCarry, "CannotCarry"),
            (NodeFlag::CannotCarryCompressed, "CannotCarryCompressed"),
            (NodeFlag::DenseCapacity, "DenseCapacity"),
        ];
        f.debug_set()
            .entries(
                NAMES
                    .iter()
                    .filter(|(flag, _)| self.contains(*flag))
                    .map(|(_, name)| name),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_query() {
        let flags = NodeFlags::of(&[NodeFlag::DenseCapacity, NodeFlag::RequireChannel]);
        assert!(flags.contains(NodeFlag::DenseCapacity));
        assert!(flags.contains(NodeFlag::RequireChannel));
        assert!(!flags.contains(NodeFlag::CannotCarry));
    }

    #[test]
    fn remove_clears_only_that_flag() {
        let mut flags = NodeFlags::empty()
            .with(NodeFlag::CannotCarry)
            .with(NodeFlag::CompressedChannel);
        flags.remove(NodeFlag::CannotCarry);
        assert!(!flags.contains(NodeFlag::CannotCarry));
        assert!(flags.contains(NodeFlag::CompressedChannel));
    }

    #[test]
    fn debug_lists_names() {
        let flags = NodeFlags::of(&[NodeFlag::DenseCapacity]);
        assert_eq!(format!("{flags:?}"), "{\"DenseCapacity\"}");
    }
}
