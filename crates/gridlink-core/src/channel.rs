//! Channel modes and the per-node capacity function.

use crate::flags::{NodeFlag, NodeFlags};

/// Channels carried by a regular cable in [`ChannelMode::Default`].
pub const REGULAR_CABLE_CHANNELS: u32 = 8;

/// Channels carried by a dense cable in [`ChannelMode::Default`].
pub const DENSE_CABLE_CHANNELS: u32 = 32;

/// Network-wide channel capacity setting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ChannelMode {
    /// Base capacities.
    #[default]
    Default,
    /// Base capacities doubled.
    X2,
    /// Base capacities tripled.
    X3,
    /// Base capacities quadrupled.
    X4,
    /// No channel limits at all.
    Infinite,
}

impl ChannelMode {
    /// Multiplier applied to the base cable capacities.
    ///
    /// [`ChannelMode::Infinite`] reports `1`; callers must check
    /// [`is_infinite`](Self::is_infinite) first.
    pub fn cable_capacity_factor(self) -> u32 {
        match self {
            ChannelMode::Default | ChannelMode::Infinite => 1,
            ChannelMode::X2 => 2,
            ChannelMode::X3 => 3,
            ChannelMode::X4 => 4,
        }
    }

    /// Whether channel limits are disabled.
    pub fn is_infinite(self) -> bool {
        self == ChannelMode::Infinite
    }

    /// Capacity of a grid running without a controller.
    pub fn ad_hoc_capacity(self) -> u32 {
        if self.is_infinite() {
            u32::MAX
        } else {
            REGULAR_CABLE_CHANNELS * self.cable_capacity_factor()
        }
    }
}

/// Maximum number of channels a node with `flags` may carry.
///
/// Zero for nodes that cannot carry channels, unbounded under
/// [`ChannelMode::Infinite`], otherwise the regular or dense base count
/// scaled by the mode's capacity factor.
pub fn max_channels(flags: NodeFlags, mode: ChannelMode) -> u32 {
    if flags.contains(NodeFlag::CannotCarry) {
        return 0;
    }
    if mode.is_infinite() {
        return u32::MAX;
    }
    let base = if flags.contains(NodeFlag::DenseCapacity) {
        DENSE_CABLE_CHANNELS
    } else {
        REGULAR_CABLE_CHANNELS
    };
    base * mode.cable_capacity_factor()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cannot_carry_wins_over_everything() {
        let flags = NodeFlags::of(&[NodeFlag::CannotCarry, NodeFlag::DenseCapacity]);
        assert_eq!(max_channels(flags, ChannelMode::Infinite), 0);
        assert_eq!(max_channels(flags, ChannelMode::X4), 0);
    }

    #[test]
    fn infinite_is_unbounded() {
        assert_eq!(max_channels(NodeFlags::empty(), ChannelMode::Infinite), u32::MAX);
    }

    #[test]
    fn factor_scales_base() {
        let dense = NodeFlags::of(&[NodeFlag::DenseCapacity]);
        assert_eq!(max_channels(NodeFlags::empty(), ChannelMode::Default), 8);
        assert_eq!(max_channels(NodeFlags::empty(), ChannelMode::X3), 24);
        assert_eq!(max_channels(dense, ChannelMode::Default), 32);
        assert_eq!(max_channels(dense, ChannelMode::X2), 64);
    }

    #[test]
    fn ad_hoc_capacity_follows_regular_cable() {
        assert_eq!(ChannelMode::Default.ad_hoc_capacity(), 8);
        assert_eq!(ChannelMode::X4.ad_hoc_capacity(), 32);
        assert_eq!(ChannelMode::Infinite.ad_hoc_capacity(), u32::MAX);
    }
}
