//! Contracts between the network and the devices it connects.
//!
//! A [`NodeOwner`] is the device behind a node: it describes how the node
//! may connect and receives the node's notifications. A [`NodeProvider`]
//! is the world lookup used during neighbor discovery. Both are
//! implemented outside the network.

use crate::color::Color;
use crate::direction::{Direction, DirectionSet, Location};
use crate::flags::NodeFlags;
use crate::id::NodeId;

/// Events the network raises on a node's owner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Notification {
    /// A directional connection was added to or removed from the node.
    ConnectionsChanged,
    /// The owning player of the node changed.
    OwnerChanged,
    /// The node's finalized channel count changed. Delivered through the
    /// node's grid.
    ChannelsChanged,
}

/// The device behind a node.
///
/// Owners are shared (`Arc<dyn NodeOwner>`) between the network and the
/// deferred callables it schedules, hence `Send + Sync`.
pub trait NodeOwner: Send + Sync {
    /// Capability flags of the node.
    fn flags(&self) -> NodeFlags;

    /// Color category; [`Color::Transparent`] connects to any color.
    fn color(&self) -> Color {
        Color::Transparent
    }

    /// Sides through which the node accepts connections.
    fn connectable_sides(&self) -> DirectionSet {
        DirectionSet::all()
    }

    /// Where the device sits, or `None` when it is not placed in an
    /// accessible world. Nodes without a location skip neighbor discovery.
    fn location(&self) -> Option<Location>;

    /// Whether the device is a controller (a root of channel routing).
    fn is_controller(&self) -> bool {
        false
    }

    /// Receive a notification raised on the node.
    fn on_notification(&self, notification: Notification);

    /// Called from a deferred callable when a link to this device failed
    /// the security check.
    fn security_break(&self);
}

/// World lookup used by neighbor discovery.
///
/// Combines the two lookups of the placement layer: find the
/// network-capable device at a location, then ask it for the node
/// exposed on a given side.
pub trait NodeProvider {
    /// The node exposed on `side` of the device at `location`, if any.
    fn node_at(&self, location: Location, side: Direction) -> Option<NodeId>;
}
