//! Test utilities and mock types for gridlink development.
//!
//! Provides a [`RecordingOwner`] that captures every notification and
//! breach raised on it, a [`MapProvider`] world lookup backed by a hash
//! map, and scripted simulation jobs in [`fixtures`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use gridlink_core::{
    Color, Direction, DirectionSet, Location, NodeFlag, NodeFlags, NodeId, NodeOwner,
    NodeProvider, Notification, Position, WorldId,
};

pub use fixtures::{CountingJob, ScriptedJob};

// ── RecordingOwner ──────────────────────────────────────────────

#[derive(Clone, Copy)]
struct OwnerState {
    flags: NodeFlags,
    color: Color,
    sides: DirectionSet,
    location: Option<Location>,
    controller: bool,
}

/// Mock [`NodeOwner`] that records what the network tells it.
///
/// Attributes are behind a mutex so tests can change them between
/// topology updates (e.g. repaint a cable, then call `update_state`).
pub struct RecordingOwner {
    state: Mutex<OwnerState>,
    notifications: Mutex<Vec<Notification>>,
    breaches: AtomicUsize,
}

impl RecordingOwner {
    /// An unplaced owner with `flags`, transparent, connectable on all
    /// sides.
    pub fn new(flags: NodeFlags) -> Self {
        Self {
            state: Mutex::new(OwnerState {
                flags,
                color: Color::Transparent,
                sides: DirectionSet::all(),
                location: None,
                controller: false,
            }),
            notifications: Mutex::new(Vec::new()),
            breaches: AtomicUsize::new(0),
        }
    }

    /// A regular cable.
    pub fn cable() -> Self {
        Self::new(NodeFlags::empty())
    }

    /// A dense cable.
    pub fn dense_cable() -> Self {
        Self::new(NodeFlags::of(&[NodeFlag::DenseCapacity]))
    }

    /// A device that needs one channel.
    pub fn device() -> Self {
        Self::new(NodeFlags::of(&[NodeFlag::RequireChannel]))
    }

    /// A dense-capacity controller.
    pub fn controller() -> Self {
        Self::new(NodeFlags::of(&[NodeFlag::DenseCapacity])).as_controller()
    }

    pub fn as_controller(self) -> Self {
        self.lock().controller = true;
        self
    }

    pub fn with_color(self, color: Color) -> Self {
        self.set_color(color);
        self
    }

    pub fn with_sides(self, sides: DirectionSet) -> Self {
        self.lock().sides = sides;
        self
    }

    /// Place the owner at `(x, y, z)` in `world`.
    pub fn at(self, world: u32, x: i32, y: i32, z: i32) -> Self {
        self.lock().location = Some(Location::new(WorldId(world), Position::new(x, y, z)));
        self
    }

    /// Wrap in the `Arc<dyn NodeOwner>` the network expects.
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn set_color(&self, color: Color) {
        self.lock().color = color;
    }

    pub fn set_flags(&self, flags: NodeFlags) {
        self.lock().flags = flags;
    }

    /// Every notification received so far, in order.
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }

    /// How many times `n` was received.
    pub fn count(&self, n: Notification) -> usize {
        self.notifications
            .lock()
            .unwrap()
            .iter()
            .filter(|x| **x == n)
            .count()
    }

    pub fn clear_notifications(&self) {
        self.notifications.lock().unwrap().clear();
    }

    /// Number of `security_break` callbacks received.
    pub fn breaches(&self) -> usize {
        self.breaches.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, OwnerState> {
        self.state.lock().unwrap()
    }
}

impl NodeOwner for RecordingOwner {
    fn flags(&self) -> NodeFlags {
        self.lock().flags
    }

    fn color(&self) -> Color {
        self.lock().color
    }

    fn connectable_sides(&self) -> DirectionSet {
        self.lock().sides
    }

    fn location(&self) -> Option<Location> {
        self.lock().location
    }

    fn is_controller(&self) -> bool {
        self.lock().controller
    }

    fn on_notification(&self, notification: Notification) {
        self.notifications.lock().unwrap().push(notification);
    }

    fn security_break(&self) {
        self.breaches.fetch_add(1, Ordering::SeqCst);
    }
}

// ── MapProvider ─────────────────────────────────────────────────

/// Mock [`NodeProvider`] backed by a `HashMap<(Location, Direction), NodeId>`.
#[derive(Default)]
pub struct MapProvider {
    nodes: HashMap<(Location, Direction), NodeId>,
}

impl MapProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expose `node` on every side of `location`.
    pub fn place(&mut self, location: Location, node: NodeId) {
        for side in Direction::ALL {
            self.nodes.insert((location, side), node);
        }
    }

    /// Expose `node` on one side of `location` only.
    pub fn place_side(&mut self, location: Location, side: Direction, node: NodeId) {
        self.nodes.insert((location, side), node);
    }

    /// Remove whatever sits at `location`.
    pub fn clear(&mut self, location: Location) {
        self.nodes.retain(|(loc, _), _| *loc != location);
    }
}

impl NodeProvider for MapProvider {
    fn node_at(&self, location: Location, side: Direction) -> Option<NodeId> {
        self.nodes.get(&(location, side)).copied()
    }
}
