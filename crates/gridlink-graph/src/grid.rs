//! Connected components and their per-grid services.

use std::any::{Any, TypeId};

use indexmap::{IndexMap, IndexSet};

use gridlink_core::{GridId, NodeId, NodeOwner, StorageId};

// ── GridService ─────────────────────────────────────────────────

/// Auxiliary per-grid state (energy, storage, crafting...) kept in sync
/// with the grid's membership.
///
/// One instance per grid is built from every factory registered with
/// [`Network::register_service`](crate::Network::register_service).
pub trait GridService: Any + Send {
    /// `node` joined the grid.
    fn added_node(&mut self, _node: NodeId, _owner: &dyn NodeOwner) {}

    /// `node` left the grid.
    fn removed_node(&mut self, _node: NodeId) {}

    /// Called once per server tick while the grid is live, after channel
    /// assignment.
    fn on_update(&mut self, _grid: GridId) {}
}

impl dyn GridService {
    /// Downcast to a concrete service type.
    pub fn downcast_ref<T: GridService>(&self) -> Option<&T> {
        (self as &dyn Any).downcast_ref::<T>()
    }

    /// Mutable downcast to a concrete service type.
    pub fn downcast_mut<T: GridService>(&mut self) -> Option<&mut T> {
        (self as &mut dyn Any).downcast_mut::<T>()
    }
}

/// Builds a fresh service instance for a new grid.
pub type ServiceFactory = Box<dyn Fn() -> Box<dyn GridService> + Send + Sync>;

// ── Grid ────────────────────────────────────────────────────────

/// A maximal connected set of nodes.
pub struct Grid {
    pub(crate) members: IndexSet<NodeId>,
    pub(crate) pivot: NodeId,
    pub(crate) services: IndexMap<TypeId, Box<dyn GridService>>,
    pub(crate) needs_repath: bool,
    pub(crate) storage: Option<StorageId>,
}

impl Grid {
    pub(crate) fn new(center: NodeId, services: Vec<Box<dyn GridService>>) -> Self {
        let services = services
            .into_iter()
            .map(|s| ((&*s as &dyn Any).type_id(), s))
            .collect();
        Self {
            members: IndexSet::new(),
            pivot: center,
            services,
            needs_repath: true,
            storage: None,
        }
    }

    pub(crate) fn add_member(&mut self, node: NodeId, owner: &dyn NodeOwner) {
        if self.members.insert(node) {
            for service in self.services.values_mut() {
                service.added_node(node, owner);
            }
            self.needs_repath = true;
        }
    }

    /// Remove `node`; the first remaining member becomes pivot if the
    /// pivot left.
    pub(crate) fn remove_member(&mut self, node: NodeId) {
        if !self.members.shift_remove(&node) {
            return;
        }
        for service in self.services.values_mut() {
            service.removed_node(node);
        }
        if self.pivot == node {
            if let Some(&first) = self.members.first() {
                self.pivot = first;
            }
        }
        self.needs_repath = true;
    }

    /// Member nodes in join order.
    pub fn members(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.members.iter().copied()
    }

    /// Whether `node` is a member.
    pub fn contains(&self, node: NodeId) -> bool {
        self.members.contains(&node)
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the grid has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Reachability witness for split detection.
    pub fn pivot(&self) -> NodeId {
        self.pivot
    }

    /// Whether channels must be reassigned at the next update.
    pub fn needs_repath(&self) -> bool {
        self.needs_repath
    }

    /// Storage record shared by the grid's nodes.
    pub fn storage(&self) -> Option<StorageId> {
        self.storage
    }

    /// The service of type `T`, if one was registered.
    pub fn service<T: GridService>(&self) -> Option<&T> {
        self.services.get(&TypeId::of::<T>())?.downcast_ref::<T>()
    }

    /// Mutable access to the service of type `T`.
    pub fn service_mut<T: GridService>(&mut self) -> Option<&mut T> {
        self.services.get_mut(&TypeId::of::<T>())?.downcast_mut::<T>()
    }

    pub(crate) fn update_services(&mut self, id: GridId) {
        for service in self.services.values_mut() {
            service.on_update(id);
        }
    }
}
