//! The network: owner of every node, connection and grid, and the
//! entry point for topology changes.
//!
//! Operations that can create or retire grids, or that defer work, take
//! the session's [`TickScheduler`] explicitly.

use std::sync::Arc;

use gridlink_core::{
    ChannelMode, ConnectError, ConnectionId, Direction, DirectionSet, GridError, GridId, Location,
    NodeFlag, NodeId, NodeOwner, NodeProvider, NodeRecord, Notification, WorldId,
    UNSET_SECURITY_KEY,
};
use gridlink_tick::{GridTicker, TickScheduler};

use crate::arena::Slab;
use crate::config::NetworkConfig;
use crate::connection::Connection;
use crate::grid::{Grid, GridService, ServiceFactory};
use crate::metrics::NetworkMetrics;
use crate::node::Node;
use crate::security::{KeyMatchPolicy, SecurityPolicy};
use crate::split::{GridPropagator, SplitDetector};

/// Graph of network-capable devices partitioned into grids.
pub struct Network {
    pub(crate) config: NetworkConfig,
    pub(crate) nodes: Slab<NodeId, Node>,
    pub(crate) connections: Slab<ConnectionId, Connection>,
    pub(crate) grids: Slab<GridId, Grid>,
    pub(crate) visit_counter: u64,
    pub(crate) metrics: NetworkMetrics,
    service_factories: Vec<ServiceFactory>,
    security: Box<dyn SecurityPolicy>,
}

impl Network {
    /// Create an empty network using [`KeyMatchPolicy`].
    pub fn new(config: NetworkConfig) -> Self {
        Self {
            config,
            nodes: Slab::new(),
            connections: Slab::new(),
            grids: Slab::new(),
            visit_counter: 0,
            metrics: NetworkMetrics::default(),
            service_factories: Vec::new(),
            security: Box::new(KeyMatchPolicy),
        }
    }

    /// Replace the link authorization policy.
    pub fn set_security_policy(&mut self, policy: Box<dyn SecurityPolicy>) {
        self.security = policy;
    }

    /// Register a service built for every grid created from now on.
    pub fn register_service<F>(&mut self, factory: F)
    where
        F: Fn() -> Box<dyn GridService> + Send + Sync + 'static,
    {
        self.service_factories.push(Box::new(factory));
    }

    /// Current settings.
    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Cumulative counters.
    pub fn metrics(&self) -> &NetworkMetrics {
        &self.metrics
    }

    /// Change the channel mode; every grid is repathed at its next
    /// update.
    pub fn set_channel_mode(&mut self, mode: ChannelMode) {
        if self.config.channel_mode == mode {
            return;
        }
        self.config.channel_mode = mode;
        let ids: Vec<GridId> = self.grids.keys().collect();
        for id in ids {
            self.mark_repath(id);
        }
    }

    // ── Lookups ─────────────────────────────────────────────────

    /// The node behind `id`.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// The connection behind `id`.
    pub fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.get(id)
    }

    /// The grid behind `id`.
    pub fn grid(&self, id: GridId) -> Option<&Grid> {
        self.grids.get(id)
    }

    /// Mutable access to a grid, e.g. to reach a service.
    pub fn grid_mut(&mut self, id: GridId) -> Option<&mut Grid> {
        self.grids.get_mut(id)
    }

    /// The grid `node` belongs to.
    pub fn grid_of(&self, node: NodeId) -> Option<GridId> {
        self.nodes.get(node)?.grid
    }

    /// All nodes.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter()
    }

    /// All live grids.
    pub fn grids(&self) -> impl Iterator<Item = (GridId, &Grid)> {
        self.grids.iter()
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of connections.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Number of grids.
    pub fn grid_count(&self) -> usize {
        self.grids.len()
    }

    /// Nodes placed in `world`.
    pub fn nodes_in_world(&self, world: WorldId) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|(_, n)| n.location.is_some_and(|l| l.world == world))
            .map(|(id, _)| id)
            .collect()
    }

    /// Whether `a` and `b` share an edge.
    pub fn has_connection(&self, a: NodeId, b: NodeId) -> bool {
        self.nodes.get(a).is_some_and(|n| {
            n.connections
                .iter()
                .filter_map(|c| self.connections.get(*c))
                .any(|c| c.other_side(a) == b)
        })
    }

    /// Sides of `node` that carry a directional edge.
    pub fn connected_sides(&self, node: NodeId) -> DirectionSet {
        let Some(n) = self.nodes.get(node) else {
            return DirectionSet::empty();
        };
        n.connections
            .iter()
            .filter_map(|c| self.connections.get(*c))
            .filter_map(|c| c.direction_from(node))
            .collect()
    }

    // ── Node lifecycle ──────────────────────────────────────────

    /// Add a node for `owner`. It has no grid until its first state
    /// update or connection.
    pub fn create_node(&mut self, owner: Arc<dyn NodeOwner>) -> NodeId {
        let id = self.nodes.insert(Node::new(owner));
        log::trace!("created {id}");
        id
    }

    /// Re-read the owner's flags, color, sides and placement, reconcile
    /// links with the neighbors `provider` reports, and make sure the
    /// node has a grid.
    pub fn update_state(
        &mut self,
        node: NodeId,
        provider: &dyn NodeProvider,
        scheduler: &mut TickScheduler,
    ) -> Result<(), GridError> {
        let n = self.nodes.get_mut(node).ok_or(GridError::UnknownNode { node })?;
        n.refresh();
        if let Some(grid) = n.grid {
            self.mark_repath(grid);
        }
        self.find_connections(node, provider, scheduler)?;
        self.ensure_grid(node, scheduler);
        Ok(())
    }

    /// Remove `node`, tearing down every incident edge first.
    ///
    /// Before each edge goes, the neighbor becomes its grid's pivot so the
    /// split check runs against a node that is certainly still a member.
    pub fn destroy_node(
        &mut self,
        node: NodeId,
        scheduler: &mut TickScheduler,
    ) -> Result<(), GridError> {
        if !self.nodes.contains(node) {
            return Err(GridError::UnknownNode { node });
        }

        loop {
            let Some(n) = self.nodes.get_mut(node) else {
                break;
            };
            let Some(&first) = n.connections.first() else {
                break;
            };
            if n.connections.len() == 1 {
                n.storage = None;
            }

            if let Some(other) = self.connections.get(first).map(|c| c.other_side(node)) {
                if let Some(grid) = self.grid_of(other) {
                    if let Some(g) = self.grids.get_mut(grid) {
                        g.pivot = other;
                    }
                }
            }
            if !self.destroy_connection(first, scheduler) {
                if let Some(n) = self.nodes.get_mut(node) {
                    n.connections.retain(|c| *c != first);
                }
            }
        }

        if let Some(grid) = self.grid_of(node) {
            self.detach_from_grid(node, grid, scheduler);
        }
        self.nodes.remove(node);
        log::trace!("destroyed {node}");
        Ok(())
    }

    // ── Links ───────────────────────────────────────────────────

    /// Link `node` to `other`.
    ///
    /// `direction` is the side of `node` the edge leaves through; `None`
    /// links regardless of sides. Both sides must accept the link and
    /// their colors must match. When the security policy refuses the
    /// link a `security_break` on `node`'s owner is queued against its
    /// world and [`ConnectError::SecurityBreach`] is returned.
    ///
    /// Grids are merged before the edge is recorded: a grid-less side
    /// joins the other's grid, otherwise the smaller grid is relabeled
    /// into the larger.
    pub fn connect(
        &mut self,
        node: NodeId,
        other: NodeId,
        direction: Option<Direction>,
        scheduler: &mut TickScheduler,
    ) -> Result<ConnectionId, ConnectError> {
        let this = self.nodes.get(node).ok_or(ConnectError::UnknownNode { node })?;
        let that = self
            .nodes
            .get(other)
            .ok_or(ConnectError::UnknownNode { node: other })?;
        if node == other {
            return Err(ConnectError::SelfLink { node });
        }
        if self.has_connection(node, other) {
            return Err(ConnectError::AlreadyConnected { a: node, b: other });
        }
        if !this.accepts(direction, that.color())
            || !that.accepts(direction.map(Direction::opposite), this.color())
        {
            return Err(ConnectError::Incompatible { a: node, b: other });
        }
        if !self.security.allows(this.security_key, that.security_key) {
            self.schedule_security_break(node, scheduler);
            return Err(ConnectError::SecurityBreach { a: node, b: other });
        }

        self.merge_grids(node, other, scheduler);

        let id = self.connections.insert(Connection::new(node, other, direction));
        for end in [node, other] {
            if let Some(n) = self.nodes.get_mut(end) {
                n.connections.push(id);
                if direction.is_some() {
                    n.owner.on_notification(Notification::ConnectionsChanged);
                }
            }
        }
        if let Some(grid) = self.grid_of(node) {
            self.mark_repath(grid);
        }
        Ok(id)
    }

    /// Remove `connection` from `node`, which must be an endpoint.
    ///
    /// Both sides are revalidated; a grid that no longer reaches its
    /// pivot splits. If `node` has no connection left its storage handle
    /// is cleared.
    pub fn disconnect(
        &mut self,
        node: NodeId,
        connection: ConnectionId,
        scheduler: &mut TickScheduler,
    ) -> Result<(), GridError> {
        if !self.nodes.contains(node) {
            return Err(GridError::UnknownNode { node });
        }
        let conn = self
            .connections
            .get(connection)
            .ok_or(GridError::UnknownConnection { connection })?;
        if !conn.touches(node) {
            return Err(GridError::NotIncident { node, connection });
        }

        self.destroy_connection(connection, scheduler);
        if let Some(n) = self.nodes.get_mut(node) {
            if n.connections.is_empty() {
                n.storage = None;
            }
        }
        Ok(())
    }

    /// Reconcile `node`'s directional edges with what `provider` reports
    /// around it.
    ///
    /// Per side: an edge to the reported neighbor is kept while the pair
    /// stays compatible; an edge to anyone else is a phantom and is
    /// removed; a missing edge to a compatible neighbor is created.
    /// Neighbors holding a security key are linked in a second pass.
    /// A refused link only skips its side.
    pub fn find_connections(
        &mut self,
        node: NodeId,
        provider: &dyn NodeProvider,
        scheduler: &mut TickScheduler,
    ) -> Result<(), GridError> {
        let n = self.nodes.get(node).ok_or(GridError::UnknownNode { node })?;
        let Some(location) = n.location else {
            return Ok(());
        };

        let mut secured = DirectionSet::empty();
        for dir in Direction::ALL {
            let Some(other) = self.neighbor(node, location, dir, provider) else {
                continue;
            };
            let valid = self.compatible(node, other, dir);

            match self.connection_on_side(node, dir) {
                Some(conn) => {
                    let linked = self.connections.get(conn).map(|c| c.other_side(node));
                    if linked == Some(other) {
                        if !valid {
                            self.destroy_connection(conn, scheduler);
                        }
                    } else {
                        log::debug!("{node}: removing phantom link {conn} on {dir}");
                        self.metrics.phantom_links_removed += 1;
                        self.destroy_connection(conn, scheduler);
                    }
                }
                None if valid => {
                    let remote_secured = self
                        .nodes
                        .get(other)
                        .is_some_and(|o| o.security_key != UNSET_SECURITY_KEY);
                    if remote_secured {
                        secured.insert(dir);
                    } else {
                        self.link_discovered(node, other, dir, scheduler);
                    }
                }
                None => {}
            }
        }

        for dir in secured.iter() {
            if let Some(other) = self.neighbor(node, location, dir, provider) {
                self.link_discovered(node, other, dir, scheduler);
            }
        }
        Ok(())
    }

    fn link_discovered(
        &mut self,
        node: NodeId,
        other: NodeId,
        dir: Direction,
        scheduler: &mut TickScheduler,
    ) {
        if let Err(e) = self.connect(node, other, Some(dir), scheduler) {
            log::debug!("{node}: link on {dir} failed: {e}");
        }
    }

    fn neighbor(
        &self,
        node: NodeId,
        location: Location,
        dir: Direction,
        provider: &dyn NodeProvider,
    ) -> Option<NodeId> {
        let at = Location::new(location.world, location.position.offset(dir));
        provider
            .node_at(at, dir.opposite())
            .filter(|id| *id != node && self.nodes.contains(*id))
    }

    fn compatible(&self, node: NodeId, other: NodeId, dir: Direction) -> bool {
        match (self.nodes.get(node), self.nodes.get(other)) {
            (Some(a), Some(b)) => {
                a.accepts(Some(dir), b.color()) && b.accepts(Some(dir.opposite()), a.color())
            }
            _ => false,
        }
    }

    fn connection_on_side(&self, node: NodeId, dir: Direction) -> Option<ConnectionId> {
        self.nodes.get(node)?.connections.iter().copied().find(|c| {
            self.connections
                .get(*c)
                .is_some_and(|conn| conn.direction_from(node) == Some(dir))
        })
    }

    fn schedule_security_break(&mut self, node: NodeId, scheduler: &mut TickScheduler) {
        let Some(n) = self.nodes.get(node) else {
            return;
        };
        let owner = Arc::clone(&n.owner);
        let world = n.location.map(|l| l.world);
        self.metrics.security_breaches += 1;
        log::debug!("{node}: link refused by security policy, scheduling breach");
        scheduler.add_callable(world, move |_| {
            owner.security_break();
            Ok(())
        });
    }

    /// Remove an edge from both endpoints and revalidate both sides.
    /// Returns `false` if the connection did not exist.
    pub(crate) fn destroy_connection(
        &mut self,
        connection: ConnectionId,
        scheduler: &mut TickScheduler,
    ) -> bool {
        let Some(conn) = self.connections.remove(connection) else {
            return false;
        };
        for end in [conn.a, conn.b] {
            let Some(n) = self.nodes.get_mut(end) else {
                continue;
            };
            n.connections.retain(|c| *c != connection);
            if conn.has_direction() {
                n.owner.on_notification(Notification::ConnectionsChanged);
            }
            if let Some(grid) = n.grid {
                self.mark_repath(grid);
            }
        }
        self.revalidate(conn.a, scheduler);
        self.revalidate(conn.b, scheduler);
        true
    }

    // ── Grid maintenance ────────────────────────────────────────

    /// Check that `node` still reaches its grid's pivot; if not, move
    /// everything `node` reaches into a new grid.
    pub fn validate_grid(
        &mut self,
        node: NodeId,
        scheduler: &mut TickScheduler,
    ) -> Result<(), GridError> {
        if !self.nodes.contains(node) {
            return Err(GridError::UnknownNode { node });
        }
        self.revalidate(node, scheduler);
        Ok(())
    }

    /// The grid of `node`, creating a single-node grid if it has none.
    pub fn internal_grid(
        &mut self,
        node: NodeId,
        scheduler: &mut TickScheduler,
    ) -> Result<GridId, GridError> {
        self.ensure_grid(node, scheduler)
            .ok_or(GridError::UnknownNode { node })
    }

    fn revalidate(&mut self, node: NodeId, scheduler: &mut TickScheduler) {
        let Some(n) = self.nodes.get(node) else {
            return;
        };
        let Some(grid) = n.grid else {
            self.ensure_grid(node, scheduler);
            return;
        };
        let Some(pivot) = self.grids.get(grid).map(|g| g.pivot) else {
            return;
        };

        let mut detector = SplitDetector::new(pivot);
        self.visit_nodes(&[node], &mut detector);
        if detector.pivot_found() {
            return;
        }

        let fresh = self.create_grid(node, scheduler);
        self.metrics.grid_splits += 1;
        log::trace!("{grid} split: {node} no longer reaches {pivot}, moving to {fresh}");
        self.visit_nodes(&[node], &mut GridPropagator::new(fresh, scheduler));
    }

    fn merge_grids(&mut self, a: NodeId, b: NodeId, scheduler: &mut TickScheduler) {
        match (self.grid_of(a), self.grid_of(b)) {
            (_, None) => {
                if let Some(grid) = self.ensure_grid(a, scheduler) {
                    self.set_grid(b, grid, scheduler);
                }
            }
            (None, Some(grid)) => {
                self.visit_nodes(&[a], &mut GridPropagator::new(grid, scheduler));
            }
            (Some(ga), Some(gb)) if ga == gb => {}
            (Some(ga), Some(gb)) => {
                let len = |g: GridId| self.grids.get(g).map_or(0, Grid::len);
                let (target, from) = if len(ga) > len(gb) { (ga, b) } else { (gb, a) };
                self.metrics.grid_merges += 1;
                log::trace!("merging {ga} and {gb} into {target}");
                self.visit_nodes(&[from], &mut GridPropagator::new(target, scheduler));
            }
        }
    }

    fn ensure_grid(&mut self, node: NodeId, scheduler: &mut TickScheduler) -> Option<GridId> {
        let n = self.nodes.get(node)?;
        if let Some(grid) = n.grid {
            return Some(grid);
        }
        let grid = self.create_grid(node, scheduler);
        self.set_grid(node, grid, scheduler);
        Some(grid)
    }

    /// Create an empty grid centered on `center` and register it with
    /// the scheduler.
    pub(crate) fn create_grid(&mut self, center: NodeId, scheduler: &mut TickScheduler) -> GridId {
        let services = self.service_factories.iter().map(|f| f()).collect();
        let id = self.grids.insert(Grid::new(center, services));
        scheduler.add_grid(id);
        self.metrics.grids_created += 1;
        log::trace!("created {id} around {center}");
        id
    }

    /// Move `node` into `grid`, leaving its previous grid.
    ///
    /// The grid adopts the node's storage handle if it has none, and a
    /// node without one inherits the grid's.
    pub(crate) fn set_grid(&mut self, node: NodeId, grid: GridId, scheduler: &mut TickScheduler) {
        let Some(previous) = self.nodes.get(node).map(|n| n.grid) else {
            return;
        };
        if previous == Some(grid) {
            return;
        }
        if let Some(previous) = previous {
            self.detach_from_grid(node, previous, scheduler);
        }

        let Some(n) = self.nodes.get_mut(node) else {
            return;
        };
        let Some(g) = self.grids.get_mut(grid) else {
            n.grid = None;
            return;
        };
        n.grid = Some(grid);
        g.add_member(node, &*n.owner);
        match (g.storage, n.storage) {
            (None, Some(s)) => g.storage = Some(s),
            (Some(s), None) => n.storage = Some(s),
            _ => {}
        }
    }

    fn detach_from_grid(&mut self, node: NodeId, grid: GridId, scheduler: &mut TickScheduler) {
        if let Some(n) = self.nodes.get_mut(node) {
            if n.grid == Some(grid) {
                n.grid = None;
            }
        }
        let Some(g) = self.grids.get_mut(grid) else {
            return;
        };
        g.remove_member(node);
        if g.is_empty() {
            self.grids.remove(grid);
            scheduler.remove_grid(grid);
            self.metrics.grids_retired += 1;
            log::trace!("retired {grid}");
        }
    }

    pub(crate) fn mark_repath(&mut self, grid: GridId) {
        if let Some(g) = self.grids.get_mut(grid) {
            g.needs_repath = true;
        }
    }

    // ── Persistence and ownership ───────────────────────────────

    /// Apply persisted fields to a node that has not joined a grid yet.
    pub fn load_record(&mut self, node: NodeId, record: NodeRecord) -> Result<(), GridError> {
        let n = self.nodes.get_mut(node).ok_or(GridError::UnknownNode { node })?;
        if let Some(grid) = n.grid {
            return Err(GridError::AlreadyInGrid { node, grid });
        }
        n.player_id = record.player_id;
        n.security_key = record.security_key;
        n.storage = Some(record.storage);
        Ok(())
    }

    /// Persisted fields of `node`, or `None` when it holds no storage
    /// handle (nothing to save).
    pub fn save_record(&self, node: NodeId) -> Option<NodeRecord> {
        let n = self.nodes.get(node)?;
        n.storage.map(|storage| NodeRecord {
            player_id: n.player_id,
            security_key: n.security_key,
            storage,
        })
    }

    /// Set the owning player. Negative ids are ignored; the owner is
    /// notified only when the id actually changes.
    pub fn set_player_id(&mut self, node: NodeId, player_id: i32) -> Result<(), GridError> {
        let n = self.nodes.get_mut(node).ok_or(GridError::UnknownNode { node })?;
        if player_id >= 0 && n.player_id != player_id {
            n.player_id = player_id;
            n.owner.on_notification(Notification::OwnerChanged);
        }
        Ok(())
    }

    /// Record the last security key seen by `node`.
    pub fn set_security_key(&mut self, node: NodeId, key: i64) -> Result<(), GridError> {
        let n = self.nodes.get_mut(node).ok_or(GridError::UnknownNode { node })?;
        n.security_key = key;
        Ok(())
    }

    /// Whether `node` either needs no channel or was granted one in the
    /// last finalized assignment.
    pub fn meets_channel_requirements(&self, node: NodeId) -> bool {
        self.nodes.get(node).is_some_and(|n| {
            !n.flags.contains(NodeFlag::RequireChannel) || n.last_used_channels > 0
        })
    }
}

impl GridTicker for Network {
    /// Repath the grid if its topology changed, then run its services.
    fn update_grid(&mut self, grid: GridId) {
        let Some(needs_repath) = self.grids.get(grid).map(|g| g.needs_repath) else {
            return;
        };
        if needs_repath {
            self.allocate_channels(grid);
            if let Some(g) = self.grids.get_mut(grid) {
                g.needs_repath = false;
            }
        }
        if let Some(g) = self.grids.get_mut(grid) {
            g.update_services(grid);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridlink_core::{Color, Position, StorageId};
    use gridlink_test_utils::{MapProvider, RecordingOwner};

    use crate::testing::scheduler;

    fn net() -> Network {
        Network::new(NetworkConfig::default())
    }

    fn cable(net: &mut Network) -> NodeId {
        net.create_node(RecordingOwner::cable().shared())
    }

    fn loc(x: i32) -> Location {
        Location::new(WorldId(0), Position::new(x, 0, 0))
    }

    #[test]
    fn connect_rejects_self_duplicate_and_unknown() {
        let mut net = net();
        let mut sched = scheduler();
        let a = cable(&mut net);
        let b = cable(&mut net);

        assert_eq!(
            net.connect(a, a, None, &mut sched),
            Err(ConnectError::SelfLink { node: a })
        );
        net.connect(a, b, None, &mut sched).unwrap();
        assert_eq!(
            net.connect(b, a, None, &mut sched),
            Err(ConnectError::AlreadyConnected { a: b, b: a })
        );

        let gone = cable(&mut net);
        net.destroy_node(gone, &mut sched).unwrap();
        assert_eq!(
            net.connect(a, gone, None, &mut sched),
            Err(ConnectError::UnknownNode { node: gone })
        );
    }

    #[test]
    fn connect_checks_colors_and_sides() {
        let mut net = net();
        let mut sched = scheduler();
        let red = net.create_node(RecordingOwner::cable().with_color(Color::Red).shared());
        let blue = net.create_node(RecordingOwner::cable().with_color(Color::Blue).shared());
        let clear = cable(&mut net);
        let up_only = net.create_node(
            RecordingOwner::cable()
                .with_sides([Direction::Up].into_iter().collect())
                .shared(),
        );

        assert!(matches!(
            net.connect(red, blue, None, &mut sched),
            Err(ConnectError::Incompatible { .. })
        ));
        assert!(net.connect(red, clear, None, &mut sched).is_ok());
        assert!(matches!(
            net.connect(clear, up_only, Some(Direction::East), &mut sched),
            Err(ConnectError::Incompatible { .. })
        ));
        assert!(net.connect(clear, up_only, Some(Direction::Down), &mut sched).is_ok());
    }

    #[test]
    fn directional_edges_notify_both_owners() {
        let mut net = net();
        let mut sched = scheduler();
        let oa = RecordingOwner::cable().shared();
        let ob = RecordingOwner::cable().shared();
        let a = net.create_node(oa.clone());
        let b = net.create_node(ob.clone());
        let c = net.create_node(RecordingOwner::cable().shared());

        let e = net.connect(a, b, Some(Direction::East), &mut sched).unwrap();
        assert_eq!(oa.count(Notification::ConnectionsChanged), 1);
        assert_eq!(ob.count(Notification::ConnectionsChanged), 1);

        net.connect(a, c, None, &mut sched).unwrap();
        assert_eq!(oa.count(Notification::ConnectionsChanged), 1);

        net.disconnect(a, e, &mut sched).unwrap();
        assert_eq!(oa.count(Notification::ConnectionsChanged), 2);
        assert_eq!(ob.count(Notification::ConnectionsChanged), 2);
    }

    #[test]
    fn connect_merges_into_larger_grid() {
        let mut net = net();
        let mut sched = scheduler();
        let big: Vec<_> = (0..3).map(|_| cable(&mut net)).collect();
        net.connect(big[0], big[1], None, &mut sched).unwrap();
        net.connect(big[1], big[2], None, &mut sched).unwrap();
        let small = [cable(&mut net), cable(&mut net)];
        net.connect(small[0], small[1], None, &mut sched).unwrap();

        let big_grid = net.grid_of(big[0]).unwrap();
        let small_grid = net.grid_of(small[0]).unwrap();
        assert_ne!(big_grid, small_grid);

        net.connect(small[1], big[2], None, &mut sched).unwrap();
        assert!(net.grid(small_grid).is_none());
        for n in big.iter().chain(small.iter()) {
            assert_eq!(net.grid_of(*n), Some(big_grid));
        }
        assert_eq!(net.grid(big_grid).map(Grid::len), Some(5));
        assert_eq!(net.metrics().grid_merges, 1);
    }

    #[test]
    fn removing_cycle_edge_keeps_grid() {
        let mut net = net();
        let mut sched = scheduler();
        let n: Vec<_> = (0..3).map(|_| cable(&mut net)).collect();
        net.connect(n[0], n[1], None, &mut sched).unwrap();
        net.connect(n[1], n[2], None, &mut sched).unwrap();
        let closing = net.connect(n[2], n[0], None, &mut sched).unwrap();
        let grid = net.grid_of(n[0]).unwrap();

        net.disconnect(n[2], closing, &mut sched).unwrap();
        assert_eq!(net.grid_count(), 1);
        assert!(n.iter().all(|x| net.grid_of(*x) == Some(grid)));
        assert_eq!(net.metrics().grid_splits, 0);
    }

    #[test]
    fn removing_bridge_splits_grid() {
        let mut net = net();
        let mut sched = scheduler();
        let n: Vec<_> = (0..4).map(|_| cable(&mut net)).collect();
        net.connect(n[0], n[1], None, &mut sched).unwrap();
        let bridge = net.connect(n[1], n[2], None, &mut sched).unwrap();
        net.connect(n[2], n[3], None, &mut sched).unwrap();

        net.disconnect(n[1], bridge, &mut sched).unwrap();
        assert_eq!(net.grid_count(), 2);
        assert_eq!(net.grid_of(n[0]), net.grid_of(n[1]));
        assert_eq!(net.grid_of(n[2]), net.grid_of(n[3]));
        assert_ne!(net.grid_of(n[0]), net.grid_of(n[2]));
        assert_eq!(net.metrics().grid_splits, 1);
        for (_, grid) in net.grids() {
            assert!(grid.contains(grid.pivot()));
        }
    }

    #[test]
    fn disconnect_validates_arguments() {
        let mut net = net();
        let mut sched = scheduler();
        let a = cable(&mut net);
        let b = cable(&mut net);
        let c = cable(&mut net);
        let e = net.connect(a, b, None, &mut sched).unwrap();

        assert_eq!(
            net.disconnect(c, e, &mut sched),
            Err(GridError::NotIncident { node: c, connection: e })
        );
        net.disconnect(a, e, &mut sched).unwrap();
        assert_eq!(
            net.disconnect(a, e, &mut sched),
            Err(GridError::UnknownConnection { connection: e })
        );
    }

    #[test]
    fn destroy_middle_node_leaves_two_grids() {
        let mut net = net();
        let mut sched = scheduler();
        let n: Vec<_> = (0..3).map(|_| cable(&mut net)).collect();
        net.connect(n[0], n[1], None, &mut sched).unwrap();
        net.connect(n[1], n[2], None, &mut sched).unwrap();

        net.destroy_node(n[1], &mut sched).unwrap();
        assert!(net.node(n[1]).is_none());
        assert_eq!(net.connection_count(), 0);
        assert_eq!(net.grid_count(), 2);
        assert_ne!(net.grid_of(n[0]), net.grid_of(n[2]));
        for (_, grid) in net.grids() {
            assert_eq!(grid.len(), 1);
            assert!(grid.contains(grid.pivot()));
        }
        assert_eq!(
            net.destroy_node(n[1], &mut sched),
            Err(GridError::UnknownNode { node: n[1] })
        );
    }

    #[test]
    fn grid_registration_flows_through_scheduler() {
        let mut net = net();
        let mut sched = scheduler();
        let a = cable(&mut net);
        let b = cable(&mut net);
        net.internal_grid(a, &mut sched).unwrap();
        net.internal_grid(b, &mut sched).unwrap();
        sched.server_tick_end(&mut net);
        assert_eq!(sched.grids().live_len(), 2);

        net.connect(a, b, None, &mut sched).unwrap();
        sched.server_tick_end(&mut net);
        assert_eq!(sched.grids().live_len(), 1);
        assert_eq!(net.metrics().grids_retired, 1);
    }

    #[test]
    fn find_connections_links_neighbors() {
        let mut net = net();
        let mut sched = scheduler();
        let mut world = MapProvider::new();
        let a = net.create_node(RecordingOwner::cable().at(0, 0, 0, 0).shared());
        let b = net.create_node(RecordingOwner::cable().at(0, 1, 0, 0).shared());
        world.place(loc(0), a);
        world.place(loc(1), b);

        net.update_state(a, &world, &mut sched).unwrap();
        assert!(net.has_connection(a, b));
        assert_eq!(net.connected_sides(a), [Direction::East].into_iter().collect());
        assert_eq!(net.connected_sides(b), [Direction::West].into_iter().collect());

        // Running it again keeps the single edge.
        net.update_state(b, &world, &mut sched).unwrap();
        assert_eq!(net.connection_count(), 1);
    }

    #[test]
    fn find_connections_drops_edge_that_became_incompatible() {
        let mut net = net();
        let mut sched = scheduler();
        let mut world = MapProvider::new();
        let owner = RecordingOwner::cable().with_color(Color::Red).at(0, 0, 0, 0).shared();
        let a = net.create_node(owner.clone());
        let b = net.create_node(RecordingOwner::cable().with_color(Color::Red).at(0, 1, 0, 0).shared());
        world.place(loc(0), a);
        world.place(loc(1), b);
        net.update_state(a, &world, &mut sched).unwrap();
        assert_eq!(net.connection_count(), 1);

        owner.set_color(Color::Blue);
        net.update_state(a, &world, &mut sched).unwrap();
        assert_eq!(net.connection_count(), 0);
        assert_ne!(net.grid_of(a), net.grid_of(b));
    }

    #[test]
    fn phantom_link_is_removed() {
        let mut net = net();
        let mut sched = scheduler();
        let mut world = MapProvider::new();
        let a = net.create_node(RecordingOwner::cable().at(0, 0, 0, 0).shared());
        let b = net.create_node(RecordingOwner::cable().at(0, 1, 0, 0).shared());
        world.place(loc(0), a);
        world.place(loc(1), b);
        net.update_state(a, &world, &mut sched).unwrap();

        // Something else now occupies the east side.
        let c = net.create_node(RecordingOwner::cable().at(0, 1, 0, 0).shared());
        world.place(loc(1), c);
        net.update_state(a, &world, &mut sched).unwrap();

        assert!(!net.has_connection(a, b));
        assert_eq!(net.metrics().phantom_links_removed, 1);

        // The new neighbor is picked up on the next pass.
        net.update_state(a, &world, &mut sched).unwrap();
        assert!(net.has_connection(a, c));
    }

    #[test]
    fn secured_neighbor_breach_is_deferred_and_other_sides_still_link() {
        let mut net = net();
        let mut sched = scheduler();
        sched.load_world(WorldId(0));
        let mut world = MapProvider::new();
        let owner = RecordingOwner::cable().at(0, 0, 0, 0).shared();
        let a = net.create_node(owner.clone());
        let secured = net.create_node(RecordingOwner::cable().at(0, -1, 0, 0).shared());
        let open = net.create_node(RecordingOwner::cable().at(0, 1, 0, 0).shared());
        net.set_security_key(secured, 99).unwrap();
        world.place(loc(0), a);
        world.place(loc(-1), secured);
        world.place(loc(1), open);

        net.update_state(a, &world, &mut sched).unwrap();
        assert!(net.has_connection(a, open));
        assert!(!net.has_connection(a, secured));
        assert_eq!(net.metrics().security_breaches, 1);
        assert_eq!(owner.breaches(), 0);

        let report = sched.world_tick_start(WorldId(0));
        assert_eq!(report.executed, 1);
        assert_eq!(owner.breaches(), 1);
    }

    #[test]
    fn matching_keys_link_in_second_pass() {
        let mut net = net();
        let mut sched = scheduler();
        let mut world = MapProvider::new();
        let a = net.create_node(RecordingOwner::cable().at(0, 0, 0, 0).shared());
        let b = net.create_node(RecordingOwner::cable().at(0, 1, 0, 0).shared());
        net.set_security_key(a, 5).unwrap();
        net.set_security_key(b, 5).unwrap();
        world.place(loc(0), a);
        world.place(loc(1), b);

        net.update_state(a, &world, &mut sched).unwrap();
        assert!(net.has_connection(a, b));
        assert_eq!(net.metrics().security_breaches, 0);
    }

    #[test]
    fn unplaced_node_skips_discovery_but_gets_grid() {
        let mut net = net();
        let mut sched = scheduler();
        let a = cable(&mut net);
        net.update_state(a, &MapProvider::new(), &mut sched).unwrap();
        assert!(net.grid_of(a).is_some());
        assert_eq!(net.connection_count(), 0);
    }

    #[test]
    fn record_round_trip_and_ordering_rules() {
        let mut net = net();
        let mut sched = scheduler();
        let a = cable(&mut net);
        assert_eq!(net.save_record(a), None);

        let record = NodeRecord {
            player_id: 3,
            security_key: 77,
            storage: StorageId(12),
        };
        net.load_record(a, record).unwrap();
        assert_eq!(net.save_record(a), Some(record));

        let grid = net.internal_grid(a, &mut sched).unwrap();
        assert_eq!(net.grid(grid).and_then(Grid::storage), Some(StorageId(12)));
        assert_eq!(
            net.load_record(a, record),
            Err(GridError::AlreadyInGrid { node: a, grid })
        );
    }

    #[test]
    fn node_joining_grid_inherits_storage() {
        let mut net = net();
        let mut sched = scheduler();
        let a = cable(&mut net);
        let b = cable(&mut net);
        net.load_record(
            a,
            NodeRecord {
                player_id: 1,
                security_key: -1,
                storage: StorageId(4),
            },
        )
        .unwrap();
        net.internal_grid(a, &mut sched).unwrap();
        net.connect(a, b, None, &mut sched).unwrap();
        assert_eq!(net.node(b).and_then(Node::storage), Some(StorageId(4)));
    }

    #[test]
    fn last_connection_clears_storage() {
        let mut net = net();
        let mut sched = scheduler();
        let a = cable(&mut net);
        let b = cable(&mut net);
        net.load_record(
            a,
            NodeRecord {
                player_id: 1,
                security_key: -1,
                storage: StorageId(4),
            },
        )
        .unwrap();
        let e = net.connect(a, b, None, &mut sched).unwrap();
        net.disconnect(a, e, &mut sched).unwrap();
        assert_eq!(net.save_record(a), None);
    }

    #[test]
    fn player_id_changes_notify_once() {
        let mut net = net();
        let owner = RecordingOwner::cable().shared();
        let a = net.create_node(owner.clone());

        net.set_player_id(a, -5).unwrap();
        assert_eq!(net.node(a).map(Node::player_id), Some(-1));
        net.set_player_id(a, 2).unwrap();
        net.set_player_id(a, 2).unwrap();
        assert_eq!(owner.count(Notification::OwnerChanged), 1);
        assert_eq!(net.node(a).map(Node::player_id), Some(2));
    }

    #[test]
    fn nodes_in_world_filters_by_location() {
        let mut net = net();
        let a = net.create_node(RecordingOwner::cable().at(1, 0, 0, 0).shared());
        let _b = net.create_node(RecordingOwner::cable().at(2, 0, 0, 0).shared());
        let _c = cable(&mut net);
        assert_eq!(net.nodes_in_world(WorldId(1)), vec![a]);
    }
}
