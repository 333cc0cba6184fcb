//! Reference channel allocator.
//!
//! Builds a breadth-first routing tree rooted at every controller of a
//! grid, grants one channel per channel-requiring device in visit order
//! while capacity remains along its path, then sums usage bottom-up and
//! commits it. Grids without a controller run ad hoc: every member
//! carries the grid's device count when it fits in one regular cable,
//! and nothing otherwise.

use indexmap::IndexSet;

use gridlink_core::{max_channels, ConnectionId, GridId, NodeFlag, NodeId};

use crate::network::Network;
use crate::traversal::{ConnectionVisitor, NodeVisitor};

/// Outcome of one allocation pass over a grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AllocationReport {
    /// Controllers found in the grid.
    pub controllers: usize,
    /// Members needing a channel.
    pub requested: usize,
    /// Members that received one.
    pub granted: usize,
    /// Whether the grid ran without a controller.
    pub ad_hoc: bool,
}

/// Assigns routes while the connection-aware walk spreads out from the
/// controllers.
struct RouteBuilder {
    routed: IndexSet<NodeId>,
    order: Vec<NodeId>,
}

fn carries(network: &Network, node: NodeId) -> bool {
    network
        .node(node)
        .is_some_and(|n| n.is_controller() || !n.has_flag(NodeFlag::CannotCarry))
}

impl NodeVisitor for RouteBuilder {
    fn visit_node(&mut self, network: &mut Network, node: NodeId) -> bool {
        self.order.push(node);
        carries(network, node)
    }
}

impl ConnectionVisitor for RouteBuilder {
    fn visit_connection(&mut self, network: &mut Network, connection: ConnectionId) {
        let Some(conn) = network.connection(connection) else {
            return;
        };
        let (a, b) = (conn.a(), conn.b());
        let (parent, child) = match (self.routed.contains(&a), self.routed.contains(&b)) {
            (true, false) => (a, b),
            (false, true) => (b, a),
            _ => return,
        };
        if !carries(network, parent) {
            return;
        }
        if network.set_controller_route(child, connection).is_ok() {
            self.routed.insert(child);
        }
    }
}

impl Network {
    /// Recompute channel usage for every member of `grid` and commit it.
    pub fn allocate_channels(&mut self, grid: GridId) -> AllocationReport {
        let Some(members) = self
            .grids
            .get(grid)
            .map(|g| g.members().collect::<Vec<_>>())
        else {
            return AllocationReport::default();
        };
        self.metrics.repaths += 1;

        let mode = self.config.channel_mode;
        let mut controllers = Vec::new();
        let mut requested = 0;
        for &member in &members {
            let Some(n) = self.nodes.get_mut(member) else {
                continue;
            };
            n.used_channels = 0;
            n.highest_similar_ancestor = None;
            if n.controller {
                n.subtree_max_channels = max_channels(n.flags, mode);
                n.subtree_allows_compressed = !n.flags.contains(NodeFlag::CannotCarryCompressed);
                controllers.push(member);
            } else {
                n.subtree_max_channels = 0;
                n.subtree_allows_compressed = false;
                if n.flags.contains(NodeFlag::RequireChannel) {
                    requested += 1;
                }
            }
            for c in n.connections.clone() {
                if let Some(conn) = self.connections.get_mut(c) {
                    conn.controller_route = None;
                    conn.used_channels = 0;
                }
            }
        }

        let mut report = AllocationReport {
            controllers: controllers.len(),
            requested,
            granted: 0,
            ad_hoc: controllers.is_empty(),
        };

        if controllers.is_empty() {
            let channels = u32::try_from(requested)
                .ok()
                .filter(|n| *n <= mode.ad_hoc_capacity())
                .unwrap_or(0);
            for &member in &members {
                let Some(n) = self.nodes.get_mut(member) else {
                    continue;
                };
                n.used_channels = channels;
                for c in n.connections.clone() {
                    if let Some(conn) = self.connections.get_mut(c) {
                        conn.used_channels = channels;
                    }
                }
            }
            if channels > 0 {
                report.granted = requested;
            }
        } else {
            let mut builder = RouteBuilder {
                routed: controllers.iter().copied().collect(),
                order: Vec::with_capacity(members.len()),
            };
            self.visit_connections(&controllers, &mut builder);

            let mut granted = IndexSet::new();
            for &node in &builder.order {
                let wants = self
                    .nodes
                    .get(node)
                    .is_some_and(|n| !n.controller && n.flags.contains(NodeFlag::RequireChannel));
                if wants && builder.routed.contains(&node) && self.try_grant(node) {
                    granted.insert(node);
                }
            }
            for &node in builder.order.iter().rev() {
                let _ = self.propagate_channels_upwards(node, granted.contains(&node));
            }
            report.granted = granted.len();
        }

        for &member in &members {
            let _ = self.finalize_channels(member);
        }
        log::trace!(
            "repathed {grid}: {} of {} channels granted",
            report.granted,
            report.requested
        );
        report
    }

    /// Reserve one channel for `start` if every capacity bucket on its
    /// path to the controller has room. The controller itself is uncapped.
    fn try_grant(&mut self, start: NodeId) -> bool {
        let mode = self.config.channel_mode;
        let Some(n) = self.nodes.get(start) else {
            return false;
        };
        if n.flags.contains(NodeFlag::CompressedChannel) && !n.subtree_allows_compressed {
            return false;
        }

        let mut cursor = Some(start);
        while let Some(id) = cursor {
            let Some(n) = self.nodes.get(id) else {
                break;
            };
            if n.used_channels >= max_channels(n.flags, mode) {
                return false;
            }
            cursor = n.highest_similar_ancestor;
        }

        let mut cursor = Some(start);
        while let Some(id) = cursor {
            let Some(n) = self.nodes.get_mut(id) else {
                break;
            };
            if n.controller {
                break;
            }
            n.used_channels = n.used_channels.saturating_add(1);
            cursor = self.route_parent(id);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridlink_core::{ChannelMode, NodeFlags, Notification};
    use gridlink_test_utils::RecordingOwner;
    use gridlink_tick::TickScheduler;

    use crate::config::NetworkConfig;
    use crate::testing::scheduler;

    fn net() -> (Network, TickScheduler) {
        (Network::new(NetworkConfig::default()), scheduler())
    }

    fn star(net: &mut Network, sched: &mut TickScheduler, hub: NodeId, leaves: usize) -> Vec<NodeId> {
        (0..leaves)
            .map(|_| {
                let d = net.create_node(RecordingOwner::device().shared());
                net.connect(hub, d, None, sched).unwrap();
                d
            })
            .collect()
    }

    #[test]
    fn regular_cable_caps_devices_at_eight() {
        let (mut net, mut sched) = net();
        let controller = net.create_node(RecordingOwner::controller().shared());
        let cable = net.create_node(RecordingOwner::cable().shared());
        net.connect(controller, cable, None, &mut sched).unwrap();
        let devices = star(&mut net, &mut sched, cable, 9);
        let grid = net.grid_of(controller).unwrap();

        let report = net.allocate_channels(grid);
        assert_eq!(report.requested, 9);
        assert_eq!(report.granted, 8);
        assert!(!report.ad_hoc);

        let served = devices.iter().filter(|d| net.meets_channel_requirements(**d)).count();
        assert_eq!(served, 8);
        assert_eq!(net.node(cable).map(|n| n.last_used_channels()), Some(8));
        assert_eq!(net.node(controller).map(|n| n.last_used_channels()), Some(8));
    }

    #[test]
    fn controller_serves_beyond_its_own_capacity() {
        let (mut net, mut sched) = net();
        let controller = net.create_node(RecordingOwner::controller().shared());
        for _ in 0..2 {
            let dense = net.create_node(RecordingOwner::dense_cable().shared());
            net.connect(controller, dense, None, &mut sched).unwrap();
            for _ in 0..4 {
                let cable = net.create_node(RecordingOwner::cable().shared());
                net.connect(dense, cable, None, &mut sched).unwrap();
                star(&mut net, &mut sched, cable, 8);
            }
        }
        let grid = net.grid_of(controller).unwrap();

        let report = net.allocate_channels(grid);
        assert_eq!(report.requested, 64);
        assert_eq!(report.granted, 64);
        assert_eq!(net.metrics().channel_overflow_events, 0);
        assert_eq!(net.node(controller).map(|n| n.last_used_channels()), Some(64));
        assert_eq!(net.max_channels(controller), Ok(32));
    }

    #[test]
    fn ad_hoc_grid_shares_device_count() {
        let (mut net, mut sched) = net();
        let cable = net.create_node(RecordingOwner::cable().shared());
        let devices = star(&mut net, &mut sched, cable, 3);
        let grid = net.grid_of(cable).unwrap();

        let report = net.allocate_channels(grid);
        assert!(report.ad_hoc);
        assert_eq!(report.granted, 3);
        assert_eq!(net.node(cable).map(|n| n.last_used_channels()), Some(3));
        assert!(devices.iter().all(|d| net.meets_channel_requirements(*d)));
    }

    #[test]
    fn ad_hoc_grid_over_limit_gets_nothing() {
        let (mut net, mut sched) = net();
        let cable = net.create_node(RecordingOwner::cable().shared());
        let devices = star(&mut net, &mut sched, cable, 9);
        let grid = net.grid_of(cable).unwrap();

        let report = net.allocate_channels(grid);
        assert_eq!(report.granted, 0);
        assert!(devices.iter().all(|d| !net.meets_channel_requirements(*d)));

        net.set_channel_mode(ChannelMode::X2);
        assert_eq!(net.allocate_channels(grid).granted, 9);
    }

    #[test]
    fn compressed_device_needs_compressible_path() {
        let (mut net, mut sched) = net();
        let controller = net.create_node(RecordingOwner::controller().shared());
        let plain = net.create_node(
            RecordingOwner::new(NodeFlags::of(&[NodeFlag::CannotCarryCompressed])).shared(),
        );
        net.connect(controller, plain, None, &mut sched).unwrap();
        let compressed = net.create_node(
            RecordingOwner::new(NodeFlags::of(&[
                NodeFlag::RequireChannel,
                NodeFlag::CompressedChannel,
            ]))
            .shared(),
        );
        net.connect(plain, compressed, None, &mut sched).unwrap();
        let normal = star(&mut net, &mut sched, plain, 1)[0];

        let report = net.allocate_channels(net.grid_of(controller).unwrap());
        assert_eq!(report.granted, 1);
        assert!(!net.meets_channel_requirements(compressed));
        assert!(net.meets_channel_requirements(normal));
    }

    #[test]
    fn cannot_carry_node_is_not_a_path() {
        let (mut net, mut sched) = net();
        let controller = net.create_node(RecordingOwner::controller().shared());
        let blocker = net.create_node(
            RecordingOwner::new(NodeFlags::of(&[NodeFlag::CannotCarry])).shared(),
        );
        net.connect(controller, blocker, None, &mut sched).unwrap();
        let device = star(&mut net, &mut sched, blocker, 1)[0];

        let report = net.allocate_channels(net.grid_of(controller).unwrap());
        assert_eq!(report.granted, 0);
        assert!(!net.meets_channel_requirements(device));
    }

    #[test]
    fn repeated_allocation_does_not_renotify() {
        let (mut net, mut sched) = net();
        let controller = net.create_node(RecordingOwner::controller().shared());
        let owner = RecordingOwner::device().shared();
        let device = net.create_node(owner.clone());
        net.connect(controller, device, None, &mut sched).unwrap();
        let grid = net.grid_of(controller).unwrap();

        net.allocate_channels(grid);
        net.allocate_channels(grid);
        assert_eq!(owner.count(Notification::ChannelsChanged), 1);
        assert_eq!(net.metrics().repaths, 2);
    }

    #[test]
    fn unknown_grid_reports_nothing() {
        let (mut net, _) = net();
        let report = net.allocate_channels(GridId::from_parts(7, 0));
        assert_eq!(report, AllocationReport::default());
        assert_eq!(net.metrics().repaths, 0);
    }
}
