//! Per-node channel primitives used by route assignment.
//!
//! A routed node's route edge sits at index 0 of its connection list and
//! names the node's parent as its `controller_route`. Children of a node
//! are therefore found through the incident edges whose route points at
//! the node itself.

use gridlink_core::{max_channels, ConnectionId, GridError, NodeFlag, NodeId, Notification};

use crate::network::Network;

impl Network {
    /// Channel capacity of `node` under the current channel mode.
    pub fn max_channels(&self, node: NodeId) -> Result<u32, GridError> {
        let n = self.nodes.get(node).ok_or(GridError::UnknownNode { node })?;
        Ok(max_channels(n.flags, self.config.channel_mode))
    }

    /// The edge at the head of `node`'s connection list, which is its
    /// route toward the controller once one was assigned.
    pub fn controller_route(&self, node: NodeId) -> Result<ConnectionId, GridError> {
        let n = self.nodes.get(node).ok_or(GridError::UnknownNode { node })?;
        n.connections
            .first()
            .copied()
            .ok_or(GridError::NoConnections { node })
    }

    /// The parent of `node` in the current routing tree, if it is routed.
    pub fn route_parent(&self, node: NodeId) -> Option<NodeId> {
        let head = *self.nodes.get(node)?.connections.first()?;
        self.connections
            .get(head)?
            .controller_route
            .filter(|parent| *parent != node)
    }

    /// Make `connection` the route from `node` toward the controller.
    ///
    /// Derives the node's subtree capacity, highest similar ancestor and
    /// compressed-channel eligibility from the parent on the other end,
    /// moves the edge to the head of the connection list and zeroes the
    /// working counters of the node and the edge.
    pub fn set_controller_route(
        &mut self,
        node: NodeId,
        connection: ConnectionId,
    ) -> Result<(), GridError> {
        let mode = self.config.channel_mode;
        let n = self.nodes.get(node).ok_or(GridError::UnknownNode { node })?;
        if n.connections.is_empty() {
            return Err(GridError::NoConnections { node });
        }
        let conn = self
            .connections
            .get(connection)
            .ok_or(GridError::UnknownConnection { connection })?;
        if !conn.touches(node) {
            return Err(GridError::NotIncident { node, connection });
        }

        let parent = conn.other_side(node);
        let own_max = max_channels(n.flags, mode);
        let compressible = !n.flags.contains(NodeFlag::CannotCarryCompressed);
        let p = self
            .nodes
            .get(parent)
            .ok_or(GridError::UnknownNode { node: parent })?;

        let (ancestor, subtree_max, compressed) = if p.controller {
            (None, own_max, compressible)
        } else {
            let similar = p.highest_similar_ancestor.and_then(|h| {
                self.nodes
                    .get(h)
                    .filter(|hn| hn.subtree_max_channels == p.subtree_max_channels)
                    .map(|_| h)
            });
            (
                Some(similar.unwrap_or(parent)),
                own_max.min(p.subtree_max_channels),
                p.subtree_allows_compressed && compressible,
            )
        };

        if let Some(conn) = self.connections.get_mut(connection) {
            conn.controller_route = Some(parent);
            conn.used_channels = 0;
        }
        let n = self.nodes.get_mut(node).ok_or(GridError::UnknownNode { node })?;
        n.used_channels = 0;
        n.highest_similar_ancestor = ancestor;
        n.subtree_max_channels = subtree_max;
        n.subtree_allows_compressed = compressed;
        if let Some(idx) = n.connections.iter().position(|c| *c == connection) {
            if idx > 0 {
                let head = n.connections.remove(idx);
                n.connections.insert(0, head);
            }
        }
        Ok(())
    }

    /// Recompute `node`'s working count from its children's edges, plus
    /// one if the node consumes a channel itself, and carry the result
    /// onto its route edge.
    ///
    /// A count above capacity is logged and counted, never rejected.
    /// Controllers are route roots and impose no cap on what they serve.
    pub fn propagate_channels_upwards(
        &mut self,
        node: NodeId,
        consumes: bool,
    ) -> Result<u32, GridError> {
        let n = self.nodes.get(node).ok_or(GridError::UnknownNode { node })?;
        let mut used = n
            .connections
            .iter()
            .filter_map(|c| self.connections.get(*c))
            .filter(|c| c.controller_route == Some(node))
            .fold(0u32, |sum, c| sum.saturating_add(c.used_channels));
        if consumes {
            used = used.saturating_add(1);
        }

        let max = max_channels(n.flags, self.config.channel_mode);
        if !n.controller && used > max {
            log::error!("{node} carries {used} channels but can only carry {max}");
            self.metrics.channel_overflow_events += 1;
        }

        let route = self.route_parent(node).and_then(|_| self.controller_route(node).ok());
        if let Some(n) = self.nodes.get_mut(node) {
            n.used_channels = used;
        }
        if let Some(conn) = route.and_then(|r| self.connections.get_mut(r)) {
            conn.used_channels = used;
        }
        Ok(used)
    }

    /// Commit the working count.
    ///
    /// Clears the ancestor back-pointer; if the committed count changes
    /// the owner receives [`Notification::ChannelsChanged`]. Nodes that
    /// cannot carry channels keep their previous committed count.
    pub fn finalize_channels(&mut self, node: NodeId) -> Result<(), GridError> {
        let n = self.nodes.get_mut(node).ok_or(GridError::UnknownNode { node })?;
        n.highest_similar_ancestor = None;
        if n.flags.contains(NodeFlag::CannotCarry) {
            return Ok(());
        }
        if n.last_used_channels != n.used_channels {
            n.last_used_channels = n.used_channels;
            n.owner.on_notification(Notification::ChannelsChanged);
        }
        Ok(())
    }

    /// Overwrite the working count, as ad-hoc grids do for every member.
    pub fn set_ad_hoc_channels(&mut self, node: NodeId, channels: u32) -> Result<(), GridError> {
        let n = self.nodes.get_mut(node).ok_or(GridError::UnknownNode { node })?;
        n.used_channels = channels;
        Ok(())
    }

    /// Add `channels` to the working count.
    pub fn increment_channel_count(
        &mut self,
        node: NodeId,
        channels: u32,
    ) -> Result<(), GridError> {
        let n = self.nodes.get_mut(node).ok_or(GridError::UnknownNode { node })?;
        n.used_channels = n.used_channels.saturating_add(channels);
        Ok(())
    }
}
