//! Multi-root, layered breadth-first traversal.
//!
//! Every node is stamped with the pass token before it is queued, so it
//! is visited at most once per pass even when cycles rediscover it. The
//! connection-aware walk additionally hands every reachable edge to the
//! visitor exactly once: edges queued while expanding one layer are
//! delivered before the next layer's nodes, and whatever is still queued
//! after the last layer is delivered at the end.

use std::mem;

use gridlink_core::{ConnectionId, NodeId};

use crate::network::Network;

/// Node callback of a traversal.
pub trait NodeVisitor {
    /// Visit `node`; return `false` to stop expanding through it.
    fn visit_node(&mut self, network: &mut Network, node: NodeId) -> bool;
}

/// Connection-aware traversal callback.
pub trait ConnectionVisitor: NodeVisitor {
    /// Visit one reachable edge. Called once per edge per pass.
    fn visit_connection(&mut self, network: &mut Network, connection: ConnectionId);
}

impl Network {
    /// Walk nodes reachable from `roots` breadth first.
    pub fn visit_nodes<V: NodeVisitor + ?Sized>(&mut self, roots: &[NodeId], visitor: &mut V) {
        let token = self.next_visit_token();
        let mut layer = self.seed_roots(roots, token);

        while !layer.is_empty() {
            let mut next = Vec::new();
            for node in mem::take(&mut layer) {
                if visitor.visit_node(self, node) {
                    self.expand(node, token, &mut next, None);
                }
            }
            layer = next;
        }
    }

    /// Walk nodes and edges reachable from `roots` breadth first.
    ///
    /// Edges leaving a node are only queued when the visitor expands
    /// through that node, but an edge reached from either endpoint is
    /// delivered even if the other endpoint is pruned.
    pub fn visit_connections<V: ConnectionVisitor + ?Sized>(
        &mut self,
        roots: &[NodeId],
        visitor: &mut V,
    ) {
        let token = self.next_visit_token();
        let mut layer = self.seed_roots(roots, token);
        let mut edges: Vec<ConnectionId> = Vec::new();

        while !layer.is_empty() {
            for edge in mem::take(&mut edges) {
                visitor.visit_connection(self, edge);
            }

            let mut next = Vec::new();
            for node in mem::take(&mut layer) {
                if visitor.visit_node(self, node) {
                    self.expand(node, token, &mut next, Some(&mut edges));
                }
            }
            layer = next;
        }

        for edge in edges {
            visitor.visit_connection(self, edge);
        }
    }

    fn next_visit_token(&mut self) -> u64 {
        self.visit_counter += 1;
        self.visit_counter
    }

    fn seed_roots(&mut self, roots: &[NodeId], token: u64) -> Vec<NodeId> {
        let mut layer = Vec::with_capacity(roots.len());
        for &root in roots {
            if let Some(node) = self.nodes.get_mut(root) {
                if node.visit_token != token {
                    node.visit_token = token;
                    layer.push(root);
                }
            }
        }
        layer
    }

    fn expand(
        &mut self,
        node: NodeId,
        token: u64,
        next: &mut Vec<NodeId>,
        mut edges: Option<&mut Vec<ConnectionId>>,
    ) {
        let Some(incident) = self.nodes.get(node).map(|n| n.connections.clone()) else {
            return;
        };
        for conn_id in incident {
            let Some(conn) = self.connections.get_mut(conn_id) else {
                continue;
            };
            if let Some(edges) = edges.as_deref_mut() {
                if conn.visit_token != token {
                    conn.visit_token = token;
                    edges.push(conn_id);
                }
            }
            let other = conn.other_side(node);
            if let Some(other_node) = self.nodes.get_mut(other) {
                if other_node.visit_token != token {
                    other_node.visit_token = token;
                    next.push(other);
                }
            }
        }
    }
}
