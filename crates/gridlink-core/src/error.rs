//! Error types for the gridlink network, organized by subsystem:
//! topology state, connection attempts, and deferred work.

use std::error::Error;
use std::fmt;

use crate::id::{ConnectionId, GridId, NodeId};

/// Illegal-state conditions raised by topology and channel operations.
///
/// These indicate a caller bug (wrong ordering, stale ids) rather than a
/// recoverable runtime condition. The failing operation performs no
/// mutation before returning the error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GridError {
    /// Persisted fields were loaded onto a node that already belongs to
    /// a grid.
    AlreadyInGrid {
        /// The node being loaded.
        node: NodeId,
        /// The grid it already belongs to.
        grid: GridId,
    },
    /// A controller route was requested on a node with no connections.
    NoConnections {
        /// The node without connections.
        node: NodeId,
    },
    /// The node id does not resolve (removed or never allocated).
    UnknownNode {
        /// The stale id.
        node: NodeId,
    },
    /// The connection id does not resolve.
    UnknownConnection {
        /// The stale id.
        connection: ConnectionId,
    },
    /// The connection is not incident on the node.
    NotIncident {
        /// The node.
        node: NodeId,
        /// The connection that does not touch it.
        connection: ConnectionId,
    },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyInGrid { node, grid } => {
                write!(f, "cannot load persisted state: {node} already joined {grid}")
            }
            Self::NoConnections { node } => {
                write!(f, "{node} has no connections, cannot have a controller route")
            }
            Self::UnknownNode { node } => write!(f, "unknown node {node}"),
            Self::UnknownConnection { connection } => write!(f, "unknown connection {connection}"),
            Self::NotIncident { node, connection } => {
                write!(f, "{connection} is not incident on {node}")
            }
        }
    }
}

impl Error for GridError {}

/// Reasons a connection attempt did not produce an edge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConnectError {
    /// Both endpoints are the same node.
    SelfLink {
        /// The node.
        node: NodeId,
    },
    /// The two nodes are already connected.
    AlreadyConnected {
        /// One endpoint.
        a: NodeId,
        /// The other endpoint.
        b: NodeId,
    },
    /// Direction masks or colors do not allow the link.
    Incompatible {
        /// One endpoint.
        a: NodeId,
        /// The other endpoint.
        b: NodeId,
    },
    /// The security policy rejected the link.
    SecurityBreach {
        /// One endpoint.
        a: NodeId,
        /// The other endpoint.
        b: NodeId,
    },
    /// An endpoint id does not resolve.
    UnknownNode {
        /// The stale id.
        node: NodeId,
    },
}

impl fmt::Display for ConnectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelfLink { node } => write!(f, "{node} cannot connect to itself"),
            Self::AlreadyConnected { a, b } => write!(f, "{a} and {b} are already connected"),
            Self::Incompatible { a, b } => write!(f, "{a} and {b} are not compatible"),
            Self::SecurityBreach { a, b } => {
                write!(f, "security check failed between {a} and {b}")
            }
            Self::UnknownNode { node } => write!(f, "unknown node {node}"),
        }
    }
}

impl Error for ConnectError {}

/// Failure reported by a deferred callable.
///
/// The scheduler logs and counts these; they never propagate further.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallableError {
    /// Human-readable description of the failure.
    pub reason: String,
}

impl CallableError {
    /// Construct from any displayable reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for CallableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "callable failed: {}", self.reason)
    }
}

impl Error for CallableError {}
