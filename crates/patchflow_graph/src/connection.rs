// SPDX-License-Identifier: MIT OR Apache-2.0
//! Connection (edge) definitions for the graph.

use crate::node::NodeId;
use crate::port::PortRef;
use crate::value::DataType;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    /// Create a new random connection ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

/// A typed link from an output port to an input port.
///
/// Endpoints are stored by value; a connection never holds a live
/// reference into a node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connection {
    /// Unique connection ID.
    pub id: ConnectionId,
    /// Source endpoint (direction Output).
    pub source: PortRef,
    /// Target endpoint (direction Input).
    pub target: PortRef,
    /// Resolved data type: the source port's type unless either side is
    /// the wildcard, in which case the concrete side wins.
    pub data_type: DataType,
}

impl Connection {
    /// Create a new connection.
    pub fn new(source: PortRef, target: PortRef, data_type: DataType) -> Self {
        Self {
            id: ConnectionId::new(),
            source,
            target,
            data_type,
        }
    }

    /// Whether this connection touches `node_id` on either end.
    pub fn involves_node(&self, node_id: NodeId) -> bool {
        self.source.node == node_id || self.target.node == node_id
    }

    /// Whether this connection is attached to `port` on either end.
    pub fn touches_port(&self, port: PortRef) -> bool {
        self.source == port || self.target == port
    }
}
