// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph arena: nodes and connections keyed by opaque ids.
//!
//! Adjacency (which connections touch a port) is derived by filtering
//! the connection arena; ports carry no back-pointers. Arenas use
//! shift-removal so iteration order stays creation order, which the
//! execution-order tie-break relies on.

use crate::connection::{Connection, ConnectionId};
use crate::node::{Node, NodeId};
use crate::port::{Port, PortDirection, PortRef};
use crate::value::DataType;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Errors from node-level operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GraphError {
    /// The kind tag is not registered in the catalog.
    #[error("unknown node kind: {0}")]
    UnknownKind(String),
    /// No node with this id exists.
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),
}

/// Errors from creating a connection. The graph is left unchanged on
/// every failure.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConnectError {
    /// An endpoint references a missing node.
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),
    /// An endpoint references a missing port.
    #[error("port not found: {0:?}")]
    PortNotFound(PortRef),
    /// Both endpoints belong to the same node.
    #[error("cannot connect a node to itself")]
    SelfLoop,
    /// Both endpoints have the same direction.
    #[error("connection needs one output and one input port")]
    Direction,
    /// The port types are incompatible.
    #[error("type mismatch: {source_type:?} -> {target:?}")]
    TypeMismatch {
        /// Source port type.
        source_type: DataType,
        /// Target port type.
        target: DataType,
    },
}

/// A multigraph of typed nodes and connections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Graph {
    nodes: IndexMap<NodeId, Node>,
    connections: IndexMap<ConnectionId, Connection>,
}

impl Graph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node to the graph.
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = node.id;
        self.nodes.insert(id, node);
        id
    }

    /// Remove a node and, cascading, every connection touching any of
    /// its ports. Inputs downstream of the removed node are cleared to
    /// absent.
    ///
    /// Idempotent: removing a missing node is a no-op. Returns the
    /// downstream node ids whose inputs were cleared, so the caller can
    /// re-propagate them.
    pub fn remove_node(&mut self, node_id: NodeId) -> Vec<NodeId> {
        if self.nodes.shift_remove(&node_id).is_none() {
            return Vec::new();
        }

        let removed: Vec<Connection> = self
            .connections
            .values()
            .filter(|c| c.involves_node(node_id))
            .cloned()
            .collect();
        self.connections.retain(|_, c| !c.involves_node(node_id));

        let mut affected = Vec::new();
        for conn in removed {
            if conn.source.node == node_id {
                if let Some(target) = self.nodes.get_mut(&conn.target.node) {
                    target.clear_input(conn.target.port);
                    if !affected.contains(&conn.target.node) {
                        affected.push(conn.target.node);
                    }
                }
            }
        }
        affected
    }

    /// Get a node by ID.
    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(&node_id)
    }

    /// Get a mutable node by ID.
    pub fn node_mut(&mut self, node_id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&node_id)
    }

    /// Whether a node exists.
    pub fn contains_node(&self, node_id: NodeId) -> bool {
        self.nodes.contains_key(&node_id)
    }

    /// All nodes in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// All node IDs in creation order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Create a connection between two ports, in either argument order.
    ///
    /// Validates that the endpoints exist, belong to distinct nodes,
    /// have opposite directions, and carry compatible types. If the
    /// input side is already connected, the prior connection is removed
    /// first (single-writer replacement).
    pub fn connect(&mut self, a: PortRef, b: PortRef) -> Result<ConnectionId, ConnectError> {
        if a.node == b.node {
            return Err(ConnectError::SelfLoop);
        }
        let port_a = self.lookup_port(a)?;
        let port_b = self.lookup_port(b)?;

        let (source, target, source_type, target_type) =
            match (port_a.direction, port_b.direction) {
                (PortDirection::Output, PortDirection::Input) => {
                    (a, b, port_a.data_type, port_b.data_type)
                }
                (PortDirection::Input, PortDirection::Output) => {
                    (b, a, port_b.data_type, port_a.data_type)
                }
                _ => return Err(ConnectError::Direction),
            };

        if !source_type.accepts(target_type) {
            return Err(ConnectError::TypeMismatch {
                source_type,
                target: target_type,
            });
        }

        // Single-writer: an occupied input drops its prior connection.
        let occupied: Vec<ConnectionId> = self
            .connections
            .values()
            .filter(|c| c.target == target)
            .map(|c| c.id)
            .collect();
        for id in occupied {
            self.disconnect(id);
        }

        let resolved = if source_type != DataType::Any {
            source_type
        } else {
            target_type
        };
        let connection = Connection::new(source, target, resolved);
        let id = connection.id;
        self.connections.insert(id, connection);
        Ok(id)
    }

    /// Remove a connection, clearing the target input slot back to
    /// absent (the value is gone, not stale).
    pub fn disconnect(&mut self, connection_id: ConnectionId) -> Option<Connection> {
        let conn = self.connections.shift_remove(&connection_id)?;
        if let Some(node) = self.nodes.get_mut(&conn.target.node) {
            node.clear_input(conn.target.port);
        }
        Some(conn)
    }

    /// Get a connection by ID.
    pub fn connection(&self, connection_id: ConnectionId) -> Option<&Connection> {
        self.connections.get(&connection_id)
    }

    /// All connections in creation order.
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    /// Connections touching a node on either end.
    pub fn connections_for_node(&self, node_id: NodeId) -> impl Iterator<Item = &Connection> {
        self.connections
            .values()
            .filter(move |c| c.involves_node(node_id))
    }

    /// Connections whose source is the given port.
    pub fn connections_from(&self, port: PortRef) -> impl Iterator<Item = &Connection> {
        self.connections.values().filter(move |c| c.source == port)
    }

    /// The connection feeding an input port, if any.
    pub fn connection_to_input(&self, port: PortRef) -> Option<&Connection> {
        self.connections.values().find(|c| c.target == port)
    }

    /// Ids of connections attached to a port on either end.
    pub fn connections_for_port(&self, port: PortRef) -> Vec<ConnectionId> {
        self.connections
            .values()
            .filter(|c| c.touches_port(port))
            .map(|c| c.id)
            .collect()
    }

    /// Number of connections.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    fn lookup_port(&self, port: PortRef) -> Result<&Port, ConnectError> {
        let node = self
            .nodes
            .get(&port.node)
            .ok_or(ConnectError::NodeNotFound(port.node))?;
        node.port(port.port)
            .ok_or(ConnectError::PortNotFound(port))
    }
}
