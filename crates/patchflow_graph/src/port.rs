// SPDX-License-Identifier: MIT OR Apache-2.0
//! Port definitions: typed, directional connection points on a node.

use crate::node::NodeId;
use crate::value::DataType;
use serde::{Deserialize, Serialize};

/// Identifier of a port within its node: a stable index into the node's
/// ordered port list. Ports are fixed at node creation, so indices
/// never move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PortId(pub usize);

/// Port direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortDirection {
    /// Receives a value from at most one connection.
    Input,
    /// Emits the node's output, fanning out to any number of
    /// connections.
    Output,
}

/// A typed, directional connection point. Direction and data type are
/// immutable after node creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Port {
    /// Index within the owning node's port list.
    pub id: PortId,
    /// Catalog-given name, e.g. `in-a` or `texture-in`.
    pub name: String,
    /// Direction.
    pub direction: PortDirection,
    /// Data type tag.
    pub data_type: DataType,
}

impl Port {
    /// Whether a connection between this port and `other` is valid:
    /// opposite directions and compatible types.
    pub fn can_connect(&self, other: &Port) -> bool {
        self.direction != other.direction && self.data_type.accepts(other.data_type)
    }
}

/// Identity of a port in the graph.
///
/// Connections store these by value; nothing holds a live reference
/// into a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortRef {
    /// Owning node.
    pub node: NodeId,
    /// Port within that node.
    pub port: PortId,
}

impl PortRef {
    /// Pair a node with one of its ports.
    pub fn new(node: NodeId, port: PortId) -> Self {
        Self { node, port }
    }
}
