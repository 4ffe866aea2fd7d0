// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node instances: kind tag, ports, configuration and cached values.

use crate::config::Config;
use crate::port::{Port, PortDirection, PortId};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Create a new random node ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A node instance in the graph.
///
/// Holds one value slot per input port and a single cached output
/// value; the kind's update function recomputes the output whenever an
/// input or the configuration changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique instance ID.
    pub id: NodeId,
    /// Kind tag from the catalog.
    pub kind: String,
    /// Ordered port list, fixed at creation.
    ports: Vec<Port>,
    /// Kind-specific configuration.
    pub config: Config,
    /// Current value per port slot; meaningful only at input ports.
    inputs: Vec<Value>,
    /// Cached output value.
    pub output: Value,
}

impl Node {
    /// Create a node of `kind` with the given ports and configuration.
    pub fn new(kind: impl Into<String>, ports: Vec<Port>, config: Config) -> Self {
        let inputs = vec![Value::Absent; ports.len()];
        Self {
            id: NodeId::new(),
            kind: kind.into(),
            ports,
            config,
            inputs,
            output: Value::Absent,
        }
    }

    /// All ports in creation order.
    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    /// A port by ID.
    pub fn port(&self, port_id: PortId) -> Option<&Port> {
        self.ports.get(port_id.0)
    }

    /// A port by its catalog name.
    pub fn port_named(&self, name: &str) -> Option<&Port> {
        self.ports.iter().find(|p| p.name == name)
    }

    /// Input ports in creation order.
    pub fn input_ports(&self) -> impl Iterator<Item = &Port> {
        self.ports
            .iter()
            .filter(|p| p.direction == PortDirection::Input)
    }

    /// Output ports in creation order.
    pub fn output_ports(&self) -> impl Iterator<Item = &Port> {
        self.ports
            .iter()
            .filter(|p| p.direction == PortDirection::Output)
    }

    /// The value currently held in an input slot.
    pub fn input_value(&self, port_id: PortId) -> &Value {
        self.inputs.get(port_id.0).unwrap_or(&Value::Absent)
    }

    /// The value held in the input slot of the named port.
    pub fn input_named(&self, name: &str) -> &Value {
        self.port_named(name)
            .map_or(&Value::Absent, |p| self.input_value(p.id))
    }

    /// Values of input ports, in port order.
    pub fn input_values(&self) -> impl Iterator<Item = &Value> {
        self.input_ports().map(|p| self.input_value(p.id))
    }

    /// Write a value into an input slot.
    pub fn set_input(&mut self, port_id: PortId, value: Value) {
        if let Some(slot) = self.inputs.get_mut(port_id.0) {
            *slot = value;
        }
    }

    /// Clear an input slot back to absent, e.g. when its connection is
    /// removed.
    pub fn clear_input(&mut self, port_id: PortId) {
        self.set_input(port_id, Value::Absent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::DataType;

    fn test_node() -> Node {
        Node::new(
            "Add",
            vec![
                Port {
                    id: PortId(0),
                    name: "in-a".into(),
                    direction: PortDirection::Input,
                    data_type: DataType::Number,
                },
                Port {
                    id: PortId(1),
                    name: "out".into(),
                    direction: PortDirection::Output,
                    data_type: DataType::Number,
                },
            ],
            Config::new(),
        )
    }

    #[test]
    fn lookups_by_id_and_name() {
        let node = test_node();
        assert_eq!(node.port(PortId(0)).unwrap().name, "in-a");
        assert_eq!(node.port_named("out").unwrap().id, PortId(1));
        assert!(node.port_named("nope").is_none());
    }

    #[test]
    fn input_slots_start_absent_and_clear_back() {
        let mut node = test_node();
        assert!(node.input_value(PortId(0)).is_absent());

        node.set_input(PortId(0), Value::Number(4.0));
        assert_eq!(node.input_named("in-a"), &Value::Number(4.0));

        node.clear_input(PortId(0));
        assert!(node.input_named("in-a").is_absent());
    }
}
