// SPDX-License-Identifier: MIT OR Apache-2.0
//! Execution-order resolution: a dependency-respecting traversal order.

use crate::graph::Graph;
use crate::node::NodeId;
use std::collections::HashSet;

/// The connection graph contains a cycle; no order exists.
#[derive(Debug, Clone, thiserror::Error)]
#[error("graph contains a cycle")]
pub struct CycleError;

/// Compute an order over the current node set such that for every
/// connection the source precedes the target.
///
/// Depth-first with three-coloring: visiting a node marks it
/// in-progress, recursively visits its direct predecessors first, then
/// marks it done and appends it. Meeting an in-progress node signals a
/// cycle and aborts the whole resolution — never a partial order.
///
/// Deterministic for a fixed graph: nodes with no incoming connection
/// are visited in creation order, then any remaining nodes in creation
/// order, and predecessors in connection-creation order.
pub fn execution_order(graph: &Graph) -> Result<Vec<NodeId>, CycleError> {
    let mut visited = HashSet::new();
    let mut visiting = HashSet::new();
    let mut order = Vec::with_capacity(graph.node_count());

    let roots: Vec<NodeId> = graph
        .node_ids()
        .filter(|&id| !graph.connections().any(|c| c.target.node == id))
        .collect();
    for id in roots {
        visit(graph, id, &mut visited, &mut visiting, &mut order)?;
    }

    let remaining: Vec<NodeId> = graph.node_ids().collect();
    for id in remaining {
        if !visited.contains(&id) {
            visit(graph, id, &mut visited, &mut visiting, &mut order)?;
        }
    }

    Ok(order)
}

fn visit(
    graph: &Graph,
    node_id: NodeId,
    visited: &mut HashSet<NodeId>,
    visiting: &mut HashSet<NodeId>,
    order: &mut Vec<NodeId>,
) -> Result<(), CycleError> {
    if visiting.contains(&node_id) {
        return Err(CycleError);
    }
    if visited.contains(&node_id) {
        return Ok(());
    }

    visiting.insert(node_id);

    let predecessors: Vec<NodeId> = graph
        .connections()
        .filter(|c| c.target.node == node_id)
        .map(|c| c.source.node)
        .collect();
    for pred in predecessors {
        visit(graph, pred, visited, visiting, order)?;
    }

    visiting.remove(&node_id);
    visited.insert(node_id);
    order.push(node_id);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::node::Node;
    use crate::port::{Port, PortDirection, PortId, PortRef};
    use crate::value::DataType;

    fn relay(graph: &mut Graph) -> (NodeId, PortRef, PortRef) {
        let node = Node::new(
            "Relay",
            vec![
                Port {
                    id: PortId(0),
                    name: "in".into(),
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
        );
        let id = graph.add_node(node);
        (id, PortRef::new(id, PortId(0)), PortRef::new(id, PortId(1)))
    }

    fn index_of(order: &[NodeId], id: NodeId) -> usize {
        order.iter().position(|&n| n == id).unwrap()
    }

    #[test]
    fn sources_precede_targets() {
        let mut graph = Graph::new();
        let (a, _, a_out) = relay(&mut graph);
        let (b, b_in, b_out) = relay(&mut graph);
        let (c, c_in, _) = relay(&mut graph);
        graph.connect(a_out, b_in).unwrap();
        graph.connect(b_out, c_in).unwrap();

        let order = execution_order(&graph).unwrap();
        assert_eq!(order.len(), 3);
        assert!(index_of(&order, a) < index_of(&order, b));
        assert!(index_of(&order, b) < index_of(&order, c));
    }

    fn join(graph: &mut Graph) -> (NodeId, PortRef, PortRef) {
        let node = Node::new(
            "Join",
            vec![
                Port {
                    id: PortId(0),
                    name: "in-a".into(),
                    direction: PortDirection::Input,
                    data_type: DataType::Number,
                },
                Port {
                    id: PortId(1),
                    name: "in-b".into(),
                    direction: PortDirection::Input,
                    data_type: DataType::Number,
                },
                Port {
                    id: PortId(2),
                    name: "out".into(),
                    direction: PortDirection::Output,
                    data_type: DataType::Number,
                },
            ],
            Config::new(),
        );
        let id = graph.add_node(node);
        (id, PortRef::new(id, PortId(0)), PortRef::new(id, PortId(1)))
    }

    #[test]
    fn diamond_resolves_once_per_node() {
        let mut graph = Graph::new();
        let (a, _, a_out) = relay(&mut graph);
        let (b, b_in, b_out) = relay(&mut graph);
        let (c, c_in, c_out) = relay(&mut graph);
        let (d, d_in_a, d_in_b) = join(&mut graph);
        graph.connect(a_out, b_in).unwrap();
        graph.connect(a_out, c_in).unwrap();
        graph.connect(b_out, d_in_a).unwrap();
        graph.connect(c_out, d_in_b).unwrap();

        let order = execution_order(&graph).unwrap();
        assert_eq!(order.len(), 4);
        assert!(index_of(&order, a) < index_of(&order, b));
        assert!(index_of(&order, a) < index_of(&order, c));
        assert!(index_of(&order, b) < index_of(&order, d));
        assert!(index_of(&order, c) < index_of(&order, d));
    }

    #[test]
    fn cycle_fails_on_every_call() {
        let mut graph = Graph::new();
        let (_, a_in, a_out) = relay(&mut graph);
        let (_, b_in, b_out) = relay(&mut graph);
        graph.connect(a_out, b_in).unwrap();
        graph.connect(b_out, a_in).unwrap();

        assert!(execution_order(&graph).is_err());
        assert!(execution_order(&graph).is_err());
    }

    #[test]
    fn disconnected_nodes_keep_creation_order() {
        let mut graph = Graph::new();
        let (a, _, _) = relay(&mut graph);
        let (b, _, _) = relay(&mut graph);
        let (c, _, _) = relay(&mut graph);

        let order = execution_order(&graph).unwrap();
        assert_eq!(order, vec![a, b, c]);
        // Repeated calls agree.
        assert_eq!(execution_order(&graph).unwrap(), order);
    }
}
