// SPDX-License-Identifier: MIT OR Apache-2.0
//! Eager value propagation.
//!
//! Edits push values downstream immediately instead of waiting for the
//! next tick. Propagation walks outgoing connections depth first and
//! keeps the active path on a stack, so a diamond recomputes its join
//! once per incoming edge while a cycle edge terminates instead of
//! recursing forever.

use crate::catalog::{KindRegistry, KindServices, UpdateCtx};
use crate::graph::Graph;
use crate::node::NodeId;
use crate::port::PortRef;

/// Pushes recomputed outputs through the graph from an origin node.
pub struct ValuePropagator<'a> {
    registry: &'a KindRegistry,
}

impl<'a> ValuePropagator<'a> {
    /// Create a propagator over `registry`.
    pub fn new(registry: &'a KindRegistry) -> Self {
        Self { registry }
    }

    /// Recompute `origin` and push its output downstream, recursively.
    ///
    /// Unknown nodes and unregistered kinds are skipped. Terminates on
    /// arbitrary graphs, cyclic ones included.
    pub fn propagate_from(
        &self,
        graph: &mut Graph,
        services: &mut dyn KindServices,
        origin: NodeId,
    ) {
        let mut path = Vec::new();
        self.visit(graph, services, origin, &mut path);
    }

    /// Recompute every node in `origins`, in order.
    pub fn propagate_all(
        &self,
        graph: &mut Graph,
        services: &mut dyn KindServices,
        origins: impl IntoIterator<Item = NodeId>,
    ) {
        for origin in origins {
            self.propagate_from(graph, services, origin);
        }
    }

    fn visit(
        &self,
        graph: &mut Graph,
        services: &mut dyn KindServices,
        node_id: NodeId,
        path: &mut Vec<NodeId>,
    ) {
        if path.contains(&node_id) {
            tracing::debug!(node = %node_id, "propagation reached a cycle edge, stopping");
            return;
        }
        let Some(node) = graph.node(node_id) else {
            return;
        };
        let Some(kind) = self.registry.get(&node.kind) else {
            tracing::warn!(node = %node_id, kind = %node.kind, "unregistered kind, skipping");
            return;
        };

        let output = {
            let mut ctx = UpdateCtx::new(node, services);
            (kind.update)(&mut ctx)
        };
        if let Some(node) = graph.node_mut(node_id) {
            node.output = output.clone();
        }

        let targets: Vec<PortRef> = graph
            .connections()
            .filter(|c| c.source.node == node_id)
            .map(|c| c.target)
            .collect();

        path.push(node_id);
        for target in targets {
            if let Some(target_node) = graph.node_mut(target.node) {
                target_node.set_input(target.port, output.clone());
            }
            self.visit(graph, services, target.node, path);
        }
        path.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::NullServices;
    use crate::config::Config;
    use crate::kinds::builtin_registry;
    use crate::value::Value;

    fn number(graph: &mut Graph, registry: &KindRegistry, value: f64) -> NodeId {
        let node = registry
            .instantiate("Number", Config::new().with("value", Value::Number(value)))
            .unwrap();
        graph.add_node(node)
    }

    fn add(graph: &mut Graph, registry: &KindRegistry) -> NodeId {
        let node = registry.instantiate("Add", Config::new()).unwrap();
        graph.add_node(node)
    }

    fn out_port(graph: &Graph, node: NodeId, name: &str) -> PortRef {
        PortRef::new(node, graph.node(node).unwrap().port_named(name).unwrap().id)
    }

    #[test]
    fn chain_propagates_to_the_end() {
        let registry = builtin_registry();
        let mut graph = Graph::new();
        let five = number(&mut graph, &registry, 5.0);
        let three = number(&mut graph, &registry, 3.0);
        let sum = add(&mut graph, &registry);

        graph
            .connect(out_port(&graph, five, "out"), out_port(&graph, sum, "in-a"))
            .unwrap();
        graph
            .connect(
                out_port(&graph, three, "out"),
                out_port(&graph, sum, "in-b"),
            )
            .unwrap();

        let propagator = ValuePropagator::new(&registry);
        let mut services = NullServices;
        propagator.propagate_from(&mut graph, &mut services, five);
        propagator.propagate_from(&mut graph, &mut services, three);

        assert_eq!(graph.node(sum).unwrap().output, Value::Number(8.0));
    }

    #[test]
    fn diamond_join_sees_both_branches() {
        let registry = builtin_registry();
        let mut graph = Graph::new();
        let source = number(&mut graph, &registry, 2.0);
        let left = add(&mut graph, &registry);
        let right = add(&mut graph, &registry);
        let join = add(&mut graph, &registry);

        for branch in [left, right] {
            graph
                .connect(
                    out_port(&graph, source, "out"),
                    out_port(&graph, branch, "in-a"),
                )
                .unwrap();
            graph
                .connect(
                    out_port(&graph, source, "out"),
                    out_port(&graph, branch, "in-b"),
                )
                .unwrap();
        }
        graph
            .connect(
                out_port(&graph, left, "out"),
                out_port(&graph, join, "in-a"),
            )
            .unwrap();
        graph
            .connect(
                out_port(&graph, right, "out"),
                out_port(&graph, join, "in-b"),
            )
            .unwrap();

        let propagator = ValuePropagator::new(&registry);
        let mut services = NullServices;
        propagator.propagate_from(&mut graph, &mut services, source);

        // Each branch doubles the source, the join sums the branches.
        assert_eq!(graph.node(join).unwrap().output, Value::Number(8.0));
    }

    #[test]
    fn cycle_terminates() {
        let registry = builtin_registry();
        let mut graph = Graph::new();
        let a = add(&mut graph, &registry);
        let b = add(&mut graph, &registry);

        graph
            .connect(out_port(&graph, a, "out"), out_port(&graph, b, "in-a"))
            .unwrap();
        graph
            .connect(out_port(&graph, b, "out"), out_port(&graph, a, "in-a"))
            .unwrap();

        let propagator = ValuePropagator::new(&registry);
        let mut services = NullServices;
        propagator.propagate_from(&mut graph, &mut services, a);

        assert_eq!(graph.node(a).unwrap().output, Value::Number(0.0));
        assert_eq!(graph.node(b).unwrap().output, Value::Number(0.0));
    }
}
