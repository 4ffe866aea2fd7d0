// SPDX-License-Identifier: MIT OR Apache-2.0
//! Typed dataflow graph for Patchflow.
//!
//! This crate provides the authoring and evaluation model behind the
//! patch editor:
//! - Typed input/output ports with connection validation
//! - A kind catalog the graph consumes as data
//! - Eager, cycle-safe value propagation
//! - Deterministic execution ordering
//! - Serialization support

pub mod catalog;
pub mod config;
pub mod connection;
pub mod graph;
pub mod kinds;
pub mod node;
pub mod order;
pub mod port;
pub mod propagate;
pub mod value;

pub use catalog::{
    InitAction, KindCategory, KindRegistry, KindServices, NodeKind, NullServices, PortSpec,
    Refresh, UpdateCtx, UpdateFn,
};
pub use config::Config;
pub use connection::{Connection, ConnectionId};
pub use graph::{ConnectError, Graph, GraphError};
pub use kinds::{builtin_registry, DEFAULT_FRAGMENT_SHADER};
pub use node::{Node, NodeId};
pub use order::{execution_order, CycleError};
pub use port::{Port, PortDirection, PortId, PortRef};
pub use propagate::ValuePropagator;
pub use value::{DataType, Value};
