// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node-kind catalog: the registry the graph consumes as data.
//!
//! A kind describes a node's ports, default configuration, a pure
//! update function, an optional creation-time init action, and a
//! refresh policy the control loop evaluates each tick. Kinds that
//! perform image processing reach the media layer through the
//! [`KindServices`] seam; there are no process-wide singletons.

use crate::config::Config;
use crate::graph::GraphError;
use crate::node::{Node, NodeId};
use crate::port::{Port, PortDirection, PortId};
use crate::value::{DataType, Value};
use indexmap::IndexMap;
use patchflow_media::{MediaKind, ResourceId, ShaderParams, TextureHandle};

/// Category a kind belongs to, for catalog browsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindCategory {
    /// Arithmetic and other math.
    Math,
    /// Value generators (constants, time).
    Generator,
    /// Media sources.
    Media,
    /// Image effects.
    Effects,
    /// Display sinks.
    Output,
}

/// Port template inside a kind definition.
#[derive(Debug, Clone)]
pub struct PortSpec {
    /// Port name, e.g. `in-a`.
    pub name: &'static str,
    /// Direction.
    pub direction: PortDirection,
    /// Data type tag.
    pub data_type: DataType,
}

impl PortSpec {
    /// An input port template.
    pub fn input(name: &'static str, data_type: DataType) -> Self {
        Self {
            name,
            direction: PortDirection::Input,
            data_type,
        }
    }

    /// An output port template.
    pub fn output(name: &'static str, data_type: DataType) -> Self {
        Self {
            name,
            direction: PortDirection::Output,
            data_type,
        }
    }
}

/// Action the runtime performs once when a node of this kind is
/// created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitAction {
    /// Request a media resource; the locator comes from the node's
    /// `source` config entry and the resource id is derived from the
    /// node id.
    LoadMedia {
        /// What to load.
        kind: MediaKind,
    },
}

/// When the control loop offers a node of this kind a recompute beyond
/// ordinary value propagation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refresh {
    /// Only recompute through propagation.
    Never,
    /// Recompute every tick (clock-like kinds).
    EveryTick,
    /// Recompute each tick while a texture input is live (video or
    /// camera fed).
    LiveTexture,
}

/// Runtime capabilities a kind's update function may use.
///
/// Implemented by the runtime's media context; tests and pure graphs
/// can use [`NullServices`].
pub trait KindServices {
    /// Seconds on the runtime clock.
    fn now_seconds(&self) -> f64;

    /// Run a fragment shader over a source texture into the buffer for
    /// `output_id`. `None` means the output is skipped this cycle.
    fn process_image(
        &mut self,
        source: &TextureHandle,
        fragment_src: &str,
        params: &ShaderParams,
        output_id: &ResourceId,
    ) -> Option<TextureHandle>;
}

/// Services for graphs that never touch media: time is zero and image
/// processing declines.
#[derive(Debug, Default)]
pub struct NullServices;

impl KindServices for NullServices {
    fn now_seconds(&self) -> f64 {
        0.0
    }

    fn process_image(
        &mut self,
        _source: &TextureHandle,
        _fragment_src: &str,
        _params: &ShaderParams,
        _output_id: &ResourceId,
    ) -> Option<TextureHandle> {
        None
    }
}

/// Everything an update function sees: the node's inputs and
/// configuration, plus runtime services.
pub struct UpdateCtx<'a> {
    node: &'a Node,
    services: &'a mut dyn KindServices,
}

impl<'a> UpdateCtx<'a> {
    /// Build a context for one recompute.
    pub fn new(node: &'a Node, services: &'a mut dyn KindServices) -> Self {
        Self { node, services }
    }

    /// The node being recomputed.
    pub fn node_id(&self) -> NodeId {
        self.node.id
    }

    /// The node's configuration bag.
    pub fn config(&self) -> &Config {
        &self.node.config
    }

    /// The value at the named input port, `Absent` when unconnected.
    pub fn input(&self, name: &str) -> &Value {
        self.node.input_named(name)
    }

    /// Values of all input ports in port order.
    pub fn inputs(&self) -> impl Iterator<Item = &Value> {
        self.node.input_values()
    }

    /// Seconds on the runtime clock.
    pub fn now_seconds(&self) -> f64 {
        self.services.now_seconds()
    }

    /// Run image processing through the runtime services.
    pub fn process_image(
        &mut self,
        source: &TextureHandle,
        fragment_src: &str,
        params: &ShaderParams,
        output_id: &ResourceId,
    ) -> Option<TextureHandle> {
        self.services
            .process_image(source, fragment_src, params, output_id)
    }
}

/// Pure update function: same inputs and configuration produce the same
/// output. Absent inputs must map to defined defaults.
pub type UpdateFn = fn(&mut UpdateCtx<'_>) -> Value;

/// Definition of one node kind.
#[derive(Clone)]
pub struct NodeKind {
    /// Kind name, the tag stored on node instances.
    pub name: &'static str,
    /// Catalog category.
    pub category: KindCategory,
    /// Port templates in creation order.
    pub ports: Vec<PortSpec>,
    /// Configuration a new node starts from.
    pub default_config: Config,
    /// Pure output function.
    pub update: UpdateFn,
    /// Optional creation-time action.
    pub init: Option<InitAction>,
    /// Tick-driven refresh policy.
    pub refresh: Refresh,
}

impl std::fmt::Debug for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeKind")
            .field("name", &self.name)
            .field("category", &self.category)
            .field("ports", &self.ports.len())
            .field("refresh", &self.refresh)
            .finish_non_exhaustive()
    }
}

/// Registry of available node kinds.
#[derive(Debug, Default)]
pub struct KindRegistry {
    kinds: IndexMap<&'static str, NodeKind>,
}

impl KindRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a kind, replacing any previous definition of the same
    /// name.
    pub fn register(&mut self, kind: NodeKind) {
        self.kinds.insert(kind.name, kind);
    }

    /// Look up a kind by name.
    pub fn get(&self, name: &str) -> Option<&NodeKind> {
        self.kinds.get(name)
    }

    /// All registered kinds.
    pub fn kinds(&self) -> impl Iterator<Item = &NodeKind> {
        self.kinds.values()
    }

    /// Instantiate a node of `kind`, layering `overrides` on top of the
    /// kind's default configuration.
    pub fn instantiate(&self, kind: &str, overrides: Config) -> Result<Node, GraphError> {
        let definition = self
            .kinds
            .get(kind)
            .ok_or_else(|| GraphError::UnknownKind(kind.to_string()))?;

        let ports = definition
            .ports
            .iter()
            .enumerate()
            .map(|(i, spec)| Port {
                id: PortId(i),
                name: spec.name.to_string(),
                direction: spec.direction,
                data_type: spec.data_type,
            })
            .collect();

        let mut config = definition.default_config.clone();
        config.merge(overrides);

        Ok(Node::new(definition.name, ports, config))
    }
}
