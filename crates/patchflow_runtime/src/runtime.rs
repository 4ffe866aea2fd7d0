// SPDX-License-Identifier: MIT OR Apache-2.0
//! The control loop: graph edits, media ingest, and tick-driven
//! refresh in one single-writer surface.

use crate::clock::SystemClock;
use crate::services::MediaContext;
use indexmap::IndexMap;
use patchflow_graph::{
    Config, ConnectError, ConnectionId, CycleError, Graph, GraphError, InitAction, KindRegistry,
    KindServices, NodeId, Port, PortRef, Refresh, Value, ValuePropagator,
};
use patchflow_media::{
    FileLoader, MediaKind, MediaResourceCache, RequestStatus, ResourceId, ShaderParams,
    ShaderProcessor, TextureHandle,
};

/// Errors surfaced by runtime edit operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RuntimeError {
    /// A node-level operation failed.
    #[error(transparent)]
    Graph(#[from] GraphError),
    /// A connection was rejected.
    #[error(transparent)]
    Connect(#[from] ConnectError),
}

/// Owns the graph, the kind catalog, and the media context, and applies
/// every mutation from one logical thread.
///
/// Edits propagate values eagerly; [`tick`] ingests finished media
/// loads and re-runs time-driven and live-fed nodes.
///
/// [`tick`]: Runtime::tick
pub struct Runtime {
    graph: Graph,
    registry: KindRegistry,
    media: MediaContext,
    // Media resources created by node init, keyed to the owning node so
    // removal can release them and ingest can drop stale completions.
    resource_owners: IndexMap<ResourceId, NodeId>,
}

impl Runtime {
    /// A runtime over the filesystem loader, the software render
    /// backend, and the wall clock.
    pub fn new(registry: KindRegistry) -> Self {
        let media = MediaContext::new(
            MediaResourceCache::new(Box::new(FileLoader)),
            ShaderProcessor::software(),
            Box::new(SystemClock::new()),
        );
        Self::with_media(registry, media)
    }

    /// A runtime over an explicit media context, for embedding other
    /// loaders, backends, or clocks.
    pub fn with_media(registry: KindRegistry, media: MediaContext) -> Self {
        Self {
            graph: Graph::new(),
            registry,
            media,
            resource_owners: IndexMap::new(),
        }
    }

    /// The graph, read-only.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// The kind catalog.
    pub fn registry(&self) -> &KindRegistry {
        &self.registry
    }

    /// The media context.
    pub fn media(&self) -> &MediaContext {
        &self.media
    }

    /// Instantiate a node of `kind`, run its init action, and propagate
    /// its first output.
    pub fn add_node(&mut self, kind: &str, overrides: Config) -> Result<NodeId, RuntimeError> {
        let node = self.registry.instantiate(kind, overrides)?;
        let node_id = node.id;
        let init = self.registry.get(kind).and_then(|k| k.init);
        self.graph.add_node(node);

        if let Some(InitAction::LoadMedia { kind: media_kind }) = init {
            self.start_media_load(node_id, media_kind);
        }

        self.propagate(node_id);
        tracing::info!(node = %node_id, kind, "node added");
        Ok(node_id)
    }

    /// Remove a node, cascade its connections, release media it owns,
    /// and re-propagate the nodes it fed.
    pub fn remove_node(&mut self, node_id: NodeId) {
        let affected = self.graph.remove_node(node_id);

        let output_id = ResourceId::new(format!("shader-{node_id}"));
        self.media.processor_mut().release_output(&output_id);

        let owned: Vec<ResourceId> = self
            .resource_owners
            .iter()
            .filter(|(_, owner)| **owner == node_id)
            .map(|(id, _)| id.clone())
            .collect();
        for id in owned {
            self.media.resources_mut().release(&id);
            self.resource_owners.shift_remove(&id);
        }

        for downstream in affected {
            self.propagate(downstream);
        }
        tracing::info!(node = %node_id, "node removed");
    }

    /// Connect two ports (either argument order) and push the source's
    /// current output across the new edge.
    pub fn connect(&mut self, a: PortRef, b: PortRef) -> Result<ConnectionId, RuntimeError> {
        let id = self.graph.connect(a, b)?;
        let source = self
            .graph
            .connection(id)
            .map(|c| c.source.node)
            .unwrap_or(a.node);
        self.propagate(source);
        Ok(id)
    }

    /// Remove a connection and recompute the orphaned target.
    pub fn disconnect(&mut self, connection_id: ConnectionId) {
        if let Some(conn) = self.graph.disconnect(connection_id) {
            self.propagate(conn.target.node);
        }
    }

    /// Merge a config patch into a node and propagate the result.
    pub fn edit_config(&mut self, node_id: NodeId, patch: Config) -> Result<(), RuntimeError> {
        let node = self
            .graph
            .node_mut(node_id)
            .ok_or(GraphError::NodeNotFound(node_id))?;
        node.config.merge(patch);
        self.propagate(node_id);
        Ok(())
    }

    /// The cached output of a node.
    pub fn query_output(&self, node_id: NodeId) -> Option<&Value> {
        self.graph.node(node_id).map(|n| &n.output)
    }

    /// The ports of a node, in creation order.
    pub fn query_ports(&self, node_id: NodeId) -> Option<&[Port]> {
        self.graph.node(node_id).map(|n| n.ports())
    }

    /// Resolve a port by name on a node.
    pub fn port(&self, node_id: NodeId, name: &str) -> Option<PortRef> {
        let node = self.graph.node(node_id)?;
        Some(PortRef::new(node_id, node.port_named(name)?.id))
    }

    /// Request a media resource outside of a node init action, e.g. for
    /// an embedder-managed source.
    pub fn request_resource(
        &mut self,
        id: &ResourceId,
        locator: &str,
        kind: MediaKind,
    ) -> RequestStatus {
        self.media.resources_mut().request(id, locator, kind)
    }

    /// Run a fragment shader over a loaded resource into the buffer for
    /// `output_id`, outside of a Shader node's update.
    pub fn process_image(
        &mut self,
        source: &ResourceId,
        fragment_src: &str,
        params: &ShaderParams,
        output_id: &ResourceId,
    ) -> Option<TextureHandle> {
        let handle = self.media.resources().handle(source)?;
        self.media
            .process_image(&handle, fragment_src, params, output_id)
    }

    /// A deterministic full-recompute order, failing when the graph
    /// holds a cycle.
    pub fn execution_order(&self) -> Result<Vec<NodeId>, CycleError> {
        patchflow_graph::execution_order(&self.graph)
    }

    /// One control-loop step: ingest finished media loads, then offer
    /// time-driven and live-fed nodes a recompute.
    pub fn tick(&mut self) {
        for resource_id in self.media.resources_mut().poll_completions() {
            let Some(owner) = self.resource_owners.get(&resource_id).copied() else {
                tracing::debug!(%resource_id, "completion without an owner, dropping");
                continue;
            };
            if !self.graph.contains_node(owner) {
                continue;
            }
            match self.media.resources().handle(&resource_id) {
                Some(handle) => {
                    if let Some(node) = self.graph.node_mut(owner) {
                        node.config.set("resource", Value::Texture(handle));
                    }
                }
                None => {
                    tracing::warn!(%resource_id, "media load failed; source stays absent");
                }
            }
            self.propagate(owner);
        }

        let refreshable: Vec<(NodeId, Refresh)> = self
            .graph
            .nodes()
            .filter_map(|node| {
                let kind = self.registry.get(&node.kind)?;
                match kind.refresh {
                    Refresh::Never => None,
                    Refresh::EveryTick => Some((node.id, Refresh::EveryTick)),
                    Refresh::LiveTexture => {
                        let live = node
                            .input_values()
                            .any(|v| v.as_texture().is_some_and(|t| t.is_live()));
                        live.then_some((node.id, Refresh::LiveTexture))
                    }
                }
            })
            .collect();
        for (node_id, _) in refreshable {
            self.propagate(node_id);
        }
    }

    fn propagate(&mut self, origin: NodeId) {
        let propagator = ValuePropagator::new(&self.registry);
        propagator.propagate_from(&mut self.graph, &mut self.media, origin);
    }

    fn start_media_load(&mut self, node_id: NodeId, media_kind: MediaKind) {
        let prefix = match media_kind {
            MediaKind::StillImage => "image",
            MediaKind::Video => "video",
            MediaKind::Camera => "camera",
        };
        let resource_id = ResourceId::new(format!("{prefix}-{node_id}"));
        let locator = self
            .graph
            .node(node_id)
            .and_then(|n| n.config.text("source"))
            .unwrap_or_default()
            .to_string();

        self.resource_owners.insert(resource_id.clone(), node_id);
        let status = self
            .media
            .resources_mut()
            .request(&resource_id, &locator, media_kind);
        // A previously loaded resource is usable without waiting for a
        // tick.
        if let RequestStatus::Ready(handle) = status {
            if let Some(node) = self.graph.node_mut(node_id) {
                node.config.set("resource", Value::Texture(handle));
            }
        }
    }
}
