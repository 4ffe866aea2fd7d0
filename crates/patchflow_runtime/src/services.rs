// SPDX-License-Identifier: MIT OR Apache-2.0
//! The media-backed implementation of the graph's service seam.

use crate::clock::Clock;
use patchflow_graph::KindServices;
use patchflow_media::{
    MediaResourceCache, ResourceId, ShaderParams, ShaderProcessor, TextureHandle, TextureOrigin,
};

/// Media caches plus a clock, handed to kind update functions as their
/// window onto the runtime.
///
/// Rendered textures resolve against the processor's own buffers, so a
/// shader chain can feed one effect's output into the next.
pub struct MediaContext {
    resources: MediaResourceCache,
    processor: ShaderProcessor,
    clock: Box<dyn Clock>,
}

impl MediaContext {
    /// Assemble a context from its parts.
    pub fn new(
        resources: MediaResourceCache,
        processor: ShaderProcessor,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            resources,
            processor,
            clock,
        }
    }

    /// The media resource cache.
    pub fn resources(&self) -> &MediaResourceCache {
        &self.resources
    }

    /// Mutable access to the media resource cache.
    pub fn resources_mut(&mut self) -> &mut MediaResourceCache {
        &mut self.resources
    }

    /// The shader processor.
    pub fn processor(&self) -> &ShaderProcessor {
        &self.processor
    }

    /// Mutable access to the shader processor.
    pub fn processor_mut(&mut self) -> &mut ShaderProcessor {
        &mut self.processor
    }

    /// Milliseconds on the runtime clock.
    pub fn now_millis(&self) -> u64 {
        self.clock.now_millis()
    }
}

impl KindServices for MediaContext {
    fn now_seconds(&self) -> f64 {
        self.clock.now_millis() as f64 / 1000.0
    }

    fn process_image(
        &mut self,
        source: &TextureHandle,
        fragment_src: &str,
        params: &ShaderParams,
        output_id: &ResourceId,
    ) -> Option<TextureHandle> {
        let now = self.clock.now_millis();
        if source.origin == TextureOrigin::Rendered {
            let surface = self.processor.buffer(&source.resource)?.to_surface();
            self.processor
                .process(source, &surface, fragment_src, params, output_id, now)
        } else {
            let surface = self.resources.surface(&source.resource)?;
            self.processor
                .process(source, surface, fragment_src, params, output_id, now)
        }
    }
}
