// SPDX-License-Identifier: MIT OR Apache-2.0
//! Image processing pipeline: throttle, compile, render.

use crate::buffers::{RenderBuffer, RenderBufferCache};
use crate::compile::{CompileError, ProgramHandle, ShaderCompileCache, ShaderCompiler};
use crate::resource::{ResourceId, Surface, TextureHandle, TextureOrigin};
use crate::throttle::ThrottleGovernor;
use serde::{Deserialize, Serialize};

/// Vertex shader paired with every fragment program: a fullscreen quad
/// passing texture coordinates through.
pub const DEFAULT_VERTEX_SHADER: &str = "\
attribute vec3 aPosition;
attribute vec2 aTexCoord;
varying vec2 vTexCoord;

void main() {
    vTexCoord = aTexCoord;
    vec4 positionVec4 = vec4(aPosition, 1.0);
    positionVec4.xy = positionVec4.xy * 2.0 - 1.0;
    gl_Position = positionVec4;
}";

/// Uniform values handed to a fragment program.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShaderParams {
    /// Seconds, typically the runtime clock or a time input.
    pub time: f64,
    /// Free-form effect parameter.
    pub param1: f64,
    /// Free-form effect parameter.
    pub param2: f64,
    /// Free-form effect parameter.
    pub param3: f64,
}

impl Default for ShaderParams {
    fn default() -> Self {
        Self {
            time: 0.0,
            param1: 1.0,
            param2: 1.0,
            param3: 1.0,
        }
    }
}

/// GPU compiler/executor boundary.
///
/// Given vertex + fragment source it produces a compiled program, and it
/// can draw a program over a source surface into a target buffer.
pub trait RenderBackend: ShaderCompiler {
    /// Draw `program` over `source` into `target`, binding `params` as
    /// uniforms.
    fn render(
        &mut self,
        program: ProgramHandle,
        source: &Surface,
        params: &ShaderParams,
        target: &mut RenderBuffer,
    );
}

/// Headless stand-in for a GPU backend.
///
/// Compilation validates the fragment source the way a driver's front
/// end would reject obvious garbage; rendering samples the source into
/// the target with nearest-neighbor scaling. Suitable for tests and for
/// running the graph without a display.
#[derive(Debug, Default)]
pub struct SoftwareBackend {
    next_program: u64,
}

impl ShaderCompiler for SoftwareBackend {
    fn compile(&mut self, _vertex: &str, fragment: &str) -> Result<ProgramHandle, CompileError> {
        if fragment.trim().is_empty() {
            return Err(CompileError("empty fragment source".into()));
        }
        if !fragment.contains("main") {
            return Err(CompileError("fragment source has no main entry point".into()));
        }
        self.next_program += 1;
        Ok(ProgramHandle(self.next_program))
    }
}

impl RenderBackend for SoftwareBackend {
    fn render(
        &mut self,
        _program: ProgramHandle,
        source: &Surface,
        _params: &ShaderParams,
        target: &mut RenderBuffer,
    ) {
        let (tw, th) = (target.width() as usize, target.height() as usize);
        let (sw, sh) = (source.width() as usize, source.height() as usize);
        let src = source.pixels();
        let dst = target.pixels_mut();
        for y in 0..th {
            let sy = y * sh / th;
            for x in 0..tw {
                let sx = x * sw / tw;
                let s = (sy * sw + sx) * 4;
                let d = (y * tw + x) * 4;
                dst[d..d + 4].copy_from_slice(&src[s..s + 4]);
            }
        }
    }
}

/// Runs fragment shaders over source surfaces into cached render
/// buffers, sharing compiled programs across frames and bounding live
/// reprocessing to the throttle window.
pub struct ShaderProcessor {
    backend: Box<dyn RenderBackend>,
    programs: ShaderCompileCache,
    buffers: RenderBufferCache,
    throttle: ThrottleGovernor,
}

impl ShaderProcessor {
    /// Create a processor over the given backend.
    pub fn new(backend: Box<dyn RenderBackend>) -> Self {
        Self {
            backend,
            programs: ShaderCompileCache::new(),
            buffers: RenderBufferCache::new(),
            throttle: ThrottleGovernor::new(),
        }
    }

    /// Create a processor over the built-in software backend.
    pub fn software() -> Self {
        Self::new(Box::new(SoftwareBackend::default()))
    }

    /// Process `source_surface` with `fragment_src` into the buffer for
    /// `output_id`.
    ///
    /// Returns a handle to the rendered output; the source handle itself
    /// when compilation fails (passthrough); `None` when the target
    /// buffer cannot be allocated, skipping this output for the cycle.
    /// Live sources inside the throttle window get the previous frame
    /// back unchanged.
    pub fn process(
        &mut self,
        source: &TextureHandle,
        source_surface: &Surface,
        fragment_src: &str,
        params: &ShaderParams,
        output_id: &ResourceId,
        now_millis: u64,
    ) -> Option<TextureHandle> {
        if !self
            .throttle
            .should_process(output_id, source.is_live(), now_millis)
        {
            if let Some(buffer) = self.buffers.get(output_id) {
                tracing::debug!("reusing throttled frame for {output_id}");
                return Some(rendered_handle(output_id, buffer));
            }
            // Nothing to reuse yet; render a first frame anyway.
            self.throttle.record(output_id, now_millis);
        }

        let program = match self
            .programs
            .get_or_compile(&mut *self.backend, DEFAULT_VERTEX_SHADER, fragment_src)
        {
            Ok(program) => program,
            Err(err) => {
                tracing::warn!("{err}; passing {} through unprocessed", source.resource);
                return Some(source.clone());
            }
        };

        let buffer = match self
            .buffers
            .acquire(output_id, source_surface.width(), source_surface.height())
        {
            Ok(buffer) => buffer,
            Err(err) => {
                tracing::warn!("{err}; skipping output this cycle");
                return None;
            }
        };

        self.backend.render(program, source_surface, params, buffer);
        buffer.advance_frame();
        Some(rendered_handle(output_id, buffer))
    }

    /// The render buffer behind an output, if one has been drawn.
    pub fn buffer(&self, output_id: &ResourceId) -> Option<&RenderBuffer> {
        self.buffers.get(output_id)
    }

    /// Free everything held for `output_id` (buffer and throttle
    /// history). Called when the owning node is removed.
    pub fn release_output(&mut self, output_id: &ResourceId) {
        self.buffers.release(output_id);
        self.throttle.forget(output_id);
    }

    /// Number of compiled programs currently shared across frames.
    pub fn program_count(&self) -> usize {
        self.programs.len()
    }
}

fn rendered_handle(output_id: &ResourceId, buffer: &RenderBuffer) -> TextureHandle {
    TextureHandle {
        resource: output_id.clone(),
        origin: TextureOrigin::Rendered,
        width: buffer.width(),
        height: buffer.height(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn live_source() -> (TextureHandle, Surface) {
        let surface = Surface::solid(8, 8, [10, 20, 30, 255]);
        let handle = TextureHandle {
            resource: ResourceId::new("video-a"),
            origin: TextureOrigin::Video,
            width: 8,
            height: 8,
        };
        (handle, surface)
    }

    const FRAG: &str = "void main() { gl_FragColor = vec4(1.0); }";

    #[test]
    fn renders_and_reports_rendered_origin() {
        let mut proc = ShaderProcessor::software();
        let (handle, surface) = live_source();
        let out = ResourceId::new("out1");

        let result = proc
            .process(&handle, &surface, FRAG, &ShaderParams::default(), &out, 0)
            .unwrap();
        assert_eq!(result.origin, TextureOrigin::Rendered);
        assert_eq!(result.resource, out);
        assert_eq!(proc.buffer(&out).unwrap().frame_index(), 1);
        assert_eq!(proc.buffer(&out).unwrap().pixels()[0..4], [10, 20, 30, 255]);
    }

    #[test]
    fn throttled_live_source_reuses_previous_frame() {
        let mut proc = ShaderProcessor::software();
        let (handle, surface) = live_source();
        let out = ResourceId::new("out1");
        let params = ShaderParams::default();

        proc.process(&handle, &surface, FRAG, &params, &out, 0).unwrap();
        proc.process(&handle, &surface, FRAG, &params, &out, 10).unwrap();
        assert_eq!(proc.buffer(&out).unwrap().frame_index(), 1);

        proc.process(&handle, &surface, FRAG, &params, &out, 50).unwrap();
        assert_eq!(proc.buffer(&out).unwrap().frame_index(), 2);
    }

    #[test]
    fn compile_failure_passes_source_through() {
        let mut proc = ShaderProcessor::software();
        let (handle, surface) = live_source();
        let out = ResourceId::new("out1");

        let result = proc
            .process(&handle, &surface, "   ", &ShaderParams::default(), &out, 0)
            .unwrap();
        assert_eq!(result, handle);
        assert!(proc.buffer(&out).is_none());
    }

    #[test]
    fn programs_are_shared_across_outputs() {
        let mut proc = ShaderProcessor::software();
        let (handle, surface) = live_source();
        let params = ShaderParams::default();

        proc.process(&handle, &surface, FRAG, &params, &ResourceId::new("a"), 0);
        proc.process(&handle, &surface, FRAG, &params, &ResourceId::new("b"), 0);
        assert_eq!(proc.program_count(), 1);
    }
}
