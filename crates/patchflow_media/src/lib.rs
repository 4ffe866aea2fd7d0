// SPDX-License-Identifier: MIT OR Apache-2.0
//! Media layer for the patchflow dataflow runtime.
//!
//! Tracks externally-sourced surfaces (still images, video frames,
//! camera feeds) with asynchronous readiness, memoizes compiled shader
//! programs by their source text, owns one reusable render buffer per
//! output, and bounds how often live sources are reprocessed.
//!
//! All caches are owned by one runtime instance and accessed from its
//! control loop; the only other thread is the loader worker, which
//! communicates exclusively through channels.

pub mod buffers;
pub mod cache;
pub mod compile;
pub mod loader;
pub mod processor;
pub mod resource;
pub mod throttle;

pub use buffers::{BufferError, RenderBuffer, RenderBufferCache, MAX_RENDER_EDGE};
pub use cache::{MediaResourceCache, RequestStatus};
pub use compile::{CompileError, ProgramHandle, ShaderCompileCache, ShaderCompiler};
pub use loader::{FileLoader, LoadError, MediaLoader};
pub use processor::{RenderBackend, ShaderParams, ShaderProcessor, SoftwareBackend};
pub use resource::{
    MediaKind, MediaResource, ResourceId, ResourceState, Surface, TextureHandle, TextureOrigin,
};
pub use throttle::{ThrottleGovernor, LIVE_FRAME_INTERVAL_MS};
