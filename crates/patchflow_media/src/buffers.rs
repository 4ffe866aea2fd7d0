// SPDX-License-Identifier: MIT OR Apache-2.0
//! Render buffer cache: one reusable off-screen target per output id.

use crate::resource::{ResourceId, Surface};
use indexmap::IndexMap;

/// Maximum edge length of a render buffer, regardless of what is
/// requested. Keeps per-frame shader work bounded.
pub const MAX_RENDER_EDGE: u32 = 512;

/// Render target allocation failure.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BufferError {
    /// The requested target has a zero dimension.
    #[error("zero-sized render target for {0}")]
    ZeroSized(ResourceId),
}

/// An off-screen rgba render target.
#[derive(Debug)]
pub struct RenderBuffer {
    width: u32,
    height: u32,
    frame_index: u64,
    pixels: Vec<u8>,
}

impl RenderBuffer {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            frame_index: 0,
            pixels: vec![0; (width as usize) * (height as usize) * 4],
        }
    }

    /// Width in pixels (already capped).
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels (already capped).
    pub fn height(&self) -> u32 {
        self.height
    }

    /// How many frames have been rendered into this buffer. Unchanged
    /// when a throttled caller reuses the previous contents.
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// The rgba contents, row-major.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Mutable access for the render backend.
    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Mark that a new frame was rendered into the buffer.
    pub fn advance_frame(&mut self) {
        self.frame_index += 1;
    }

    /// Copy the current contents out as a shareable surface, so a
    /// rendered output can feed another processing stage.
    pub fn to_surface(&self) -> Surface {
        Surface::from_pixels(self.width, self.height, self.pixels.clone())
    }
}

/// Owns one [`RenderBuffer`] per logical output id.
#[derive(Debug, Default)]
pub struct RenderBufferCache {
    buffers: IndexMap<ResourceId, RenderBuffer>,
}

impl RenderBufferCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the buffer for `output_id`, allocating or reallocating when
    /// the capped dimensions differ from the current allocation.
    ///
    /// Dimensions are capped at [`MAX_RENDER_EDGE`] per axis; preserving
    /// aspect ratio is the caller's concern.
    pub fn acquire(
        &mut self,
        output_id: &ResourceId,
        width: u32,
        height: u32,
    ) -> Result<&mut RenderBuffer, BufferError> {
        let width = width.min(MAX_RENDER_EDGE);
        let height = height.min(MAX_RENDER_EDGE);
        if width == 0 || height == 0 {
            return Err(BufferError::ZeroSized(output_id.clone()));
        }

        let stale = self
            .buffers
            .get(output_id)
            .is_some_and(|b| b.width != width || b.height != height);
        if stale {
            self.buffers.swap_remove(output_id);
        }

        Ok(self
            .buffers
            .entry(output_id.clone())
            .or_insert_with(|| RenderBuffer::new(width, height)))
    }

    /// Look up a buffer without (re)allocating.
    pub fn get(&self, output_id: &ResourceId) -> Option<&RenderBuffer> {
        self.buffers.get(output_id)
    }

    /// Free the buffer for `output_id` when its owning node goes away.
    pub fn release(&mut self, output_id: &ResourceId) -> bool {
        self.buffers.swap_remove(output_id).is_some()
    }

    /// Number of live buffers.
    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    /// Whether no buffers are allocated.
    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }
}
