// SPDX-License-Identifier: MIT OR Apache-2.0
//! Media resource model: identities, readiness states and surfaces.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Identifier for a media resource or a rendered output.
///
/// Resource ids are strings because they are derived from node ids
/// (`image-<node>`, `shader-<node>`) by the runtime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceId(String);

impl ResourceId {
    /// Create a resource id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Kind of an externally-sourced media resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaKind {
    /// A still image decoded once.
    StillImage,
    /// A video whose frames update continuously.
    Video,
    /// A live camera feed.
    Camera,
}

impl MediaKind {
    /// Whether this kind updates continuously over time.
    pub fn is_live(self) -> bool {
        matches!(self, Self::Video | Self::Camera)
    }
}

/// A decoded, readable rgba surface.
///
/// Pixels are shared so handles can be passed around without copying
/// frame data.
#[derive(Debug, Clone)]
pub struct Surface {
    width: u32,
    height: u32,
    pixels: Arc<[u8]>,
}

impl Surface {
    /// Wrap raw rgba pixel data. `pixels` must hold `width * height * 4`
    /// bytes.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(pixels.len(), (width as usize) * (height as usize) * 4);
        Self {
            width,
            height,
            pixels: pixels.into(),
        }
    }

    /// A single-color surface, handy for tests and placeholder frames.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = rgba.repeat((width as usize) * (height as usize));
        Self::from_pixels(width, height, pixels)
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The rgba pixel data, row-major.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

/// Readiness of a media resource.
#[derive(Debug, Clone)]
pub enum ResourceState {
    /// A load has been issued and has not completed yet.
    Loading,
    /// The decoded surface is available.
    Ready(Surface),
    /// The load failed; dependents see an absent value.
    Failed(String),
}

/// An externally-sourced readable resource tracked by the cache.
#[derive(Debug, Clone)]
pub struct MediaResource {
    /// Resource identity.
    pub id: ResourceId,
    /// What produced this resource.
    pub kind: MediaKind,
    /// Current readiness.
    pub state: ResourceState,
}

impl MediaResource {
    pub(crate) fn loading(id: ResourceId, kind: MediaKind) -> Self {
        Self {
            id,
            kind,
            state: ResourceState::Loading,
        }
    }

    /// Whether the surface is available.
    pub fn is_ready(&self) -> bool {
        matches!(self.state, ResourceState::Ready(_))
    }

    /// Width and height, once known.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.surface().map(|s| (s.width(), s.height()))
    }

    /// The decoded surface, if ready.
    pub fn surface(&self) -> Option<&Surface> {
        match &self.state {
            ResourceState::Ready(surface) => Some(surface),
            _ => None,
        }
    }

    /// A lightweight handle to this resource, if ready.
    pub fn handle(&self) -> Option<TextureHandle> {
        let surface = self.surface()?;
        Some(TextureHandle {
            resource: self.id.clone(),
            origin: self.kind.into(),
            width: surface.width(),
            height: surface.height(),
        })
    }
}

/// Where the pixels behind a texture handle come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextureOrigin {
    /// A decoded still image.
    Still,
    /// A video frame stream.
    Video,
    /// A live camera feed.
    Camera,
    /// A render buffer produced by image processing.
    Rendered,
}

impl From<MediaKind> for TextureOrigin {
    fn from(kind: MediaKind) -> Self {
        match kind {
            MediaKind::StillImage => Self::Still,
            MediaKind::Video => Self::Video,
            MediaKind::Camera => Self::Camera,
        }
    }
}

/// Descriptor of a drawable surface, cheap to clone and compare.
///
/// This is what flows through texture ports; the backing pixels stay in
/// the media and render-buffer caches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureHandle {
    /// Cache key of the backing surface.
    pub resource: ResourceId,
    /// What produces the pixels.
    pub origin: TextureOrigin,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl TextureHandle {
    /// Whether the upstream source updates continuously (video, camera).
    pub fn is_live(&self) -> bool {
        matches!(self.origin, TextureOrigin::Video | TextureOrigin::Camera)
    }
}
