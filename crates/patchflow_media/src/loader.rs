// SPDX-License-Identifier: MIT OR Apache-2.0
//! Resource loader boundary.
//!
//! Loaders run on the cache's worker thread and turn a locator string
//! into a decoded surface. Image, video and camera backends are
//! interchangeable implementations of the same capability.

use crate::resource::{MediaKind, Surface};
use std::path::Path;

/// Errors reported by a resource load.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LoadError {
    /// The locator does not resolve to anything.
    #[error("resource not found: {0}")]
    NotFound(String),
    /// The loader cannot produce this kind of resource.
    #[error("unsupported media: {0}")]
    Unsupported(String),
    /// The bytes could not be decoded.
    #[error("failed to decode media: {0}")]
    Decode(String),
    /// Reading the underlying source failed.
    #[error("io error: {0}")]
    Io(String),
}

/// Produces a decodable surface from a kind and a locator string.
///
/// Called from the loader worker thread; implementations may block.
pub trait MediaLoader: Send {
    /// Load and decode the resource behind `locator`.
    fn load(&self, kind: MediaKind, locator: &str) -> Result<Surface, LoadError>;
}

/// Built-in loader decoding still images from the filesystem.
///
/// Video and camera capture need platform machinery this crate does not
/// carry; embedders provide their own [`MediaLoader`] for those.
#[derive(Debug, Default)]
pub struct FileLoader;

impl MediaLoader for FileLoader {
    fn load(&self, kind: MediaKind, locator: &str) -> Result<Surface, LoadError> {
        match kind {
            MediaKind::StillImage => decode_image(locator),
            MediaKind::Video => Err(LoadError::Unsupported(
                "video decoding requires an embedder-supplied loader".into(),
            )),
            MediaKind::Camera => Err(LoadError::Unsupported(
                "camera capture requires an embedder-supplied loader".into(),
            )),
        }
    }
}

fn decode_image(locator: &str) -> Result<Surface, LoadError> {
    let path = Path::new(locator);
    if !path.exists() {
        return Err(LoadError::NotFound(locator.to_string()));
    }

    let data = std::fs::read(path).map_err(|e| LoadError::Io(e.to_string()))?;
    let img = image::load_from_memory(&data).map_err(|e| LoadError::Decode(e.to_string()))?;

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(LoadError::Decode(format!("empty image: {locator}")));
    }

    Ok(Surface::from_pixels(width, height, rgba.into_raw()))
}
