// SPDX-License-Identifier: MIT OR Apache-2.0
//! The closed value union flowing through ports.

use patchflow_media::TextureHandle;
use serde::{Deserialize, Serialize};

/// Data type tag a port carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    /// Floating point number.
    Number,
    /// Text.
    Text,
    /// Boolean.
    Boolean,
    /// 2D vector.
    Vector,
    /// RGBA color.
    Color,
    /// Drawable texture.
    Texture,
    /// Wildcard matching every concrete type at connect time.
    Any,
}

impl DataType {
    /// Whether a connection between this type and `other` is allowed.
    ///
    /// Types match only when equal or when either side is [`Any`];
    /// there are no implicit conversions.
    ///
    /// [`Any`]: DataType::Any
    pub fn accepts(self, other: DataType) -> bool {
        self == DataType::Any || other == DataType::Any || self == other
    }
}

/// A value held in a port slot or cached as a node output.
///
/// `Absent` is the defined state of an input with no incoming
/// connection or whose source has not produced anything yet; kind
/// update functions treat it as a default, never as an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Floating point number.
    Number(f64),
    /// Text.
    Text(String),
    /// Boolean.
    Boolean(bool),
    /// 2D vector.
    Vector([f64; 2]),
    /// RGBA color.
    Color([f32; 4]),
    /// Drawable texture descriptor.
    Texture(TextureHandle),
    /// No value.
    Absent,
}

impl Value {
    /// The type tag of this value, or `None` for `Absent`.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Self::Number(_) => Some(DataType::Number),
            Self::Text(_) => Some(DataType::Text),
            Self::Boolean(_) => Some(DataType::Boolean),
            Self::Vector(_) => Some(DataType::Vector),
            Self::Color(_) => Some(DataType::Color),
            Self::Texture(_) => Some(DataType::Texture),
            Self::Absent => None,
        }
    }

    /// Whether this is the absent sentinel.
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// The number inside, if any.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The number inside, or `default`.
    pub fn number_or(&self, default: f64) -> f64 {
        self.as_number().unwrap_or(default)
    }

    /// The text inside, if any.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The texture handle inside, if any.
    pub fn as_texture(&self) -> Option<&TextureHandle> {
        match self {
            Self::Texture(handle) => Some(handle),
            _ => None,
        }
    }
}
