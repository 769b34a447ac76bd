// SPDX-License-Identifier: MIT OR Apache-2.0
//! Values produced by tracks: sampled curve values and event payloads.

use serde::{Deserialize, Serialize};

/// Shape of the value a curve track produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CurveKind {
    /// Single float
    Float,
    /// 2D vector
    Vec2,
    /// 3D vector
    Vec3,
    /// 4D vector
    Vec4,
}

impl CurveKind {
    /// Number of curves a segment of this kind owns
    pub fn dimension(&self) -> usize {
        match self {
            Self::Float => 1,
            Self::Vec2 => 2,
            Self::Vec3 => 3,
            Self::Vec4 => 4,
        }
    }

    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Float => "Float",
            Self::Vec2 => "Vec2",
            Self::Vec3 => "Vec3",
            Self::Vec4 => "Vec4",
        }
    }

    /// Parse a kind from its display name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "float" => Some(Self::Float),
            "vec2" => Some(Self::Vec2),
            "vec3" => Some(Self::Vec3),
            "vec4" => Some(Self::Vec4),
            _ => None,
        }
    }
}

/// Family of a track: which segment variant it holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackFamily {
    /// Keyframed curves of the given kind
    Curve(CurveKind),
    /// Point events
    Event,
}

impl TrackFamily {
    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Curve(kind) => kind.name(),
            Self::Event => "Event",
        }
    }
}

/// A sampled curve track value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CurveValue {
    /// Float value
    Float(f32),
    /// 2D vector
    Vec2([f32; 2]),
    /// 3D vector
    Vec3([f32; 3]),
    /// 4D vector
    Vec4([f32; 4]),
}

impl CurveValue {
    /// The kind of this value
    pub fn kind(&self) -> CurveKind {
        match self {
            Self::Float(_) => CurveKind::Float,
            Self::Vec2(_) => CurveKind::Vec2,
            Self::Vec3(_) => CurveKind::Vec3,
            Self::Vec4(_) => CurveKind::Vec4,
        }
    }

    /// Build a value of `kind` from its components.
    ///
    /// Missing components read as `0.0`, extra components are ignored.
    pub fn from_components(kind: CurveKind, components: &[f32]) -> Self {
        let c = |i: usize| components.get(i).copied().unwrap_or(0.0);
        match kind {
            CurveKind::Float => Self::Float(c(0)),
            CurveKind::Vec2 => Self::Vec2([c(0), c(1)]),
            CurveKind::Vec3 => Self::Vec3([c(0), c(1), c(2)]),
            CurveKind::Vec4 => Self::Vec4([c(0), c(1), c(2), c(3)]),
        }
    }

    /// Components as a slice
    pub fn components(&self) -> &[f32] {
        match self {
            Self::Float(v) => std::slice::from_ref(v),
            Self::Vec2(v) => v,
            Self::Vec3(v) => v,
            Self::Vec4(v) => v,
        }
    }

    /// The all-zero value of `kind`
    pub fn zero(kind: CurveKind) -> Self {
        Self::from_components(kind, &[])
    }

    /// The all-one value of `kind`
    pub fn one(kind: CurveKind) -> Self {
        Self::from_components(kind, &[1.0; 4])
    }
}

/// Payload carried by an event segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventPayload {
    /// Text message
    Text(String),
    /// Integer
    Int(i64),
    /// Float
    Float(f32),
    /// 2D vector
    Vec2([f32; 2]),
    /// 3D vector
    Vec3([f32; 3]),
}

impl std::fmt::Display for EventPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(text) => write!(f, "\"{text}\""),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Vec2([x, y]) => write!(f, "({x}, {y})"),
            Self::Vec3([x, y, z]) => write!(f, "({x}, {y}, {z})"),
        }
    }
}
