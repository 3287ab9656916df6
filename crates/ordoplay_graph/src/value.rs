// SPDX-License-Identifier: MIT OR Apache-2.0
//! Value kinds that flow along links, and their runtime representations.

use crate::error::UnknownValueType;
use glam::{Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of kinds a link or node output can carry
///
/// `AnyScalar` and `AnyVector` only appear on unresolved input
/// declarations. `Error` taints everything downstream of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ValueType {
    /// No value (void outputs, unconnected inputs)
    #[default]
    None,
    /// Invalid edge or node
    Error,
    /// Placeholder accepting any scalar value kind
    AnyScalar,
    /// Placeholder accepting any vector kind
    AnyVector,
    /// 32-bit float
    Float,
    /// 2D vector
    Vector2,
    /// 3D vector
    Vector3,
    /// 4D vector, also used for quaternions
    Vector4,
    /// RGBA color
    Color,
    /// 32-bit integer
    Int,
    /// Boolean value
    Bool,
    /// Opaque texture handle
    Texture,
    /// Opaque mesh handle
    Mesh,
    /// Parametric float curve
    Curve,
    /// Parametric color ramp
    Ramp,
}

/// Static metadata for one value kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeConfig {
    /// Vector-like kind (component-wise math applies)
    pub is_vector: bool,
    /// Scalar value kind (float, int, vectors, color)
    pub is_value: bool,
    /// Scalar value kind other than int
    pub is_value_except_int: bool,
}

impl TypeConfig {
    const fn new(is_vector: bool, is_value: bool, is_value_except_int: bool) -> Self {
        Self {
            is_vector,
            is_value,
            is_value_except_int,
        }
    }
}

const NOT_VALUE: TypeConfig = TypeConfig::new(false, false, false);

/// Per-kind metadata, indexed by discriminant
const CONFIGS: [TypeConfig; ValueType::COUNT] = [
    NOT_VALUE,                          // None
    NOT_VALUE,                          // Error
    TypeConfig::new(false, true, true), // AnyScalar
    TypeConfig::new(true, true, true),  // AnyVector
    TypeConfig::new(false, true, true), // Float
    TypeConfig::new(true, true, true),  // Vector2
    TypeConfig::new(true, true, true),  // Vector3
    TypeConfig::new(true, true, true),  // Vector4
    TypeConfig::new(true, true, true),  // Color
    TypeConfig::new(false, true, false), // Int
    NOT_VALUE,                          // Bool
    NOT_VALUE,                          // Texture
    NOT_VALUE,                          // Mesh
    NOT_VALUE,                          // Curve
    NOT_VALUE,                          // Ramp
];

impl ValueType {
    /// Number of kinds in the table
    pub const COUNT: usize = 15;

    /// Every kind in discriminant order
    pub const ALL: [ValueType; Self::COUNT] = [
        Self::None,
        Self::Error,
        Self::AnyScalar,
        Self::AnyVector,
        Self::Float,
        Self::Vector2,
        Self::Vector3,
        Self::Vector4,
        Self::Color,
        Self::Int,
        Self::Bool,
        Self::Texture,
        Self::Mesh,
        Self::Curve,
        Self::Ramp,
    ];

    /// Look up a kind by discriminant
    pub fn from_index(index: usize) -> Result<Self, UnknownValueType> {
        Self::ALL.get(index).copied().ok_or(UnknownValueType(index))
    }

    /// Stable discriminant
    pub fn index(self) -> usize {
        self as usize
    }

    /// Static metadata for this kind
    pub fn config(self) -> TypeConfig {
        CONFIGS[self.index()]
    }

    /// Check if this kind is vector-like
    pub fn is_vector(self) -> bool {
        self.config().is_vector
    }

    /// Check if this kind is a scalar value kind
    pub fn is_value(self) -> bool {
        self.config().is_value
    }

    /// Check if this kind is a scalar value kind other than int
    pub fn is_value_except_int(self) -> bool {
        self.config().is_value_except_int
    }

    /// Check if this kind is float or int
    pub fn is_float_or_int(self) -> bool {
        matches!(self, Self::Float | Self::Int)
    }

    /// Number of float lanes for scalar value kinds
    pub fn components(self) -> usize {
        match self {
            Self::Float | Self::Int | Self::AnyScalar => 1,
            Self::Vector2 => 2,
            Self::Vector3 => 3,
            Self::Vector4 | Self::Color | Self::AnyVector => 4,
            _ => 0,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// RGBA color in linear space
///
/// Channels are not clamped, so HDR values pass through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Red
    pub r: f32,
    /// Green
    pub g: f32,
    /// Blue
    pub b: f32,
    /// Alpha
    pub a: f32,
}

impl Default for Color {
    fn default() -> Self {
        Self::rgba(0.0, 0.0, 0.0, 0.0)
    }
}

impl Color {
    /// Opaque white
    pub const WHITE: Self = Self::rgba(1.0, 1.0, 1.0, 1.0);

    /// Create a color from channels
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Channels as an array
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Convert RGB to `(hue, saturation, value)`, each in `[0, 1]` for LDR input
    pub fn to_hsv(self) -> Vec3 {
        let max = self.r.max(self.g).max(self.b);
        let min = self.r.min(self.g).min(self.b);
        let delta = max - min;
        if max <= 0.0 || delta <= 0.0 {
            return Vec3::new(0.0, 0.0, max.max(0.0));
        }

        let hue = if self.r == max {
            (self.g - self.b) / delta
        } else if self.g == max {
            2.0 + (self.b - self.r) / delta
        } else {
            4.0 + (self.r - self.g) / delta
        };
        Vec3::new((hue / 6.0).rem_euclid(1.0), delta / max, max)
    }

    /// Build an opaque color from hue, saturation and value
    ///
    /// Hue wraps; saturation and value are not clamped.
    pub fn from_hsv(h: f32, s: f32, v: f32) -> Self {
        if s == 0.0 {
            return Self::rgba(v, v, v, 1.0);
        }
        let h6 = h.rem_euclid(1.0) * 6.0;
        let sector = h6.floor();
        let f = h6 - sector;
        let p = v * (1.0 - s);
        let q = v * (1.0 - s * f);
        let t = v * (1.0 - s * (1.0 - f));
        let (r, g, b) = match sector as i32 {
            0 => (v, t, p),
            1 => (q, v, p),
            2 => (p, v, t),
            3 => (p, q, v),
            4 => (t, p, v),
            _ => (v, p, q),
        };
        Self::rgba(r, g, b, 1.0)
    }
}

impl From<[f32; 4]> for Color {
    fn from(c: [f32; 4]) -> Self {
        Self::rgba(c[0], c[1], c[2], c[3])
    }
}

impl From<Color> for Vec4 {
    fn from(c: Color) -> Self {
        Vec4::new(c.r, c.g, c.b, c.a)
    }
}

impl From<Vec4> for Color {
    fn from(v: Vec4) -> Self {
        Self::rgba(v.x, v.y, v.z, v.w)
    }
}

/// Opaque texture handle owned by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TextureHandle(pub u64);

/// Opaque mesh handle owned by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct MeshHandle(pub u64);

/// A single evaluated value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Float value
    Float(f32),
    /// Integer value
    Int(i32),
    /// Boolean value
    Bool(bool),
    /// 2D vector
    Vector2(Vec2),
    /// 3D vector
    Vector3(Vec3),
    /// 4D vector
    Vector4(Vec4),
    /// RGBA color
    Color(Color),
    /// Texture handle
    Texture(TextureHandle),
    /// Mesh handle
    Mesh(MeshHandle),
}

impl Value {
    /// Kind of this value
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Float(_) => ValueType::Float,
            Self::Int(_) => ValueType::Int,
            Self::Bool(_) => ValueType::Bool,
            Self::Vector2(_) => ValueType::Vector2,
            Self::Vector3(_) => ValueType::Vector3,
            Self::Vector4(_) => ValueType::Vector4,
            Self::Color(_) => ValueType::Color,
            Self::Texture(_) => ValueType::Texture,
            Self::Mesh(_) => ValueType::Mesh,
        }
    }
}
