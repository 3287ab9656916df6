// SPDX-License-Identifier: MIT OR Apache-2.0
//! Component-wise access to float-based value kinds.
//!
//! Node kinds that work on "any scalar" inputs write one generic closure
//! over [`Lanes`] and let [`with_lanes!`] pick the concrete type from the
//! resolved [`ValueType`](crate::ValueType).

use crate::processor::Output;
use crate::value::Color;
use glam::{Vec2, Vec3, Vec4};

/// A float-based value kind viewed as up to four lanes
pub trait Lanes: Output + Default {
    /// Number of meaningful lanes
    const LANES: usize;

    /// Pack lanes; unused lanes are zero
    fn to_lanes(self) -> [f32; 4];

    /// Unpack lanes; extra lanes are ignored
    fn from_lanes(lanes: [f32; 4]) -> Self;

    /// Same value in every lane
    fn splat(v: f32) -> Self {
        Self::from_lanes([v; 4])
    }

    /// Apply `f` to every lane
    fn map(self, f: impl Fn(f32) -> f32) -> Self {
        Self::from_lanes(self.to_lanes().map(f))
    }

    /// Combine two values lane by lane
    fn zip(self, other: Self, f: impl Fn(f32, f32) -> f32) -> Self {
        let a = self.to_lanes();
        let b = other.to_lanes();
        Self::from_lanes([f(a[0], b[0]), f(a[1], b[1]), f(a[2], b[2]), f(a[3], b[3])])
    }

    /// Dot product over the meaningful lanes
    fn dot(self, other: Self) -> f32 {
        let a = self.to_lanes();
        let b = other.to_lanes();
        (0..Self::LANES).map(|i| a[i] * b[i]).sum()
    }

    /// Euclidean length
    fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Unit-length copy, or zero when too short to normalize
    fn normalize_or_zero(self) -> Self {
        let len = self.length();
        if len > 1e-5 {
            self.map(|v| v / len)
        } else {
            Self::default()
        }
    }
}

impl Lanes for f32 {
    const LANES: usize = 1;

    fn to_lanes(self) -> [f32; 4] {
        [self, 0.0, 0.0, 0.0]
    }

    fn from_lanes(lanes: [f32; 4]) -> Self {
        lanes[0]
    }
}

impl Lanes for Vec2 {
    const LANES: usize = 2;

    fn to_lanes(self) -> [f32; 4] {
        [self.x, self.y, 0.0, 0.0]
    }

    fn from_lanes(lanes: [f32; 4]) -> Self {
        Vec2::new(lanes[0], lanes[1])
    }
}

impl Lanes for Vec3 {
    const LANES: usize = 3;

    fn to_lanes(self) -> [f32; 4] {
        [self.x, self.y, self.z, 0.0]
    }

    fn from_lanes(lanes: [f32; 4]) -> Self {
        Vec3::new(lanes[0], lanes[1], lanes[2])
    }
}

impl Lanes for Vec4 {
    const LANES: usize = 4;

    fn to_lanes(self) -> [f32; 4] {
        self.to_array()
    }

    fn from_lanes(lanes: [f32; 4]) -> Self {
        Vec4::from_array(lanes)
    }
}

impl Lanes for Color {
    const LANES: usize = 4;

    fn to_lanes(self) -> [f32; 4] {
        self.to_array()
    }

    fn from_lanes(lanes: [f32; 4]) -> Self {
        Color::from(lanes)
    }
}

/// Scalar operand that widens to float
pub trait Scalar: Output {
    /// Value as float
    fn to_f32(self) -> f32;
}

impl Scalar for f32 {
    fn to_f32(self) -> f32 {
        self
    }
}

impl Scalar for i32 {
    fn to_f32(self) -> f32 {
        self as f32
    }
}

/// Run `$body` with `$t` bound to the [`Lanes`] type for a [`ValueType`](crate::ValueType)
///
/// Evaluates to `Some(body)` for float, vector and color kinds, `None` otherwise.
macro_rules! with_lanes {
    ($ty:expr, |$t:ident| $body:expr) => {
        match $ty {
            $crate::value::ValueType::Float => {
                type $t = f32;
                Some($body)
            }
            $crate::value::ValueType::Vector2 => {
                type $t = ::glam::Vec2;
                Some($body)
            }
            $crate::value::ValueType::Vector3 => {
                type $t = ::glam::Vec3;
                Some($body)
            }
            $crate::value::ValueType::Vector4 => {
                type $t = ::glam::Vec4;
                Some($body)
            }
            $crate::value::ValueType::Color => {
                type $t = $crate::value::Color;
                Some($body)
            }
            _ => None,
        }
    };
}

/// Like [`with_lanes!`] restricted to float and the three plain vectors
macro_rules! with_vectors {
    ($ty:expr, |$t:ident| $body:expr) => {
        match $ty {
            $crate::value::ValueType::Float => {
                type $t = f32;
                Some($body)
            }
            $crate::value::ValueType::Vector2 => {
                type $t = ::glam::Vec2;
                Some($body)
            }
            $crate::value::ValueType::Vector3 => {
                type $t = ::glam::Vec3;
                Some($body)
            }
            $crate::value::ValueType::Vector4 => {
                type $t = ::glam::Vec4;
                Some($body)
            }
            _ => None,
        }
    };
}

pub(crate) use {with_lanes, with_vectors};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueType;

    #[test]
    fn test_lane_ops() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(v.map(|x| x * 2.0), Vec3::new(2.0, 4.0, 6.0));
        assert_eq!(v.zip(Vec3::splat(1.0), |a, b| a + b), Vec3::new(2.0, 3.0, 4.0));
        assert_eq!(Vec2::new(3.0, 4.0).length(), 5.0);
        assert_eq!(Vec2::ZERO.normalize_or_zero(), Vec2::ZERO);
        assert_eq!(<f32 as Lanes>::splat(2.0), 2.0);
    }

    #[test]
    fn test_with_lanes_dispatch() {
        let lanes = |ty: ValueType| with_lanes!(ty, |T| T::LANES);
        assert_eq!(lanes(ValueType::Float), Some(1));
        assert_eq!(lanes(ValueType::Vector3), Some(3));
        assert_eq!(lanes(ValueType::Color), Some(4));
        assert_eq!(lanes(ValueType::Int), None);
        assert_eq!(with_vectors!(ValueType::Color, |T| T::LANES), None);
    }
}
