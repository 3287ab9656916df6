// SPDX-License-Identifier: MIT OR Apache-2.0
//! Parametric float curves built from tangent keys.

use crate::interpolation::Interpolation;
use serde::{Deserialize, Serialize};

/// How a curve behaves outside its key range
///
/// Discriminants are stable and used by the text serializer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum WrapMode {
    /// Clamp to the nearest end key
    #[default]
    Default = 0,
    /// Clamp to the nearest end key
    Once = 1,
    /// Repeat the key range
    Loop = 2,
    /// Mirror the key range back and forth
    PingPong = 4,
    /// Clamp to the nearest end key
    ClampForever = 8,
}

impl WrapMode {
    /// Look up a wrap mode by its stable discriminant
    pub fn from_index(index: i32) -> Option<Self> {
        match index {
            0 => Some(Self::Default),
            1 => Some(Self::Once),
            2 => Some(Self::Loop),
            4 => Some(Self::PingPong),
            8 => Some(Self::ClampForever),
            _ => None,
        }
    }

    /// Stable discriminant
    pub fn index(self) -> i32 {
        self as i32
    }
}

/// A key on a curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveKey {
    /// Key time
    pub time: f32,
    /// Value at this key
    pub value: f32,
    /// Incoming slope
    pub in_tangent: f32,
    /// Outgoing slope
    pub out_tangent: f32,
    /// Editor tangent mode, carried through untouched
    pub tangent_mode: i32,
}

impl CurveKey {
    /// Create a flat key
    pub fn new(time: f32, value: f32) -> Self {
        Self {
            time,
            value,
            in_tangent: 0.0,
            out_tangent: 0.0,
            tangent_mode: 0,
        }
    }

    /// Set both tangents
    pub fn with_tangents(mut self, in_tangent: f32, out_tangent: f32) -> Self {
        self.in_tangent = in_tangent;
        self.out_tangent = out_tangent;
        self
    }
}

/// Hermite curve over sorted keys
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AnimationCurve {
    /// Behaviour before the first key
    pub pre_wrap: WrapMode,
    /// Behaviour after the last key
    pub post_wrap: WrapMode,
    keys: Vec<CurveKey>,
}

impl AnimationCurve {
    /// Create a curve from keys (sorted by time on insert)
    pub fn new(keys: impl IntoIterator<Item = CurveKey>) -> Self {
        let mut curve = Self::default();
        for key in keys {
            curve.add_key(key);
        }
        curve
    }

    /// Straight line from `(t0, v0)` to `(t1, v1)`
    pub fn linear(t0: f32, v0: f32, t1: f32, v1: f32) -> Self {
        let slope = if t1 == t0 { 0.0 } else { (v1 - v0) / (t1 - t0) };
        Self::new([
            CurveKey::new(t0, v0).with_tangents(slope, slope),
            CurveKey::new(t1, v1).with_tangents(slope, slope),
        ])
    }

    /// Flat curve holding `value` between `t0` and `t1`
    pub fn constant(t0: f32, t1: f32, value: f32) -> Self {
        Self::new([CurveKey::new(t0, value), CurveKey::new(t1, value)])
    }

    /// Keys in time order
    pub fn keys(&self) -> &[CurveKey] {
        &self.keys
    }

    /// Add a key, keeping keys sorted
    pub fn add_key(&mut self, key: CurveKey) {
        let index = self.keys.partition_point(|k| k.time <= key.time);
        self.keys.insert(index, key);
    }

    /// Remove every key
    pub fn clear(&mut self) {
        self.keys.clear();
    }

    /// Get the duration (span between first and last key)
    pub fn duration(&self) -> f32 {
        match (self.keys.first(), self.keys.last()) {
            (Some(first), Some(last)) => last.time - first.time,
            _ => 0.0,
        }
    }

    /// Evaluate the curve at a given time
    pub fn evaluate(&self, time: f32) -> f32 {
        let (Some(first), Some(last)) = (self.keys.first(), self.keys.last()) else {
            return 0.0;
        };
        let span = last.time - first.time;
        if span <= 0.0 {
            return first.value;
        }

        let mode = if time < first.time {
            self.pre_wrap
        } else if time > last.time {
            self.post_wrap
        } else {
            WrapMode::Default
        };
        let time = match mode {
            WrapMode::Loop => first.time + Interpolation::repeat(time - first.time, span),
            WrapMode::PingPong => first.time + Interpolation::ping_pong(time - first.time, span),
            WrapMode::Default | WrapMode::Once | WrapMode::ClampForever => {
                time.clamp(first.time, last.time)
            }
        };

        let (a, b) = self.find_keys(time);
        let dt = b.time - a.time;
        if dt <= 0.0 {
            return b.value;
        }
        // Infinite tangents mark a stepped segment
        if !a.out_tangent.is_finite() || !b.in_tangent.is_finite() {
            return a.value;
        }
        let t = (time - a.time) / dt;
        Interpolation::hermite(a.value, a.out_tangent * dt, b.value, b.in_tangent * dt, t)
    }

    /// Find the keys surrounding a time inside the key range
    fn find_keys(&self, time: f32) -> (&CurveKey, &CurveKey) {
        let next = self
            .keys
            .partition_point(|k| k.time < time)
            .clamp(1, self.keys.len() - 1);
        (&self.keys[next - 1], &self.keys[next])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn test_linear_curve() {
        let curve = AnimationCurve::linear(0.0, 0.0, 1.0, 1.0);
        assert!(approx(curve.evaluate(0.25), 0.25));
        assert!(approx(curve.evaluate(0.5), 0.5));
        assert!(approx(curve.evaluate(2.0), 1.0));
        assert!(approx(curve.evaluate(-1.0), 0.0));
    }

    #[test]
    fn test_empty_and_single_key() {
        assert_eq!(AnimationCurve::default().evaluate(3.0), 0.0);
        let curve = AnimationCurve::new([CurveKey::new(1.0, 7.0)]);
        assert_eq!(curve.evaluate(0.0), 7.0);
    }

    #[test]
    fn test_keys_sorted() {
        let curve = AnimationCurve::new([CurveKey::new(2.0, 1.0), CurveKey::new(0.0, 0.0)]);
        assert_eq!(curve.keys()[0].time, 0.0);
        assert_eq!(curve.duration(), 2.0);
    }

    #[test]
    fn test_loop_wrap() {
        let mut curve = AnimationCurve::linear(0.0, 0.0, 1.0, 1.0);
        curve.post_wrap = WrapMode::Loop;
        assert!(approx(curve.evaluate(1.25), 0.25));
        curve.post_wrap = WrapMode::PingPong;
        assert!(approx(curve.evaluate(1.25), 0.75));
    }

    #[test]
    fn test_stepped_segment() {
        let curve = AnimationCurve::new([
            CurveKey::new(0.0, 2.0).with_tangents(0.0, f32::INFINITY),
            CurveKey::new(1.0, 5.0),
        ]);
        assert_eq!(curve.evaluate(0.9), 2.0);
    }

    #[test]
    fn test_wrap_mode_index() {
        for mode in [WrapMode::Default, WrapMode::Once, WrapMode::Loop, WrapMode::PingPong, WrapMode::ClampForever] {
            assert_eq!(WrapMode::from_index(mode.index()), Some(mode));
        }
        assert_eq!(WrapMode::from_index(3), None);
    }

    #[test]
    fn test_ron_round_trip() {
        let curve = AnimationCurve::linear(0.0, 1.0, 2.0, 3.0);
        let text = ron::ser::to_string_pretty(&curve, ron::ser::PrettyConfig::default()).unwrap();
        let loaded: AnimationCurve = ron::from_str(&text).unwrap();
        assert_eq!(loaded, curve);
    }
}
