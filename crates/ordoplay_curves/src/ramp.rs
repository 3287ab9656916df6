// SPDX-License-Identifier: MIT OR Apache-2.0
//! Color ramps: independent color and alpha key lists.

use crate::interpolation::Interpolation;
use serde::{Deserialize, Serialize};

/// How a ramp fills the space between keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RampMode {
    /// Linear blend between neighbouring keys
    #[default]
    Blend = 0,
    /// Each key's color holds from the previous key up to its own time
    Fixed = 1,
}

impl RampMode {
    /// Look up a mode by its stable discriminant
    pub fn from_index(index: i32) -> Option<Self> {
        match index {
            0 => Some(Self::Blend),
            1 => Some(Self::Fixed),
            _ => None,
        }
    }

    /// Stable discriminant
    pub fn index(self) -> i32 {
        self as i32
    }
}

/// A color key (alpha is carried but ignored on evaluation)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorKey {
    /// Key time in `[0, 1]`
    pub time: f32,
    /// RGBA color
    pub color: [f32; 4],
}

/// An alpha key
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlphaKey {
    /// Key time in `[0, 1]`
    pub time: f32,
    /// Alpha value
    pub alpha: f32,
}

/// Color ramp sampled by a scalar position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorRamp {
    /// Interpolation mode
    pub mode: RampMode,
    color_keys: Vec<ColorKey>,
    alpha_keys: Vec<AlphaKey>,
}

impl Default for ColorRamp {
    fn default() -> Self {
        Self::new(
            RampMode::Blend,
            [
                ColorKey { time: 0.0, color: [1.0; 4] },
                ColorKey { time: 1.0, color: [1.0; 4] },
            ],
            [
                AlphaKey { time: 0.0, alpha: 1.0 },
                AlphaKey { time: 1.0, alpha: 1.0 },
            ],
        )
    }
}

impl ColorRamp {
    /// Create a ramp; keys are sorted by time
    pub fn new(
        mode: RampMode,
        color_keys: impl IntoIterator<Item = ColorKey>,
        alpha_keys: impl IntoIterator<Item = AlphaKey>,
    ) -> Self {
        let mut color_keys: Vec<ColorKey> = color_keys.into_iter().collect();
        let mut alpha_keys: Vec<AlphaKey> = alpha_keys.into_iter().collect();
        color_keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        alpha_keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self {
            mode,
            color_keys,
            alpha_keys,
        }
    }

    /// Color keys in time order
    pub fn color_keys(&self) -> &[ColorKey] {
        &self.color_keys
    }

    /// Alpha keys in time order
    pub fn alpha_keys(&self) -> &[AlphaKey] {
        &self.alpha_keys
    }

    /// Sample the ramp as RGBA
    pub fn evaluate(&self, time: f32) -> [f32; 4] {
        let rgb = sample(&self.color_keys, time, self.mode, |k| k.time, |k| k.color)
            .unwrap_or([1.0; 4]);
        let alpha = sample(&self.alpha_keys, time, self.mode, |k| k.time, |k| [k.alpha; 4])
            .map_or(1.0, |a| a[0]);
        [rgb[0], rgb[1], rgb[2], alpha]
    }
}

fn sample<K>(
    keys: &[K],
    time: f32,
    mode: RampMode,
    key_time: impl Fn(&K) -> f32,
    key_value: impl Fn(&K) -> [f32; 4],
) -> Option<[f32; 4]> {
    let first = keys.first()?;
    let last = keys.last()?;
    if time <= key_time(first) {
        return Some(key_value(first));
    }
    if time >= key_time(last) {
        return Some(key_value(last));
    }

    let next = keys.partition_point(|k| key_time(k) < time);
    let a = &keys[next - 1];
    let b = &keys[next];
    match mode {
        RampMode::Fixed => Some(key_value(b)),
        RampMode::Blend => {
            let span = key_time(b) - key_time(a);
            if span <= 0.0 {
                return Some(key_value(b));
            }
            let t = (time - key_time(a)) / span;
            Some(Interpolation::lerp_rgba(key_value(a), key_value(b), t))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn black_to_red() -> ColorRamp {
        ColorRamp::new(
            RampMode::Blend,
            [
                ColorKey { time: 0.0, color: [0.0, 0.0, 0.0, 1.0] },
                ColorKey { time: 1.0, color: [1.0, 0.0, 0.0, 1.0] },
            ],
            [
                AlphaKey { time: 0.0, alpha: 0.0 },
                AlphaKey { time: 1.0, alpha: 1.0 },
            ],
        )
    }

    #[test]
    fn test_default_is_white() {
        assert_eq!(ColorRamp::default().evaluate(0.3), [1.0; 4]);
    }

    #[test]
    fn test_blend() {
        let ramp = black_to_red();
        let c = ramp.evaluate(0.5);
        assert!((c[0] - 0.5).abs() < 1e-6);
        assert!((c[3] - 0.5).abs() < 1e-6);
        assert_eq!(ramp.evaluate(-1.0), [0.0, 0.0, 0.0, 0.0]);
        assert_eq!(ramp.evaluate(2.0), [1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_fixed() {
        let mut ramp = black_to_red();
        ramp.mode = RampMode::Fixed;
        assert_eq!(ramp.evaluate(0.25), [1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_mode_index() {
        assert_eq!(RampMode::from_index(RampMode::Fixed.index()), Some(RampMode::Fixed));
        assert_eq!(RampMode::from_index(7), None);
    }
}
