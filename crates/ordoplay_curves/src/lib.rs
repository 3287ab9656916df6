// SPDX-License-Identifier: MIT OR Apache-2.0
//! Parametric curves and color ramps for `OrdoPlay` graphs.
//!
//! This crate provides the value kinds that graph nodes sample:
//! - Hermite float curves with wrap modes
//! - Color ramps with blend and fixed modes
//! - Shared interpolation helpers
//!
//! ## Architecture
//!
//! Both kinds keep their keys sorted by time and evaluate with a binary
//! search for the surrounding pair. They derive serde so hosts can store
//! presets next to their graph settings.

pub mod curve;
pub mod interpolation;
pub mod ramp;

pub use curve::{AnimationCurve, CurveKey, WrapMode};
pub use interpolation::Interpolation;
pub use ramp::{AlphaKey, ColorKey, ColorRamp, RampMode};
