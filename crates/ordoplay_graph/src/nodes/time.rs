// SPDX-License-Identifier: MIT OR Apache-2.0
//! Nodes that carry state from one tick to the next.
//!
//! State lives in [`Shared`] cells owned by the node, so recompiling the
//! graph keeps springs moving and timers running.

use super::field_enum;
use crate::error::SerializeError;
use crate::lanes::{with_lanes, with_vectors, Lanes};
use crate::link::{resize_inputs, Link, LinkSettings};
use crate::node::{NodeEnv, NodeKind, Shared};
use crate::processor::{BuildContext, Evaluator};
use crate::serializer::{FieldReader, FieldWriter};
use crate::value::ValueType;
use ordoplay_curves::Interpolation;

fn float_or_vector(ty: ValueType) -> ValueType {
    match ty {
        ValueType::Float | ValueType::Vector2 | ValueType::Vector3 | ValueType::Vector4 => ty,
        _ => ValueType::Error,
    }
}

// ----------------------------------------------------------------------
// Spring
// ----------------------------------------------------------------------

#[derive(Debug, Default, Clone, Copy)]
struct Motion {
    velocity: [f32; 4],
    current: [f32; 4],
}

fn spring<T: Lanes>(motion: Shared<Motion>, hardness: f32, factor: f32) -> Evaluator {
    Evaluator::new(move |i| {
        let input = i.get::<T>(0).to_lanes();
        let decay = factor.powf(i.dt());
        motion.with_mut(|m| {
            for c in 0..T::LANES {
                m.velocity[c] += input[c];
                m.velocity[c] -= m.current[c] * hardness;
                m.velocity[c] *= decay;
                m.current[c] += m.velocity[c];
            }
            T::from_lanes(m.current)
        })
    })
}

/// Damped spring driven by an acceleration input
#[derive(Debug)]
pub struct SpringNode {
    /// Pull back towards zero per tick
    pub hardness: f32,
    /// Velocity damping; higher values damp less
    pub damping: f32,
    motion: Shared<Motion>,
}

impl Default for SpringNode {
    fn default() -> Self {
        Self {
            hardness: 0.1,
            damping: 0.5,
            motion: Shared::default(),
        }
    }
}

impl SpringNode {
    /// Per-second velocity factor
    pub fn damping_factor(&self) -> f32 {
        1.0 / (1.0 + self.damping.max(f32::EPSILON).powi(5))
    }
}

impl NodeKind for SpringNode {
    fn kind_id(&self) -> &'static str {
        "spring"
    }

    fn name(&self) -> &str {
        "Spring"
    }

    fn output_type(&self) -> ValueType {
        ValueType::AnyScalar
    }

    fn configure(&mut self, inputs: &mut Vec<Link>) {
        resize_inputs(inputs, 1);
        inputs[0].declare(ValueType::AnyScalar, "Acceleration", LinkSettings::NONE);
    }

    fn check_types(&self, _: &mut Vec<Link>, in_types: &[ValueType], _: &NodeEnv) -> ValueType {
        float_or_vector(in_types.first().copied().unwrap_or(ValueType::None))
    }

    fn build(&self, cx: &BuildContext<'_>) -> Option<Evaluator> {
        let (hardness, factor) = (self.hardness, self.damping_factor());
        with_vectors!(cx.output_type(), |T| spring::<T>(self.motion.clone(), hardness, factor))
    }

    fn write_fields(&self, w: &mut FieldWriter) {
        w.float(self.hardness);
        w.float(self.damping);
    }

    fn read_fields(&mut self, r: &mut FieldReader<'_>) -> Result<(), SerializeError> {
        self.hardness = r.float()?;
        self.damping = r.float()?;
        Ok(())
    }
}

// ----------------------------------------------------------------------
// Delta
// ----------------------------------------------------------------------

fn delta<T: Lanes>(last: Shared<[f32; 4]>) -> Evaluator {
    Evaluator::new(move |i| {
        let value = i.get::<T>(0).to_lanes();
        let previous = last.with_mut(|last| std::mem::replace(last, value));
        T::from_lanes(value).zip(T::from_lanes(previous), |a, b| a - b)
    })
}

/// Change of the input since the previous evaluation
#[derive(Debug, Default)]
pub struct DeltaNode {
    last: Shared<[f32; 4]>,
}

impl NodeKind for DeltaNode {
    fn kind_id(&self) -> &'static str {
        "delta"
    }

    fn name(&self) -> &str {
        "Delta"
    }

    fn output_type(&self) -> ValueType {
        ValueType::AnyScalar
    }

    fn configure(&mut self, inputs: &mut Vec<Link>) {
        resize_inputs(inputs, 1);
        inputs[0].declare(ValueType::AnyScalar, "Val", LinkSettings::NONE);
    }

    fn check_types(&self, _: &mut Vec<Link>, in_types: &[ValueType], _: &NodeEnv) -> ValueType {
        float_or_vector(in_types.first().copied().unwrap_or(ValueType::None))
    }

    fn build(&self, cx: &BuildContext<'_>) -> Option<Evaluator> {
        with_vectors!(cx.output_type(), |T| delta::<T>(self.last.clone()))
    }
}

// ----------------------------------------------------------------------
// Dozer
// ----------------------------------------------------------------------

fn dozer<T: Lanes>(held: Shared<[f32; 4]>, freeze: bool) -> Evaluator {
    Evaluator::new(move |i| {
        held.with_mut(|held| {
            if i.get::<bool>(1) {
                *held = i.get::<T>(0).to_lanes();
            } else if !freeze {
                *held = [0.0; 4];
            }
            T::from_lanes(*held)
        })
    })
}

/// Sample-and-hold gated by a bool
#[derive(Debug, Default)]
pub struct DozerNode {
    /// Keep the last sample while `Update` is false instead of dropping to zero
    pub freeze: bool,
    held: Shared<[f32; 4]>,
}

impl NodeKind for DozerNode {
    fn kind_id(&self) -> &'static str {
        "dozer"
    }

    fn name(&self) -> &str {
        "Dozer"
    }

    fn output_type(&self) -> ValueType {
        ValueType::AnyScalar
    }

    fn configure(&mut self, inputs: &mut Vec<Link>) {
        resize_inputs(inputs, 2);
        inputs[0].declare(ValueType::AnyScalar, "Val", LinkSettings::NONE);
        inputs[1].declare(ValueType::Bool, "Update", LinkSettings::NONE);
    }

    fn check_types(&self, _: &mut Vec<Link>, in_types: &[ValueType], _: &NodeEnv) -> ValueType {
        let ty = in_types.first().copied().unwrap_or(ValueType::None);
        if in_types.get(1) != Some(&ValueType::Bool) {
            return ValueType::Error;
        }
        match ty {
            ValueType::Color => ty,
            _ => float_or_vector(ty),
        }
    }

    fn build(&self, cx: &BuildContext<'_>) -> Option<Evaluator> {
        with_lanes!(cx.output_type(), |T| dozer::<T>(self.held.clone(), self.freeze))
    }

    fn write_fields(&self, w: &mut FieldWriter) {
        w.boolean(self.freeze);
    }

    fn read_fields(&mut self, r: &mut FieldReader<'_>) -> Result<(), SerializeError> {
        self.freeze = r.boolean()?;
        Ok(())
    }
}

// ----------------------------------------------------------------------
// Timer
// ----------------------------------------------------------------------

field_enum! {
    /// What the timer reports once it passes its limit
    pub enum LimitMode: "limit type" {
        /// Keep counting
        None,
        /// Wrap back to zero
        Repeat,
        /// Report zero
        StayToStart,
        /// Report the limit
        StayToEnd,
        /// Bounce between zero and the limit
        PingPong,
        /// Count back down to zero once, then stay there
        PingPongOnce,
    }
}

impl LimitMode {
    /// Map accumulated `time` against `limit`
    pub fn apply(self, time: f32, limit: f32) -> f32 {
        if time <= limit {
            return time;
        }
        match self {
            Self::None => time,
            Self::Repeat => Interpolation::repeat(time, limit),
            Self::StayToStart => 0.0,
            Self::StayToEnd => limit,
            Self::PingPong => Interpolation::ping_pong(time, limit),
            Self::PingPongOnce => (limit - (time - limit).abs()).max(0.0),
        }
    }
}

/// Scaled time since the last reset
#[derive(Debug)]
pub struct TimerNode {
    /// Behaviour past `limit`
    pub limit_mode: LimitMode,
    /// Seconds added per second
    pub time_speed: f32,
    /// Upper bound used by the limit mode and the output mapping
    pub limit: f32,
    /// Report `limit - v`
    pub inverse: bool,
    /// Report `v / limit`
    pub to01: bool,
    time: Shared<f32>,
}

impl Default for TimerNode {
    fn default() -> Self {
        Self {
            limit_mode: LimitMode::None,
            time_speed: 1.0,
            limit: 1.0,
            inverse: false,
            to01: false,
            time: Shared::default(),
        }
    }
}

impl NodeKind for TimerNode {
    fn kind_id(&self) -> &'static str {
        "timer"
    }

    fn name(&self) -> &str {
        "Timer"
    }

    fn output_type(&self) -> ValueType {
        ValueType::Float
    }

    fn configure(&mut self, inputs: &mut Vec<Link>) {
        resize_inputs(inputs, 1);
        inputs[0].declare(ValueType::Bool, "Reset", LinkSettings::NONE);
    }

    fn check_types(&self, _: &mut Vec<Link>, in_types: &[ValueType], _: &NodeEnv) -> ValueType {
        if in_types.first() == Some(&ValueType::Bool) {
            ValueType::Float
        } else {
            ValueType::Error
        }
    }

    fn build(&self, _: &BuildContext<'_>) -> Option<Evaluator> {
        let time = self.time.clone();
        let (mode, speed, limit, inverse, to01) =
            (self.limit_mode, self.time_speed, self.limit, self.inverse, self.to01);
        Some(Evaluator::new(move |i| {
            let elapsed = time.with_mut(|t| {
                *t += i.dt() * speed;
                if i.get::<bool>(0) {
                    *t = 0.0;
                }
                *t
            });
            let mut value = mode.apply(elapsed, limit);
            if inverse {
                value = limit - value;
            }
            if to01 {
                value /= limit;
            }
            value
        }))
    }

    fn write_fields(&self, w: &mut FieldWriter) {
        w.enumeration(self.limit_mode);
        w.float(self.time_speed);
        w.float(self.limit);
        w.boolean(self.inverse);
        w.boolean(self.to01);
    }

    fn read_fields(&mut self, r: &mut FieldReader<'_>) -> Result<(), SerializeError> {
        self.limit_mode = r.enumeration()?;
        self.time_speed = r.float()?;
        self.limit = r.float()?;
        self.inverse = r.boolean()?;
        self.to01 = r.boolean()?;
        Ok(())
    }
}
