// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fresh random values on every evaluation.

use super::field_enum;
use crate::error::SerializeError;
use crate::link::Link;
use crate::node::{NodeEnv, NodeKind};
use crate::processor::{BuildContext, Evaluator};
use crate::serializer::{FieldReader, FieldWriter};
use crate::value::ValueType;
use glam::{EulerRot, Quat, Vec2, Vec3, Vec4};
use rand::Rng;
use std::f32::consts::TAU;

field_enum! {
    /// Distribution to sample
    pub enum RandomOp: "operation" {
        /// Point inside the unit circle
        InsideUnitCircle,
        /// Point on the unit circle
        OnUnitCircle,
        /// Point inside the unit sphere
        InsideUnitSphere,
        /// Point on the unit sphere
        OnUnitSphere,
        /// Float in `[0, 1]`
        Value01,
        /// Float in `[-1, 1]`
        ValueMinus11,
        /// Rotation from random Euler angles
        Rotation,
        /// Uniformly distributed rotation
        RotationUniform,
    }
}

impl RandomOp {
    /// Kind produced
    pub fn value_type(self) -> ValueType {
        match self {
            Self::InsideUnitCircle | Self::OnUnitCircle => ValueType::Vector2,
            Self::InsideUnitSphere | Self::OnUnitSphere => ValueType::Vector3,
            Self::Value01 | Self::ValueMinus11 => ValueType::Float,
            Self::Rotation | Self::RotationUniform => ValueType::Vector4,
        }
    }
}

/// Uniform point inside the unit circle
pub fn inside_unit_circle(rng: &mut impl Rng) -> Vec2 {
    loop {
        let p = Vec2::new(rng.gen_range(-1.0..=1.0), rng.gen_range(-1.0..=1.0));
        if p.length_squared() <= 1.0 {
            return p;
        }
    }
}

/// Uniform point on the unit circle
pub fn on_unit_circle(rng: &mut impl Rng) -> Vec2 {
    Vec2::from_angle(rng.gen_range(0.0..TAU))
}

/// Uniform point inside the unit sphere
pub fn inside_unit_sphere(rng: &mut impl Rng) -> Vec3 {
    loop {
        let p = Vec3::new(
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
        );
        if p.length_squared() <= 1.0 {
            return p;
        }
    }
}

/// Uniform point on the unit sphere
pub fn on_unit_sphere(rng: &mut impl Rng) -> Vec3 {
    let z: f32 = rng.gen_range(-1.0..=1.0);
    let r = (1.0 - z * z).max(0.0).sqrt();
    on_unit_circle(rng).extend(0.0) * r + Vec3::Z * z
}

/// Uniformly distributed unit quaternion
pub fn rotation_uniform(rng: &mut impl Rng) -> Quat {
    let (u1, u2, u3): (f32, f32, f32) = (rng.gen(), rng.gen_range(0.0..TAU), rng.gen_range(0.0..TAU));
    let (a, b) = ((1.0 - u1).sqrt(), u1.sqrt());
    Quat::from_xyzw(a * u2.sin(), a * u2.cos(), b * u3.sin(), b * u3.cos())
}

/// Random sample per evaluation
#[derive(Debug, Default)]
pub struct RandomNode {
    /// Distribution
    pub op: RandomOp,
}

impl NodeKind for RandomNode {
    fn kind_id(&self) -> &'static str {
        "random"
    }

    fn name(&self) -> &str {
        "Random"
    }

    fn output_type(&self) -> ValueType {
        self.op.value_type()
    }

    fn check_types(&self, _: &mut Vec<Link>, _: &[ValueType], _: &NodeEnv) -> ValueType {
        self.op.value_type()
    }

    fn build(&self, _: &BuildContext<'_>) -> Option<Evaluator> {
        Some(match self.op {
            RandomOp::InsideUnitCircle => Evaluator::new(|_| inside_unit_circle(&mut rand::thread_rng())),
            RandomOp::OnUnitCircle => Evaluator::new(|_| on_unit_circle(&mut rand::thread_rng())),
            RandomOp::InsideUnitSphere => Evaluator::new(|_| inside_unit_sphere(&mut rand::thread_rng())),
            RandomOp::OnUnitSphere => Evaluator::new(|_| on_unit_sphere(&mut rand::thread_rng())),
            RandomOp::Value01 => Evaluator::new(|_| rand::thread_rng().gen_range(0.0..=1.0f32)),
            RandomOp::ValueMinus11 => Evaluator::new(|_| rand::thread_rng().gen_range(-1.0..=1.0f32)),
            RandomOp::Rotation => Evaluator::new(|_| {
                let mut rng = rand::thread_rng();
                let (y, x, z) = (rng.gen_range(0.0..TAU), rng.gen_range(0.0..TAU), rng.gen_range(0.0..TAU));
                Vec4::from(Quat::from_euler(EulerRot::YXZ, y, x, z))
            }),
            RandomOp::RotationUniform => Evaluator::new(|_| Vec4::from(rotation_uniform(&mut rand::thread_rng()))),
        })
    }

    fn write_fields(&self, w: &mut FieldWriter) {
        w.enumeration(self.op);
    }

    fn read_fields(&mut self, r: &mut FieldReader<'_>) -> Result<(), SerializeError> {
        self.op = r.enumeration()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;
    use crate::value::Value;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_samples_in_range() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            assert!(inside_unit_circle(&mut rng).length() <= 1.0);
            assert!(inside_unit_sphere(&mut rng).length() <= 1.0);
            assert!((on_unit_circle(&mut rng).length() - 1.0).abs() < 1e-4);
            assert!((on_unit_sphere(&mut rng).length() - 1.0).abs() < 1e-4);
            assert!((rotation_uniform(&mut rng).length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_node_types() {
        let mut graph = Graph::new("test");
        let id = graph.add_node(Box::new(RandomNode { op: RandomOp::ValueMinus11 }));
        let Some(Value::Float(v)) = graph.evaluate(id) else {
            panic!("expected a float");
        };
        assert!((-1.0..=1.0).contains(&v));

        graph.kind_mut::<RandomNode>(id).unwrap().op = RandomOp::RotationUniform;
        assert!(matches!(graph.evaluate(id), Some(Value::Vector4(_))));
    }
}
