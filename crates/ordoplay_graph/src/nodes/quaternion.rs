// SPDX-License-Identifier: MIT OR Apache-2.0
//! Quaternion operations on Vector4 values stored as `x, y, z, w`.
//!
//! Euler angles are in degrees and follow the Z, then X, then Y rotation
//! order used by the host engine.

use super::field_enum;
use crate::error::SerializeError;
use crate::link::{resize_inputs, Link, LinkSettings};
use crate::node::{NodeEnv, NodeKind};
use crate::processor::{BuildContext, Evaluator};
use crate::serializer::{FieldReader, FieldWriter};
use crate::value::ValueType;
use glam::{EulerRot, Mat3, Quat, Vec2, Vec3, Vec4};
use ordoplay_curves::Interpolation;

field_enum! {
    /// Quaternion operation
    pub enum QuaternionOp: "operation" {
        /// Quaternion product, or a vector rotated by a quaternion
        Multiply,
        /// Rotation from Euler angles
        FromEuler,
        /// Euler angles of a rotation
        ToEuler,
        /// Shortest rotation between two directions
        FromToRotation,
        /// Rotation of an angle around an axis
        AxisAngle,
        /// Inverse rotation
        Inverse,
        /// Normalized linear blend, `t` unclamped
        LerpUnclamped,
        /// Spherical blend, `t` unclamped
        SlerpUnclamped,
        /// Rotation looking along a forward vector
        LookRotation,
    }
}

/// Rotation from Euler angles in degrees
pub fn from_euler(degrees: Vec3) -> Quat {
    let r = degrees * std::f32::consts::PI / 180.0;
    Quat::from_euler(EulerRot::YXZ, r.y, r.x, r.z)
}

/// Euler angles in degrees, each in `[0, 360)`
pub fn to_euler(q: Quat) -> Vec3 {
    let (y, x, z) = q.to_euler(EulerRot::YXZ);
    let wrap = |a: f32| a.to_degrees().rem_euclid(360.0);
    Vec3::new(wrap(x), wrap(y), wrap(z))
}

/// Rotation whose Z axis points along `forward` and Y axis towards `up`
pub fn look_rotation(forward: Vec3, up: Vec3) -> Quat {
    let forward = forward.normalize_or_zero();
    if forward == Vec3::ZERO {
        return Quat::IDENTITY;
    }
    let right = up.cross(forward).normalize_or_zero();
    if right == Vec3::ZERO {
        return Quat::from_rotation_arc(Vec3::Z, forward);
    }
    let up = forward.cross(right);
    Quat::from_mat3(&Mat3::from_cols(right, up, forward))
}

fn from_to(from: Vec3, to: Vec3) -> Quat {
    let (from, to) = (from.normalize_or_zero(), to.normalize_or_zero());
    if from == Vec3::ZERO || to == Vec3::ZERO {
        return Quat::IDENTITY;
    }
    Quat::from_rotation_arc(from, to)
}

fn axis_angle(degrees: f32, axis: Vec3) -> Quat {
    let axis = axis.normalize_or_zero();
    if axis == Vec3::ZERO {
        return Quat::IDENTITY;
    }
    Quat::from_axis_angle(axis, degrees.to_radians())
}

fn lerp(a: Vec4, b: Vec4, t: f32) -> Vec4 {
    let b = if a.dot(b) < 0.0 { -b } else { b };
    a.lerp(b, t).normalize_or_zero()
}

fn rotate(q: Vec4, v: Vec3) -> Vec3 {
    Quat::from_vec4(q) * v
}

/// Quaternion operation selected by [`QuaternionOp`]
#[derive(Debug, Default)]
pub struct QuaternionMathNode {
    /// Selected operation
    pub op: QuaternionOp,
}

impl QuaternionMathNode {
    /// Create a node for `op`
    pub fn new(op: QuaternionOp) -> Self {
        Self { op }
    }

    fn build_multiply(a: ValueType, b: ValueType) -> Option<Evaluator> {
        // Swap so the quaternion comes first
        let (q, v, vt) = match (a, b) {
            (ValueType::Vector4, _) => (0, 1, b),
            _ => (1, 0, a),
        };
        Some(match vt {
            ValueType::Vector4 => Evaluator::new(|i| {
                Vec4::from(Quat::from_vec4(i.get::<Vec4>(0)) * Quat::from_vec4(i.get::<Vec4>(1)))
            }),
            ValueType::Vector3 => Evaluator::new(move |i| rotate(i.get::<Vec4>(q), i.get::<Vec3>(v))),
            ValueType::Vector2 => Evaluator::new(move |i| {
                let r = rotate(i.get::<Vec4>(q), i.get::<Vec2>(v).extend(0.0));
                Vec2::new(r.x, r.y)
            }),
            _ => return None,
        })
    }
}

impl NodeKind for QuaternionMathNode {
    fn kind_id(&self) -> &'static str {
        "quaternion_math"
    }

    fn name(&self) -> &str {
        "Quaternion Math"
    }

    fn output_type(&self) -> ValueType {
        match self.op {
            QuaternionOp::Multiply => ValueType::AnyVector,
            QuaternionOp::ToEuler => ValueType::Vector3,
            _ => ValueType::Vector4,
        }
    }

    fn configure(&mut self, inputs: &mut Vec<Link>) {
        use QuaternionOp::*;
        let required = LinkSettings::REQUIRED;
        let layout: &[(ValueType, &'static str, LinkSettings)] = match self.op {
            Multiply => &[(ValueType::AnyVector, "A", required), (ValueType::AnyVector, "B", required)],
            AxisAngle => &[(ValueType::Float, "Angle", required), (ValueType::Vector3, "Axis", required)],
            FromEuler => &[(ValueType::Vector3, "Euler", required)],
            ToEuler => &[(ValueType::Vector4, "Quaternion", required)],
            FromToRotation => &[(ValueType::Vector3, "From", required), (ValueType::Vector3, "To", required)],
            Inverse => &[(ValueType::Vector4, "In", required)],
            LerpUnclamped | SlerpUnclamped => &[
                (ValueType::Vector4, "a", required),
                (ValueType::Vector4, "b", required),
                (ValueType::Float, "t", required),
            ],
            LookRotation => &[
                (ValueType::Vector3, "Forward", required),
                (ValueType::Vector3, "Upward", LinkSettings::NO_DEFAULTS),
            ],
        };
        resize_inputs(inputs, layout.len());
        for (link, &(ty, name, settings)) in inputs.iter_mut().zip(layout) {
            link.declare(ty, name, settings);
        }
    }

    fn check_types(&self, _: &mut Vec<Link>, in_types: &[ValueType], _: &NodeEnv) -> ValueType {
        use ValueType::*;
        let ty = |i: usize| in_types.get(i).copied().unwrap_or(None);
        let ok = match self.op {
            QuaternionOp::Multiply => {
                return match (ty(0), ty(1)) {
                    (Vector4, t @ (Vector2 | Vector3 | Vector4)) | (t @ (Vector2 | Vector3), Vector4) => t,
                    _ => Error,
                };
            }
            QuaternionOp::AxisAngle => ty(0) == Float && ty(1) == Vector3,
            QuaternionOp::FromEuler => ty(0) == Vector3,
            QuaternionOp::ToEuler | QuaternionOp::Inverse => ty(0) == Vector4,
            QuaternionOp::FromToRotation => ty(0) == Vector3 && ty(1) == Vector3,
            QuaternionOp::LerpUnclamped | QuaternionOp::SlerpUnclamped => {
                ty(0) == Vector4 && ty(1) == Vector4 && ty(2) == Float
            }
            QuaternionOp::LookRotation => ty(0) == Vector3 && matches!(ty(1), Vector3 | None),
        };
        if ok { self.output_type() } else { Error }
    }

    fn build(&self, cx: &BuildContext<'_>) -> Option<Evaluator> {
        Some(match self.op {
            QuaternionOp::Multiply => return Self::build_multiply(cx.input_type(0), cx.input_type(1)),
            QuaternionOp::FromEuler => Evaluator::new(|i| Vec4::from(from_euler(i.get::<Vec3>(0)))),
            QuaternionOp::ToEuler => Evaluator::new(|i| to_euler(Quat::from_vec4(i.get::<Vec4>(0)))),
            QuaternionOp::FromToRotation => {
                Evaluator::new(|i| Vec4::from(from_to(i.get::<Vec3>(0), i.get::<Vec3>(1))))
            }
            QuaternionOp::AxisAngle => Evaluator::new(|i| Vec4::from(axis_angle(i.get::<f32>(0), i.get::<Vec3>(1)))),
            QuaternionOp::Inverse => Evaluator::new(|i| Vec4::from(Quat::from_vec4(i.get::<Vec4>(0)).conjugate())),
            QuaternionOp::LerpUnclamped => {
                Evaluator::new(|i| lerp(i.get::<Vec4>(0), i.get::<Vec4>(1), i.get::<f32>(2)))
            }
            QuaternionOp::SlerpUnclamped => Evaluator::new(|i| {
                let (a, b) = (i.get::<Vec4>(0), i.get::<Vec4>(1));
                Vec4::from_array(Interpolation::slerp(a.to_array(), b.to_array(), i.get::<f32>(2)))
            }),
            QuaternionOp::LookRotation => Evaluator::new(|i| {
                let up = i.try_get::<Vec3>(1).unwrap_or(Vec3::Y);
                Vec4::from(look_rotation(i.get::<Vec3>(0), up))
            }),
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
    use crate::nodes::values::{Vector3Node, Vector4Node};
    use crate::value::Value;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).abs().max_element() < 1e-3
    }

    #[test]
    fn test_euler_round_trip() {
        let angles = Vec3::new(30.0, 45.0, 60.0);
        assert!(close(to_euler(from_euler(angles)), angles));
        // Yaw of 90 degrees turns forward into right
        assert!(close(from_euler(Vec3::new(0.0, 90.0, 0.0)) * Vec3::Z, Vec3::X));
    }

    #[test]
    fn test_look_rotation() {
        assert!(close(look_rotation(Vec3::X, Vec3::Y) * Vec3::Z, Vec3::X));
        assert_eq!(look_rotation(Vec3::ZERO, Vec3::Y), Quat::IDENTITY);
        assert!(close(look_rotation(Vec3::Y, Vec3::Y) * Vec3::Z, Vec3::Y));
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(axis_angle(90.0, Vec3::ZERO), Quat::IDENTITY);
        assert_eq!(from_to(Vec3::ZERO, Vec3::X), Quat::IDENTITY);
    }

    #[test]
    fn test_rotate_vector_either_order() {
        let mut graph = Graph::new("test");
        let q = Vec4::from(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2));
        let quat = graph.add_node(Box::new(Vector4Node::with_value(q)));
        let v = graph.add_node(Box::new(Vector3Node::with_value(Vec3::Z)));
        let mul = graph.add_node(Box::new(QuaternionMathNode::new(QuaternionOp::Multiply)));
        graph.connect(mul, 0, v).unwrap();
        graph.connect(mul, 1, quat).unwrap();
        let Some(Value::Vector3(r)) = graph.evaluate(mul) else {
            panic!("expected a Vector3");
        };
        assert!(close(r, Vec3::X));
    }

    #[test]
    fn test_look_rotation_without_up() {
        let mut graph = Graph::new("test");
        let f = graph.add_node(Box::new(Vector3Node::with_value(Vec3::X)));
        let look = graph.add_node(Box::new(QuaternionMathNode::new(QuaternionOp::LookRotation)));
        graph.connect(look, 0, f).unwrap();
        graph.rebuild_sink_list();
        assert_eq!(graph.node(look).unwrap().inputs[1].target, crate::NO_NODE);
        let Some(Value::Vector4(q)) = graph.evaluate(look) else {
            panic!("expected a Vector4");
        };
        assert!(close(Quat::from_vec4(q) * Vec3::Z, Vec3::X));
    }

    #[test]
    fn test_multiply_types() {
        let node = QuaternionMathNode::new(QuaternionOp::Multiply);
        let env = NodeEnv::default();
        let check = |types: &[ValueType]| node.check_types(&mut Vec::new(), types, &env);
        assert_eq!(check(&[ValueType::Vector4, ValueType::Vector2]), ValueType::Vector2);
        assert_eq!(check(&[ValueType::Vector3, ValueType::Vector4]), ValueType::Vector3);
        assert_eq!(check(&[ValueType::Vector4, ValueType::Vector4]), ValueType::Vector4);
        assert_eq!(check(&[ValueType::Vector3, ValueType::Vector3]), ValueType::Error);
    }
}
