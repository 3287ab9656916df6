// SPDX-License-Identifier: MIT OR Apache-2.0
//! Vector algebra over Vector2/3/4 and colors.

use super::field_enum;
use crate::error::SerializeError;
use crate::lanes::{with_lanes, Lanes};
use crate::link::{resize_inputs, Link, LinkSettings};
use crate::node::{NodeEnv, NodeKind};
use crate::processor::{BuildContext, Evaluator};
use crate::serializer::{FieldReader, FieldWriter};
use crate::typing;
use crate::value::ValueType;
use glam::Vec3;

field_enum! {
    /// Vector operation
    pub enum VectorOp: "operation" {
        /// Dot product
        Dot,
        /// Unit-length copy
        Normalize,
        /// Euclidean length
        Length,
        /// Distance between two points
        Distance,
        /// Cross product of two Vector3
        Cross,
        /// Projection of a vector onto a normal
        Project,
        /// Projection onto the plane with the given normal
        ProjectOnPlane,
        /// Reflection off the plane with the given normal
        Reflect,
    }
}

impl VectorOp {
    /// Number of inputs
    pub fn arity(self) -> usize {
        match self {
            Self::Normalize | Self::Length => 1,
            _ => 2,
        }
    }
}

fn project<T: Lanes>(v: T, n: T) -> T {
    let sq = n.dot(n);
    if sq < f32::EPSILON {
        return T::default();
    }
    let scale = v.dot(n) / sq;
    n.map(|c| c * scale)
}

fn reflect<T: Lanes>(d: T, n: T) -> T {
    let factor = -2.0 * d.dot(n);
    d.zip(n, |a, b| a + factor * b)
}

/// Vector operation selected by [`VectorOp`]
#[derive(Debug, Default)]
pub struct VectorMathNode {
    /// Selected operation
    pub op: VectorOp,
}

impl VectorMathNode {
    /// Create a node for `op`
    pub fn new(op: VectorOp) -> Self {
        Self { op }
    }
}

impl NodeKind for VectorMathNode {
    fn kind_id(&self) -> &'static str {
        "vector_math"
    }

    fn name(&self) -> &str {
        "Vector Math"
    }

    fn output_type(&self) -> ValueType {
        match self.op {
            VectorOp::Dot | VectorOp::Length | VectorOp::Distance => ValueType::Float,
            VectorOp::Cross | VectorOp::ProjectOnPlane => ValueType::Vector3,
            _ => ValueType::AnyVector,
        }
    }

    fn configure(&mut self, inputs: &mut Vec<Link>) {
        resize_inputs(inputs, self.op.arity());
        let (first, second) = match self.op {
            VectorOp::Normalize | VectorOp::Length => ("In", ""),
            VectorOp::Project | VectorOp::ProjectOnPlane | VectorOp::Reflect => ("Vector", "Normal"),
            _ => ("A", "B"),
        };
        inputs[0].declare(ValueType::AnyVector, first, LinkSettings::REQUIRED);
        if let Some(b) = inputs.get_mut(1) {
            b.declare(ValueType::AnyVector, second, LinkSettings::REQUIRED);
        }
    }

    fn check_types(&self, _: &mut Vec<Link>, in_types: &[ValueType], _: &NodeEnv) -> ValueType {
        let a = in_types.first().copied().unwrap_or(ValueType::None);
        if self.op.arity() == 1 {
            let ty = typing::vector_only(a);
            return match (self.op, ty) {
                (_, ValueType::Error) => ValueType::Error,
                (VectorOp::Length, _) => ValueType::Float,
                _ => ty,
            };
        }

        let b = in_types.get(1).copied().unwrap_or(ValueType::None);
        let same = typing::same(&[a, b]);
        match self.op {
            VectorOp::Dot | VectorOp::Distance if typing::vector_only(same) != ValueType::Error => ValueType::Float,
            VectorOp::Cross | VectorOp::ProjectOnPlane if same == ValueType::Vector3 => same,
            VectorOp::Project if matches!(same, ValueType::Vector3 | ValueType::Vector4) => same,
            VectorOp::Reflect if matches!(same, ValueType::Vector2 | ValueType::Vector3) => same,
            _ => ValueType::Error,
        }
    }

    fn build(&self, cx: &BuildContext<'_>) -> Option<Evaluator> {
        let ty = cx.input_type(0);
        match self.op {
            VectorOp::Dot => with_lanes!(ty, |T| Evaluator::new(|i| i.get::<T>(0).dot(i.get::<T>(1)))),
            VectorOp::Normalize => with_lanes!(ty, |T| Evaluator::new(|i| Lanes::normalize_or_zero(i.get::<T>(0)))),
            VectorOp::Length => with_lanes!(ty, |T| Evaluator::new(|i| Lanes::length(i.get::<T>(0)))),
            VectorOp::Distance => with_lanes!(ty, |T| Evaluator::new(|i| {
                Lanes::length(i.get::<T>(0).zip(i.get::<T>(1), |a, b| a - b))
            })),
            VectorOp::Cross => Some(Evaluator::new(|i| i.get::<Vec3>(0).cross(i.get::<Vec3>(1)))),
            VectorOp::Project => with_lanes!(ty, |T| Evaluator::new(|i| project(i.get::<T>(0), i.get::<T>(1)))),
            VectorOp::ProjectOnPlane => Some(Evaluator::new(|i| {
                let v = i.get::<Vec3>(0);
                v - project(v, i.get::<Vec3>(1))
            })),
            VectorOp::Reflect => with_lanes!(ty, |T| Evaluator::new(|i| reflect(i.get::<T>(0), i.get::<T>(1)))),
        }
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
    use crate::nodes::values::{ColorNode, Vector2Node, Vector3Node};
    use crate::value::{Color, Value};
    use glam::Vec2;

    fn node(graph: &mut Graph, op: VectorOp, inputs: &[crate::NodeId]) -> crate::NodeId {
        let id = graph.add_node(Box::new(VectorMathNode::new(op)));
        for (index, &source) in inputs.iter().enumerate() {
            graph.connect(id, index, source).unwrap();
        }
        id
    }

    #[test]
    fn test_helpers() {
        assert_eq!(project(Vec3::new(2.0, 3.0, 0.0), Vec3::new(0.0, 2.0, 0.0)), Vec3::new(0.0, 3.0, 0.0));
        assert_eq!(project(Vec3::ONE, Vec3::ZERO), Vec3::ZERO);
        assert_eq!(reflect(Vec2::new(1.0, -1.0), Vec2::Y), Vec2::new(1.0, 1.0));
    }

    #[test]
    fn test_dot_and_length() {
        let mut graph = Graph::new("test");
        let a = graph.add_node(Box::new(Vector3Node::with_value(Vec3::new(1.0, 2.0, 3.0))));
        let b = graph.add_node(Box::new(Vector3Node::with_value(Vec3::new(4.0, 5.0, 6.0))));
        let dot = node(&mut graph, VectorOp::Dot, &[a, b]);
        assert_eq!(graph.evaluate(dot), Some(Value::Float(32.0)));

        let v = graph.add_node(Box::new(Vector2Node::with_value(Vec2::new(3.0, 4.0))));
        let len = node(&mut graph, VectorOp::Length, &[v]);
        assert_eq!(graph.evaluate(len), Some(Value::Float(5.0)));
    }

    #[test]
    fn test_normalize_color() {
        let mut graph = Graph::new("test");
        let c = graph.add_node(Box::new(ColorNode::with_value(Color::rgba(0.0, 0.0, 2.0, 0.0))));
        let n = node(&mut graph, VectorOp::Normalize, &[c]);
        assert_eq!(graph.evaluate(n), Some(Value::Color(Color::rgba(0.0, 0.0, 1.0, 0.0))));
    }

    #[test]
    fn test_type_rules() {
        let node = VectorMathNode::new(VectorOp::Cross);
        let env = NodeEnv::default();
        let mut inputs = Vec::new();
        let mut check = |op, types: &[ValueType]| {
            let node = VectorMathNode::new(op);
            node.check_types(&mut inputs, types, &env)
        };
        assert_eq!(check(VectorOp::Cross, &[ValueType::Vector3, ValueType::Vector3]), ValueType::Vector3);
        assert_eq!(check(VectorOp::Cross, &[ValueType::Vector2, ValueType::Vector2]), ValueType::Error);
        assert_eq!(check(VectorOp::Reflect, &[ValueType::Vector4, ValueType::Vector4]), ValueType::Error);
        assert_eq!(check(VectorOp::Project, &[ValueType::Vector4, ValueType::Vector4]), ValueType::Vector4);
        assert_eq!(check(VectorOp::Distance, &[ValueType::Color, ValueType::Color]), ValueType::Float);
        assert_eq!(check(VectorOp::Dot, &[ValueType::Vector2, ValueType::Vector3]), ValueType::Error);
        assert_eq!(check(VectorOp::Length, &[ValueType::Float]), ValueType::Error);
        assert_eq!(node.op.arity(), 2);
    }
}
