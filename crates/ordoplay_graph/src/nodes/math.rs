// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scalar and component-wise math.

use super::field_enum;
use crate::error::SerializeError;
use crate::lanes::{with_lanes, Lanes, Scalar};
use crate::link::{resize_inputs, Link, LinkSettings};
use crate::node::{NodeEnv, NodeKind};
use crate::noise;
use crate::processor::{BuildContext, Evaluator, Inputs};
use crate::serializer::{FieldReader, FieldWriter};
use crate::typing;
use crate::value::ValueType;
use ordoplay_curves::Interpolation;

field_enum! {
    /// Math operation
    pub enum MathOp: "operation" {
        /// `a * b`
        Multiply,
        /// `a / b`
        Divide,
        /// `a + b`
        Add,
        /// `a - b`
        Subtract,
        /// `-a`
        Negative,
        /// Logarithm of `a` in base `b`
        Log,
        /// `a` raised to `b`
        Pow,
        /// Square root
        Sqrt,
        /// `e` raised to `a`
        Exp,
        /// Nearest power of two
        ClosestPowerOfTwo,
        /// Single octave of noise remapped towards `[0, 1]`
        PerlinNoise,
        /// Wrap `a` into `[0, b)`
        Repeat,
        /// Bounce `a` between 0 and `b`
        PingPong,
        /// Absolute value
        Abs,
        /// `1` for non-negative input, `-1` otherwise
        Sign,
        /// Round half to even
        Round,
        /// Round down
        Floor,
        /// Round up
        Ceil,
        /// Larger of the two
        Max,
        /// Smaller of the two
        Min,
        /// Clamp to `[0, 1]`
        Clamp01,
        /// Sine
        Sin,
        /// Cosine
        Cos,
        /// Tangent
        Tan,
        /// Arc sine
        Asin,
        /// Arc cosine
        Acos,
        /// Arc tangent
        Atan,
        /// Arc tangent of `a / b` using both signs
        Atan2,
    }
}

fn closest_power_of_two(v: i32) -> i32 {
    if v <= 0 {
        return 0;
    }
    let upper = (v as u32).checked_next_power_of_two().unwrap_or(1 << 31);
    let lower = upper >> 1;
    let nearest = if lower > 0 && v as u32 - lower < upper - v as u32 {
        lower
    } else {
        upper
    };
    i32::try_from(nearest).unwrap_or(1 << 30)
}

impl MathOp {
    /// Number of inputs
    pub fn arity(self) -> usize {
        use MathOp::*;
        match self {
            Multiply | Divide | Add | Subtract | Log | Pow | PerlinNoise | Repeat | PingPong | Max | Min | Atan2 => 2,
            _ => 1,
        }
    }

    /// Apply to floats; `b` is ignored by one-input operations
    pub fn apply(self, a: f32, b: f32) -> f32 {
        use MathOp::*;
        match self {
            Multiply => a * b,
            Divide => a / b,
            Add => a + b,
            Subtract => a - b,
            Negative => -a,
            Log => a.ln() / b.ln(),
            Pow => a.powf(b),
            Sqrt => a.sqrt(),
            Exp => a.exp(),
            ClosestPowerOfTwo => closest_power_of_two(a as i32) as f32,
            PerlinNoise => noise::sample01(a, b),
            Repeat => Interpolation::repeat(a, b),
            PingPong => Interpolation::ping_pong(a, b),
            Abs => a.abs(),
            Sign => {
                if a >= 0.0 {
                    1.0
                } else {
                    -1.0
                }
            }
            Round => a.round_ties_even(),
            Floor => a.floor(),
            Ceil => a.ceil(),
            Max => a.max(b),
            Min => a.min(b),
            Clamp01 => a.clamp(0.0, 1.0),
            Sin => a.sin(),
            Cos => a.cos(),
            Tan => a.tan(),
            Asin => a.asin(),
            Acos => a.acos(),
            Atan => a.atan(),
            Atan2 => a.atan2(b),
        }
    }

    /// Apply to ints
    ///
    /// Arithmetic wraps and division by zero gives 0. Everything else is
    /// computed in float and truncated.
    pub fn apply_int(self, a: i32, b: i32) -> i32 {
        use MathOp::*;
        match self {
            Multiply => a.wrapping_mul(b),
            Divide => a.checked_div(b).unwrap_or(0),
            Add => a.wrapping_add(b),
            Subtract => a.wrapping_sub(b),
            Negative => a.wrapping_neg(),
            Abs => a.wrapping_abs(),
            Max => a.max(b),
            Min => a.min(b),
            ClosestPowerOfTwo => closest_power_of_two(a),
            _ => self.apply(a as f32, b as f32) as i32,
        }
    }
}

fn widen<S: Scalar>(inputs: &Inputs<'_>, index: usize) -> f32 {
    inputs.get::<S>(index).to_f32()
}

/// Reader for a float or int operand as float
fn scalar_reader(ty: ValueType) -> fn(&Inputs<'_>, usize) -> f32 {
    if ty == ValueType::Int {
        widen::<i32>
    } else {
        widen::<f32>
    }
}

/// Math operation on floats, ints or vectors
#[derive(Debug, Default)]
pub struct MathNode {
    /// Selected operation
    pub op: MathOp,
}

impl MathNode {
    /// Create a node for `op`
    pub fn new(op: MathOp) -> Self {
        Self { op }
    }

    fn build_unary(&self, ty: ValueType) -> Option<Evaluator> {
        let op = self.op;
        if ty == ValueType::Int {
            return Some(Evaluator::new(move |inputs| op.apply_int(inputs.get::<i32>(0), 0)));
        }
        with_lanes!(ty, |T| Evaluator::new(move |inputs| inputs.get::<T>(0).map(|a| op.apply(a, 0.0))))
    }

    fn build_binary(&self, out: ValueType, a: ValueType, b: ValueType) -> Option<Evaluator> {
        let op = self.op;
        match out {
            ValueType::Int => Some(Evaluator::new(move |inputs| {
                op.apply_int(inputs.get::<i32>(0), inputs.get::<i32>(1))
            })),
            ValueType::Float => {
                let (read_a, read_b) = (scalar_reader(a), scalar_reader(b));
                Some(Evaluator::new(move |inputs| op.apply(read_a(inputs, 0), read_b(inputs, 1))))
            }
            _ => with_lanes!(out, |T| {
                if a == b {
                    Evaluator::new(move |inputs| inputs.get::<T>(0).zip(inputs.get::<T>(1), |x, y| op.apply(x, y)))
                } else if a == out {
                    let read_b = scalar_reader(b);
                    Evaluator::new(move |inputs| {
                        let s = read_b(inputs, 1);
                        inputs.get::<T>(0).map(|x| op.apply(x, s))
                    })
                } else {
                    let read_a = scalar_reader(a);
                    Evaluator::new(move |inputs| {
                        let s = read_a(inputs, 0);
                        inputs.get::<T>(1).map(|y| op.apply(s, y))
                    })
                }
            }),
        }
    }
}

impl NodeKind for MathNode {
    fn kind_id(&self) -> &'static str {
        "math"
    }

    fn name(&self) -> &str {
        "Math"
    }

    fn output_type(&self) -> ValueType {
        ValueType::AnyScalar
    }

    fn configure(&mut self, inputs: &mut Vec<Link>) {
        resize_inputs(inputs, self.op.arity());
        inputs[0].declare(ValueType::AnyScalar, "A", LinkSettings::REQUIRED);
        if let Some(b) = inputs.get_mut(1) {
            b.declare(ValueType::AnyScalar, "B", LinkSettings::REQUIRED);
        }
    }

    fn check_types(&self, _: &mut Vec<Link>, in_types: &[ValueType], _: &NodeEnv) -> ValueType {
        let ty = |i: usize| in_types.get(i).copied().unwrap_or(ValueType::None);
        if self.op.arity() == 2 {
            match typing::float_or_int(ty(0), ty(1)) {
                ValueType::Error => typing::vector_float_or_int(ty(0), ty(1)),
                fi => fi,
            }
        } else {
            typing::value_only(ty(0))
        }
    }

    fn build(&self, cx: &BuildContext<'_>) -> Option<Evaluator> {
        if self.op.arity() == 2 {
            self.build_binary(cx.output_type(), cx.input_type(0), cx.input_type(1))
        } else {
            self.build_unary(cx.output_type())
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
    use crate::nodes::values::{FloatNode, IntNode, Vector2Node};
    use crate::value::Value;
    use glam::Vec2;

    fn binary(graph: &mut Graph, op: MathOp, a: crate::NodeId, b: crate::NodeId) -> crate::NodeId {
        let id = graph.add_node(Box::new(MathNode::new(op)));
        graph.connect(id, 0, a).unwrap();
        graph.connect(id, 1, b).unwrap();
        id
    }

    #[test]
    fn test_arity() {
        assert_eq!(MathOp::Add.arity(), 2);
        assert_eq!(MathOp::Sqrt.arity(), 1);
        assert_eq!(MathOp::Atan2.arity(), 2);
        assert_eq!(MathOp::ALL.len(), 28);
    }

    #[test]
    fn test_scalar_ops() {
        assert_eq!(MathOp::Log.apply(8.0, 2.0), 3.0);
        assert_eq!(MathOp::Sign.apply(0.0, 0.0), 1.0);
        assert_eq!(MathOp::Round.apply(2.5, 0.0), 2.0);
        assert_eq!(MathOp::Round.apply(3.5, 0.0), 4.0);
        assert_eq!(MathOp::Repeat.apply(5.5, 2.0), 1.5);
        assert_eq!(MathOp::PingPong.apply(3.0, 2.0), 1.0);
        assert_eq!(MathOp::ClosestPowerOfTwo.apply(5.0, 0.0), 4.0);
        assert_eq!(MathOp::ClosestPowerOfTwo.apply(7.0, 0.0), 8.0);
        assert_eq!(MathOp::Clamp01.apply(-3.0, 0.0), 0.0);
    }

    #[test]
    fn test_int_ops() {
        assert_eq!(MathOp::Divide.apply_int(7, 2), 3);
        assert_eq!(MathOp::Divide.apply_int(7, 0), 0);
        assert_eq!(MathOp::Add.apply_int(i32::MAX, 1), i32::MIN);
        assert_eq!(MathOp::Sqrt.apply_int(10, 0), 3);
        assert_eq!(MathOp::Pow.apply_int(2, 10), 1024);
    }

    #[test]
    fn test_resizes_with_op() {
        let mut graph = Graph::new("test");
        let id = graph.add_node(Box::new(MathNode::new(MathOp::Add)));
        assert_eq!(graph.node(id).unwrap().inputs.len(), 2);
        graph.kind_mut::<MathNode>(id).unwrap().op = MathOp::Sqrt;
        graph.node_mut(id).unwrap().configure();
        assert_eq!(graph.node(id).unwrap().inputs.len(), 1);
    }

    #[test]
    fn test_int_graph() {
        let mut graph = Graph::new("test");
        let a = graph.add_node(Box::new(IntNode::with_value(9)));
        let b = graph.add_node(Box::new(IntNode::with_value(4)));
        let div = binary(&mut graph, MathOp::Divide, a, b);
        assert_eq!(graph.evaluate(div), Some(Value::Int(2)));
    }

    #[test]
    fn test_scalar_on_left() {
        let mut graph = Graph::new("test");
        let s = graph.add_node(Box::new(IntNode::with_value(10)));
        let v = graph.add_node(Box::new(Vector2Node::with_value(Vec2::new(2.0, 4.0))));
        let sub = binary(&mut graph, MathOp::Subtract, s, v);
        assert_eq!(graph.evaluate(sub), Some(Value::Vector2(Vec2::new(8.0, 6.0))));
    }

    #[test]
    fn test_vector_unary() {
        let mut graph = Graph::new("test");
        let v = graph.add_node(Box::new(Vector2Node::with_value(Vec2::new(-2.0, 4.0))));
        let abs = graph.add_node(Box::new(MathNode::new(MathOp::Abs)));
        graph.connect(abs, 0, v).unwrap();
        assert_eq!(graph.evaluate(abs), Some(Value::Vector2(Vec2::new(2.0, 4.0))));
    }

    #[test]
    fn test_bool_input_is_error() {
        let mut graph = Graph::new("test");
        let f = graph.add_node(Box::new(FloatNode::with_value(1.0)));
        let b = graph.add_node(Box::new(crate::nodes::values::BoolNode::with_value(true)));
        let mul = binary(&mut graph, MathOp::Multiply, f, b);
        graph.rebuild_sink_list();
        assert_eq!(graph.node(mul).unwrap().cached_output_type, ValueType::Error);
        assert_eq!(graph.evaluate(mul), None);
    }
}
