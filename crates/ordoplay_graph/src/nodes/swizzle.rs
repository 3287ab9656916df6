// SPDX-License-Identifier: MIT OR Apache-2.0
//! Component reordering (`.zyx`, `.rgba`, ...).

use crate::error::SerializeError;
use crate::lanes::{with_lanes, Lanes};
use crate::link::{resize_inputs, Link, LinkSettings};
use crate::node::{NodeEnv, NodeKind};
use crate::processor::{BuildContext, Evaluator, Inputs};
use crate::serializer::{FieldReader, FieldWriter};
use crate::value::ValueType;

/// Parsed component selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Swizzle {
    picks: [usize; 4],
    len: usize,
    color: bool,
}

impl Swizzle {
    /// Parse `components` for an input with `count` components
    ///
    /// Letters are case-insensitive, unknown letters are skipped, and
    /// components past the input's last one clamp to it. An empty
    /// selection falls back to `x`.
    pub fn parse(components: &str, count: usize) -> Self {
        let max = count.saturating_sub(1);
        let mut picks = [0; 4];
        let mut len = 0;
        let mut color_letters = 0;
        for c in components.chars().map(|c| c.to_ascii_lowercase()) {
            let (index, is_color) = match c {
                'x' => (0, false),
                'y' => (1, false),
                'z' => (2, false),
                'w' => (3, false),
                'r' => (0, true),
                'g' => (1, true),
                'b' => (2, true),
                'a' => (3, true),
                _ => continue,
            };
            picks[len] = index.min(max);
            len += 1;
            color_letters += usize::from(is_color);
            if len == 4 {
                break;
            }
        }
        if len == 0 {
            return Self {
                picks,
                len: 1,
                color: false,
            };
        }
        Self {
            picks,
            len,
            color: color_letters * 2 > len,
        }
    }

    /// Selected component indices
    pub fn picks(&self) -> &[usize] {
        &self.picks[..self.len]
    }

    /// Output kind
    pub fn output_type(&self) -> ValueType {
        match self.len {
            1 => ValueType::Float,
            2 => ValueType::Vector2,
            3 => ValueType::Vector3,
            _ if self.color => ValueType::Color,
            _ => ValueType::Vector4,
        }
    }
}

fn read_lanes<T: Lanes>(inputs: &Inputs<'_>) -> [f32; 4] {
    inputs.get::<T>(0).to_lanes()
}

fn read_int(inputs: &Inputs<'_>) -> [f32; 4] {
    [inputs.get::<i32>(0) as f32; 4]
}

/// Reorder or repeat the components of any scalar value
#[derive(Debug, Default)]
pub struct SwizzleNode {
    /// Selection as typed, e.g. `"zyx"`
    pub components: String,
}

impl SwizzleNode {
    /// Create a node selecting `components`
    pub fn new(components: impl Into<String>) -> Self {
        Self {
            components: components.into(),
        }
    }
}

impl NodeKind for SwizzleNode {
    fn kind_id(&self) -> &'static str {
        "swizzle"
    }

    fn name(&self) -> &str {
        "Swizzle"
    }

    fn output_type(&self) -> ValueType {
        ValueType::Float
    }

    fn configure(&mut self, inputs: &mut Vec<Link>) {
        resize_inputs(inputs, 1);
        inputs[0].declare(ValueType::AnyScalar, "Vec", LinkSettings::NO_DEFAULTS);
    }

    fn check_types(&self, _: &mut Vec<Link>, in_types: &[ValueType], _: &NodeEnv) -> ValueType {
        let ty = in_types.first().copied().unwrap_or(ValueType::None);
        if !ty.is_value() {
            return ValueType::Error;
        }
        Swizzle::parse(&self.components, ty.components()).output_type()
    }

    fn build(&self, cx: &BuildContext<'_>) -> Option<Evaluator> {
        let source = cx.input_type(0);
        let swizzle = Swizzle::parse(&self.components, source.components());
        let read: fn(&Inputs<'_>) -> [f32; 4] = match source {
            ValueType::Int => read_int,
            ty => with_lanes!(ty, |T| read_lanes::<T> as fn(&Inputs<'_>) -> [f32; 4])?,
        };
        with_lanes!(swizzle.output_type(), |T| Evaluator::new(move |i| {
            let src = read(i);
            let mut out = [0.0; 4];
            for (lane, &pick) in out.iter_mut().zip(swizzle.picks()) {
                *lane = src[pick];
            }
            T::from_lanes(out)
        }))
    }

    fn write_fields(&self, w: &mut FieldWriter) {
        w.string(&self.components);
    }

    fn read_fields(&mut self, r: &mut FieldReader<'_>) -> Result<(), SerializeError> {
        self.components = r.string()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;
    use crate::nodes::values::{ColorNode, IntNode, Vector3Node};
    use crate::value::{Color, Value};
    use glam::{Vec2, Vec3, Vec4};

    #[test]
    fn test_parse() {
        let s = Swizzle::parse("ZyX", 3);
        assert_eq!(s.picks(), &[2, 1, 0]);
        assert_eq!(s.output_type(), ValueType::Vector3);

        assert_eq!(Swizzle::parse("w", 2).picks(), &[1]);
        assert_eq!(Swizzle::parse("q!", 4).picks(), &[0]);
        assert_eq!(Swizzle::parse("xyzwxy", 4).picks().len(), 4);
        assert_eq!(Swizzle::parse("rgbx", 4).output_type(), ValueType::Color);
        assert_eq!(Swizzle::parse("rgxy", 4).output_type(), ValueType::Vector4);
    }

    #[test]
    fn test_reorder_vector() {
        let mut graph = Graph::new("test");
        let v = graph.add_node(Box::new(Vector3Node::with_value(Vec3::new(1.0, 2.0, 3.0))));
        let s = graph.add_node(Box::new(SwizzleNode::new("zx")));
        graph.connect(s, 0, v).unwrap();
        assert_eq!(graph.evaluate(s), Some(Value::Vector2(Vec2::new(3.0, 1.0))));
    }

    #[test]
    fn test_color_output() {
        let mut graph = Graph::new("test");
        let c = graph.add_node(Box::new(ColorNode::with_value(Color::rgba(0.1, 0.2, 0.3, 0.4))));
        let s = graph.add_node(Box::new(SwizzleNode::new("abgr")));
        graph.connect(s, 0, c).unwrap();
        assert_eq!(graph.evaluate(s), Some(Value::Color(Color::rgba(0.4, 0.3, 0.2, 0.1))));
    }

    #[test]
    fn test_int_widens() {
        let mut graph = Graph::new("test");
        let i = graph.add_node(Box::new(IntNode::with_value(3)));
        let s = graph.add_node(Box::new(SwizzleNode::new("xxxy")));
        graph.connect(s, 0, i).unwrap();
        assert_eq!(graph.evaluate(s), Some(Value::Vector4(Vec4::splat(3.0))));
    }

    #[test]
    fn test_unconnected_is_error() {
        let mut graph = Graph::new("test");
        let s = graph.add_node(Box::new(SwizzleNode::new("x")));
        assert_eq!(graph.evaluate(s), None);
        assert_eq!(graph.node(s).unwrap().cached_output_type, ValueType::Error);
    }
}
