// SPDX-License-Identifier: MIT OR Apache-2.0
//! Literal value nodes, curves and ramps.

use crate::error::SerializeError;
use crate::externals::{ExternalKind, ExternalNode, ExternalValue, IoMode};
use crate::link::{resize_inputs, Link, LinkSettings};
use crate::node::{NodeEnv, NodeKind, Shared};
use crate::processor::{BuildContext, Evaluator, Output};
use crate::serializer::{format_bool, format_trimmed, parse_bool, parse_f32, parse_i32, FieldReader, FieldWriter};
use crate::typing;
use crate::value::{Color, ValueType};
use glam::{Vec2, Vec3, Vec4};
use ordoplay_curves::{AnimationCurve, ColorRamp};
use std::fmt;

/// A kind that value and default nodes can hold
pub trait Literal: Output + ExternalKind + PartialEq + fmt::Debug {
    /// Display name
    const NAME: &'static str;
    /// Kind id of the value node
    const VALUE_ID: &'static str;
    /// Kind id of the default node
    const DEFAULT_ID: &'static str;

    /// Write as one record field
    fn write(self, w: &mut FieldWriter);

    /// Read from one record field
    fn read(r: &mut FieldReader<'_>) -> Result<Self, SerializeError>;

    /// Components as separate payload parts
    fn to_parts(self) -> Vec<String>;

    /// Parse from exactly the parts [`to_parts`](Self::to_parts) writes
    fn from_parts(node: i32, parts: &[&str]) -> Result<Self, SerializeError>;
}

fn exact<'a, const N: usize>(node: i32, parts: &[&'a str]) -> Result<[&'a str; N], SerializeError> {
    if parts.len() > N {
        return Err(SerializeError::TrailingFields {
            node,
            extra: parts.len() - N,
        });
    }
    let mut out = [""; N];
    for (field, slot) in out.iter_mut().enumerate() {
        *slot = parts.get(field).ok_or(SerializeError::MissingField { node, field })?;
    }
    Ok(out)
}

fn floats<const N: usize>(node: i32, parts: &[&str]) -> Result<[f32; N], SerializeError> {
    let parts = exact::<N>(node, parts)?;
    let mut out = [0.0; N];
    for (slot, part) in out.iter_mut().zip(parts) {
        *slot = parse_f32(node, part)?;
    }
    Ok(out)
}

impl Literal for f32 {
    const NAME: &'static str = "Float";
    const VALUE_ID: &'static str = "float";
    const DEFAULT_ID: &'static str = "default_float";

    fn write(self, w: &mut FieldWriter) {
        w.float(self);
    }

    fn read(r: &mut FieldReader<'_>) -> Result<Self, SerializeError> {
        r.float()
    }

    fn to_parts(self) -> Vec<String> {
        vec![self.to_string()]
    }

    fn from_parts(node: i32, parts: &[&str]) -> Result<Self, SerializeError> {
        let [v] = floats::<1>(node, parts)?;
        Ok(v)
    }
}

impl Literal for i32 {
    const NAME: &'static str = "Int";
    const VALUE_ID: &'static str = "int";
    const DEFAULT_ID: &'static str = "default_int";

    fn write(self, w: &mut FieldWriter) {
        w.int(self);
    }

    fn read(r: &mut FieldReader<'_>) -> Result<Self, SerializeError> {
        r.int()
    }

    fn to_parts(self) -> Vec<String> {
        vec![self.to_string()]
    }

    fn from_parts(node: i32, parts: &[&str]) -> Result<Self, SerializeError> {
        let [v] = exact::<1>(node, parts)?;
        parse_i32(node, v)
    }
}

impl Literal for bool {
    const NAME: &'static str = "Bool";
    const VALUE_ID: &'static str = "bool";
    const DEFAULT_ID: &'static str = "default_bool";

    fn write(self, w: &mut FieldWriter) {
        w.boolean(self);
    }

    fn read(r: &mut FieldReader<'_>) -> Result<Self, SerializeError> {
        r.boolean()
    }

    fn to_parts(self) -> Vec<String> {
        vec![format_bool(self).to_string()]
    }

    fn from_parts(node: i32, parts: &[&str]) -> Result<Self, SerializeError> {
        let [v] = exact::<1>(node, parts)?;
        parse_bool(node, v)
    }
}

macro_rules! vector_literal {
    ($ty:ty, $n:literal, $name:literal, $id:literal, $write:ident) => {
        impl Literal for $ty {
            const NAME: &'static str = $name;
            const VALUE_ID: &'static str = $id;
            const DEFAULT_ID: &'static str = concat!("default_", $id);

            fn write(self, w: &mut FieldWriter) {
                w.$write(self);
            }

            fn read(r: &mut FieldReader<'_>) -> Result<Self, SerializeError> {
                r.$write()
            }

            fn to_parts(self) -> Vec<String> {
                self.to_array().iter().map(ToString::to_string).collect()
            }

            fn from_parts(node: i32, parts: &[&str]) -> Result<Self, SerializeError> {
                floats::<$n>(node, parts).map(<$ty>::from_array)
            }
        }
    };
}

vector_literal!(Vec2, 2, "Vector2", "vector2", vector2);
vector_literal!(Vec3, 3, "Vector3", "vector3", vector3);
vector_literal!(Vec4, 4, "Vector4", "vector4", vector4);

impl Literal for Color {
    const NAME: &'static str = "Color";
    const VALUE_ID: &'static str = "color";
    const DEFAULT_ID: &'static str = "default_color";

    fn write(self, w: &mut FieldWriter) {
        w.color(self);
    }

    fn read(r: &mut FieldReader<'_>) -> Result<Self, SerializeError> {
        r.color()
    }

    fn to_parts(self) -> Vec<String> {
        self.to_array().iter().map(|&c| format_trimmed(c, 3)).collect()
    }

    fn from_parts(node: i32, parts: &[&str]) -> Result<Self, SerializeError> {
        floats::<4>(node, parts).map(Color::from)
    }
}

/// Literal value node, optionally wired to the host as an input or output
#[derive(Debug, Default)]
pub struct ValueNode<T: Literal> {
    /// Slot and IO name
    pub value_name: String,
    /// List this node in the graph's external slots
    pub use_as_external: bool,
    /// Host wiring
    pub io_mode: IoMode,
    value: Shared<T>,
}

/// Float literal
pub type FloatNode = ValueNode<f32>;
/// Int literal
pub type IntNode = ValueNode<i32>;
/// Bool literal
pub type BoolNode = ValueNode<bool>;
/// Vector2 literal
pub type Vector2Node = ValueNode<Vec2>;
/// Vector3 literal
pub type Vector3Node = ValueNode<Vec3>;
/// Vector4 literal
pub type Vector4Node = ValueNode<Vec4>;
/// Color literal
pub type ColorNode = ValueNode<Color>;

impl<T: Literal> ValueNode<T> {
    /// Create an ordinary value node
    pub fn with_value(value: T) -> Self {
        Self {
            value_name: String::new(),
            use_as_external: false,
            io_mode: IoMode::None,
            value: Shared::new(value),
        }
    }

    /// Current value
    pub fn value(&self) -> T {
        self.value.get()
    }

    /// Replace the value
    pub fn set_value(&self, value: T) {
        self.value.set(value);
    }
}

impl<T: Literal> NodeKind for ValueNode<T> {
    fn kind_id(&self) -> &'static str {
        T::VALUE_ID
    }

    fn name(&self) -> &str {
        if self.io_mode != IoMode::None && !self.value_name.is_empty() {
            &self.value_name
        } else {
            T::NAME
        }
    }

    fn output_type(&self) -> ValueType {
        if self.io_mode == IoMode::Output {
            ValueType::None
        } else {
            <T as Output>::VALUE_TYPE
        }
    }

    fn controllable(&self) -> bool {
        self.io_mode == IoMode::None
    }

    fn configure(&mut self, inputs: &mut Vec<Link>) {
        if self.io_mode == IoMode::Output {
            resize_inputs(inputs, 1);
            inputs[0].declare(<T as Output>::VALUE_TYPE, "In", LinkSettings::REQUIRED_NO_DEFAULTS);
        } else {
            resize_inputs(inputs, 0);
        }
    }

    fn check_types(&self, _: &mut Vec<Link>, in_types: &[ValueType], _: &NodeEnv) -> ValueType {
        if self.io_mode != IoMode::Output {
            return <T as Output>::VALUE_TYPE;
        }
        let input = in_types.first().copied().unwrap_or(ValueType::None);
        if typing::exact_or_none(input, <T as Output>::VALUE_TYPE) {
            ValueType::None
        } else {
            ValueType::Error
        }
    }

    fn build(&self, _: &BuildContext<'_>) -> Option<Evaluator> {
        let value = self.value.clone();
        Some(if self.io_mode == IoMode::Output {
            Evaluator::void(move |inputs| value.set(inputs.get::<T>(0)))
        } else {
            Evaluator::new(move |_| value.get())
        })
    }

    fn write_fields(&self, w: &mut FieldWriter) {
        w.string(&self.value_name);
        w.boolean(self.use_as_external);
        w.enumeration(self.io_mode);
        self.value.get().write(w);
    }

    fn read_fields(&mut self, r: &mut FieldReader<'_>) -> Result<(), SerializeError> {
        self.value_name = r.string()?;
        self.use_as_external = r.boolean()?;
        self.io_mode = r.enumeration()?;
        self.value.set(T::read(r)?);
        Ok(())
    }

    fn external(&self) -> Option<&dyn ExternalNode> {
        Some(self)
    }

    fn external_mut(&mut self) -> Option<&mut dyn ExternalNode> {
        Some(self)
    }
}

impl<T: Literal> ExternalNode for ValueNode<T> {
    fn value_name(&self) -> &str {
        &self.value_name
    }

    fn use_as_external(&self) -> bool {
        self.use_as_external
    }

    fn value_type(&self) -> ValueType {
        <T as Output>::VALUE_TYPE
    }

    fn io_mode(&self) -> IoMode {
        self.io_mode
    }

    fn get(&self) -> ExternalValue {
        self.value.get().into_external()
    }

    fn set(&self, value: ExternalValue) -> bool {
        T::from_external(value).map(|v| self.value.set(v)).is_some()
    }

    fn set_io(&mut self, mode: IoMode, name: &str) -> bool {
        self.io_mode = mode;
        self.value_name = name.to_string();
        true
    }
}

/// Float to float through a parametric curve
#[derive(Debug, Default)]
pub struct CurveNode {
    /// Slot name
    pub value_name: String,
    /// List this node in the graph's external slots
    pub use_as_external: bool,
    curve: Shared<AnimationCurve>,
}

impl CurveNode {
    /// Create a node sampling `curve`
    pub fn with_curve(curve: AnimationCurve) -> Self {
        Self {
            curve: Shared::new(curve),
            ..Self::default()
        }
    }

    /// Current curve
    pub fn curve(&self) -> AnimationCurve {
        self.curve.get()
    }
}

impl NodeKind for CurveNode {
    fn kind_id(&self) -> &'static str {
        "curve"
    }

    fn name(&self) -> &str {
        "Curve"
    }

    fn output_type(&self) -> ValueType {
        ValueType::Float
    }

    fn configure(&mut self, inputs: &mut Vec<Link>) {
        resize_inputs(inputs, 1);
        inputs[0].declare(ValueType::Float, "In", LinkSettings::REQUIRED_NO_DEFAULTS);
    }

    fn check_types(&self, _: &mut Vec<Link>, in_types: &[ValueType], _: &NodeEnv) -> ValueType {
        if typing::exact_or_none(in_types[0], ValueType::Float) {
            ValueType::Float
        } else {
            ValueType::Error
        }
    }

    fn build(&self, _: &BuildContext<'_>) -> Option<Evaluator> {
        let curve = self.curve.clone();
        Some(Evaluator::new(move |inputs| {
            let t = inputs.get::<f32>(0);
            curve.with(|c| c.evaluate(t))
        }))
    }

    fn write_fields(&self, w: &mut FieldWriter) {
        w.string(&self.value_name);
        w.boolean(self.use_as_external);
        self.curve.with(|c| w.curve(c));
    }

    fn read_fields(&mut self, r: &mut FieldReader<'_>) -> Result<(), SerializeError> {
        self.value_name = r.string()?;
        self.use_as_external = r.boolean()?;
        self.curve.set(r.curve()?);
        Ok(())
    }

    fn external(&self) -> Option<&dyn ExternalNode> {
        Some(self)
    }

    fn external_mut(&mut self) -> Option<&mut dyn ExternalNode> {
        Some(self)
    }
}

impl ExternalNode for CurveNode {
    fn value_name(&self) -> &str {
        &self.value_name
    }

    fn use_as_external(&self) -> bool {
        self.use_as_external
    }

    fn value_type(&self) -> ValueType {
        ValueType::Curve
    }

    fn get(&self) -> ExternalValue {
        ExternalValue::Curve(self.curve.get())
    }

    fn set(&self, value: ExternalValue) -> bool {
        AnimationCurve::from_external(value).map(|c| self.curve.set(c)).is_some()
    }
}

/// Float to color through a color ramp
#[derive(Debug, Default)]
pub struct RampNode {
    /// Slot name
    pub value_name: String,
    /// List this node in the graph's external slots
    pub use_as_external: bool,
    ramp: Shared<ColorRamp>,
}

impl RampNode {
    /// Create a node sampling `ramp`
    pub fn with_ramp(ramp: ColorRamp) -> Self {
        Self {
            ramp: Shared::new(ramp),
            ..Self::default()
        }
    }

    /// Current ramp
    pub fn ramp(&self) -> ColorRamp {
        self.ramp.get()
    }
}

impl NodeKind for RampNode {
    fn kind_id(&self) -> &'static str {
        "ramp"
    }

    fn name(&self) -> &str {
        "Ramp"
    }

    fn output_type(&self) -> ValueType {
        ValueType::Color
    }

    fn configure(&mut self, inputs: &mut Vec<Link>) {
        resize_inputs(inputs, 1);
        inputs[0].declare(ValueType::Float, "In", LinkSettings::REQUIRED_NO_DEFAULTS);
    }

    fn check_types(&self, _: &mut Vec<Link>, in_types: &[ValueType], _: &NodeEnv) -> ValueType {
        if typing::exact_or_none(in_types[0], ValueType::Float) {
            ValueType::Color
        } else {
            ValueType::Error
        }
    }

    fn build(&self, _: &BuildContext<'_>) -> Option<Evaluator> {
        let ramp = self.ramp.clone();
        Some(Evaluator::new(move |inputs| {
            let t = inputs.get::<f32>(0);
            Color::from(ramp.with(|r| r.evaluate(t)))
        }))
    }

    fn write_fields(&self, w: &mut FieldWriter) {
        w.string(&self.value_name);
        w.boolean(self.use_as_external);
        self.ramp.with(|r| w.ramp(r));
    }

    fn read_fields(&mut self, r: &mut FieldReader<'_>) -> Result<(), SerializeError> {
        self.value_name = r.string()?;
        self.use_as_external = r.boolean()?;
        self.ramp.set(r.ramp()?);
        Ok(())
    }

    fn external(&self) -> Option<&dyn ExternalNode> {
        Some(self)
    }

    fn external_mut(&mut self) -> Option<&mut dyn ExternalNode> {
        Some(self)
    }
}

impl ExternalNode for RampNode {
    fn value_name(&self) -> &str {
        &self.value_name
    }

    fn use_as_external(&self) -> bool {
        self.use_as_external
    }

    fn value_type(&self) -> ValueType {
        ValueType::Ramp
    }

    fn get(&self) -> ExternalValue {
        ExternalValue::Ramp(self.ramp.get())
    }

    fn set(&self, value: ExternalValue) -> bool {
        ColorRamp::from_external(value).map(|r| self.ramp.set(r)).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;
    use crate::value::Value;

    #[test]
    fn test_parts() {
        assert_eq!(Vec3::new(1.0, 0.5, -2.0).to_parts(), ["1", "0.5", "-2"]);
        assert_eq!(Vec2::from_parts(1, &["3", "4"]).unwrap(), Vec2::new(3.0, 4.0));
        assert!(matches!(
            Vec2::from_parts(1, &["3"]),
            Err(SerializeError::MissingField { field: 1, .. })
        ));
        assert!(matches!(
            i32::from_parts(1, &["3", "4"]),
            Err(SerializeError::TrailingFields { extra: 1, .. })
        ));
        assert!(bool::from_parts(1, &["t"]).unwrap());
        assert_eq!(Color::rgba(0.25, 1.0, 0.0, 1.0).to_parts(), ["0.25", "1", "0", "1"]);
    }

    #[test]
    fn test_output_mode_stores_input() {
        let mut graph = Graph::new("test");
        let source = graph.add_node(Box::new(FloatNode::with_value(4.0)));
        let mut sink = FloatNode::with_value(0.0);
        sink.io_mode = IoMode::Output;
        let sink = graph.add_node(Box::new(sink));
        assert_eq!(graph.node(sink).unwrap().inputs.len(), 1);
        graph.connect(sink, 0, source).unwrap();
        graph.process();
        assert_eq!(graph.outputs(), &[sink]);
        assert_eq!(graph.get_float(sink).unwrap(), 4.0);
    }

    #[test]
    fn test_output_mode_rejects_wrong_kind() {
        let mut graph = Graph::new("test");
        let source = graph.add_node(Box::new(IntNode::with_value(4)));
        let mut sink = FloatNode::with_value(0.0);
        sink.io_mode = IoMode::Output;
        let sink = graph.add_node(Box::new(sink));
        graph.connect(sink, 0, source).unwrap();
        graph.rebuild_sink_list();
        assert_eq!(graph.node(sink).unwrap().cached_output_type, ValueType::Error);
        assert!(graph.outputs().is_empty());
    }

    #[test]
    fn test_host_write_without_rebuild() {
        let mut graph = Graph::new("test");
        let a = graph.add_node(Box::new(FloatNode::with_value(1.0)));
        let processor = graph.compile(a).unwrap();
        graph.set_float(a, 6.0).unwrap();
        let value = processor.borrow_mut().eval_value(&graph.eval_context());
        assert_eq!(value, Some(Value::Float(6.0)));
    }

    #[test]
    fn test_curve_and_ramp_nodes() {
        let mut graph = Graph::new("test");
        let t = graph.add_node(Box::new(FloatNode::with_value(0.5)));
        let curve = graph.add_node(Box::new(CurveNode::with_curve(AnimationCurve::linear(0.0, 0.0, 1.0, 2.0))));
        let ramp = graph.add_node(Box::new(RampNode::with_ramp(ColorRamp::default())));
        graph.connect(curve, 0, t).unwrap();
        graph.connect(ramp, 0, t).unwrap();
        graph.rebuild_sink_list();
        assert_eq!(graph.evaluate(curve), Some(Value::Float(1.0)));
        assert_eq!(graph.node(ramp).unwrap().cached_output_type, ValueType::Color);
        assert!(graph.get_curve(curve).is_ok());
        assert!(graph.get_ramp(curve).is_err());
    }
}
