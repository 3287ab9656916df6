// SPDX-License-Identifier: MIT OR Apache-2.0
//! Blending, branching, comparison and vector assembly nodes.

use super::field_enum;
use crate::error::SerializeError;
use crate::lanes::{with_lanes, Lanes};
use crate::link::{resize_inputs, Link, LinkSettings};
use crate::node::{NodeEnv, NodeKind, Shared};
use crate::processor::{BuildContext, Evaluator, Output};
use crate::serializer::{FieldReader, FieldWriter};
use crate::typing;
use crate::value::{Color, ValueType};
use glam::{Vec2, Vec3, Vec4};
use ordoplay_curves::Interpolation;
use std::f32::consts::TAU;

fn input(in_types: &[ValueType], index: usize) -> ValueType {
    in_types.get(index).copied().unwrap_or(ValueType::None)
}

fn declare_all(inputs: &mut Vec<Link>, layout: &[(ValueType, &'static str)], settings: LinkSettings) {
    resize_inputs(inputs, layout.len());
    for (link, &(ty, name)) in inputs.iter_mut().zip(layout) {
        link.declare(ty, name, settings);
    }
}

fn component_names(ty: ValueType) -> &'static [&'static str] {
    match ty {
        ValueType::Vector2 => &["x", "y"],
        ValueType::Vector3 => &["x", "y", "z"],
        ValueType::Vector4 => &["x", "y", "z", "w"],
        ValueType::Color => &["r", "g", "b", "a"],
        _ => &[],
    }
}

// ----------------------------------------------------------------------
// Lerp
// ----------------------------------------------------------------------

fn lerp_lanes<T: Lanes>() -> Evaluator {
    Evaluator::new(|i| {
        let t = i.get::<f32>(2);
        i.get::<T>(0).zip(i.get::<T>(1), |a, b| Interpolation::lerp(a, b, t))
    })
}

/// Unclamped linear blend between two values of the same kind
#[derive(Debug, Default)]
pub struct LerpNode;

impl NodeKind for LerpNode {
    fn kind_id(&self) -> &'static str {
        "lerp"
    }

    fn name(&self) -> &str {
        "Lerp"
    }

    fn output_type(&self) -> ValueType {
        ValueType::AnyScalar
    }

    fn configure(&mut self, inputs: &mut Vec<Link>) {
        declare_all(
            inputs,
            &[(ValueType::AnyScalar, "A"), (ValueType::AnyScalar, "B"), (ValueType::Float, "t")],
            LinkSettings::REQUIRED,
        );
    }

    fn check_types(&self, _: &mut Vec<Link>, in_types: &[ValueType], _: &NodeEnv) -> ValueType {
        let ty = typing::value_only(typing::same(&[input(in_types, 0), input(in_types, 1)]));
        if input(in_types, 2) == ValueType::Float { ty } else { ValueType::Error }
    }

    fn build(&self, cx: &BuildContext<'_>) -> Option<Evaluator> {
        match cx.output_type() {
            ValueType::Int => Some(Evaluator::new(|i| {
                let (a, b) = (i.get::<i32>(0) as f32, i.get::<i32>(1) as f32);
                Interpolation::lerp(a, b, i.get::<f32>(2)) as i32
            })),
            ty => with_lanes!(ty, |T| lerp_lanes::<T>()),
        }
    }
}

// ----------------------------------------------------------------------
// Condition
// ----------------------------------------------------------------------

field_enum! {
    /// Float comparison
    pub enum ConditionOp: "operation" {
        /// `a > b`
        AMoreThanB,
        /// `a >= b`
        AMoreOrEqualB,
        /// `a == b`
        AEqualB,
    }
}

impl ConditionOp {
    /// Compare two floats
    pub fn test(self, a: f32, b: f32) -> bool {
        match self {
            Self::AMoreThanB => a > b,
            Self::AMoreOrEqualB => a >= b,
            Self::AEqualB => a == b,
        }
    }
}

/// Compare two floats into a bool
#[derive(Debug, Default)]
pub struct ConditionNode {
    /// Comparison
    pub op: ConditionOp,
    /// Negate the result
    pub invert: bool,
}

impl NodeKind for ConditionNode {
    fn kind_id(&self) -> &'static str {
        "condition"
    }

    fn name(&self) -> &str {
        "Condition"
    }

    fn output_type(&self) -> ValueType {
        ValueType::Bool
    }

    fn configure(&mut self, inputs: &mut Vec<Link>) {
        declare_all(
            inputs,
            &[(ValueType::Float, "A"), (ValueType::Float, "B")],
            LinkSettings::REQUIRED,
        );
    }

    fn check_types(&self, _: &mut Vec<Link>, in_types: &[ValueType], _: &NodeEnv) -> ValueType {
        if input(in_types, 0) == ValueType::Float && input(in_types, 1) == ValueType::Float {
            ValueType::Bool
        } else {
            ValueType::Error
        }
    }

    fn build(&self, _: &BuildContext<'_>) -> Option<Evaluator> {
        let (op, invert) = (self.op, self.invert);
        Some(Evaluator::new(move |i| op.test(i.get::<f32>(0), i.get::<f32>(1)) ^ invert))
    }

    fn write_fields(&self, w: &mut FieldWriter) {
        w.enumeration(self.op);
        w.boolean(self.invert);
    }

    fn read_fields(&mut self, r: &mut FieldReader<'_>) -> Result<(), SerializeError> {
        self.op = r.enumeration()?;
        self.invert = r.boolean()?;
        Ok(())
    }
}

// ----------------------------------------------------------------------
// If
// ----------------------------------------------------------------------

fn branch<T: Output>() -> Evaluator {
    Evaluator::new(|i| if i.get::<bool>(0) { i.get::<T>(1) } else { i.get::<T>(2) })
}

/// Pick one of two values by a bool
///
/// Only the selected branch is evaluated.
#[derive(Debug, Default)]
pub struct IfNode;

impl NodeKind for IfNode {
    fn kind_id(&self) -> &'static str {
        "if"
    }

    fn name(&self) -> &str {
        "If"
    }

    fn output_type(&self) -> ValueType {
        ValueType::AnyScalar
    }

    fn configure(&mut self, inputs: &mut Vec<Link>) {
        declare_all(
            inputs,
            &[(ValueType::Bool, "If"), (ValueType::AnyScalar, "Then"), (ValueType::AnyScalar, "Else")],
            LinkSettings::REQUIRED,
        );
    }

    fn check_types(&self, _: &mut Vec<Link>, in_types: &[ValueType], _: &NodeEnv) -> ValueType {
        if input(in_types, 0) != ValueType::Bool {
            return ValueType::Error;
        }
        typing::value_only(typing::same(&[input(in_types, 1), input(in_types, 2)]))
    }

    fn build(&self, cx: &BuildContext<'_>) -> Option<Evaluator> {
        match cx.output_type() {
            ValueType::Int => Some(branch::<i32>()),
            ty => with_lanes!(ty, |T| branch::<T>()),
        }
    }
}

// ----------------------------------------------------------------------
// Bool operator
// ----------------------------------------------------------------------

field_enum! {
    /// Bool operation
    pub enum BoolOp: "operation" {
        /// `!a`
        InvertA,
        /// True on the ticks where `a` changed
        TriggerA,
        /// `a == b`
        Equal,
        /// `a || b`
        Or,
        /// `a && b`
        And,
        /// `a ^ b`
        Xor,
    }
}

impl BoolOp {
    /// Whether input B is read
    pub fn uses_b(self) -> bool {
        !matches!(self, Self::InvertA | Self::TriggerA)
    }
}

/// Bool logic and edge detection
#[derive(Debug, Default)]
pub struct BoolOperatorNode {
    /// Selected operation
    pub op: BoolOp,
    last: Shared<bool>,
}

impl BoolOperatorNode {
    /// Create a node for `op`
    pub fn new(op: BoolOp) -> Self {
        Self {
            op,
            ..Self::default()
        }
    }
}

impl NodeKind for BoolOperatorNode {
    fn kind_id(&self) -> &'static str {
        "bool_operator"
    }

    fn name(&self) -> &str {
        "Bool Operator"
    }

    fn output_type(&self) -> ValueType {
        ValueType::Bool
    }

    fn configure(&mut self, inputs: &mut Vec<Link>) {
        resize_inputs(inputs, 2);
        inputs[0].declare(ValueType::Bool, "A", LinkSettings::REQUIRED);
        let b = if self.op.uses_b() {
            LinkSettings::REQUIRED
        } else {
            LinkSettings::NONE
        };
        inputs[1].declare(ValueType::Bool, "B", b);
    }

    fn check_types(&self, _: &mut Vec<Link>, in_types: &[ValueType], _: &NodeEnv) -> ValueType {
        let b = input(in_types, 1);
        if input(in_types, 0) == ValueType::Bool && typing::exact_or_none(b, ValueType::Bool) {
            ValueType::Bool
        } else {
            ValueType::Error
        }
    }

    fn build(&self, _: &BuildContext<'_>) -> Option<Evaluator> {
        Some(match self.op {
            BoolOp::InvertA => Evaluator::new(|i| !i.get::<bool>(0)),
            BoolOp::TriggerA => {
                let last = self.last.clone();
                Evaluator::new(move |i| {
                    let value = i.get::<bool>(0);
                    last.with_mut(|last| std::mem::replace(last, value) != value)
                })
            }
            BoolOp::Equal => Evaluator::new(|i| i.get::<bool>(0) == i.get::<bool>(1)),
            BoolOp::Or => Evaluator::new(|i| i.get::<bool>(0) || i.get::<bool>(1)),
            BoolOp::And => Evaluator::new(|i| i.get::<bool>(0) && i.get::<bool>(1)),
            BoolOp::Xor => Evaluator::new(|i| i.get::<bool>(0) ^ i.get::<bool>(1)),
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

// ----------------------------------------------------------------------
// Vector modify and constructor
// ----------------------------------------------------------------------

fn modify<T: Lanes>() -> Evaluator {
    Evaluator::new(|i| {
        let mut lanes = i.try_get::<T>(0).unwrap_or_default().to_lanes();
        for (c, lane) in lanes.iter_mut().enumerate().take(T::LANES) {
            if let Some(v) = i.try_get::<f32>(c + 1) {
                *lane = v;
            }
        }
        T::from_lanes(lanes)
    })
}

/// Override single components of a vector
///
/// One optional float input per component follows the vector input;
/// their number tracks the connected vector kind.
#[derive(Debug, Default)]
pub struct VecModifyNode;

impl NodeKind for VecModifyNode {
    fn kind_id(&self) -> &'static str {
        "vec_modify"
    }

    fn name(&self) -> &str {
        "Vec Modify"
    }

    fn output_type(&self) -> ValueType {
        ValueType::AnyVector
    }

    fn configure(&mut self, inputs: &mut Vec<Link>) {
        if inputs.is_empty() {
            resize_inputs(inputs, 1);
        }
        inputs[0].declare(ValueType::AnyVector, "Vec", LinkSettings::NO_DEFAULTS);
    }

    fn check_types(&self, inputs: &mut Vec<Link>, in_types: &[ValueType], _: &NodeEnv) -> ValueType {
        let vector = input(in_types, 0);
        let names = component_names(vector);
        resize_inputs(inputs, 1 + names.len());
        for (link, &name) in inputs[1..].iter_mut().zip(names) {
            link.declare(ValueType::Float, name, LinkSettings::NO_DEFAULTS);
        }

        let components_ok = (1..inputs.len()).all(|i| typing::exact_or_none(input(in_types, i), ValueType::Float));
        if components_ok { typing::vector_only(vector) } else { ValueType::Error }
    }

    fn build(&self, cx: &BuildContext<'_>) -> Option<Evaluator> {
        let ty = cx.output_type();
        if ty == ValueType::Float {
            return None;
        }
        with_lanes!(ty, |T| modify::<T>())
    }
}

field_enum! {
    /// Vector kind built by [`VecConstructorNode`]
    pub enum VectorKind: "vector type" {
        /// Vector2
        Vec2,
        /// Vector3
        Vec3,
        /// Vector4
        Vec4,
        /// Color
        Color,
    }
}

impl VectorKind {
    /// Output kind
    pub fn value_type(self) -> ValueType {
        match self {
            Self::Vec2 => ValueType::Vector2,
            Self::Vec3 => ValueType::Vector3,
            Self::Vec4 => ValueType::Vector4,
            Self::Color => ValueType::Color,
        }
    }
}

fn construct<T: Lanes>() -> Evaluator {
    Evaluator::new(|i| {
        let mut lanes = [0.0; 4];
        for (c, lane) in lanes.iter_mut().enumerate().take(T::LANES) {
            *lane = i.get::<f32>(c);
        }
        T::from_lanes(lanes)
    })
}

/// Assemble a vector or color from floats
#[derive(Debug, Default)]
pub struct VecConstructorNode {
    /// Kind to build
    pub vector_type: VectorKind,
}

impl VecConstructorNode {
    /// Create a node building `vector_type`
    pub fn new(vector_type: VectorKind) -> Self {
        Self { vector_type }
    }
}

impl NodeKind for VecConstructorNode {
    fn kind_id(&self) -> &'static str {
        "vec_constructor"
    }

    fn name(&self) -> &str {
        "Constructor"
    }

    fn output_type(&self) -> ValueType {
        self.vector_type.value_type()
    }

    fn configure(&mut self, inputs: &mut Vec<Link>) {
        let names = component_names(self.vector_type.value_type());
        resize_inputs(inputs, names.len());
        for (link, &name) in inputs.iter_mut().zip(names) {
            link.declare(ValueType::Float, name, LinkSettings::NONE);
        }
    }

    fn check_types(&self, _: &mut Vec<Link>, in_types: &[ValueType], _: &NodeEnv) -> ValueType {
        if in_types.iter().all(|&t| typing::exact_or_none(t, ValueType::Float)) {
            self.output_type()
        } else {
            ValueType::Error
        }
    }

    fn build(&self, _: &BuildContext<'_>) -> Option<Evaluator> {
        Some(match self.vector_type {
            VectorKind::Vec2 => construct::<Vec2>(),
            VectorKind::Vec3 => construct::<Vec3>(),
            VectorKind::Vec4 => construct::<Vec4>(),
            VectorKind::Color => construct::<Color>(),
        })
    }

    fn write_fields(&self, w: &mut FieldWriter) {
        w.enumeration(self.vector_type);
    }

    fn read_fields(&mut self, r: &mut FieldReader<'_>) -> Result<(), SerializeError> {
        self.vector_type = r.enumeration()?;
        Ok(())
    }
}

// ----------------------------------------------------------------------
// Color HSV
// ----------------------------------------------------------------------

field_enum! {
    /// Color space conversion
    pub enum HsvOp: "operation" {
        /// Color to hue, saturation and value
        RgbToHsv,
        /// Hue, saturation and value vector to color
        HsvToRgb,
        /// Three floats to color
        HsvValuesToRgb,
    }
}

/// Convert between RGB and HSV
#[derive(Debug, Default)]
pub struct ColorHsvNode {
    /// Selected conversion
    pub op: HsvOp,
}

impl NodeKind for ColorHsvNode {
    fn kind_id(&self) -> &'static str {
        "color_hsv"
    }

    fn name(&self) -> &str {
        "RGB/HSV"
    }

    fn output_type(&self) -> ValueType {
        match self.op {
            HsvOp::RgbToHsv => ValueType::Vector3,
            _ => ValueType::Color,
        }
    }

    fn configure(&mut self, inputs: &mut Vec<Link>) {
        let layout: &[(ValueType, &'static str)] = match self.op {
            HsvOp::RgbToHsv => &[(ValueType::Color, "RGB")],
            HsvOp::HsvToRgb => &[(ValueType::Vector3, "HSV")],
            HsvOp::HsvValuesToRgb => &[
                (ValueType::Float, "Hue"),
                (ValueType::Float, "Saturation"),
                (ValueType::Float, "Value"),
            ],
        };
        declare_all(inputs, layout, LinkSettings::REQUIRED);
    }

    fn check_types(&self, _: &mut Vec<Link>, in_types: &[ValueType], _: &NodeEnv) -> ValueType {
        let ok = match self.op {
            HsvOp::RgbToHsv => input(in_types, 0) == ValueType::Color,
            HsvOp::HsvToRgb => input(in_types, 0) == ValueType::Vector3,
            HsvOp::HsvValuesToRgb => typing::same(in_types) == ValueType::Float,
        };
        if ok { self.output_type() } else { ValueType::Error }
    }

    fn build(&self, _: &BuildContext<'_>) -> Option<Evaluator> {
        Some(match self.op {
            HsvOp::RgbToHsv => Evaluator::new(|i| i.get::<Color>(0).to_hsv()),
            HsvOp::HsvToRgb => Evaluator::new(|i| {
                let hsv = i.get::<Vec3>(0);
                Color::from_hsv(hsv.x, hsv.y, hsv.z)
            }),
            HsvOp::HsvValuesToRgb => {
                Evaluator::new(|i| Color::from_hsv(i.get::<f32>(0), i.get::<f32>(1), i.get::<f32>(2)))
            }
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

// ----------------------------------------------------------------------
// Convert
// ----------------------------------------------------------------------

field_enum! {
    /// Angle unit conversion; "one" is a full turn
    pub enum ConvertOp: "operation" {
        /// Degrees to radians
        Deg2Rad,
        /// Radians to degrees
        Rad2Deg,
        /// Turns to radians
        One2Rad,
        /// Radians to turns
        Rad2One,
        /// Turns to degrees
        One2Deg,
        /// Degrees to turns
        Deg2One,
    }
}

impl ConvertOp {
    /// Multiplier applied to every component
    pub fn factor(self) -> f32 {
        match self {
            Self::Deg2Rad => TAU / 360.0,
            Self::Rad2Deg => 360.0 / TAU,
            Self::One2Rad => TAU,
            Self::Rad2One => 1.0 / TAU,
            Self::One2Deg => 360.0,
            Self::Deg2One => 1.0 / 360.0,
        }
    }
}

/// Angle unit conversion applied per component
#[derive(Debug, Default)]
pub struct ConvertNode {
    /// Selected conversion
    pub op: ConvertOp,
}

impl NodeKind for ConvertNode {
    fn kind_id(&self) -> &'static str {
        "convert"
    }

    fn name(&self) -> &str {
        "Convert"
    }

    fn output_type(&self) -> ValueType {
        ValueType::AnyScalar
    }

    fn configure(&mut self, inputs: &mut Vec<Link>) {
        declare_all(inputs, &[(ValueType::AnyScalar, "In")], LinkSettings::REQUIRED);
    }

    fn check_types(&self, _: &mut Vec<Link>, in_types: &[ValueType], _: &NodeEnv) -> ValueType {
        let ty = input(in_types, 0);
        if ty.is_value_except_int() { ty } else { ValueType::Error }
    }

    fn build(&self, cx: &BuildContext<'_>) -> Option<Evaluator> {
        let factor = self.op.factor();
        with_lanes!(cx.output_type(), |T| Evaluator::new(move |i| i.get::<T>(0).map(|v| v * factor)))
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
    use crate::link::NodeId;
    use crate::nodes::values::{BoolNode, ColorNode, FloatNode, IntNode, Vector3Node};
    use crate::value::Value;

    fn wire(graph: &mut Graph, kind: impl NodeKind + 'static, sources: &[(usize, NodeId)]) -> NodeId {
        let id = graph.add_node(Box::new(kind));
        for &(index, source) in sources {
            graph.connect(id, index, source).unwrap();
        }
        id
    }

    #[test]
    fn test_lerp() {
        let mut graph = Graph::new("test");
        let a = graph.add_node(Box::new(IntNode::with_value(0)));
        let b = graph.add_node(Box::new(IntNode::with_value(10)));
        let t = graph.add_node(Box::new(FloatNode::with_value(1.5)));
        let lerp = wire(&mut graph, LerpNode, &[(0, a), (1, b), (2, t)]);
        assert_eq!(graph.evaluate(lerp), Some(Value::Int(15)));
    }

    #[test]
    fn test_lerp_needs_float_t() {
        let mut graph = Graph::new("test");
        let a = graph.add_node(Box::new(FloatNode::with_value(0.0)));
        let t = graph.add_node(Box::new(IntNode::with_value(1)));
        let lerp = wire(&mut graph, LerpNode, &[(0, a), (1, a), (2, t)]);
        assert_eq!(graph.evaluate(lerp), None);
    }

    #[test]
    fn test_condition_invert() {
        let mut graph = Graph::new("test");
        let a = graph.add_node(Box::new(FloatNode::with_value(2.0)));
        let b = graph.add_node(Box::new(FloatNode::with_value(2.0)));
        let cond = ConditionNode {
            op: ConditionOp::AMoreOrEqualB,
            invert: true,
        };
        let id = wire(&mut graph, cond, &[(0, a), (1, b)]);
        assert_eq!(graph.evaluate(id), Some(Value::Bool(false)));
    }

    #[test]
    fn test_if_branches() {
        let mut graph = Graph::new("test");
        let c = graph.add_node(Box::new(BoolNode::with_value(false)));
        let x = graph.add_node(Box::new(IntNode::with_value(1)));
        let y = graph.add_node(Box::new(IntNode::with_value(2)));
        let id = wire(&mut graph, IfNode, &[(0, c), (1, x), (2, y)]);
        assert_eq!(graph.evaluate(id), Some(Value::Int(2)));
    }

    #[test]
    fn test_trigger_detects_edges() {
        let mut graph = Graph::new("test");
        let a = graph.add_node(Box::new(BoolNode::with_value(false)));
        let id = wire(&mut graph, BoolOperatorNode::new(BoolOp::TriggerA), &[(0, a)]);
        let trigger = graph.compile(id).unwrap();
        let cx = graph.eval_context();
        assert!(!trigger.borrow_mut().eval::<bool>(&cx));

        graph.set_bool(a, true).unwrap();
        assert!(trigger.borrow_mut().eval::<bool>(&cx));
        assert!(!trigger.borrow_mut().eval::<bool>(&cx));
        graph.set_bool(a, false).unwrap();
        assert!(trigger.borrow_mut().eval::<bool>(&cx));
    }

    #[test]
    fn test_binary_bool_requires_b() {
        let mut graph = Graph::new("test");
        let a = graph.add_node(Box::new(BoolNode::with_value(true)));
        let id = wire(&mut graph, BoolOperatorNode::new(BoolOp::And), &[(0, a)]);
        graph.rebuild_sink_list();
        let link = graph.node(id).unwrap().inputs[1];
        assert!(link.required);
        // Injected default is false
        assert_eq!(graph.evaluate(id), Some(Value::Bool(false)));
    }

    #[test]
    fn test_vec_modify_overrides() {
        let mut graph = Graph::new("test");
        let v = graph.add_node(Box::new(Vector3Node::with_value(Vec3::new(1.0, 2.0, 3.0))));
        let id = wire(&mut graph, VecModifyNode, &[(0, v)]);
        graph.rebuild_sink_list();
        assert_eq!(graph.node(id).unwrap().inputs.len(), 4);
        assert_eq!(graph.node(id).unwrap().inputs[3].name, "z");

        let y = graph.add_node(Box::new(FloatNode::with_value(9.0)));
        graph.connect(id, 2, y).unwrap();
        assert_eq!(graph.evaluate(id), Some(Value::Vector3(Vec3::new(1.0, 9.0, 3.0))));
    }

    #[test]
    fn test_vec_modify_without_vector_is_error() {
        let mut graph = Graph::new("test");
        let id = graph.add_node(Box::new(VecModifyNode));
        graph.rebuild_sink_list();
        assert_eq!(graph.node(id).unwrap().inputs.len(), 1);
        assert_eq!(graph.evaluate(id), None);
    }

    #[test]
    fn test_constructor_defaults_to_zero() {
        let mut graph = Graph::new("test");
        let x = graph.add_node(Box::new(FloatNode::with_value(4.0)));
        let id = wire(&mut graph, VecConstructorNode::new(VectorKind::Vec3), &[(0, x)]);
        assert_eq!(graph.evaluate(id), Some(Value::Vector3(Vec3::new(4.0, 0.0, 0.0))));
    }

    #[test]
    fn test_hsv_round_trip() {
        let mut graph = Graph::new("test");
        let c = graph.add_node(Box::new(ColorNode::with_value(Color::rgba(1.0, 0.0, 0.0, 1.0))));
        let to_hsv = wire(&mut graph, ColorHsvNode { op: HsvOp::RgbToHsv }, &[(0, c)]);
        let back = wire(&mut graph, ColorHsvNode { op: HsvOp::HsvToRgb }, &[(0, to_hsv)]);
        assert_eq!(graph.evaluate(to_hsv), Some(Value::Vector3(Vec3::new(0.0, 1.0, 1.0))));
        assert_eq!(graph.evaluate(back), Some(Value::Color(Color::rgba(1.0, 0.0, 0.0, 1.0))));
    }

    #[test]
    fn test_convert() {
        assert_eq!(ConvertOp::One2Deg.factor(), 360.0);
        let mut graph = Graph::new("test");
        let f = graph.add_node(Box::new(FloatNode::with_value(0.5)));
        let id = wire(&mut graph, ConvertNode { op: ConvertOp::One2Deg }, &[(0, f)]);
        assert_eq!(graph.evaluate(id), Some(Value::Float(180.0)));

        let i = graph.add_node(Box::new(IntNode::with_value(1)));
        graph.connect(id, 0, i).unwrap();
        assert_eq!(graph.evaluate(id), None);
    }
}
