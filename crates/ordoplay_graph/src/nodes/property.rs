// SPDX-License-Identifier: MIT OR Apache-2.0
//! Taps into host properties through the graph's [`PropertyBinder`].

use crate::binder::PropertyBinder;
use crate::error::SerializeError;
use crate::link::{resize_inputs, Link, LinkSettings};
use crate::node::{NodeEnv, NodeKind};
use crate::processor::{BuildContext, Evaluator, Output};
use crate::serializer::{FieldReader, FieldWriter};
use crate::value::{Color, MeshHandle, TextureHandle, ValueType};
use glam::{Vec2, Vec3, Vec4};
use std::rc::Rc;
use tracing::warn;

macro_rules! with_output {
    ($ty:expr, |$t:ident| $body:expr) => {
        match $ty {
            ValueType::Float => { type $t = f32; Some($body) }
            ValueType::Int => { type $t = i32; Some($body) }
            ValueType::Bool => { type $t = bool; Some($body) }
            ValueType::Vector2 => { type $t = Vec2; Some($body) }
            ValueType::Vector3 => { type $t = Vec3; Some($body) }
            ValueType::Vector4 => { type $t = Vec4; Some($body) }
            ValueType::Color => { type $t = Color; Some($body) }
            ValueType::Texture => { type $t = TextureHandle; Some($body) }
            ValueType::Mesh => { type $t = MeshHandle; Some($body) }
            _ => None,
        }
    };
}

fn read<T: Output>(binder: Rc<dyn PropertyBinder>, address: String) -> Evaluator {
    Evaluator::new(move |_| binder.get(&address).and_then(T::from_value).unwrap_or_default())
}

fn write<T: Output>(binder: Rc<dyn PropertyBinder>, address: String) -> Evaluator {
    Evaluator::void(move |i| {
        if !binder.set(&address, i.get::<T>(0).into_value()) {
            warn!(address = %address, "Property rejected write");
        }
    })
}

/// Reads a host property every tick
#[derive(Debug, Default)]
pub struct PropertyInputNode {
    /// Binder address
    pub address: String,
}

impl PropertyInputNode {
    /// Tap `address`
    pub fn new(address: impl Into<String>) -> Self {
        Self { address: address.into() }
    }
}

impl NodeKind for PropertyInputNode {
    fn kind_id(&self) -> &'static str {
        "property_input"
    }

    fn name(&self) -> &str {
        "Property Input"
    }

    fn output_type(&self) -> ValueType {
        ValueType::AnyScalar
    }

    fn check_types(&self, _: &mut Vec<Link>, _: &[ValueType], env: &NodeEnv) -> ValueType {
        env.binder
            .as_ref()
            .and_then(|b| b.readable_type(&self.address))
            .unwrap_or(ValueType::Error)
    }

    fn build(&self, cx: &BuildContext<'_>) -> Option<Evaluator> {
        let binder = cx.env().binder.clone()?;
        with_output!(cx.output_type(), |T| read::<T>(binder, self.address.clone()))
    }

    fn write_fields(&self, w: &mut FieldWriter) {
        w.string(&self.address);
    }

    fn read_fields(&mut self, r: &mut FieldReader<'_>) -> Result<(), SerializeError> {
        self.address = r.string()?;
        Ok(())
    }
}

/// Writes its input to a host property every tick
#[derive(Debug, Default)]
pub struct PropertyOutputNode {
    /// Binder address
    pub address: String,
}

impl PropertyOutputNode {
    /// Tap `address`
    pub fn new(address: impl Into<String>) -> Self {
        Self { address: address.into() }
    }
}

impl NodeKind for PropertyOutputNode {
    fn kind_id(&self) -> &'static str {
        "property_output"
    }

    fn name(&self) -> &str {
        "Property Output"
    }

    fn output_type(&self) -> ValueType {
        ValueType::None
    }

    fn configure(&mut self, inputs: &mut Vec<Link>) {
        resize_inputs(inputs, 1);
        inputs[0].declare(ValueType::None, "In", LinkSettings::REQUIRED_NO_DEFAULTS);
    }

    fn check_types(&self, inputs: &mut Vec<Link>, in_types: &[ValueType], env: &NodeEnv) -> ValueType {
        let writable = env.binder.as_ref().and_then(|b| b.writable_type(&self.address));
        let Some(writable) = writable else {
            inputs[0].value_type = ValueType::Error;
            return ValueType::Error;
        };
        inputs[0].value_type = writable;
        if in_types.first() == Some(&writable) {
            ValueType::None
        } else {
            ValueType::Error
        }
    }

    fn build(&self, cx: &BuildContext<'_>) -> Option<Evaluator> {
        let binder = cx.env().binder.clone()?;
        with_output!(cx.input_type(0), |T| write::<T>(binder, self.address.clone()))
    }

    fn write_fields(&self, w: &mut FieldWriter) {
        w.string(&self.address);
    }

    fn read_fields(&mut self, r: &mut FieldReader<'_>) -> Result<(), SerializeError> {
        self.address = r.string()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::PropertyMap;
    use crate::graph::Graph;
    use crate::nodes::math::{MathNode, MathOp};
    use crate::nodes::values::FloatNode;
    use crate::value::Value;

    fn graph_with(map: &Rc<PropertyMap>) -> Graph {
        let mut graph = Graph::new("test");
        graph.set_binder(map.clone());
        graph
    }

    #[test]
    fn test_input_reads_host() {
        let map = Rc::new(PropertyMap::new());
        map.insert("speed", Value::Float(2.5));
        let mut graph = graph_with(&map);
        let id = graph.add_node(Box::new(PropertyInputNode::new("speed")));
        assert_eq!(graph.evaluate(id), Some(Value::Float(2.5)));

        map.insert("speed", Value::Float(4.0));
        assert_eq!(graph.evaluate(id), Some(Value::Float(4.0)));
    }

    #[test]
    fn test_unknown_address_is_error() {
        let map = Rc::new(PropertyMap::new());
        let mut graph = graph_with(&map);
        let id = graph.add_node(Box::new(PropertyInputNode::new("nope")));
        assert_eq!(graph.evaluate(id), None);
        assert_eq!(graph.node(id).unwrap().cached_output_type, ValueType::Error);
    }

    #[test]
    fn test_output_writes_each_tick() {
        let map = Rc::new(PropertyMap::new());
        map.insert("height", Value::Float(0.0));
        let mut graph = graph_with(&map);
        let a = graph.add_node(Box::new(FloatNode::with_value(1.5)));
        let b = graph.add_node(Box::new(FloatNode::with_value(2.0)));
        let sum = graph.add_node(Box::new(MathNode::new(MathOp::Add)));
        graph.connect(sum, 0, a).unwrap();
        graph.connect(sum, 1, b).unwrap();
        let out = graph.add_node(Box::new(PropertyOutputNode::new("height")));
        graph.connect(out, 0, sum).unwrap();

        graph.process();
        assert_eq!(graph.outputs(), &[out]);
        assert_eq!(map.value("height"), Some(Value::Float(3.5)));
    }

    #[test]
    fn test_output_type_mismatch() {
        let map = Rc::new(PropertyMap::new());
        map.insert("count", Value::Int(0));
        let mut graph = graph_with(&map);
        let f = graph.add_node(Box::new(FloatNode::with_value(1.0)));
        let out = graph.add_node(Box::new(PropertyOutputNode::new("count")));
        graph.connect(out, 0, f).unwrap();

        graph.process();
        assert!(graph.outputs().is_empty());
        assert_eq!(map.value("count"), Some(Value::Int(0)));
        assert_eq!(graph.node(out).unwrap().inputs[0].value_type, ValueType::Int);
    }
}
