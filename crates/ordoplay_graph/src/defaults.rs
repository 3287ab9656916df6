// SPDX-License-Identifier: MIT OR Apache-2.0
//! Auto-injected constants for unconnected inputs.
//!
//! Every input that allows defaults and has no user source gets a hidden
//! constant node of the matching kind, so evaluators never branch on a
//! missing input. Default nodes use ids below [`NO_NODE`](crate::NO_NODE)
//! and are reused while their kind still fits the input.

use crate::error::SerializeError;
use crate::externals::{ExternalKind, ExternalNode, ExternalValue};
use crate::graph::Graph;
use crate::link::{Link, NodeId};
use crate::node::{Node, NodeEnv, NodeKind, Shared};
use crate::nodes::values::Literal;
use crate::processor::{BuildContext, Evaluator, Output};
use crate::serializer::CustomSerialize;
use crate::typing;
use crate::value::ValueType;
use tracing::debug;

/// Kind id of the default node injected for inputs declared as `ty`
pub fn default_kind_id(ty: ValueType) -> Option<&'static str> {
    match ty {
        ValueType::Float | ValueType::AnyScalar => Some("default_float"),
        ValueType::Int => Some("default_int"),
        ValueType::Bool => Some("default_bool"),
        ValueType::Vector2 => Some("default_vector2"),
        ValueType::Vector3 | ValueType::AnyVector => Some("default_vector3"),
        ValueType::Vector4 => Some("default_vector4"),
        ValueType::Color => Some("default_color"),
        _ => None,
    }
}

/// Hidden constant feeding one input
///
/// Serialized as its components only: `default_vector3|-4|1|0|2`.
#[derive(Debug, Default)]
pub struct DefaultNode<T: Literal> {
    value: Shared<T>,
}

impl<T: Literal> DefaultNode<T> {
    /// Current value
    pub fn value(&self) -> T {
        self.value.get()
    }
}

impl<T: Literal> NodeKind for DefaultNode<T> {
    fn kind_id(&self) -> &'static str {
        T::DEFAULT_ID
    }

    fn name(&self) -> &str {
        T::NAME
    }

    fn output_type(&self) -> ValueType {
        <T as Output>::VALUE_TYPE
    }

    fn controllable(&self) -> bool {
        false
    }

    fn is_default(&self) -> bool {
        true
    }

    fn check_types(&self, _: &mut Vec<Link>, _: &[ValueType], _: &NodeEnv) -> ValueType {
        <T as Output>::VALUE_TYPE
    }

    fn build(&self, _: &BuildContext<'_>) -> Option<Evaluator> {
        let value = self.value.clone();
        Some(Evaluator::new(move |_| value.get()))
    }

    fn custom_serializer(&self) -> Option<&dyn CustomSerialize> {
        Some(self)
    }

    fn custom_serializer_mut(&mut self) -> Option<&mut dyn CustomSerialize> {
        Some(self)
    }

    fn external(&self) -> Option<&dyn ExternalNode> {
        Some(self)
    }
}

impl<T: Literal> CustomSerialize for DefaultNode<T> {
    fn encode(&self) -> String {
        self.value.get().to_parts().join("|")
    }

    fn decode(&mut self, node: i32, parts: &[&str]) -> Result<(), SerializeError> {
        self.value.set(T::from_parts(node, parts)?);
        Ok(())
    }
}

/// Lets the editor edit inline constants through the typed accessors
impl<T: Literal> ExternalNode for DefaultNode<T> {
    fn value_name(&self) -> &str {
        ""
    }

    fn use_as_external(&self) -> bool {
        false
    }

    fn value_type(&self) -> ValueType {
        <T as Output>::VALUE_TYPE
    }

    fn get(&self) -> ExternalValue {
        self.value.get().into_external()
    }

    fn set(&self, value: ExternalValue) -> bool {
        T::from_external(value).map(|v| self.value.set(v)).is_some()
    }
}

impl Graph {
    /// Attach a default node to every input that needs one
    pub(crate) fn inject_defaults(&mut self) {
        let ids: Vec<NodeId> = self.nodes.keys().copied().collect();
        for id in ids {
            let count = self.nodes.get(&id).map_or(0, |node| node.inputs.len());
            for index in 0..count {
                let Some(link) = self.nodes.get(&id).map(|node| node.inputs[index]) else {
                    continue;
                };
                if link.no_defaults || link.is_connected() {
                    continue;
                }
                let Some(kind_id) = default_kind_id(link.value_type) else {
                    continue;
                };

                let candidate = if link.target.is_default() {
                    link.target
                } else {
                    link.last_default
                };
                let reusable = self.nodes.get(&candidate).is_some_and(|node| {
                    node.is_default() && typing::accepts(link.value_type, node.kind.output_type())
                });
                let target = if reusable {
                    candidate
                } else {
                    match self.create_default_node(kind_id) {
                        Some(target) => target,
                        None => continue,
                    }
                };

                if let Some(node) = self.nodes.get_mut(&id) {
                    node.inputs[index].target = target;
                    node.inputs[index].last_default = target;
                }
            }
        }
    }

    /// Create a default node with the next descending id
    pub(crate) fn create_default_node(&mut self, kind_id: &str) -> Option<NodeId> {
        let kind = self.registry.create(kind_id)?;
        let id = NodeId(self.next_default_id);
        self.next_default_id -= 1;
        let mut node = Node::new(id, kind);
        node.cached_output_type = node.kind.output_type();
        self.nodes.insert(id, node);
        debug!(node = %id, kind = kind_id, "Created default node");
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::NO_NODE;
    use crate::nodes::math::{MathNode, MathOp};
    use crate::nodes::values::FloatNode;
    use crate::value::Value;
    use glam::Vec3;

    #[test]
    fn test_default_kind_ids() {
        assert_eq!(default_kind_id(ValueType::AnyScalar), Some("default_float"));
        assert_eq!(default_kind_id(ValueType::AnyVector), Some("default_vector3"));
        assert_eq!(default_kind_id(ValueType::Texture), None);
        assert_eq!(default_kind_id(ValueType::Error), None);
    }

    #[test]
    fn test_payload() {
        let node = DefaultNode::<Vec3>::default();
        node.value.set(Vec3::new(1.0, 0.0, 2.5));
        assert_eq!(node.encode(), "1|0|2.5");

        let mut decoded = DefaultNode::<Vec3>::default();
        decoded.decode(-2, &["1", "0", "2.5"]).unwrap();
        assert_eq!(decoded.value(), Vec3::new(1.0, 0.0, 2.5));
        assert!(decoded.decode(-2, &["1", "0"]).is_err());
    }

    #[test]
    fn test_injection_reuses_defaults() {
        let mut graph = Graph::new("test");
        let add = graph.add_node(Box::new(MathNode::new(MathOp::Add)));
        graph.rebuild_sink_list();
        let first = graph.node(add).unwrap().inputs[0].target;
        assert!(first.is_default());
        graph.set_float(first, 2.5).unwrap();

        let a = graph.add_node(Box::new(FloatNode::with_value(1.0)));
        graph.connect(add, 0, a).unwrap();
        graph.rebuild_sink_list();
        assert_eq!(graph.node(add).unwrap().inputs[0].last_default, first);

        graph.disconnect(add, 0).unwrap();
        assert_eq!(graph.node(add).unwrap().inputs[0].target, NO_NODE);
        graph.rebuild_sink_list();
        assert_eq!(graph.node(add).unwrap().inputs[0].target, first);
        assert_eq!(graph.evaluate(add), Some(Value::Float(2.5)));
    }

    #[test]
    fn test_defaults_are_hidden_and_locked() {
        let mut graph = Graph::new("test");
        let neg = graph.add_node(Box::new(MathNode::new(MathOp::Negative)));
        graph.rebuild_sink_list();
        let default = graph.node(neg).unwrap().inputs[0].target;
        assert!(graph.remove_node(default).is_err());
        assert!(graph.duplicate(&[default]).is_err());
        assert!(graph.externals().is_empty());
        assert!(graph.get_used_defaults().contains(&default));
    }
}
