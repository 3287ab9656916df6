// SPDX-License-Identifier: MIT OR Apache-2.0
//! The node contract and the node container stored in a graph.

use crate::binder::PropertyBinder;
use crate::error::SerializeError;
use crate::externals::ExternalNode;
use crate::link::{Link, NodeId};
use crate::processor::{BuildContext, Evaluator};
use crate::serializer::{CustomSerialize, FieldReader, FieldWriter};
use crate::value::ValueType;
use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Node type category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeCategory {
    /// Literal values and host-facing value slots
    Value,
    /// Auto-injected constants
    Default,
    /// Scalar and component-wise math
    Math,
    /// Vector and quaternion algebra
    Vector,
    /// Conditions and branching
    Logic,
    /// Nodes with state carried between ticks
    Time,
    /// Random and coherent noise
    Noise,
    /// Curve and ramp lookups
    Lookup,
    /// Host property taps
    Property,
}

/// Downcasting support for boxed node kinds
pub trait AsAny {
    /// As `&dyn Any`
    fn as_any(&self) -> &dyn Any;
    /// As `&mut dyn Any`
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Host services available to type checking and evaluator building
#[derive(Clone, Default)]
pub struct NodeEnv {
    /// Resolver for property taps
    pub binder: Option<Rc<dyn PropertyBinder>>,
}

impl fmt::Debug for NodeEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeEnv")
            .field("binder", &self.binder.is_some())
            .finish()
    }
}

/// Behaviour of one concrete node kind
///
/// A kind declares its inputs in [`configure`](Self::configure), resolves
/// its output type from its input types in
/// [`check_types`](Self::check_types), and compiles itself to a closure in
/// [`build`](Self::build). Configuration lives in the kind's own fields,
/// which the serializer walks through [`write_fields`](Self::write_fields)
/// and [`read_fields`](Self::read_fields).
pub trait NodeKind: AsAny + fmt::Debug {
    /// Stable id used by the registry and serializer
    fn kind_id(&self) -> &'static str;

    /// Display name
    fn name(&self) -> &str;

    /// Declared output kind for the current configuration
    fn output_type(&self) -> ValueType;

    /// Whether the editor may remove or duplicate this node
    fn controllable(&self) -> bool {
        true
    }

    /// Whether this is an auto-injected constant
    fn is_default(&self) -> bool {
        false
    }

    /// Declare the inputs for the current configuration
    ///
    /// Must be idempotent. Existing connections are kept.
    fn configure(&mut self, inputs: &mut Vec<Link>) {
        let _ = inputs;
    }

    /// Resolve the output kind from the resolved input kinds
    ///
    /// May adjust input declarations that depend on input kinds.
    fn check_types(&self, inputs: &mut Vec<Link>, in_types: &[ValueType], env: &NodeEnv) -> ValueType;

    /// Compile the node; `None` when the configuration cannot be compiled
    fn build(&self, cx: &BuildContext<'_>) -> Option<Evaluator>;

    /// Write serialized fields in declaration order
    fn write_fields(&self, w: &mut FieldWriter) {
        let _ = w;
    }

    /// Read serialized fields in declaration order
    fn read_fields(&mut self, r: &mut FieldReader<'_>) -> Result<(), SerializeError> {
        let _ = r;
        Ok(())
    }

    /// Opaque payload encoding replacing the field walk
    fn custom_serializer(&self) -> Option<&dyn CustomSerialize> {
        None
    }

    /// Mutable access to the custom payload encoding
    fn custom_serializer_mut(&mut self) -> Option<&mut dyn CustomSerialize> {
        None
    }

    /// Value slot exposed to the host
    fn external(&self) -> Option<&dyn ExternalNode> {
        None
    }

    /// Mutable access to the exposed value slot
    fn external_mut(&mut self) -> Option<&mut dyn ExternalNode> {
        None
    }
}

/// Shallow-cloned cell shared between a node and its compiled evaluator
///
/// Recompiling hands the same cell to the new closure, so state survives
/// [`Graph::prepare`](crate::Graph::prepare) and host writes are visible
/// without a rebuild.
pub struct Shared<T>(Rc<RefCell<T>>);

impl<T> Shared<T> {
    /// Wrap a value
    pub fn new(value: T) -> Self {
        Self(Rc::new(RefCell::new(value)))
    }

    /// Replace the value
    pub fn set(&self, value: T) {
        *self.0.borrow_mut() = value;
    }

    /// Read through a closure
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.0.borrow())
    }

    /// Modify through a closure
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.0.borrow_mut())
    }
}

impl<T: Clone> Shared<T> {
    /// Copy of the value
    pub fn get(&self) -> T {
        self.0.borrow().clone()
    }
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T: Default> Default for Shared<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.borrow().fmt(f)
    }
}

/// A node instance in the graph
#[derive(Debug)]
pub struct Node {
    /// Unique id within the graph
    pub id: NodeId,
    /// Position in the editor canvas
    pub position: [f32; 2],
    /// Input links
    pub inputs: Vec<Link>,
    /// Output kind from the last type pass
    pub cached_output_type: ValueType,
    /// Kind-specific behaviour and fields
    pub kind: Box<dyn NodeKind>,
}

impl Node {
    /// Create a node and declare its inputs
    pub fn new(id: NodeId, kind: Box<dyn NodeKind>) -> Self {
        let mut node = Self {
            id,
            position: [0.0, 0.0],
            inputs: Vec::new(),
            cached_output_type: ValueType::None,
            kind,
        };
        node.configure();
        node.cached_output_type = node.kind.output_type();
        node
    }

    /// Set the position
    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.position = [x, y];
        self
    }

    /// Redeclare inputs for the kind's current configuration
    pub fn configure(&mut self) {
        self.kind.configure(&mut self.inputs);
    }

    /// Resolve and cache the output type
    pub fn resolve_type(&mut self, in_types: &[ValueType], env: &NodeEnv) -> ValueType {
        let ty = self.kind.check_types(&mut self.inputs, in_types, env);
        self.cached_output_type = ty;
        ty
    }

    /// Stable kind id
    pub fn kind_id(&self) -> &'static str {
        self.kind.kind_id()
    }

    /// Display name
    pub fn name(&self) -> &str {
        self.kind.name()
    }

    /// Check if the editor may remove or duplicate this node
    pub fn controllable(&self) -> bool {
        self.kind.controllable()
    }

    /// Check if this is an auto-injected constant
    pub fn is_default(&self) -> bool {
        self.kind.is_default()
    }

    /// Get an input link by index
    pub fn input(&self, index: usize) -> Option<&Link> {
        self.inputs.get(index)
    }

    /// Borrow the kind as a concrete type
    pub fn downcast_ref<T: NodeKind + 'static>(&self) -> Option<&T> {
        (*self.kind).as_any().downcast_ref()
    }

    /// Mutably borrow the kind as a concrete type
    pub fn downcast_mut<T: NodeKind + 'static>(&mut self) -> Option<&mut T> {
        (*self.kind).as_any_mut().downcast_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::LinkSettings;

    #[derive(Debug, Default)]
    struct Pass {
        arity: usize,
    }

    impl NodeKind for Pass {
        fn kind_id(&self) -> &'static str {
            "pass"
        }

        fn name(&self) -> &str {
            "Pass"
        }

        fn output_type(&self) -> ValueType {
            ValueType::Float
        }

        fn configure(&mut self, inputs: &mut Vec<Link>) {
            crate::link::resize_inputs(inputs, self.arity);
            for link in inputs.iter_mut() {
                link.declare(ValueType::Float, "In", LinkSettings::NONE);
            }
        }

        fn check_types(&self, _: &mut Vec<Link>, in_types: &[ValueType], _: &NodeEnv) -> ValueType {
            crate::typing::same(in_types)
        }

        fn build(&self, _: &BuildContext<'_>) -> Option<Evaluator> {
            Some(Evaluator::constant(1.0f32))
        }
    }

    #[test]
    fn test_new_configures_inputs() {
        let node = Node::new(NodeId(1), Box::new(Pass { arity: 2 }));
        assert_eq!(node.inputs.len(), 2);
        assert_eq!(node.cached_output_type, ValueType::Float);
        assert_eq!(node.kind_id(), "pass");
        assert!(node.controllable());
    }

    #[test]
    fn test_downcast() {
        let mut node = Node::new(NodeId(1), Box::new(Pass::default()));
        assert!(node.downcast_ref::<Pass>().is_some());
        if let Some(pass) = node.downcast_mut::<Pass>() {
            pass.arity = 3;
        }
        node.configure();
        assert_eq!(node.inputs.len(), 3);
    }

    #[test]
    fn test_resolve_type_caches() {
        let mut node = Node::new(NodeId(1), Box::new(Pass { arity: 2 }));
        let env = NodeEnv::default();
        node.resolve_type(&[ValueType::Float, ValueType::Int], &env);
        assert_eq!(node.cached_output_type, ValueType::Error);
    }

    #[test]
    fn test_shared_is_shallow() {
        let a = Shared::new(1.0f32);
        let b = a.clone();
        b.set(4.0);
        assert_eq!(a.get(), 4.0);
        a.with_mut(|v| *v += 1.0);
        assert_eq!(b.with(|v| *v), 5.0);
    }
}
