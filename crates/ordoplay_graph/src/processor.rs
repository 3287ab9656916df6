// SPDX-License-Identifier: MIT OR Apache-2.0
//! Compiled evaluators.
//!
//! A [`Processor`] is built per node for one build pass. It owns a single
//! typed closure ([`Evaluator`]) plus references to the processors of its
//! inputs. Processors reached by two or more consumers cache their result
//! per tick, so stateful nodes advance exactly once per tick no matter how
//! many sinks read them.

use crate::link::{Link, NodeId, NO_NODE};
use crate::node::{Node, NodeEnv};
use crate::value::{Color, MeshHandle, TextureHandle, Value, ValueType};
use glam::{Vec2, Vec3, Vec4};
use indexmap::IndexMap;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::debug;

/// Per-tick evaluation parameters
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EvalContext {
    /// Monotonic tick counter; memoization is keyed on it
    pub tick: u64,
    /// Seconds since the previous tick
    pub dt: f32,
}

/// Boxed closure producing one value kind
pub type EvalFn<T> = Box<dyn FnMut(&Inputs<'_>) -> T>;

/// The single output closure of a processor
pub enum Evaluator {
    /// Float output
    Float(EvalFn<f32>),
    /// Integer output
    Int(EvalFn<i32>),
    /// Boolean output
    Bool(EvalFn<bool>),
    /// 2D vector output
    Vector2(EvalFn<Vec2>),
    /// 3D vector output
    Vector3(EvalFn<Vec3>),
    /// 4D vector output
    Vector4(EvalFn<Vec4>),
    /// Color output
    Color(EvalFn<Color>),
    /// Texture output
    Texture(EvalFn<TextureHandle>),
    /// Mesh output
    Mesh(EvalFn<MeshHandle>),
    /// Side effect only (sinks)
    Void(EvalFn<()>),
}

impl Evaluator {
    /// Wrap a closure producing `T`
    pub fn new<T: Output>(f: impl FnMut(&Inputs<'_>) -> T + 'static) -> Self {
        T::wrap(Box::new(f))
    }

    /// Wrap a side-effect closure
    pub fn void(f: impl FnMut(&Inputs<'_>) + 'static) -> Self {
        Self::Void(Box::new(f))
    }

    /// Closure returning a fixed value
    pub fn constant<T: Output>(value: T) -> Self {
        Self::new(move |_| value)
    }

    /// Kind produced, `None` for void
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Float(_) => ValueType::Float,
            Self::Int(_) => ValueType::Int,
            Self::Bool(_) => ValueType::Bool,
            Self::Vector2(_) => ValueType::Vector2,
            Self::Vector3(_) => ValueType::Vector3,
            Self::Vector4(_) => ValueType::Vector4,
            Self::Color(_) => ValueType::Color,
            Self::Texture(_) => ValueType::Texture,
            Self::Mesh(_) => ValueType::Mesh,
            Self::Void(_) => ValueType::None,
        }
    }

    /// Check if this is a side-effect closure
    pub fn is_void(&self) -> bool {
        matches!(self, Self::Void(_))
    }
}

impl std::fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Evaluator({})", self.value_type())
    }
}

/// A value kind a processor can produce
pub trait Output: Copy + Default + 'static {
    /// Matching value kind
    const VALUE_TYPE: ValueType;

    /// Wrap a closure in the matching evaluator variant
    fn wrap(f: EvalFn<Self>) -> Evaluator;

    /// The closure, if the evaluator produces this kind
    fn select(evaluator: &mut Evaluator) -> Option<&mut EvalFn<Self>>;

    /// Box into a [`Value`]
    fn into_value(self) -> Value;

    /// Unbox from a [`Value`] of the same kind
    fn from_value(value: Value) -> Option<Self>;
}

macro_rules! impl_output {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Output for $ty {
                const VALUE_TYPE: ValueType = ValueType::$variant;

                fn wrap(f: EvalFn<Self>) -> Evaluator {
                    Evaluator::$variant(f)
                }

                fn select(evaluator: &mut Evaluator) -> Option<&mut EvalFn<Self>> {
                    match evaluator {
                        Evaluator::$variant(f) => Some(f),
                        _ => None,
                    }
                }

                fn into_value(self) -> Value {
                    Value::$variant(self)
                }

                fn from_value(value: Value) -> Option<Self> {
                    match value {
                        Value::$variant(v) => Some(v),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_output! {
    f32 => Float,
    i32 => Int,
    bool => Bool,
    Vec2 => Vector2,
    Vec3 => Vector3,
    Vec4 => Vector4,
    Color => Color,
    TextureHandle => Texture,
    MeshHandle => Mesh,
}

/// Shared handle to a processor
pub type ProcessorRef = Rc<RefCell<Processor>>;

/// Input processors as seen from inside an evaluator closure
pub struct Inputs<'a> {
    slots: &'a [Option<ProcessorRef>],
    cx: &'a EvalContext,
}

impl<'a> Inputs<'a> {
    /// Evaluate input `index`, or the kind's zero value when unconnected
    pub fn get<T: Output>(&self, index: usize) -> T {
        self.try_get(index).unwrap_or_default()
    }

    /// Evaluate input `index` if it has a processor
    pub fn try_get<T: Output>(&self, index: usize) -> Option<T> {
        let slot = self.slots.get(index)?.as_ref()?;
        Some(slot.borrow_mut().eval(self.cx))
    }

    /// Check if input `index` has a processor
    pub fn is_connected(&self, index: usize) -> bool {
        matches!(self.slots.get(index), Some(Some(_)))
    }

    /// Number of input slots
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if there are no input slots
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Seconds since the previous tick
    pub fn dt(&self) -> f32 {
        self.cx.dt
    }

    /// Current tick
    pub fn tick(&self) -> u64 {
        self.cx.tick
    }
}

#[derive(Debug, Clone, Copy)]
struct Memo {
    tick: u64,
    value: Option<Value>,
}

/// Compiled node: one closure plus its input processors
#[derive(Debug)]
pub struct Processor {
    node: NodeId,
    inputs: Vec<Option<ProcessorRef>>,
    evaluator: Evaluator,
    consumers: usize,
    memoize: bool,
    memo: Option<Memo>,
}

impl Processor {
    /// Create a processor with one consumer
    pub fn new(node: NodeId, inputs: Vec<Option<ProcessorRef>>, evaluator: Evaluator) -> Self {
        Self {
            node,
            inputs,
            evaluator,
            consumers: 1,
            memoize: false,
            memo: None,
        }
    }

    /// Node this processor was built from
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Kind produced, `None` for void
    pub fn value_type(&self) -> ValueType {
        self.evaluator.value_type()
    }

    /// Check if this processor only has side effects
    pub fn is_void(&self) -> bool {
        self.evaluator.is_void()
    }

    /// Number of consumers recorded during the build pass
    pub fn consumers(&self) -> usize {
        self.consumers
    }

    /// Check if results are cached per tick
    pub fn is_memoized(&self) -> bool {
        self.memoize
    }

    /// Input processors
    pub fn inputs(&self) -> &[Option<ProcessorRef>] {
        &self.inputs
    }

    /// Record another consumer; the second one turns on per-tick caching
    pub fn add_consumer(&mut self) {
        self.consumers += 1;
        if self.consumers >= 2 {
            self.memoize = true;
        }
    }

    fn cached(&self, tick: u64) -> Option<Option<Value>> {
        self.memo.filter(|m| m.tick == tick).map(|m| m.value)
    }

    /// Evaluate as `T`
    ///
    /// # Panics
    ///
    /// Panics if the processor produces another kind. Type checking makes
    /// this unreachable for compiled graphs.
    pub fn eval<T: Output>(&mut self, cx: &EvalContext) -> T {
        if let Some(Some(value)) = self.cached(cx.tick) {
            if let Some(v) = T::from_value(value) {
                return v;
            }
        }

        let node = self.node;
        let produced = self.evaluator.value_type();
        let Some(f) = T::select(&mut self.evaluator) else {
            panic!("node {node} produces {produced} but was evaluated as {}", T::VALUE_TYPE);
        };
        let value = f(&Inputs {
            slots: &self.inputs,
            cx,
        });

        if self.memoize {
            self.memo = Some(Memo {
                tick: cx.tick,
                value: Some(value.into_value()),
            });
        }
        value
    }

    /// Evaluate whatever kind this processor produces
    ///
    /// Void processors run their side effect and return `None`.
    pub fn eval_value(&mut self, cx: &EvalContext) -> Option<Value> {
        match self.evaluator.value_type() {
            ValueType::Float => Some(Value::Float(self.eval(cx))),
            ValueType::Int => Some(Value::Int(self.eval(cx))),
            ValueType::Bool => Some(Value::Bool(self.eval(cx))),
            ValueType::Vector2 => Some(Value::Vector2(self.eval(cx))),
            ValueType::Vector3 => Some(Value::Vector3(self.eval(cx))),
            ValueType::Vector4 => Some(Value::Vector4(self.eval(cx))),
            ValueType::Color => Some(Value::Color(self.eval(cx))),
            ValueType::Texture => Some(Value::Texture(self.eval(cx))),
            ValueType::Mesh => Some(Value::Mesh(self.eval(cx))),
            _ => {
                self.run(cx);
                None
            }
        }
    }

    /// Run once for this tick; non-void processors evaluate and discard
    pub fn run(&mut self, cx: &EvalContext) {
        if !self.is_void() {
            self.eval_value(cx);
            return;
        }
        if self.cached(cx.tick).is_some() {
            return;
        }
        if let Evaluator::Void(f) = &mut self.evaluator {
            f(&Inputs {
                slots: &self.inputs,
                cx,
            });
        }
        if self.memoize {
            self.memo = Some(Memo {
                tick: cx.tick,
                value: None,
            });
        }
    }
}

/// What a node kind sees while building its evaluator
pub struct BuildContext<'a> {
    node: &'a Node,
    input_types: Vec<ValueType>,
    env: &'a NodeEnv,
}

impl<'a> BuildContext<'a> {
    /// Create a build context for `node`
    pub fn new(node: &'a Node, input_types: Vec<ValueType>, env: &'a NodeEnv) -> Self {
        Self {
            node,
            input_types,
            env,
        }
    }

    /// Node being built
    pub fn node_id(&self) -> NodeId {
        self.node.id
    }

    /// Resolved kind of input `index`'s source, `None` when unconnected
    pub fn input_type(&self, index: usize) -> ValueType {
        self.input_types.get(index).copied().unwrap_or(ValueType::None)
    }

    /// Resolved output kind of the node
    pub fn output_type(&self) -> ValueType {
        self.node.cached_output_type
    }

    /// Input declaration `index`
    pub fn link(&self, index: usize) -> Option<&Link> {
        self.node.inputs.get(index)
    }

    /// Host environment
    pub fn env(&self) -> &NodeEnv {
        self.env
    }
}

/// One build pass over a node arena
///
/// Processors are shared by node id for the lifetime of the builder, so
/// sinks built with the same builder share their common upstream nodes.
pub struct ProcessorBuilder<'g> {
    nodes: &'g IndexMap<NodeId, Node>,
    env: &'g NodeEnv,
    built: HashMap<NodeId, Option<ProcessorRef>>,
}

impl<'g> ProcessorBuilder<'g> {
    /// Start a build pass
    pub fn new(nodes: &'g IndexMap<NodeId, Node>, env: &'g NodeEnv) -> Self {
        Self {
            nodes,
            env,
            built: HashMap::new(),
        }
    }

    /// Build (or reuse) the processor for `id`
    ///
    /// Returns `None` for `Error`-typed nodes, nodes whose kind cannot
    /// build an evaluator, nodes missing a required input, and nodes
    /// reached again while still being built.
    pub fn build(&mut self, id: NodeId) -> Option<ProcessorRef> {
        if id == NO_NODE {
            return None;
        }
        if let Some(entry) = self.built.get(&id) {
            let processor = entry.clone()?;
            processor.borrow_mut().add_consumer();
            return Some(processor);
        }

        let nodes = self.nodes;
        let node = nodes.get(&id)?;
        self.built.insert(id, None);
        if node.cached_output_type == ValueType::Error {
            return None;
        }

        let input_types = node
            .inputs
            .iter()
            .map(|link| {
                nodes
                    .get(&link.target)
                    .map_or(ValueType::None, |source| source.cached_output_type)
            })
            .collect();
        let evaluator = node.kind.build(&BuildContext::new(node, input_types, self.env))?;

        let mut inputs = Vec::with_capacity(node.inputs.len());
        for (index, link) in node.inputs.iter().enumerate() {
            let source = self.build(link.target);
            if link.required && source.is_none() {
                debug!(node = %id, input = index, "Required input has no processor");
                return None;
            }
            inputs.push(source);
        }

        let processor = Rc::new(RefCell::new(Processor::new(id, inputs, evaluator)));
        self.built.insert(id, Some(processor.clone()));
        Some(processor)
    }

    /// Number of processors built so far
    pub fn len(&self) -> usize {
        self.built.values().filter(|p| p.is_some()).count()
    }

    /// Check if nothing has been built
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn leaf(node: i32, evaluator: Evaluator) -> ProcessorRef {
        Rc::new(RefCell::new(Processor::new(NodeId(node), Vec::new(), evaluator)))
    }

    fn counting_leaf(calls: Rc<Cell<u32>>) -> ProcessorRef {
        leaf(
            1,
            Evaluator::new(move |_| {
                calls.set(calls.get() + 1);
                calls.get() as f32
            }),
        )
    }

    #[test]
    fn test_constant_and_inputs() {
        let a = leaf(1, Evaluator::constant(2.0f32));
        let b = leaf(2, Evaluator::constant(3i32));
        let mut sum = Processor::new(
            NodeId(3),
            vec![Some(a), Some(b), None],
            Evaluator::new(|inputs: &Inputs<'_>| {
                inputs.get::<f32>(0) + inputs.get::<i32>(1) as f32 + inputs.get::<f32>(2)
            }),
        );
        assert_eq!(sum.eval::<f32>(&EvalContext::default()), 5.0);
        assert_eq!(sum.value_type(), ValueType::Float);
    }

    #[test]
    fn test_memo_once_per_tick() {
        let calls = Rc::new(Cell::new(0));
        let shared = counting_leaf(calls.clone());
        shared.borrow_mut().add_consumer();
        assert!(shared.borrow().is_memoized());

        let cx = EvalContext { tick: 1, dt: 0.0 };
        let first: f32 = shared.borrow_mut().eval(&cx);
        let second: f32 = shared.borrow_mut().eval(&cx);
        assert_eq!(first, second);
        assert_eq!(calls.get(), 1);

        let next = EvalContext { tick: 2, dt: 0.0 };
        let third: f32 = shared.borrow_mut().eval(&next);
        assert_eq!(third, 2.0);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_single_consumer_not_memoized() {
        let calls = Rc::new(Cell::new(0));
        let single = counting_leaf(calls.clone());
        let cx = EvalContext { tick: 1, dt: 0.0 };
        let _: f32 = single.borrow_mut().eval(&cx);
        let _: f32 = single.borrow_mut().eval(&cx);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_void_runs_once_when_memoized() {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let sink = leaf(1, Evaluator::void(move |_| counter.set(counter.get() + 1)));
        sink.borrow_mut().add_consumer();
        let cx = EvalContext { tick: 7, dt: 0.0 };
        sink.borrow_mut().run(&cx);
        sink.borrow_mut().run(&cx);
        assert_eq!(calls.get(), 1);
        assert_eq!(sink.borrow_mut().eval_value(&cx), None);
    }

    #[test]
    #[should_panic(expected = "produces Float")]
    fn test_wrong_kind_panics() {
        let p = leaf(1, Evaluator::constant(1.0f32));
        let _: bool = p.borrow_mut().eval(&EvalContext::default());
    }
}
