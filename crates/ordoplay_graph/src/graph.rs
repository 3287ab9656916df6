// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph container: node arena, type passes, sink list and tick API.

use crate::binder::PropertyBinder;
use crate::clock::{Clock, TickClock};
use crate::error::GraphError;
use crate::externals::Externals;
use crate::link::{Link, NodeId, NO_NODE};
use crate::node::{Node, NodeEnv, NodeKind};
use crate::processor::{EvalContext, ProcessorBuilder, ProcessorRef};
use crate::registry::NodeRegistry;
use crate::serializer::{FieldReader, FieldWriter};
use crate::value::{Value, ValueType};
use indexmap::{IndexMap, IndexSet};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use tracing::{debug, trace, warn};

/// Vertical gap between a duplicated selection and its copy
const DUPLICATE_GAP: f32 = 64.0;

/// A node graph
///
/// Nodes reference their inputs by id only. Every edit marks the graph
/// dirty; the next [`prepare`](Self::prepare) or [`process`](Self::process)
/// re-runs [`rebuild_sink_list`](Self::rebuild_sink_list).
#[derive(Debug)]
pub struct Graph {
    /// Graph name
    pub name: String,
    pub(crate) nodes: IndexMap<NodeId, Node>,
    pub(crate) next_id: i32,
    pub(crate) next_default_id: i32,
    outputs: Vec<NodeId>,
    processors: Vec<ProcessorRef>,
    pub(crate) externals: Externals,
    env: NodeEnv,
    pub(crate) registry: Rc<NodeRegistry>,
    clock: TickClock,
    tick: u64,
    dt: f32,
    dirty: bool,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new("Graph")
    }
}

impl Graph {
    /// Create a new empty graph with the built-in node kinds
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_registry(name, Rc::new(NodeRegistry::builtin()))
    }

    /// Create a new empty graph with a custom registry
    pub fn with_registry(name: impl Into<String>, registry: Rc<NodeRegistry>) -> Self {
        Self {
            name: name.into(),
            nodes: IndexMap::new(),
            next_id: 1,
            next_default_id: -2,
            outputs: Vec::new(),
            processors: Vec::new(),
            externals: Externals::default(),
            env: NodeEnv::default(),
            registry,
            clock: TickClock::default(),
            tick: 0,
            dt: 0.0,
            dirty: false,
        }
    }

    /// Node kinds this graph can create
    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    /// Install a property binder for property taps
    pub fn set_binder(&mut self, binder: Rc<dyn PropertyBinder>) {
        self.env.binder = Some(binder);
        self.dirty = true;
    }

    /// Switch the delta-time source
    pub fn set_clock(&mut self, clock: Clock) {
        self.clock = TickClock::new(clock);
    }

    /// Current delta-time source
    pub fn clock(&self) -> Clock {
        self.clock.clock()
    }

    // ------------------------------------------------------------------
    // Editing
    // ------------------------------------------------------------------

    /// Create a node of a registered kind
    pub fn create_node(&mut self, kind_id: &str) -> Result<NodeId, GraphError> {
        let kind = self
            .registry
            .create(kind_id)
            .ok_or_else(|| GraphError::UnknownKind(kind_id.to_string()))?;
        Ok(self.add_node(kind))
    }

    /// Add a node with the next user id
    pub fn add_node(&mut self, kind: Box<dyn NodeKind>) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, Node::new(id, kind));
        self.dirty = true;
        id
    }

    /// Remove a controllable node, clearing links that point at it
    pub fn remove_node(&mut self, id: NodeId) -> Result<Node, GraphError> {
        let node = self.nodes.get(&id).ok_or(GraphError::NodeNotFound(id))?;
        if !node.controllable() {
            return Err(GraphError::NotControllable(id));
        }
        self.detach_node(id).ok_or(GraphError::NodeNotFound(id))
    }

    /// Remove any node, clearing links that point at it
    pub(crate) fn detach_node(&mut self, id: NodeId) -> Option<Node> {
        for node in self.nodes.values_mut() {
            for link in &mut node.inputs {
                if link.target == id {
                    link.target = NO_NODE;
                }
                if link.last_default == id {
                    link.last_default = NO_NODE;
                }
            }
        }
        self.dirty = true;
        self.nodes.shift_remove(&id)
    }

    /// Wire `source` into input `input` of `node`
    pub fn connect(&mut self, node: NodeId, input: usize, source: NodeId) -> Result<(), GraphError> {
        if !self.nodes.contains_key(&source) {
            return Err(GraphError::NodeNotFound(source));
        }
        self.link_mut(node, input)?.target = source;
        self.dirty = true;
        Ok(())
    }

    /// Clear input `input` of `node`
    pub fn disconnect(&mut self, node: NodeId, input: usize) -> Result<(), GraphError> {
        self.link_mut(node, input)?.clear();
        self.dirty = true;
        Ok(())
    }

    fn link_mut(&mut self, node: NodeId, input: usize) -> Result<&mut Link, GraphError> {
        self.nodes
            .get_mut(&node)
            .ok_or(GraphError::NodeNotFound(node))?
            .inputs
            .get_mut(input)
            .ok_or(GraphError::InputOutOfRange { node, input })
    }

    /// Get a node by id
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Get a mutable node by id; marks the graph dirty
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let node = self.nodes.get_mut(&id)?;
        self.dirty = true;
        Some(node)
    }

    /// Borrow a node's kind as a concrete type
    pub fn kind<K: NodeKind + 'static>(&self, id: NodeId) -> Option<&K> {
        self.nodes.get(&id)?.downcast_ref()
    }

    /// Mutably borrow a node's kind as a concrete type; marks the graph dirty
    pub fn kind_mut<K: NodeKind + 'static>(&mut self, id: NodeId) -> Option<&mut K> {
        self.node_mut(id)?.downcast_mut()
    }

    /// Move a node in the editor canvas
    pub fn set_position(&mut self, id: NodeId, position: [f32; 2]) -> Result<(), GraphError> {
        self.nodes.get_mut(&id).ok_or(GraphError::NodeNotFound(id))?.position = position;
        Ok(())
    }

    /// Get all nodes
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Get all node ids
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Replace the whole arena
    pub(crate) fn replace_nodes(&mut self, nodes: IndexMap<NodeId, Node>) {
        self.nodes = nodes;
        self.outputs.clear();
        self.processors.clear();
        self.externals = Externals::default();
        self.dirty = true;
    }

    /// Copy controllable user nodes below the selection
    ///
    /// Links between copied nodes are remapped to the copies; links leaving
    /// the selection are dropped and left to default injection.
    pub fn duplicate(&mut self, selection: &[NodeId]) -> Result<Vec<NodeId>, GraphError> {
        let originals: Vec<&Node> = selection
            .iter()
            .filter_map(|id| self.nodes.get(id))
            .filter(|node| node.controllable() && !node.is_default())
            .collect();
        if originals.is_empty() {
            return Err(GraphError::EmptySelection);
        }

        let min_y = originals.iter().map(|n| n.position[1]).fold(f32::MAX, f32::min);
        let max_y = originals.iter().map(|n| n.position[1]).fold(f32::MIN, f32::max);
        let shift = [16.0, max_y - min_y + DUPLICATE_GAP];

        let mut remap = HashMap::new();
        let mut copies = Vec::with_capacity(originals.len());
        for (offset, original) in originals.iter().enumerate() {
            let id = NodeId(self.next_id + offset as i32);
            let mut writer = FieldWriter::new();
            original.kind.write_fields(&mut writer);
            let fields: Vec<&str> = writer.fields().iter().map(String::as_str).collect();

            let mut kind = self
                .registry
                .create(original.kind_id())
                .ok_or_else(|| GraphError::UnknownKind(original.kind_id().to_string()))?;
            let mut reader = FieldReader::new(id.0, &fields);
            kind.read_fields(&mut reader)?;
            reader.finish()?;

            let mut copy = Node::new(id, kind);
            copy.position = [original.position[0] + shift[0], original.position[1] + shift[1]];
            copy.inputs = original.inputs.clone();
            remap.insert(original.id, id);
            copies.push(copy);
        }

        self.next_id += copies.len() as i32;
        let mut ids = Vec::with_capacity(copies.len());
        for mut copy in copies {
            for link in &mut copy.inputs {
                link.target = remap.get(&link.target).copied().unwrap_or(NO_NODE);
                link.last_default = NO_NODE;
            }
            ids.push(copy.id);
            self.nodes.insert(copy.id, copy);
        }
        self.dirty = true;
        Ok(ids)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Nodes nothing else consumes, in arena order
    pub fn find_sinks(&self) -> Vec<NodeId> {
        let mut sinks: IndexSet<NodeId> = self.nodes.keys().copied().collect();
        for node in self.nodes.values() {
            for link in &node.inputs {
                sinks.shift_remove(&link.target);
            }
        }
        sinks.into_iter().collect()
    }

    /// Every node reachable from `roots` through input links, roots included
    pub fn upstream_of(&self, roots: &[NodeId]) -> HashSet<NodeId> {
        let mut seen = HashSet::new();
        let mut stack = roots.to_vec();
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(&id) else {
                continue;
            };
            if seen.insert(id) {
                stack.extend(node.inputs.iter().map(|link| link.target));
            }
        }
        seen
    }

    /// Default node ids referenced by a live link
    pub fn get_used_defaults(&self) -> HashSet<NodeId> {
        self.nodes
            .values()
            .flat_map(|node| node.inputs.iter())
            .map(|link| link.target)
            .filter(|id| id.is_default())
            .collect()
    }

    /// Sinks that compiled and validated in the last rebuild
    pub fn outputs(&self) -> &[NodeId] {
        &self.outputs
    }

    /// External value slots from the last rebuild
    pub fn externals(&self) -> &Externals {
        &self.externals
    }

    /// Check if an edit is waiting for a rebuild
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Ticks processed so far
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Delta time of the last tick
    pub fn dt(&self) -> f32 {
        self.dt
    }

    /// Context matching the last processed tick
    pub fn eval_context(&self) -> EvalContext {
        EvalContext {
            tick: self.tick,
            dt: self.dt,
        }
    }

    // ------------------------------------------------------------------
    // Type passes
    // ------------------------------------------------------------------

    /// Resolve types upstream of `id`, with path-local loop protection
    ///
    /// A node met again on the same path resolves to `Error`. Nodes reached
    /// through sibling paths are resolved once per path.
    pub fn update_types(&mut self, id: NodeId, path: &HashSet<NodeId>) -> ValueType {
        let Some(node) = self.nodes.get_mut(&id) else {
            return ValueType::None;
        };
        node.configure();
        if path.contains(&id) {
            node.cached_output_type = ValueType::Error;
            return ValueType::Error;
        }

        let targets: Vec<NodeId> = node.inputs.iter().map(|link| link.target).collect();
        let mut path = path.clone();
        path.insert(id);
        let in_types: Vec<ValueType> = targets
            .into_iter()
            .map(|target| self.update_types(target, &path))
            .collect();
        self.resolve(id, &in_types)
    }

    /// Resolve types upstream of `id` for an already validated graph
    ///
    /// Skips configuration and loop protection; each node is resolved once
    /// per pass and later visits reuse its cached type.
    pub fn update_types_light(&mut self, id: NodeId, resolved: &mut HashSet<NodeId>) -> ValueType {
        let Some(node) = self.nodes.get(&id) else {
            return ValueType::None;
        };
        if !resolved.insert(id) {
            return node.cached_output_type;
        }

        let targets: Vec<NodeId> = node.inputs.iter().map(|link| link.target).collect();
        let in_types: Vec<ValueType> = targets
            .into_iter()
            .map(|target| self.update_types_light(target, resolved))
            .collect();
        self.resolve(id, &in_types)
    }

    fn resolve(&mut self, id: NodeId, in_types: &[ValueType]) -> ValueType {
        let Some(node) = self.nodes.get_mut(&id) else {
            return ValueType::None;
        };
        let mut ty = node.resolve_type(in_types, &self.env);
        let tainted = node
            .inputs
            .iter()
            .zip(in_types)
            .any(|(link, &source)| link.required && source == ValueType::Error);
        if tainted {
            ty = ValueType::Error;
            node.cached_output_type = ty;
        }
        ty
    }

    /// Check a node after a type pass
    ///
    /// A node is valid when its type and its input declarations are not
    /// `Error`, and every required input has a non-`Error` source.
    pub fn validate(&self, id: NodeId) -> bool {
        let Some(node) = self.nodes.get(&id) else {
            return false;
        };
        if node.cached_output_type == ValueType::Error {
            return false;
        }
        node.inputs.iter().all(|link| {
            if link.value_type == ValueType::Error {
                return false;
            }
            !link.required
                || self
                    .nodes
                    .get(&link.target)
                    .is_some_and(|source| source.cached_output_type != ValueType::Error)
        })
    }

    // ------------------------------------------------------------------
    // Compilation and ticking
    // ------------------------------------------------------------------

    /// Recompute sinks, types, defaults, externals and processors
    pub fn rebuild_sink_list(&mut self) {
        self.dirty = false;
        for node in self.nodes.values_mut() {
            node.configure();
        }
        self.inject_defaults();

        let sinks = self.find_sinks();
        for &sink in &sinks {
            self.update_types(sink, &HashSet::new());
        }
        // Cycles nothing consumes have no sink; resolve them so they read as Error
        let reached = self.upstream_of(&sinks);
        let orphans: Vec<NodeId> = self.nodes.keys().copied().filter(|id| !reached.contains(id)).collect();
        for id in orphans {
            self.update_types(id, &HashSet::new());
        }

        let mut outputs = Vec::new();
        {
            let mut builder = ProcessorBuilder::new(&self.nodes, &self.env);
            for &sink in &sinks {
                let processor = builder.build(sink);
                let compiled = processor.is_some_and(|p| p.borrow().is_void());
                if compiled && self.validate(sink) {
                    outputs.push(sink);
                }
            }
        }
        self.outputs = outputs;
        self.externals = Externals::collect(self);

        debug!(
            graph = %self.name,
            nodes = self.nodes.len(),
            sinks = sinks.len(),
            outputs = self.outputs.len(),
            "Rebuilt sink list"
        );
        self.compile_outputs();
    }

    /// Compile the active outputs, rebuilding first if the graph changed
    ///
    /// Node state (timers, springs, value slots) is kept.
    pub fn prepare(&mut self) {
        if self.dirty {
            self.rebuild_sink_list();
        } else {
            self.compile_outputs();
        }
    }

    fn compile_outputs(&mut self) {
        let mut resolved = HashSet::new();
        for id in self.outputs.clone() {
            self.update_types_light(id, &mut resolved);
        }

        let mut builder = ProcessorBuilder::new(&self.nodes, &self.env);
        let mut processors = Vec::with_capacity(self.outputs.len());
        for &id in &self.outputs {
            match builder.build(id) {
                Some(processor) => processors.push(processor),
                None => warn!(graph = %self.name, node = %id, "Output failed to compile"),
            }
        }
        self.processors = processors;
    }

    /// Advance one tick and run every active output
    pub fn process(&mut self) {
        if self.dirty {
            self.rebuild_sink_list();
        }
        self.tick += 1;
        self.dt = self.clock.advance();
        let cx = self.eval_context();
        trace!(tick = self.tick, dt = self.dt, outputs = self.processors.len(), "Processing graph");
        for processor in &self.processors {
            processor.borrow_mut().run(&cx);
        }
    }

    /// Compile a standalone processor for any node
    ///
    /// Node state is shared with the active outputs, but memoization is not.
    pub fn compile(&mut self, id: NodeId) -> Option<ProcessorRef> {
        if self.dirty {
            self.rebuild_sink_list();
        }
        self.update_types_light(id, &mut HashSet::new());
        ProcessorBuilder::new(&self.nodes, &self.env).build(id)
    }

    /// Compile and evaluate a node at the current tick
    ///
    /// The tree is compiled fresh, so it does not share the memo cache of
    /// the active outputs. Stateful nodes upstream of `id` (timers, springs,
    /// deltas, triggers) step once more on every call, on top of their step
    /// in [`process`](Self::process).
    pub fn evaluate(&mut self, id: NodeId) -> Option<Value> {
        let processor = self.compile(id)?;
        let cx = self.eval_context();
        let value = processor.borrow_mut().eval_value(&cx);
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::math::{MathNode, MathOp};
    use crate::nodes::values::{FloatNode, IntNode, Vector3Node};
    use glam::Vec3;

    fn float(graph: &mut Graph, value: f32) -> NodeId {
        graph.add_node(Box::new(FloatNode::with_value(value)))
    }

    fn math(graph: &mut Graph, op: MathOp) -> NodeId {
        graph.add_node(Box::new(MathNode::new(op)))
    }

    #[test]
    fn test_ids_ascend_and_defaults_descend() {
        let mut graph = Graph::new("test");
        let a = float(&mut graph, 1.0);
        let add = math(&mut graph, MathOp::Add);
        assert_eq!(a, NodeId(1));
        assert_eq!(add, NodeId(2));
        graph.rebuild_sink_list();
        let link = graph.node(add).unwrap().inputs[0];
        assert_eq!(link.target, NodeId(-2));
        assert_eq!(graph.node(add).unwrap().inputs[1].target, NodeId(-3));
    }

    #[test]
    fn test_add_float_int() {
        let mut graph = Graph::new("test");
        let a = float(&mut graph, 2.0);
        let b = graph.add_node(Box::new(IntNode::with_value(3)));
        let add = math(&mut graph, MathOp::Add);
        graph.connect(add, 0, a).unwrap();
        graph.connect(add, 1, b).unwrap();
        graph.process();
        assert_eq!(graph.node(add).unwrap().cached_output_type, ValueType::Float);
        assert_eq!(graph.evaluate(add), Some(Value::Float(5.0)));
    }

    #[test]
    fn test_add_vector_float() {
        let mut graph = Graph::new("test");
        let v = graph.add_node(Box::new(Vector3Node::with_value(Vec3::new(1.0, 2.0, 3.0))));
        let one = float(&mut graph, 1.0);
        let add = math(&mut graph, MathOp::Add);
        graph.connect(add, 0, v).unwrap();
        graph.connect(add, 1, one).unwrap();
        graph.process();
        assert_eq!(graph.evaluate(add), Some(Value::Vector3(Vec3::new(2.0, 3.0, 4.0))));
    }

    #[test]
    fn test_remove_clears_links_then_default_injected() {
        let mut graph = Graph::new("test");
        let a = float(&mut graph, 2.0);
        let neg = math(&mut graph, MathOp::Negative);
        graph.connect(neg, 0, a).unwrap();
        graph.rebuild_sink_list();

        graph.remove_node(a).unwrap();
        assert_eq!(graph.node(neg).unwrap().inputs[0].target, NO_NODE);

        graph.rebuild_sink_list();
        let target = graph.node(neg).unwrap().inputs[0].target;
        assert!(target.is_default());
        assert_eq!(graph.node(target).unwrap().cached_output_type, ValueType::Float);
        assert_eq!(graph.evaluate(neg), Some(Value::Float(-0.0)));
    }

    #[test]
    fn test_self_cycle_is_error() {
        let mut graph = Graph::new("test");
        let a = math(&mut graph, MathOp::Negative);
        let b = math(&mut graph, MathOp::Negative);
        let sink = math(&mut graph, MathOp::Negative);
        graph.connect(a, 0, b).unwrap();
        graph.connect(b, 0, a).unwrap();
        graph.connect(sink, 0, a).unwrap();
        graph.rebuild_sink_list();
        assert_eq!(graph.node(a).unwrap().cached_output_type, ValueType::Error);
        assert_eq!(graph.node(sink).unwrap().cached_output_type, ValueType::Error);
        assert!(!graph.validate(sink));
        assert!(graph.compile(sink).is_none());

        let lonely = math(&mut graph, MathOp::Abs);
        graph.connect(lonely, 0, lonely).unwrap();
        graph.rebuild_sink_list();
        assert!(!graph.find_sinks().contains(&lonely));
        assert_eq!(graph.node(lonely).unwrap().cached_output_type, ValueType::Error);
        assert!(!graph.outputs().contains(&lonely));
        assert!(graph.compile(lonely).is_none());
    }

    fn output_float(graph: &mut Graph, source: NodeId) -> NodeId {
        let mut sink = FloatNode::with_value(0.0);
        sink.io_mode = crate::externals::IoMode::Output;
        let sink = graph.add_node(Box::new(sink));
        graph.connect(sink, 0, source).unwrap();
        sink
    }

    #[test]
    fn test_shared_timer_steps_once_per_tick() {
        use crate::nodes::time::TimerNode;

        let mut graph = Graph::new("test");
        graph.set_clock(Clock::Fixed { dt: 0.25 });
        let timer = graph.add_node(Box::new(TimerNode::default()));
        let a = output_float(&mut graph, timer);
        let b = output_float(&mut graph, timer);
        for _ in 0..3 {
            graph.process();
        }
        assert_eq!(graph.outputs(), &[a, b]);
        assert_eq!(graph.get_float(a).unwrap(), 0.75);
        assert_eq!(graph.get_float(b).unwrap(), 0.75);

        // A standalone evaluation is not memoized with the outputs
        assert_eq!(graph.evaluate(timer), Some(Value::Float(1.0)));
        graph.process();
        assert_eq!(graph.get_float(a).unwrap(), 1.25);
        assert_eq!(graph.get_float(b).unwrap(), 1.25);
    }

    #[test]
    fn test_upstream_of() {
        let mut graph = Graph::new("test");
        let a = float(&mut graph, 1.0);
        let b = math(&mut graph, MathOp::Abs);
        let c = math(&mut graph, MathOp::Abs);
        graph.connect(b, 0, a).unwrap();
        graph.connect(c, 0, c).unwrap();
        let reached = graph.upstream_of(&[b]);
        assert!(reached.contains(&a) && reached.contains(&b));
        assert!(!reached.contains(&c));
        assert_eq!(graph.upstream_of(&[c]).len(), 1);
    }

    #[test]
    fn test_diamond_is_not_a_cycle() {
        let mut graph = Graph::new("test");
        let source = float(&mut graph, 3.0);
        let left = math(&mut graph, MathOp::Negative);
        let right = math(&mut graph, MathOp::Abs);
        let join = math(&mut graph, MathOp::Add);
        graph.connect(left, 0, source).unwrap();
        graph.connect(right, 0, source).unwrap();
        graph.connect(join, 0, left).unwrap();
        graph.connect(join, 1, right).unwrap();
        graph.rebuild_sink_list();
        assert_eq!(graph.node(join).unwrap().cached_output_type, ValueType::Float);
        assert_eq!(graph.evaluate(join), Some(Value::Float(0.0)));
    }

    #[test]
    fn test_find_sinks() {
        let mut graph = Graph::new("test");
        let a = float(&mut graph, 1.0);
        let b = math(&mut graph, MathOp::Abs);
        let c = math(&mut graph, MathOp::Abs);
        graph.connect(b, 0, a).unwrap();
        assert_eq!(graph.find_sinks(), vec![b, c]);
    }

    #[test]
    fn test_connect_errors() {
        let mut graph = Graph::new("test");
        let a = float(&mut graph, 1.0);
        let b = math(&mut graph, MathOp::Abs);
        assert!(matches!(graph.connect(b, 4, a), Err(GraphError::InputOutOfRange { input: 4, .. })));
        assert!(matches!(graph.connect(b, 0, NodeId(99)), Err(GraphError::NodeNotFound(_))));
        assert!(matches!(graph.create_node("missing"), Err(GraphError::UnknownKind(_))));
    }

    #[test]
    fn test_duplicate_remaps_internal_links() {
        let mut graph = Graph::new("test");
        let a = float(&mut graph, 7.0);
        let outside = float(&mut graph, 1.0);
        let add = math(&mut graph, MathOp::Add);
        graph.set_position(a, [0.0, 32.0]).unwrap();
        graph.set_position(add, [64.0, 96.0]).unwrap();
        graph.connect(add, 0, a).unwrap();
        graph.connect(add, 1, outside).unwrap();

        let copies = graph.duplicate(&[a, add]).unwrap();
        assert_eq!(copies.len(), 2);
        let copy_a = graph.node(copies[0]).unwrap();
        assert_eq!(copy_a.position, [16.0, 32.0 + 128.0]);
        assert_eq!(graph.kind::<FloatNode>(copies[0]).unwrap().value(), 7.0);
        let copy_add = graph.node(copies[1]).unwrap();
        assert_eq!(copy_add.inputs[0].target, copies[0]);
        assert_eq!(copy_add.inputs[1].target, NO_NODE);

        assert!(matches!(graph.duplicate(&[]), Err(GraphError::EmptySelection)));
    }
}
