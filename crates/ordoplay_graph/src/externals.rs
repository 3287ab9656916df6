// SPDX-License-Identifier: MIT OR Apache-2.0
//! Host-facing value slots.
//!
//! Value, curve and ramp nodes can be marked as external; their values are
//! then listed per kind in [`Externals`] and can be pushed in bulk from an
//! [`ExternalInputs`] set before a tick. Hosts that wire the graph to their
//! own inputs and outputs declare IO nodes through [`Graph::begin_io`].

use crate::error::GraphError;
use crate::graph::Graph;
use crate::link::NodeId;
use crate::serializer::FieldEnum;
use crate::value::{Color, ValueType};
use glam::{Vec2, Vec3, Vec4};
use ordoplay_curves::{AnimationCurve, ColorRamp};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

/// Kinds that can be exposed as external slots, in slot-group order
pub const EXTERNAL_KINDS: [ValueType; 9] = [
    ValueType::Bool,
    ValueType::Color,
    ValueType::Float,
    ValueType::Int,
    ValueType::Vector2,
    ValueType::Vector3,
    ValueType::Vector4,
    ValueType::Curve,
    ValueType::Ramp,
];

const IO_INPUT_X: f32 = (-10.0 - 7.0) * 16.0;
const IO_OUTPUT_X: f32 = 10.0 * 16.0;
const IO_ROW: f32 = 4.0 * 16.0;

/// How a value node is wired to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum IoMode {
    /// Ordinary value node
    #[default]
    None,
    /// Host writes the value before a tick
    Input,
    /// Node stores its input for the host to read after a tick
    Output,
}

impl FieldEnum for IoMode {
    const NAME: &'static str = "io mode";

    fn from_index(index: i32) -> Option<Self> {
        match index {
            0 => Some(Self::None),
            1 => Some(Self::Input),
            2 => Some(Self::Output),
            _ => None,
        }
    }

    fn index(self) -> i32 {
        self as i32
    }
}

/// A value held by an external-capable node
#[derive(Debug, Clone, PartialEq)]
pub enum ExternalValue {
    /// Boolean
    Bool(bool),
    /// Color
    Color(Color),
    /// Float
    Float(f32),
    /// Integer
    Int(i32),
    /// 2D vector
    Vector2(Vec2),
    /// 3D vector
    Vector3(Vec3),
    /// 4D vector
    Vector4(Vec4),
    /// Parametric curve
    Curve(AnimationCurve),
    /// Color ramp
    Ramp(ColorRamp),
}

/// Rust type carried by one external kind
pub trait ExternalKind: Sized + Clone {
    /// Matching value kind
    const VALUE_TYPE: ValueType;

    /// Wrap into an [`ExternalValue`]
    fn into_external(self) -> ExternalValue;

    /// Unwrap from an [`ExternalValue`] of the same kind
    fn from_external(value: ExternalValue) -> Option<Self>;
}

macro_rules! impl_external_kind {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl ExternalKind for $ty {
                const VALUE_TYPE: ValueType = ValueType::$variant;

                fn into_external(self) -> ExternalValue {
                    ExternalValue::$variant(self)
                }

                fn from_external(value: ExternalValue) -> Option<Self> {
                    match value {
                        ExternalValue::$variant(v) => Some(v),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_external_kind! {
    bool => Bool,
    Color => Color,
    f32 => Float,
    i32 => Int,
    Vec2 => Vector2,
    Vec3 => Vector3,
    Vec4 => Vector4,
    AnimationCurve => Curve,
    ColorRamp => Ramp,
}

/// A node whose value the host can read and write
///
/// Writes go through `&self`: the value lives in a cell shared with the
/// compiled evaluator, so they take effect on the next tick without a
/// rebuild.
pub trait ExternalNode {
    /// Slot name
    fn value_name(&self) -> &str;

    /// Whether the node is listed in [`Externals`]
    fn use_as_external(&self) -> bool;

    /// Kind of the held value
    fn value_type(&self) -> ValueType;

    /// Current IO wiring
    fn io_mode(&self) -> IoMode {
        IoMode::None
    }

    /// Current value
    fn get(&self) -> ExternalValue;

    /// Replace the value; false if the kind does not match
    fn set(&self, value: ExternalValue) -> bool;

    /// Switch IO wiring and slot name; false if the node cannot do IO
    fn set_io(&mut self, mode: IoMode, name: &str) -> bool {
        let _ = (mode, name);
        false
    }
}

/// One named external slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalSlot {
    /// Slot name
    pub name: String,
    /// Node holding the value
    pub node: NodeId,
}

/// External slots grouped by kind
#[derive(Debug, Clone, Default)]
pub struct Externals {
    slots: HashMap<ValueType, Vec<ExternalSlot>>,
}

impl Externals {
    /// Collect every node marked as external, in arena order
    pub(crate) fn collect(graph: &Graph) -> Self {
        let mut slots: HashMap<ValueType, Vec<ExternalSlot>> = HashMap::new();
        for node in graph.nodes() {
            let Some(external) = node.kind.external() else {
                continue;
            };
            if external.use_as_external() {
                slots.entry(external.value_type()).or_default().push(ExternalSlot {
                    name: external.value_name().to_string(),
                    node: node.id,
                });
            }
        }
        Self { slots }
    }

    /// Slots of one kind
    pub fn slots(&self, ty: ValueType) -> &[ExternalSlot] {
        self.slots.get(&ty).map_or(&[], Vec::as_slice)
    }

    /// Find a slot by kind and name
    pub fn find(&self, ty: ValueType, name: &str) -> Option<NodeId> {
        self.slots(ty).iter().find(|slot| slot.name == name).map(|slot| slot.node)
    }

    /// Total number of slots
    pub fn len(&self) -> usize {
        self.slots.values().map(Vec::len).sum()
    }

    /// Check if there are no slots
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Values to push into a graph's external slots, one list per kind
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalInputs {
    /// Bool slots
    pub bools: Vec<bool>,
    /// Color slots
    pub colors: Vec<Color>,
    /// Float slots
    pub floats: Vec<f32>,
    /// Int slots
    pub ints: Vec<i32>,
    /// Vector2 slots
    pub vector2s: Vec<Vec2>,
    /// Vector3 slots
    pub vector3s: Vec<Vec3>,
    /// Vector4 slots
    pub vector4s: Vec<Vec4>,
    /// Curve slots
    pub curves: Vec<AnimationCurve>,
    /// Ramp slots
    pub ramps: Vec<ColorRamp>,
}

fn sync_list<T: ExternalKind + Default>(values: &mut Vec<T>, graph: &Graph) {
    let slots = graph.externals().slots(T::VALUE_TYPE);
    values.truncate(slots.len());
    for slot in &slots[values.len()..] {
        values.push(graph.get_external(slot.node).unwrap_or_default());
    }
}

fn apply_list<T: ExternalKind>(values: &[T], graph: &Graph) -> Result<(), GraphError> {
    for (slot, value) in graph.externals().slots(T::VALUE_TYPE).iter().zip(values) {
        graph.set_external(slot.node, value.clone())?;
    }
    Ok(())
}

impl ExternalInputs {
    /// Match list lengths to the graph's slots
    ///
    /// Existing entries are kept; new entries start from the node's value.
    pub fn sync_with(&mut self, graph: &Graph) {
        sync_list(&mut self.bools, graph);
        sync_list(&mut self.colors, graph);
        sync_list(&mut self.floats, graph);
        sync_list(&mut self.ints, graph);
        sync_list(&mut self.vector2s, graph);
        sync_list(&mut self.vector3s, graph);
        sync_list(&mut self.vector4s, graph);
        sync_list(&mut self.curves, graph);
        sync_list(&mut self.ramps, graph);
    }

    /// Push every value into its slot node
    ///
    /// Extra values past the slot count are ignored.
    pub fn apply_to(&self, graph: &Graph) -> Result<(), GraphError> {
        apply_list(&self.bools, graph)?;
        apply_list(&self.colors, graph)?;
        apply_list(&self.floats, graph)?;
        apply_list(&self.ints, graph)?;
        apply_list(&self.vector2s, graph)?;
        apply_list(&self.vector3s, graph)?;
        apply_list(&self.vector4s, graph)?;
        apply_list(&self.curves, graph)?;
        apply_list(&self.ramps, graph)
    }
}

/// Value-node kind id used for an IO declaration of `ty`
pub fn io_kind_id(ty: ValueType) -> Option<&'static str> {
    match ty {
        ValueType::Float => Some("float"),
        ValueType::Int => Some("int"),
        ValueType::Bool => Some("bool"),
        ValueType::Vector2 => Some("vector2"),
        ValueType::Vector3 => Some("vector3"),
        ValueType::Vector4 => Some("vector4"),
        ValueType::Color => Some("color"),
        _ => None,
    }
}

macro_rules! typed_access {
    ($($ty:ty => $get:ident, $set:ident);* $(;)?) => {
        $(
            #[doc = concat!("Read a `", stringify!($ty), "` from an external-capable node")]
            pub fn $get(&self, id: NodeId) -> Result<$ty, GraphError> {
                self.get_external(id)
            }

            #[doc = concat!("Write a `", stringify!($ty), "` into an external-capable node")]
            pub fn $set(&self, id: NodeId, value: $ty) -> Result<(), GraphError> {
                self.set_external(id, value)
            }
        )*
    };
}

impl Graph {
    /// External view of a node
    pub fn external_node(&self, id: NodeId) -> Result<&dyn ExternalNode, GraphError> {
        let node = self.node(id).ok_or(GraphError::NodeNotFound(id))?;
        node.kind.external().ok_or(GraphError::WrongNodeKind {
            node: id,
            expected: ValueType::None,
        })
    }

    /// Read a node's value as `T`
    pub fn get_external<T: ExternalKind>(&self, id: NodeId) -> Result<T, GraphError> {
        let wrong = || GraphError::WrongNodeKind {
            node: id,
            expected: T::VALUE_TYPE,
        };
        let node = self.node(id).ok_or(GraphError::NodeNotFound(id))?;
        let external = node.kind.external().ok_or_else(wrong)?;
        T::from_external(external.get()).ok_or_else(wrong)
    }

    /// Write `value` into a node holding a `T`
    pub fn set_external<T: ExternalKind>(&self, id: NodeId, value: T) -> Result<(), GraphError> {
        let node = self.node(id).ok_or(GraphError::NodeNotFound(id))?;
        match node.kind.external() {
            Some(external) if external.set(value.into_external()) => Ok(()),
            _ => Err(GraphError::WrongNodeKind {
                node: id,
                expected: T::VALUE_TYPE,
            }),
        }
    }

    typed_access! {
        bool => get_bool, set_bool;
        i32 => get_int, set_int;
        f32 => get_float, set_float;
        Color => get_color, set_color;
        Vec2 => get_vector2, set_vector2;
        Vec3 => get_vector3, set_vector3;
        Vec4 => get_vector4, set_vector4;
        AnimationCurve => get_curve, set_curve;
        ColorRamp => get_ramp, set_ramp;
    }

    /// Start declaring the host's IO nodes
    ///
    /// Existing IO nodes are reused by name and kind. Call
    /// [`IoDeclaration::finish`] to drop the ones not declared again.
    pub fn begin_io(&mut self) -> IoDeclaration<'_> {
        let pending = self
            .nodes()
            .filter_map(|node| {
                let external = node.kind.external()?;
                (external.io_mode() != IoMode::None).then(|| (external.value_name().to_string(), node.id))
            })
            .collect();
        IoDeclaration {
            graph: self,
            pending,
            rows: [0.0; 2],
        }
    }
}

/// In-progress IO declaration
#[derive(Debug)]
pub struct IoDeclaration<'g> {
    graph: &'g mut Graph,
    pending: Vec<(String, NodeId)>,
    rows: [f32; 2],
}

impl IoDeclaration<'_> {
    /// Declare a host input of kind `ty`
    pub fn input(&mut self, ty: ValueType, name: &str) -> Result<NodeId, GraphError> {
        self.declare(ty, name, IoMode::Input)
    }

    /// Declare a host output of kind `ty`
    pub fn output(&mut self, ty: ValueType, name: &str) -> Result<NodeId, GraphError> {
        self.declare(ty, name, IoMode::Output)
    }

    fn declare(&mut self, ty: ValueType, name: &str, mode: IoMode) -> Result<NodeId, GraphError> {
        let kind_id = io_kind_id(ty).ok_or(GraphError::NoIoKind(ty))?;
        let graph = &*self.graph;
        let matches = |(pending, id): &(String, NodeId), same_mode: bool| {
            pending == name
                && graph.node(*id).is_some_and(|node| {
                    node.kind_id() == kind_id
                        && (!same_mode || node.kind.external().is_some_and(|e| e.io_mode() == mode))
                })
        };
        let reused = self
            .pending
            .iter()
            .position(|entry| matches(entry, true))
            .or_else(|| self.pending.iter().position(|entry| matches(entry, false)));

        let column = usize::from(mode == IoMode::Output);
        let id = match reused {
            Some(index) => self.pending.remove(index).1,
            None => {
                let id = self.graph.create_node(kind_id)?;
                let x = if mode == IoMode::Input { IO_INPUT_X } else { IO_OUTPUT_X };
                self.graph.set_position(id, [x, self.rows[column]])?;
                id
            }
        };
        self.rows[column] += IO_ROW;

        let node = self.graph.node_mut(id).ok_or(GraphError::NodeNotFound(id))?;
        let external = node.kind.external_mut().ok_or(GraphError::NoIoKind(ty))?;
        if !external.set_io(mode, name) {
            return Err(GraphError::NoIoKind(ty));
        }
        node.configure();
        Ok(id)
    }

    /// Remove stale IO nodes and prepare the graph
    ///
    /// Stale nodes still marked as external are kept.
    pub fn finish(self) {
        for (name, id) in self.pending {
            let keep = self
                .graph
                .node(id)
                .and_then(|node| node.kind.external())
                .is_some_and(|external| external.use_as_external());
            if !keep {
                warn!(node = %id, name = %name, "Discarding undeclared IO node");
                self.graph.detach_node(id);
            }
        }
        self.graph.prepare();
    }
}
