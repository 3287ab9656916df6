// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node graph engine for `OrdoPlay` Editor.
//!
//! Graphs are arenas of typed nodes wired by input links. The engine:
//! - infers each node's output kind from its inputs
//! - injects constant default nodes behind unconnected inputs
//! - compiles the graph into closures that memoize once per tick
//! - saves and loads graphs in a compact text format
//! - exposes value nodes to the host as named slots
//!
//! ## Example
//!
//! ```
//! use ordoplay_graph::nodes::math::{MathNode, MathOp};
//! use ordoplay_graph::nodes::values::FloatNode;
//! use ordoplay_graph::{Graph, Value};
//!
//! let mut graph = Graph::new("demo");
//! let a = graph.add_node(Box::new(FloatNode::with_value(2.0)));
//! let sum = graph.add_node(Box::new(MathNode::new(MathOp::Add)));
//! graph.connect(sum, 0, a).unwrap();
//! graph.connect(sum, 1, a).unwrap();
//! assert_eq!(graph.evaluate(sum), Some(Value::Float(4.0)));
//! ```

pub mod binder;
pub mod clock;
pub mod defaults;
pub mod error;
pub mod externals;
pub mod graph;
pub mod lanes;
pub mod link;
pub mod node;
pub mod nodes;
pub mod noise;
pub mod processor;
pub mod registry;
pub mod serializer;
pub mod typing;
pub mod value;

pub use binder::{PropertyBinder, PropertyMap};
pub use clock::{Clock, TickClock};
pub use error::{GraphError, SerializeError};
pub use externals::{ExternalInputs, ExternalNode, ExternalValue, Externals, IoMode};
pub use graph::Graph;
pub use link::{Link, LinkSettings, NodeId, NO_NODE};
pub use node::{Node, NodeCategory, NodeEnv, NodeKind, Shared};
pub use processor::{EvalContext, Evaluator, Output, Processor, ProcessorRef};
pub use registry::{NodeRegistry, NodeType};
pub use value::{Color, MeshHandle, TextureHandle, Value, ValueType};
