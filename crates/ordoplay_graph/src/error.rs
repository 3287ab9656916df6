// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error types for graph editing and text serialization.

use crate::link::NodeId;
use crate::value::ValueType;

/// Error raised by graph editing and typed external access
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// Node not found
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    /// No node kind registered under this id
    #[error("Unknown node kind: {0}")]
    UnknownKind(String),

    /// Input index past the node's input count
    #[error("Node {node} has no input {input}")]
    InputOutOfRange {
        /// Node being wired
        node: NodeId,
        /// Requested input index
        input: usize,
    },

    /// Typed getter or setter used on a node of another kind
    #[error("Node {node} does not expose a {expected} value")]
    WrongNodeKind {
        /// Node being accessed
        node: NodeId,
        /// Kind the caller asked for
        expected: ValueType,
    },

    /// Node is owned by the host IO declaration and cannot be edited
    #[error("Node {0} is not controllable")]
    NotControllable(NodeId),

    /// No IO node kind exists for this value type
    #[error("No IO node available for {0}")]
    NoIoKind(ValueType),

    /// Duplicate called with nothing that can be copied
    #[error("Nothing to duplicate")]
    EmptySelection,

    /// Node id already present in the arena
    #[error("Duplicate node id: {0}")]
    DuplicateId(NodeId),

    /// Node fields could not be copied
    #[error(transparent)]
    Serialize(#[from] SerializeError),
}

/// Error raised while reading a serialized graph
#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    /// Record does not have the `kind|id|...` shape
    #[error("Malformed record: {0:?}")]
    MalformedRecord(String),

    /// Record ended before all fields were read
    #[error("Node {node}: missing field {field}")]
    MissingField {
        /// Node being read
        node: i32,
        /// Zero-based field index
        field: usize,
    },

    /// Record has more fields than the node kind reads
    #[error("Node {node}: {extra} unexpected trailing fields")]
    TrailingFields {
        /// Node being read
        node: i32,
        /// Number of unread fields
        extra: usize,
    },

    /// Literal could not be parsed
    #[error("Node {node}: invalid {expected} literal {text:?}")]
    InvalidLiteral {
        /// Node being read
        node: i32,
        /// Literal kind expected
        expected: &'static str,
        /// Offending text
        text: String,
    },

    /// No node kind registered under this id
    #[error("Unknown node kind: {0}")]
    UnknownKind(String),

    /// Two records share one id
    #[error("Duplicate node id: {0}")]
    DuplicateId(i32),
}

/// Type-table lookup outside the closed enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Value type index out of range: {0}")]
pub struct UnknownValueType(pub usize);
