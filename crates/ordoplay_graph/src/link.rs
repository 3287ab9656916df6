// SPDX-License-Identifier: MIT OR Apache-2.0
//! Input links: one typed slot on a node, pointing at its source by id.

use crate::value::ValueType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a node within one graph
///
/// Positive ids are user nodes. Ids below [`NO_NODE`] belong to
/// auto-created default nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub i32);

/// Unconnected sentinel
pub const NO_NODE: NodeId = NodeId(-1);

impl NodeId {
    /// Check if this id belongs to an auto-created default node
    pub fn is_default(self) -> bool {
        self.0 < NO_NODE.0
    }

    /// Check if this id belongs to a user node
    pub fn is_user(self) -> bool {
        self.0 > NO_NODE.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        NO_NODE
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Flags for a declared input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LinkSettings {
    /// The node cannot be compiled while this input has no source
    pub required: bool,
    /// Never inject a default node into this input
    pub no_defaults: bool,
}

impl LinkSettings {
    /// Optional input, defaults injected
    pub const NONE: Self = Self {
        required: false,
        no_defaults: false,
    };
    /// Required input, defaults injected
    pub const REQUIRED: Self = Self {
        required: true,
        no_defaults: false,
    };
    /// Optional input left empty when unconnected
    pub const NO_DEFAULTS: Self = Self {
        required: false,
        no_defaults: true,
    };
    /// Required input that must be wired by the user
    pub const REQUIRED_NO_DEFAULTS: Self = Self {
        required: true,
        no_defaults: true,
    };
}

/// One input slot on a node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Link {
    /// Source node, or [`NO_NODE`]
    pub target: NodeId,
    /// Declared kind; may be a placeholder
    pub value_type: ValueType,
    /// Display name
    pub name: &'static str,
    /// The node is invalid without a source here
    pub required: bool,
    /// Default injection is disabled
    pub no_defaults: bool,
    /// Last default node attached here, reused when still compatible
    pub last_default: NodeId,
}

impl Default for Link {
    fn default() -> Self {
        Self {
            target: NO_NODE,
            value_type: ValueType::None,
            name: "",
            required: false,
            no_defaults: false,
            last_default: NO_NODE,
        }
    }
}

impl Link {
    /// Create an unconnected link
    pub fn new(value_type: ValueType, name: &'static str, settings: LinkSettings) -> Self {
        Self {
            value_type,
            name,
            required: settings.required,
            no_defaults: settings.no_defaults,
            ..Self::default()
        }
    }

    /// Redeclare type, name and flags, keeping the connection
    pub fn declare(&mut self, value_type: ValueType, name: &'static str, settings: LinkSettings) {
        self.value_type = value_type;
        self.name = name;
        self.required = settings.required;
        self.no_defaults = settings.no_defaults;
    }

    /// Check if a user node feeds this input
    pub fn is_connected(&self) -> bool {
        self.target.is_user()
    }

    /// Check if this input has any source, user or default
    pub fn has_source(&self) -> bool {
        self.target != NO_NODE
    }

    /// Drop the source
    pub fn clear(&mut self) {
        self.target = NO_NODE;
    }
}

/// Resize an input list, keeping the existing links
pub fn resize_inputs(inputs: &mut Vec<Link>, count: usize) {
    inputs.resize_with(count, Link::default);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_ranges() {
        assert!(NodeId(1).is_user());
        assert!(NodeId(0).is_user());
        assert!(!NO_NODE.is_user());
        assert!(!NO_NODE.is_default());
        assert!(NodeId(-2).is_default());
    }

    #[test]
    fn test_connection_state() {
        let mut link = Link::new(ValueType::Float, "A", LinkSettings::REQUIRED);
        assert!(!link.is_connected());
        link.target = NodeId(-5);
        assert!(!link.is_connected());
        assert!(link.has_source());
        link.target = NodeId(3);
        assert!(link.is_connected());
        link.clear();
        assert_eq!(link.target, NO_NODE);
    }

    #[test]
    fn test_declare_keeps_target() {
        let mut inputs = vec![Link::new(ValueType::Float, "A", LinkSettings::NONE)];
        inputs[0].target = NodeId(4);
        resize_inputs(&mut inputs, 2);
        inputs[0].declare(ValueType::AnyScalar, "A", LinkSettings::REQUIRED);
        assert_eq!(inputs[0].target, NodeId(4));
        assert!(inputs[0].required);
        assert_eq!(inputs[1].target, NO_NODE);
        resize_inputs(&mut inputs, 1);
        assert_eq!(inputs.len(), 1);
    }
}
