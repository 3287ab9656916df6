// SPDX-License-Identifier: MIT OR Apache-2.0
//! Registry of node kinds, keyed by their stable kind id.

use crate::node::{NodeCategory, NodeKind};
use indexmap::IndexMap;

/// Registered node kind
#[derive(Debug, Clone)]
pub struct NodeType {
    /// Stable kind id, as written by the serializer
    pub id: &'static str,
    /// Category
    pub category: NodeCategory,
    /// Editor menu path, `None` for kinds the user cannot create directly
    pub menu_path: Option<&'static str>,
    /// Factory producing a default-configured instance
    pub create: fn() -> Box<dyn NodeKind>,
}

impl NodeType {
    /// Describe a kind built by `K::default()`
    pub fn of<K: NodeKind + Default + 'static>(
        id: &'static str,
        category: NodeCategory,
        menu_path: Option<&'static str>,
    ) -> Self {
        Self {
            id,
            category,
            menu_path,
            create: || -> Box<dyn NodeKind> { Box::new(K::default()) },
        }
    }
}

/// Registry of available node kinds
#[derive(Debug, Clone)]
pub struct NodeRegistry {
    types: IndexMap<&'static str, NodeType>,
}

impl NodeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            types: IndexMap::new(),
        }
    }

    /// Create a registry holding every built-in kind
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        crate::nodes::register_builtin(&mut registry);
        registry
    }

    /// Register a node kind, replacing any kind with the same id
    pub fn register(&mut self, node_type: NodeType) {
        self.types.insert(node_type.id, node_type);
    }

    /// Get a node kind by id
    pub fn get(&self, id: &str) -> Option<&NodeType> {
        self.types.get(id)
    }

    /// Get all registered kinds
    pub fn types(&self) -> impl Iterator<Item = &NodeType> {
        self.types.values()
    }

    /// Get kinds by category
    pub fn types_in_category(&self, category: NodeCategory) -> impl Iterator<Item = &NodeType> {
        self.types.values().filter(move |t| t.category == category)
    }

    /// Kinds offered in the editor's creation menu, in registration order
    pub fn menu(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.types
            .values()
            .filter_map(|t| t.menu_path.map(|path| (path, t.id)))
    }

    /// Create a default-configured instance of a kind
    pub fn create(&self, id: &str) -> Option<Box<dyn NodeKind>> {
        self.get(id).map(|t| (t.create)())
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
