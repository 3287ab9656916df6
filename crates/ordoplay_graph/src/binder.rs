// SPDX-License-Identifier: MIT OR Apache-2.0
//! Host property access for property tap nodes.

use crate::value::{Value, ValueType};
use std::cell::RefCell;
use std::collections::HashMap;

/// Resolves property addresses to readable or writable host values
///
/// Addresses are opaque to the graph. A binder that cannot resolve an
/// address returns `None` from the type queries, which makes the tap node
/// an `Error`.
pub trait PropertyBinder {
    /// Kind readable at `address`
    fn readable_type(&self, address: &str) -> Option<ValueType>;

    /// Kind writable at `address`
    fn writable_type(&self, address: &str) -> Option<ValueType>;

    /// Current value at `address`
    fn get(&self, address: &str) -> Option<Value>;

    /// Write `value` to `address`; returns false if it was not accepted
    fn set(&self, address: &str, value: Value) -> bool;
}

/// In-memory binder over a flat map of named values
///
/// Every known address is readable and writable with the kind of the value
/// it currently holds.
#[derive(Debug, Default)]
pub struct PropertyMap {
    values: RefCell<HashMap<String, Value>>,
}

impl PropertyMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare or overwrite a property
    pub fn insert(&self, address: impl Into<String>, value: Value) {
        self.values.borrow_mut().insert(address.into(), value);
    }

    /// Read a property
    pub fn value(&self, address: &str) -> Option<Value> {
        self.values.borrow().get(address).copied()
    }

    fn kind(&self, address: &str) -> Option<ValueType> {
        self.value(address).map(|v| v.value_type())
    }
}

impl PropertyBinder for PropertyMap {
    fn readable_type(&self, address: &str) -> Option<ValueType> {
        self.kind(address)
    }

    fn writable_type(&self, address: &str) -> Option<ValueType> {
        self.kind(address)
    }

    fn get(&self, address: &str) -> Option<Value> {
        self.value(address)
    }

    fn set(&self, address: &str, value: Value) -> bool {
        let mut values = self.values.borrow_mut();
        match values.get_mut(address) {
            Some(slot) if slot.value_type() == value.value_type() => {
                *slot = value;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_map() {
        let map = PropertyMap::new();
        map.insert("speed", Value::Float(1.0));
        assert_eq!(map.readable_type("speed"), Some(ValueType::Float));
        assert_eq!(map.writable_type("missing"), None);
        assert!(map.set("speed", Value::Float(3.0)));
        assert!(!map.set("speed", Value::Int(3)));
        assert!(!map.set("missing", Value::Int(3)));
        assert_eq!(map.get("speed"), Some(Value::Float(3.0)));
    }
}
