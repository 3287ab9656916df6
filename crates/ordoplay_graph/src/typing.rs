// SPDX-License-Identifier: MIT OR Apache-2.0
//! Type-resolution rules shared by node kinds.
//!
//! Every rule is pure. Tie-break order matters: mixed float/int widens to
//! float, and a vector paired with a float or int keeps the vector type.

use crate::value::ValueType;

/// All kinds equal, or `Error`
///
/// An empty list resolves to `None`.
pub fn same(types: &[ValueType]) -> ValueType {
    match types.split_first() {
        None => ValueType::None,
        Some((&first, rest)) if rest.iter().all(|&t| t == first) => first,
        Some(_) => ValueType::Error,
    }
}

/// `ty` is exactly `target`, or unconnected
pub fn exact_or_none(ty: ValueType, target: ValueType) -> bool {
    ty == target || ty == ValueType::None
}

/// `ty` if vector-like, otherwise `Error`
pub fn vector_only(ty: ValueType) -> ValueType {
    if ty.is_vector() { ty } else { ValueType::Error }
}

/// `ty` if a scalar value kind, otherwise `Error`
pub fn value_only(ty: ValueType) -> ValueType {
    if ty.is_value() { ty } else { ValueType::Error }
}

/// Float/int pairs; mixed pairs widen to float
pub fn float_or_int(a: ValueType, b: ValueType) -> ValueType {
    if !a.is_float_or_int() || !b.is_float_or_int() {
        return ValueType::Error;
    }
    if a == b { a } else { ValueType::Float }
}

/// Equal vectors, or a vector paired with a float or int
pub fn vector_float_or_int(a: ValueType, b: ValueType) -> ValueType {
    match (a.is_vector(), b.is_vector()) {
        (true, true) if a == b => a,
        (true, false) if b.is_float_or_int() => a,
        (false, true) if a.is_float_or_int() => b,
        _ => ValueType::Error,
    }
}

/// Float pairs, equal vectors, or a vector paired with a float
pub fn vector_or_float(a: ValueType, b: ValueType) -> ValueType {
    match (a, b) {
        (ValueType::Float, ValueType::Float) => ValueType::Float,
        _ if a.is_vector() && a == b => a,
        (ValueType::Float, _) if b.is_vector() => b,
        (_, ValueType::Float) if a.is_vector() => a,
        _ => ValueType::Error,
    }
}

/// Whether an input declared as `declared` accepts a source of kind `source`
///
/// Placeholders accept any kind in their class; concrete kinds need an
/// exact match.
pub fn accepts(declared: ValueType, source: ValueType) -> bool {
    match declared {
        ValueType::AnyScalar => source.is_value(),
        ValueType::AnyVector => source.is_vector(),
        _ => declared == source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ValueType::*;

    #[test]
    fn test_same() {
        assert_eq!(same(&[Float, Float, Float]), Float);
        assert_eq!(same(&[Float, Int]), Error);
        assert_eq!(same(&[]), None);
    }

    #[test]
    fn test_float_or_int() {
        assert_eq!(float_or_int(Float, Int), Float);
        assert_eq!(float_or_int(Int, Float), Float);
        assert_eq!(float_or_int(Int, Int), Int);
        assert_eq!(float_or_int(Float, Float), Float);
        assert_eq!(float_or_int(Float, Vector2), Error);
        assert_eq!(float_or_int(None, Float), Error);
    }

    #[test]
    fn test_vector_float_or_int() {
        assert_eq!(vector_float_or_int(Vector3, Float), Vector3);
        assert_eq!(vector_float_or_int(Int, Vector2), Vector2);
        assert_eq!(vector_float_or_int(Vector3, Vector3), Vector3);
        assert_eq!(vector_float_or_int(Vector3, Vector2), Error);
        assert_eq!(vector_float_or_int(Float, Float), Error);
        assert_eq!(vector_float_or_int(Color, Bool), Error);
    }

    #[test]
    fn test_vector_or_float() {
        assert_eq!(vector_or_float(Float, Float), Float);
        assert_eq!(vector_or_float(Vector2, Float), Vector2);
        assert_eq!(vector_or_float(Float, Color), Color);
        assert_eq!(vector_or_float(Vector4, Int), Error);
        assert_eq!(vector_or_float(Int, Int), Error);
    }

    #[test]
    fn test_only_rules() {
        assert_eq!(vector_only(Vector4), Vector4);
        assert_eq!(vector_only(Float), Error);
        assert_eq!(value_only(Int), Int);
        assert_eq!(value_only(Bool), Error);
        assert!(exact_or_none(None, Float));
        assert!(exact_or_none(Float, Float));
        assert!(!exact_or_none(Int, Float));
    }

    #[test]
    fn test_accepts() {
        assert!(accepts(AnyScalar, Int));
        assert!(accepts(AnyScalar, Color));
        assert!(!accepts(AnyScalar, Bool));
        assert!(accepts(AnyVector, Vector2));
        assert!(!accepts(AnyVector, Float));
        assert!(accepts(Bool, Bool));
        assert!(!accepts(Float, Int));
    }
}
