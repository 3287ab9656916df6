// SPDX-License-Identifier: MIT OR Apache-2.0
//! Built-in node kinds.

pub mod math;
pub mod noise;
pub mod operations;
pub mod property;
pub mod quaternion;
pub mod random;
pub mod swizzle;
pub mod time;
pub mod values;
pub mod vector_math;

use crate::defaults::DefaultNode;
use crate::node::NodeCategory;
use crate::registry::{NodeRegistry, NodeType};
use glam::{Vec2, Vec3, Vec4};

/// Operation selector stored as its discriminant
macro_rules! field_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident: $label:literal {
            $($(#[$vmeta:meta])* $variant:ident),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// Every variant in discriminant order
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];
        }

        impl Default for $name {
            fn default() -> Self {
                Self::ALL[0]
            }
        }

        impl $crate::serializer::FieldEnum for $name {
            const NAME: &'static str = $label;

            fn from_index(index: i32) -> Option<Self> {
                usize::try_from(index).ok().and_then(|i| Self::ALL.get(i)).copied()
            }

            fn index(self) -> i32 {
                self as i32
            }
        }
    };
}

pub(crate) use field_enum;

/// Register every built-in kind
pub fn register_builtin(registry: &mut NodeRegistry) {
    use NodeCategory::*;

    registry.register(NodeType::of::<values::FloatNode>("float", Value, Some("Values/Float")));
    registry.register(NodeType::of::<values::IntNode>("int", Value, Some("Values/Int")));
    registry.register(NodeType::of::<values::BoolNode>("bool", Value, Some("Values/Bool")));
    registry.register(NodeType::of::<values::Vector2Node>("vector2", Value, Some("Values/Vector2")));
    registry.register(NodeType::of::<values::Vector3Node>("vector3", Value, Some("Values/Vector3")));
    registry.register(NodeType::of::<values::Vector4Node>("vector4", Value, Some("Values/Vector4")));
    registry.register(NodeType::of::<values::ColorNode>("color", Value, Some("Values/Color")));
    registry.register(NodeType::of::<values::CurveNode>("curve", Lookup, Some("Values/Curve")));
    registry.register(NodeType::of::<values::RampNode>("ramp", Lookup, Some("Values/Ramp")));

    registry.register(NodeType::of::<DefaultNode<f32>>("default_float", Default, None));
    registry.register(NodeType::of::<DefaultNode<i32>>("default_int", Default, None));
    registry.register(NodeType::of::<DefaultNode<bool>>("default_bool", Default, None));
    registry.register(NodeType::of::<DefaultNode<Vec2>>("default_vector2", Default, None));
    registry.register(NodeType::of::<DefaultNode<Vec3>>("default_vector3", Default, None));
    registry.register(NodeType::of::<DefaultNode<Vec4>>("default_vector4", Default, None));
    registry.register(NodeType::of::<DefaultNode<crate::value::Color>>("default_color", Default, None));

    registry.register(NodeType::of::<math::MathNode>("math", Math, Some("Operations/Math")));
    registry.register(NodeType::of::<operations::ConvertNode>("convert", Math, Some("Operations/Convert")));
    registry.register(NodeType::of::<operations::LerpNode>("lerp", Math, Some("Operations/Lerp")));

    registry.register(NodeType::of::<vector_math::VectorMathNode>("vector_math", Vector, Some("Vector/Vector Math")));
    registry.register(NodeType::of::<quaternion::QuaternionMathNode>(
        "quaternion_math",
        Vector,
        Some("Vector/Quaternion Math"),
    ));
    registry.register(NodeType::of::<operations::VecModifyNode>("vec_modify", Vector, Some("Vector/Modify")));
    registry.register(NodeType::of::<operations::VecConstructorNode>(
        "vec_constructor",
        Vector,
        Some("Vector/Constructor"),
    ));
    registry.register(NodeType::of::<swizzle::SwizzleNode>("swizzle", Vector, Some("Vector/Swizzle")));
    registry.register(NodeType::of::<operations::ColorHsvNode>("color_hsv", Vector, Some("Vector/RGB HSV")));

    registry.register(NodeType::of::<operations::ConditionNode>("condition", Logic, Some("Logic/Condition")));
    registry.register(NodeType::of::<operations::IfNode>("if", Logic, Some("Logic/If")));
    registry.register(NodeType::of::<operations::BoolOperatorNode>("bool_operator", Logic, Some("Logic/Bool Operator")));

    registry.register(NodeType::of::<time::SpringNode>("spring", Time, Some("Time/Spring")));
    registry.register(NodeType::of::<time::DeltaNode>("delta", Time, Some("Time/Delta")));
    registry.register(NodeType::of::<time::DozerNode>("dozer", Time, Some("Time/Dozer")));
    registry.register(NodeType::of::<time::TimerNode>("timer", Time, Some("Time/Timer")));

    registry.register(NodeType::of::<random::RandomNode>("random", Noise, Some("Noise/Random")));
    registry.register(NodeType::of::<noise::PerlinNode>("perlin", Noise, Some("Noise/Perlin")));

    registry.register(NodeType::of::<property::PropertyInputNode>("property_input", Property, Some("Property/Input")));
    registry.register(NodeType::of::<property::PropertyOutputNode>(
        "property_output",
        Property,
        Some("Property/Output"),
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serializer::FieldEnum;

    field_enum! {
        /// Test selector
        pub enum Pick: "pick" {
            /// First
            First,
            /// Second
            Second,
        }
    }

    #[test]
    fn test_field_enum() {
        assert_eq!(Pick::default(), Pick::First);
        assert_eq!(Pick::from_index(1), Some(Pick::Second));
        assert_eq!(Pick::from_index(-1), None);
        assert_eq!(Pick::from_index(2), None);
        assert_eq!(Pick::Second.index(), 1);
    }
}
