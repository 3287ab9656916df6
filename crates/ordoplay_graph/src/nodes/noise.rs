// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fractal noise sampled at a 2D point.

use crate::link::{resize_inputs, Link, LinkSettings};
use crate::node::{NodeEnv, NodeKind};
use crate::noise::{fbm, Fractal};
use crate::processor::{BuildContext, Evaluator};
use crate::value::ValueType;
use glam::Vec2;

const LAYOUT: [(ValueType, &str); 5] = [
    (ValueType::Int, "Repeat Size"),
    (ValueType::Int, "Octaves"),
    (ValueType::Int, "Seed"),
    (ValueType::Float, "Roughness"),
    (ValueType::Vector2, "In"),
];

/// Fractal Brownian motion with lacunarity 2
#[derive(Debug, Default)]
pub struct PerlinNode;

impl NodeKind for PerlinNode {
    fn kind_id(&self) -> &'static str {
        "perlin"
    }

    fn name(&self) -> &str {
        "Perlin"
    }

    fn output_type(&self) -> ValueType {
        ValueType::Float
    }

    fn configure(&mut self, inputs: &mut Vec<Link>) {
        resize_inputs(inputs, LAYOUT.len());
        for (index, (link, &(ty, name))) in inputs.iter_mut().zip(&LAYOUT).enumerate() {
            let settings = if index == 4 {
                LinkSettings::REQUIRED_NO_DEFAULTS
            } else {
                LinkSettings::REQUIRED
            };
            link.declare(ty, name, settings);
        }
    }

    fn check_types(&self, _: &mut Vec<Link>, in_types: &[ValueType], _: &NodeEnv) -> ValueType {
        let matches = in_types.len() == LAYOUT.len() && LAYOUT.iter().zip(in_types).all(|(&(ty, _), &t)| ty == t);
        if matches { ValueType::Float } else { ValueType::Error }
    }

    fn build(&self, _: &BuildContext<'_>) -> Option<Evaluator> {
        Some(Evaluator::new(|i| {
            let fractal = Fractal {
                repeat: i.get::<i32>(0),
                octaves: i.get::<i32>(1),
                seed: i.get::<i32>(2),
                gain: i.get::<f32>(3),
                lacunarity: 2,
            };
            let p = i.get::<Vec2>(4);
            fbm(p.x, p.y, &fractal)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;
    use crate::nodes::values::Vector2Node;
    use crate::value::Value;

    #[test]
    fn test_needs_point() {
        let mut graph = Graph::new("test");
        let id = graph.add_node(Box::new(PerlinNode));
        graph.rebuild_sink_list();
        assert_eq!(graph.node(id).unwrap().inputs[4].target, crate::NO_NODE);
        assert_eq!(graph.evaluate(id), None);
    }

    #[test]
    fn test_matches_fbm() {
        let mut graph = Graph::new("test");
        let p = graph.add_node(Box::new(Vector2Node::with_value(Vec2::new(1.3, 2.6))));
        let id = graph.add_node(Box::new(PerlinNode));
        graph.connect(id, 4, p).unwrap();
        graph.rebuild_sink_list();
        let octaves = graph.node(id).unwrap().inputs[1].target;
        let roughness = graph.node(id).unwrap().inputs[3].target;
        graph.set_int(octaves, 3).unwrap();
        graph.set_float(roughness, 0.5).unwrap();

        let expected = fbm(
            1.3,
            2.6,
            &Fractal {
                octaves: 3,
                ..Fractal::default()
            },
        );
        assert_eq!(graph.evaluate(id), Some(Value::Float(expected)));
    }
}
