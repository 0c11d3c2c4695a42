//! Turns controller outputs into a force and a resource cost.

use ndarray::Array1;

use super::super::brain;
use super::super::params::Params;
use super::Node;
use super::perception::{Percept, build_input_vector};

/// A node's choice for one tick, computed from the start-of-tick snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    /// Heading in degrees, `output[0] * 360`.
    pub heading: f32,
    /// Thrust magnitude, `|output[1]| * speed_multiplier`.
    pub thrust: f32,
    /// Force vector to apply to the body.
    pub force: Array1<f32>,
    /// Resources burned this tick.
    pub cost: f32,
    /// The percept the decision was based on.
    pub percept: Percept,
}

/// Runs the controller on a percept and derives force and cost.
pub fn decide(node: &Node, percept: Percept, params: &Params) -> Decision {
    let input = build_input_vector(node, &percept);
    let output = brain::feed_forward(&input, &node.genome);

    let heading = output[0] * 360.0;
    let thrust = output[1].abs() * params.speed_multiplier;
    let radians = heading.to_radians();
    let force = Array1::from_vec(vec![radians.cos() * thrust, radians.sin() * thrust]);

    Decision {
        heading,
        thrust,
        force,
        cost: movement_cost(output[1], node.radius, params),
        percept,
    }
}

/// Resources burned per movement update for a signed thrust output.
pub fn movement_cost(thrust_output: f32, radius: f32, params: &Params) -> f32 {
    let feed_rate = params.feed_rate(radius);
    if params.movement_costs_resources {
        thrust_output.abs() * (params.tick_interval / 10.0) + feed_rate
    } else {
        feed_rate
    }
}
