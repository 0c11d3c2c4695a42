//! Node module containing node state, perception and movement.

mod movement;
mod node;
mod perception;

// Re-export everything from the node module
pub use node::*;

// Re-export the perception → decision pipeline
pub use movement::{Decision, decide, movement_cost};
pub use perception::{DETECTION_RANGE, Percept, build_input_vector, perceive};
