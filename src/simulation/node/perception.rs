//! Nearest-neighbour perception and controller input encoding.

use ndarray::Array1;

use super::super::detectable::{DetectableLookup, EntityId};
use super::super::geometric_utils::{bearing_degrees, distance};
use super::super::spatial::SpatialGrid;
use super::Node;

/// Perception range; also the distance reported when nothing is perceived.
pub const DETECTION_RANGE: f32 = 200.0;

/// What a node knows about its closest eligible neighbour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Percept {
    /// Body radius of the neighbour, 0 when nothing was found.
    pub size: f32,
    /// Bearing from the neighbour back to the node in degrees, `[0, 360)`.
    /// Without a neighbour, the bearing from the node to its birth position.
    pub angle: f32,
    /// Distance to the neighbour.
    pub distance: f32,
    /// The neighbour, if any.
    pub target: Option<EntityId>,
}

/// Finds the closest eligible entity in the node's 3×3 grid block.
///
/// Self is never eligible; members of the node's own species are eligible
/// only with `cannibalism`. Ties keep the first entity found. When nothing is
/// closer than [`DETECTION_RANGE`], the percept points back at the node's
/// birth position with size 0 and distance [`DETECTION_RANGE`].
pub fn perceive(
    node: &Node,
    grid: &SpatialGrid,
    world: &impl DetectableLookup,
    cannibalism: bool,
) -> Percept {
    let self_id = EntityId::Node(node.id);
    let cell = grid
        .cell_of(self_id)
        .unwrap_or_else(|| grid.cell_coordinates(&node.pos));

    let mut closest = DETECTION_RANGE;
    let mut nearest = None;

    for id in grid.neighbors_around(cell) {
        if id == self_id {
            continue;
        }
        let Some(other) = world.detectable(id) else {
            continue;
        };
        if !cannibalism && other.species() == Some(node.species) {
            continue;
        }
        let dist = distance(&node.pos, other.pos());
        if dist < closest {
            closest = dist;
            nearest = Some(other);
        }
    }

    match nearest {
        Some(other) => Percept {
            size: other.body_radius(),
            angle: bearing_degrees(other.pos(), &node.pos),
            distance: closest,
            target: Some(other.entity_id()),
        },
        None => Percept {
            size: 0.0,
            angle: bearing_degrees(&node.pos, &node.birth_pos),
            distance: DETECTION_RANGE,
            target: None,
        },
    }
}

/// Encodes a percept and the node's own state as the four controller inputs.
///
/// 1. relative size `(size - radius) / radius`, clamped to `[-1, 1]`
/// 2. angle / 360
/// 3. distance / 200
/// 4. fill ratio of the resource store
pub fn build_input_vector(node: &Node, percept: &Percept) -> Array1<f32> {
    let relative_size = if node.radius > 0.0 {
        ((percept.size - node.radius) / node.radius).clamp(-1.0, 1.0)
    } else {
        1.0
    };

    Array1::from_vec(vec![
        relative_size,
        percept.angle / 360.0,
        percept.distance / DETECTION_RANGE,
        node.fill_ratio(),
    ])
}
