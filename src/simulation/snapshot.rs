//! Read-only views of the ecosystem for display.

use serde::{Deserialize, Serialize};

use super::detectable::{NodeId, SpeciesId};
use super::error::SimulationError;
use super::naming::Color;
use super::node::Node;
use super::species::{Species, SpeciesRegistry};

/// Display state of a single node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    /// Node identifier.
    pub id: NodeId,
    /// Display identifier.
    pub name: String,
    /// Position in world coordinates.
    pub position: [f32; 2],
    /// Body radius.
    pub radius: f32,
    /// Species colour.
    pub color: Color,
    /// Current resource level.
    pub resources: f32,
    /// Resource capacity.
    pub capacity: f32,
    /// Elapsed age intervals.
    pub age: u32,
    /// Generation within its species.
    pub generation: u32,
    /// Children produced.
    pub offspring: u32,
    /// Owning species.
    pub species: SpeciesId,
    /// False once the node has died.
    pub alive: bool,
}

/// Display state of a single active species.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesSnapshot {
    /// Species identifier.
    pub id: SpeciesId,
    /// Parent word followed by the species word.
    pub name: String,
    /// Elapsed age intervals since founding.
    pub age: u64,
    /// Living members.
    pub member_count: usize,
    /// Length of the lineage above this species.
    pub ancestor_count: usize,
    /// Species founded from this one.
    pub descendant_count: usize,
    /// Display colour.
    pub color: Color,
}

/// World-level totals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldTotals {
    /// Simulated seconds elapsed.
    pub time: f32,
    /// Living nodes.
    pub node_count: usize,
    /// Species with at least one member.
    pub active_species: usize,
    /// Species founded since the start, extinct ones included.
    pub species_founded: u64,
    /// Live resources.
    pub resource_count: usize,
}

/// Everything the presentation layer needs to draw a frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// World-level totals.
    pub totals: WorldTotals,
    /// Living nodes in id order.
    pub nodes: Vec<NodeSnapshot>,
    /// Active species in id order.
    pub species: Vec<SpeciesSnapshot>,
}

impl NodeSnapshot {
    /// Captures a node, colouring it with its species colour.
    pub fn capture(node: &Node, registry: &SpeciesRegistry) -> Self {
        let color = registry
            .get(node.species)
            .map(|s| s.color)
            .unwrap_or_default();
        Self {
            id: node.id,
            name: node.name.clone(),
            position: [node.pos[0], node.pos[1]],
            radius: node.radius,
            color,
            resources: node.resources,
            capacity: node.max_resources,
            age: node.age,
            generation: node.generation,
            offspring: node.offspring,
            species: node.species,
            alive: node.alive,
        }
    }
}

impl From<&Species> for SpeciesSnapshot {
    fn from(species: &Species) -> Self {
        Self {
            id: species.id,
            name: species.name(),
            age: species.age,
            member_count: species.member_count(),
            ancestor_count: species.ancestors.len(),
            descendant_count: species.descendants.len(),
            color: species.color,
        }
    }
}

impl Snapshot {
    /// Serializes the snapshot as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, SimulationError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
