//! Identity types and the capability shared by everything a node can perceive.
//!
//! Nodes and resources are stored in separate collections; the spatial grid
//! and the contact queue only carry an [`EntityId`], which tags which
//! collection to look in.

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a node, unique for the lifetime of an ecosystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u64);

/// Identifier of a resource, unique for the lifetime of a resource field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResourceId(pub u64);

/// Identifier of a species, assigned from a monotonic counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SpeciesId(pub u64);

/// Tagged identifier of any detectable entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityId {
    /// A living node.
    Node(NodeId),
    /// A resource point.
    Resource(ResourceId),
}

impl fmt::Display for SpeciesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{}", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Node(id) => write!(f, "node#{}", id.0),
            EntityId::Resource(id) => write!(f, "R{}", id.0),
        }
    }
}

impl From<NodeId> for EntityId {
    fn from(id: NodeId) -> Self {
        EntityId::Node(id)
    }
}

impl From<ResourceId> for EntityId {
    fn from(id: ResourceId) -> Self {
        EntityId::Resource(id)
    }
}

/// Anything a node's nearest-neighbour query can return.
///
/// Implemented by [`Node`](super::node::Node) and
/// [`Resource`](super::resource::Resource).
pub trait Detectable {
    /// Tagged identifier of the entity.
    fn entity_id(&self) -> EntityId;

    /// Returns a reference to the entity's position.
    fn pos(&self) -> &Array1<f32>;

    /// Species of the entity, `None` for resources.
    fn species(&self) -> Option<SpeciesId>;

    /// Radius of the entity's body, reported to perceivers as its size.
    fn body_radius(&self) -> f32;
}

/// Resolves identifiers held by the spatial grid back to live entities.
pub trait DetectableLookup {
    /// Returns the live entity with this id, if any.
    fn detectable(&self, id: EntityId) -> Option<&dyn Detectable>;
}
