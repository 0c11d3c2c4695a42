//! Outbound lifecycle events.
//!
//! The ecosystem records every birth, death, founding and consumption in an
//! event queue; the presentation layer drains it after each tick.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use super::detectable::{NodeId, ResourceId, SpeciesId};

/// Why a node was removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    /// Resources ran out at a starvation check.
    Starved,
    /// Lost a contact to another node.
    Consumed,
    /// Strayed beyond the maximum distance from the origin.
    Doomed,
}

/// Something that happened during a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimulationEvent {
    /// A node entered the world.
    NodeBorn {
        /// The new node.
        node: NodeId,
        /// Its species.
        species: SpeciesId,
        /// Parent node, `None` for random spawns.
        parent: Option<NodeId>,
    },
    /// A node was removed.
    NodeDied {
        /// The removed node.
        node: NodeId,
        /// Its species at the time of death.
        species: SpeciesId,
        /// Where it died.
        pos: Array1<f32>,
        /// Why it died.
        cause: DeathCause,
    },
    /// A species was founded.
    SpeciesFounded {
        /// The new species.
        species: SpeciesId,
        /// Parent species, `None` for roots.
        parent: Option<SpeciesId>,
    },
    /// A species lost its last member.
    SpeciesExtinct {
        /// The retired species.
        species: SpeciesId,
    },
    /// A resource was placed.
    ResourceSpawned {
        /// The new resource.
        resource: ResourceId,
    },
    /// A node consumed a resource.
    ResourceConsumed {
        /// The consuming node.
        node: NodeId,
        /// The removed resource.
        resource: ResourceId,
    },
    /// A node consumed another node; the loser also gets a `NodeDied`.
    NodeConsumed {
        /// Winner of the contact.
        consumer: NodeId,
        /// Node that was consumed.
        loser: NodeId,
        /// Resources credited to the consumer.
        gained: f32,
    },
}

/// Queue of events waiting to be drained.
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: Vec<SimulationEvent>,
}

impl EventQueue {
    /// Creates an empty event queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an event to the queue.
    pub fn push(&mut self, event: SimulationEvent) {
        self.events.push(event);
    }

    /// Drains all events from the queue.
    pub fn drain(&mut self) -> std::vec::Drain<'_, SimulationEvent> {
        self.events.drain(..)
    }
}
