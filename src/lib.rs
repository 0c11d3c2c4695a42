//! # Nodus - Evolving Neural Nodes
//!
//! An agent-based evolutionary simulation. Circular nodes steer with a tiny
//! feed-forward network, eat resources scattered over the world, consume
//! each other on contact and reproduce asexually with mutation. Offspring
//! that drift far enough from their species' founder start a new species.
//!
//! ## Features
//!
//! - Uniform-cell spatial grid for nearest-neighbour perception
//! - Linear 4→3→3→2 controller per node
//! - Weight and bias mutation with divergence-based speciation
//! - Species lineage, naming and extinction bookkeeping
//! - Contact policy with cannibalism, energy and inversion rules
//! - Serializable snapshots for a presentation layer
//!
//! ## Core Modules
//!
//! - [`simulation::ecosystem`] - Owned simulation state and the tick
//! - [`simulation::spatial`] - Spatial grid
//! - [`simulation::node`] - Node state, perception and movement
//! - [`simulation::genome`] - Genome, mutation and divergence
//! - [`simulation::species`] - Species registry
//! - [`simulation::collision`] - Contact policy

/// Core simulation logic and data structures.
pub mod simulation {
    /// Fixed-topology linear controller.
    pub mod brain;
    /// Contact classification and consumption policy.
    pub mod collision;
    /// Identity types and the detectable capability.
    ///
    /// The [`detectable::Detectable`] trait is implemented by everything a
    /// node can perceive (nodes and resources).
    pub mod detectable;
    /// Main ecosystem simulation.
    pub mod ecosystem;
    /// Configuration and runtime errors.
    pub mod error;
    /// Outbound lifecycle events.
    pub mod events;
    /// Genome layout, mutation and speciation divergence.
    pub mod genome;
    /// Geometric utility functions for distance calculations.
    pub mod geometric_utils;
    /// Species words and colours.
    pub mod naming;
    /// Node behavior, state, and lifecycle.
    pub mod node;
    /// Simulation parameters.
    pub mod params;
    /// Static resources and the field that spawns them.
    pub mod resource;
    /// Display snapshots.
    pub mod snapshot;
    /// Uniform-cell spatial index.
    pub mod spatial;
    /// Species registry and lineage.
    pub mod species;
}
