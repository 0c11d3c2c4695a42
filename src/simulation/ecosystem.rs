//! Main ecosystem simulation.
//!
//! The ecosystem owns every node, species, resource and the spatial grid,
//! and advances them on a single logical clock:
//! - Grid rebuilt from current positions before any perception
//! - Parallel perception and decisions using rayon, against a frozen snapshot
//! - Serial application of forces, costs and integration
//! - Reported contacts resolved after movement, re-checking liveness
//! - Per-node timers for reproduction, starvation, aging and prey cooldown
//! - Doomed sweep, resource rain and the population floor

use log::{debug, info, trace, warn};
use ndarray::Array1;
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

use super::collision::{self, ContactOutcome, ContactPair};
use super::detectable::{Detectable, DetectableLookup, EntityId, NodeId, ResourceId, SpeciesId};
use super::error::{ConfigError, SimulationError};
use super::events::{DeathCause, EventQueue, SimulationEvent};
use super::genome::Phenotype;
use super::geometric_utils::{distance, distance_from_origin, line_circle_distance};
use super::node::{self, Decision, Node};
use super::params::Params;
use super::resource::{self, RESOURCE_RADIUS, ResourceField};
use super::snapshot::{NodeSnapshot, Snapshot, SpeciesSnapshot, WorldTotals};
use super::spatial::SpatialGrid;
use super::species::{Removal, SpeciesRegistry};

/// The whole simulation state.
#[derive(Debug, Clone)]
pub struct Ecosystem {
    params: Params,
    nodes: BTreeMap<NodeId, Node>,
    species: SpeciesRegistry,
    resources: ResourceField,
    grid: SpatialGrid,
    contacts: Vec<(EntityId, EntityId)>,
    events: EventQueue,
    time: f32,
    doomed_timer: f32,
    next_node_id: u64,
}

impl Ecosystem {
    /// Creates an ecosystem with the starting resources and no nodes.
    ///
    /// Nodes appear through the population floor on the first tick, or
    /// explicitly through [`Ecosystem::spawn_random_node`].
    pub fn new(params: Params) -> Result<Self, SimulationError> {
        params.validate()?;

        let mut ecosystem = Self {
            grid: SpatialGrid::new(params.world_width, params.world_height),
            params,
            nodes: BTreeMap::new(),
            species: SpeciesRegistry::new(),
            resources: ResourceField::new(),
            contacts: Vec::new(),
            events: EventQueue::new(),
            time: 0.0,
            doomed_timer: 0.0,
            next_node_id: 0,
        };

        let seeded = ecosystem.resources.seed(
            ecosystem.params.starting_resources,
            ecosystem.params.resource_value,
            ecosystem.params.max_resources,
            ecosystem.world(),
        );
        for id in seeded {
            ecosystem.index_resource(id);
        }

        info!(
            "ecosystem created: {}x{} world, {}x{} grid, {} resources",
            ecosystem.params.world_width,
            ecosystem.params.world_height,
            ecosystem.grid.cols(),
            ecosystem.grid.rows(),
            ecosystem.resources.len()
        );
        Ok(ecosystem)
    }

    /// Replaces the parameters after validating them.
    ///
    /// A change of world dimensions resizes and refills the spatial grid.
    pub fn set_params(&mut self, params: Params) -> Result<(), ConfigError> {
        params.validate()?;
        let resized = (params.world_width - self.params.world_width).abs() > f32::EPSILON
            || (params.world_height - self.params.world_height).abs() > f32::EPSILON;
        self.params = params;

        if resized {
            self.grid
                .resize(self.params.world_width, self.params.world_height);
            self.rebuild_grid();
            info!(
                "world resized to {}x{}, grid now {}x{}",
                self.params.world_width,
                self.params.world_height,
                self.grid.cols(),
                self.grid.rows()
            );
        }
        Ok(())
    }

    /// Current parameters.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Simulated seconds elapsed.
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Looks up a living node.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Mutable access to a living node.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// Species of a living node.
    pub fn species_of(&self, id: NodeId) -> Option<SpeciesId> {
        self.nodes.get(&id).map(|n| n.species)
    }

    /// Living nodes in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Number of living nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// The species registry.
    pub fn species(&self) -> &SpeciesRegistry {
        &self.species
    }

    /// The resource field.
    pub fn resources(&self) -> &ResourceField {
        &self.resources
    }

    /// The spatial grid as of the last rebuild.
    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    /// Contacts reported but not yet resolved.
    pub fn pending_contacts(&self) -> &[(EntityId, EntityId)] {
        &self.contacts
    }

    /// Hands all recorded events to the caller.
    pub fn drain_events(&mut self) -> Vec<SimulationEvent> {
        self.events.drain().collect()
    }

    /// Advances the simulation by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        if !dt.is_finite() || dt <= 0.0 {
            warn!("ignoring tick with invalid time step {dt}");
            return;
        }
        self.time += dt;

        self.rebuild_grid();
        self.move_nodes(dt);
        self.resolve_contacts();
        self.advance_node_timers(dt);
        self.species.age_by(dt, self.params.age_interval);
        self.sweep_doomed(dt);
        self.rain_resources(dt);
        self.enforce_population_floor();

        trace!(
            "t={:.2}: {} nodes, {} species, {} resources",
            self.time,
            self.nodes.len(),
            self.species.active_count(),
            self.resources.len()
        );
    }

    /// Queues a contact between two entities for resolution on the next tick.
    pub fn report_contact(&mut self, a: impl Into<EntityId>, b: impl Into<EntityId>) {
        self.contacts.push((a.into(), b.into()));
    }

    /// Resolves every queued contact in report order.
    pub fn resolve_contacts(&mut self) -> Vec<ContactOutcome> {
        let contacts = std::mem::take(&mut self.contacts);
        contacts
            .into_iter()
            .map(|(a, b)| self.resolve_contact(a, b))
            .collect()
    }

    /// Resolves a single contact immediately.
    ///
    /// Contacts naming a missing or dead participant are absorbed as
    /// [`ContactOutcome::Stale`].
    pub fn resolve_contact(&mut self, a: EntityId, b: EntityId) -> ContactOutcome {
        match collision::classify(a, b) {
            ContactPair::Invalid => ContactOutcome::Stale,
            ContactPair::NodeResource(node_id, resource_id) => {
                self.consume_resource(node_id, resource_id)
            }
            ContactPair::Nodes(x, y) => self.resolve_node_contact(x, y),
        }
    }

    /// Spawns a node with random traits that founds a new root species.
    pub fn spawn_random_node(&mut self) -> NodeId {
        let phenotype = node::random_phenotype();
        let resources = phenotype.radius / 4.0;
        let pos = resource::random_position(self.params.world_width, self.params.world_height);
        self.spawn_founder(phenotype, pos, resources)
    }

    /// Spawns a node with the given traits that founds a new root species.
    pub fn spawn_founder(&mut self, phenotype: Phenotype, pos: Array1<f32>, resources: f32) -> NodeId {
        let id = self.allocate_node_id();
        let species = self.species.found_root(phenotype.clone(), id);
        self.events.push(SimulationEvent::SpeciesFounded {
            species,
            parent: None,
        });

        let name = format!("S{}-N1", species.0);
        let node = Node::new(id, species, name, phenotype, pos, resources, 1);
        self.insert_node(node, None);
        id
    }

    /// Places a resource, at a random position when `pos` is `None`.
    ///
    /// Returns `None` when the resource cap is reached.
    pub fn spawn_resource(&mut self, pos: Option<Array1<f32>>) -> Option<ResourceId> {
        let id = self.resources.spawn(
            pos,
            self.params.resource_value,
            self.params.max_resources,
            self.world(),
        )?;
        self.index_resource(id);
        Some(id)
    }

    /// Asexual reproduction of a living node.
    ///
    /// The parent pays `radius * 0.25` resources and stops preying for a
    /// while; the child starts with `radius * 0.125` at the parent's
    /// position. A sufficiently divergent child founds a new species.
    /// Returns `None` when the parent is missing or too poor.
    pub fn reproduce(&mut self, parent_id: NodeId) -> Option<NodeId> {
        let parent = self.nodes.get(&parent_id).filter(|n| n.can_reproduce())?;
        let phenotype = parent.offspring_phenotype();
        let cost = parent.reproduction_cost();
        let endowment = parent.child_endowment();
        let parent_species = parent.species;
        let generation = parent.generation + 1;
        let pos = parent.pos.clone();

        let speciate = self.params.speciation
            && self.species.active(parent_species).is_some_and(|s| {
                phenotype.should_speciate(&s.representative, self.params.speciation_threshold)
            });

        let child_id = self.allocate_node_id();
        let (species, member, generation) = if speciate {
            let species = self
                .species
                .found_child(parent_species, phenotype.clone(), child_id)?;
            self.events.push(SimulationEvent::SpeciesFounded {
                species,
                parent: Some(parent_species),
            });
            (species, 1, 1)
        } else {
            let member = self.species.join(parent_species, child_id)?;
            (parent_species, member, generation)
        };

        if let Some(parent) = self.nodes.get_mut(&parent_id) {
            parent.spend_resources(cost);
            parent.offspring += 1;
            parent.start_prey_cooldown(self.params.prey_cooldown);
        }

        let name = format!("S{}-N{}", species.0, member);
        let child = Node::new(child_id, species, name, phenotype, pos, endowment, generation);
        debug!("{} reproduced: {}", parent_id.0, child.name);
        self.insert_node(child, Some(parent_id));
        Some(child_id)
    }

    /// Removes a node from the grid, its species and the node registry.
    ///
    /// Returns false when the node was already gone.
    pub fn kill(&mut self, id: NodeId, cause: DeathCause) -> bool {
        let Some(mut node) = self.nodes.remove(&id) else {
            return false;
        };
        node.alive = false;
        self.grid.remove(EntityId::Node(id));

        if self.species.remove_member(node.species, id) == Removal::Retired {
            self.events.push(SimulationEvent::SpeciesExtinct {
                species: node.species,
            });
        }

        debug!("{} died: {:?}", node.name, cause);
        self.events.push(SimulationEvent::NodeDied {
            node: id,
            species: node.species,
            pos: node.pos,
            cause,
        });
        true
    }

    /// Reports every overlapping pair in the current positions as a contact.
    ///
    /// Node pairs touch when their bodies overlap; a node touches a resource
    /// when its path since the last step passes within reach. Each unordered
    /// pair is reported once. Returns the number of contacts reported.
    pub fn detect_contacts(&mut self) -> usize {
        self.rebuild_grid();

        let mut found = BTreeSet::new();
        for node in self.nodes.values() {
            let me = EntityId::Node(node.id);
            let Some(cell) = self.grid.cell_of(me) else {
                continue;
            };

            for other in self.grid.neighbors_around(cell) {
                if other == me {
                    continue;
                }
                let touching = match other {
                    EntityId::Node(id) => self
                        .nodes
                        .get(&id)
                        .is_some_and(|o| distance(&node.pos, &o.pos) < node.radius + o.radius),
                    EntityId::Resource(id) => self.resources.get(id).is_some_and(|r| {
                        line_circle_distance(&node.prev_pos, &node.pos, &r.pos)
                            < node.radius + RESOURCE_RADIUS
                    }),
                };
                if touching {
                    found.insert(if me < other { (me, other) } else { (other, me) });
                }
            }
        }

        let count = found.len();
        self.contacts.extend(found);
        count
    }

    /// Overwrites a node's body state from an external physics engine.
    pub fn sync_body(&mut self, id: NodeId, pos: Array1<f32>, vel: Array1<f32>) -> bool {
        let Some(node) = self.nodes.get_mut(&id) else {
            return false;
        };
        node.prev_pos.assign(&node.pos);
        node.pos = pos;
        node.vel = vel;
        true
    }

    /// Read-only view for display.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            totals: self.totals(),
            nodes: self
                .nodes
                .values()
                .map(|n| NodeSnapshot::capture(n, &self.species))
                .collect(),
            species: self
                .species
                .iter_active()
                .map(SpeciesSnapshot::from)
                .collect(),
        }
    }

    /// World-level totals without per-entity detail.
    pub fn totals(&self) -> WorldTotals {
        WorldTotals {
            time: self.time,
            node_count: self.nodes.len(),
            active_species: self.species.active_count(),
            species_founded: self.species.total_founded(),
            resource_count: self.resources.len(),
        }
    }

    /// Clears the grid and repopulates it from current positions.
    pub fn rebuild_grid(&mut self) {
        let Self {
            grid,
            nodes,
            resources,
            ..
        } = self;
        grid.rebuild(
            nodes
                .values()
                .map(|n| n as &dyn Detectable)
                .chain(resources.iter().map(|r| r as &dyn Detectable)),
        );
    }

    fn world(&self) -> (f32, f32) {
        (self.params.world_width, self.params.world_height)
    }

    fn allocate_node_id(&mut self) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;
        id
    }

    fn insert_node(&mut self, node: Node, parent: Option<NodeId>) {
        self.grid.insert(EntityId::Node(node.id), &node.pos);
        self.events.push(SimulationEvent::NodeBorn {
            node: node.id,
            species: node.species,
            parent,
        });
        self.nodes.insert(node.id, node);
    }

    fn index_resource(&mut self, id: ResourceId) {
        if let Some(resource) = self.resources.get(id) {
            self.grid.insert(EntityId::Resource(id), &resource.pos);
            self.events.push(SimulationEvent::ResourceSpawned { resource: id });
        }
    }

    // Decisions read the grid snapshot only; writes happen afterwards.
    fn move_nodes(&mut self, dt: f32) {
        let world: &Ecosystem = self;
        let decisions: Vec<(NodeId, Decision)> = world
            .nodes
            .par_iter()
            .map(|(&id, n)| {
                let percept = node::perceive(n, &world.grid, world, world.params.cannibalism);
                (id, node::decide(n, percept, &world.params))
            })
            .collect();

        let nodes_move = self.params.nodes_move;
        for (id, decision) in decisions {
            let Some(n) = self.nodes.get_mut(&id) else {
                continue;
            };
            if nodes_move {
                n.apply_force(decision.force);
            }
            n.spend_resources(decision.cost);
        }

        if nodes_move {
            for n in self.nodes.values_mut() {
                n.integrate(dt);
            }
        }
    }

    fn consume_resource(&mut self, node_id: NodeId, resource_id: ResourceId) -> ContactOutcome {
        if !self.nodes.get(&node_id).is_some_and(|n| n.alive) {
            return ContactOutcome::Stale;
        }
        let Some(resource) = self.resources.consume(resource_id) else {
            return ContactOutcome::Stale;
        };
        self.grid.remove(EntityId::Resource(resource_id));

        let gained = self.nodes.get_mut(&node_id).map_or(0.0, |n| {
            let before = n.resources;
            n.add_resources(resource.value);
            n.resources - before
        });
        self.events.push(SimulationEvent::ResourceConsumed {
            node: node_id,
            resource: resource_id,
        });
        ContactOutcome::ResourceConsumed {
            node: node_id,
            resource: resource_id,
            gained,
        }
    }

    fn resolve_node_contact(&mut self, x: NodeId, y: NodeId) -> ContactOutcome {
        let (Some(a), Some(b)) = (self.nodes.get(&x), self.nodes.get(&y)) else {
            return ContactOutcome::Stale;
        };
        if !a.alive || !b.alive {
            return ContactOutcome::Stale;
        }
        let Some(verdict) = collision::resolve_pair(a, b, &self.params) else {
            return ContactOutcome::NoResolution;
        };

        let loser_yield = self
            .nodes
            .get(&verdict.loser)
            .map_or(0.0, Node::consumption_yield);
        let gained = self.nodes.get_mut(&verdict.consumer).map_or(0.0, |n| {
            let before = n.resources;
            n.add_resources(loser_yield);
            n.resources - before
        });

        self.events.push(SimulationEvent::NodeConsumed {
            consumer: verdict.consumer,
            loser: verdict.loser,
            gained,
        });
        self.kill(verdict.loser, DeathCause::Consumed);

        ContactOutcome::NodeConsumed {
            consumer: verdict.consumer,
            loser: verdict.loser,
            gained,
        }
    }

    // Children born during this pass start counting next tick.
    fn advance_node_timers(&mut self, dt: f32) {
        let ids: Vec<NodeId> = self.nodes.keys().copied().collect();
        for id in ids {
            let Some(n) = self.nodes.get_mut(&id) else {
                continue;
            };
            let fired = n.advance_timers(dt, &self.params);

            if fired.reproduce && self.params.asexual_reproduction {
                self.reproduce(id);
            }
            if fired.check_starvation
                && self.params.starvation
                && self.nodes.get(&id).is_some_and(Node::is_starving)
            {
                self.kill(id, DeathCause::Starved);
            }
        }
    }

    fn sweep_doomed(&mut self, dt: f32) {
        let interval = self.params.doomed_sweep_interval;
        self.doomed_timer += dt;
        if self.doomed_timer < interval {
            return;
        }
        self.doomed_timer = 0.0;

        let limit = self.params.max_distance_from_origin;
        let doomed: Vec<NodeId> = self
            .nodes
            .values()
            .filter(|n| distance_from_origin(&n.pos) > limit)
            .map(|n| n.id)
            .collect();
        if !doomed.is_empty() {
            debug!("doomed sweep removing {} nodes", doomed.len());
        }
        for id in doomed {
            self.kill(id, DeathCause::Doomed);
        }
    }

    fn rain_resources(&mut self, dt: f32) {
        let count = ResourceField::rain_count(self.params.resources_per_second, dt);
        for _ in 0..count {
            if self.spawn_resource(None).is_none() {
                break;
            }
        }
    }

    fn enforce_population_floor(&mut self) {
        if self.species.active_count() < self.params.min_active_species {
            let id = self.spawn_random_node();
            trace!("population floor spawned node {}", id.0);
        }
    }
}

impl DetectableLookup for Ecosystem {
    fn detectable(&self, id: EntityId) -> Option<&dyn Detectable> {
        match id {
            EntityId::Node(id) => self
                .nodes
                .get(&id)
                .filter(|n| n.alive)
                .map(|n| n as &dyn Detectable),
            EntityId::Resource(id) => self.resources.get(id).map(|r| r as &dyn Detectable),
        }
    }
}
