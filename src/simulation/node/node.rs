//! Node state, resource economy and lifecycle timers.

use ndarray::Array1;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::super::detectable::{Detectable, EntityId, NodeId, SpeciesId};
use super::super::genome::{Genome, Phenotype};
use super::super::params::Params;

/// Mass per unit of body area.
pub const BODY_DENSITY: f32 = 0.01;

/// Fraction of its radius a node pays, in resources, to reproduce.
pub const REPRODUCTION_COST: f32 = 0.25;

/// Fraction of the parent's radius a newborn receives as resources.
pub const CHILD_ENDOWMENT: f32 = 0.125;

/// Fraction of the loser's radius credited to the winner of a contact.
pub const CONSUMPTION_YIELD: f32 = 0.25;

/// Per-node countdowns, in seconds of simulated time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Timers {
    /// Time until the next reproduction attempt.
    pub reproduction: f32,
    /// Time accumulated towards the next age increment.
    pub age: f32,
    /// Time accumulated towards the next starvation check.
    pub starvation: f32,
    /// Time left before the node may consume again.
    pub prey_cooldown: f32,
}

/// What a node's timers asked for during one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimerEvents {
    /// The reproduction countdown expired.
    pub reproduce: bool,
    /// A starvation check is due.
    pub check_starvation: bool,
}

/// A living agent controlled by a small feed-forward network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier.
    pub id: NodeId,
    /// Display identifier, `S{species}-N{member}`.
    pub name: String,
    /// Species this node belongs to.
    pub species: SpeciesId,
    /// Body radius.
    pub radius: f32,
    /// Seconds between reproduction attempts.
    pub reproduction_rate: f32,
    /// Current resource level, at most `max_resources`.
    pub resources: f32,
    /// Resource capacity.
    pub max_resources: f32,
    /// Generation within its species, 1 for founders.
    pub generation: u32,
    /// Number of children produced.
    pub offspring: u32,
    /// Elapsed age intervals.
    pub age: u32,
    /// Cleared when the node dies; dead nodes are dropped from every index.
    pub alive: bool,
    /// Whether this node may consume others. Cleared for a while after reproducing.
    pub preying: bool,
    /// Controller parameters.
    pub genome: Genome,
    /// Position in 2D space.
    pub pos: Array1<f32>,
    /// Position before the last integration step.
    pub prev_pos: Array1<f32>,
    /// Velocity.
    pub vel: Array1<f32>,
    /// Force applied by the last movement update.
    pub last_force: Array1<f32>,
    /// Where the node was born; perceived when nothing else is.
    pub birth_pos: Array1<f32>,
    /// Lifecycle countdowns.
    pub timers: Timers,
}

/// Traits of a node with no parent.
///
/// Reproduction rate `10·U(0.8, 1.2)`, radius `10·U(0.5, 1.5)` and a random genome.
pub fn random_phenotype() -> Phenotype {
    let mut rng = rand::rng();
    Phenotype {
        genome: Genome::random(),
        radius: 10.0 * rng.random_range(0.5..=1.5),
        reproduction_rate: 10.0 * rng.random_range(0.8..=1.2),
    }
}

impl Node {
    /// Creates a node at `pos` with the given traits.
    ///
    /// Capacity equals the radius and the resource level is capped to it.
    pub fn new(
        id: NodeId,
        species: SpeciesId,
        name: String,
        phenotype: Phenotype,
        pos: Array1<f32>,
        resources: f32,
        generation: u32,
    ) -> Self {
        let Phenotype {
            genome,
            radius,
            reproduction_rate,
        } = phenotype;
        let max_resources = radius.max(0.0);

        Self {
            id,
            name,
            species,
            radius,
            reproduction_rate,
            resources: resources.clamp(0.0, max_resources),
            max_resources,
            generation,
            offspring: 0,
            age: 0,
            alive: true,
            preying: true,
            genome,
            prev_pos: pos.clone(),
            birth_pos: pos.clone(),
            pos,
            vel: Array1::zeros(2),
            last_force: Array1::zeros(2),
            timers: Timers {
                reproduction: reproduction_rate,
                ..Timers::default()
            },
        }
    }

    /// Mutated copy of the node's traits for a child.
    ///
    /// Radius scaled by `U(0.95, 1.05)`, reproduction rate by `U(0.8, 1.2)`.
    pub fn offspring_phenotype(&self) -> Phenotype {
        let mut rng = rand::rng();
        Phenotype {
            genome: self.genome.mutated(),
            radius: self.radius * rng.random_range(0.95..=1.05),
            reproduction_rate: self.reproduction_rate * rng.random_range(0.8..=1.2),
        }
    }

    /// Body mass derived from the radius.
    pub fn mass(&self) -> f32 {
        std::f32::consts::PI * self.radius * self.radius * BODY_DENSITY
    }

    /// Current speed.
    pub fn speed(&self) -> f32 {
        self.vel[0].hypot(self.vel[1])
    }

    /// Mass times speed, compared when greater energy consumes.
    pub fn kinetic_energy(&self) -> f32 {
        self.mass() * self.speed()
    }

    /// Resource level as a fraction of capacity; 1.0 when capacity is zero.
    pub fn fill_ratio(&self) -> f32 {
        if self.max_resources > 0.0 {
            self.resources / self.max_resources
        } else {
            1.0
        }
    }

    /// Adds resources up to the node's capacity.
    pub fn add_resources(&mut self, amount: f32) {
        self.resources = (self.resources + amount).min(self.max_resources);
    }

    /// Burns resources. The level may drop below zero until the next starvation check.
    pub fn spend_resources(&mut self, amount: f32) {
        self.resources -= amount;
    }

    /// Resources paid by the parent on reproduction.
    pub fn reproduction_cost(&self) -> f32 {
        self.radius * REPRODUCTION_COST
    }

    /// Resources a child starts with.
    pub fn child_endowment(&self) -> f32 {
        self.radius * CHILD_ENDOWMENT
    }

    /// True if the node holds enough resources to reproduce.
    pub fn can_reproduce(&self) -> bool {
        self.alive && self.resources >= self.reproduction_cost()
    }

    /// Resources credited to whoever consumes this node.
    pub fn consumption_yield(&self) -> f32 {
        self.radius * CONSUMPTION_YIELD
    }

    /// Rests the body and applies `force` as an impulse.
    pub fn apply_force(&mut self, force: Array1<f32>) {
        let mass = self.mass();
        self.vel = if mass > 0.0 {
            &force / mass
        } else {
            Array1::zeros(2)
        };
        self.last_force = force;
    }

    /// Moves the node along its velocity.
    ///
    /// # Arguments
    ///
    /// * `dt` - Time delta in seconds
    pub fn integrate(&mut self, dt: f32) {
        self.prev_pos.assign(&self.pos);
        self.pos.scaled_add(dt, &self.vel);
    }

    /// Clears the preying flag for `duration` seconds.
    pub fn start_prey_cooldown(&mut self, duration: f32) {
        if duration > 0.0 {
            self.preying = false;
            self.timers.prey_cooldown = duration;
        }
    }

    /// Advances every countdown by `dt` and reports which ones fired.
    pub fn advance_timers(&mut self, dt: f32, params: &Params) -> TimerEvents {
        let mut events = TimerEvents::default();

        if self.reproduction_rate > 0.0 {
            self.timers.reproduction -= dt;
            if self.timers.reproduction <= 0.0 {
                events.reproduce = true;
                let rest = self.timers.reproduction.rem_euclid(self.reproduction_rate);
                self.timers.reproduction = if rest > 0.0 { rest } else { self.reproduction_rate };
            }
        }

        let (years, rest) = elapsed_intervals(self.timers.age + dt, params.age_interval);
        self.timers.age = rest;
        self.age = self.age.saturating_add(years as u32);

        let (checks, rest) =
            elapsed_intervals(self.timers.starvation + dt, params.starvation_check_interval);
        self.timers.starvation = rest;
        events.check_starvation = checks > 0;

        if !self.preying {
            self.timers.prey_cooldown -= dt;
            if self.timers.prey_cooldown <= 0.0 {
                self.timers.prey_cooldown = 0.0;
                self.preying = true;
            }
        }

        events
    }

    /// True if the node has run out of resources.
    pub fn is_starving(&self) -> bool {
        self.resources <= 0.0
    }
}

/// Splits `elapsed` seconds into whole `interval`s and the remainder.
///
/// A non-positive interval never elapses.
pub fn elapsed_intervals(elapsed: f32, interval: f32) -> (u64, f32) {
    if !elapsed.is_finite() {
        return (0, 0.0);
    }
    if interval <= 0.0 {
        return (0, elapsed);
    }
    let whole = (elapsed / interval).floor().max(0.0);
    (whole as u64, elapsed.rem_euclid(interval))
}

impl Detectable for Node {
    fn entity_id(&self) -> EntityId {
        EntityId::Node(self.id)
    }

    fn pos(&self) -> &Array1<f32> {
        &self.pos
    }

    fn species(&self) -> Option<SpeciesId> {
        Some(self.species)
    }

    fn body_radius(&self) -> f32 {
        self.radius
    }
}
