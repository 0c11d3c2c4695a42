//! Static resource points and the field that spawns and tracks them.

use ndarray::Array1;
use ndarray_rand::RandomExt;
use ndarray_rand::rand_distr::Uniform;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::detectable::{Detectable, EntityId, ResourceId, SpeciesId};

/// Body radius of every resource.
pub const RESOURCE_RADIUS: f32 = 4.0;

/// A consumable point that never moves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    /// Identifier within the field.
    pub id: ResourceId,
    /// Position in 2D space.
    pub pos: Array1<f32>,
    /// Resource units credited to the node that consumes it.
    pub value: f32,
}

impl Detectable for Resource {
    fn entity_id(&self) -> EntityId {
        EntityId::Resource(self.id)
    }

    fn pos(&self) -> &Array1<f32> {
        &self.pos
    }

    fn species(&self) -> Option<SpeciesId> {
        None
    }

    fn body_radius(&self) -> f32 {
        RESOURCE_RADIUS
    }
}

/// All live resources, keyed by id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceField {
    resources: BTreeMap<ResourceId, Resource>,
    next_id: u64,
}

/// Uniform random position inside a world centred on the origin.
pub fn random_position(world_width: f32, world_height: f32) -> Array1<f32> {
    let half = Array1::from_vec(vec![world_width / 2.0, world_height / 2.0]);
    Array1::random(2, Uniform::new_inclusive(-1.0, 1.0)) * half
}

impl ResourceField {
    /// Creates an empty field.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live resources.
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// True when no resources are live.
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Looks up a live resource.
    pub fn get(&self, id: ResourceId) -> Option<&Resource> {
        self.resources.get(&id)
    }

    /// Iterates live resources in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.resources.values()
    }

    /// Places a resource at `pos`, or at a random position when `None`.
    ///
    /// Returns `None` without spawning when `max_resources` is reached.
    pub fn spawn(
        &mut self,
        pos: Option<Array1<f32>>,
        value: f32,
        max_resources: usize,
        world: (f32, f32),
    ) -> Option<ResourceId> {
        if self.resources.len() >= max_resources {
            return None;
        }

        let id = ResourceId(self.next_id);
        self.next_id += 1;
        let pos = pos.unwrap_or_else(|| random_position(world.0, world.1));
        self.resources.insert(id, Resource { id, pos, value });
        Some(id)
    }

    /// Places up to `count` resources at random positions, stopping at the cap.
    pub fn seed(
        &mut self,
        count: usize,
        value: f32,
        max_resources: usize,
        world: (f32, f32),
    ) -> Vec<ResourceId> {
        (0..count)
            .map_while(|_| self.spawn(None, value, max_resources, world))
            .collect()
    }

    /// Removes a resource and hands it to the consumer.
    ///
    /// Consuming an id twice is a no-op that returns `None`.
    pub fn consume(&mut self, id: ResourceId) -> Option<Resource> {
        self.resources.remove(&id)
    }

    /// How many resources to rain in a step of `dt` seconds.
    ///
    /// The whole part of `rate * dt` always spawns; the fractional part is
    /// used as the probability of one more.
    pub fn rain_count(rate_per_second: f32, dt: f32) -> usize {
        let to_spawn = (rate_per_second * dt).max(0.0);
        let base = to_spawn.floor() as usize;
        let spawn_prob = to_spawn.fract();
        if spawn_prob > 0.0 && rand::rng().random::<f32>() < spawn_prob {
            base + 1
        } else {
            base
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORLD: (f32, f32) = (1000.0, 1000.0);

    #[test]
    fn spawn_respects_cap() {
        let mut field = ResourceField::new();
        assert!(field.spawn(None, 1.0, 2, WORLD).is_some());
        assert!(field.spawn(None, 1.0, 2, WORLD).is_some());
        assert!(field.spawn(None, 1.0, 2, WORLD).is_none());
        assert_eq!(field.len(), 2);
    }

    #[test]
    fn random_positions_stay_in_world() {
        for _ in 0..100 {
            let pos = random_position(WORLD.0, WORLD.1);
            assert!(pos[0].abs() <= 500.0 && pos[1].abs() <= 500.0);
        }
    }

    #[test]
    fn double_consume_is_a_noop() {
        let mut field = ResourceField::new();
        let id = field.spawn(None, 1.0, 10, WORLD).unwrap();
        assert!(field.consume(id).is_some());
        assert!(field.consume(id).is_none());
        assert!(field.is_empty());
    }

    #[test]
    fn seeding_stops_at_cap() {
        let mut field = ResourceField::new();
        let seeded = field.seed(50, 1.0, 30, WORLD);
        assert_eq!(seeded.len(), 30);
        assert_eq!(field.len(), 30);
    }

    #[test]
    fn whole_rain_is_deterministic() {
        assert_eq!(ResourceField::rain_count(20.0, 1.0), 20);
        assert_eq!(ResourceField::rain_count(0.0, 1.0), 0);
    }
}
