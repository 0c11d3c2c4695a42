//! Species registry: lineage, membership and extinction bookkeeping.
//!
//! A species stays in the active registry exactly as long as it has at least
//! one living member. When the last member is removed the species is retired
//! to the extinct archive and the active counter is decremented; retirement
//! is never undone.

use log::info;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::detectable::{NodeId, SpeciesId};
use super::genome::Phenotype;
use super::naming::{self, Color, ROOT_WORD};
use super::node::elapsed_intervals;

/// A taxon of nodes descended from a common founder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Species {
    /// Identifier, assigned in founding order.
    pub id: SpeciesId,
    /// Word inherited from the parent species (`nodus` for roots).
    pub parent_word: String,
    /// Word coined for this species.
    pub word: String,
    /// Display colour shared by all members.
    pub color: Color,
    /// Traits of the founder; offspring are compared against these.
    pub representative: Phenotype,
    /// Living members.
    pub members: BTreeSet<NodeId>,
    /// Monotonic count of members ever added, used for display names.
    pub member_counter: u64,
    /// Ancestor species, root first, direct parent last.
    pub ancestors: Vec<SpeciesId>,
    /// Species founded by offspring of this one.
    pub descendants: Vec<SpeciesId>,
    /// Age in elapsed age intervals since founding.
    pub age: u64,
    /// Set once the last member is gone.
    pub extinct: bool,
}

impl Species {
    /// Display name: parent word followed by the species' own word.
    pub fn name(&self) -> String {
        format!("{} {}", self.parent_word, self.word)
    }

    /// Number of living members.
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Direct parent species, if any.
    pub fn parent(&self) -> Option<SpeciesId> {
        self.ancestors.last().copied()
    }

    /// Display identifier for the member with the given counter value.
    pub fn member_label(&self, counter: u64) -> String {
        format!("S{}-N{}", self.id.0, counter)
    }
}

/// Outcome of removing a node from its species.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// The node was not a member of an active species.
    NotMember,
    /// The node was removed and the species still has members.
    Removed,
    /// The node was the last member; the species is now extinct.
    Retired,
}

/// Owner of every species, active and extinct.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpeciesRegistry {
    active: BTreeMap<SpeciesId, Species>,
    extinct: BTreeMap<SpeciesId, Species>,
    next_id: u64,
    active_count: usize,
    age_elapsed: f32,
}

impl SpeciesRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Founds a species with no ancestor whose only member is `founder`.
    pub fn found_root(&mut self, representative: Phenotype, founder: NodeId) -> SpeciesId {
        let species = self.new_species(
            ROOT_WORD.to_string(),
            Color::random(),
            representative,
            founder,
            Vec::new(),
        );
        let id = species.id;
        info!("species {} '{}' founded", id, species.name());
        self.insert(species);
        id
    }

    /// Founds a child species of `parent` whose only member is `founder`.
    ///
    /// Returns `None` when `parent` is not active.
    pub fn found_child(
        &mut self,
        parent: SpeciesId,
        representative: Phenotype,
        founder: NodeId,
    ) -> Option<SpeciesId> {
        let (parent_word, color, mut ancestors) = {
            let parent = self.active.get(&parent)?;
            (parent.word.clone(), parent.color.inherit(), parent.ancestors.clone())
        };
        ancestors.push(parent);

        let species = self.new_species(parent_word, color, representative, founder, ancestors);
        let id = species.id;
        info!(
            "speciation: {} '{}' branched from {}",
            id,
            species.name(),
            parent
        );
        self.insert(species);
        if let Some(parent) = self.active.get_mut(&parent) {
            parent.descendants.push(id);
        }
        Some(id)
    }

    /// Adds `node` to an active species and returns its member counter value.
    pub fn join(&mut self, species: SpeciesId, node: NodeId) -> Option<u64> {
        let species = self.active.get_mut(&species)?;
        species.member_counter += 1;
        species.members.insert(node);
        Some(species.member_counter)
    }

    /// Removes `node` from its species, retiring the species if it empties.
    pub fn remove_member(&mut self, species: SpeciesId, node: NodeId) -> Removal {
        let Some(entry) = self.active.get_mut(&species) else {
            return Removal::NotMember;
        };
        if !entry.members.remove(&node) {
            return Removal::NotMember;
        }
        if !entry.members.is_empty() {
            return Removal::Removed;
        }

        if let Some(mut retired) = self.active.remove(&species) {
            retired.extinct = true;
            self.active_count -= 1;
            info!(
                "species {} '{}' extinct after {} members",
                retired.id,
                retired.name(),
                retired.member_counter
            );
            self.extinct.insert(species, retired);
        }
        Removal::Retired
    }

    /// Advances species ages by `dt` seconds; one year per `interval`.
    pub fn age_by(&mut self, dt: f32, interval: f32) {
        let (years, rest) = elapsed_intervals(self.age_elapsed + dt, interval);
        self.age_elapsed = rest;
        if years > 0 {
            for species in self.active.values_mut() {
                species.age = species.age.saturating_add(years);
            }
        }
    }

    /// Looks up an active species.
    pub fn active(&self, id: SpeciesId) -> Option<&Species> {
        self.active.get(&id)
    }

    /// Looks up a species whether active or extinct.
    pub fn get(&self, id: SpeciesId) -> Option<&Species> {
        self.active.get(&id).or_else(|| self.extinct.get(&id))
    }

    /// Number of active species.
    pub fn active_count(&self) -> usize {
        self.active_count
    }

    /// Number of species that have ever existed.
    pub fn total_founded(&self) -> u64 {
        self.next_id
    }

    /// Active species in id order.
    pub fn iter_active(&self) -> impl Iterator<Item = &Species> {
        self.active.values()
    }

    /// Extinct species in id order.
    pub fn iter_extinct(&self) -> impl Iterator<Item = &Species> {
        self.extinct.values()
    }

    /// Living members of an active species in id order.
    pub fn members_sorted_by_id(&self, id: SpeciesId) -> Vec<NodeId> {
        self.active
            .get(&id)
            .map(|s| s.members.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Member count per active species, in id order.
    pub fn frequency(&self) -> Vec<(SpeciesId, usize)> {
        self.active
            .values()
            .map(|s| (s.id, s.member_count()))
            .collect()
    }

    fn new_species(
        &mut self,
        parent_word: String,
        color: Color,
        representative: Phenotype,
        founder: NodeId,
        ancestors: Vec<SpeciesId>,
    ) -> Species {
        let id = SpeciesId(self.next_id);
        self.next_id += 1;
        Species {
            id,
            parent_word,
            word: naming::random_word(),
            color,
            representative,
            members: BTreeSet::from([founder]),
            member_counter: 1,
            ancestors,
            descendants: Vec::new(),
            age: 0,
            extinct: false,
        }
    }

    fn insert(&mut self, species: Species) {
        self.active.insert(species.id, species);
        self.active_count += 1;
    }
}
