//! Contact policy: decides who, if anyone, consumes whom.
//!
//! The functions here only inspect state. Applying a verdict (crediting
//! resources, killing the loser) is done by the ecosystem, which re-checks
//! liveness before acting on every reported pair.

use std::cmp::Ordering;

use super::detectable::{EntityId, NodeId, ResourceId};
use super::node::Node;
use super::params::Params;

/// Which side of a node contact consumes the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    /// Node that gains resources.
    pub consumer: NodeId,
    /// Node that dies.
    pub loser: NodeId,
}

/// Result of resolving one reported contact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContactOutcome {
    /// A participant was missing or dead, or the pair was not a valid contact.
    Stale,
    /// Both sides were alive but the policy chose no winner.
    NoResolution,
    /// A node consumed a resource.
    ResourceConsumed {
        /// The node that touched the resource.
        node: NodeId,
        /// The resource, now removed.
        resource: ResourceId,
        /// Resources actually credited after capping.
        gained: f32,
    },
    /// A node consumed another node.
    NodeConsumed {
        /// Winner of the contact.
        consumer: NodeId,
        /// Node that was killed.
        loser: NodeId,
        /// Resources actually credited after capping.
        gained: f32,
    },
}

/// Classification of a reported pair before any state is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactPair {
    /// Two distinct nodes.
    Nodes(NodeId, NodeId),
    /// A node and a resource, in that order.
    NodeResource(NodeId, ResourceId),
    /// Two resources, or a node touching itself.
    Invalid,
}

/// Normalises a reported pair so the node always comes first.
pub fn classify(a: EntityId, b: EntityId) -> ContactPair {
    match (a, b) {
        (EntityId::Node(x), EntityId::Node(y)) if x != y => ContactPair::Nodes(x, y),
        (EntityId::Node(n), EntityId::Resource(r)) | (EntityId::Resource(r), EntityId::Node(n)) => {
            ContactPair::NodeResource(n, r)
        }
        _ => ContactPair::Invalid,
    }
}

/// Metric compared on node contact: kinetic energy or body radius.
pub fn contact_metric(node: &Node, params: &Params) -> f32 {
    if params.greater_energy_consumes {
        node.kinetic_energy()
    } else {
        node.radius
    }
}

/// Applies the consumption rules to two living nodes.
///
/// Returns `None` when node consumption is disabled, when both belong to the
/// same species without cannibalism, when the metrics tie, or when the node
/// designated to consume is not currently preying.
pub fn resolve_pair(a: &Node, b: &Node, params: &Params) -> Option<Verdict> {
    if !params.nodes_are_consumed || !a.alive || !b.alive {
        return None;
    }
    if a.species == b.species && !params.cannibalism {
        return None;
    }

    let (larger, smaller) = match contact_metric(a, params).partial_cmp(&contact_metric(b, params)) {
        Some(Ordering::Greater) => (a, b),
        Some(Ordering::Less) => (b, a),
        _ => return None,
    };

    let (consumer, loser) = if params.smaller_consumes {
        (smaller, larger)
    } else {
        (larger, smaller)
    };

    consumer.preying.then_some(Verdict {
        consumer: consumer.id,
        loser: loser.id,
    })
}
