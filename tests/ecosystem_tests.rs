#![allow(missing_docs)]
#![allow(clippy::float_cmp)]

use ndarray::array;
use nodus::simulation::collision::ContactOutcome;
use nodus::simulation::detectable::{EntityId, NodeId};
use nodus::simulation::ecosystem::Ecosystem;
use nodus::simulation::events::{DeathCause, SimulationEvent};
use nodus::simulation::genome::{Genome, Phenotype};
use nodus::simulation::params::Params;

fn create_test_params() -> Params {
    Params {
        world_width: 1000.0,
        world_height: 1000.0,
        starting_resources: 0,
        resources_per_second: 0.0,
        min_active_species: 0,
        nodes_move: false,
        ..Params::default()
    }
}

fn founder(ecosystem: &mut Ecosystem, x: f32, y: f32, radius: f32, resources: f32) -> NodeId {
    let phenotype = Phenotype {
        genome: Genome::random(),
        radius,
        reproduction_rate: 10.0,
    };
    ecosystem.spawn_founder(phenotype, array![x, y], resources)
}

fn assert_registry_integrity(ecosystem: &Ecosystem) {
    let registry = ecosystem.species();
    assert_eq!(registry.active_count(), registry.iter_active().count());
    for species in registry.iter_active() {
        assert!(species.member_count() > 0, "{} has no members", species.id);
        for member in &species.members {
            assert_eq!(ecosystem.species_of(*member), Some(species.id));
        }
    }
    for node in ecosystem.nodes() {
        assert!(node.alive);
        assert!(node.resources <= node.max_resources + 1e-4);
        let species = registry.active(node.species).unwrap();
        assert!(species.members.contains(&node.id));
        assert!(ecosystem.grid().contains(EntityId::Node(node.id)));
    }
}

#[test]
fn test_ecosystem_creation() {
    let params = Params {
        starting_resources: 50,
        max_resources: 30,
        ..create_test_params()
    };
    let ecosystem = Ecosystem::new(params).unwrap();

    assert_eq!(ecosystem.time(), 0.0);
    assert_eq!(ecosystem.node_count(), 0);
    assert_eq!(ecosystem.resources().len(), 30);
    assert_eq!(ecosystem.grid().indexed_len(), 30);
}

#[test]
fn test_invalid_params_are_rejected() {
    let params = Params {
        speed_multiplier: 5.0,
        ..create_test_params()
    };
    assert!(Ecosystem::new(params).is_err());

    let mut ecosystem = Ecosystem::new(create_test_params()).unwrap();
    let bad = Params {
        world_width: 10.0,
        ..create_test_params()
    };
    assert!(ecosystem.set_params(bad).is_err());
    assert_eq!(ecosystem.params().world_width, 1000.0);
}

#[test]
fn test_simulation_tick_advances_time() {
    let mut ecosystem = Ecosystem::new(create_test_params()).unwrap();
    founder(&mut ecosystem, 0.0, 0.0, 10.0, 5.0);

    ecosystem.tick(0.25);
    assert!((ecosystem.time() - 0.25).abs() < 1e-6);

    ecosystem.tick(-1.0);
    ecosystem.tick(f32::NAN);
    assert!((ecosystem.time() - 0.25).abs() < 1e-6);
}

#[test]
fn test_tiny_reproduction_rate_still_ticks() {
    let mut ecosystem = Ecosystem::new(create_test_params()).unwrap();
    let phenotype = Phenotype {
        genome: Genome::random(),
        radius: 10.0,
        reproduction_rate: 1e-9,
    };
    let parent = ecosystem.spawn_founder(phenotype, array![0.0, 0.0], 10.0);

    for _ in 0..3 {
        ecosystem.tick(0.25);
    }

    assert!((ecosystem.time() - 0.75).abs() < 1e-6);
    assert!(ecosystem.node(parent).unwrap().offspring >= 1);
    assert_registry_integrity(&ecosystem);
}

#[test]
fn test_vanishing_age_interval_is_rejected() {
    let params = Params {
        age_interval: 1e-9,
        ..create_test_params()
    };
    assert!(Ecosystem::new(params).is_err());

    let mut ecosystem = Ecosystem::new(create_test_params()).unwrap();
    let too_short = Params {
        age_interval: 1e-9,
        ..create_test_params()
    };
    assert!(ecosystem.set_params(too_short).is_err());
    assert_eq!(ecosystem.params().age_interval, 1.0);
}

#[test]
fn test_reproduction_end_to_end() {
    let mut ecosystem = Ecosystem::new(create_test_params()).unwrap();
    let parent = founder(&mut ecosystem, 0.0, 0.0, 10.0, 2.5);
    let parent_species = ecosystem.species_of(parent).unwrap();
    ecosystem.drain_events();

    let child = ecosystem.reproduce(parent).unwrap();

    assert_eq!(ecosystem.node_count(), 2);
    let parent_node = ecosystem.node(parent).unwrap();
    assert!(parent_node.resources.abs() < 1e-6);
    assert_eq!(parent_node.offspring, 1);
    assert!(!parent_node.preying);

    let child_node = ecosystem.node(child).unwrap();
    assert!((child_node.resources - 1.25).abs() < 1e-6);
    if child_node.species == parent_species {
        assert_eq!(child_node.generation, 2);
        assert_eq!(child_node.name, format!("S{}-N2", parent_species.0));
    } else {
        assert_eq!(child_node.generation, 1);
        let species = ecosystem.species().active(child_node.species).unwrap();
        assert_eq!(species.ancestors, vec![parent_species]);
        assert_eq!(
            ecosystem.species().active(parent_species).unwrap().descendants,
            vec![child_node.species]
        );
        assert_eq!(child_node.name, format!("S{}-N1", child_node.species.0));
    }

    let events = ecosystem.drain_events();
    assert!(events.iter().any(|e| matches!(
        e,
        SimulationEvent::NodeBorn { node, parent: Some(p), .. } if *node == child && *p == parent
    )));

    // too poor to go again
    assert_eq!(ecosystem.reproduce(parent), None);
    assert_eq!(ecosystem.node_count(), 2);
}

#[test]
fn test_reproduction_without_speciation_joins_parent() {
    let params = Params {
        speciation: false,
        ..create_test_params()
    };
    let mut ecosystem = Ecosystem::new(params).unwrap();
    let parent = founder(&mut ecosystem, 0.0, 0.0, 10.0, 10.0);
    let species = ecosystem.species_of(parent).unwrap();

    let first = ecosystem.reproduce(parent).unwrap();
    let second = ecosystem.reproduce(parent).unwrap();

    assert_eq!(ecosystem.species_of(first), Some(species));
    assert_eq!(ecosystem.species_of(second), Some(species));
    assert_eq!(ecosystem.node(second).unwrap().name, format!("S{}-N3", species.0));
    assert_eq!(ecosystem.species().active_count(), 1);
    assert_eq!(
        ecosystem.species().members_sorted_by_id(species),
        vec![parent, first, second]
    );
}

#[test]
fn test_larger_node_consumes_smaller() {
    let mut ecosystem = Ecosystem::new(create_test_params()).unwrap();
    let small = founder(&mut ecosystem, 0.0, 0.0, 10.0, 2.5);
    let large = founder(&mut ecosystem, 5.0, 0.0, 15.0, 5.0);
    let small_species = ecosystem.species_of(small).unwrap();
    ecosystem.drain_events();

    ecosystem.report_contact(small, large);
    let outcomes = ecosystem.resolve_contacts();

    assert_eq!(
        outcomes,
        vec![ContactOutcome::NodeConsumed {
            consumer: large,
            loser: small,
            gained: 2.5
        }]
    );
    assert!((ecosystem.node(large).unwrap().resources - 7.5).abs() < 1e-6);
    assert!(ecosystem.node(small).is_none());
    assert!(!ecosystem.grid().contains(EntityId::Node(small)));
    assert!(ecosystem.species().active(small_species).is_none());
    assert!(ecosystem.species().get(small_species).unwrap().extinct);
    assert_eq!(ecosystem.species().active_count(), 1);

    let events = ecosystem.drain_events();
    assert!(events.contains(&SimulationEvent::SpeciesExtinct {
        species: small_species
    }));
    assert!(events.iter().any(|e| matches!(
        e,
        SimulationEvent::NodeDied { node, cause: DeathCause::Consumed, .. } if *node == small
    )));
}

#[test]
fn test_consumption_gain_is_capped() {
    let mut ecosystem = Ecosystem::new(create_test_params()).unwrap();
    let small = founder(&mut ecosystem, 0.0, 0.0, 10.0, 2.5);
    let large = founder(&mut ecosystem, 5.0, 0.0, 15.0, 14.0);

    let outcome = ecosystem.resolve_contact(small.into(), large.into());
    assert_eq!(
        outcome,
        ContactOutcome::NodeConsumed {
            consumer: large,
            loser: small,
            gained: 1.0
        }
    );
    assert_eq!(ecosystem.node(large).unwrap().resources, 15.0);
}

#[test]
fn test_stale_contacts_are_absorbed() {
    let mut ecosystem = Ecosystem::new(create_test_params()).unwrap();
    let a = founder(&mut ecosystem, 0.0, 0.0, 10.0, 2.5);
    let b = founder(&mut ecosystem, 5.0, 0.0, 15.0, 2.5);
    let c = founder(&mut ecosystem, -5.0, 0.0, 20.0, 2.5);

    // b eats a, then c's contact with a must see a as gone
    ecosystem.report_contact(a, b);
    ecosystem.report_contact(a, c);
    ecosystem.report_contact(NodeId(999), b);
    ecosystem.report_contact(b, b);
    let outcomes = ecosystem.resolve_contacts();

    assert!(matches!(outcomes[0], ContactOutcome::NodeConsumed { .. }));
    assert_eq!(&outcomes[1..], &[ContactOutcome::Stale; 3]);
    assert!(ecosystem.pending_contacts().is_empty());

    assert!(ecosystem.kill(b, DeathCause::Starved));
    assert!(!ecosystem.kill(b, DeathCause::Starved));
    assert_registry_integrity(&ecosystem);
}

#[test]
fn test_resource_contact_credits_one_unit_once() {
    let mut ecosystem = Ecosystem::new(create_test_params()).unwrap();
    let node = founder(&mut ecosystem, 0.0, 0.0, 10.0, 2.5);
    let resource = ecosystem.spawn_resource(Some(array![3.0, 0.0])).unwrap();

    ecosystem.report_contact(resource, node);
    ecosystem.report_contact(node, resource);
    let outcomes = ecosystem.resolve_contacts();

    assert_eq!(
        outcomes[0],
        ContactOutcome::ResourceConsumed {
            node,
            resource,
            gained: 1.0
        }
    );
    assert_eq!(outcomes[1], ContactOutcome::Stale);
    assert!((ecosystem.node(node).unwrap().resources - 3.5).abs() < 1e-6);
    assert!(ecosystem.resources().is_empty());
    assert!(!ecosystem.grid().contains(EntityId::Resource(resource)));
}

#[test]
fn test_detect_contacts_reports_each_pair_once() {
    let mut ecosystem = Ecosystem::new(create_test_params()).unwrap();
    let a = founder(&mut ecosystem, 0.0, 0.0, 10.0, 2.5);
    let b = founder(&mut ecosystem, 15.0, 0.0, 10.0, 2.5);
    founder(&mut ecosystem, 300.0, 0.0, 10.0, 2.5);
    let resource = ecosystem.spawn_resource(Some(array![0.0, 12.0])).unwrap();

    let count = ecosystem.detect_contacts();
    assert_eq!(count, 2);

    let pending = ecosystem.pending_contacts();
    assert!(pending.contains(&(EntityId::Node(a), EntityId::Node(b))));
    assert!(pending.contains(&(EntityId::Node(a), EntityId::Resource(resource))));
}

#[test]
fn test_starvation_kills_after_check_interval() {
    let mut ecosystem = Ecosystem::new(create_test_params()).unwrap();
    let node = founder(&mut ecosystem, 0.0, 0.0, 10.0, 0.0);

    for _ in 0..7 {
        ecosystem.tick(0.25);
    }
    assert!(ecosystem.node(node).is_some());

    ecosystem.tick(0.25);
    assert!(ecosystem.node(node).is_none());
    assert_eq!(ecosystem.species().active_count(), 0);
}

#[test]
fn test_doomed_sweep_culls_distant_nodes() {
    let params = Params {
        max_distance_from_origin: 100.0,
        doomed_sweep_interval: 1.0,
        starvation: false,
        ..create_test_params()
    };
    let mut ecosystem = Ecosystem::new(params).unwrap();
    let far = founder(&mut ecosystem, 400.0, 0.0, 10.0, 5.0);
    let near = founder(&mut ecosystem, 50.0, 0.0, 10.0, 5.0);
    ecosystem.drain_events();

    for _ in 0..3 {
        ecosystem.tick(0.25);
    }
    assert!(ecosystem.node(far).is_some());

    ecosystem.tick(0.25);
    assert!(ecosystem.node(far).is_none());
    assert!(ecosystem.node(near).is_some());
    assert!(ecosystem.drain_events().iter().any(|e| matches!(
        e,
        SimulationEvent::NodeDied { cause: DeathCause::Doomed, .. }
    )));
}

#[test]
fn test_population_floor_and_resource_rain() {
    let params = Params {
        min_active_species: 3,
        resources_per_second: 8.0,
        max_resources: 5,
        ..create_test_params()
    };
    let mut ecosystem = Ecosystem::new(params).unwrap();

    for _ in 0..3 {
        ecosystem.tick(0.25);
    }
    assert_eq!(ecosystem.species().active_count(), 3);
    assert_eq!(ecosystem.node_count(), 3);
    assert_eq!(ecosystem.resources().len(), 5);

    ecosystem.tick(0.25);
    assert_eq!(ecosystem.node_count(), 3);
    assert_eq!(ecosystem.resources().len(), 5);
}

#[test]
fn test_world_resize_rebuilds_grid() {
    let mut ecosystem = Ecosystem::new(create_test_params()).unwrap();
    let node = founder(&mut ecosystem, 700.0, 0.0, 10.0, 2.5);
    assert_eq!(ecosystem.grid().indexed_len(), 0);

    let wider = Params {
        world_width: 2000.0,
        ..create_test_params()
    };
    ecosystem.set_params(wider).unwrap();
    assert_eq!(ecosystem.grid().cols(), 20);
    assert_eq!(ecosystem.grid().indexed_len(), 1);
    assert!(ecosystem.grid().contains(EntityId::Node(node)));
}

#[test]
fn test_registry_integrity_over_random_runs() {
    let params = Params {
        world_width: 800.0,
        world_height: 800.0,
        starting_resources: 200,
        max_resources: 400,
        resources_per_second: 40.0,
        min_active_species: 6,
        nodes_move: true,
        max_distance_from_origin: 600.0,
        doomed_sweep_interval: 2.0,
        ..create_test_params()
    };
    let mut ecosystem = Ecosystem::new(params).unwrap();

    for _ in 0..400 {
        ecosystem.detect_contacts();
        ecosystem.tick(0.25);
        assert_registry_integrity(&ecosystem);

        for event in ecosystem.drain_events() {
            if let SimulationEvent::NodeDied { node, species, .. } = event {
                assert!(ecosystem.node(node).is_none());
                assert!(!ecosystem.grid().contains(EntityId::Node(node)));
                assert!(
                    ecosystem
                        .species()
                        .get(species)
                        .is_none_or(|s| !s.members.contains(&node))
                );
            }
        }
    }
}

#[test]
fn test_snapshot_serializes() {
    let mut ecosystem = Ecosystem::new(create_test_params()).unwrap();
    founder(&mut ecosystem, 0.0, 0.0, 10.0, 2.5);
    founder(&mut ecosystem, 100.0, 0.0, 12.0, 3.0);

    let snapshot = ecosystem.snapshot();
    assert_eq!(snapshot.nodes.len(), 2);
    assert_eq!(snapshot.species.len(), 2);
    assert_eq!(snapshot.totals.node_count, 2);
    assert_eq!(snapshot.nodes[1].position, [100.0, 0.0]);
    assert_eq!(snapshot.nodes[0].capacity, 10.0);

    let json = snapshot.to_json().unwrap();
    assert!(json.contains("\"member_count\": 1"));
}
