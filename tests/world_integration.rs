use std::collections::{HashMap, HashSet};

use rotifera::constants::{FIELD_MAX, FIELD_MIN, FREQ_MAX_HZ, FREQ_MIN_HZ, PARASITE_COUNT};
use rotifera::parasite::ParasiteState;
use rotifera::{
    AgentId, CaretakerRecipe, ControlParams, LifeState, NutrientKind, World, WorldConfig,
};

const DT: f32 = 0.016;

fn seeded_world(seed: u64) -> World {
    let mut world = World::with_seed(WorldConfig::default(), seed);
    world.init(Box::new(ControlParams::default));
    world
}

// Scenario A: the population stays between the floor and the cap.
#[test]
fn population_stays_within_floor_and_cap() {
    let mut world = seeded_world(0xB10B);
    assert_eq!(world.living_count(), 36);
    for _ in 0..1000 {
        world.step(DT);
        assert!(world.living_count() <= WorldConfig::default().population_cap);
    }
    let living = world.living_count();
    assert!(
        living >= WorldConfig::default().population_floor,
        "living population {living} fell below the floor"
    );
    assert!(living <= WorldConfig::default().population_cap);
}

#[test]
fn agents_and_parasites_never_leave_the_field() {
    let mut world = seeded_world(2);
    for _ in 0..600 {
        world.step(DT);
        for agent in &world.agents {
            assert!((FIELD_MIN..=FIELD_MAX).contains(&agent.pos.x));
            assert!((FIELD_MIN..=FIELD_MAX).contains(&agent.pos.y));
        }
        for parasite in &world.parasites {
            assert!((0.0..=1.0).contains(&parasite.pos.x));
            assert!((0.0..=1.0).contains(&parasite.pos.y));
        }
    }
}

#[test]
fn agent_invariants_hold_and_life_states_only_advance() {
    let mut world = seeded_world(3);
    let mut last_state: HashMap<AgentId, LifeState> = HashMap::new();
    for _ in 0..800 {
        world.step(DT);
        for agent in &world.agents {
            assert!((0.2..=1.0).contains(&agent.maturity), "maturity {}", agent.maturity);
            assert!((0.0..=2.0).contains(&agent.energy), "energy {}", agent.energy);
            if let Some(&previous) = last_state.get(&agent.id) {
                assert!(
                    agent.state >= previous,
                    "agent {} regressed {previous:?} -> {:?}",
                    agent.id,
                    agent.state
                );
            }
            last_state.insert(agent.id, agent.state);
        }
    }
}

// The set of occupied agents maps one-to-one onto latched parasites' hosts.
#[test]
fn occupied_flags_match_latched_hosts_exactly() {
    let mut world = seeded_world(4);
    for _ in 0..800 {
        world.step(DT);
        let mut hosts: Vec<AgentId> = Vec::new();
        for parasite in &world.parasites {
            if parasite.state == ParasiteState::Latched {
                hosts.push(parasite.host.expect("latched parasite must hold a host"));
            } else {
                assert_eq!(parasite.host, None);
            }
        }
        let unique: HashSet<AgentId> = hosts.iter().copied().collect();
        assert_eq!(unique.len(), hosts.len(), "two parasites share one host");

        let occupied: HashSet<AgentId> = world
            .agents
            .iter()
            .filter(|a| a.occupied)
            .map(|a| a.id)
            .collect();
        assert_eq!(occupied, unique);
    }
}

#[test]
fn audio_outputs_are_idempotent_and_bounded() {
    let mut world = seeded_world(5);
    for _ in 0..300 {
        world.step(DT);
        let first = world.audio_outputs();
        let second = world.audio_outputs();
        assert_eq!(first, second);
        for i in 0..PARASITE_COUNT {
            assert!((0.0..=1.0).contains(&first.amp[i]));
            assert!((FREQ_MIN_HZ..=FREQ_MAX_HZ).contains(&first.freq[i]));
            assert!(first.phase[i].is_finite());
        }
    }
}

#[test]
fn hunting_parasites_emit_silence() {
    let mut world = seeded_world(6);
    world.agents.clear();
    world.step(DT);
    for parasite in &world.parasites {
        assert_eq!(parasite.state, ParasiteState::Hunting);
    }
    let out = world.audio_outputs();
    assert_eq!(out.amp, [0.0; PARASITE_COUNT]);
}

// Scenario D: a host that dies mid-tick silences its channel that tick.
#[test]
fn parasite_detaches_and_mutes_when_host_collapses() {
    let mut world = seeded_world(7);

    let host_id = world.agents[0].id;
    let host_pos = world.agents[0].pos;
    world.agents[0].occupied = true;
    world.parasites[0].state = ParasiteState::Latched;
    world.parasites[0].host = Some(host_id);
    world.parasites[0].pos = host_pos;

    world.agents[0].energy = 0.0;
    world.agents[0].health = 0.0;

    world.step(DT);

    assert_eq!(world.parasites[0].state, ParasiteState::Hunting);
    assert_eq!(world.parasites[0].host, None);
    if let Some(host) = world.agents.iter().find(|a| a.id == host_id) {
        assert_eq!(host.state, LifeState::Dying);
        assert!(!host.occupied);
    }
    assert_eq!(world.audio_outputs().amp[0], 0.0);
}

// Scenario E: the caretaker's empirical kind distribution follows its diet.
#[test]
fn caretaker_diet_weights_shape_spawn_distribution() {
    let mut world = World::with_seed(
        WorldConfig {
            population_floor: 0,
            ..WorldConfig::default()
        },
        8,
    );
    world.init(Box::new(ControlParams::default));
    world.agents.clear();
    world.set_caretaker(CaretakerRecipe::Bloom, true, 5.0);

    // ~100 scheduler spawns: interval is 4.5s / 5.0 = 0.9s
    let ticks = (100.0 * 0.9 / DT) as usize;
    for _ in 0..ticks {
        world.step(DT);
    }

    let mut counts: HashMap<NutrientKind, usize> = HashMap::new();
    for blob in &world.blobs {
        *counts.entry(blob.kind).or_insert(0) += 1;
    }
    let total: usize = counts.values().sum();
    assert!(total >= 90, "expected ~100 spawns, got {total}");

    let sugar = counts.get(&NutrientKind::Sugar).copied().unwrap_or(0);
    let water = counts.get(&NutrientKind::Water).copied().unwrap_or(0);
    // Bloom: sugar 2.0, water 1.0, all other kinds at the 0.05 floor
    assert!(sugar > water, "sugar {sugar} <= water {water}");
    assert!(
        (sugar + water) as f32 >= total as f32 * 0.8,
        "diet kinds should dominate: sugar {sugar} + water {water} of {total}"
    );
    for kind in [NutrientKind::Iron, NutrientKind::Salt, NutrientKind::Sulfur, NutrientKind::Carbon] {
        let n = counts.get(&kind).copied().unwrap_or(0);
        assert!(n < water.max(4), "floor-weight kind {kind:?} spawned {n} times");
    }
}

#[test]
fn disabling_freezes_and_reenabling_resumes() {
    let mut world = seeded_world(9);
    world.step(DT);
    let t_before = world.t;
    let out_before = world.audio_outputs();

    world.set_enabled(false);
    for _ in 0..50 {
        world.step(DT);
    }
    assert_eq!(world.t, t_before);
    assert_eq!(world.audio_outputs(), out_before);

    world.set_enabled(true);
    world.step(DT);
    assert!(world.t > t_before);
}
