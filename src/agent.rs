use std::collections::VecDeque;
use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use crate::constants::*;
use crate::species::{SpeciesId, SpeciesProfile};
use crate::utils::{lerp, wrap_angle};
use crate::world::SimRng;

pub type AgentId = u64;

/// Life-state only ever advances: Alive -> Dying -> Dead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LifeState {
    Alive,
    Dying,
    Dead,
}

/// A recently ingested nutrient particle, kept for visual/behavioral
/// feedback. The ring holds at most STOMACH_CAPACITY entries.
#[derive(Debug, Clone)]
pub struct IngestedParticle {
    pub tint: [u8; 3],
    pub phase: f32,
    pub offset: Vec2,
}

#[derive(Debug, Clone)]
pub struct Agent {
    pub id: AgentId,
    pub species: SpeciesId,
    pub pos: Vec2,
    pub depth: f32,
    pub vel: Vec2,
    pub heading: f32,
    /// Hash identity for deterministic pitch selection.
    pub seed: f32,
    /// Personal metabolic jitter so individuals never synchronize.
    pub time_scale: f32,
    pub maturity: f32,
    pub energy: f32,
    pub health: f32,
    pub age: f32,
    pub state: LifeState,
    /// True while a parasite holds this agent as its host.
    pub occupied: bool,
    /// True if the agent consumed something this tick.
    pub feeding: bool,
    pub alpha: f32,
    pub stomach: VecDeque<IngestedParticle>,
}

impl Agent {
    pub fn new(id: AgentId, species: SpeciesId, pos: Vec2, is_baby: bool, rng: &mut SimRng) -> Self {
        Self {
            id,
            species,
            pos,
            depth: rng.gen_range(-0.2..0.2),
            vel: Vec2::ZERO,
            heading: rng.gen_range(0.0..TAU),
            seed: rng.gen_range(0.0..100.0),
            time_scale: rng.gen_range(0.85..1.15),
            maturity: if is_baby { BABY_MATURITY } else { 1.0 },
            energy: 1.0,
            health: 1.0,
            age: 0.0,
            state: LifeState::Alive,
            occupied: false,
            feeding: false,
            alpha: 0.0,
            stomach: VecDeque::with_capacity(STOMACH_CAPACITY),
        }
    }

    pub fn profile(&self) -> &'static SpeciesProfile {
        self.species.profile()
    }

    pub fn is_alive(&self) -> bool {
        self.state == LifeState::Alive
    }

    pub fn body_radius(&self) -> f32 {
        self.profile().core_radius * self.maturity
    }

    /// Hunger scales swimming speed and feeding rate.
    pub fn metabolic_mult(&self) -> f32 {
        (0.25 + self.energy * 0.75) * self.time_scale
    }

    /// Takes in a consumed particle: raises energy (capped) and records
    /// it in the bounded stomach ring, evicting the oldest entry.
    pub fn absorb(&mut self, tint: [u8; 3], amount: f32, rng: &mut SimRng) {
        while self.stomach.len() >= STOMACH_CAPACITY {
            self.stomach.pop_front();
        }
        self.stomach.push_back(IngestedParticle {
            tint,
            phase: rng.gen_range(0.0..TAU),
            offset: Vec2::new(rng.gen_range(-0.01..0.01), rng.gen_range(-0.01..0.01)),
        });
        self.energy = (self.energy + amount * 0.6).clamp(0.0, 2.0);
        self.feeding = true;
    }

    /// Dissolution: decelerate, sink, fade; below the alpha threshold the
    /// agent is dead and the world removes it.
    pub(crate) fn step_dying(&mut self, dt: f32) {
        self.age += dt;
        self.vel *= 0.85;
        self.depth = lerp(self.depth, -1.0, dt * 0.4);
        self.alpha = lerp(self.alpha, 0.0, dt * 0.2);
        if self.alpha < 0.01 {
            self.state = LifeState::Dead;
        }
    }

    /// Start-of-tick upkeep for a living agent.
    pub(crate) fn begin_tick(&mut self, dt: f32) {
        self.age += dt;
        self.feeding = false;
        self.maturity = (self.maturity + dt * 0.015).clamp(BABY_MATURITY, 1.0);
        self.alpha = lerp(self.alpha, 0.85, dt);
    }

    /// Proportional turn toward a target heading.
    pub(crate) fn steer(&mut self, target_heading: f32) {
        let diff = wrap_angle(target_heading - self.heading);
        self.heading += diff * self.profile().turn;
    }

    pub(crate) fn wander(&mut self, rng: &mut SimRng) {
        self.heading += rng.gen_range(-0.5..0.5) * self.profile().wander;
    }

    /// Circular containment: past the containment radius, steer strongly
    /// back toward center and damp velocity so nothing escapes.
    pub(crate) fn contain(&mut self) {
        let center = Vec2::splat(FIELD_CENTER);
        if self.pos.distance(center) > CONTAINMENT_RADIUS {
            let back = center - self.pos;
            let target = back.y.atan2(back.x);
            self.heading += wrap_angle(target - self.heading) * 0.1;
            self.vel *= 0.9;
        }
    }

    /// Velocity integration with metabolic speed scaling, drag, and
    /// position clamped to the field.
    pub(crate) fn integrate(&mut self, dt: f32, t: f32) {
        let profile = self.profile();
        let thrust = profile.speed * self.metabolic_mult();
        self.vel += Vec2::from_angle(self.heading) * thrust;
        self.vel *= profile.drag;
        self.pos = (self.pos + self.vel).clamp(Vec2::splat(FIELD_MIN), Vec2::splat(FIELD_MAX));
        self.depth = lerp(self.depth, (t * 0.3 + self.seed).sin() * 0.5, 0.02);
        let orbit = self.body_radius() * 0.5;
        for particle in &mut self.stomach {
            particle.phase += dt * 4.0;
            particle.offset = Vec2::new(
                particle.phase.sin() * orbit,
                particle.phase.cos() * orbit,
            );
        }
    }

    /// Metabolic drain; starvation, exhausted health, or old age all
    /// transition the agent to Dying.
    pub(crate) fn deplete(&mut self, dt: f32) {
        self.energy = (self.energy - dt * ENERGY_DRAIN_PER_SEC).max(0.0);
        self.health -= dt * HEALTH_DRAIN_PER_SEC;
        if self.energy <= 0.05 || self.health <= 0.0 || self.age > MAX_AGE {
            self.state = LifeState::Dying;
        }
    }
}
