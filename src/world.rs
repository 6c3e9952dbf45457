use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::agent::{Agent, LifeState};
use crate::config::{CaretakerRecipe, WorldConfig};
use crate::constants::*;
use crate::nutrient::{ALL_NUTRIENTS, NutrientBlob, NutrientKind};
use crate::parasite::{Parasite, PeerPhrase};
use crate::species::{ALL_SPECIES, Reproduction, SpeciesId};
use crate::spore::Spore;
use crate::utils::sanitize_dt;

pub type SimRng = StdRng;

/// External control parameters, sampled once per tick from the provider.
#[derive(Debug, Clone, Copy)]
pub struct ControlParams {
    pub base_hz: f32,
    pub ch_mult: [f32; PARASITE_COUNT],
}

impl Default for ControlParams {
    fn default() -> Self {
        Self {
            base_hz: DEFAULT_BASE_HZ,
            ch_mult: [1.0, 2.0, 3.0, 4.0],
        }
    }
}

pub type ParamsProvider = Box<dyn FnMut() -> ControlParams>;

/// The 4-channel output vector consumed by the audio/transport layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioOutputs {
    pub amp: [f32; PARASITE_COUNT],
    pub freq: [f32; PARASITE_COUNT],
    pub phase: [f32; PARASITE_COUNT],
}

impl Default for AudioOutputs {
    /// Silent channels at the default base frequency, so the output
    /// honors the 20-1500 Hz contract even before the first tick.
    fn default() -> Self {
        Self {
            amp: [0.0; PARASITE_COUNT],
            freq: [DEFAULT_BASE_HZ; PARASITE_COUNT],
            phase: [0.0; PARASITE_COUNT],
        }
    }
}

#[derive(Debug, Clone)]
pub struct Caretaker {
    pub recipe: CaretakerRecipe,
    pub enabled: bool,
    pub intensity: f32,
    pub timer: f32,
}

impl Default for Caretaker {
    fn default() -> Self {
        Self {
            recipe: CaretakerRecipe::Gardener,
            enabled: true,
            intensity: 1.0,
            timer: 0.0,
        }
    }
}

/// Chemotaxis target, resolved fresh each tick. Indices are only valid
/// within the tick that produced them (sweeps happen afterwards).
enum Target {
    Nutrient(usize),
    Prey(usize),
    None,
}

/// Owns all agents, nutrient blobs, spores, and the four parasites;
/// advances them in a fixed order each tick and aggregates the parasite
/// outputs into the public audio vector. No global instance exists; the
/// host application owns the world and threads it through all calls.
pub struct World {
    pub agents: Vec<Agent>,
    pub blobs: Vec<NutrientBlob>,
    pub spores: Vec<Spore>,
    pub parasites: [Parasite; PARASITE_COUNT],
    pub t: f32,
    config: WorldConfig,
    enabled: bool,
    caretaker: Caretaker,
    next_id: u64,
    rng: SimRng,
    params: Option<ParamsProvider>,
    audio_out: AudioOutputs,
    // Reused between ticks to avoid per-tick allocation
    offspring_buffer: Vec<Agent>,
    spore_buffer: Vec<Spore>,
}

impl World {
    pub fn new(config: WorldConfig) -> Self {
        Self::with_rng(config, SimRng::from_entropy())
    }

    /// Deterministic world for tests.
    pub fn with_seed(config: WorldConfig, seed: u64) -> Self {
        Self::with_rng(config, SimRng::seed_from_u64(seed))
    }

    fn with_rng(config: WorldConfig, mut rng: SimRng) -> Self {
        let parasites = core::array::from_fn(|i| Parasite::new(i, &mut rng));
        Self {
            agents: Vec::new(),
            blobs: Vec::new(),
            spores: Vec::new(),
            parasites,
            t: 0.0,
            config,
            enabled: false,
            caretaker: Caretaker::default(),
            next_id: 0,
            rng,
            params: None,
            audio_out: AudioOutputs::default(),
            offspring_buffer: Vec::new(),
            spore_buffer: Vec::new(),
        }
    }

    /// Resets all collections, seeds an initial adult population across
    /// every species, repositions the parasites to hunting, and enables
    /// the simulation.
    pub fn init(&mut self, params: ParamsProvider) {
        self.params = Some(params);
        self.agents.clear();
        self.blobs.clear();
        self.spores.clear();

        for i in 0..self.config.initial_population {
            let species = ALL_SPECIES[i % ALL_SPECIES.len()];
            let pos = Vec2::new(self.rng.gen_range(0.2..0.8), self.rng.gen_range(0.2..0.8));
            let agent = self.make_agent(species, pos, false);
            self.agents.push(agent);
        }

        for i in 0..PARASITE_COUNT {
            self.parasites[i].detach(&mut self.agents);
            self.parasites[i].reset_position(&mut self.rng);
        }

        self.t = 0.0;
        self.caretaker.timer = 0.0;
        self.audio_out = AudioOutputs::default();
        self.enabled = true;
        log::info!(
            "biome initialized: {} agents, {} parasites",
            self.agents.len(),
            PARASITE_COUNT
        );
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Latest 4-channel output. Pure snapshot: repeated calls without an
    /// intervening step return identical values.
    pub fn audio_outputs(&self) -> AudioOutputs {
        self.audio_out
    }

    /// Externally triggered nutrient spawn at a random central position.
    pub fn feed(&mut self, kind: NutrientKind) {
        let pos = Vec2::new(self.rng.gen_range(0.3..0.7), self.rng.gen_range(0.3..0.7));
        let blob = NutrientBlob::new(self.take_id(), kind, pos, self.config.feed_mass, &mut self.rng);
        self.blobs.push(blob);
    }

    pub fn set_caretaker(&mut self, recipe: CaretakerRecipe, enabled: bool, intensity: f32) {
        self.caretaker.recipe = recipe;
        self.caretaker.enabled = enabled;
        let intensity = if intensity.is_finite() { intensity } else { 1.0 };
        self.caretaker.intensity =
            intensity.clamp(CARETAKER_MIN_INTENSITY, CARETAKER_MAX_INTENSITY);
    }

    pub fn set_caretaker_enabled(&mut self, enabled: bool) {
        self.caretaker.enabled = enabled;
    }

    /// Intensity as a percentage (0-500).
    pub fn set_caretaker_intensity(&mut self, percent: f32) {
        let percent = if percent.is_finite() { percent } else { 100.0 };
        self.caretaker.intensity =
            (percent / 100.0).clamp(CARETAKER_MIN_INTENSITY, CARETAKER_MAX_INTENSITY);
    }

    pub fn living_count(&self) -> usize {
        self.agents.iter().filter(|a| a.is_alive()).count()
    }

    /// Advances the whole biome by one tick. Fixed update order: caretaker,
    /// nutrients, spores, agents, parasites, then audio sampling, so that
    /// parasites always observe this tick's agent state.
    pub fn step(&mut self, dt: f32) {
        if !self.enabled {
            return;
        }
        let dt = sanitize_dt(dt);
        self.t += dt;

        self.step_caretaker(dt);

        for blob in &mut self.blobs {
            blob.step(dt);
        }
        self.blobs.retain(|b| !b.dead);

        self.step_spores(dt);
        self.step_agents(dt);
        self.agents.retain(|a| a.state != LifeState::Dead);

        self.step_parasites(dt);
        self.maintain_population();
        self.sample_audio(dt);
    }

    fn take_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn make_agent(&mut self, species: SpeciesId, pos: Vec2, is_baby: bool) -> Agent {
        let id = self.take_id();
        Agent::new(id, species, pos, is_baby, &mut self.rng)
    }

    fn step_caretaker(&mut self, dt: f32) {
        if !self.caretaker.enabled {
            return;
        }
        self.caretaker.timer += dt;
        if self.caretaker.timer <= self.config.caretaker_interval / self.caretaker.intensity {
            return;
        }
        self.caretaker.timer = 0.0;
        let kind = draw_nutrient(self.caretaker.recipe, &mut self.rng);
        self.feed(kind);
    }

    fn step_spores(&mut self, dt: f32) {
        let mut hatched: Vec<(Vec2, SpeciesId)> = Vec::new();
        for spore in &mut self.spores {
            if let Some(pos) = spore.step(dt, &self.blobs) {
                hatched.push((pos, spore.species));
            }
        }
        self.spores.retain(|s| !s.dead);
        for (pos, species) in hatched {
            let baby = self.make_agent(species, pos, true);
            self.agents.push(baby);
        }
    }

    fn step_agents(&mut self, dt: f32) {
        self.offspring_buffer.clear();
        self.spore_buffer.clear();
        let count = self.agents.len();

        for i in 0..count {
            match self.agents[i].state {
                LifeState::Dead => continue,
                LifeState::Dying => {
                    self.agents[i].step_dying(dt);
                    continue;
                }
                LifeState::Alive => {}
            }

            self.agents[i].begin_tick(dt);

            let (target, dist) = self.select_target(i);
            match target {
                Target::Nutrient(b) => {
                    if dist < self.agents[i].body_radius() + CONTACT_PAD {
                        let amount = dt * 0.2 * self.agents[i].metabolic_mult();
                        let eaten = self.blobs[b].consume(amount);
                        let tint = self.blobs[b].kind.descriptor().tint;
                        self.agents[i].absorb(tint, eaten, &mut self.rng);
                    }
                    let to = self.blobs[b].pos - self.agents[i].pos;
                    self.agents[i].steer(to.y.atan2(to.x));
                }
                Target::Prey(j) => {
                    if dist < self.agents[i].body_radius() + CONTACT_PAD {
                        let tint = self.agents[j].profile().tint;
                        self.agents[i].absorb(tint, PREY_ENERGY_GAIN, &mut self.rng);
                        self.agents[j].health = 0.0;
                    }
                    let to = self.agents[j].pos - self.agents[i].pos;
                    self.agents[i].steer(to.y.atan2(to.x));
                }
                Target::None => self.agents[i].wander(&mut self.rng),
            }

            self.agents[i].contain();
            self.try_reproduce(i);
            self.agents[i].integrate(dt, self.t);
            self.agents[i].deplete(dt);
        }

        self.agents.append(&mut self.offspring_buffer);
        self.spores.append(&mut self.spore_buffer);
    }

    /// Chemotaxis target priority: hungry mature agents seek their prey
    /// species first, everyone falls back to preferred nutrients. A target
    /// that vanished this tick simply resolves to Target::None.
    fn select_target(&self, i: usize) -> (Target, f32) {
        let agent = &self.agents[i];
        let mut best = Target::None;
        let mut min_dist = SEARCH_RADIUS;

        if agent.energy < HUNGER_THRESHOLD && agent.maturity > HUNT_MATURITY_MIN {
            let prey = agent.species.prey();
            for (j, other) in self.agents.iter().enumerate() {
                if j == i || other.species != prey || !other.is_alive() {
                    continue;
                }
                let d = agent.pos.distance(other.pos);
                if d < min_dist {
                    min_dist = d;
                    best = Target::Prey(j);
                }
            }
        }

        if matches!(best, Target::None) {
            let prefs = agent.profile().prefs;
            for (b, blob) in self.blobs.iter().enumerate() {
                if blob.dead || !prefs.contains(&blob.kind) {
                    continue;
                }
                let d = agent.pos.distance(blob.pos);
                if d < min_dist {
                    min_dist = d;
                    best = Target::Nutrient(b);
                }
            }
        }

        (best, min_dist)
    }

    /// Mitosis species spawn a baby directly; spore species emit a spore
    /// carrier instead. Same energy/maturity gating, same cost.
    fn try_reproduce(&mut self, i: usize) {
        let agent = &self.agents[i];
        if agent.energy <= REPRODUCE_ENERGY || agent.maturity <= REPRODUCE_MATURITY {
            return;
        }
        let population = self.agents.len() + self.offspring_buffer.len();
        if population >= self.config.population_cap {
            return;
        }

        let species = agent.species;
        let pos = agent.pos
            + Vec2::new(
                self.rng.gen_range(-0.01..0.01),
                self.rng.gen_range(-0.01..0.01),
            );
        self.agents[i].energy = MITOSIS_RESET_ENERGY;

        match species.profile().reproduction {
            Reproduction::Mitosis => {
                let baby = self.make_agent(species, pos, true);
                self.offspring_buffer.push(baby);
            }
            Reproduction::Spores => {
                let prefs = species.profile().prefs;
                let kind = prefs[self.rng.gen_range(0..prefs.len())];
                self.spore_buffer.push(Spore::new(pos, species, kind));
            }
        }
    }

    fn step_parasites(&mut self, dt: f32) {
        for i in 0..PARASITE_COUNT {
            let latched = self.latched_species();
            self.parasites[i].step(dt, &mut self.agents, &latched, &mut self.rng);
        }
    }

    /// Which species each channel currently rides (for diversity scoring).
    fn latched_species(&self) -> [Option<SpeciesId>; PARASITE_COUNT] {
        core::array::from_fn(|i| {
            self.parasites[i].host.and_then(|id| {
                self.agents
                    .iter()
                    .find(|a| a.id == id && a.is_alive())
                    .map(|a| a.species)
            })
        })
    }

    /// Population floor: the biome never dwindles to silence.
    fn maintain_population(&mut self) {
        if self.living_count() >= self.config.population_floor {
            return;
        }
        let species = ALL_SPECIES[self.rng.gen_range(0..ALL_SPECIES.len())];
        let pos = Vec2::new(self.rng.gen_range(0.4..0.6), self.rng.gen_range(0.4..0.6));
        let baby = self.make_agent(species, pos, true);
        log::debug!("population floor spawn: {:?} #{}", species, baby.id);
        self.agents.push(baby);
    }

    fn sample_audio(&mut self, dt: f32) {
        let params = match &mut self.params {
            Some(provider) => sanitize_params(provider()),
            None => ControlParams::default(),
        };

        let parasites = &mut self.parasites;
        let agents = &self.agents;
        let rng = &mut self.rng;
        let peers: [PeerPhrase; PARASITE_COUNT] =
            core::array::from_fn(|i| parasites[i].peer_phrase(agents));

        for i in 0..PARASITE_COUNT {
            let sig = parasites[i].audio(
                self.t,
                dt,
                params.base_hz,
                &params.ch_mult,
                agents,
                &peers,
                rng,
            );
            self.audio_out.amp[i] = sig.amp.clamp(0.0, 1.0);
            self.audio_out.freq[i] = sig.freq.clamp(FREQ_MIN_HZ, FREQ_MAX_HZ);
            self.audio_out.phase[i] = sig.phase;
        }
    }
}

/// Weighted draw over all nutrient kinds under a caretaker recipe.
pub fn draw_nutrient(recipe: CaretakerRecipe, rng: &mut SimRng) -> NutrientKind {
    let total: f32 = ALL_NUTRIENTS.iter().map(|&k| recipe.weight(k)).sum();
    let mut roll = rng.gen_range(0.0..total);
    for kind in ALL_NUTRIENTS {
        roll -= recipe.weight(kind);
        if roll <= 0.0 {
            return kind;
        }
    }
    // Floating point remainder lands on the last kind
    ALL_NUTRIENTS[ALL_NUTRIENTS.len() - 1]
}

/// Defends the core against non-finite external inputs.
fn sanitize_params(mut params: ControlParams) -> ControlParams {
    if !params.base_hz.is_finite() {
        log::warn!("non-finite base frequency from provider, using default");
        params.base_hz = DEFAULT_BASE_HZ;
    }
    params.base_hz = params.base_hz.clamp(FREQ_MIN_HZ, FREQ_MAX_HZ);
    for (i, mult) in params.ch_mult.iter_mut().enumerate() {
        if !mult.is_finite() || *mult <= 0.0 {
            *mult = (i + 1) as f32;
        }
    }
    params
}
