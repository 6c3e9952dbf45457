// --- Global Simulation Constants ---

// The field is the unit square; agents are kept slightly inside it.
pub const FIELD_MIN: f32 = 0.02;
pub const FIELD_MAX: f32 = 0.98;
pub const FIELD_CENTER: f32 = 0.5;
// Beyond this distance from center, agents are steered back inward.
pub const CONTAINMENT_RADIUS: f32 = 0.43;

pub const FIXED_TIMESTEP: f32 = 1.0 / 60.0;
pub const MIN_TICK_DT: f32 = 0.001;
pub const MAX_TICK_DT: f32 = 0.05;

pub const INITIAL_POPULATION: usize = 36;
pub const POPULATION_FLOOR: usize = 24;
pub const POPULATION_CAP: usize = 60;

// Agent behavior
pub const SEARCH_RADIUS: f32 = 0.3;
pub const CONTACT_PAD: f32 = 0.015;
pub const HUNGER_THRESHOLD: f32 = 0.4;
pub const HUNT_MATURITY_MIN: f32 = 0.6;
pub const PREY_ENERGY_GAIN: f32 = 0.5;
pub const REPRODUCE_ENERGY: f32 = 1.8;
pub const REPRODUCE_MATURITY: f32 = 0.9;
pub const MITOSIS_RESET_ENERGY: f32 = 0.7;
pub const BABY_MATURITY: f32 = 0.2;
pub const MAX_AGE: f32 = 180.0;
pub const ENERGY_DRAIN_PER_SEC: f32 = 0.007;
pub const HEALTH_DRAIN_PER_SEC: f32 = 0.002;
pub const STOMACH_CAPACITY: usize = 8;

// Nutrients and spores
pub const BLOB_SPAWN_MASS: f32 = 1.2;
pub const BLOB_DEAD_MASS: f32 = 0.01;
pub const SPORE_HATCH_RADIUS: f32 = 0.06;
pub const SPORE_MAX_AGE: f32 = 40.0;

// Parasites
pub const PARASITE_COUNT: usize = 4;
pub const CAPTURE_RADIUS: f32 = 0.025;
pub const HUNT_RADIUS: f32 = 0.35;
pub const REHOME_RADIUS: f32 = 0.18;
pub const SWITCH_MARGIN: f32 = 0.65;
pub const INVALID_SCORE: f32 = -1.0e9;
// Normalizes host swim speed into [0, 1] for the synth.
pub const SPEED_NORM: f32 = 0.000_22;
pub const CALL_RADIUS: f32 = 0.18;

// Audio output contract
pub const FREQ_MIN_HZ: f32 = 20.0;
pub const FREQ_MAX_HZ: f32 = 1500.0;
pub const DEFAULT_BASE_HZ: f32 = 200.0;

// Caretaker
pub const CARETAKER_BASE_INTERVAL: f32 = 4.5;
pub const DIET_DEFAULT_WEIGHT: f32 = 0.05;
pub const CARETAKER_MIN_INTENSITY: f32 = 0.1;
pub const CARETAKER_MAX_INTENSITY: f32 = 5.0;
