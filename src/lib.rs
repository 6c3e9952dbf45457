//! Procedural biome engine: a small ecology of synthetic organisms whose
//! emergent behavior drives four audio-like control channels. Four
//! persistent parasites latch onto living agents and translate host state
//! (species, speed, energy) into per-channel amplitude/frequency/phase
//! triples, which the world aggregates into its public output vector.

pub mod agent;
pub mod config;
pub mod constants;
pub mod nutrient;
pub mod parasite;
pub mod species;
pub mod spore;
pub mod timbre;
pub mod utils;
pub mod world;

pub use agent::{Agent, AgentId, LifeState};
pub use config::{CaretakerRecipe, WorldConfig};
pub use nutrient::{NutrientBlob, NutrientKind};
pub use parasite::{ChannelSignal, Parasite, ParasiteState};
pub use species::{Reproduction, SpeciesId};
pub use spore::Spore;
pub use world::{AudioOutputs, ControlParams, World};
