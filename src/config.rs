use crate::constants::*;
use crate::nutrient::NutrientKind;

/// World-level tunables. Tests shrink or disable pieces through this.
#[derive(Debug, Clone)]
pub struct WorldConfig {
    pub initial_population: usize,
    pub population_floor: usize,
    pub population_cap: usize,
    /// Seconds between caretaker spawns at intensity 1.0.
    pub caretaker_interval: f32,
    pub feed_mass: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            initial_population: INITIAL_POPULATION,
            population_floor: POPULATION_FLOOR,
            population_cap: POPULATION_CAP,
            caretaker_interval: CARETAKER_BASE_INTERVAL,
            feed_mass: BLOB_SPAWN_MASS,
        }
    }
}

/// Caretaker feeding policies: each recipe weights the nutrient kinds it
/// favors. Kinds a recipe leaves out still get a small default weight so
/// every kind stays reachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaretakerRecipe {
    Gardener,
    Bloom,
    Ballast,
    Ironbeat,
    Sulfuric,
    Drifter,
}

impl CaretakerRecipe {
    pub fn diet(self) -> &'static [(NutrientKind, f32)] {
        match self {
            CaretakerRecipe::Gardener => &[
                (NutrientKind::Sugar, 1.0),
                (NutrientKind::Water, 1.0),
                (NutrientKind::Carbon, 1.0),
            ],
            CaretakerRecipe::Bloom => &[(NutrientKind::Sugar, 2.0), (NutrientKind::Water, 1.0)],
            CaretakerRecipe::Ballast => &[(NutrientKind::Salt, 1.0), (NutrientKind::Carbon, 2.0)],
            CaretakerRecipe::Ironbeat => &[(NutrientKind::Iron, 2.0), (NutrientKind::Water, 1.0)],
            CaretakerRecipe::Sulfuric => &[
                (NutrientKind::Sulfur, 1.0),
                (NutrientKind::Iron, 1.0),
                (NutrientKind::Sugar, 1.0),
            ],
            CaretakerRecipe::Drifter => &[(NutrientKind::Water, 2.0), (NutrientKind::Carbon, 1.0)],
        }
    }

    /// Weight of one kind under this recipe, with the reachability floor.
    pub fn weight(self, kind: NutrientKind) -> f32 {
        self.diet()
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|&(_, w)| w)
            .unwrap_or(DIET_DEFAULT_WEIGHT)
    }
}
