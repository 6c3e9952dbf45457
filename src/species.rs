use crate::nutrient::NutrientKind;

// --- Species Registry ---
//
// Static per-species behavioral parameters. The predation map is a closed
// 6-cycle: every species has exactly one prey species.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpeciesId {
    Bacteria,
    Archaea,
    Flagellate,
    Lattice,
    Ciliate,
    Radiolarian,
}

pub const ALL_SPECIES: [SpeciesId; 6] = [
    SpeciesId::Bacteria,
    SpeciesId::Archaea,
    SpeciesId::Flagellate,
    SpeciesId::Lattice,
    SpeciesId::Ciliate,
    SpeciesId::Radiolarian,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reproduction {
    Mitosis,
    Spores,
}

#[derive(Debug, Clone, Copy)]
pub struct SpeciesProfile {
    pub name: &'static str,
    pub speed: f32,
    pub turn: f32,
    pub wander: f32,
    pub drag: f32,
    pub core_radius: f32,
    pub tint: [u8; 3],
    pub prefs: &'static [NutrientKind],
    pub reproduction: Reproduction,
}

static PROFILES: [SpeciesProfile; 6] = [
    SpeciesProfile {
        name: "Breathers",
        speed: 0.000_06,
        turn: 0.015,
        wander: 0.02,
        drag: 0.96,
        core_radius: 0.015,
        tint: [80, 215, 225],
        prefs: &[NutrientKind::Sugar, NutrientKind::Water],
        reproduction: Reproduction::Mitosis,
    },
    SpeciesProfile {
        name: "Pulsers",
        speed: 0.000_1,
        turn: 0.03,
        wander: 0.015,
        drag: 0.94,
        core_radius: 0.013,
        tint: [235, 170, 85],
        prefs: &[NutrientKind::Iron, NutrientKind::Salt],
        reproduction: Reproduction::Spores,
    },
    SpeciesProfile {
        name: "Ticklers",
        speed: 0.000_15,
        turn: 0.04,
        wander: 0.05,
        drag: 0.9,
        core_radius: 0.01,
        tint: [205, 140, 235],
        prefs: &[NutrientKind::Sulfur, NutrientKind::Sugar],
        reproduction: Reproduction::Mitosis,
    },
    SpeciesProfile {
        name: "Compressors",
        speed: 0.000_05,
        turn: 0.01,
        wander: 0.005,
        drag: 0.97,
        core_radius: 0.016,
        tint: [145, 225, 175],
        prefs: &[NutrientKind::Carbon, NutrientKind::Salt],
        reproduction: Reproduction::Mitosis,
    },
    SpeciesProfile {
        name: "Lacers",
        speed: 0.000_12,
        turn: 0.035,
        wander: 0.03,
        drag: 0.92,
        core_radius: 0.011,
        tint: [150, 220, 255],
        prefs: &[NutrientKind::Water, NutrientKind::Carbon],
        reproduction: Reproduction::Mitosis,
    },
    SpeciesProfile {
        name: "Drifters",
        speed: 0.000_04,
        turn: 0.012,
        wander: 0.008,
        drag: 0.97,
        core_radius: 0.017,
        tint: [230, 200, 160],
        prefs: &[NutrientKind::Salt, NutrientKind::Sulfur],
        reproduction: Reproduction::Spores,
    },
];

impl SpeciesId {
    pub fn profile(self) -> &'static SpeciesProfile {
        &PROFILES[self as usize]
    }

    /// The single species this one preys on.
    pub fn prey(self) -> SpeciesId {
        match self {
            SpeciesId::Bacteria => SpeciesId::Archaea,
            SpeciesId::Archaea => SpeciesId::Flagellate,
            SpeciesId::Flagellate => SpeciesId::Lattice,
            SpeciesId::Lattice => SpeciesId::Ciliate,
            SpeciesId::Ciliate => SpeciesId::Radiolarian,
            SpeciesId::Radiolarian => SpeciesId::Bacteria,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predation_is_a_closed_cycle_over_all_species() {
        let mut seen = Vec::new();
        let mut current = SpeciesId::Bacteria;
        for _ in 0..ALL_SPECIES.len() {
            assert!(!seen.contains(&current), "cycle revisits {current:?} early");
            seen.push(current);
            current = current.prey();
        }
        assert_eq!(current, SpeciesId::Bacteria);
        assert_eq!(seen.len(), ALL_SPECIES.len());
    }

    #[test]
    fn every_species_has_sane_movement_constants() {
        for id in ALL_SPECIES {
            let p = id.profile();
            assert!(p.speed > 0.0);
            assert!(p.drag > 0.0 && p.drag < 1.0);
            assert!(!p.prefs.is_empty());
        }
    }
}
