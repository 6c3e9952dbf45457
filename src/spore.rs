use glam::Vec2;

use crate::constants::{SPORE_HATCH_RADIUS, SPORE_MAX_AGE};
use crate::nutrient::{NutrientBlob, NutrientKind};
use crate::species::SpeciesId;

/// Short-lived reproduction carrier. Hatches into a baby agent when it
/// finds a nutrient blob of its target kind nearby; dies unhatched past
/// its maximum age.
#[derive(Debug, Clone)]
pub struct Spore {
    pub pos: Vec2,
    pub species: SpeciesId,
    pub kind: NutrientKind,
    pub age: f32,
    pub dead: bool,
}

impl Spore {
    pub fn new(pos: Vec2, species: SpeciesId, kind: NutrientKind) -> Self {
        Self {
            pos,
            species,
            kind,
            age: 0.0,
            dead: false,
        }
    }

    /// Returns the hatch position when a matching nutrient is close enough.
    /// The world creates the baby agent; the spore only signals.
    pub fn step(&mut self, dt: f32, blobs: &[NutrientBlob]) -> Option<Vec2> {
        self.age += dt;
        for blob in blobs {
            if blob.dead || blob.kind != self.kind {
                continue;
            }
            if blob.pos.distance(self.pos) < SPORE_HATCH_RADIUS {
                self.dead = true;
                return Some(self.pos);
            }
        }
        if self.age > SPORE_MAX_AGE {
            self.dead = true;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::SimRng;
    use rand::SeedableRng;

    fn blob_at(kind: NutrientKind, pos: Vec2) -> NutrientBlob {
        NutrientBlob::new(1, kind, pos, 1.2, &mut SimRng::seed_from_u64(3))
    }

    #[test]
    fn hatches_next_to_matching_nutrient() {
        let mut spore = Spore::new(Vec2::new(0.5, 0.5), SpeciesId::Archaea, NutrientKind::Iron);
        let blobs = vec![blob_at(NutrientKind::Iron, Vec2::new(0.52, 0.5))];
        let hatched = spore.step(0.016, &blobs);
        assert_eq!(hatched, Some(Vec2::new(0.5, 0.5)));
        assert!(spore.dead);
    }

    #[test]
    fn ignores_wrong_kind_and_distant_blobs() {
        let mut spore = Spore::new(Vec2::new(0.5, 0.5), SpeciesId::Archaea, NutrientKind::Iron);
        let blobs = vec![
            blob_at(NutrientKind::Sugar, Vec2::new(0.5, 0.5)),
            blob_at(NutrientKind::Iron, Vec2::new(0.9, 0.9)),
        ];
        assert_eq!(spore.step(0.016, &blobs), None);
        assert!(!spore.dead);
    }

    #[test]
    fn orphaned_spore_expires_without_hatching() {
        let mut spore = Spore::new(Vec2::new(0.5, 0.5), SpeciesId::Archaea, NutrientKind::Iron);
        let mut hatched = false;
        for _ in 0..900 {
            if spore.step(0.05, &[]).is_some() {
                hatched = true;
            }
        }
        assert!(!hatched);
        assert!(spore.dead);
    }
}
