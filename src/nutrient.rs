use glam::Vec2;
use rand::Rng;

use crate::constants::BLOB_DEAD_MASS;
use crate::world::SimRng;

// --- Nutrient kinds (static descriptors) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NutrientKind {
    Sugar,
    Salt,
    Iron,
    Water,
    Sulfur,
    Carbon,
}

pub const ALL_NUTRIENTS: [NutrientKind; 6] = [
    NutrientKind::Sugar,
    NutrientKind::Salt,
    NutrientKind::Iron,
    NutrientKind::Water,
    NutrientKind::Sulfur,
    NutrientKind::Carbon,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobShape {
    Metaball,
    Solid,
    Drop,
}

#[derive(Debug, Clone, Copy)]
pub struct NutrientDescriptor {
    pub tint: [u8; 3],
    pub shape: BlobShape,
}

impl NutrientKind {
    pub fn descriptor(self) -> &'static NutrientDescriptor {
        match self {
            NutrientKind::Sugar => &NutrientDescriptor {
                tint: [245, 198, 92],
                shape: BlobShape::Metaball,
            },
            NutrientKind::Salt => &NutrientDescriptor {
                tint: [138, 188, 255],
                shape: BlobShape::Solid,
            },
            NutrientKind::Iron => &NutrientDescriptor {
                tint: [236, 103, 92],
                shape: BlobShape::Solid,
            },
            NutrientKind::Water => &NutrientDescriptor {
                tint: [118, 232, 216],
                shape: BlobShape::Drop,
            },
            NutrientKind::Sulfur => &NutrientDescriptor {
                tint: [169, 108, 255],
                shape: BlobShape::Drop,
            },
            NutrientKind::Carbon => &NutrientDescriptor {
                tint: [220, 220, 220],
                shape: BlobShape::Metaball,
            },
        }
    }
}

// --- NutrientBlob (dynamic) ---

/// A transient food source. Mass decays over time and on consumption;
/// the world sweeps blobs once `dead` is set.
#[derive(Debug, Clone)]
pub struct NutrientBlob {
    pub id: u64,
    pub kind: NutrientKind,
    pub pos: Vec2,
    pub depth: f32,
    pub mass: f32,
    pub dead: bool,
}

impl NutrientBlob {
    pub fn new(id: u64, kind: NutrientKind, pos: Vec2, mass: f32, rng: &mut SimRng) -> Self {
        Self {
            id,
            kind,
            pos,
            depth: rng.gen_range(-0.3..0.3),
            mass,
            dead: false,
        }
    }

    /// Removes up to `amount` of mass and returns what was taken.
    pub fn consume(&mut self, amount: f32) -> f32 {
        let taken = amount.min(self.mass).max(0.0);
        self.mass -= taken;
        if self.mass <= BLOB_DEAD_MASS {
            self.dead = true;
        }
        taken
    }

    pub fn step(&mut self, dt: f32) {
        self.mass *= 1.0 - dt * 0.01;
        if self.mass <= BLOB_DEAD_MASS {
            self.dead = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> SimRng {
        SimRng::seed_from_u64(7)
    }

    #[test]
    fn consume_depletes_and_kills() {
        let mut blob = NutrientBlob::new(1, NutrientKind::Sugar, Vec2::splat(0.5), 1.2, &mut rng());
        let taken = blob.consume(0.5);
        assert!((taken - 0.5).abs() < 1e-6);
        assert!((blob.mass - 0.7).abs() < 1e-6);
        assert!(!blob.dead);

        let taken = blob.consume(5.0);
        assert!((taken - 0.7).abs() < 1e-6);
        assert!(blob.dead);
    }

    #[test]
    fn mass_decays_toward_death() {
        let mut blob =
            NutrientBlob::new(2, NutrientKind::Carbon, Vec2::splat(0.5), 0.0101, &mut rng());
        for _ in 0..100 {
            blob.step(0.05);
        }
        assert!(blob.dead);
    }
}
