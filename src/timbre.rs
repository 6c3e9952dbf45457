use crate::species::SpeciesId;

// --- Per-species sound profiles ---
//
// Monophonic family identity: register, gating rhythm, vibrato, grit and
// echo. Consumed only by the parasite synth.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateStyle {
    Breath,
    Staccato,
    Talk,
    Swell,
}

#[derive(Debug, Clone, Copy)]
pub struct SoundProfile {
    pub identity: &'static str,
    pub reg_mul: f32,
    pub min_mul: f32,
    pub max_mul: f32,
    pub ratios: &'static [f32],
    pub hop_hz: [f32; 3],
    pub vibrato_hz: [f32; 2],
    pub vibrato_amt: [f32; 2],
    pub gate: GateStyle,
    pub talkiness: f32,
    pub grit: f32,
    /// (delay seconds, gain) pairs.
    pub echo: &'static [(f32, f32)],
    pub phase_reset: bool,
}

static SOUNDS: [SoundProfile; 6] = [
    SoundProfile {
        identity: "breath shimmer",
        reg_mul: 0.85,
        min_mul: 0.45,
        max_mul: 2.6,
        ratios: &[1.0, 6.0 / 5.0, 4.0 / 3.0, 3.0 / 2.0, 5.0 / 3.0, 2.0],
        hop_hz: [0.4, 1.0, 2.0],
        vibrato_hz: [0.12, 0.35],
        vibrato_amt: [0.004, 0.015],
        gate: GateStyle::Breath,
        talkiness: 0.35,
        grit: 0.06,
        echo: &[(0.08, 0.35), (0.16, 0.20), (0.28, 0.12)],
        phase_reset: false,
    },
    SoundProfile {
        identity: "staccato star",
        reg_mul: 1.75,
        min_mul: 0.90,
        max_mul: 4.5,
        ratios: &[1.0, 9.0 / 8.0, 5.0 / 4.0, 4.0 / 3.0, 3.0 / 2.0, 7.0 / 4.0, 2.0],
        hop_hz: [1.0, 3.5, 6.0],
        vibrato_hz: [0.0, 0.25],
        vibrato_amt: [0.0, 0.01],
        gate: GateStyle::Staccato,
        talkiness: 0.22,
        grit: 0.16,
        echo: &[(0.05, 0.25), (0.11, 0.15), (0.18, 0.08)],
        phase_reset: true,
    },
    SoundProfile {
        identity: "talky worms",
        reg_mul: 1.15,
        min_mul: 0.70,
        max_mul: 3.8,
        ratios: &[
            1.0,
            9.0 / 8.0,
            6.0 / 5.0,
            5.0 / 4.0,
            4.0 / 3.0,
            3.0 / 2.0,
            2.0,
        ],
        hop_hz: [0.9, 2.8, 5.0],
        vibrato_hz: [0.25, 1.1],
        vibrato_amt: [0.006, 0.03],
        gate: GateStyle::Talk,
        talkiness: 0.55,
        grit: 0.12,
        echo: &[(0.09, 0.32), (0.18, 0.18), (0.32, 0.10)],
        phase_reset: false,
    },
    SoundProfile {
        identity: "low swells",
        reg_mul: 0.55,
        min_mul: 0.30,
        max_mul: 1.8,
        ratios: &[1.0, 4.0 / 3.0, 3.0 / 2.0, 2.0, 8.0 / 5.0, 5.0 / 3.0],
        hop_hz: [0.25, 0.7, 1.4],
        vibrato_hz: [0.05, 0.2],
        vibrato_amt: [0.002, 0.008],
        gate: GateStyle::Swell,
        talkiness: 0.12,
        grit: 0.08,
        echo: &[(0.14, 0.25), (0.28, 0.16), (0.46, 0.10)],
        phase_reset: false,
    },
    SoundProfile {
        identity: "glass talk",
        reg_mul: 1.40,
        min_mul: 0.80,
        max_mul: 4.2,
        ratios: &[
            1.0,
            9.0 / 8.0,
            5.0 / 4.0,
            45.0 / 32.0,
            3.0 / 2.0,
            15.0 / 8.0,
            2.0,
        ],
        hop_hz: [1.2, 3.0, 5.5],
        vibrato_hz: [0.2, 0.9],
        vibrato_amt: [0.004, 0.02],
        gate: GateStyle::Talk,
        talkiness: 0.5,
        grit: 0.10,
        echo: &[(0.07, 0.30), (0.15, 0.17), (0.26, 0.09)],
        phase_reset: false,
    },
    SoundProfile {
        identity: "deep breath",
        reg_mul: 0.62,
        min_mul: 0.35,
        max_mul: 2.0,
        ratios: &[1.0, 6.0 / 5.0, 4.0 / 3.0, 3.0 / 2.0, 8.0 / 5.0, 2.0],
        hop_hz: [0.3, 0.8, 1.6],
        vibrato_hz: [0.08, 0.3],
        vibrato_amt: [0.003, 0.01],
        gate: GateStyle::Breath,
        talkiness: 0.18,
        grit: 0.07,
        echo: &[(0.12, 0.28), (0.24, 0.16), (0.40, 0.10)],
        phase_reset: false,
    },
];

pub fn profile(species: SpeciesId) -> &'static SoundProfile {
    &SOUNDS[species as usize]
}

/// Amplitude gate for one timbre family at time `t`. `speed_n` is the
/// host's normalized speed, `seed` the host/channel identity offset.
pub fn gate_for(lib: &SoundProfile, t: f32, speed_n: f32, seed: f32) -> f32 {
    match lib.gate {
        GateStyle::Breath => {
            let a = 0.6 + 0.4 * (t * 0.9 + seed).sin();
            let sigh = if (t * 0.7 + seed).sin() > 0.96 { 1.25 } else { 1.0 };
            a * sigh
        }
        GateStyle::Staccato => {
            let rate = 2.2 + 3.0 * speed_n;
            if (t * rate).rem_euclid(1.0) < 0.14 { 1.3 } else { 0.05 }
        }
        GateStyle::Talk => {
            let rate = 1.2 + 3.2 * speed_n;
            let ph = (t * rate + seed * 0.17).rem_euclid(1.0);
            if ph < 0.10 {
                1.25
            } else if ph < 0.22 {
                0.55
            } else {
                0.12
            }
        }
        GateStyle::Swell => {
            let a = 0.65 + 0.35 * (t * 0.75 + seed).sin();
            a * a
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::species::ALL_SPECIES;

    #[test]
    fn every_species_has_a_profile_with_valid_bounds() {
        for id in ALL_SPECIES {
            let lib = profile(id);
            assert!(lib.min_mul < lib.max_mul, "{}", lib.identity);
            assert!(!lib.ratios.is_empty());
            assert!(lib.hop_hz[0] <= lib.hop_hz[2]);
            assert_eq!(lib.echo.len(), 3);
        }
    }

    #[test]
    fn staccato_gate_pulses_between_floor_and_peak() {
        let lib = profile(SpeciesId::Archaea);
        let mut saw_peak = false;
        let mut saw_floor = false;
        for i in 0..500 {
            let g = gate_for(lib, i as f32 * 0.01, 0.5, 0.0);
            assert!(g == 1.3 || g == 0.05);
            saw_peak |= g == 1.3;
            saw_floor |= g == 0.05;
        }
        assert!(saw_peak && saw_floor);
    }

    #[test]
    fn swell_gate_is_nonnegative_and_bounded() {
        let lib = profile(SpeciesId::Lattice);
        for i in 0..500 {
            let g = gate_for(lib, i as f32 * 0.03, 0.0, 1.7);
            assert!((0.0..=1.0).contains(&g));
        }
    }
}
