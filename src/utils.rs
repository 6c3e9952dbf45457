use std::f32::consts::{PI, TAU};

use crate::constants::{MAX_TICK_DT, MIN_TICK_DT};

// --- Helper Functions ---

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Deterministic hash of a scalar into [0, 1). Pure function of its input,
/// independent of the world RNG, so pitch selection stays reproducible.
pub fn hash01(n: f32) -> f32 {
    let x = ((n as f64) * 127.1 + 311.7).sin() * 43758.5453;
    (x - x.floor()) as f32
}

/// Wraps an angle difference into [-PI, PI].
pub fn wrap_angle(mut a: f32) -> f32 {
    while a < -PI {
        a += TAU;
    }
    while a > PI {
        a -= TAU;
    }
    a
}

/// Guards the simulation against frame-rate stalls and garbage input.
/// Non-finite dt degrades to the minimum tick rather than propagating NaN.
pub fn sanitize_dt(dt: f32) -> f32 {
    if !dt.is_finite() {
        return MIN_TICK_DT;
    }
    dt.clamp(MIN_TICK_DT, MAX_TICK_DT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash01_is_deterministic_and_bounded() {
        for i in 0..200 {
            let n = i as f32 * 1.371;
            let a = hash01(n);
            let b = hash01(n);
            assert_eq!(a, b);
            assert!((0.0..1.0).contains(&a), "hash01({n}) = {a}");
        }
        assert_ne!(hash01(1.0), hash01(2.0));
    }

    #[test]
    fn wrap_angle_stays_in_range() {
        for k in -20..20 {
            let a = wrap_angle(k as f32 * 1.9);
            assert!((-PI..=PI).contains(&a));
        }
        assert!((wrap_angle(TAU + 0.1) - 0.1).abs() < 1e-5);
    }

    #[test]
    fn sanitize_dt_handles_garbage() {
        assert_eq!(sanitize_dt(f32::NAN), MIN_TICK_DT);
        assert_eq!(sanitize_dt(f32::INFINITY), MIN_TICK_DT);
        assert_eq!(sanitize_dt(-1.0), MIN_TICK_DT);
        assert_eq!(sanitize_dt(10.0), MAX_TICK_DT);
        assert_eq!(sanitize_dt(0.016), 0.016);
    }
}
