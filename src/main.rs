use rotifera::constants::FIXED_TIMESTEP;
use rotifera::{ControlParams, World, WorldConfig};

/// Headless driver: advances the biome at a fixed timestep and logs the
/// population and the four channel triples about once per simulated second.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let seconds: f32 = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(30.0);

    let mut world = World::new(WorldConfig::default());
    world.init(Box::new(|| ControlParams {
        base_hz: 200.0,
        ch_mult: [1.0, 2.0, 3.0, 4.0],
    }));

    let total_ticks = (seconds / FIXED_TIMESTEP).ceil() as u64;
    let ticks_per_log = (1.0 / FIXED_TIMESTEP) as u64;

    for tick in 0..total_ticks {
        world.step(FIXED_TIMESTEP);
        if tick % ticks_per_log == 0 {
            let out = world.audio_outputs();
            log::info!(
                "t={:6.2}s agents={:2} blobs={:2} spores={:2} amp={:.2?} freq={:.1?}",
                world.t,
                world.living_count(),
                world.blobs.len(),
                world.spores.len(),
                out.amp,
                out.freq,
            );
        }
    }

    let out = world.audio_outputs();
    println!(
        "final population {} after {:.1}s; channel amps {:?}",
        world.living_count(),
        world.t,
        out.amp
    );
    Ok(())
}
