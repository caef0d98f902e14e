//! Sun / planet / moon hierarchy driven for a few frames.
//!
//! Run with `RUST_LOG=debug cargo run -p hierarchy_walk` to see the graph's own
//! diagnostics next to the per-frame positions.

use glam::Vec3;
use sylva::SceneContext;

const FRAMES: usize = 8;
const STEP: f32 = std::f32::consts::FRAC_PI_4;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut ctx = SceneContext::new();
    let sun = ctx.spawn();
    let planet = ctx.spawn_at(Vec3::new(10.0, 0.0, 0.0));
    let moon = ctx.spawn_at(Vec3::new(12.0, 0.0, 0.0));
    let probe = ctx.spawn_at(Vec3::new(0.0, 5.0, 0.0));

    ctx.graph_mut().try_attach(planet, sun)?;
    ctx.graph_mut().try_attach(moon, planet)?;

    for frame in 0..FRAMES {
        let angle = STEP * frame as f32;
        ctx.set_local_rotation(sun, Vec3::new(0.0, angle, 0.0));
        ctx.set_local_rotation(planet, Vec3::new(0.0, 2.0 * angle, 0.0));

        // Halfway through, the probe latches onto the moon without jumping.
        if frame == FRAMES / 2 {
            let before = ctx.world_position(probe);
            ctx.graph_mut().try_attach(probe, moon)?;
            log::info!(
                "probe attached to moon: {before:?} -> {:?}",
                ctx.world_position(probe)
            );
        }

        let recomputed = ctx.update();
        log::info!(
            "frame {frame}: recomputed {recomputed}, planet {:?}, moon {:?}, probe {:?}",
            ctx.world_position(planet),
            ctx.world_position(moon),
            ctx.world_position(probe),
        );
    }

    // Removing the planet promotes the moon to a root; its local offset becomes
    // its world position.
    ctx.despawn(planet);
    ctx.update();
    log::info!(
        "after despawning the planet: roots {}, moon {:?}",
        ctx.graph().get_root_ids().len(),
        ctx.world_position(moon)
    );

    Ok(())
}
