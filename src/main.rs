use anyhow::Result;
use glam::Vec3;

// Import from the library crate
use wayfarer::{config, logging};
use wayfarer::controller::InputEvent;
use wayfarer::frame_loop::Simulation;
use wayfarer::model::{Clip, Collider, StaticWorld};
use wayfarer::SimEvent;

const FRAME_DT: f32 = 1.0 / 60.0;

/// Floor, a wall to run into, a step up and a trigger pad
fn demo_level() -> StaticWorld {
    StaticWorld::with_colliders(vec![
        Collider::new(Vec3::new(0.0, -0.5, 0.0), Vec3::new(40.0, 0.5, 40.0)),
        Collider::new(Vec3::new(0.0, 1.5, -12.0), Vec3::new(6.0, 1.5, 0.5)),
        Collider::new(Vec3::new(6.0, 0.25, -4.0), Vec3::new(2.0, 0.25, 2.0)),
        Collider::trigger(Vec3::new(-4.0, 0.5, 0.0), Vec3::new(1.0, 0.5, 1.0)),
    ])
}

/// Which keys go down / up on which frame
fn script(frame: u32) -> Vec<InputEvent> {
    let down = |k: &str| InputEvent::KeyDown(k.to_string());
    let up = |k: &str| InputEvent::KeyUp(k.to_string());
    match frame {
        30 => vec![down("w")],
        120 => vec![down("Shift")],
        300 => vec![down(" ")],
        302 => vec![up(" ")],
        420 => vec![up("Shift"), down("d")],
        480 => vec![InputEvent::Wheel { delta_y: 300.0 }],
        540 => vec![up("w"), up("d"), down("c")],
        541 => vec![up("c"), InputEvent::PointerDrag { dx: 120.0, dy: -40.0 }],
        _ => Vec::new(),
    }
}

fn main() -> Result<()> {
    logging::init();
    let cfg = config::load_default()?;
    tracing::info!(walk = cfg.movement.walk_speed, run = cfg.movement.run_speed, "config loaded");

    let mut sim = Simulation::new(cfg, demo_level(), Vec3::new(0.0, 0.9, 0.0));
    for (state, duration) in [("idle", 2.0), ("walk", 1.0), ("run", 0.7)] {
        sim.register_clip(state, Clip::looping(duration));
    }
    sim.register_clip("jump", Clip::once(0.6));
    sim.register_clip("land", Clip::once(0.25));

    for frame in 0..720u32 {
        for event in script(frame) {
            sim.handle_event(event);
        }
        sim.step(FRAME_DT);

        for event in sim.drain_events() {
            match event {
                SimEvent::AnimationChanged(state) => tracing::info!(frame, %state, "animation"),
                SimEvent::GroundedChanged(grounded) => tracing::debug!(frame, grounded, "grounded"),
            }
        }

        if frame % 60 == 59 {
            let snap = sim.snapshot();
            let cam = sim.camera_transform();
            tracing::info!(
                t = %format!("{:.1}s", sim.time()),
                pos = ?snap.position,
                speed = %format!("{:.2}", snap.velocity.x.hypot(snap.velocity.z)),
                stamina = %format!("{:.1}", snap.stamina),
                sprint = snap.is_sprinting,
                grounded = snap.is_grounded,
                anim = snap.animation_state.as_deref().unwrap_or("-"),
                camera = ?cam.position,
                mode = ?sim.rig().mode(),
                "snapshot"
            );
        }
    }

    Ok(())
}
