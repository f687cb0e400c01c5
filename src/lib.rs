// Re-export all public modules so they can be used from main.rs
pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod utils;

// MVC Architecture
pub mod model;
pub mod controller;
pub mod frame_loop;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use config::SimConfig;
pub use error::{AnimationError, PhysicsError};
pub use events::SimEvent;
pub use frame_loop::Simulation;
