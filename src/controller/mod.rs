// CONTROLLER: input sampling and the per-frame systems
pub mod input;
pub mod shortcuts;
pub mod physics;
pub mod locomotion;
pub mod animation;
pub mod camera_controller;

pub use input::{InputEvent, InputProcessor, InputState, KeyBindings};
pub use shortcuts::{Action, ShortcutDispatcher};
pub use physics::{PhysicsResult, PhysicsSystem};
pub use locomotion::{LocomotionController, LocomotionFrame, MotionClass};
pub use animation::{AnimationBlender, ScheduledTransition, TransitionRecord};
pub use camera_controller::CameraRig;
