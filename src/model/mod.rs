// MODEL: Simulation state and data
pub mod character;
pub mod collider;
pub mod camera;
pub mod clip;

pub use character::{CharacterState, CharacterSnapshot, InputIntent};
pub use collider::{Aabb, Collider, StaticWorld, WorldQuery};
pub use camera::{Camera, CameraMode, CameraState, CameraTransform, CameraUniform, OrbitAngles};
pub use clip::{Clip, MotionClip};
