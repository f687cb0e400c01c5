use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnimationError {
    #[error("no clip registered for animation state `{0}`")]
    UnknownState(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PhysicsError {
    #[error("non-finite {field} after physics step, restored last known-good state")]
    NonFinite { field: &'static str },
}
