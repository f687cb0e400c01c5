use std::collections::HashMap;

use crate::model::CameraMode;

/// Discrete commands bound to single key presses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CycleCameraMode,
    SetCameraMode(CameraMode),
    ResetCamera,
    Respawn,
}

/// Key -> action table, owned by whoever composes the simulation
#[derive(Debug, Clone)]
pub struct ShortcutDispatcher {
    bindings: HashMap<String, Action>,
}

impl Default for ShortcutDispatcher {
    fn default() -> Self {
        let mut d = Self::empty();
        d.bind("c", Action::CycleCameraMode);
        d.bind("1", Action::SetCameraMode(CameraMode::Follow));
        d.bind("2", Action::SetCameraMode(CameraMode::Orbit));
        d.bind("3", Action::SetCameraMode(CameraMode::FixedAngle));
        d.bind("4", Action::SetCameraMode(CameraMode::Cinematic));
        d.bind("Home", Action::ResetCamera);
        d.bind("r", Action::Respawn);
        d
    }
}

impl ShortcutDispatcher {
    pub fn empty() -> Self {
        Self { bindings: HashMap::new() }
    }

    /// Keys are matched case-insensitively; rebinding a key replaces its action
    pub fn bind(&mut self, key: &str, action: Action) {
        self.bindings.insert(key.to_lowercase(), action);
    }

    pub fn unbind(&mut self, key: &str) -> Option<Action> {
        self.bindings.remove(&key.to_lowercase())
    }

    pub fn dispatch(&self, key: &str) -> Option<Action> {
        self.bindings.get(&key.to_lowercase()).copied()
    }
}
