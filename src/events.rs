/// Discrete notifications for audio and haptics collaborators
#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    AnimationChanged(String),
    GroundedChanged(bool),
}

/// Outbox filled during a frame and drained by the host afterwards
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Vec<SimEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: SimEvent) {
        tracing::trace!(?event, "sim event");
        self.events.push(event);
    }

    pub fn extend(&mut self, events: impl IntoIterator<Item = SimEvent>) {
        for e in events {
            self.push(e);
        }
    }

    pub fn drain(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
