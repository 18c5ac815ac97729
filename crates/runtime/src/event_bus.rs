use crate::frame::Frame;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EventKind {
    AreaSelected,
    ReturnedToMenu,
    ManifestApplied,
    ManifestRejected,
    PanoramaReady,
    PanoramaFailed,
    HotspotPlaced,
}

/// Feedback record for the host UI (status line, debug log).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub frame_index: u64,
    pub kind: EventKind,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct EventBus {
    frame_index: u64,
    events: Vec<Event>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp subsequent events with `frame`'s index.
    pub fn begin_frame(&mut self, frame: Frame) {
        self.frame_index = frame.index;
    }

    pub fn emit(&mut self, kind: EventKind, message: impl Into<String>) {
        self.events.push(Event {
            frame_index: self.frame_index,
            kind,
            message: message.into(),
        });
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}
