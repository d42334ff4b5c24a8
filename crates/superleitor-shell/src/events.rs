/// Surface notifications queued for the UI thread
///
/// Page-load callbacks can arrive on any platform thread. They are pushed
/// into this queue and handed to the `ShellHost` the next time the UI thread
/// drains it. Notifications are fire-and-forget.
use anyhow::Result;
use crossbeam_channel::{Receiver, Sender, unbounded};

/// Notifications emitted by the render surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// A navigation began
    PageStarted { url: String },
    /// A navigation finished loading
    PageFinished { url: String },
    /// A document or sub-resource failed to load
    LoadError {
        code: i32,
        description: String,
        url: String,
    },
}

/// Thread-safe event queue
pub struct EventQueue {
    sender: Sender<SurfaceEvent>,
    receiver: Receiver<SurfaceEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }

    /// Send an event from any thread
    pub fn send(&self, event: SurfaceEvent) -> Result<()> {
        self.sender
            .send(event)
            .map_err(|e| anyhow::anyhow!("Failed to send surface event: {}", e))
    }

    /// Drain all pending events, oldest first
    pub fn drain(&self) -> Vec<SurfaceEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.receiver.try_recv() {
            events.push(event);
        }
        events
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}
