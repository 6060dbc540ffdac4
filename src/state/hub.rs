use dashmap::DashMap;
use tokio::sync::broadcast;

use crate::dto::sse::ServerEvent;

/// Per-room broadcast channel capacity.
const HUB_CAPACITY: usize = 16;

/// Simple broadcast hub wrapper feeding one room's SSE subscribers.
pub struct SseHub {
    sender: broadcast::Sender<ServerEvent>,
}

impl SseHub {
    fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Register a new subscriber that will receive subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.sender.subscribe()
    }

    /// Send an event to all current subscribers, ignoring delivery errors.
    pub fn broadcast(&self, event: ServerEvent) {
        let _ = self.sender.send(event);
    }

    fn is_idle(&self) -> bool {
        self.sender.receiver_count() == 0
    }
}

/// Registry of broadcast hubs, one per room code, created on demand.
///
/// Rooms expire from the store on their own; hubs are reclaimed when the last
/// subscriber of a room disconnects.
#[derive(Default)]
pub struct RoomHubs {
    hubs: DashMap<String, SseHub>,
}

impl RoomHubs {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to a room's stream, creating the hub if needed.
    pub fn subscribe(&self, room_code: &str) -> broadcast::Receiver<ServerEvent> {
        self.hubs
            .entry(room_code.to_string())
            .or_insert_with(|| SseHub::new(HUB_CAPACITY))
            .subscribe()
    }

    /// Publish an event to a room's subscribers, if any.
    ///
    /// Best effort: a room without a hub or without subscribers drops the
    /// event, and clients reconcile through the room snapshot endpoint on
    /// reconnect.
    pub fn publish(&self, room_code: &str, event: ServerEvent) {
        if let Some(hub) = self.hubs.get(room_code) {
            hub.broadcast(event);
        }
    }

    /// Drop a room's hub when nobody is listening anymore.
    pub fn drop_if_idle(&self, room_code: &str) {
        self.hubs
            .remove_if(room_code, |_, hub| hub.is_idle());
    }

    /// Number of live hubs, for diagnostics.
    pub fn len(&self) -> usize {
        self.hubs.len()
    }

    /// Whether no hub is currently registered.
    pub fn is_empty(&self) -> bool {
        self.hubs.is_empty()
    }
}
