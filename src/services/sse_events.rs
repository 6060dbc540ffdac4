use serde::Serialize;
use tracing::warn;

use crate::{
    dto::{room::RoomSnapshot, sse::ServerEvent},
    state::{SharedState, room::Room},
};

/// Event carrying the full room snapshot after a state change.
pub const EVENT_STATE_UPDATE: &str = "state-update";
/// Event carrying a human-readable room-scoped error.
pub const EVENT_ERROR: &str = "error";

/// Name of the per-player event announcing finished image candidates.
pub fn image_ready_event(player_id: &str) -> String {
    format!("image-generated:{player_id}")
}

#[derive(Serialize)]
struct ErrorEvent<'a> {
    message: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageReadyEvent<'a> {
    image_urls: &'a [String],
}

/// Broadcast the room's new state to everyone subscribed to it.
pub fn broadcast_room_state(state: &SharedState, room: &Room) {
    let snapshot = RoomSnapshot::from(room.clone());
    send_room_event(state, &room.room_code, EVENT_STATE_UPDATE, &snapshot);
}

/// Broadcast a room-scoped error message.
pub fn broadcast_room_error(state: &SharedState, room_code: &str, message: &str) {
    send_room_event(state, room_code, EVENT_ERROR, &ErrorEvent { message });
}

/// Announce to a room that a player's image candidates are ready.
pub fn broadcast_image_ready(
    state: &SharedState,
    room_code: &str,
    player_id: &str,
    image_urls: &[String],
) {
    let event = image_ready_event(player_id);
    send_room_event(state, room_code, &event, &ImageReadyEvent { image_urls });
}

fn send_room_event<T: Serialize>(state: &SharedState, room_code: &str, event: &str, payload: &T) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(message) => state.hubs().publish(room_code, message),
        Err(err) => {
            warn!(room_code, event, error = %err, "failed to serialize SSE payload");
        }
    }
}
