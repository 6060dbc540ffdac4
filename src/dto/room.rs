use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dto::validation::{validate_nickname, validate_player_id},
    state::room::{Room, unix_time_ms},
};

/// Incoming player identity; the client chooses a stable `id` so a dropped
/// connection can rejoin as the same player.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct PlayerInput {
    /// Client-chosen identifier, stable across reconnects.
    #[validate(custom(function = validate_player_id))]
    pub id: String,
    /// Display name shown to the rest of the room.
    #[validate(custom(function = validate_nickname))]
    pub nickname: String,
    /// Avatar identifier picked on the client, passed through untouched.
    #[serde(default)]
    pub avatar: Option<String>,
}

/// Payload of `POST /rooms/{code}/join`.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct JoinRoomRequest {
    /// Identity of the joining player.
    #[validate(nested)]
    pub player: PlayerInput,
}

/// Answer of `POST /rooms`, carrying the freshly minted room code.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomResponse {
    /// Four-letter code players use to join.
    pub room_code: String,
}

/// Room state as served to clients: the persisted document plus the projected
/// countdown, so clients never need the server clock.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoomSnapshot {
    /// Persisted room document, flattened into the response body.
    #[serde(flatten)]
    pub room: Room,
    /// Seconds left on the current phase timer, clamped at zero.
    pub remaining: u64,
}

impl From<Room> for RoomSnapshot {
    fn from(room: Room) -> Self {
        let remaining = room.remaining_seconds(unix_time_ms());
        Self { room, remaining }
    }
}
