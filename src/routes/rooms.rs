use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use validator::Validate;

use crate::{
    dto::{
        action::ActionRequest,
        room::{CreateRoomResponse, JoinRoomRequest, RoomSnapshot},
    },
    error::AppError,
    routes::checked_room_code,
    services::{action_service, room_service},
    state::SharedState,
};

/// Routes handling the room lifecycle and action dispatch.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/rooms", post(create_room))
        .route("/rooms/{code}", get(get_room))
        .route("/rooms/{code}/join", post(join_room))
        .route("/rooms/{code}/action", post(dispatch_action))
}

/// Create a fresh room and return its join code.
#[utoipa::path(
    post,
    path = "/rooms",
    tag = "rooms",
    responses(
        (status = 200, description = "Room created", body = CreateRoomResponse),
        (status = 503, description = "Storage unavailable")
    )
)]
pub async fn create_room(
    State(state): State<SharedState>,
) -> Result<Json<CreateRoomResponse>, AppError> {
    let room = room_service::create_room(&state).await?;
    Ok(Json(CreateRoomResponse {
        room_code: room.room_code,
    }))
}

/// Current room snapshot, used by clients to reconcile after a reconnect.
#[utoipa::path(
    get,
    path = "/rooms/{code}",
    tag = "rooms",
    params(("code" = String, Path, description = "4-letter room code")),
    responses(
        (status = 200, description = "Room snapshot", body = RoomSnapshot),
        (status = 404, description = "Room not found or expired")
    )
)]
pub async fn get_room(
    State(state): State<SharedState>,
    Path(code): Path<String>,
) -> Result<Json<RoomSnapshot>, AppError> {
    checked_room_code(&code)?;
    let room = room_service::get_room(&state, &code).await?;
    Ok(Json(RoomSnapshot::from(room)))
}

/// Join a room, or re-enter it as a returning player.
#[utoipa::path(
    post,
    path = "/rooms/{code}/join",
    tag = "rooms",
    params(("code" = String, Path, description = "4-letter room code")),
    request_body = JoinRoomRequest,
    responses(
        (status = 200, description = "Joined", body = RoomSnapshot),
        (status = 404, description = "Room not found or expired"),
        (status = 409, description = "Room full or game already running")
    )
)]
pub async fn join_room(
    State(state): State<SharedState>,
    Path(code): Path<String>,
    Json(payload): Json<JoinRoomRequest>,
) -> Result<Json<RoomSnapshot>, AppError> {
    checked_room_code(&code)?;
    payload.validate()?;
    let room = room_service::join_room(&state, &code, payload.player).await?;
    Ok(Json(RoomSnapshot::from(room)))
}

/// Apply a game action to the room and return the resulting snapshot.
#[utoipa::path(
    post,
    path = "/rooms/{code}/action",
    tag = "rooms",
    params(("code" = String, Path, description = "4-letter room code")),
    request_body = ActionRequest,
    responses(
        (status = 200, description = "Action processed", body = RoomSnapshot),
        (status = 404, description = "Room not found or expired"),
        (status = 409, description = "Room busy or action not valid in the current phase")
    )
)]
pub async fn dispatch_action(
    State(state): State<SharedState>,
    Path(code): Path<String>,
    Json(payload): Json<ActionRequest>,
) -> Result<Json<RoomSnapshot>, AppError> {
    checked_room_code(&code)?;
    let room = action_service::dispatch(&state, &code, payload.into()).await?;
    Ok(Json(RoomSnapshot::from(room)))
}
