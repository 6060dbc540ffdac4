use axum::Router;

use crate::{dto::validation::validate_room_code, error::AppError, state::SharedState};

/// Swagger UI and OpenAPI document routes.
pub mod docs;
/// Liveness endpoint.
pub mod health;
/// Image generation and blob serving endpoints.
pub mod images;
/// Room lifecycle and action endpoints.
pub mod rooms;
/// Per-room server-sent event stream.
pub mod sse;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(rooms::router())
        .merge(images::router())
        .merge(sse::router());

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}

/// Reject malformed room codes before they reach the store.
pub(crate) fn checked_room_code(code: &str) -> Result<(), AppError> {
    validate_room_code(code)
        .map_err(|_| AppError::BadRequest("room code must be 4 uppercase letters".into()))
}
