//! Lock-guarded dispatch of game actions.
//!
//! Dispatch is the only write path for an existing room: take the room lock,
//! load the document, run the transition, persist, broadcast, release. The
//! pure transition logic lives in [`crate::state::state_machine`]; this
//! module owns the read-modify-write cycle around it.

use tracing::debug;

use crate::{
    error::ServiceError,
    services::{room_lock::RoomLock, sse_events},
    state::{
        SharedState,
        room::{Room, unix_time_ms},
        state_machine::{self, ActionOutcome, RoomAction},
    },
};

/// Apply `action` to the room and return the resulting document.
///
/// Ignored actions (stale timer signals, duplicate votes) return the loaded
/// room untouched: nothing is persisted and nothing is broadcast, so an
/// at-least-once client retry loop converges instead of flapping.
pub async fn dispatch(
    state: &SharedState,
    room_code: &str,
    action: RoomAction,
) -> Result<Room, ServiceError> {
    let store = state.require_room_store().await?;
    let lock = RoomLock::acquire(store.clone(), room_code).await?;
    let result = apply_locked(state, room_code, action).await;
    lock.release().await;
    result
}

async fn apply_locked(
    state: &SharedState,
    room_code: &str,
    action: RoomAction,
) -> Result<Room, ServiceError> {
    let store = state.require_room_store().await?;
    let mut room = store
        .load_room(room_code.to_string())
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("room `{room_code}` not found")))?;

    let outcome = {
        let mut rng = rand::rng();
        state_machine::apply_action(&mut room, action, &mut rng, state.config().prompts())?
    };

    match outcome {
        ActionOutcome::Ignored => {
            debug!(room_code, "action ignored as stale or duplicate");
            Ok(room)
        }
        ActionOutcome::Applied => {
            room.updated_at = unix_time_ms();
            store
                .save_room(room.clone(), state.config().room_ttl())
                .await?;
            debug!(room_code, phase = ?room.state, "room state persisted");
            sse_events::broadcast_room_state(state, &room);
            Ok(room)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::room_store::memory::MemoryRoomStore,
        dto::room::PlayerInput,
        services::room_service,
        state::{AppState, state_machine::GamePhase},
    };

    async fn lobby_with_players(count: usize) -> (SharedState, String) {
        let state = AppState::new(AppConfig::load());
        state
            .install_room_store(Arc::new(MemoryRoomStore::new()))
            .await;
        let room = room_service::create_room(&state).await.unwrap();
        for i in 0..count {
            room_service::join_room(
                &state,
                &room.room_code,
                PlayerInput {
                    id: format!("p{i}"),
                    nickname: format!("Player {i}"),
                    avatar: None,
                },
            )
            .await
            .unwrap();
        }
        (state, room.room_code)
    }

    #[tokio::test]
    async fn start_game_moves_the_room_to_instruction() {
        let (state, code) = lobby_with_players(3).await;

        let room = dispatch(&state, &code, RoomAction::StartGame).await.unwrap();
        assert_eq!(room.state, GamePhase::Instruction);
        assert_eq!(room.timer, GamePhase::Instruction.timer_budget());

        // The persisted copy matches what was returned.
        let stored = room_service::get_room(&state, &code).await.unwrap();
        assert_eq!(stored, room);
    }

    #[tokio::test]
    async fn stale_expiry_leaves_the_stored_room_alone() {
        let (state, code) = lobby_with_players(3).await;
        dispatch(&state, &code, RoomAction::StartGame).await.unwrap();
        let before = room_service::get_room(&state, &code).await.unwrap();

        // Reports Lobby, but the room is in Instruction.
        let after = dispatch(
            &state,
            &code,
            RoomAction::ExpireTimer {
                expected: GamePhase::Lobby,
            },
        )
        .await
        .unwrap();

        assert_eq!(after, before);
        assert_eq!(room_service::get_room(&state, &code).await.unwrap(), before);
    }

    #[tokio::test]
    async fn invalid_transition_maps_to_invalid_state() {
        let (state, code) = lobby_with_players(3).await;

        let refused = dispatch(
            &state,
            &code,
            RoomAction::SubmitGeneration {
                player_id: "p0".into(),
                prompt_id: "p-0".into(),
                image_url: "/images/foo".into(),
            },
        )
        .await;
        assert!(matches!(refused, Err(ServiceError::InvalidState(_))));
    }

    #[tokio::test]
    async fn dispatch_against_a_missing_room_is_not_found() {
        let (state, _code) = lobby_with_players(1).await;
        let refused = dispatch(&state, "NOPE", RoomAction::StartGame).await;
        assert!(matches!(refused, Err(ServiceError::NotFound(_))));
    }
}
