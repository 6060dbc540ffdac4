//! Room lifecycle: creation, joining, and snapshot lookups.

use rand::Rng;
use tracing::info;

use crate::{
    dto::room::PlayerInput,
    error::ServiceError,
    services::{room_lock::RoomLock, sse_events},
    state::{
        SharedState,
        room::{Player, Room, unix_time_ms},
        state_machine::GamePhase,
    },
};

const CODE_ATTEMPTS: u32 = 10;

/// Create a fresh room under a collision-free 4-letter code.
pub async fn create_room(state: &SharedState) -> Result<Room, ServiceError> {
    let store = state.require_room_store().await?;

    for _ in 0..CODE_ATTEMPTS {
        let code = random_room_code();
        if store.load_room(code.clone()).await?.is_some() {
            continue;
        }

        let room = Room::new(code.clone(), state.config().total_rounds());
        store
            .save_room(room.clone(), state.config().room_ttl())
            .await?;
        info!(room_code = %code, "room created");
        return Ok(room);
    }

    // Ten straight collisions over a 456,976-code space means the store is
    // effectively saturated.
    Err(ServiceError::InvalidState(
        "could not allocate a free room code".into(),
    ))
}

/// Add a player to a room, or hand the room back to a returning player.
pub async fn join_room(
    state: &SharedState,
    room_code: &str,
    player: PlayerInput,
) -> Result<Room, ServiceError> {
    let store = state.require_room_store().await?;
    let lock = RoomLock::acquire(store.clone(), room_code).await?;
    let result = join_locked(state, room_code, player).await;
    lock.release().await;
    result
}

async fn join_locked(
    state: &SharedState,
    room_code: &str,
    player: PlayerInput,
) -> Result<Room, ServiceError> {
    let store = state.require_room_store().await?;
    let mut room = store
        .load_room(room_code.to_string())
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("room `{room_code}` not found")))?;

    // Reconnection: the same client id re-enters at any phase without
    // touching the document.
    if room.find_player(&player.id).is_some() {
        info!(room_code, player_id = %player.id, "player reconnected");
        return Ok(room);
    }

    if room.state != GamePhase::Lobby {
        return Err(ServiceError::InvalidState(
            "game already in progress".into(),
        ));
    }
    if room.is_full() {
        return Err(ServiceError::InvalidState("room is full".into()));
    }

    let is_host = room.players.is_empty();
    room.players.push(Player {
        id: player.id.clone(),
        nickname: player.nickname,
        avatar: player.avatar.unwrap_or_default(),
        score: 0,
        is_host,
        is_ready: false,
    });
    room.updated_at = unix_time_ms();

    store
        .save_room(room.clone(), state.config().room_ttl())
        .await?;
    info!(room_code, player_id = %player.id, is_host, "player joined");
    sse_events::broadcast_room_state(state, &room);

    Ok(room)
}

/// Load the current room snapshot, for polling and reconnect reconciliation.
pub async fn get_room(state: &SharedState, room_code: &str) -> Result<Room, ServiceError> {
    let store = state.require_room_store().await?;
    store
        .load_room(room_code.to_string())
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("room `{room_code}` not found")))
}

fn random_room_code() -> String {
    let mut rng = rand::rng();
    (0..4)
        .map(|_| rng.random_range(b'A'..=b'Z') as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{config::AppConfig, dao::room_store::memory::MemoryRoomStore, state::AppState};

    async fn test_state() -> SharedState {
        let state = AppState::new(AppConfig::load());
        state
            .install_room_store(Arc::new(MemoryRoomStore::new()))
            .await;
        state
    }

    fn player(id: &str) -> PlayerInput {
        PlayerInput {
            id: id.to_string(),
            nickname: format!("Player {id}"),
            avatar: Some("robot-1".into()),
        }
    }

    #[test]
    fn room_codes_are_four_uppercase_letters() {
        for _ in 0..100 {
            let code = random_room_code();
            assert_eq!(code.len(), 4);
            assert!(code.chars().all(|c| c.is_ascii_uppercase()));
        }
    }

    #[tokio::test]
    async fn first_joiner_becomes_host() {
        let state = test_state().await;
        let room = create_room(&state).await.unwrap();

        let room = join_room(&state, &room.room_code, player("p1")).await.unwrap();
        let joined = join_room(&state, &room.room_code, player("p2")).await.unwrap();

        assert!(joined.players[0].is_host);
        assert!(!joined.players[1].is_host);
        assert_eq!(joined.players.len(), 2);
    }

    #[tokio::test]
    async fn rejoining_player_gets_the_room_unchanged() {
        let state = test_state().await;
        let room = create_room(&state).await.unwrap();
        join_room(&state, &room.room_code, player("p1")).await.unwrap();

        let rejoined = join_room(&state, &room.room_code, player("p1")).await.unwrap();
        assert_eq!(rejoined.players.len(), 1);
    }

    #[tokio::test]
    async fn full_room_rejects_new_players() {
        let state = test_state().await;
        let room = create_room(&state).await.unwrap();
        for i in 0..crate::state::room::MAX_PLAYERS {
            join_room(&state, &room.room_code, player(&format!("p{i}")))
                .await
                .unwrap();
        }

        let refused = join_room(&state, &room.room_code, player("late")).await;
        assert!(matches!(refused, Err(ServiceError::InvalidState(_))));
    }

    #[tokio::test]
    async fn joining_a_missing_room_is_not_found() {
        let state = test_state().await;
        let refused = join_room(&state, "NOPE", player("p1")).await;
        assert!(matches!(refused, Err(ServiceError::NotFound(_))));
    }
}
