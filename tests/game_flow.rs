//! End-to-end game flows running through the dispatcher against the
//! in-memory store, the same code path HTTP handlers take.

use std::sync::Arc;

use prompt_clash_back::{
    config::AppConfig,
    dao::room_store::{lock_key, memory::MemoryRoomStore},
    dto::room::PlayerInput,
    error::ServiceError,
    services::{action_service, room_service},
    state::{
        AppState, SharedState,
        room::Room,
        state_machine::{GamePhase, RoomAction, VoteChoice},
    },
};

fn player(i: usize) -> PlayerInput {
    PlayerInput {
        id: format!("p{i}"),
        nickname: format!("Player {i}"),
        avatar: Some(format!("robot-{i}")),
    }
}

async fn lobby(players: usize) -> (SharedState, String) {
    let state = AppState::new(AppConfig::load());
    state
        .install_room_store(Arc::new(MemoryRoomStore::new()))
        .await;

    let room = room_service::create_room(&state).await.unwrap();
    for i in 0..players {
        room_service::join_room(&state, &room.room_code, player(i))
            .await
            .unwrap();
    }
    (state, room.room_code)
}

async fn current(state: &SharedState, code: &str) -> Room {
    room_service::get_room(state, code).await.unwrap()
}

async fn expire(state: &SharedState, code: &str, phase: GamePhase) -> Room {
    action_service::dispatch(state, code, RoomAction::ExpireTimer { expected: phase })
        .await
        .unwrap()
}

/// Submit an image for both slots of every battle; the last submission flips
/// the room into the battle phase.
async fn submit_all(state: &SharedState, code: &str) {
    let room = current(state, code).await;
    for battle in &room.battles {
        for player_id in [&battle.player_a, &battle.player_b] {
            action_service::dispatch(
                state,
                code,
                RoomAction::SubmitGeneration {
                    player_id: player_id.clone(),
                    prompt_id: battle.prompt.id.clone(),
                    image_url: format!("/images/{}-{player_id}", battle.prompt.id),
                },
            )
            .await
            .unwrap();
        }
    }
}

#[tokio::test]
async fn full_game_walks_to_game_over() {
    let (state, code) = lobby(3).await;
    let room = action_service::dispatch(&state, &code, RoomAction::StartGame)
        .await
        .unwrap();
    assert_eq!(room.state, GamePhase::Instruction);

    let mut guard = 0;
    loop {
        guard += 1;
        assert!(guard < 100, "game did not converge");

        let room = current(&state, &code).await;
        match room.state {
            GamePhase::Instruction => {
                let room = expire(&state, &code, GamePhase::Instruction).await;
                assert_eq!(room.state, GamePhase::Generating);
                assert_eq!(room.battles.len(), 3);
            }
            GamePhase::Generating => submit_all(&state, &code).await,
            GamePhase::Battle => {
                expire(&state, &code, GamePhase::Battle).await;
            }
            GamePhase::Reveal => {
                expire(&state, &code, GamePhase::Reveal).await;
            }
            GamePhase::GameOver => break,
            GamePhase::Lobby => unreachable!("start was dispatched"),
        }
    }

    let room = current(&state, &code).await;
    assert_eq!(room.state, GamePhase::GameOver);
    assert_eq!(room.current_round, room.total_rounds);
    // Every battle went scoreless, so both sides of each collected the
    // consolation award every round.
    assert!(room.players.iter().all(|p| p.score > 0));
}

#[tokio::test]
async fn concurrent_votes_both_count_and_close_the_battle() {
    let (state, code) = lobby(4).await;
    action_service::dispatch(&state, &code, RoomAction::StartGame)
        .await
        .unwrap();
    expire(&state, &code, GamePhase::Instruction).await;
    // Skip the generation window; empty slots are backfilled.
    let room = expire(&state, &code, GamePhase::Generating).await;
    assert_eq!(room.state, GamePhase::Battle);

    let battle = &room.battles[0];
    let voters: Vec<String> = room
        .players
        .iter()
        .map(|p| p.id.clone())
        .filter(|id| id != &battle.player_a && id != &battle.player_b)
        .collect();
    assert_eq!(voters.len(), 2);

    let vote = |voter_id: String, choice: VoteChoice| {
        let state = state.clone();
        let code = code.clone();
        async move {
            action_service::dispatch(
                &state,
                &code,
                RoomAction::Vote {
                    voter_id,
                    battle_index: 0,
                    choice,
                },
            )
            .await
        }
    };

    let (first, second) = tokio::join!(
        vote(voters[0].clone(), VoteChoice::A),
        vote(voters[1].clone(), VoteChoice::B)
    );
    first.unwrap();
    second.unwrap();

    let room = current(&state, &code).await;
    assert_eq!(room.state, GamePhase::Reveal);
    assert_eq!(room.battles[0].votes_a + room.battles[0].votes_b, 2);
}

#[tokio::test]
async fn duplicate_vote_is_silently_ignored() {
    let (state, code) = lobby(4).await;
    action_service::dispatch(&state, &code, RoomAction::StartGame)
        .await
        .unwrap();
    expire(&state, &code, GamePhase::Instruction).await;
    let room = expire(&state, &code, GamePhase::Generating).await;

    let battle = &room.battles[0];
    let voter = room
        .players
        .iter()
        .map(|p| p.id.clone())
        .find(|id| id != &battle.player_a && id != &battle.player_b)
        .unwrap();

    for _ in 0..2 {
        action_service::dispatch(
            &state,
            &code,
            RoomAction::Vote {
                voter_id: voter.clone(),
                battle_index: 0,
                choice: VoteChoice::A,
            },
        )
        .await
        .unwrap();
    }

    let room = current(&state, &code).await;
    // One of the two eligible voters is still outstanding.
    assert_eq!(room.state, GamePhase::Battle);
    assert_eq!(room.battles[0].votes_a, 1);
}

#[tokio::test]
async fn joining_mid_game_is_refused() {
    let (state, code) = lobby(3).await;
    action_service::dispatch(&state, &code, RoomAction::StartGame)
        .await
        .unwrap();

    let refused = room_service::join_room(&state, &code, player(9)).await;
    assert!(matches!(refused, Err(ServiceError::InvalidState(_))));
}

#[tokio::test(start_paused = true)]
async fn contended_room_reports_busy() {
    let (state, code) = lobby(3).await;

    // Park a foreign lock holder so dispatch exhausts its retry budget.
    let store = state.room_store().await.unwrap();
    store
        .acquire_lock(lock_key(&code), "foreign-holder".into(), 600_000)
        .await
        .unwrap();

    let refused = action_service::dispatch(&state, &code, RoomAction::StartGame).await;
    assert!(matches!(refused, Err(ServiceError::Busy(_))));
}
