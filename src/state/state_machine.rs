use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::state::room::{Battle, Generation, Prompt, Room};

/// Points awarded to the winner of a battle.
const WIN_BONUS: u32 = 1_000;
/// Points awarded per received vote.
const VOTE_POINTS: u32 = 100;
/// Flat award for both sides when a battle collected no votes at all.
const ZERO_VOTE_CONSOLATION: u32 = 500;

/// Phases a room moves through, from lobby to the final scoreboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GamePhase {
    /// Players are joining; the game has not started yet.
    Lobby,
    /// Short briefing before the generation phase of a round.
    Instruction,
    /// Players craft prompts and submit generated images.
    Generating,
    /// One battle is open for votes.
    Battle,
    /// The current battle outcome is shown and scored.
    Reveal,
    /// Terminal phase; the final scoreboard is displayed.
    GameOver,
}

impl GamePhase {
    /// Seconds granted to a phase when it is entered.
    pub fn timer_budget(self) -> u64 {
        match self {
            GamePhase::Lobby | GamePhase::GameOver => 0,
            GamePhase::Instruction => 15,
            GamePhase::Generating => 90,
            GamePhase::Battle => 30,
            GamePhase::Reveal => 10,
        }
    }
}

/// Side of a battle a voter can pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum VoteChoice {
    /// Vote for the submission of `player_a`.
    A,
    /// Vote for the submission of `player_b`.
    B,
}

/// Actions that can be applied to a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomAction {
    /// Host starts the game from the lobby.
    StartGame,
    /// Host skips whatever timer is currently running.
    SkipTimer,
    /// A client reports that the phase timer reached zero.
    ///
    /// Carries the phase the client believes it is expiring so that late or
    /// duplicate signals arriving after a transition are discarded.
    ExpireTimer {
        /// Phase the signalling client last observed.
        expected: GamePhase,
    },
    /// A player submits a generated image for one of their battle slots.
    SubmitGeneration {
        /// Submitting player.
        player_id: String,
        /// Prompt identifying the target battle.
        prompt_id: String,
        /// Reference to the generated image.
        image_url: String,
    },
    /// A spectator of the current battle casts a vote.
    Vote {
        /// Voting player.
        voter_id: String,
        /// Index of the battle the vote targets.
        battle_index: usize,
        /// Chosen side.
        choice: VoteChoice,
    },
}

/// Whether an action changed the room or was silently discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The room was mutated and must be persisted and broadcast.
    Applied,
    /// Idempotent no-op (stale signal, duplicate vote); nothing to persist.
    Ignored,
}

/// Error returned when an action cannot be applied from the current phase.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid action: {action:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// Phase the room was in when the action was received.
    pub from: GamePhase,
    /// The offending action.
    pub action: RoomAction,
}

/// Domain violations raised by the pure transition logic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// The action is not valid for the current phase.
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),
    /// A vote referenced a battle index outside the assigned set.
    #[error("no battle at index {index}")]
    UnknownBattle {
        /// The out-of-range index.
        index: usize,
    },
    /// The acting player is not part of the room.
    #[error("player `{player_id}` is not in this room")]
    UnknownPlayer {
        /// The unrecognised player id.
        player_id: String,
    },
    /// A battle participant tried to vote on their own battle.
    #[error("player `{voter_id}` takes part in the current battle and cannot vote")]
    ParticipantVote {
        /// The offending voter.
        voter_id: String,
    },
}

/// Apply one action to a room, mutating it in place.
///
/// This is the pure core of the server: it never touches the store, the lock,
/// or the broadcast channel, so it can be tested as data-in/data-out. Wall
/// clock stamping is the dispatcher's job; randomness is injected through
/// `rng` so prompt assignment can be made deterministic in tests.
pub fn apply_action<R>(
    room: &mut Room,
    action: RoomAction,
    rng: &mut R,
    prompt_pool: &[String],
) -> Result<ActionOutcome, TransitionError>
where
    R: Rng + ?Sized,
{
    let from = room.state;
    match action {
        RoomAction::StartGame => {
            if from != GamePhase::Lobby {
                return Err(InvalidTransition {
                    from,
                    action: RoomAction::StartGame,
                }
                .into());
            }
            enter_phase(room, GamePhase::Instruction, rng, prompt_pool);
            Ok(ActionOutcome::Applied)
        }
        RoomAction::SkipTimer => handle_timer_expiry(room, rng, prompt_pool),
        RoomAction::ExpireTimer { expected } => {
            // Stale-signal guard: several clients race to report the same
            // timeout, and a signal for a phase the room already left must
            // not skip an extra phase.
            if expected != from {
                return Ok(ActionOutcome::Ignored);
            }
            handle_timer_expiry(room, rng, prompt_pool)
        }
        RoomAction::SubmitGeneration {
            player_id,
            prompt_id,
            image_url,
        } => {
            if from != GamePhase::Generating {
                return Err(InvalidTransition {
                    from,
                    action: RoomAction::SubmitGeneration {
                        player_id,
                        prompt_id,
                        image_url,
                    },
                }
                .into());
            }
            submit_generation(room, &player_id, &prompt_id, &image_url, rng, prompt_pool)
        }
        RoomAction::Vote {
            voter_id,
            battle_index,
            choice,
        } => {
            if from != GamePhase::Battle {
                return Err(InvalidTransition {
                    from,
                    action: RoomAction::Vote {
                        voter_id,
                        battle_index,
                        choice,
                    },
                }
                .into());
            }
            record_vote(room, voter_id, battle_index, choice, rng, prompt_pool)
        }
    }
}

/// Drive the timer-expiry edge out of the current phase.
fn handle_timer_expiry<R>(
    room: &mut Room,
    rng: &mut R,
    prompt_pool: &[String],
) -> Result<ActionOutcome, TransitionError>
where
    R: Rng + ?Sized,
{
    match room.state {
        GamePhase::Instruction => {
            enter_phase(room, GamePhase::Generating, rng, prompt_pool);
            Ok(ActionOutcome::Applied)
        }
        GamePhase::Generating => {
            fill_missing_generations(room);
            enter_phase(room, GamePhase::Battle, rng, prompt_pool);
            Ok(ActionOutcome::Applied)
        }
        GamePhase::Battle => {
            enter_phase(room, GamePhase::Reveal, rng, prompt_pool);
            Ok(ActionOutcome::Applied)
        }
        GamePhase::Reveal => {
            advance_after_reveal(room, rng, prompt_pool);
            Ok(ActionOutcome::Applied)
        }
        // No timer runs in these phases; a late signal is a harmless no-op.
        GamePhase::Lobby | GamePhase::GameOver => Ok(ActionOutcome::Ignored),
    }
}

/// Move past a reveal: next battle, next round, or the final scoreboard.
fn advance_after_reveal<R>(room: &mut Room, rng: &mut R, prompt_pool: &[String])
where
    R: Rng + ?Sized,
{
    if room.current_battle_index + 1 < room.battles.len() {
        room.current_battle_index += 1;
        enter_phase(room, GamePhase::Battle, rng, prompt_pool);
    } else if room.current_round < room.total_rounds {
        room.current_round += 1;
        room.current_battle_index = 0;
        enter_phase(room, GamePhase::Instruction, rng, prompt_pool);
    } else {
        enter_phase(room, GamePhase::GameOver, rng, prompt_pool);
    }
}

/// Switch the room to `next`, reset its timer, and run the phase entry action.
fn enter_phase<R>(room: &mut Room, next: GamePhase, rng: &mut R, prompt_pool: &[String])
where
    R: Rng + ?Sized,
{
    room.state = next;
    room.timer = next.timer_budget();

    match next {
        GamePhase::Generating => assign_battles(room, rng, prompt_pool),
        GamePhase::Reveal => score_current_battle(room),
        _ => {}
    }
}

/// Build one battle per player by pairing each player with the next one in
/// join order, a rotation that covers everyone exactly once per side.
/// Prompts are drawn from a freshly shuffled pool.
fn assign_battles<R>(room: &mut Room, rng: &mut R, prompt_pool: &[String])
where
    R: Rng + ?Sized,
{
    let mut texts: Vec<String> = prompt_pool.to_vec();
    texts.shuffle(rng);

    room.battles.clear();
    room.current_battle_index = 0;

    let n = room.players.len();
    for i in 0..n {
        let text = texts
            .get(i % texts.len().max(1))
            .cloned()
            .unwrap_or_default();
        room.battles.push(Battle {
            prompt: Prompt {
                id: format!("p-{i}"),
                text,
            },
            player_a: room.players[i].id.clone(),
            player_b: room.players[(i + 1) % n].id.clone(),
            generation_a: None,
            generation_b: None,
            votes_a: 0,
            votes_b: 0,
            voter_ids: Vec::new(),
        });
    }
}

/// Auto-fill battle slots left empty at the generation deadline with the
/// placeholder image so the round can proceed.
fn fill_missing_generations(room: &mut Room) {
    for battle in &mut room.battles {
        if battle.generation_a.is_none() {
            battle.generation_a = Some(Generation::placeholder(
                battle.player_a.clone(),
                battle.prompt.id.clone(),
            ));
        }
        if battle.generation_b.is_none() {
            battle.generation_b = Some(Generation::placeholder(
                battle.player_b.clone(),
                battle.prompt.id.clone(),
            ));
        }
    }
}

/// Record a submitted image into the battle with a matching prompt and slot.
///
/// A resubmission for an already-filled slot overwrites it (redo before the
/// phase flips). Submissions that match no battle are discarded.
fn submit_generation<R>(
    room: &mut Room,
    player_id: &str,
    prompt_id: &str,
    image_url: &str,
    rng: &mut R,
    prompt_pool: &[String],
) -> Result<ActionOutcome, TransitionError>
where
    R: Rng + ?Sized,
{
    if room.find_player(player_id).is_none() {
        return Err(TransitionError::UnknownPlayer {
            player_id: player_id.to_string(),
        });
    }

    let mut touched = false;
    for battle in &mut room.battles {
        if battle.prompt.id != prompt_id {
            continue;
        }
        let generation = Generation {
            player_id: player_id.to_string(),
            prompt_id: prompt_id.to_string(),
            image_url: image_url.to_string(),
            votes: 0,
        };
        if battle.player_a == player_id {
            battle.generation_a = Some(generation.clone());
            touched = true;
        }
        if battle.player_b == player_id {
            battle.generation_b = Some(generation);
            touched = true;
        }
    }

    if !touched {
        return Ok(ActionOutcome::Ignored);
    }

    if room.all_generations_submitted() {
        enter_phase(room, GamePhase::Battle, rng, prompt_pool);
    }
    Ok(ActionOutcome::Applied)
}

/// Record a vote on the current battle, then auto-reveal once every eligible
/// voter has spoken.
fn record_vote<R>(
    room: &mut Room,
    voter_id: String,
    battle_index: usize,
    choice: VoteChoice,
    rng: &mut R,
    prompt_pool: &[String],
) -> Result<ActionOutcome, TransitionError>
where
    R: Rng + ?Sized,
{
    if battle_index >= room.battles.len() {
        return Err(TransitionError::UnknownBattle {
            index: battle_index,
        });
    }
    if room.find_player(&voter_id).is_none() {
        return Err(TransitionError::UnknownPlayer {
            player_id: voter_id,
        });
    }
    // A vote for an earlier battle arriving after the index moved on is a
    // stale signal, not an error.
    if battle_index != room.current_battle_index {
        return Ok(ActionOutcome::Ignored);
    }

    let battle = &mut room.battles[battle_index];
    if battle.player_a == voter_id || battle.player_b == voter_id {
        return Err(TransitionError::ParticipantVote { voter_id });
    }
    if battle.voter_ids.iter().any(|id| id == &voter_id) {
        return Ok(ActionOutcome::Ignored);
    }

    match choice {
        VoteChoice::A => battle.votes_a += 1,
        VoteChoice::B => battle.votes_b += 1,
    }
    battle.voter_ids.push(voter_id);

    if room.all_eligible_voters_voted() {
        enter_phase(room, GamePhase::Reveal, rng, prompt_pool);
    }
    Ok(ActionOutcome::Applied)
}

/// Score the battle at the current index into the players' totals.
///
/// Strictly more votes wins; ties break toward `player_a`. The winner gains a
/// fixed bonus and each side gains points per received vote. A battle nobody
/// voted on awards both sides a flat consolation instead.
fn score_current_battle(room: &mut Room) {
    let Some(battle) = room.battles.get(room.current_battle_index) else {
        return;
    };
    let player_a = battle.player_a.clone();
    let player_b = battle.player_b.clone();
    let (votes_a, votes_b) = (battle.votes_a, battle.votes_b);

    if votes_a == 0 && votes_b == 0 {
        award(room, &player_a, ZERO_VOTE_CONSOLATION);
        award(room, &player_b, ZERO_VOTE_CONSOLATION);
        return;
    }

    let winner = if votes_b > votes_a {
        player_b.clone()
    } else {
        player_a.clone()
    };
    award(room, &winner, WIN_BONUS);
    award(room, &player_a, votes_a * VOTE_POINTS);
    award(room, &player_b, votes_b * VOTE_POINTS);
}

fn award(room: &mut Room, player_id: &str, points: u32) {
    if let Some(player) = room.find_player_mut(player_id) {
        player.score += points;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::state::room::{FALLBACK_IMAGE_URL, Player};

    fn pool() -> Vec<String> {
        [
            "haunted toaster",
            "cyberpunk farmer",
            "a dog's fever dream",
            "samurai pizza",
        ]
        .iter()
        .map(|text| text.to_string())
        .collect()
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    fn room_with_players(n: usize) -> Room {
        let mut room = Room::new("TEST".into(), 3);
        for i in 0..n {
            room.players.push(Player {
                id: format!("p{i}"),
                nickname: format!("player-{i}"),
                avatar: "robot".into(),
                score: 0,
                is_host: i == 0,
                is_ready: false,
            });
        }
        room
    }

    fn apply(room: &mut Room, action: RoomAction) -> ActionOutcome {
        apply_action(room, action, &mut rng(), &pool()).unwrap()
    }

    fn advance_to_generating(room: &mut Room) {
        apply(room, RoomAction::StartGame);
        apply(
            room,
            RoomAction::ExpireTimer {
                expected: GamePhase::Instruction,
            },
        );
    }

    fn submit_all(room: &mut Room) {
        let slots: Vec<(String, String)> = room
            .battles
            .iter()
            .flat_map(|battle| {
                [
                    (battle.player_a.clone(), battle.prompt.id.clone()),
                    (battle.player_b.clone(), battle.prompt.id.clone()),
                ]
            })
            .collect();
        for (player_id, prompt_id) in slots {
            apply(
                room,
                RoomAction::SubmitGeneration {
                    player_id,
                    prompt_id,
                    image_url: "/images/test".into(),
                },
            );
        }
    }

    #[test]
    fn start_game_enters_instruction_with_budget() {
        let mut room = room_with_players(3);
        assert_eq!(
            apply(&mut room, RoomAction::StartGame),
            ActionOutcome::Applied
        );
        assert_eq!(room.state, GamePhase::Instruction);
        assert_eq!(room.timer, 15);
    }

    #[test]
    fn start_game_twice_is_invalid() {
        let mut room = room_with_players(3);
        apply(&mut room, RoomAction::StartGame);
        let err = apply_action(&mut room, RoomAction::StartGame, &mut rng(), &pool()).unwrap_err();
        assert!(matches!(err, TransitionError::InvalidTransition(_)));
    }

    #[test]
    fn instruction_expiry_assigns_one_battle_per_player() {
        let mut room = room_with_players(4);
        advance_to_generating(&mut room);

        assert_eq!(room.state, GamePhase::Generating);
        assert_eq!(room.timer, 90);
        assert_eq!(room.battles.len(), 4);

        let mut as_a = HashMap::new();
        let mut as_b = HashMap::new();
        for (i, battle) in room.battles.iter().enumerate() {
            *as_a.entry(battle.player_a.clone()).or_insert(0) += 1;
            *as_b.entry(battle.player_b.clone()).or_insert(0) += 1;
            assert_eq!(battle.player_a, room.players[i].id);
            assert_eq!(battle.player_b, room.players[(i + 1) % 4].id);
        }
        for player in &room.players {
            assert_eq!(as_a.get(&player.id), Some(&1));
            assert_eq!(as_b.get(&player.id), Some(&1));
        }
    }

    #[test]
    fn prompt_assignment_is_deterministic_for_a_seed() {
        let build = || {
            let mut room = room_with_players(3);
            advance_to_generating(&mut room);
            room.battles
                .iter()
                .map(|battle| battle.prompt.text.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn stale_expire_signal_is_ignored() {
        let mut room = room_with_players(3);
        apply(&mut room, RoomAction::StartGame);
        let before = room.clone();

        let outcome = apply(
            &mut room,
            RoomAction::ExpireTimer {
                expected: GamePhase::Battle,
            },
        );
        assert_eq!(outcome, ActionOutcome::Ignored);
        assert_eq!(room, before);
    }

    #[test]
    fn expire_in_lobby_is_a_noop() {
        let mut room = room_with_players(2);
        let outcome = apply(
            &mut room,
            RoomAction::ExpireTimer {
                expected: GamePhase::Lobby,
            },
        );
        assert_eq!(outcome, ActionOutcome::Ignored);
        assert_eq!(room.state, GamePhase::Lobby);
    }

    #[test]
    fn generation_deadline_fills_placeholders() {
        let mut room = room_with_players(3);
        advance_to_generating(&mut room);
        apply(
            &mut room,
            RoomAction::SubmitGeneration {
                player_id: "p0".into(),
                prompt_id: "p-0".into(),
                image_url: "/images/real".into(),
            },
        );

        apply(
            &mut room,
            RoomAction::ExpireTimer {
                expected: GamePhase::Generating,
            },
        );

        assert_eq!(room.state, GamePhase::Battle);
        for battle in &room.battles {
            assert!(battle.generation_a.is_some());
            assert!(battle.generation_b.is_some());
        }
        assert_eq!(
            room.battles[0].generation_a.as_ref().unwrap().image_url,
            "/images/real"
        );
        assert_eq!(
            room.battles[0].generation_b.as_ref().unwrap().image_url,
            FALLBACK_IMAGE_URL
        );
    }

    #[test]
    fn last_submission_auto_starts_battle() {
        let mut room = room_with_players(3);
        advance_to_generating(&mut room);
        submit_all(&mut room);
        assert_eq!(room.state, GamePhase::Battle);
        assert_eq!(room.timer, 30);
        assert_eq!(room.current_battle_index, 0);
    }

    #[test]
    fn resubmission_overwrites_slot() {
        let mut room = room_with_players(3);
        advance_to_generating(&mut room);
        for url in ["/images/first", "/images/second"] {
            apply(
                &mut room,
                RoomAction::SubmitGeneration {
                    player_id: "p0".into(),
                    prompt_id: "p-0".into(),
                    image_url: url.into(),
                },
            );
        }
        assert_eq!(
            room.battles[0].generation_a.as_ref().unwrap().image_url,
            "/images/second"
        );
    }

    #[test]
    fn submission_for_unknown_prompt_is_ignored() {
        let mut room = room_with_players(3);
        advance_to_generating(&mut room);
        let outcome = apply(
            &mut room,
            RoomAction::SubmitGeneration {
                player_id: "p0".into(),
                prompt_id: "p-99".into(),
                image_url: "/images/x".into(),
            },
        );
        assert_eq!(outcome, ActionOutcome::Ignored);
    }

    #[test]
    fn duplicate_vote_changes_nothing() {
        let mut room = room_with_players(4);
        advance_to_generating(&mut room);
        submit_all(&mut room);

        let vote = RoomAction::Vote {
            voter_id: "p2".into(),
            battle_index: 0,
            choice: VoteChoice::A,
        };
        assert_eq!(apply(&mut room, vote.clone()), ActionOutcome::Applied);
        assert_eq!(room.battles[0].votes_a, 1);

        assert_eq!(apply(&mut room, vote), ActionOutcome::Ignored);
        assert_eq!(room.battles[0].votes_a, 1);
        assert_eq!(room.battles[0].voter_ids, vec!["p2".to_string()]);
    }

    #[test]
    fn participants_cannot_vote_on_their_own_battle() {
        let mut room = room_with_players(4);
        advance_to_generating(&mut room);
        submit_all(&mut room);

        let err = apply_action(
            &mut room,
            RoomAction::Vote {
                voter_id: "p0".into(),
                battle_index: 0,
                choice: VoteChoice::A,
            },
            &mut rng(),
            &pool(),
        )
        .unwrap_err();
        assert!(matches!(err, TransitionError::ParticipantVote { .. }));
    }

    #[test]
    fn all_eligible_votes_trigger_reveal_and_scoring() {
        let mut room = room_with_players(4);
        advance_to_generating(&mut room);
        submit_all(&mut room);

        // Battle 0 is p0 vs p1; eligible voters are p2 and p3.
        apply(
            &mut room,
            RoomAction::Vote {
                voter_id: "p2".into(),
                battle_index: 0,
                choice: VoteChoice::A,
            },
        );
        assert_eq!(room.state, GamePhase::Battle);
        apply(
            &mut room,
            RoomAction::Vote {
                voter_id: "p3".into(),
                battle_index: 0,
                choice: VoteChoice::A,
            },
        );

        assert_eq!(room.state, GamePhase::Reveal);
        assert_eq!(room.timer, 10);
        // 2 votes * 100 + 1000 win bonus for p0, nothing for p1.
        assert_eq!(room.find_player("p0").unwrap().score, 1_200);
        assert_eq!(room.find_player("p1").unwrap().score, 0);
    }

    #[test]
    fn sweep_awards_vote_points_plus_win_bonus() {
        let mut room = room_with_players(5);
        advance_to_generating(&mut room);
        submit_all(&mut room);

        // Battle 0 is p0 vs p1; p2, p3 and p4 all vote A.
        for voter in ["p2", "p3", "p4"] {
            apply(
                &mut room,
                RoomAction::Vote {
                    voter_id: voter.into(),
                    battle_index: 0,
                    choice: VoteChoice::A,
                },
            );
        }

        assert_eq!(room.state, GamePhase::Reveal);
        assert_eq!(room.find_player("p0").unwrap().score, 1_300);
        assert_eq!(room.find_player("p1").unwrap().score, 0);
    }

    #[test]
    fn zero_vote_battle_awards_consolation_to_both() {
        let mut room = room_with_players(3);
        advance_to_generating(&mut room);
        submit_all(&mut room);
        apply(
            &mut room,
            RoomAction::ExpireTimer {
                expected: GamePhase::Battle,
            },
        );

        assert_eq!(room.state, GamePhase::Reveal);
        assert_eq!(room.find_player("p0").unwrap().score, 500);
        assert_eq!(room.find_player("p1").unwrap().score, 500);
        assert_eq!(room.find_player("p2").unwrap().score, 0);
    }

    #[test]
    fn tied_battle_breaks_toward_player_a() {
        let mut room = room_with_players(4);
        advance_to_generating(&mut room);
        submit_all(&mut room);
        apply(
            &mut room,
            RoomAction::Vote {
                voter_id: "p2".into(),
                battle_index: 0,
                choice: VoteChoice::A,
            },
        );
        apply(
            &mut room,
            RoomAction::Vote {
                voter_id: "p3".into(),
                battle_index: 0,
                choice: VoteChoice::B,
            },
        );

        assert_eq!(room.state, GamePhase::Reveal);
        assert_eq!(room.find_player("p0").unwrap().score, 1_100);
        assert_eq!(room.find_player("p1").unwrap().score, 100);
    }

    #[test]
    fn vote_for_a_previous_battle_is_stale() {
        let mut room = room_with_players(4);
        advance_to_generating(&mut room);
        submit_all(&mut room);
        apply(
            &mut room,
            RoomAction::ExpireTimer {
                expected: GamePhase::Battle,
            },
        );
        apply(
            &mut room,
            RoomAction::ExpireTimer {
                expected: GamePhase::Reveal,
            },
        );
        assert_eq!(room.current_battle_index, 1);

        let outcome = apply(
            &mut room,
            RoomAction::Vote {
                voter_id: "p3".into(),
                battle_index: 0,
                choice: VoteChoice::A,
            },
        );
        assert_eq!(outcome, ActionOutcome::Ignored);
        assert_eq!(room.battles[0].votes_a, 0);
    }

    #[test]
    fn reveal_walks_battles_then_rounds_then_game_over() {
        let mut room = room_with_players(3);
        room.total_rounds = 2;

        for round in 1..=2u32 {
            if round == 1 {
                apply(&mut room, RoomAction::StartGame);
            }
            assert_eq!(room.state, GamePhase::Instruction);
            assert_eq!(room.current_round, round);
            apply(
                &mut room,
                RoomAction::ExpireTimer {
                    expected: GamePhase::Instruction,
                },
            );
            submit_all(&mut room);

            for battle in 0..3usize {
                assert_eq!(room.state, GamePhase::Battle);
                assert_eq!(room.current_battle_index, battle);
                apply(
                    &mut room,
                    RoomAction::ExpireTimer {
                        expected: GamePhase::Battle,
                    },
                );
                assert_eq!(room.state, GamePhase::Reveal);
                apply(
                    &mut room,
                    RoomAction::ExpireTimer {
                        expected: GamePhase::Reveal,
                    },
                );
            }
        }

        assert_eq!(room.state, GamePhase::GameOver);
        assert_eq!(room.timer, 0);

        // Terminal: nothing moves the room any further.
        let outcome = apply(
            &mut room,
            RoomAction::ExpireTimer {
                expected: GamePhase::GameOver,
            },
        );
        assert_eq!(outcome, ActionOutcome::Ignored);
        assert_eq!(room.state, GamePhase::GameOver);
    }
}
