use serde::Deserialize;
use utoipa::ToSchema;

use crate::state::state_machine::{GamePhase, RoomAction, VoteChoice};

/// Payload of `POST /rooms/{code}/action`.
///
/// Adjacently tagged so the wire shape is `{"action": "...", "payload": {...}}`
/// with the payload omitted for parameterless actions.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(
    tag = "action",
    content = "payload",
    rename_all = "SCREAMING_SNAKE_CASE"
)]
pub enum ActionRequest {
    /// Host starts the game.
    StartGame,
    /// Host cuts the current timer short.
    SkipTimer,
    /// A client saw the countdown hit zero.
    #[serde(rename_all = "camelCase")]
    ExpireTimer {
        /// Phase the client last observed.
        expected_state: GamePhase,
    },
    /// A player submits a generated image.
    #[serde(rename_all = "camelCase")]
    SubmitGeneration {
        /// Submitting player.
        player_id: String,
        /// Prompt the image answers.
        prompt_id: String,
        /// URL of the generated image.
        image_url: String,
    },
    /// A spectator votes on the current battle.
    #[serde(rename_all = "camelCase")]
    Vote {
        /// Voting player.
        voter_id: String,
        /// Battle the vote targets, by position in the round.
        battle_index: usize,
        /// Which contender the vote goes to.
        choice: VoteChoice,
    },
}

impl From<ActionRequest> for RoomAction {
    fn from(request: ActionRequest) -> Self {
        match request {
            ActionRequest::StartGame => RoomAction::StartGame,
            ActionRequest::SkipTimer => RoomAction::SkipTimer,
            ActionRequest::ExpireTimer { expected_state } => RoomAction::ExpireTimer {
                expected: expected_state,
            },
            ActionRequest::SubmitGeneration {
                player_id,
                prompt_id,
                image_url,
            } => RoomAction::SubmitGeneration {
                player_id,
                prompt_id,
                image_url,
            },
            ActionRequest::Vote {
                voter_id,
                battle_index,
                choice,
            } => RoomAction::Vote {
                voter_id,
                battle_index,
                choice,
            },
        }
    }
}
