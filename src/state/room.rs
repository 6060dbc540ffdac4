use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::state_machine::GamePhase;

/// Hard cap on simultaneous players in one room.
pub const MAX_PLAYERS: usize = 8;
/// Image reference substituted when a generation is missing or failed.
pub const FALLBACK_IMAGE_URL: &str = "/images/error_robot.png";

/// Current Unix time in milliseconds, the precision `updated_at` is stored in.
pub fn unix_time_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

/// One game session, keyed by a short room code.
///
/// This is both the runtime aggregate and the persisted document: it is
/// serialized as-is (camelCase fields, SCREAMING_SNAKE phases) into the room
/// store and onto the broadcast channel, with no version field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    /// Unique identifier, immutable after creation.
    pub room_code: String,
    /// Current phase.
    pub state: GamePhase,
    /// Players in join order; the first joiner is host.
    pub players: Vec<Player>,
    /// Battles of the current round, rebuilt on each generation phase.
    pub battles: Vec<Battle>,
    /// Which battle is currently under vote or reveal.
    pub current_battle_index: usize,
    /// Round counter, starting at 1.
    pub current_round: u32,
    /// Configured number of rounds.
    pub total_rounds: u32,
    /// Seconds remaining in the current phase as last computed server-side.
    pub timer: u64,
    /// Unix milliseconds of the last mutation; clients anchor their local
    /// countdown projection on this value.
    pub updated_at: u64,
}

impl Room {
    /// Create an empty room in the lobby phase.
    pub fn new(room_code: String, total_rounds: u32) -> Self {
        Self {
            room_code,
            state: GamePhase::Lobby,
            players: Vec::new(),
            battles: Vec::new(),
            current_battle_index: 0,
            current_round: 1,
            total_rounds,
            timer: 0,
            updated_at: unix_time_ms(),
        }
    }

    /// Whether the player cap has been reached.
    pub fn is_full(&self) -> bool {
        self.players.len() >= MAX_PLAYERS
    }

    /// Look up a player by id.
    pub fn find_player(&self, player_id: &str) -> Option<&Player> {
        self.players.iter().find(|player| player.id == player_id)
    }

    /// Look up a player by id for mutation.
    pub fn find_player_mut(&mut self, player_id: &str) -> Option<&mut Player> {
        self.players
            .iter_mut()
            .find(|player| player.id == player_id)
    }

    /// The battle currently under vote or reveal, if battles are assigned.
    pub fn current_battle(&self) -> Option<&Battle> {
        self.battles.get(self.current_battle_index)
    }

    /// Whether every battle has both generations submitted.
    pub fn all_generations_submitted(&self) -> bool {
        !self.battles.is_empty()
            && self
                .battles
                .iter()
                .all(|battle| battle.generation_a.is_some() && battle.generation_b.is_some())
    }

    /// Whether every eligible voter (everyone except the two participants of
    /// the current battle) has voted on it.
    pub fn all_eligible_voters_voted(&self) -> bool {
        let Some(battle) = self.current_battle() else {
            return false;
        };
        self.players
            .iter()
            .filter(|player| player.id != battle.player_a && player.id != battle.player_b)
            .all(|player| battle.voter_ids.iter().any(|voter| voter == &player.id))
    }

    /// Project the countdown a client should display at `now_ms`.
    ///
    /// This is the contract the frontend's local ticking implements:
    /// `max(0, timer - floor((now - updatedAt) / 1000))`. The host signals
    /// `EXPIRE_TIMER` when this reaches zero for a phase whose server timer
    /// was positive.
    pub fn remaining_seconds(&self, now_ms: u64) -> u64 {
        self.timer
            .saturating_sub(now_ms.saturating_sub(self.updated_at) / 1_000)
    }
}

/// Player info tracked inside a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    /// Stable per-session identifier chosen by the client.
    pub id: String,
    /// Display name.
    pub nickname: String,
    /// Avatar reference chosen by the player.
    pub avatar: String,
    /// Accumulated score; never decreases within a game.
    pub score: u32,
    /// Whether this player is the room host (the first joiner).
    pub is_host: bool,
    /// Lobby readiness flag surfaced to the UI; the core does not act on it.
    pub is_ready: bool,
}

/// A prompt drawn from the pool for one battle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Prompt {
    /// Identifier unique within the round (`p-{index}`).
    pub id: String,
    /// The text players generate images for.
    pub text: String,
}

/// One submitted image for a battle slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Generation {
    /// Player who submitted it.
    pub player_id: String,
    /// Prompt it answers.
    pub prompt_id: String,
    /// Reference to the image (blob route or external URL).
    pub image_url: String,
    /// Per-generation vote placeholder kept for wire compatibility; tallies
    /// live on the battle.
    pub votes: u32,
}

impl Generation {
    /// Substitute for a slot left empty when the generation deadline passed.
    pub fn placeholder(player_id: String, prompt_id: String) -> Self {
        Self {
            player_id,
            prompt_id,
            image_url: FALLBACK_IMAGE_URL.to_string(),
            votes: 0,
        }
    }
}

/// Head-to-head pairing of two players' submissions for a shared prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Battle {
    /// Prompt both sides answered.
    pub prompt: Prompt,
    /// Id of the first participant.
    pub player_a: String,
    /// Id of the second participant.
    pub player_b: String,
    /// Submission for side A, absent until submitted or auto-filled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_a: Option<Generation>,
    /// Submission for side B, absent until submitted or auto-filled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_b: Option<Generation>,
    /// Votes received by side A.
    pub votes_a: u32,
    /// Votes received by side B.
    pub votes_b: u32,
    /// Ids of players who already voted on this battle; grows monotonically.
    #[serde(default)]
    pub voter_ids: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room_with_timer(timer: u64, updated_at: u64) -> Room {
        let mut room = Room::new("ABCD".into(), 3);
        room.timer = timer;
        room.updated_at = updated_at;
        room
    }

    #[test]
    fn remaining_counts_down_from_the_update_anchor() {
        let room = room_with_timer(30, 10_000);
        assert_eq!(room.remaining_seconds(10_000), 30);
        assert_eq!(room.remaining_seconds(10_999), 30);
        assert_eq!(room.remaining_seconds(11_000), 29);
        assert_eq!(room.remaining_seconds(25_500), 15);
    }

    #[test]
    fn remaining_never_goes_negative() {
        let room = room_with_timer(5, 10_000);
        assert_eq!(room.remaining_seconds(100_000), 0);
    }

    #[test]
    fn remaining_tolerates_clock_skew_before_the_anchor() {
        let room = room_with_timer(15, 10_000);
        assert_eq!(room.remaining_seconds(9_000), 15);
    }

    #[test]
    fn room_document_round_trips_with_original_field_names() {
        let mut room = Room::new("WXYZ".into(), 3);
        room.players.push(Player {
            id: "p0".into(),
            nickname: "ada".into(),
            avatar: "robot".into(),
            score: 0,
            is_host: true,
            is_ready: false,
        });

        let json = serde_json::to_value(&room).unwrap();
        assert_eq!(json["roomCode"], "WXYZ");
        assert_eq!(json["state"], "LOBBY");
        assert_eq!(json["players"][0]["isHost"], true);
        assert_eq!(json["currentBattleIndex"], 0);

        let parsed: Room = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, room);
    }
}
