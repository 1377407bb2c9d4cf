//! Request payloads, identifiers and typed views of game responses.
//!
//! The client returns raw `serde_json::Value` bodies because the response
//! schema belongs to the server. The view structs below mirror what the game
//! server currently sends; every field defaults so a drifting server degrades
//! to empty values instead of a decode failure.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;

/// Opaque server-issued session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Identifier of the path a player picks on a turn.
///
/// The server numbers paths per turn, but validation is the server's job, so
/// a label is forwarded verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathId {
    Index(u32),
    Label(String),
}

impl From<u32> for PathId {
    fn from(i: u32) -> Self {
        PathId::Index(i)
    }
}

impl From<&str> for PathId {
    fn from(s: &str) -> Self {
        PathId::Label(s.to_string())
    }
}

impl From<String> for PathId {
    fn from(s: String) -> Self {
        PathId::Label(s)
    }
}

/// Body of `POST /start_game`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartGame {
    pub player_name: String,
    /// Client-supplied entropy mixed into the server seed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<String>,
}

/// Body of `POST /take_turn`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TakeTurn {
    pub session_id: SessionId,
    pub player_name: String,
    pub chosen_path_id: PathId,
    #[serde(default)]
    pub insurance: bool,
}

/// Extracts the application-level error a structurally successful response
/// may carry.
pub trait ApplicationError {
    fn application_error(&self) -> Option<String>;
}

impl ApplicationError for Value {
    fn application_error(&self) -> Option<String> {
        let err = self.get("error")?;
        if !is_truthy(err) {
            return None;
        }
        Some(match err {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}

fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Decode a typed view out of a response body.
pub trait FromBody: Sized {
    fn from_body(body: &Value) -> Result<Self, ApiError>;
}

impl<T: DeserializeOwned> FromBody for T {
    fn from_body(body: &Value) -> Result<Self, ApiError> {
        T::deserialize(body).map_err(|e| ApiError::Deserialization(e.to_string()))
    }
}

/// One selectable path on the current turn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathOption {
    pub id: u32,
    #[serde(rename = "type")]
    pub kind: String,
    pub reward: f64,
    pub risk_level: String,
    pub trap_chance: String,
    pub allows_insurance: bool,
    /// Only sent by servers running in dev mode.
    pub is_trap: Option<bool>,
}

/// A completed turn as recorded in the session history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurnRecord {
    pub turn: u32,
    pub choice: PathOption,
    pub insurance_used: bool,
    pub insurance_cost: f64,
    pub trap_hit: bool,
    pub survived: bool,
    pub outcome: String,
}

/// Fairness commitment returned by `start_game`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StartProvenance {
    pub commitment_hash: String,
    pub client_seed_used: String,
    pub session_id: String,
}

/// Game state as returned by `start_game`, `take_turn` and `game_state`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameState {
    pub session_id: Option<SessionId>,
    pub player_name: String,
    pub turn: u32,
    pub max_turns: u32,
    pub rewards: f64,
    pub alive: bool,
    pub can_use_insurance: bool,
    pub insurance_cost_preview: Option<f64>,
    pub path_options: Vec<PathOption>,
    pub last_outcome: String,
    pub history: Vec<TurnRecord>,
    pub provenance: Option<StartProvenance>,
}

impl GameState {
    /// True once the server has stopped offering paths for this session.
    pub fn is_over(&self) -> bool {
        !self.alive || self.path_options.is_empty()
    }
}

/// Seeds and pre-generated paths disclosed after a game completes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealedProvenance {
    pub server_seed: String,
    pub client_seed: Option<String>,
    pub combined_seed: String,
    pub commitment_hash: String,
    pub all_paths_revealed: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSummary {
    pub player: String,
    pub final_rewards: f64,
    pub survived: bool,
    pub turns_played: u32,
    pub history: Vec<TurnRecord>,
}

/// Body of `GET /reveal_game/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Revealed {
    pub session_id: Option<SessionId>,
    pub provenance: RevealedProvenance,
    pub game_summary: GameSummary,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Health {
    pub status: String,
    pub active_sessions: Option<u64>,
    pub dev_mode: Option<bool>,
    pub provably_fair: Option<bool>,
}

impl Health {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}
