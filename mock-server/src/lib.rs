//! In-memory stand-in for the Cave Explorer game server.
//!
//! Mirrors the server's routes and response shapes closely enough to drive
//! the client end to end. Game play is scripted: every turn offers the same
//! three paths, none of them is a trap, and a game completes after
//! `MAX_TURNS` turns. Unknown sessions answer 404 on the id-addressed routes.
//!
//! Provenance is real: the combined seed and the commitment hash are derived
//! the same way the game server derives them, so a revealed game verifies.

use std::{collections::HashMap, fmt::Write, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

pub const MAX_TURNS: u32 = 6;
pub const INSURANCE_RATE: f64 = 0.3;
const DEFAULT_CLIENT_SEED: &str = "default_client_seed";
/// Dev mode reveals `is_trap` on offered paths.
pub const DEV_MODE: bool = true;

/// `(type, reward, risk_level, trap_chance)` for path ids 0, 1 and 2.
const PATHS: [(&str, f64, &str, &str); 3] = [
    ("standard", 0.15, "Low", "15%"),
    ("premium", 0.4, "Medium", "30%"),
    ("hrhr", 0.6, "High", "50%"),
];

#[derive(Debug, Deserialize)]
pub struct StartGame {
    pub player_name: String,
    #[serde(default)]
    pub seed: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TakeTurn {
    pub player_name: String,
    pub session_id: String,
    pub chosen_path_id: Value,
    #[serde(default)]
    pub insurance: bool,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub player_name: String,
    pub turn: u32,
    pub rewards: f64,
    pub alive: bool,
    pub completed: bool,
    pub history: Vec<Value>,
    pub server_seed: String,
    pub client_seed: Option<String>,
    pub combined_seed: String,
    pub commitment_hash: String,
}

impl Session {
    fn new(session_id: &str, player_name: String, client_seed: Option<String>) -> Self {
        let server_seed = sha256_hex(Uuid::new_v4().as_bytes());
        Self::with_server_seed(session_id, player_name, client_seed, server_seed)
    }

    fn with_server_seed(
        session_id: &str,
        player_name: String,
        client_seed: Option<String>,
        server_seed: String,
    ) -> Self {
        let combined_seed = sha256_hex(
            format!("{server_seed}:{}:{session_id}", client_seed_used(&client_seed)).as_bytes(),
        );
        let commitment_hash = commitment_hash(&server_seed);
        Self {
            player_name,
            turn: 1,
            rewards: 0.0,
            alive: true,
            completed: false,
            history: Vec::new(),
            server_seed,
            client_seed,
            combined_seed,
            commitment_hash,
        }
    }

    fn can_insure(&self) -> bool {
        self.turn > 1 && self.alive && self.rewards > 0.0
    }

    fn state_body(&self, session_id: &str, outcome: &str) -> Value {
        let offering = self.alive && self.turn <= MAX_TURNS;
        let path_options: Vec<Value> = if offering {
            (0..PATHS.len())
                .map(|id| {
                    let mut option = path_json(id);
                    option["allows_insurance"] =
                        json!(self.turn > 1 && PATHS[id].0 != "hrhr" && self.rewards > 0.0);
                    option
                })
                .collect()
        } else {
            Vec::new()
        };
        json!({
            "session_id": session_id,
            "player_name": self.player_name,
            "turn": self.turn,
            "max_turns": MAX_TURNS,
            "rewards": round2(self.rewards),
            "alive": self.alive,
            "can_use_insurance": self.can_insure(),
            "insurance_cost_preview": self.can_insure().then(|| round2(INSURANCE_RATE * self.rewards)),
            "path_options": path_options,
            "last_outcome": outcome,
            "history": self.history,
        })
    }
}

pub type Db = Arc<RwLock<HashMap<String, Session>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/start_game", post(start_game))
        .route("/take_turn", post(take_turn))
        .route("/game_state/{id}", get(game_state))
        .route("/reveal_game/{id}", get(reveal_game))
        .route("/session/{id}", delete(end_session))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn root() -> Json<Value> {
    Json(json!({"message": "Cave Explorer API is running!"}))
}

async fn health(State(db): State<Db>) -> Json<Value> {
    let sessions = db.read().await;
    Json(json!({
        "status": "healthy",
        "active_sessions": sessions.len(),
        "dev_mode": DEV_MODE,
        "provably_fair": true,
    }))
}

async fn start_game(State(db): State<Db>, Json(input): Json<StartGame>) -> Json<Value> {
    let id = Uuid::new_v4().to_string();
    let session = Session::new(&id, input.player_name, input.seed);
    let mut body = session.state_body(
        &id,
        &format!(
            "Welcome {}! Game created with provable fairness.",
            session.player_name
        ),
    );
    body["provenance"] = json!({
        "commitment_hash": session.commitment_hash,
        "client_seed_used": client_seed_used(&session.client_seed),
        "session_id": id,
    });
    info!(session_id = %id, player = %session.player_name, "session started");
    db.write().await.insert(id, session);
    Json(body)
}

async fn take_turn(State(db): State<Db>, Json(input): Json<TakeTurn>) -> Json<Value> {
    let mut sessions = db.write().await;
    let Some(session) = sessions.get_mut(&input.session_id) else {
        return app_error("Invalid session ID.");
    };
    if !session.alive {
        return app_error("Game already ended.");
    }
    if session.turn > MAX_TURNS {
        return app_error("Maximum turns exceeded.");
    }
    let Some(id) = input
        .chosen_path_id
        .as_u64()
        .map(|id| id as usize)
        .filter(|id| *id < PATHS.len())
    else {
        return app_error("Invalid path choice.");
    };
    let (kind, reward, _, _) = PATHS[id];

    if input.insurance && session.turn == 1 {
        return app_error("Insurance not available on turn 1.");
    }
    if input.insurance && kind == "hrhr" {
        return app_error("Insurance not available for High Risk High Reward paths.");
    }
    if input.insurance && session.rewards <= 0.0 {
        return app_error("No rewards to insure.");
    }

    let insurance_cost = if input.insurance {
        INSURANCE_RATE * session.rewards
    } else {
        0.0
    };
    session.rewards += reward - insurance_cost;
    let mut outcome = format!("Safe! Found {reward:.2} tokens.");
    if input.insurance {
        outcome.push_str(&format!(" Insurance cost: -{insurance_cost:.2} tokens"));
    }

    let mut choice = path_json(id);
    choice["is_trap"] = json!(false);
    session.history.push(json!({
        "turn": session.turn,
        "choice": choice,
        "insurance_used": input.insurance,
        "insurance_cost": insurance_cost,
        "trap_hit": false,
        "survived": true,
        "outcome": outcome,
    }));

    session.turn += 1;
    let outcome = if session.turn > MAX_TURNS {
        session.alive = false;
        session.completed = true;
        info!(session_id = %input.session_id, player = %input.player_name, "game completed");
        format!("{outcome} VICTORY! You completed all {MAX_TURNS} turns!")
    } else {
        format!("{outcome} (Turn {} complete)", session.turn - 1)
    };
    Json(session.state_body(&input.session_id, &outcome))
}

async fn game_state(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    let sessions = db.read().await;
    let session = sessions.get(&id).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(session.state_body(&id, "Current game state")))
}

async fn reveal_game(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    let sessions = db.read().await;
    let session = sessions.get(&id).ok_or(StatusCode::NOT_FOUND)?;
    if !session.completed {
        return Ok(app_error(
            "Game must be completed before revealing provenance",
        ));
    }
    let all_paths_revealed: Vec<Value> = (1..=MAX_TURNS)
        .map(|turn| {
            let paths: Vec<Value> = PATHS
                .iter()
                .map(|(kind, reward, _, _)| {
                    json!({"type": kind, "reward": reward, "is_trap": false})
                })
                .collect();
            json!({"turn": turn, "paths": paths})
        })
        .collect();
    Ok(Json(json!({
        "session_id": id,
        "provenance": {
            "server_seed": session.server_seed,
            "client_seed": session.client_seed,
            "combined_seed": session.combined_seed,
            "commitment_hash": session.commitment_hash,
            "all_paths_revealed": all_paths_revealed,
        },
        "game_summary": {
            "player": session.player_name,
            "final_rewards": session.rewards,
            "survived": session.completed,
            "turns_played": session.history.len(),
            "history": session.history,
        },
    })))
}

async fn end_session(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    let mut sessions = db.write().await;
    sessions.remove(&id).ok_or(StatusCode::NOT_FOUND)?;
    info!(session_id = %id, "session ended");
    Ok(Json(json!({"message": "Session ended"})))
}

fn app_error(message: &str) -> Json<Value> {
    Json(json!({ "error": message }))
}

/// Path as offered to the player. Dev mode exposes `is_trap`.
fn path_json(id: usize) -> Value {
    let (kind, reward, risk_level, trap_chance) = PATHS[id];
    let mut path = json!({
        "id": id,
        "type": kind,
        "reward": reward,
        "risk_level": risk_level,
        "trap_chance": trap_chance,
    });
    if DEV_MODE {
        path["is_trap"] = json!(false);
    }
    path
}

fn client_seed_used(client_seed: &Option<String>) -> &str {
    client_seed
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_CLIENT_SEED)
}

/// SHA-256 over the paths of every turn and the server seed, serialized with
/// sorted keys and `", "` / `": "` separators.
fn commitment_hash(server_seed: &str) -> String {
    let paths = PATHS
        .iter()
        .map(|(kind, reward, _, _)| {
            format!(r#"{{"is_trap": false, "reward": {reward:?}, "type": "{kind}"}}"#)
        })
        .collect::<Vec<_>>()
        .join(", ");
    let turns = (1..=MAX_TURNS)
        .map(|turn| format!(r#"{{"paths": [{paths}], "turn": {turn}}}"#))
        .collect::<Vec<_>>()
        .join(", ");
    let committed = format!(r#"{{"all_paths": [{turns}], "server_seed": "{server_seed}"}}"#);
    sha256_hex(committed.as_bytes())
}

fn sha256_hex(data: &[u8]) -> String {
    let mut out = String::with_capacity(64);
    for b in Sha256::digest(data) {
        let _ = write!(out, "{b:02x}");
    }
    out
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
