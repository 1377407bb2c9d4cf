//! Blocking client for the Cave Explorer game-session API.
//!
//! # Overview
//! Six remote operations (start game, take turn, game state, reveal
//! provenance, end session, health) exposed as typed calls that return the
//! server's JSON body or a normalized `ApiError`, plus `CallState`, a
//! loading/error tracker for driving those calls from a UI.
//!
//! # Design
//! - `GameClient` is sans-IO: `build_*` produces an `HttpRequest`, `parse_*`
//!   consumes an `HttpResponse`. Status normalization lives there.
//! - `GameApi` is the configured client object. It owns a `Transport`
//!   (`UreqTransport` by default, with the request deadline) and an optional
//!   diagnostic `LogSink`. Construct it once and pass it by reference.
//! - The server owns the response schema. Bodies stay `serde_json::Value`;
//!   the structs in `types` are opt-in views. A revealed game can be checked
//!   against its commitment with `RevealedProvenance::verify`.

pub mod api;
pub mod call_state;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod log;
pub mod provenance;
pub mod transport;
pub mod types;

pub use api::GameApi;
pub use call_state::{CallSnapshot, CallState, TrackedApi, UNEXPECTED_ERROR};
pub use client::GameClient;
pub use config::{ClientConfig, DEFAULT_BASE_URL, REQUEST_TIMEOUT};
pub use error::{ApiError, ErrorKind};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use log::{LogRecord, LogSink, TracingSink};
pub use provenance::{ProvenanceError, DEFAULT_CLIENT_SEED};
pub use transport::{Transport, UreqTransport};
pub use types::{
    ApplicationError, FromBody, GameState, GameSummary, Health, PathId, PathOption, Revealed,
    RevealedProvenance, SessionId, StartGame, StartProvenance, TakeTurn, TurnRecord,
};
