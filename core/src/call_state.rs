//! Loading/error bookkeeping around API calls.
//!
//! # Design
//! `CallState` is the shared `{ loading, error }` record a UI observes while
//! it drives the game. `invoke` marks the state loading, clears the previous
//! error, runs the call and folds both failure channels into `error`:
//! transport failures (`Err`) and application errors (a successful body with
//! a truthy `error` field). A drop guard resets `loading`, so it is false
//! once `invoke` returns or unwinds.
//!
//! Overlapping invocations on one state are neither queued nor cancelled.
//! Each one clears `loading` when it settles and the last to settle owns
//! `error`.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;

use crate::api::GameApi;
use crate::transport::{Transport, UreqTransport};
use crate::types::{ApplicationError, PathId, SessionId};

/// Shown when a failure carries no message of its own.
pub const UNEXPECTED_ERROR: &str = "An unexpected error occurred";

/// Point-in-time copy of a `CallState`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallSnapshot {
    pub loading: bool,
    pub error: String,
}

#[derive(Debug, Clone, Default)]
pub struct CallState {
    inner: Arc<Mutex<CallSnapshot>>,
}

impl CallState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn loading(&self) -> bool {
        self.lock().loading
    }

    /// Last error message, empty when the last call succeeded.
    pub fn error(&self) -> String {
        self.lock().error.clone()
    }

    pub fn snapshot(&self) -> CallSnapshot {
        self.lock().clone()
    }

    pub fn clear_error(&self) {
        self.lock().error.clear();
    }

    /// Run `op`, returning its result only when it succeeded without an
    /// embedded application error.
    pub fn invoke<R, E, F>(&self, op: F) -> Option<R>
    where
        R: ApplicationError,
        E: fmt::Display,
        F: FnOnce() -> Result<R, E>,
    {
        let _in_flight = self.begin();
        match op() {
            Ok(result) => match result.application_error() {
                Some(message) => {
                    self.set_error(message);
                    None
                }
                None => Some(result),
            },
            Err(err) => {
                let message = err.to_string();
                if message.is_empty() {
                    self.set_error(UNEXPECTED_ERROR.to_string());
                } else {
                    self.set_error(message);
                }
                None
            }
        }
    }

    fn begin(&self) -> InFlight<'_> {
        let mut state = self.lock();
        state.loading = true;
        state.error.clear();
        InFlight { state: self }
    }

    fn set_error(&self, message: String) {
        self.lock().error = message;
    }

    fn lock(&self) -> MutexGuard<'_, CallSnapshot> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Clears `loading` when dropped.
struct InFlight<'a> {
    state: &'a CallState,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.state.lock().loading = false;
    }
}

/// A `GameApi` whose calls are tracked by a `CallState`.
pub struct TrackedApi<'a, T = UreqTransport> {
    api: &'a GameApi<T>,
    state: CallState,
}

impl<'a, T: Transport> TrackedApi<'a, T> {
    pub fn new(api: &'a GameApi<T>) -> Self {
        Self::with_state(api, CallState::new())
    }

    /// Track calls in an existing state, e.g. one shared with a view.
    pub fn with_state(api: &'a GameApi<T>, state: CallState) -> Self {
        Self { api, state }
    }

    pub fn state(&self) -> &CallState {
        &self.state
    }

    pub fn loading(&self) -> bool {
        self.state.loading()
    }

    pub fn error(&self) -> String {
        self.state.error()
    }

    pub fn clear_error(&self) {
        self.state.clear_error()
    }

    pub fn start_game(&self, player_name: &str, seed: Option<&str>) -> Option<Value> {
        self.state.invoke(|| self.api.start_game(player_name, seed))
    }

    pub fn take_turn(
        &self,
        session_id: &SessionId,
        player_name: &str,
        chosen_path_id: impl Into<PathId>,
        insurance: bool,
    ) -> Option<Value> {
        let path = chosen_path_id.into();
        self.state
            .invoke(|| self.api.take_turn(session_id, player_name, path, insurance))
    }

    pub fn game_state(&self, session_id: &SessionId) -> Option<Value> {
        self.state.invoke(|| self.api.game_state(session_id))
    }

    pub fn reveal_game(&self, session_id: &SessionId) -> Option<Value> {
        self.state.invoke(|| self.api.reveal_game(session_id))
    }

    pub fn end_session(&self, session_id: &SessionId) -> Option<Value> {
        self.state.invoke(|| self.api.end_session(session_id))
    }

    pub fn health(&self) -> Option<Value> {
        self.state.invoke(|| self.api.health())
    }
}
