//! The configured game API client.
//!
//! `GameApi` is built once from a `ClientConfig` and passed by reference to
//! everything that talks to the server. It pairs the sans-IO `GameClient`
//! with a `Transport` and, when logging is enabled, reports every exchange to
//! a `LogSink` before returning.

use std::sync::Arc;

use serde_json::Value;

use crate::client::GameClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::log::{LogRecord, LogSink, TracingSink};
use crate::transport::{Transport, UreqTransport};
use crate::types::{PathId, SessionId, StartGame, TakeTurn};

pub struct GameApi<T = UreqTransport> {
    client: GameClient,
    transport: T,
    logging_enabled: bool,
    sink: Arc<dyn LogSink>,
}

impl GameApi<UreqTransport> {
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_transport(config, UreqTransport::new(config.timeout))
    }
}

impl<T: Transport> GameApi<T> {
    pub fn with_transport(config: &ClientConfig, transport: T) -> Self {
        Self {
            client: GameClient::new(&config.base_url),
            transport,
            logging_enabled: config.logging_enabled,
            sink: Arc::new(TracingSink),
        }
    }

    /// Replace the default `tracing` sink. Records still flow only while
    /// logging is enabled in the config.
    pub fn with_sink(mut self, sink: impl LogSink + 'static) -> Self {
        self.sink = Arc::new(sink);
        self
    }

    pub fn client(&self) -> &GameClient {
        &self.client
    }

    pub fn logging_enabled(&self) -> bool {
        self.logging_enabled
    }

    pub fn start_game(&self, player_name: &str, seed: Option<&str>) -> Result<Value, ApiError> {
        let req = self.client.build_start_game(&StartGame {
            player_name: player_name.to_string(),
            seed: seed.map(str::to_string),
        })?;
        self.send(req, GameClient::parse_start_game)
    }

    pub fn take_turn(
        &self,
        session_id: &SessionId,
        player_name: &str,
        chosen_path_id: impl Into<PathId>,
        insurance: bool,
    ) -> Result<Value, ApiError> {
        let req = self.client.build_take_turn(&TakeTurn {
            session_id: session_id.clone(),
            player_name: player_name.to_string(),
            chosen_path_id: chosen_path_id.into(),
            insurance,
        })?;
        self.send(req, GameClient::parse_take_turn)
    }

    pub fn game_state(&self, session_id: &SessionId) -> Result<Value, ApiError> {
        let req = self.client.build_game_state(session_id)?;
        self.send(req, GameClient::parse_game_state)
    }

    pub fn reveal_game(&self, session_id: &SessionId) -> Result<Value, ApiError> {
        let req = self.client.build_reveal_game(session_id)?;
        self.send(req, GameClient::parse_reveal_game)
    }

    pub fn end_session(&self, session_id: &SessionId) -> Result<Value, ApiError> {
        let req = self.client.build_end_session(session_id)?;
        self.send(req, GameClient::parse_end_session)
    }

    pub fn health(&self) -> Result<Value, ApiError> {
        let req = self.client.build_health();
        self.send(req, GameClient::parse_health)
    }

    fn send(
        &self,
        req: HttpRequest,
        parse: fn(&GameClient, HttpResponse) -> Result<Value, ApiError>,
    ) -> Result<Value, ApiError> {
        let method = req.method;
        let url = req.url.clone();
        self.log(|| LogRecord::Request {
            method,
            url: url.clone(),
            body: req.body.clone(),
        });

        let response = match self.transport.execute(req) {
            Ok(response) => response,
            Err(err) => {
                self.log(|| LogRecord::Failure {
                    method,
                    url: url.clone(),
                    error: err.to_string(),
                });
                return Err(err);
            }
        };

        self.log(|| LogRecord::Response {
            method,
            url: url.clone(),
            status: response.status,
        });
        parse(&self.client, response).inspect_err(|err| {
            self.log(|| LogRecord::Failure {
                method,
                url: url.clone(),
                error: err.to_string(),
            })
        })
    }

    fn log(&self, record: impl FnOnce() -> LogRecord) {
        if self.logging_enabled {
            self.sink.record(&record());
        }
    }
}
