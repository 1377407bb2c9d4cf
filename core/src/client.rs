//! Stateless request builder and response parser for the game API.
//!
//! # Design
//! `GameClient` holds only a `base_url`. Each operation is split into a
//! `build_*` method that produces an `HttpRequest` and a `parse_*` method that
//! consumes an `HttpResponse`. Session ids are percent-encoded, so an id can
//! never change which route is hit. `GameApi` glues the two halves to a
//! `Transport`; tests drive them directly with scripted responses.

use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{SessionId, StartGame, TakeTurn};

/// Synchronous, stateless client for the game API.
#[derive(Debug, Clone)]
pub struct GameClient {
    base_url: String,
}

impl GameClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_start_game(&self, input: &StartGame) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/start_game", input)
    }

    pub fn build_take_turn(&self, input: &TakeTurn) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/take_turn", input)
    }

    pub fn build_game_state(&self, id: &SessionId) -> Result<HttpRequest, ApiError> {
        self.session_request(HttpMethod::Get, "game_state", id)
    }

    pub fn build_reveal_game(&self, id: &SessionId) -> Result<HttpRequest, ApiError> {
        self.session_request(HttpMethod::Get, "reveal_game", id)
    }

    pub fn build_end_session(&self, id: &SessionId) -> Result<HttpRequest, ApiError> {
        self.session_request(HttpMethod::Delete, "session", id)
    }

    pub fn build_health(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/health")
    }

    pub fn parse_start_game(&self, response: HttpResponse) -> Result<Value, ApiError> {
        parse_body(response)
    }

    pub fn parse_take_turn(&self, response: HttpResponse) -> Result<Value, ApiError> {
        parse_body(response)
    }

    pub fn parse_game_state(&self, response: HttpResponse) -> Result<Value, ApiError> {
        parse_body(response)
    }

    pub fn parse_reveal_game(&self, response: HttpResponse) -> Result<Value, ApiError> {
        parse_body(response)
    }

    pub fn parse_end_session(&self, response: HttpResponse) -> Result<Value, ApiError> {
        parse_body(response)
    }

    pub fn parse_health(&self, response: HttpResponse) -> Result<Value, ApiError> {
        parse_body(response)
    }

    fn request(&self, method: HttpMethod, path: &str) -> HttpRequest {
        HttpRequest {
            method,
            url: format!("{}{path}", self.base_url),
            headers: vec![("accept".to_string(), "application/json".to_string())],
            body: None,
        }
    }

    /// `{base}/{route}/{id}` with `id` percent-encoded as one path segment.
    fn session_request(
        &self,
        method: HttpMethod,
        route: &str,
        id: &SessionId,
    ) -> Result<HttpRequest, ApiError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| ApiError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .push(route)
            .push(id.as_str());
        Ok(HttpRequest {
            url: url.into(),
            ..self.request(method, "")
        })
    }

    fn json_request<T: Serialize>(
        &self,
        method: HttpMethod,
        path: &str,
        input: &T,
    ) -> Result<HttpRequest, ApiError> {
        let body =
            serde_json::to_string(input).map_err(|e| ApiError::Serialization(e.to_string()))?;
        let mut req = self.request(method, path);
        req.headers
            .push(("content-type".to_string(), "application/json".to_string()));
        req.body = Some(body);
        Ok(req)
    }
}

/// Normalize the status, then decode the body. An empty 2xx body is `null`.
fn parse_body(response: HttpResponse) -> Result<Value, ApiError> {
    check_status(&response)?;
    if response.body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::from_status(response.status, &response.body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PathId;
    use serde_json::json;

    fn client() -> GameClient {
        GameClient::new("http://localhost:8000")
    }

    #[test]
    fn build_start_game_produces_json_post() {
        let input = StartGame {
            player_name: "Ava".to_string(),
            seed: Some("lucky".to_string()),
        };
        let req = client().build_start_game(&input).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://localhost:8000/start_game");
        assert_eq!(req.header("content-type"), Some("application/json"));
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"player_name": "Ava", "seed": "lucky"}));
    }

    #[test]
    fn build_take_turn_produces_json_post() {
        let input = TakeTurn {
            session_id: "abc123".into(),
            player_name: "Ava".to_string(),
            chosen_path_id: PathId::Index(1),
            insurance: true,
        };
        let req = client().build_take_turn(&input).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://localhost:8000/take_turn");
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(
            body,
            json!({
                "session_id": "abc123",
                "player_name": "Ava",
                "chosen_path_id": 1,
                "insurance": true
            })
        );
    }

    #[test]
    fn session_routes_embed_the_id() {
        let id = SessionId::new("abc123");
        let c = client();

        let req = c.build_game_state(&id).unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:8000/game_state/abc123");
        assert!(req.body.is_none());
        assert_eq!(req.header("accept"), Some("application/json"));

        let req = c.build_reveal_game(&id).unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:8000/reveal_game/abc123");

        let req = c.build_end_session(&id).unwrap();
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.url, "http://localhost:8000/session/abc123");
    }

    #[test]
    fn session_id_is_escaped_as_one_segment() {
        let id = SessionId::new("a/b?c#d e");
        let req = client().build_game_state(&id).unwrap();
        assert_eq!(req.url, "http://localhost:8000/game_state/a%2Fb%3Fc%23d%20e");

        let req = client().build_end_session(&SessionId::new("../health")).unwrap();
        assert_eq!(req.url, "http://localhost:8000/session/..%2Fhealth");
    }

    #[test]
    fn session_routes_keep_a_base_path() {
        let c = GameClient::new("https://cave.example.com/api/");
        let req = c.build_reveal_game(&SessionId::new("abc123")).unwrap();
        assert_eq!(req.url, "https://cave.example.com/api/reveal_game/abc123");
    }

    #[test]
    fn unparsable_base_url_is_reported() {
        let err = GameClient::new("not a url")
            .build_game_state(&SessionId::new("abc123"))
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl(_)), "{err:?}");
    }

    #[test]
    fn build_health_has_no_body() {
        let req = client().build_health();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:8000/health");
        assert!(req.body.is_none());
        assert_eq!(req.header("accept"), Some("application/json"));
        assert_eq!(req.header("content-type"), None);
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let req = GameClient::new("http://localhost:8000/").build_health();
        assert_eq!(req.url, "http://localhost:8000/health");
    }

    #[test]
    fn parse_success_returns_body() {
        let resp = HttpResponse::new(200, r#"{"session_id":"abc123","turn":1}"#);
        let body = client().parse_start_game(resp).unwrap();
        assert_eq!(body["session_id"], "abc123");
    }

    #[test]
    fn parse_keeps_embedded_application_error() {
        let resp = HttpResponse::new(200, r#"{"error":"invalid path"}"#);
        let body = client().parse_take_turn(resp).unwrap();
        assert_eq!(body, json!({"error": "invalid path"}));
    }

    #[test]
    fn parse_empty_success_body_is_null() {
        let body = client().parse_end_session(HttpResponse::new(204, "")).unwrap();
        assert!(body.is_null());
    }

    #[test]
    fn parse_not_found() {
        let err = client()
            .parse_game_state(HttpResponse::new(404, r#"{"detail":"Not Found"}"#))
            .unwrap_err();
        assert_eq!(err, ApiError::NotFound);
    }

    #[test]
    fn parse_server_error() {
        let err = client()
            .parse_reveal_game(HttpResponse::new(502, "bad gateway"))
            .unwrap_err();
        assert_eq!(err, ApiError::ServerError { status: 502 });
    }

    #[test]
    fn parse_other_status_is_passed_through() {
        let err = client()
            .parse_take_turn(HttpResponse::new(422, "unprocessable"))
            .unwrap_err();
        assert_eq!(
            err,
            ApiError::Http {
                status: 422,
                body: "unprocessable".to_string()
            }
        );
    }

    #[test]
    fn parse_bad_json() {
        let err = client()
            .parse_health(HttpResponse::new(200, "not json"))
            .unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }
}
