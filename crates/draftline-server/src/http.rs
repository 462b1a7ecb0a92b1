//! HTTP routes.
//!
//! - `POST /lobbies`: create a lobby under a fresh code, `201 {"code": ..}`
//! - `GET /lobbies/{code}`: `{version, connections, state}` or 404
//! - `GET /healthz`: liveness
//! - `GET /ws?code=..`: WebSocket upgrade, see [`crate::ws`]

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use draftline_core::{ChampionId, DraftState, Rules};
use serde::{Deserialize, Serialize};

use crate::{error::ServerError, lobby_code, registry::RegistryHandle, ws};

/// Attempts at finding a free lobby code before giving up.
const MAX_CODE_ATTEMPTS: usize = 16;

/// Shared state for every route.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Lobby lookup and creation
    pub registry: RegistryHandle,
    /// Rules for lobbies created without overrides
    pub default_rules: Rules,
}

impl AppState {
    /// State backed by `registry`.
    pub fn new(registry: RegistryHandle, default_rules: Rules) -> Self {
        Self { registry, default_rules }
    }
}

/// Router with every route mounted.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/lobbies", post(create_lobby))
        .route("/lobbies/{code}", get(get_lobby))
        .route("/ws", get(ws::ws_handler))
        .with_state(state)
}

/// Optional body of `POST /lobbies`. Missing fields fall back to the
/// server's default rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CreateLobbyRequest {
    /// Exclude `fearless_champions` from picks
    #[serde(default)]
    pub fearless: Option<bool>,
    /// Champions used earlier in the series
    #[serde(default)]
    pub fearless_champions: Vec<ChampionId>,
    /// Pick clock in seconds, `<= 0` disables it
    #[serde(default)]
    pub pick_timer_sec: Option<i64>,
    /// Ban clock in seconds, `<= 0` disables it
    #[serde(default)]
    pub ban_timer_sec: Option<i64>,
}

impl CreateLobbyRequest {
    /// Initial draft state for the new lobby.
    pub fn initial_state(self, defaults: Rules) -> DraftState {
        let rules = Rules {
            fearless: self.fearless.unwrap_or(defaults.fearless),
            pick_timer_sec: self.pick_timer_sec.unwrap_or(defaults.pick_timer_sec),
            ban_timer_sec: self.ban_timer_sec.unwrap_or(defaults.ban_timer_sec),
        };
        DraftState::with_rules(rules).with_fearless(self.fearless_champions)
    }
}

/// Body of a `201` from `POST /lobbies`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateLobbyResponse {
    /// Code clients pass to `/ws`
    pub code: String,
}

/// Route-level failures, rendered as `{"error": ..}`.
#[derive(Debug)]
pub enum ApiError {
    /// Unparseable request
    BadRequest(String),
    /// Unknown lobby
    NotFound(String),
    /// Registry or lobby failure
    Server(ServerError),
}

impl From<ServerError> for ApiError {
    fn from(err: ServerError) -> Self {
        match err {
            ServerError::LobbyNotFound(code) => Self::NotFound(code),
            other => Self::Server(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::NotFound(code) => (StatusCode::NOT_FOUND, format!("lobby not found: {code}")),
            Self::Server(err @ (ServerError::RegistryClosed | ServerError::LobbyClosed(_))) => {
                (StatusCode::SERVICE_UNAVAILABLE, err.to_string())
            },
            Self::Server(err) => {
                tracing::error!(error = %err, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            },
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

async fn create_lobby(
    State(app): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<CreateLobbyResponse>), ApiError> {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        CreateLobbyRequest::default()
    } else {
        serde_json::from_slice::<CreateLobbyRequest>(&body)
            .map_err(|err| ApiError::BadRequest(format!("bad json: {err}")))?
    };
    let initial = request.initial_state(app.default_rules);

    for _ in 0..MAX_CODE_ATTEMPTS {
        let code = lobby_code::generate_code()?;
        if app.registry.create(&code, initial.clone()).await?.is_some() {
            return Ok((StatusCode::CREATED, Json(CreateLobbyResponse { code })));
        }
        tracing::debug!(lobby = %code, "code collision, regenerating");
    }

    Err(ApiError::Server(ServerError::CodesExhausted(MAX_CODE_ATTEMPTS)))
}

async fn get_lobby(
    State(app): State<AppState>,
    Path(code): Path<String>,
) -> Result<Response, ApiError> {
    let lobby =
        app.registry.get(&code).await?.ok_or_else(|| ApiError::NotFound(code.clone()))?;
    let view = lobby.state().await?;

    Ok(Json(view).into_response())
}
