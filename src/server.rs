//!
//! campus-auth HTTP server
//! -----------------------
//! Axum surface binding the core components to the external contract.
//!
//! Responsibilities:
//! - Login/logout endpoints backed by the identity provider and session manager.
//! - Bearer-token authentication on every route except login.
//! - Profile mutation endpoint delegating to the profile handler.
//! - Fixture reset endpoint restoring the seeded accounts for repeatable tests.
//! - Outcome mapping: internal errors to the `{status, code}` envelope.

use std::net::SocketAddr;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::accounts::AccountStore;
use crate::error::{AuthError, FailureResponse, SimpleSuccessResponse};
use crate::identity::{AuthProvider, LocalAuthProvider, LoginRequest, Principal, SessionManager};
use crate::profile::{self, ProfileUpdate};

/// Shared server state injected into all handlers. Everything is a cheap-clone
/// handle over internally synchronized state, so isolated instances can be
/// constructed per test.
#[derive(Clone)]
pub struct AppState {
    pub accounts: AccountStore,
    pub sessions: SessionManager,
    pub provider: LocalAuthProvider,
}

impl AppState {
    /// State seeded with the fixture accounts and an empty session table.
    pub fn new() -> anyhow::Result<Self> {
        let accounts = AccountStore::with_fixture_accounts()?;
        let sessions = SessionManager::new();
        let provider = LocalAuthProvider::new(accounts.clone(), sessions.clone());
        Ok(Self { accounts, sessions, provider })
    }
}

/// Mount all routes onto a fresh router. Split out from [`run_with_port`] so
/// tests can drive the exact production routing without binding a socket.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "campus-auth ok" }))
        .route("/api/session", axum::routing::post(login).delete(logout))
        .route("/api/profile", put(update_profile))
        .route("/api/reset", get(reset))
        .with_state(state)
}

/// Start the HTTP server on the given port.
pub async fn run_with_port(http_port: u16) -> anyhow::Result<()> {
    let state = AppState::new()?;
    let app = router(state);

    let addr: SocketAddr = format!("0.0.0.0:{}", http_port).parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Convenience entry point using the default port.
pub async fn run() -> anyhow::Result<()> {
    run_with_port(3030).await
}

#[derive(Debug, Deserialize)]
struct LoginPayload {
    username: String,
    password: String,
}

#[derive(Serialize)]
struct LoginSuccessResponse<'a> {
    status: &'static str,
    token: &'a str,
    user: LoginResponseUser<'a>,
}

#[derive(Serialize)]
struct LoginResponseUser<'a> {
    first_name: &'a str,
    last_name: &'a str,
    kind: &'static str,
}

fn failure(err: AuthError) -> Response {
    if let AuthError::Internal(detail) = &err {
        error!("internal error: {detail}");
    }
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(FailureResponse::new(err))).into_response()
}

fn success() -> Response {
    (StatusCode::OK, Json(SimpleSuccessResponse::new())).into_response()
}

/// Extract the token from an `Authorization: Bearer <token>` header. The
/// scheme is matched case-insensitively; anything else is no credential.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get("authorization")?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}

/// Resolve the request's bearer token to a principal, or fail the request.
/// Missing, malformed, unknown and revoked tokens are indistinguishable here.
fn authed(state: &AppState, headers: &HeaderMap) -> Result<Principal, AuthError> {
    let token = bearer_token(headers).ok_or(AuthError::InvalidCredentials)?;
    state.sessions.resolve(token).ok_or(AuthError::InvalidCredentials)
}

async fn login(State(state): State<AppState>, Json(payload): Json<LoginPayload>) -> Response {
    let request = LoginRequest { username: payload.username, password: payload.password };
    match state.provider.login(&request) {
        Ok(resp) => (
            StatusCode::OK,
            Json(LoginSuccessResponse {
                status: "success",
                token: &resp.session.token,
                user: LoginResponseUser {
                    first_name: &resp.user.first_name,
                    last_name: &resp.user.last_name,
                    kind: resp.user.role.as_str(),
                },
            }),
        )
            .into_response(),
        Err(err) => failure(err),
    }
}

async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(token) = bearer_token(&headers) else {
        return failure(AuthError::InvalidCredentials);
    };
    if state.sessions.revoke(token) {
        success()
    } else {
        failure(AuthError::InvalidCredentials)
    }
}

async fn update_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(update): Json<ProfileUpdate>,
) -> Response {
    let principal = match authed(&state, &headers) {
        Ok(principal) => principal,
        Err(err) => return failure(err),
    };
    match profile::apply_update(&state.accounts, &principal, update) {
        Ok(()) => success(),
        Err(err) => failure(err),
    }
}

/// Restore the fixture accounts and drop every session. Seeding collaborator
/// for repeatable tests, not part of the business contract.
async fn reset(State(state): State<AppState>) -> Response {
    if let Err(err) = state.accounts.reset() {
        return failure(err);
    }
    state.sessions.clear();
    info!("store reset to fixture accounts");
    Json("ok").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_auth(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn bearer_token_parsing() {
        assert_eq!(bearer_token(&headers_with_auth("Bearer abc123")), Some("abc123"));
        // Scheme is case-insensitive
        assert_eq!(bearer_token(&headers_with_auth("bearer abc123")), Some("abc123"));
        assert_eq!(bearer_token(&headers_with_auth("Basic abc123")), None);
        assert_eq!(bearer_token(&headers_with_auth("Bearer")), None);
        assert_eq!(bearer_token(&headers_with_auth("Bearer ")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
