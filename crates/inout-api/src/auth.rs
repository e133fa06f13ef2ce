//! Handlers for `/login` and `/logout`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/login` | Body: `{"username":"…","password":"…"}`; sets the session cookie |
//! | `GET`/`POST` | `/logout` | Revokes the cookie's session and clears the cookie |

use axum::{
  Json,
  extract::State,
  http::{HeaderMap, StatusCode, header::SET_COOKIE},
  response::{AppendHeaders, IntoResponse},
};
use inout_auth::Credentials;
use inout_core::{directory::Directory, store::RosterStore};
use serde::Serialize;

use crate::{
  AppState,
  error::ApiError,
  session::{cleared_cookie, session_cookie, session_token},
};

#[derive(Debug, Serialize)]
pub struct LoginResponse {
  pub username: String,
}

/// `POST /login`
pub async fn login<S, D>(
  State(state): State<AppState<S, D>>,
  Json(credentials): Json<Credentials>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RosterStore + 'static,
  D: Directory + 'static,
{
  let outcome = state.auth.login(credentials).await?;
  let cookie = session_cookie(&outcome.token, state.secure_cookies);

  Ok((
    AppendHeaders([(SET_COOKIE, cookie)]),
    Json(LoginResponse { username: outcome.username }),
  ))
}

/// `GET|POST /logout`. Succeeds with or without a session.
pub async fn logout<S, D>(
  State(state): State<AppState<S, D>>,
  headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError>
where
  S: RosterStore + 'static,
  D: Directory + 'static,
{
  if let Some(token) = session_token(&headers) {
    state.auth.logout(token).await?;
  }

  Ok((
    AppendHeaders([(SET_COOKIE, cleared_cookie(state.secure_cookies))]),
    StatusCode::NO_CONTENT,
  ))
}
