//! Session cookie handling and the [`CurrentUser`] extractor.

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use inout_auth::SessionUser;
use inout_core::{directory::Directory, store::RosterStore};

use crate::{AppState, error::ApiError};

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "session";

/// `Set-Cookie` value that hands `token` to the browser.
///
/// Sessions never expire server-side, so the cookie lives until the browser
/// session ends.
pub fn session_cookie(token: &str, secure: bool) -> String {
  let secure_flag = if secure { " Secure;" } else { "" };
  format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax;{secure_flag}")
}

/// `Set-Cookie` value that removes the session cookie.
pub fn cleared_cookie(secure: bool) -> String {
  let secure_flag = if secure { " Secure;" } else { "" };
  format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax;{secure_flag} Max-Age=0")
}

/// The session token from the request's `Cookie` headers, if any.
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
  headers
    .get_all(header::COOKIE)
    .iter()
    .filter_map(|v| v.to_str().ok())
    .flat_map(|v| v.split(';'))
    .filter_map(|pair| pair.trim().split_once('='))
    .find(|(name, _)| *name == SESSION_COOKIE)
    .map(|(_, value)| value.trim())
    .filter(|value| !value.is_empty())
}

/// The signed-in user. Rejects the request with 401 when the session cookie
/// is missing or does not name a live session.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub SessionUser);

impl<S, D> FromRequestParts<AppState<S, D>> for CurrentUser
where
  S: RosterStore + 'static,
  D: Directory + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, D>,
  ) -> Result<Self, Self::Rejection> {
    let token = session_token(&parts.headers);
    let user = state.auth.require_session(token).await?;
    Ok(CurrentUser(user))
  }
}
