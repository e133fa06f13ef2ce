//! JSON HTTP API for the in/out board.
//!
//! Exposes an axum [`Router`] backed by an [`Authenticator`]. Every route
//! except `/login` and `/logout` is gated on the session cookie through the
//! [`session::CurrentUser`] extractor. TLS termination is the caller's
//! responsibility.

pub mod auth;
pub mod error;
pub mod roster;
pub mod session;

use std::sync::Arc;

use axum::{
  Router,
  http::{HeaderValue, header},
  routing::{get, post},
};
use inout_auth::Authenticator;
use inout_core::{directory::Directory, store::RosterStore};
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

pub use error::ApiError;

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S, D> {
  pub auth:           Arc<Authenticator<S, D>>,
  /// Mark the session cookie `Secure`. Only turn this off when the board is
  /// served over plain HTTP.
  pub secure_cookies: bool,
}

impl<S, D> Clone for AppState<S, D> {
  fn clone(&self) -> Self {
    Self { auth: Arc::clone(&self.auth), secure_cookies: self.secure_cookies }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the board's router. Every response is marked `Cache-Control:
/// no-cache`.
pub fn router<S, D>(state: AppState<S, D>) -> Router
where
  S: RosterStore + 'static,
  D: Directory + 'static,
{
  Router::new()
    .route("/login", post(auth::login::<S, D>))
    .route("/logout", get(auth::logout::<S, D>).post(auth::logout::<S, D>))
    .route(
      "/api/user",
      get(roster::current::<S, D>).put(roster::update_current::<S, D>),
    )
    .route("/api/user/{username}", get(roster::get_one::<S, D>))
    .route("/api/people", get(roster::people::<S, D>))
    .route("/api/statuscodes", get(roster::status_codes::<S, D>))
    .with_state(state)
    .layer(SetResponseHeaderLayer::overriding(
      header::CACHE_CONTROL,
      HeaderValue::from_static("no-cache"),
    ))
    .layer(TraceLayer::new_for_http())
}

// ─── Integration tests ───────────────────────────────────────────────────────
