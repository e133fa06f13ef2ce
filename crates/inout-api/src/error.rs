//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use inout_auth::{AuthError, LOGIN_PATH, StoreError, Unauthorized};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("unauthorized")]
  Unauthorized(#[from] Unauthorized),

  #[error("login failed")]
  LoginFailed,

  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("internal error: {0}")]
  Internal(#[source] StoreError),
}

impl From<AuthError> for ApiError {
  fn from(err: AuthError) -> Self {
    match err {
      AuthError::LoginFailed => ApiError::LoginFailed,
      // The caller only learns that the login did not go through.
      AuthError::ProvisioningFailed { username, source } => {
        error!(username = %username, error = %source, "login provisioning failed");
        ApiError::LoginFailed
      }
      AuthError::Unauthorized(u) => ApiError::Unauthorized(u),
      AuthError::NotFound(username) => {
        ApiError::NotFound(format!("person {username} not found"))
      }
      AuthError::UnknownStatus(code) => {
        ApiError::BadRequest(format!("unknown status code {code}"))
      }
      AuthError::SessionStoreFailed(e) | AuthError::Store(e) => ApiError::Internal(e),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match self {
      ApiError::Unauthorized(u) => (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "message": "unauthorized", "path": u.login_path })),
      )
        .into_response(),
      ApiError::LoginFailed => (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "message": "login failed", "path": LOGIN_PATH })),
      )
        .into_response(),
      ApiError::NotFound(m) => {
        (StatusCode::NOT_FOUND, Json(json!({ "message": m }))).into_response()
      }
      ApiError::BadRequest(m) => {
        (StatusCode::BAD_REQUEST, Json(json!({ "message": m }))).into_response()
      }
      ApiError::Internal(e) => {
        error!(error = %e, "request failed");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          Json(json!({ "message": "internal error" })),
        )
          .into_response()
      }
    }
  }
}
