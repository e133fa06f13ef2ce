//! Handlers for the roster endpoints. Every one requires a session.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/api/user` | The signed-in person |
//! | `PUT`  | `/api/user` | Body: `{"status":1,"remarks":"…"}` |
//! | `GET`  | `/api/user/{username}` | 404 if not found |
//! | `GET`  | `/api/people` | Ordered by display name |
//! | `GET`  | `/api/statuscodes` | Ordered by code |

use axum::{
  Json,
  extract::{Path, State},
};
use inout_auth::StatusUpdate;
use inout_core::{
  directory::Directory,
  person::{Person, StatusCode},
  store::RosterStore,
};

use crate::{AppState, error::ApiError, session::CurrentUser};

// ─── Current user ────────────────────────────────────────────────────────────

/// `GET /api/user`
pub async fn current<S, D>(
  State(state): State<AppState<S, D>>,
  CurrentUser(user): CurrentUser,
) -> Result<Json<Person>, ApiError>
where
  S: RosterStore + 'static,
  D: Directory + 'static,
{
  Ok(Json(state.auth.person(&user.username).await?))
}

/// `PUT /api/user`
pub async fn update_current<S, D>(
  State(state): State<AppState<S, D>>,
  CurrentUser(user): CurrentUser,
  Json(update): Json<StatusUpdate>,
) -> Result<Json<Person>, ApiError>
where
  S: RosterStore + 'static,
  D: Directory + 'static,
{
  let person = state.auth.update_status(&user, &user.username, update).await?;
  Ok(Json(person))
}

// ─── Others ──────────────────────────────────────────────────────────────────

/// `GET /api/user/{username}`
pub async fn get_one<S, D>(
  State(state): State<AppState<S, D>>,
  _user: CurrentUser,
  Path(username): Path<String>,
) -> Result<Json<Person>, ApiError>
where
  S: RosterStore + 'static,
  D: Directory + 'static,
{
  Ok(Json(state.auth.person(&username).await?))
}

/// `GET /api/people`
pub async fn people<S, D>(
  State(state): State<AppState<S, D>>,
  _user: CurrentUser,
) -> Result<Json<Vec<Person>>, ApiError>
where
  S: RosterStore + 'static,
  D: Directory + 'static,
{
  Ok(Json(state.auth.people().await?))
}

/// `GET /api/statuscodes`
pub async fn status_codes<S, D>(
  State(state): State<AppState<S, D>>,
  _user: CurrentUser,
) -> Result<Json<Vec<StatusCode>>, ApiError>
where
  S: RosterStore + 'static,
  D: Directory + 'static,
{
  Ok(Json(state.auth.status_codes().await?))
}
