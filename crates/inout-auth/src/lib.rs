//! Session-backed directory authentication for the in/out board.
//!
//! [`Authenticator`] is the single entry point the HTTP layer talks to. It
//! owns a [`StatusCache`] and a [`SessionStore`] and composes them with a
//! [`inout_ldap::DirectoryClient`] and any [`inout_core::store::RosterStore`].

pub mod authenticator;
pub mod cache;
pub mod error;
pub mod refresh;
pub mod session;

pub use authenticator::{
  Authenticator, Credentials, LoginOutcome, SessionUser, StatusUpdate,
};
pub use cache::{StatusCache, StatusMap};
pub use error::{AuthError, LOGIN_PATH, StoreError, Unauthorized};
pub use refresh::{RefreshFailure, RefreshReport};
pub use session::{SessionError, SessionStore};
