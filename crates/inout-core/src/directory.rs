//! The `Directory` transport trait and its configuration.
//!
//! A transport knows how to reach the directory server and run exactly two
//! kinds of request: a bind with caller-supplied credentials, and a search
//! performed as the configured service account. Deciding *what* to bind as
//! and *what* to search for is the job of the directory client built on top.

use std::{collections::HashMap, future::Future, time::Duration};

use serde::Deserialize;

use crate::error::Result;

// ─── Options ─────────────────────────────────────────────────────────────────

/// Connection and credential settings for the directory server.
///
/// Deserialised from the `[directory]` section of the server configuration
/// and never modified afterwards.
#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryOptions {
  pub host:          String,
  #[serde(default = "default_port")]
  pub port:          u16,
  /// Qualifier for bare account names, e.g. `CORP` in `CORP\jsmith`.
  pub realm:         String,
  /// Service account used for searches.
  pub bind_username: String,
  pub bind_password: String,
  pub search_base:   String,
  /// Upgrade a plain `ldap://` connection with StartTLS. When `false` the
  /// transport connects with `ldaps://` instead.
  #[serde(default = "default_true")]
  pub starttls:      bool,
  /// Validate the server certificate. Turning this off accepts any
  /// certificate and should be limited to directories with self-signed
  /// certificates on a trusted network.
  #[serde(default = "default_true")]
  pub verify_tls:    bool,
  /// Upper bound for connecting and for each individual directory operation.
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs:  u64,
}

impl DirectoryOptions {
  pub fn timeout(&self) -> Duration { Duration::from_secs(self.timeout_secs) }

  /// The service account's bind name. A name that is already a UPN or a DN
  /// is used verbatim; a bare account name is qualified with the realm.
  pub fn service_principal(&self) -> String {
    let name = &self.bind_username;
    if name.contains('@') || name.contains('=') {
      name.clone()
    } else {
      qualify(&self.realm, name)
    }
  }
}

fn default_port() -> u16 { 389 }

fn default_true() -> bool { true }

fn default_timeout_secs() -> u64 { 10 }

/// Qualify a bare account name with a realm: `REALM\name`.
pub fn qualify(realm: &str, name: &str) -> String { format!("{realm}\\{name}") }

// ─── Entries ─────────────────────────────────────────────────────────────────

/// A single search result: its DN and string-valued attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryEntry {
  pub dn:    String,
  pub attrs: HashMap<String, Vec<String>>,
}

impl DirectoryEntry {
  /// First value of `attr`, if present.
  pub fn first(&self, attr: &str) -> Option<&str> {
    self
      .attrs
      .get(attr)
      .and_then(|values| values.first())
      .map(String::as_str)
  }

  /// First value of `attr`, or the empty string.
  pub fn first_or_empty(&self, attr: &str) -> String {
    self.first(attr).unwrap_or_default().to_owned()
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a connection-per-call directory transport.
///
/// Every method opens its own connection and releases it before returning,
/// whether or not the operation succeeded.
pub trait Directory: Send + Sync {
  /// Bind as `principal`. `Ok(())` means the server accepted the password.
  fn bind<'a>(
    &'a self,
    principal: &'a str,
    password: &'a str,
  ) -> impl Future<Output = Result<()>> + Send + 'a;

  /// Bind with the configured service account and nothing else.
  fn bind_service(&self) -> impl Future<Output = Result<()>> + Send + '_;

  /// Bind as the service account, then run a subtree search for `filter`
  /// below the configured search base, returning the requested attributes.
  fn search<'a>(
    &'a self,
    filter: &'a str,
    attributes: &'a [&'a str],
  ) -> impl Future<Output = Result<Vec<DirectoryEntry>>> + Send + 'a;
}
