//! [`LdapDirectory`], the `ldap3` implementation of [`Directory`].

use std::time::Duration;

use inout_core::{
  DirectoryError,
  directory::{Directory, DirectoryEntry, DirectoryOptions},
  error::Result,
};
use ldap3::{Ldap, LdapConnAsync, LdapConnSettings, LdapError, Scope, SearchEntry};
use tracing::{debug, warn};

/// LDAP result code for a rejected bind.
const INVALID_CREDENTIALS: u32 = 49;

fn map_ldap_error(err: LdapError) -> DirectoryError {
  match err {
    LdapError::LdapResult { result } if result.rc == INVALID_CREDENTIALS => {
      DirectoryError::InvalidCredentials
    }
    LdapError::LdapResult { result } => {
      DirectoryError::Operation { rc: result.rc, text: result.text }
    }
    LdapError::Timeout { .. } => DirectoryError::Timeout,
    LdapError::FilterParsing => DirectoryError::InvalidFilter,
    other => DirectoryError::Unavailable(other.to_string()),
  }
}

// ─── Scoped connection ───────────────────────────────────────────────────────

/// An open, driven LDAP connection that is unbound when it goes out of scope.
///
/// Call [`ScopedConnection::release`] on the normal path to unbind before
/// returning; any other exit (an early `?`, a panic, a cancelled future)
/// falls through to `Drop`, which hands the unbind to the runtime.
struct ScopedConnection {
  ldap:     Ldap,
  timeout:  Duration,
  released: bool,
}

impl ScopedConnection {
  /// The handle, with the operation timeout armed for the next request.
  fn ldap(&mut self) -> &mut Ldap { self.ldap.with_timeout(self.timeout) }

  async fn release(mut self) {
    self.released = true;
    if let Err(e) = self.ldap.unbind().await {
      debug!(error = %e, "LDAP unbind failed");
    }
  }
}

impl Drop for ScopedConnection {
  fn drop(&mut self) {
    if self.released {
      return;
    }
    let mut ldap = self.ldap.clone();
    if let Ok(handle) = tokio::runtime::Handle::try_current() {
      handle.spawn(async move {
        if let Err(e) = ldap.unbind().await {
          debug!(error = %e, "LDAP unbind failed");
        }
      });
    }
  }
}

// ─── Directory ───────────────────────────────────────────────────────────────

/// A directory transport speaking LDAP via `ldap3`.
///
/// Connections are not pooled: each bind or search dials the server, does its
/// work, and unbinds.
#[derive(Debug, Clone)]
pub struct LdapDirectory {
  options: DirectoryOptions,
}

impl LdapDirectory {
  pub fn new(options: DirectoryOptions) -> Self {
    if !options.verify_tls {
      warn!(
        host = %options.host,
        "directory TLS certificate verification is disabled"
      );
    }
    Self { options }
  }

  fn url(&self) -> String {
    let scheme = if self.options.starttls { "ldap" } else { "ldaps" };
    format!("{scheme}://{}:{}", self.options.host, self.options.port)
  }

  async fn connect(&self) -> Result<ScopedConnection> {
    let url = self.url();
    let settings = LdapConnSettings::new()
      .set_conn_timeout(self.options.timeout())
      .set_starttls(self.options.starttls)
      .set_no_tls_verify(!self.options.verify_tls);

    debug!(url = %url, "connecting to directory");
    let (conn, ldap) = LdapConnAsync::with_settings(settings, &url)
      .await
      .map_err(|e| DirectoryError::Unavailable(format!("{url}: {e}")))?;

    tokio::spawn(async move {
      if let Err(e) = conn.drive().await {
        warn!(error = %e, "LDAP connection driver error");
      }
    });

    Ok(ScopedConnection {
      ldap,
      timeout: self.options.timeout(),
      released: false,
    })
  }

  async fn simple_bind(
    conn: &mut ScopedConnection,
    principal: &str,
    password: &str,
  ) -> std::result::Result<(), LdapError> {
    conn.ldap().simple_bind(principal, password).await?.success()?;
    Ok(())
  }
}

impl Directory for LdapDirectory {
  async fn bind(&self, principal: &str, password: &str) -> Result<()> {
    let mut conn = self.connect().await?;
    let outcome = Self::simple_bind(&mut conn, principal, password).await;
    conn.release().await;
    outcome.map_err(map_ldap_error)
  }

  async fn bind_service(&self) -> Result<()> {
    let principal = self.options.service_principal();
    self.bind(&principal, &self.options.bind_password).await
  }

  async fn search(
    &self,
    filter: &str,
    attributes: &[&str],
  ) -> Result<Vec<DirectoryEntry>> {
    let principal = self.options.service_principal();
    let mut conn = self.connect().await?;

    let outcome: std::result::Result<Vec<DirectoryEntry>, LdapError> = async {
      Self::simple_bind(&mut conn, &principal, &self.options.bind_password)
        .await?;
      let (entries, _) = conn
        .ldap()
        .search(
          &self.options.search_base,
          Scope::Subtree,
          filter,
          attributes.to_vec(),
        )
        .await?
        .success()?;
      Ok(
        entries
          .into_iter()
          .map(SearchEntry::construct)
          .map(|entry| DirectoryEntry { dn: entry.dn, attrs: entry.attrs })
          .collect(),
      )
    }
    .await;

    conn.release().await;
    let entries = outcome.map_err(map_ldap_error)?;
    debug!(filter, count = entries.len(), "directory search finished");
    Ok(entries)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn options(starttls: bool, bind_username: &str) -> DirectoryOptions {
    DirectoryOptions {
      host:          "dc01.corp.example".to_owned(),
      port:          389,
      realm:         "CORP".to_owned(),
      bind_username: bind_username.to_owned(),
      bind_password: "secret".to_owned(),
      search_base:   "dc=corp,dc=example".to_owned(),
      starttls,
      verify_tls:    true,
      timeout_secs:  5,
    }
  }

  #[test]
  fn url_follows_tls_mode() {
    assert_eq!(
      LdapDirectory::new(options(true, "svc")).url(),
      "ldap://dc01.corp.example:389"
    );
    assert_eq!(
      LdapDirectory::new(options(false, "svc")).url(),
      "ldaps://dc01.corp.example:389"
    );
  }

  #[test]
  fn unparsable_filter_is_not_reported_as_unavailable() {
    assert!(matches!(
      map_ldap_error(LdapError::FilterParsing),
      DirectoryError::InvalidFilter
    ));
  }

  #[tokio::test]
  async fn unreachable_server_is_unavailable() {
    let mut opts = options(true, "svc");
    opts.host = "127.0.0.1".to_owned();
    opts.port = 1;
    opts.timeout_secs = 2;
    let err = LdapDirectory::new(opts).bind("CORP\\x", "pw").await.unwrap_err();
    assert!(
      matches!(err, DirectoryError::Unavailable(_) | DirectoryError::Timeout),
      "{err:?}"
    );
  }
}
