//! [`DirectoryClient`]: end-user authentication and person lookup on top of
//! any [`Directory`] transport.

use inout_core::{
  DirectoryError,
  directory::{Directory, DirectoryEntry, qualify},
  dn::{DnFragment, sanitize},
  error::Result,
  identity::Identity,
};
use tracing::{debug, warn};

/// Attributes requested for every person lookup.
pub const PERSON_ATTRIBUTES: &[&str] = &[
  "sAMAccountName",
  "userPrincipalName",
  "cn",
  "displayName",
  "department",
  "telephoneNumber",
  "mobile",
  "physicalDeliveryOfficeName",
  "title",
];

/// The search filter selecting exactly the person named by `fragment`.
///
/// `user@domain` names are matched against `userPrincipalName`, bare account
/// names against `sAMAccountName`.
pub fn person_filter(fragment: &DnFragment) -> String {
  let key = if fragment.is_principal_name() {
    "userPrincipalName"
  } else {
    "sAMAccountName"
  };
  let value = fragment.filter_value();
  format!("(&(objectClass=organizationalPerson)({key}={value}))")
}

fn identity_from_entry(username: &str, entry: &DirectoryEntry) -> Identity {
  let display_name = entry
    .first("displayName")
    .or_else(|| entry.first("cn"))
    .unwrap_or(username)
    .to_owned();

  Identity {
    username: username.to_owned(),
    display_name,
    department: entry.first_or_empty("department"),
    telephone: entry.first_or_empty("telephoneNumber"),
    mobile: entry.first_or_empty("mobile"),
    office: entry.first_or_empty("physicalDeliveryOfficeName"),
    title: entry.first_or_empty("title"),
  }
}

/// Authenticates end users and resolves identities against a directory.
pub struct DirectoryClient<D> {
  transport: D,
  realm:     String,
}

impl<D: Directory> DirectoryClient<D> {
  pub fn new(transport: D, realm: impl Into<String>) -> Self {
    Self { transport, realm: realm.into() }
  }

  pub fn transport(&self) -> &D { &self.transport }

  /// The name an end user binds as: a `user@domain` principal verbatim,
  /// anything else as `REALM\name`.
  pub fn bind_principal(&self, fragment: &DnFragment) -> String {
    if fragment.is_principal_name() {
      fragment.as_str().to_owned()
    } else {
      qualify(&self.realm, fragment.as_str())
    }
  }

  /// Bind with the service account to prove the directory is reachable and
  /// the configured credentials are accepted.
  pub async fn bind_as_service(&self) -> Result<()> {
    self.transport.bind_service().await
  }

  /// Check a username/password pair by binding as that user.
  ///
  /// Never errors: a rejected username, an empty password (which LDAP would
  /// treat as an anonymous bind), a refused bind, and an unreachable server
  /// all come back as `false`. Only the first two skip the network.
  pub async fn authenticate(&self, username: &str, password: &str) -> bool {
    let fragment = match sanitize(username) {
      Ok(fragment) => fragment,
      Err(e) => {
        debug!(error = %e, "username rejected before bind");
        return false;
      }
    };
    if password.is_empty() {
      debug!(username = %fragment, "empty password rejected before bind");
      return false;
    }

    let principal = self.bind_principal(&fragment);
    match self.transport.bind(&principal, password).await {
      Ok(()) => true,
      Err(DirectoryError::InvalidCredentials) => {
        debug!(principal = %principal, "directory refused bind");
        false
      }
      Err(e) => {
        warn!(principal = %principal, error = %e, "directory bind failed");
        false
      }
    }
  }

  /// Resolve the full identity of one person. Exactly one directory entry
  /// must match.
  pub async fn search(&self, fragment: &DnFragment) -> Result<Identity> {
    let filter = person_filter(fragment);
    let entries = self.transport.search(&filter, PERSON_ATTRIBUTES).await?;

    match entries.as_slice() {
      [entry] => Ok(identity_from_entry(fragment.raw(), entry)),
      [] => Err(DirectoryError::NotFound(fragment.raw().to_owned())),
      many => Err(DirectoryError::Ambiguous { filter, count: many.len() }),
    }
  }

  /// [`sanitize`] then [`DirectoryClient::search`].
  pub async fn lookup(&self, username: &str) -> Result<Identity> {
    let fragment = sanitize(username)?;
    self.search(&fragment).await
  }
}

#[cfg(test)]
mod tests {
  use std::{collections::HashMap, sync::Mutex};

  use super::*;

  #[derive(Debug, Clone, PartialEq, Eq)]
  enum Call {
    Bind { principal: String, password: String },
    BindService,
    Search { filter: String },
  }

  /// Records every call; binds succeed only for `accept_password`.
  #[derive(Default)]
  struct FakeDirectory {
    calls:           Mutex<Vec<Call>>,
    accept_password: String,
    unavailable:     bool,
    entries:         Vec<DirectoryEntry>,
  }

  impl FakeDirectory {
    fn accepting(password: &str) -> Self {
      Self { accept_password: password.to_owned(), ..Self::default() }
    }

    fn calls(&self) -> Vec<Call> { self.calls.lock().unwrap().clone() }
  }

  impl Directory for FakeDirectory {
    async fn bind(&self, principal: &str, password: &str) -> Result<()> {
      self.calls.lock().unwrap().push(Call::Bind {
        principal: principal.to_owned(),
        password:  password.to_owned(),
      });
      if self.unavailable {
        return Err(DirectoryError::Unavailable("connection refused".into()));
      }
      if password == self.accept_password {
        Ok(())
      } else {
        Err(DirectoryError::InvalidCredentials)
      }
    }

    async fn bind_service(&self) -> Result<()> {
      self.calls.lock().unwrap().push(Call::BindService);
      Ok(())
    }

    async fn search(
      &self,
      filter: &str,
      _attributes: &[&str],
    ) -> Result<Vec<DirectoryEntry>> {
      self
        .calls
        .lock()
        .unwrap()
        .push(Call::Search { filter: filter.to_owned() });
      Ok(self.entries.clone())
    }
  }

  fn entry(attrs: &[(&str, &str)]) -> DirectoryEntry {
    DirectoryEntry {
      dn:    "cn=x,dc=corp,dc=example".to_owned(),
      attrs: attrs
        .iter()
        .map(|(k, v)| (k.to_string(), vec![v.to_string()]))
        .collect::<HashMap<_, _>>(),
    }
  }

  fn client(dir: FakeDirectory) -> DirectoryClient<FakeDirectory> {
    DirectoryClient::new(dir, "CORP")
  }

  // ── authenticate ─────────────────────────────────────────────────────────

  #[tokio::test]
  async fn empty_password_never_reaches_the_directory() {
    let c = client(FakeDirectory::accepting(""));
    assert!(!c.authenticate("jsmith", "").await);
    assert!(c.transport().calls().is_empty());
  }

  #[tokio::test]
  async fn rejected_username_never_reaches_the_directory() {
    let c = client(FakeDirectory::accepting("pw"));
    assert!(!c.authenticate("", "pw").await);
    assert!(!c.authenticate("a=b", "pw").await);
    assert!(!c.authenticate("a\u{7}b", "pw").await);
    assert!(c.transport().calls().is_empty());
  }

  #[tokio::test]
  async fn bare_name_binds_with_realm() {
    let c = client(FakeDirectory::accepting("pw"));
    assert!(c.authenticate("jsmith", "pw").await);
    assert_eq!(c.transport().calls(), vec![Call::Bind {
      principal: "CORP\\jsmith".to_owned(),
      password:  "pw".to_owned(),
    }]);
  }

  #[tokio::test]
  async fn principal_name_binds_verbatim() {
    let c = client(FakeDirectory::accepting("pw"));
    assert!(c.authenticate("jsmith@corp.example", "pw").await);
    assert_eq!(c.transport().calls(), vec![Call::Bind {
      principal: "jsmith@corp.example".to_owned(),
      password:  "pw".to_owned(),
    }]);
  }

  #[tokio::test]
  async fn bind_uses_escaped_name() {
    let c = client(FakeDirectory::accepting("pw"));
    assert!(c.authenticate("j*smith", "pw").await);
    assert_eq!(c.transport().calls(), vec![Call::Bind {
      principal: "CORP\\j\\2asmith".to_owned(),
      password:  "pw".to_owned(),
    }]);
  }

  #[tokio::test]
  async fn wrong_password_fails() {
    let c = client(FakeDirectory::accepting("pw"));
    assert!(!c.authenticate("jsmith", "nope").await);
  }

  #[tokio::test]
  async fn unreachable_directory_fails_without_error() {
    let c = client(FakeDirectory {
      unavailable: true,
      ..FakeDirectory::accepting("pw")
    });
    assert!(!c.authenticate("jsmith", "pw").await);
  }

  // ── search ───────────────────────────────────────────────────────────────

  #[test]
  fn filter_key_follows_name_form() {
    assert_eq!(
      person_filter(&sanitize("jsmith").unwrap()),
      "(&(objectClass=organizationalPerson)(sAMAccountName=jsmith))"
    );
    assert_eq!(
      person_filter(&sanitize("jsmith@corp.example").unwrap()),
      "(&(objectClass=organizationalPerson)(userPrincipalName=jsmith@corp.example))"
    );
    assert_eq!(
      person_filter(&sanitize("*)(cn*").unwrap()),
      "(&(objectClass=organizationalPerson)(sAMAccountName=\\2a\\29\\28cn\\2a))"
    );
  }

  #[test]
  fn edge_spaces_and_hash_are_hex_escaped_in_filters() {
    assert_eq!(
      person_filter(&sanitize(" jsmith ").unwrap()),
      "(&(objectClass=organizationalPerson)(sAMAccountName=\\20jsmith\\20))"
    );
    assert_eq!(
      person_filter(&sanitize("#ops").unwrap()),
      "(&(objectClass=organizationalPerson)(sAMAccountName=\\23ops))"
    );
  }

  #[tokio::test]
  async fn single_match_yields_identity() {
    let c = client(FakeDirectory {
      entries: vec![entry(&[
        ("cn", "Jane Smith"),
        ("displayName", "Jane Q. Smith"),
        ("department", "Survey"),
        ("telephoneNumber", "555-0100"),
        ("mobile", "555-0199"),
        ("physicalDeliveryOfficeName", "B12"),
        ("title", "Surveyor"),
      ])],
      ..FakeDirectory::default()
    });

    let identity = c.lookup("jsmith").await.unwrap();
    assert_eq!(identity, Identity {
      username:     "jsmith".to_owned(),
      display_name: "Jane Q. Smith".to_owned(),
      department:   "Survey".to_owned(),
      telephone:    "555-0100".to_owned(),
      mobile:       "555-0199".to_owned(),
      office:       "B12".to_owned(),
      title:        "Surveyor".to_owned(),
    });
  }

  #[tokio::test]
  async fn display_name_falls_back_to_cn() {
    let c = client(FakeDirectory {
      entries: vec![entry(&[("cn", "Jane Smith")])],
      ..FakeDirectory::default()
    });
    let identity = c.lookup("jsmith").await.unwrap();
    assert_eq!(identity.display_name, "Jane Smith");
    assert_eq!(identity.office, "");
  }

  #[tokio::test]
  async fn no_match_is_not_found() {
    let c = client(FakeDirectory::default());
    let err = c.lookup("ghost").await.unwrap_err();
    assert!(matches!(err, DirectoryError::NotFound(ref u) if u == "ghost"), "{err:?}");
  }

  #[tokio::test]
  async fn several_matches_are_ambiguous() {
    let c = client(FakeDirectory {
      entries: vec![entry(&[("cn", "A")]), entry(&[("cn", "B")])],
      ..FakeDirectory::default()
    });
    let err = c.lookup("jsmith").await.unwrap_err();
    assert!(matches!(err, DirectoryError::Ambiguous { count: 2, .. }), "{err:?}");
  }

  #[tokio::test]
  async fn rejected_name_is_not_searched() {
    let c = client(FakeDirectory::default());
    let err = c.lookup("a,b").await.unwrap_err();
    assert!(matches!(err, DirectoryError::InputRejected(_)), "{err:?}");
    assert!(c.transport().calls().is_empty());
  }

  #[tokio::test]
  async fn service_bind_goes_to_transport() {
    let c = client(FakeDirectory::default());
    c.bind_as_service().await.unwrap();
    assert_eq!(c.transport().calls(), vec![Call::BindService]);
  }
}
