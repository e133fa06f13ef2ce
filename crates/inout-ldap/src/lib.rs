//! Directory (LDAP / Active Directory) access for the in/out board.
//!
//! [`LdapDirectory`] is the wire-level transport: it opens one connection per
//! call and always releases it. [`DirectoryClient`] sits on top of any
//! [`inout_core::directory::Directory`] and decides how end users bind and
//! how people are looked up.

mod client;
mod ldap;

pub use client::{DirectoryClient, PERSON_ATTRIBUTES, person_filter};
pub use ldap::LdapDirectory;
