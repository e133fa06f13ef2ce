//! Core types and trait definitions for the in/out board.
//!
//! This crate is free of HTTP, database and directory protocol
//! dependencies. The storage backend implements [`store::RosterStore`], the
//! directory transport implements [`directory::Directory`], and everything
//! else is written against those two traits.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod directory;
pub mod dn;
pub mod error;
pub mod identity;
pub mod person;
pub mod session;
pub mod store;

pub use error::{DirectoryError, Rejected};
