//! # Scribe - a JSON file document store
//!
//! Scribe keeps every record as its own pretty-printed JSON file, grouped
//! into collections that map one-to-one onto directories:
//!
//! ```text
//! <base>/<collection>/<resource>.json
//! ```
//!
//! ## Key Features
//!
//! - **Atomic writes**: content goes to a `.tmp` sibling first and is renamed
//!   into place, so readers never see a half-written record
//! - **Per-collection locking**: writes and deletes on one collection are
//!   serialized while other collections proceed in parallel
//! - **Lock-free reads**: `read` and `read_all` never wait on writers
//! - **Lenient lookups**: resources can be named with or without `.json`
//! - **Pluggable logging**: bring your own [`Logger`](common::Logger) or use
//!   the `log`-facade based default
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scribe::scribe::Scribe;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Address {
//!     city: String,
//!     country: String,
//! }
//!
//! #[derive(Serialize, Deserialize)]
//! struct User {
//!     name: String,
//!     age: String,
//!     address: Address,
//! }
//!
//! # fn main() -> scribe::errors::ScribeResult<()> {
//! let db = Scribe::open("./data")?;
//!
//! let john = User {
//!     name: "John".into(),
//!     age: "23".into(),
//!     address: Address { city: "Bangalore".into(), country: "India".into() },
//! };
//! db.write("users", &john.name, &john)?;
//!
//! let users: Vec<User> = db.read_all_as("users")?;
//! assert_eq!(users.len(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`common`] - lock registry, logger interface and shared constants
//! - [`errors`] - error types and result definitions
//! - [`scribe`] - the store handle
//! - [`scribe_builder`] - builder for opening a store with options
//! - [`scribe_config`] - store options
//! - [`store`] - path resolution and atomic file writes

pub mod common;
pub mod errors;
pub mod scribe;
pub mod scribe_builder;
pub mod scribe_config;
pub mod store;

pub use crate::errors::{ErrorKind, ScribeError, ScribeResult};
pub use crate::scribe::Scribe;
pub use crate::scribe_builder::ScribeBuilder;
pub use crate::scribe_config::ScribeConfig;

/// Version of this crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
