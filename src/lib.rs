//! # vicat-keys
//!
//! **Redeem-code key distribution with a blacklist.**
//!
//! An admin mints single-use redeem codes. Registered users exchange a code
//! for exactly one key of the form `vicat-xxxx-xxxx-xxxx`. Anyone can ask
//! whether a key is currently good, and the admin can blacklist a key for
//! good.
//!
//! ## Features
//!
//! - **Single-use redemption**: a code yields one key, atomically
//! - **Blacklist precedence**: a blacklisted key is denied even if active
//! - **30-day sessions** for users, swept hourly
//! - **Per-call admin credentials**: admins never hold a session
//! - **One JSON document** as the whole state, written atomically
//!
//! ## Quickstart
//!
//! ```no_run
//! use vicat_keys::{KeyServer, ServerConfig, VicatError};
//!
//! fn main() -> Result<(), VicatError> {
//!     let server = KeyServer::open(&ServerConfig::default())?;
//!     let codes = server.keys().issue_redeem_codes(5)?;
//!     println!("issued {} codes", codes.len());
//!
//!     let verdict = server.keys().check_key("vicat-abcd-efgh-ijkl")?;
//!     println!("key ok: {}", verdict.is_ok());
//!     Ok(())
//! }
//! ```
//!
//! ## Threat Model
//!
//! - Passwords are stored as Argon2id hashes only.
//! - Keys, codes and session tokens are never logged raw; a short SHA-256
//!   fingerprint is logged instead.
//! - Redeem codes and keys are bearer secrets. Anyone holding one can use it.
//!
//! See [`ServerConfig`] for configuration.

#![warn(missing_docs)]

// Core modules
pub mod clock;
pub mod config;
pub mod errors;

// Crypto layer
pub mod crypto;

// Storage layer
pub mod store;

// Protocol layer
pub mod protocol;

// Domain layer
pub mod accounts;
pub mod keys;
pub mod session;

// Policy layer
pub mod policy;

// Manager (main public API)
pub mod manager;

// Runtime
pub mod api;
pub mod logging;
pub mod sweeper;

// Re-exports for public API
pub use clock::{Clock, SystemClock};
pub use config::ServerConfig;
pub use errors::{AuthError, ErrorKind, VicatError};
pub use manager::KeyServer;
pub use protocol::models::{DenyReason, Verdict};

#[cfg(any(test, feature = "test-seams"))]
pub use clock::MockClock;
