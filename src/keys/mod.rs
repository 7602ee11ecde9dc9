//! Key lifecycle engine.
//!
//! Redeem codes move `Unredeemed -> Redeemed` exactly once. Keys move
//! `(none) -> Active -> Blacklisted`, and nothing leaves the blacklist.

pub mod format;
pub mod lifecycle;

pub use lifecycle::{KeyLifecycle, MAX_REDEEM_BATCH};
