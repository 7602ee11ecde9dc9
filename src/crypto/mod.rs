//! Password hashing, fingerprints and random material.

pub mod credential;
pub mod digest;
pub mod random;
