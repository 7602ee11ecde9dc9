//! Request authorization.

pub mod access;
