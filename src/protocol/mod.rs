//! Types handed across the core's public boundary.

pub mod models;
