//! Core types and traits for Stockroom product backends.
//!
//! This crate provides the `ProductDao` trait and the `Product` record,
//! enabling pluggable storage implementations in separate crates.

pub mod models;
pub mod storage;

// Re-export key types at crate root for convenience
pub use models::{Product, ProductId, UNASSIGNED_ID};
pub use storage::{DaoError, ProductDao};
