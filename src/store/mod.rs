// src/store/mod.rs

//! Persistence layer.

pub mod sqlite;

pub use sqlite::JobStore;
