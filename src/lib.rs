// src/lib.rs

//! jobmon Library

pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod store;
pub mod utils;
