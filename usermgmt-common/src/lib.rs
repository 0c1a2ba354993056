//! # User Management Common Library
//!
//! Shared code for the user management services including:
//! - Error types
//! - Configuration loading (TOML / ENV / CLI priority)
//! - Database pool initialization and schema
//! - Time and identifier utilities

pub mod config;
pub mod db;
pub mod error;
pub mod time;
pub mod uuid_utils;

pub use error::{Error, Result};
