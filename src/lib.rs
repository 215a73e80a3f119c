//! InfoShell Library
//! 
//! Demo account store: signup, login and a single current-session pointer,
//! persisted in an origin-scoped key-value store.
//!
//! Passwords are stored and compared in plain text. This is a demo, not a
//! credential vault.

pub mod auth;
pub mod config;
pub mod export;
pub mod forms;
pub mod pages;
pub mod storage;

pub use auth::AuthManager;
pub use config::Config;
pub use storage::{KeyValueStore, StoreHandle};

/// Common error type for the application
pub type Result<T> = anyhow::Result<T>;
