//! Shared configuration types for the TokenGate service
//!
//! This crate holds the configuration structs consumed by the core and
//! infrastructure layers. Values are loaded from the environment
//! (`from_env()` constructors); the embedding process is expected to call
//! `dotenvy::dotenv()` before loading.

pub mod config;

pub use config::{AppConfig, DatabaseConfig, IdentityConfig, QueueConfig, TokenConfig};
