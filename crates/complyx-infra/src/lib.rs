//! Infrastructure implementations for Complyx.
//!
//! Adapters for the ports defined in `complyx-core`: the SQLite-backed
//! durable state store, the reqwest assessment backend client, and the
//! TOML configuration loader.

pub mod config;
pub mod http;
pub mod sqlite;
