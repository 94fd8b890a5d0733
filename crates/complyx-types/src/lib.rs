//! Shared domain types for Complyx.
//!
//! This crate contains the core domain types used across the Complyx client:
//! chat sessions, messages, assessment entities, backend DTOs, store events,
//! and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod assessment;
pub mod backend;
pub mod chat;
pub mod config;
pub mod error;
pub mod event;
