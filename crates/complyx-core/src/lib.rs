//! Store logic and port definitions for Complyx.
//!
//! This crate holds the client's state containers -- session registry,
//! message log, assessment tracker -- together with the ports they depend
//! on: the `StateStore` durable key-value port and the `AssessmentBackend`
//! HTTP port. Adapters live in `complyx-infra`; this crate depends only on
//! `complyx-types`.
//!
//! Every mutation follows the same two-step contract: update in-memory
//! state, then write the store's snapshot through the `StateStore`, then
//! publish a `StoreEvent` on the bus.

pub mod assessment;
pub mod backend;
pub mod chat;
pub mod event;
pub mod persist;
pub mod session;
