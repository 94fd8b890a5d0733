//! Change-notification plumbing for the state containers.

pub mod bus;

pub use bus::EventBus;
