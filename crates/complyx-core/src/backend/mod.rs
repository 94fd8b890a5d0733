//! Assessment backend port.

pub mod client;

pub use client::AssessmentBackend;
