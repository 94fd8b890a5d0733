//! HTTP adapter for the assessment backend.

pub mod client;

pub use client::HttpAssessmentBackend;
