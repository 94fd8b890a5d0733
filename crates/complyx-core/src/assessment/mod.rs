//! Assessment progress tracker: answers, progress, and cached scores.

pub mod tracker;

pub use tracker::AssessmentTracker;
