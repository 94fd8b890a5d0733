//! Assessment domain types for Complyx.
//!
//! Models one in-flight IFRS sustainability-disclosure assessment: the
//! answered questions, backend-computed progress, and the cached score
//! snapshot. Scores are opaque backend payloads -- the client stores and
//! clears them but never computes them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// IFRS sustainability standard under assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IfrsStandard {
    /// IFRS S1 -- general sustainability-related disclosures.
    S1,
    /// IFRS S2 -- climate-related disclosures.
    S2,
}

impl fmt::Display for IfrsStandard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IfrsStandard::S1 => write!(f, "S1"),
            IfrsStandard::S2 => write!(f, "S2"),
        }
    }
}

impl FromStr for IfrsStandard {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "S1" => Ok(IfrsStandard::S1),
            "S2" => Ok(IfrsStandard::S2),
            other => Err(format!("invalid IFRS standard: '{other}'")),
        }
    }
}

/// Which pass of the adaptive questionnaire the assessment is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssessmentPhase {
    Quick,
    Detailed,
    Followup,
}

impl fmt::Display for AssessmentPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssessmentPhase::Quick => write!(f, "quick"),
            AssessmentPhase::Detailed => write!(f, "detailed"),
            AssessmentPhase::Followup => write!(f, "followup"),
        }
    }
}

impl FromStr for AssessmentPhase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "quick" => Ok(AssessmentPhase::Quick),
            "detailed" => Ok(AssessmentPhase::Detailed),
            "followup" => Ok(AssessmentPhase::Followup),
            other => Err(format!("invalid assessment phase: '{other}'")),
        }
    }
}

/// Lifecycle status of an assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentStatus {
    InProgress,
    Completed,
    Paused,
}

impl fmt::Display for AssessmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssessmentStatus::InProgress => write!(f, "in_progress"),
            AssessmentStatus::Completed => write!(f, "completed"),
            AssessmentStatus::Paused => write!(f, "paused"),
        }
    }
}

impl FromStr for AssessmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "in_progress" => Ok(AssessmentStatus::InProgress),
            "completed" => Ok(AssessmentStatus::Completed),
            "paused" => Ok(AssessmentStatus::Paused),
            other => Err(format!("invalid assessment status: '{other}'")),
        }
    }
}

impl Default for AssessmentStatus {
    fn default() -> Self {
        AssessmentStatus::InProgress
    }
}

/// A submitted answer to one assessment question.
///
/// Unique per `question_id` within an assessment: resubmitting replaces the
/// prior entry in place, preserving its list position. Serialized with
/// camelCase field names because answers cross the backend wire contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentAnswer {
    pub question_id: String,
    pub value: String,
    pub timestamp: DateTime<Utc>,
}

/// Per-category slice of a backend-computed score snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryScore {
    pub category: String,
    pub score: f64,
    pub max_score: f64,
    pub percentage: f64,
    pub answered_count: u32,
    pub total_count: u32,
}

/// Backend-computed compliance score snapshot.
///
/// Fetched from `POST /api/assessment/scores/calculate` and cached by the
/// assessment tracker until replaced or cleared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentScores {
    pub overall_score: f64,
    pub overall_percentage: f64,
    pub category_scores: Vec<CategoryScore>,
    pub total_answered: u32,
    pub total_questions: u32,
}

/// Backend-computed progress snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressData {
    pub progress: f64,
    pub answered_count: u32,
    pub total_count: u32,
}
