//! Tracker for one in-flight assessment.
//!
//! Holds the answer list, the answered-question set that mirrors it, the
//! backend-computed progress fields, and the cached score snapshot.
//! Invariant: `answered_questions` always equals the `question_id`
//! projection of `answers`.

use std::collections::HashSet;

use chrono::Utc;
use tracing::debug;

use complyx_types::assessment::{
    AssessmentAnswer, AssessmentPhase, AssessmentScores, AssessmentStatus, IfrsStandard,
    ProgressData,
};
use complyx_types::backend::AssessmentSessionState;
use complyx_types::error::StoreError;
use complyx_types::event::StoreEvent;

use crate::event::EventBus;
use crate::persist::snapshot::{self, AssessmentSnapshot, ASSESSMENT_STORAGE_KEY};
use crate::persist::StateStore;

/// Tracks one in-flight assessment's metadata, answers, progress, and
/// score snapshot.
#[derive(Debug)]
pub struct AssessmentTracker<S: StateStore> {
    store: S,
    bus: EventBus,
    assessment_id: Option<String>,
    ifrs_standard: Option<IfrsStandard>,
    current_phase: Option<AssessmentPhase>,
    status: AssessmentStatus,
    answers: Vec<AssessmentAnswer>,
    answered_questions: HashSet<String>,
    progress: f64,
    answered_count: u32,
    total_count: u32,
    scores: Option<AssessmentScores>,
}

impl<S: StateStore> AssessmentTracker<S> {
    /// Create an empty tracker (nothing persisted yet).
    pub fn new(store: S, bus: EventBus) -> Self {
        Self {
            store,
            bus,
            assessment_id: None,
            ifrs_standard: None,
            current_phase: None,
            status: AssessmentStatus::InProgress,
            answers: Vec::new(),
            answered_questions: HashSet::new(),
            progress: 0.0,
            answered_count: 0,
            total_count: 0,
            scores: None,
        }
    }

    /// Restore the tracker from the durable store, rebuilding the answered
    /// set from its array encoding.
    pub async fn load(store: S, bus: EventBus) -> Result<Self, StoreError> {
        let snapshot = match store.get(ASSESSMENT_STORAGE_KEY).await? {
            Some(value) => snapshot::decode::<AssessmentSnapshot>(value)?,
            None => AssessmentSnapshot::default(),
        };
        Ok(Self {
            store,
            bus,
            assessment_id: snapshot.assessment_id,
            ifrs_standard: snapshot.ifrs_standard,
            current_phase: snapshot.current_phase,
            status: snapshot.status,
            answered_questions: snapshot.answered_questions.into_iter().collect(),
            answers: snapshot.answers,
            progress: snapshot.progress,
            answered_count: snapshot.answered_count,
            total_count: snapshot.total_count,
            scores: snapshot.scores,
        })
    }

    // --- Accessors ---

    pub fn assessment_id(&self) -> Option<&str> {
        self.assessment_id.as_deref()
    }

    pub fn ifrs_standard(&self) -> Option<IfrsStandard> {
        self.ifrs_standard
    }

    pub fn current_phase(&self) -> Option<AssessmentPhase> {
        self.current_phase
    }

    pub fn status(&self) -> AssessmentStatus {
        self.status
    }

    /// Answers in submission order.
    pub fn answers(&self) -> &[AssessmentAnswer] {
        &self.answers
    }

    /// O(1) membership check against the answered set.
    pub fn has_answered(&self, question_id: &str) -> bool {
        self.answered_questions.contains(question_id)
    }

    /// The answered set (mirrors the key set of `answers`).
    pub fn answered_questions(&self) -> &HashSet<String> {
        &self.answered_questions
    }

    /// Answered ids in answer-list order (the wire/persistence encoding of
    /// the set).
    pub fn answered_ids(&self) -> Vec<String> {
        self.answers.iter().map(|a| a.question_id.clone()).collect()
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn answered_count(&self) -> u32 {
        self.answered_count
    }

    pub fn total_count(&self) -> u32 {
        self.total_count
    }

    pub fn scores(&self) -> Option<&AssessmentScores> {
        self.scores.as_ref()
    }

    // --- Metadata setters ---

    pub async fn set_assessment_id(&mut self, id: Option<String>) -> Result<(), StoreError> {
        self.assessment_id = id;
        self.persist_metadata().await
    }

    pub async fn set_ifrs_standard(
        &mut self,
        standard: Option<IfrsStandard>,
    ) -> Result<(), StoreError> {
        self.ifrs_standard = standard;
        self.persist_metadata().await
    }

    pub async fn set_current_phase(
        &mut self,
        phase: Option<AssessmentPhase>,
    ) -> Result<(), StoreError> {
        self.current_phase = phase;
        self.persist_metadata().await
    }

    pub async fn set_status(&mut self, status: AssessmentStatus) -> Result<(), StoreError> {
        self.status = status;
        self.persist_metadata().await
    }

    // --- Answers ---

    /// Submit an answer (upsert).
    ///
    /// An existing entry for the question is replaced in place, keeping its
    /// list position; otherwise the answer is appended. The answered set
    /// gains the id either way. This is the authoritative submit operation.
    pub async fn add_answer(
        &mut self,
        question_id: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), StoreError> {
        let question_id = question_id.into();
        let answer = AssessmentAnswer {
            question_id: question_id.clone(),
            value: value.into(),
            timestamp: Utc::now(),
        };
        match self
            .answers
            .iter_mut()
            .find(|a| a.question_id == question_id)
        {
            Some(existing) => *existing = answer,
            None => self.answers.push(answer),
        }
        self.answered_questions.insert(question_id.clone());
        self.persist().await?;

        self.bus.publish(StoreEvent::AnswerRecorded { question_id });
        Ok(())
    }

    /// Update an existing answer's value and timestamp.
    ///
    /// Narrower than [`add_answer`](Self::add_answer): a question that was
    /// never added is a silent no-op -- nothing is created and the
    /// answered set is untouched.
    pub async fn update_answer(
        &mut self,
        question_id: &str,
        value: impl Into<String>,
    ) -> Result<(), StoreError> {
        let Some(existing) = self
            .answers
            .iter_mut()
            .find(|a| a.question_id == question_id)
        else {
            debug!(question_id, "Ignoring update for never-answered question");
            return Ok(());
        };
        existing.value = value.into();
        existing.timestamp = Utc::now();
        self.persist().await?;

        self.bus.publish(StoreEvent::AnswerRecorded {
            question_id: question_id.to_string(),
        });
        Ok(())
    }

    /// Remove an answer from both the list and the answered set.
    pub async fn remove_answer(&mut self, question_id: &str) -> Result<(), StoreError> {
        let before = self.answers.len();
        self.answers.retain(|a| a.question_id != question_id);
        self.answered_questions.remove(question_id);
        if self.answers.len() == before {
            return Ok(());
        }
        self.persist().await?;

        self.bus.publish(StoreEvent::AnswerRemoved {
            question_id: question_id.to_string(),
        });
        Ok(())
    }

    // --- Progress and scores ---

    /// Overwrite the progress fields. Omitted counts reset to 0 (replace
    /// semantics, not patch semantics).
    pub async fn set_progress(
        &mut self,
        progress: f64,
        answered_count: Option<u32>,
        total_count: Option<u32>,
    ) -> Result<(), StoreError> {
        self.progress = progress;
        self.answered_count = answered_count.unwrap_or(0);
        self.total_count = total_count.unwrap_or(0);
        self.persist().await?;

        self.bus.publish(StoreEvent::ProgressUpdated);
        Ok(())
    }

    /// Apply a backend progress snapshot.
    pub async fn apply_progress(&mut self, data: ProgressData) -> Result<(), StoreError> {
        self.set_progress(
            data.progress,
            Some(data.answered_count),
            Some(data.total_count),
        )
        .await
    }

    /// Replace the cached score snapshot wholesale.
    pub async fn set_scores(
        &mut self,
        scores: Option<AssessmentScores>,
    ) -> Result<(), StoreError> {
        self.scores = scores;
        self.persist().await?;

        self.bus.publish(StoreEvent::ScoresUpdated);
        Ok(())
    }

    /// Clear every field back to the initial empty state.
    pub async fn reset_assessment(&mut self) -> Result<(), StoreError> {
        self.assessment_id = None;
        self.ifrs_standard = None;
        self.current_phase = None;
        self.status = AssessmentStatus::InProgress;
        self.answers.clear();
        self.answered_questions.clear();
        self.progress = 0.0;
        self.answered_count = 0;
        self.total_count = 0;
        self.scores = None;
        self.persist().await?;

        self.bus.publish(StoreEvent::AssessmentReset);
        Ok(())
    }

    // --- Server-side mirror ---

    /// Project the tracker into the state shape the backend mirrors.
    pub fn session_state(&self) -> AssessmentSessionState {
        AssessmentSessionState {
            assessment_id: self.assessment_id.clone(),
            ifrs_standard: self.ifrs_standard,
            current_phase: self.current_phase,
            status: self.status,
            answers: self.answers.clone(),
            progress: self.progress,
            answered_count: self.answered_count,
            total_count: self.total_count,
        }
    }

    /// Replace the tracker's state with a server-side mirror, rebuilding
    /// the answered set from the answer list. Cached scores are dropped
    /// (the mirror does not carry them).
    pub async fn apply_session_state(
        &mut self,
        state: AssessmentSessionState,
    ) -> Result<(), StoreError> {
        self.assessment_id = state.assessment_id;
        self.ifrs_standard = state.ifrs_standard;
        self.current_phase = state.current_phase;
        self.status = state.status;
        self.answered_questions = state
            .answers
            .iter()
            .map(|a| a.question_id.clone())
            .collect();
        self.answers = state.answers;
        self.progress = state.progress;
        self.answered_count = state.answered_count;
        self.total_count = state.total_count;
        self.scores = None;
        self.persist().await?;

        self.bus.publish(StoreEvent::AssessmentUpdated);
        Ok(())
    }

    async fn persist_metadata(&self) -> Result<(), StoreError> {
        self.persist().await?;
        self.bus.publish(StoreEvent::AssessmentUpdated);
        Ok(())
    }

    async fn persist(&self) -> Result<(), StoreError> {
        let snapshot = AssessmentSnapshot {
            assessment_id: self.assessment_id.clone(),
            ifrs_standard: self.ifrs_standard,
            current_phase: self.current_phase,
            status: self.status,
            answers: self.answers.clone(),
            answered_questions: self.answered_ids(),
            progress: self.progress,
            answered_count: self.answered_count,
            total_count: self.total_count,
            scores: self.scores.clone(),
        };
        let value = snapshot::encode(&snapshot)?;
        self.store.set(ASSESSMENT_STORAGE_KEY, &value).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::MemoryStateStore;
    use complyx_types::assessment::CategoryScore;

    fn tracker() -> AssessmentTracker<MemoryStateStore> {
        AssessmentTracker::new(MemoryStateStore::new(), EventBus::default())
    }

    fn assert_set_mirrors_answers<S: StateStore>(tracker: &AssessmentTracker<S>) {
        let from_answers: HashSet<String> = tracker
            .answers()
            .iter()
            .map(|a| a.question_id.clone())
            .collect();
        assert_eq!(tracker.answered_questions(), &from_answers);
    }

    fn sample_scores() -> AssessmentScores {
        AssessmentScores {
            overall_score: 42.5,
            overall_percentage: 53.1,
            category_scores: vec![CategoryScore {
                category: "Governance".to_string(),
                score: 10.0,
                max_score: 20.0,
                percentage: 50.0,
                answered_count: 5,
                total_count: 10,
            }],
            total_answered: 12,
            total_questions: 40,
        }
    }

    #[tokio::test]
    async fn test_add_answer_appends_and_tracks_set() {
        let mut t = tracker();
        t.add_answer("S1-GOV-01", "yes").await.unwrap();
        t.add_answer("S1-RSK-02", "no").await.unwrap();

        assert_eq!(t.answers().len(), 2);
        assert!(t.has_answered("S1-GOV-01"));
        assert!(!t.has_answered("S9-NOPE"));
        assert_set_mirrors_answers(&t);
    }

    #[tokio::test]
    async fn test_add_answer_upsert_keeps_position() {
        let mut t = tracker();
        t.add_answer("q1", "no").await.unwrap();
        t.add_answer("q2", "maybe").await.unwrap();
        t.add_answer("q1", "yes").await.unwrap();

        let q1_entries: Vec<&AssessmentAnswer> = t
            .answers()
            .iter()
            .filter(|a| a.question_id == "q1")
            .collect();
        assert_eq!(q1_entries.len(), 1);
        assert_eq!(q1_entries[0].value, "yes");
        // Original list position preserved
        assert_eq!(t.answers()[0].question_id, "q1");
        assert_eq!(t.answers()[1].question_id, "q2");
        assert_set_mirrors_answers(&t);
    }

    #[tokio::test]
    async fn test_update_answer_touches_existing_only() {
        let mut t = tracker();
        t.add_answer("q1", "no").await.unwrap();
        let before = t.answers()[0].timestamp;

        t.update_answer("q1", "yes").await.unwrap();

        assert_eq!(t.answers()[0].value, "yes");
        assert!(t.answers()[0].timestamp >= before);
        assert_set_mirrors_answers(&t);
    }

    #[tokio::test]
    async fn test_update_answer_orphan_is_silent_noop() {
        let mut t = tracker();
        assert_eq!(t.answers().len(), 0);

        t.update_answer("qX", "value").await.unwrap();

        assert_eq!(t.answers().len(), 0);
        assert!(t.answered_questions().is_empty());
    }

    #[tokio::test]
    async fn test_remove_answer_keeps_set_in_sync() {
        let mut t = tracker();
        t.add_answer("q1", "a").await.unwrap();
        t.add_answer("q2", "b").await.unwrap();

        t.remove_answer("q1").await.unwrap();

        assert_eq!(t.answers().len(), 1);
        assert!(!t.has_answered("q1"));
        assert!(t.has_answered("q2"));
        assert_set_mirrors_answers(&t);
    }

    #[tokio::test]
    async fn test_set_invariant_over_mixed_sequence() {
        let mut t = tracker();
        t.add_answer("a", "1").await.unwrap();
        t.add_answer("b", "2").await.unwrap();
        t.remove_answer("a").await.unwrap();
        t.add_answer("c", "3").await.unwrap();
        t.add_answer("b", "2b").await.unwrap();
        t.remove_answer("missing").await.unwrap();

        assert_set_mirrors_answers(&t);
        assert_eq!(t.answered_ids(), vec!["b", "c"]);
    }

    #[tokio::test]
    async fn test_set_progress_replace_semantics() {
        let mut t = tracker();
        t.set_progress(30.0, Some(12), Some(40)).await.unwrap();
        assert_eq!(t.progress(), 30.0);
        assert_eq!(t.answered_count(), 12);
        assert_eq!(t.total_count(), 40);

        // Omitted counts reset to 0, not "unchanged"
        t.set_progress(35.0, None, None).await.unwrap();
        assert_eq!(t.progress(), 35.0);
        assert_eq!(t.answered_count(), 0);
        assert_eq!(t.total_count(), 0);
    }

    #[tokio::test]
    async fn test_set_scores_replaces_wholesale() {
        let mut t = tracker();
        t.set_scores(Some(sample_scores())).await.unwrap();
        assert_eq!(t.scores().unwrap().total_answered, 12);

        t.set_scores(None).await.unwrap();
        assert!(t.scores().is_none());
    }

    #[tokio::test]
    async fn test_metadata_setters() {
        let mut t = tracker();
        t.set_assessment_id(Some("assess-42".to_string())).await.unwrap();
        t.set_ifrs_standard(Some(IfrsStandard::S2)).await.unwrap();
        t.set_current_phase(Some(AssessmentPhase::Detailed)).await.unwrap();
        t.set_status(AssessmentStatus::Paused).await.unwrap();

        assert_eq!(t.assessment_id(), Some("assess-42"));
        assert_eq!(t.ifrs_standard(), Some(IfrsStandard::S2));
        assert_eq!(t.current_phase(), Some(AssessmentPhase::Detailed));
        assert_eq!(t.status(), AssessmentStatus::Paused);
    }

    #[tokio::test]
    async fn test_reset_clears_everything() {
        let mut t = tracker();
        t.set_assessment_id(Some("assess-42".to_string())).await.unwrap();
        t.set_ifrs_standard(Some(IfrsStandard::S1)).await.unwrap();
        t.set_current_phase(Some(AssessmentPhase::Quick)).await.unwrap();
        t.set_status(AssessmentStatus::Completed).await.unwrap();
        t.add_answer("q1", "yes").await.unwrap();
        t.set_progress(50.0, Some(1), Some(2)).await.unwrap();
        t.set_scores(Some(sample_scores())).await.unwrap();

        t.reset_assessment().await.unwrap();

        assert!(t.assessment_id().is_none());
        assert!(t.ifrs_standard().is_none());
        assert!(t.current_phase().is_none());
        assert_eq!(t.status(), AssessmentStatus::InProgress);
        assert!(t.answers().is_empty());
        assert!(t.answered_questions().is_empty());
        assert_eq!(t.progress(), 0.0);
        assert_eq!(t.answered_count(), 0);
        assert_eq!(t.total_count(), 0);
        assert!(t.scores().is_none());
    }

    #[tokio::test]
    async fn test_write_through_and_reload() {
        let store = MemoryStateStore::new();
        let mut t = AssessmentTracker::new(store, EventBus::default());
        t.set_ifrs_standard(Some(IfrsStandard::S1)).await.unwrap();
        t.add_answer("q1", "yes").await.unwrap();
        t.add_answer("q2", "no").await.unwrap();
        t.add_answer("q3", "partial").await.unwrap();
        t.set_progress(7.5, Some(3), Some(40)).await.unwrap();
        let timestamps: Vec<_> = t.answers().iter().map(|a| a.timestamp).collect();

        let AssessmentTracker { store, .. } = t;
        let reloaded = AssessmentTracker::load(store, EventBus::default())
            .await
            .unwrap();

        assert_eq!(reloaded.ifrs_standard(), Some(IfrsStandard::S1));
        assert_eq!(reloaded.answers().len(), 3);
        // Timestamp equality across the ISO round trip
        let reloaded_timestamps: Vec<_> =
            reloaded.answers().iter().map(|a| a.timestamp).collect();
        assert_eq!(reloaded_timestamps, timestamps);
        // Set equality after array re-encoding
        assert_eq!(reloaded.answered_questions().len(), 3);
        assert_set_mirrors_answers(&reloaded);
        assert_eq!(reloaded.progress(), 7.5);
    }

    #[tokio::test]
    async fn test_load_malformed_record_fails_loud() {
        let store = MemoryStateStore::new();
        store
            .set(ASSESSMENT_STORAGE_KEY, &serde_json::json!("corrupted"))
            .await
            .unwrap();

        let err = AssessmentTracker::load(store, EventBus::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }

    #[tokio::test]
    async fn test_session_state_roundtrip_through_mirror() {
        let mut t = tracker();
        t.set_assessment_id(Some("assess-42".to_string())).await.unwrap();
        t.add_answer("q1", "yes").await.unwrap();
        t.set_progress(25.0, Some(1), Some(4)).await.unwrap();

        let state = t.session_state();
        assert_eq!(state.assessment_id.as_deref(), Some("assess-42"));
        assert_eq!(state.answers.len(), 1);

        let mut other = tracker();
        other.apply_session_state(state).await.unwrap();
        assert_eq!(other.assessment_id(), Some("assess-42"));
        assert!(other.has_answered("q1"));
        assert_eq!(other.progress(), 25.0);
        assert_set_mirrors_answers(&other);
    }

    #[tokio::test]
    async fn test_events_published_on_answer() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();
        let mut t = AssessmentTracker::new(MemoryStateStore::new(), bus);

        t.add_answer("q1", "yes").await.unwrap();
        t.remove_answer("q1").await.unwrap();

        assert_eq!(
            rx.recv().await.unwrap(),
            StoreEvent::AnswerRecorded {
                question_id: "q1".to_string()
            }
        );
        assert_eq!(
            rx.recv().await.unwrap(),
            StoreEvent::AnswerRemoved {
                question_id: "q1".to_string()
            }
        );
    }
}
