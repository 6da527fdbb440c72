//! Per-question recording of smoothed gaze samples.
//!
//! Samples are filed under the question the host reports as active. Buckets
//! are created lazily on the first sample and are append-only until the
//! session is finalized.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// A smoothed focus sample taken from one processed frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GazeSample {
    /// When the sample was taken (ms)
    pub timestamp: i64,
    /// Smoothed focus level (0-100)
    pub focus_level: f64,
    /// Left-eye gaze ratio (0-1)
    pub left_gaze_ratio: f64,
    /// Right-eye gaze ratio (0-1)
    pub right_gaze_ratio: f64,
}

impl GazeSample {
    /// Create a sample, clamping each value into its valid range.
    pub fn new(timestamp: i64, focus_level: f64, left_gaze_ratio: f64, right_gaze_ratio: f64) -> Self {
        Self {
            timestamp,
            focus_level: focus_level.clamp(0.0, 100.0),
            left_gaze_ratio: left_gaze_ratio.clamp(0.0, 1.0),
            right_gaze_ratio: right_gaze_ratio.clamp(0.0, 1.0),
        }
    }
}

/// Samples recorded while one question was active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionBucket {
    /// Question number (1-based)
    pub question_number: u32,
    /// Time of the first sample for this question (ms)
    pub start_time: i64,
    /// Samples in arrival order
    pub snapshots: Vec<GazeSample>,
}

impl QuestionBucket {
    fn new(question_number: u32, start_time: i64) -> Self {
        Self {
            question_number,
            start_time,
            snapshots: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }
}

/// Errors recording samples.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("Question numbers start at 1, got {0}")]
    InvalidQuestion(u32),

    #[error("Session is finalized; no further samples can be recorded")]
    Finalized,
}

/// Owns the question buckets of one tracking session.
#[derive(Debug, Clone)]
pub struct SessionRecorder {
    buckets: BTreeMap<u32, QuestionBucket>,
    current_question: u32,
    finalized: bool,
}

impl Default for SessionRecorder {
    fn default() -> Self {
        Self::new(1)
    }
}

impl SessionRecorder {
    /// Create an empty recorder with the given active question.
    ///
    /// A zero question number is treated as 1.
    pub fn new(initial_question: u32) -> Self {
        Self {
            buckets: BTreeMap::new(),
            current_question: initial_question.max(1),
            finalized: false,
        }
    }

    /// Redirect subsequent samples to question `question`.
    pub fn set_current_question(&mut self, question: u32) -> Result<(), RecordError> {
        if question == 0 {
            return Err(RecordError::InvalidQuestion(question));
        }
        self.current_question = question;
        Ok(())
    }

    pub fn current_question(&self) -> u32 {
        self.current_question
    }

    /// Append a sample to the active question's bucket.
    pub fn record(&mut self, sample: GazeSample) -> Result<(), RecordError> {
        if self.finalized {
            return Err(RecordError::Finalized);
        }
        let question = self.current_question;
        self.buckets
            .entry(question)
            .or_insert_with(|| QuestionBucket::new(question, sample.timestamp))
            .snapshots
            .push(sample);
        Ok(())
    }

    /// Freeze the recorded buckets.
    pub fn finalize(&mut self) {
        self.finalized = true;
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Drop all buckets and un-finalize. The active question is kept.
    pub fn clear(&mut self) {
        self.buckets.clear();
        self.finalized = false;
    }

    /// Clear and start over with the given active question.
    pub fn reset(&mut self, initial_question: u32) {
        self.clear();
        self.current_question = initial_question.max(1);
    }

    /// Buckets in ascending question order.
    pub fn buckets(&self) -> impl Iterator<Item = &QuestionBucket> {
        self.buckets.values()
    }

    pub fn bucket(&self, question: u32) -> Option<&QuestionBucket> {
        self.buckets.get(&question)
    }

    /// Total number of samples across all questions.
    pub fn sample_count(&self) -> usize {
        self.buckets.values().map(QuestionBucket::len).sum()
    }
}
