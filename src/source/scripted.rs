//! In-memory scripted source.
//!
//! Plays back a fixed list of detection results, one per call. Useful for
//! demos and for driving the tracker deterministically in tests.

use crate::source::types::{Detection, LandmarkFrame};
use crate::source::{LandmarkSource, SourceError};
use std::collections::VecDeque;

/// A source that returns pre-scripted results in order.
///
/// Once the script runs out every call reports [`Detection::NotReady`].
#[derive(Default)]
pub struct ScriptedSource {
    script: VecDeque<Result<Detection, SourceError>>,
    init_error: Option<String>,
    timestamps: Vec<i64>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a script from landmark frames.
    pub fn from_frames(frames: impl IntoIterator<Item = LandmarkFrame>) -> Self {
        let mut source = Self::new();
        for frame in frames {
            source.push(Ok(frame.into_detection()));
        }
        source
    }

    /// Append one result to the script.
    pub fn push(&mut self, result: Result<Detection, SourceError>) {
        self.script.push_back(result);
    }

    /// Builder form of [`ScriptedSource::push`].
    pub fn then(mut self, result: Result<Detection, SourceError>) -> Self {
        self.push(result);
        self
    }

    /// Make `initialize` fail with the given message.
    pub fn failing_init(mut self, message: &str) -> Self {
        self.init_error = Some(message.to_string());
        self
    }

    /// Number of scripted results not yet consumed.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }

    /// Timestamps passed to `detect`, in call order.
    pub fn timestamps(&self) -> &[i64] {
        &self.timestamps
    }
}

impl LandmarkSource for ScriptedSource {
    fn initialize(&mut self) -> Result<(), SourceError> {
        match self.init_error {
            Some(ref message) => Err(SourceError::Initialization(message.clone())),
            None => Ok(()),
        }
    }

    fn detect(&mut self, timestamp_ms: i64) -> Result<Detection, SourceError> {
        self.timestamps.push(timestamp_ms);
        self.script.pop_front().unwrap_or(Ok(Detection::NotReady))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_plays_in_order() {
        let mut source = ScriptedSource::new()
            .then(Ok(Detection::NoFace))
            .then(Err(SourceError::Detection("boom".to_string())));

        assert_eq!(source.remaining(), 2);
        assert_eq!(source.detect(1).unwrap(), Detection::NoFace);
        assert!(source.detect(2).is_err());
        assert_eq!(source.detect(3).unwrap(), Detection::NotReady);
        assert_eq!(source.timestamps(), &[1, 2, 3]);
    }

    #[test]
    fn test_failing_init() {
        let mut source = ScriptedSource::new().failing_init("model missing");
        assert!(matches!(
            source.initialize(),
            Err(SourceError::Initialization(_))
        ));
    }
}
