//! Landmark sources for the focus tracker.
//!
//! Face detection and landmark extraction happen outside this crate. A
//! [`LandmarkSource`] is the seam through which the tracker asks the external
//! model for the current frame's landmarks, once per tick.

pub mod channel;
pub mod replay;
pub mod scripted;
pub mod types;

use thiserror::Error;

// Re-export commonly used types
pub use channel::{channel_source, ChannelSource, FrameSender};
pub use replay::{read_entries, ReplayEntry};
pub use scripted::ScriptedSource;
pub use types::{Detection, FaceLandmarks, Landmark, LandmarkFrame};

/// Errors raised by a landmark source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Landmark model failed to initialize: {0}")]
    Initialization(String),

    #[error("Landmark detection failed: {0}")]
    Detection(String),

    #[error("Landmark producer disconnected")]
    Disconnected,
}

/// A per-frame supplier of face landmarks.
pub trait LandmarkSource: Send {
    /// Prepare the underlying model. Called once when tracking starts.
    fn initialize(&mut self) -> Result<(), SourceError> {
        Ok(())
    }

    /// Detect landmarks in the current frame.
    ///
    /// `timestamp_ms` increases strictly from one call to the next within a
    /// tracking session.
    fn detect(&mut self, timestamp_ms: i64) -> Result<Detection, SourceError>;
}

impl<S: LandmarkSource + ?Sized> LandmarkSource for Box<S> {
    fn initialize(&mut self) -> Result<(), SourceError> {
        (**self).initialize()
    }

    fn detect(&mut self, timestamp_ms: i64) -> Result<Detection, SourceError> {
        (**self).detect(timestamp_ms)
    }
}
