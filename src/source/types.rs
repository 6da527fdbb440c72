//! Landmark frame types exchanged between landmark producers and the tracker.
//!
//! These types carry ONLY face-landmark geometry - never pixels. Video frames
//! stay with the external landmark model; the tracker sees normalized points.

use serde::{Deserialize, Serialize};

/// A single face-mesh landmark in normalized image coordinates (0..1).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Whether both coordinates are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// One face's landmark sequence, as produced by the external model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceLandmarks {
    /// Landmarks in the model's fixed ordering
    pub landmarks: Vec<Landmark>,
    /// Capture time of the source frame (ms), when the producer knows it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured_at_ms: Option<i64>,
}

impl FaceLandmarks {
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        Self {
            landmarks,
            captured_at_ms: None,
        }
    }

    /// Attach the capture timestamp of the source frame.
    pub fn captured_at(mut self, timestamp_ms: i64) -> Self {
        self.captured_at_ms = Some(timestamp_ms);
        self
    }
}

/// Result of asking a landmark source about the current frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Detection {
    /// The frame is not decodable yet; try again next tick
    NotReady,
    /// The frame was processed but no face was found
    NoFace,
    /// Exactly one face was found
    Face(FaceLandmarks),
}

/// A frame as delivered by a producer (face-mesh sidecar, recording, ...).
///
/// An empty landmark list means the model found no face in the frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LandmarkFrame {
    /// Whether the underlying video frame was decodable
    #[serde(default = "default_ready")]
    pub ready: bool,
    /// Landmarks of the single tracked face (empty when none was found)
    #[serde(default)]
    pub landmarks: Vec<Landmark>,
    /// Capture time of the frame (ms)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured_at_ms: Option<i64>,
}

fn default_ready() -> bool {
    true
}

impl LandmarkFrame {
    /// A decodable frame with one face.
    pub fn face(landmarks: Vec<Landmark>) -> Self {
        Self {
            ready: true,
            landmarks,
            captured_at_ms: None,
        }
    }

    /// A decodable frame in which no face was found.
    pub fn no_face() -> Self {
        Self::face(Vec::new())
    }

    /// A frame that could not be decoded yet.
    pub fn not_ready() -> Self {
        Self {
            ready: false,
            landmarks: Vec::new(),
            captured_at_ms: None,
        }
    }

    pub fn captured_at(mut self, timestamp_ms: i64) -> Self {
        self.captured_at_ms = Some(timestamp_ms);
        self
    }

    /// Convert the frame into the detection the tracker consumes.
    pub fn into_detection(self) -> Detection {
        if !self.ready {
            Detection::NotReady
        } else if self.landmarks.is_empty() {
            Detection::NoFace
        } else {
            Detection::Face(FaceLandmarks {
                landmarks: self.landmarks,
                captured_at_ms: self.captured_at_ms,
            })
        }
    }
}
