//! Core functionality for the Synheart Focus Agent.
//!
//! This module contains:
//! - Eye geometry extraction from face-mesh landmarks
//! - Gaze ratio and focus scoring
//! - Temporal smoothing of the focus signal
//! - Per-question recording and aggregation
//! - Session report building for export

pub mod aggregate;
pub mod gaze;
pub mod geometry;
pub mod recorder;
pub mod report;
pub mod smoothing;

// Re-export commonly used types
pub use aggregate::{per_question_data, session_summary, PerQuestionFocus, SessionFocusSummary};
pub use gaze::{focus_level, gaze_deviation, gaze_ratio, FocusStatus, GazeReading};
pub use geometry::{
    extract_eye_geometry, EyeGeometry, FrameGeometry, GeometryError, LandmarkTopology, Point2,
    FACE_MESH_IRIS_V1,
};
pub use recorder::{GazeSample, QuestionBucket, RecordError, SessionRecorder};
pub use report::{ReportBuilder, SessionReport, PRODUCER_NAME, REPORT_VERSION};
pub use smoothing::{SmoothingWindow, SMOOTHING_WINDOW_SIZE};
