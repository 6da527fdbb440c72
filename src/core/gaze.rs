//! Gaze ratio and focus scoring.
//!
//! A gaze ratio places the iris between the inner (0) and outer (1) eye corner.
//! Both eyes looking at the geometric center (0.5) is treated as looking
//! straight at the screen, and the focus level falls off linearly with the mean
//! deviation from that center.

use crate::core::geometry::{EyeGeometry, FrameGeometry, Point2};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Gaze ratio of an iris sitting exactly between the corners.
pub const IDEAL_GAZE_RATIO: f64 = 0.5;

/// Focus loss per unit of mean deviation. A deviation of 0.4 saturates to zero.
pub const FOCUS_SENSITIVITY: f64 = 2.5;

/// Focus level at or above which a sample counts as "focused".
pub const FOCUSED_THRESHOLD: f64 = 60.0;

/// Normalized horizontal gaze ratio of one eye, in [0, 1].
///
/// A zero-width eye (corners coincide, usually an undetected eye) is reported
/// as centered.
pub fn gaze_ratio(iris_center: Point2, inner_corner: Point2, outer_corner: Point2) -> f64 {
    let eye_width = outer_corner.distance(&inner_corner);
    if eye_width == 0.0 {
        return IDEAL_GAZE_RATIO;
    }
    (iris_center.distance(&inner_corner) / eye_width).clamp(0.0, 1.0)
}

/// Gaze ratio of an extracted eye.
pub fn eye_gaze_ratio(eye: &EyeGeometry) -> f64 {
    gaze_ratio(eye.iris_center, eye.inner_corner, eye.outer_corner)
}

/// Mean absolute deviation of both eyes from the centered ratio.
pub fn gaze_deviation(left_ratio: f64, right_ratio: f64) -> f64 {
    ((left_ratio - IDEAL_GAZE_RATIO).abs() + (right_ratio - IDEAL_GAZE_RATIO).abs()) / 2.0
}

/// Instantaneous focus level in [0, 100].
pub fn focus_level(left_ratio: f64, right_ratio: f64) -> f64 {
    let deviation = gaze_deviation(left_ratio, right_ratio);
    (1.0 - deviation * FOCUS_SENSITIVITY).clamp(0.0, 1.0) * 100.0
}

/// Per-frame gaze reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GazeReading {
    pub left_ratio: f64,
    pub right_ratio: f64,
    /// Raw (unsmoothed) focus level
    pub focus_level: f64,
}

impl GazeReading {
    pub fn from_geometry(geometry: &FrameGeometry) -> Self {
        let left_ratio = eye_gaze_ratio(&geometry.left);
        let right_ratio = eye_gaze_ratio(&geometry.right);
        Self {
            left_ratio,
            right_ratio,
            focus_level: focus_level(left_ratio, right_ratio),
        }
    }
}

/// Five-level focus classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FocusStatus {
    #[serde(rename = "HIGHLY FOCUSED")]
    HighlyFocused,
    #[serde(rename = "FOCUSED")]
    Focused,
    #[serde(rename = "PARTIALLY FOCUSED")]
    PartiallyFocused,
    #[serde(rename = "DISTRACTED")]
    Distracted,
    #[serde(rename = "NOT FOCUSED")]
    NotFocused,
}

impl FocusStatus {
    /// Classify a focus level. Lower bounds are inclusive.
    pub fn from_level(focus_level: f64) -> Self {
        if focus_level >= 80.0 {
            FocusStatus::HighlyFocused
        } else if focus_level >= 60.0 {
            FocusStatus::Focused
        } else if focus_level >= 40.0 {
            FocusStatus::PartiallyFocused
        } else if focus_level >= 20.0 {
            FocusStatus::Distracted
        } else {
            FocusStatus::NotFocused
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FocusStatus::HighlyFocused => "HIGHLY FOCUSED",
            FocusStatus::Focused => "FOCUSED",
            FocusStatus::PartiallyFocused => "PARTIALLY FOCUSED",
            FocusStatus::Distracted => "DISTRACTED",
            FocusStatus::NotFocused => "NOT FOCUSED",
        }
    }
}

impl fmt::Display for FocusStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
