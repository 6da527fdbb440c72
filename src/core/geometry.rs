//! Eye geometry extraction from face-mesh landmarks.
//!
//! The landmark indices are tied to the upstream face-mesh topology (478 points
//! with iris refinement). They live in a single versioned table so a model
//! upgrade only touches [`FACE_MESH_IRIS_V1`].

use crate::source::types::Landmark;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A 2D point in normalized image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Point2) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl From<Landmark> for Point2 {
    fn from(landmark: Landmark) -> Self {
        Self::new(landmark.x, landmark.y)
    }
}

/// Landmark indices describing one eye.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EyeIndices {
    pub iris: [usize; 4],
    pub inner_corner: usize,
    pub outer_corner: usize,
}

impl EyeIndices {
    /// Every landmark index the eye references.
    fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.iris
            .iter()
            .copied()
            .chain([self.inner_corner, self.outer_corner])
    }

    fn max_index(&self) -> usize {
        self.indices().max().unwrap_or(0)
    }
}

/// Landmark index table for both eyes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LandmarkTopology {
    /// Version tag of the upstream model topology
    pub version: &'static str,
    pub left: EyeIndices,
    pub right: EyeIndices,
}

impl LandmarkTopology {
    /// Highest landmark index referenced by the table.
    pub fn max_index(&self) -> usize {
        self.left.max_index().max(self.right.max_index())
    }

    /// Minimum number of landmarks a frame must carry.
    pub fn required_landmarks(&self) -> usize {
        self.max_index() + 1
    }
}

/// Face-mesh topology with refined iris landmarks.
pub const FACE_MESH_IRIS_V1: LandmarkTopology = LandmarkTopology {
    version: "face_mesh_iris_v1",
    left: EyeIndices {
        iris: [474, 475, 476, 477],
        inner_corner: 362,
        outer_corner: 263,
    },
    right: EyeIndices {
        iris: [469, 470, 471, 472],
        inner_corner: 133,
        outer_corner: 33,
    },
};

/// Iris center and corners of one eye.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EyeGeometry {
    pub iris_center: Point2,
    pub inner_corner: Point2,
    pub outer_corner: Point2,
}

/// Geometry of both eyes for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameGeometry {
    pub left: EyeGeometry,
    pub right: EyeGeometry,
}

/// Errors extracting eye geometry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    #[error("Frame has {available} landmarks, topology requires {required}")]
    InsufficientLandmarks { available: usize, required: usize },

    #[error("Landmark {index} has a non-finite coordinate")]
    NonFiniteLandmark { index: usize },
}

/// Extract both eyes' geometry from a frame's landmarks.
pub fn extract_eye_geometry(
    landmarks: &[Landmark],
    topology: &LandmarkTopology,
) -> Result<FrameGeometry, GeometryError> {
    if landmarks.len() <= topology.max_index() {
        return Err(GeometryError::InsufficientLandmarks {
            available: landmarks.len(),
            required: topology.required_landmarks(),
        });
    }

    for eye in [&topology.left, &topology.right] {
        if let Some(index) = eye.indices().find(|&idx| !landmarks[idx].is_finite()) {
            return Err(GeometryError::NonFiniteLandmark { index });
        }
    }

    Ok(FrameGeometry {
        left: eye_geometry(landmarks, &topology.left),
        right: eye_geometry(landmarks, &topology.right),
    })
}

/// Caller guarantees every index is in bounds.
fn eye_geometry(landmarks: &[Landmark], eye: &EyeIndices) -> EyeGeometry {
    EyeGeometry {
        iris_center: iris_center(landmarks, &eye.iris),
        inner_corner: landmarks[eye.inner_corner].into(),
        outer_corner: landmarks[eye.outer_corner].into(),
    }
}

/// Arithmetic mean of the iris landmarks.
fn iris_center(landmarks: &[Landmark], iris: &[usize; 4]) -> Point2 {
    let (sum_x, sum_y) = iris.iter().fold((0.0, 0.0), |(sx, sy), &idx| {
        (sx + landmarks[idx].x, sy + landmarks[idx].y)
    });
    let count = iris.len() as f64;
    Point2::new(sum_x / count, sum_y / count)
}
