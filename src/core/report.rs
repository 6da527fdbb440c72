//! Session report export.
//!
//! A report wraps the session focus summary with producer and timing metadata
//! so the host can persist it alongside the quiz-attempt result.

use crate::core::aggregate::SessionFocusSummary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The current report format version.
pub const REPORT_VERSION: &str = "1.0";

/// The name of this producer.
pub const PRODUCER_NAME: &str = "synheart-focus-agent";

/// Producer metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportProducer {
    /// Name of the producing software
    pub name: String,
    /// Version of the producing software
    pub version: String,
    /// Unique instance identifier (UUID)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
}

/// Privacy declaration embedded in every report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportPrivacy {
    /// Whether any video frame or image was stored
    pub contains_images: bool,
    /// Whether raw landmark coordinates were stored
    pub contains_landmarks: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Default for ReportPrivacy {
    fn default() -> Self {
        Self {
            contains_images: false,
            contains_landmarks: false,
            notes: Some("Only gaze ratios and focus levels are retained".to_string()),
        }
    }
}

/// Exported focus report for one tracking session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub report_version: String,
    pub producer: ReportProducer,
    /// Identifier of the machine that ran the tracker
    pub device_id: String,
    pub session_id: String,
    pub started_at_utc: String,
    pub ended_at_utc: String,
    pub computed_at_utc: String,
    /// Overall focus as a whole percentage
    pub focus_time_percent: u32,
    pub summary: SessionFocusSummary,
    pub privacy: ReportPrivacy,
}

/// Builder for session reports.
pub struct ReportBuilder {
    instance_id: Uuid,
    device_id: String,
    include_snapshots: bool,
}

impl Default for ReportBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportBuilder {
    /// Create a builder with a fresh instance ID and the local hostname.
    pub fn new() -> Self {
        let device_id = hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_else(|| "unknown-host".to_string());

        Self {
            instance_id: Uuid::new_v4(),
            device_id,
            include_snapshots: true,
        }
    }

    /// Override the device ID.
    pub fn with_device_id(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = device_id.into();
        self
    }

    /// Whether per-sample snapshots are kept in the exported summary.
    pub fn include_snapshots(mut self, include: bool) -> Self {
        self.include_snapshots = include;
        self
    }

    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    /// Build a report for a finished session.
    pub fn build(
        &self,
        session_id: &str,
        started_at: DateTime<Utc>,
        ended_at: DateTime<Utc>,
        summary: &SessionFocusSummary,
    ) -> SessionReport {
        let mut summary = summary.clone();
        if !self.include_snapshots {
            for question in &mut summary.per_question {
                question.snapshots.clear();
            }
        }

        SessionReport {
            report_version: REPORT_VERSION.to_string(),
            producer: ReportProducer {
                name: PRODUCER_NAME.to_string(),
                version: crate::VERSION.to_string(),
                instance_id: Some(self.instance_id.to_string()),
            },
            device_id: self.device_id.clone(),
            session_id: session_id.to_string(),
            started_at_utc: started_at.to_rfc3339(),
            ended_at_utc: ended_at.to_rfc3339(),
            computed_at_utc: Utc::now().to_rfc3339(),
            focus_time_percent: summary.focus_time_percent(),
            summary,
            privacy: ReportPrivacy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::aggregate::session_summary;
    use crate::core::recorder::{GazeSample, SessionRecorder};
    use chrono::Duration;

    fn summary() -> SessionFocusSummary {
        let mut recorder = SessionRecorder::new(1);
        recorder.record(GazeSample::new(0, 72.0, 0.5, 0.5)).unwrap();
        recorder.record(GazeSample::new(500, 68.0, 0.5, 0.5)).unwrap();
        session_summary(&recorder)
    }

    #[test]
    fn test_build_report() {
        let builder = ReportBuilder::new().with_device_id("lab-01");
        let start = Utc::now();
        let report = builder.build("sess-1", start, start + Duration::seconds(5), &summary());

        assert_eq!(report.report_version, REPORT_VERSION);
        assert_eq!(report.producer.name, PRODUCER_NAME);
        assert_eq!(
            report.producer.instance_id,
            Some(builder.instance_id().to_string())
        );
        assert_eq!(report.device_id, "lab-01");
        assert_eq!(report.session_id, "sess-1");
        assert_eq!(report.focus_time_percent, 70);
        assert_eq!(report.summary.per_question[0].snapshots.len(), 2);
        assert!(!report.privacy.contains_images);
    }

    #[test]
    fn test_report_without_snapshots() {
        let builder = ReportBuilder::new().include_snapshots(false);
        let now = Utc::now();
        let report = builder.build("sess-2", now, now, &summary());

        assert!(report.summary.per_question[0].snapshots.is_empty());
        // Aggregates are computed before snapshots are dropped
        assert_eq!(report.summary.total_samples, 2);
    }

    #[test]
    fn test_report_round_trips_through_json() {
        let now = Utc::now();
        let report = ReportBuilder::new().build("sess-3", now, now, &summary());
        let json = serde_json::to_string_pretty(&report).unwrap();
        let parsed: SessionReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, report);
        assert!(json.contains("\"focus_status\": \"FOCUSED\""));
    }
}
