//! Privacy-preserving transparency log.
//!
//! This module tracks and exposes statistics about what the tracker processed
//! without storing any frame, landmark or identifying information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Transparency statistics for the current run.
#[derive(Debug)]
pub struct TransparencyLog {
    /// Number of tracking sessions started
    sessions_started: AtomicU64,
    /// Number of frames that produced a focus sample
    frames_processed: AtomicU64,
    /// Number of ticks skipped because the frame was not decodable
    frames_not_ready: AtomicU64,
    /// Number of frames in which no face was found
    frames_without_face: AtomicU64,
    /// Number of frames with too few landmarks for the eye topology
    frames_rejected: AtomicU64,
    /// Number of ticks that failed with a source error
    tick_errors: AtomicU64,
    /// Number of session reports exported
    reports_exported: AtomicU64,
    /// Run start time
    session_start: DateTime<Utc>,
    /// Path for persisting stats
    persist_path: Option<PathBuf>,
}

impl TransparencyLog {
    /// Create a new transparency log.
    pub fn new() -> Self {
        Self {
            sessions_started: AtomicU64::new(0),
            frames_processed: AtomicU64::new(0),
            frames_not_ready: AtomicU64::new(0),
            frames_without_face: AtomicU64::new(0),
            frames_rejected: AtomicU64::new(0),
            tick_errors: AtomicU64::new(0),
            reports_exported: AtomicU64::new(0),
            session_start: Utc::now(),
            persist_path: None,
        }
    }

    /// Create a transparency log with persistence.
    pub fn with_persistence(path: PathBuf) -> Self {
        let mut log = Self::new();
        log.persist_path = Some(path);

        // Try to load existing stats
        if let Err(e) = log.load() {
            tracing::warn!("Could not load previous transparency stats: {e}");
        }

        log
    }

    pub fn record_session_started(&self) {
        self.sessions_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_frame_processed(&self) {
        self.frames_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_frame_not_ready(&self) {
        self.frames_not_ready.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_frame_without_face(&self) {
        self.frames_without_face.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_frame_rejected(&self) {
        self.frames_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_tick_error(&self) {
        self.tick_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_report_exported(&self) {
        self.reports_exported.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the current statistics.
    pub fn stats(&self) -> TransparencyStats {
        TransparencyStats {
            sessions_started: self.sessions_started.load(Ordering::Relaxed),
            frames_processed: self.frames_processed.load(Ordering::Relaxed),
            frames_not_ready: self.frames_not_ready.load(Ordering::Relaxed),
            frames_without_face: self.frames_without_face.load(Ordering::Relaxed),
            frames_rejected: self.frames_rejected.load(Ordering::Relaxed),
            tick_errors: self.tick_errors.load(Ordering::Relaxed),
            reports_exported: self.reports_exported.load(Ordering::Relaxed),
            session_start: self.session_start,
            session_duration_secs: (Utc::now() - self.session_start).num_seconds().max(0) as u64,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let stats = self.stats();
        format!(
            "Tracking Statistics:\n\
             - Sessions started: {}\n\
             - Frames processed: {}\n\
             - Frames not ready: {}\n\
             - Frames without a face: {}\n\
             - Frames rejected (incomplete landmarks): {}\n\
             - Tick errors: {}\n\
             - Reports exported: {}\n\
             - Run duration: {} seconds\n\
             \n\
             Privacy Guarantee:\n\
             - No video frames or images stored\n\
             - No landmark coordinates stored\n\
             - Only gaze ratios and focus levels retained",
            stats.sessions_started,
            stats.frames_processed,
            stats.frames_not_ready,
            stats.frames_without_face,
            stats.frames_rejected,
            stats.tick_errors,
            stats.reports_exported,
            stats.session_duration_secs
        )
    }

    /// Save stats to disk.
    pub fn save(&self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            // Ensure parent directory exists
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let stats = self.stats();
            let persisted = PersistedStats {
                sessions_started: stats.sessions_started,
                frames_processed: stats.frames_processed,
                frames_not_ready: stats.frames_not_ready,
                frames_without_face: stats.frames_without_face,
                frames_rejected: stats.frames_rejected,
                tick_errors: stats.tick_errors,
                reports_exported: stats.reports_exported,
                last_updated: Utc::now(),
            };

            let json = serde_json::to_string_pretty(&persisted).map_err(std::io::Error::other)?;

            std::fs::write(path, json)?;
        }
        Ok(())
    }

    /// Load stats from disk.
    fn load(&mut self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                let persisted: PersistedStats =
                    serde_json::from_str(&content).map_err(std::io::Error::other)?;

                self.sessions_started
                    .store(persisted.sessions_started, Ordering::Relaxed);
                self.frames_processed
                    .store(persisted.frames_processed, Ordering::Relaxed);
                self.frames_not_ready
                    .store(persisted.frames_not_ready, Ordering::Relaxed);
                self.frames_without_face
                    .store(persisted.frames_without_face, Ordering::Relaxed);
                self.frames_rejected
                    .store(persisted.frames_rejected, Ordering::Relaxed);
                self.tick_errors
                    .store(persisted.tick_errors, Ordering::Relaxed);
                self.reports_exported
                    .store(persisted.reports_exported, Ordering::Relaxed);
            }
        }
        Ok(())
    }

    /// Reset all counters.
    pub fn reset(&self) {
        self.sessions_started.store(0, Ordering::Relaxed);
        self.frames_processed.store(0, Ordering::Relaxed);
        self.frames_not_ready.store(0, Ordering::Relaxed);
        self.frames_without_face.store(0, Ordering::Relaxed);
        self.frames_rejected.store(0, Ordering::Relaxed);
        self.tick_errors.store(0, Ordering::Relaxed);
        self.reports_exported.store(0, Ordering::Relaxed);
    }
}

impl Default for TransparencyLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of transparency statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransparencyStats {
    pub sessions_started: u64,
    pub frames_processed: u64,
    pub frames_not_ready: u64,
    pub frames_without_face: u64,
    pub frames_rejected: u64,
    pub tick_errors: u64,
    pub reports_exported: u64,
    pub session_start: DateTime<Utc>,
    pub session_duration_secs: u64,
}

/// Stats format for persistence.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedStats {
    sessions_started: u64,
    frames_processed: u64,
    frames_not_ready: u64,
    frames_without_face: u64,
    frames_rejected: u64,
    tick_errors: u64,
    reports_exported: u64,
    last_updated: DateTime<Utc>,
}

/// Thread-safe shared transparency log.
pub type SharedTransparencyLog = Arc<TransparencyLog>;

/// Create a new shared transparency log.
pub fn create_shared_log() -> SharedTransparencyLog {
    Arc::new(TransparencyLog::new())
}

/// Create a new shared transparency log with persistence.
pub fn create_shared_log_with_persistence(path: PathBuf) -> SharedTransparencyLog {
    Arc::new(TransparencyLog::with_persistence(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transparency_log_counting() {
        let log = TransparencyLog::new();

        log.record_frame_processed();
        log.record_frame_processed();
        log.record_frame_without_face();
        log.record_tick_error();

        let stats = log.stats();
        assert_eq!(stats.frames_processed, 2);
        assert_eq!(stats.frames_without_face, 1);
        assert_eq!(stats.tick_errors, 1);
        assert_eq!(stats.frames_not_ready, 0);
    }

    #[test]
    fn test_transparency_log_reset() {
        let log = TransparencyLog::new();

        log.record_session_started();
        log.record_frame_rejected();
        log.reset();

        let stats = log.stats();
        assert_eq!(stats.sessions_started, 0);
        assert_eq!(stats.frames_rejected, 0);
    }

    #[test]
    fn test_persistence_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("transparency.json");

        let log = TransparencyLog::with_persistence(path.clone());
        log.record_frame_processed();
        log.record_report_exported();
        log.save().unwrap();

        let reloaded = TransparencyLog::with_persistence(path);
        let stats = reloaded.stats();
        assert_eq!(stats.frames_processed, 1);
        assert_eq!(stats.reports_exported, 1);
    }

    #[test]
    fn test_summary_format() {
        let log = TransparencyLog::new();
        let summary = log.summary();

        assert!(summary.contains("Frames processed"));
        assert!(summary.contains("Tick errors"));
        assert!(summary.contains("Privacy Guarantee"));
        assert!(summary.contains("No video frames or images stored"));
    }
}
