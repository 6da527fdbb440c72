//! The focus tracker: one owned object per quiz attempt.
//!
//! The tracker owns the landmark source, the smoothing window and the session
//! recorder. Each [`FocusTracker::tick`] runs one full pass
//! (detect → geometry → gaze → focus → smoothing → record) before returning,
//! so passes never overlap. The host drives ticks itself or hands the tracker
//! to [`FocusTracker::run_paced`].
//!
//! ```no_run
//! use synheart_focus_agent::source::channel_source;
//! use synheart_focus_agent::tracker::FocusTracker;
//!
//! let (frames, source) = channel_source(8);
//! let mut tracker = FocusTracker::new();
//! let handle = tracker.start_tracking(source).expect("landmark model failed to load");
//!
//! // A producer thread pushes frames into `frames`; the host switches questions
//! tracker.set_current_question(2).unwrap();
//! tracker.tick();
//!
//! handle.stop();
//! let summary = tracker.finish_session();
//! println!("overall focus: {}%", summary.overall_focus_percent);
//! # drop(frames);
//! ```

use crate::config::Config;
use crate::core::aggregate::{self, PerQuestionFocus, SessionFocusSummary};
use crate::core::gaze::{FocusStatus, GazeReading};
use crate::core::geometry::{extract_eye_geometry, GeometryError, LandmarkTopology, FACE_MESH_IRIS_V1};
use crate::core::recorder::{GazeSample, RecordError, SessionRecorder};
use crate::core::smoothing::SmoothingWindow;
use crate::source::{Detection, FaceLandmarks, LandmarkSource, SourceError};
use crate::transparency::SharedTransparencyLog;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Live status label shown before the first sample of a session.
pub const NOT_TRACKING_LABEL: &str = "NOT TRACKING";

/// Wall-clock source for sample timestamps.
pub trait Clock: Send {
    /// Milliseconds since the Unix epoch.
    fn now_ms(&self) -> i64;
}

/// The system wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Errors surfaced to the host.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Tracker not ready: {0}")]
    NotReady(#[source] SourceError),

    #[error(transparent)]
    Record(#[from] RecordError),
}

/// Result of a single tick.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// No session is active
    Idle,
    /// The frame was not decodable; nothing recorded
    NotReady,
    /// No face in the frame; nothing recorded
    NoFace,
    /// The landmark set did not cover the eye topology; nothing recorded
    Rejected(GeometryError),
    /// The pass failed; nothing recorded, the loop carries on
    Failed(String),
    /// The source has no more frames; the session was stopped
    Ended,
    /// A smoothed sample was recorded for the active question
    Recorded(GazeSample),
}

/// Cloneable stop switch for one tracking session.
///
/// Stopping through a handle is safe from any thread (a Ctrl+C handler, a
/// watchdog, ...). A handle only ever controls the session it was issued for.
#[derive(Debug, Clone)]
pub struct TrackingHandle {
    active: Arc<AtomicBool>,
}

impl TrackingHandle {
    /// Stop the session. No detection runs after this returns.
    pub fn stop(&self) {
        self.active.store(false, Ordering::SeqCst);
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

/// Real-time gaze focus tracker.
pub struct FocusTracker {
    topology: LandmarkTopology,
    initial_question: u32,
    clock: Box<dyn Clock>,
    transparency: Option<SharedTransparencyLog>,

    source: Option<Box<dyn LandmarkSource>>,
    active: Arc<AtomicBool>,
    ready: bool,

    window: SmoothingWindow,
    recorder: SessionRecorder,
    current_focus_level: f64,
    current_focus_status: Option<FocusStatus>,

    session_id: Option<String>,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
    started_instant: Option<Instant>,
    last_detection_ts: i64,
}

impl Default for FocusTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl FocusTracker {
    /// Create a tracker using the standard face-mesh topology and system clock.
    pub fn new() -> Self {
        Self {
            topology: FACE_MESH_IRIS_V1,
            initial_question: 1,
            clock: Box::new(SystemClock),
            transparency: None,
            source: None,
            active: Arc::new(AtomicBool::new(false)),
            ready: false,
            window: SmoothingWindow::new(),
            recorder: SessionRecorder::new(1),
            current_focus_level: 0.0,
            current_focus_status: None,
            session_id: None,
            started_at: None,
            ended_at: None,
            started_instant: None,
            last_detection_ts: -1,
        }
    }

    /// Apply settings from the agent configuration.
    pub fn with_config(mut self, config: &Config) -> Self {
        self.initial_question = config.initial_question.max(1);
        self.recorder.reset(self.initial_question);
        self
    }

    /// Use a different landmark topology.
    pub fn with_topology(mut self, topology: LandmarkTopology) -> Self {
        self.topology = topology;
        self
    }

    /// Use a different clock for sample timestamps.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Count processed frames in a transparency log.
    pub fn with_transparency(mut self, log: SharedTransparencyLog) -> Self {
        self.transparency = Some(log);
        self
    }

    /// Start a new tracking session against `source`.
    ///
    /// Any running session is stopped first. Buckets and the smoothing window
    /// are cleared only once the source initializes; if it fails the tracker
    /// reports not ready and the previous session's data stays queryable.
    pub fn start_tracking<S>(&mut self, mut source: S) -> Result<TrackingHandle, TrackerError>
    where
        S: LandmarkSource + 'static,
    {
        self.stop_tracking();

        if let Err(e) = source.initialize() {
            warn!(error = %e, "Landmark source failed to initialize");
            self.ready = false;
            return Err(TrackerError::NotReady(e));
        }
        self.ready = true;

        self.window.clear();
        self.recorder.reset(self.initial_question);
        self.current_focus_level = 0.0;
        self.current_focus_status = None;

        let session_id = Uuid::new_v4().to_string();
        info!(session_id = %session_id, topology = self.topology.version, "Focus tracking started");

        self.source = Some(Box::new(source));
        self.active = Arc::new(AtomicBool::new(true));
        self.session_id = Some(session_id);
        self.started_at = Some(Utc::now());
        self.ended_at = None;
        self.started_instant = Some(Instant::now());
        self.last_detection_ts = -1;

        if let Some(ref log) = self.transparency {
            log.record_session_started();
        }

        Ok(self.handle())
    }

    /// Stop the current session. Recorded data stays queryable.
    ///
    /// Calling this more than once, or with no session running, is a no-op.
    pub fn stop_tracking(&mut self) {
        self.active.store(false, Ordering::SeqCst);
        self.release_source();
    }

    /// Stop tracking, freeze the recorded buckets and return the summary.
    pub fn finish_session(&mut self) -> SessionFocusSummary {
        self.stop_tracking();
        self.recorder.finalize();
        self.session_summary()
    }

    /// Stop handle for the current session.
    pub fn handle(&self) -> TrackingHandle {
        TrackingHandle {
            active: self.active.clone(),
        }
    }

    /// Whether the landmark source initialized for the latest session.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn is_tracking(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Redirect subsequent samples to question `question` (1-based).
    pub fn set_current_question(&mut self, question: u32) -> Result<(), TrackerError> {
        self.recorder.set_current_question(question)?;
        debug!(question, "Active question changed");
        Ok(())
    }

    pub fn current_question(&self) -> u32 {
        self.recorder.current_question()
    }

    /// Latest smoothed focus level (0 before the first sample).
    pub fn current_focus_level(&self) -> f64 {
        self.current_focus_level
    }

    /// Status of the latest smoothed focus level.
    pub fn current_focus_status(&self) -> Option<FocusStatus> {
        self.current_focus_status
    }

    /// Display label for the live status.
    pub fn current_focus_label(&self) -> &'static str {
        self.current_focus_status
            .map(|status| status.as_str())
            .unwrap_or(NOT_TRACKING_LABEL)
    }

    pub fn per_question_data(&self) -> Vec<PerQuestionFocus> {
        aggregate::per_question_data(&self.recorder)
    }

    pub fn session_summary(&self) -> SessionFocusSummary {
        aggregate::session_summary(&self.recorder)
    }

    pub fn recorder(&self) -> &SessionRecorder {
        &self.recorder
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    /// Run one detection pass.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.is_tracking() {
            self.release_source();
            return TickOutcome::Idle;
        }

        let timestamp = self.next_detection_timestamp();
        let Some(source) = self.source.as_mut() else {
            return TickOutcome::Idle;
        };

        let detection = match source.detect(timestamp) {
            Ok(detection) => detection,
            Err(SourceError::Disconnected) => {
                info!("Landmark producer disconnected, ending session");
                self.stop_tracking();
                return TickOutcome::Ended;
            }
            Err(e) => {
                warn!(error = %e, "Detection tick failed");
                if let Some(ref log) = self.transparency {
                    log.record_tick_error();
                }
                return TickOutcome::Failed(e.to_string());
            }
        };

        // A stop requested while detection was in flight discards the result
        if !self.is_tracking() {
            self.release_source();
            return TickOutcome::Idle;
        }

        match detection {
            Detection::NotReady => {
                if let Some(ref log) = self.transparency {
                    log.record_frame_not_ready();
                }
                TickOutcome::NotReady
            }
            Detection::NoFace => {
                debug!("No face in frame");
                if let Some(ref log) = self.transparency {
                    log.record_frame_without_face();
                }
                TickOutcome::NoFace
            }
            Detection::Face(face) => self.process_face(face),
        }
    }

    /// Tick until the session is stopped, pacing ticks to `interval`.
    ///
    /// Returns the number of ticks run.
    pub fn run_paced(&mut self, interval: Duration) -> u64 {
        let mut ticks = 0;
        while self.is_tracking() {
            let started = Instant::now();
            self.tick();
            ticks += 1;

            let elapsed = started.elapsed();
            if elapsed < interval {
                thread::sleep(interval - elapsed);
            }
        }
        self.release_source();
        ticks
    }

    fn process_face(&mut self, face: FaceLandmarks) -> TickOutcome {
        let geometry = match extract_eye_geometry(&face.landmarks, &self.topology) {
            Ok(geometry) => geometry,
            Err(e) => {
                debug!(error = %e, "Skipping frame");
                if let Some(ref log) = self.transparency {
                    log.record_frame_rejected();
                }
                return TickOutcome::Rejected(e);
            }
        };

        let reading = GazeReading::from_geometry(&geometry);
        let smoothed = self.window.push(reading.focus_level);
        self.current_focus_level = smoothed;
        self.current_focus_status = Some(FocusStatus::from_level(smoothed));

        let timestamp = face
            .captured_at_ms
            .unwrap_or_else(|| self.clock.now_ms());
        let sample = GazeSample::new(timestamp, smoothed, reading.left_ratio, reading.right_ratio);

        match self.recorder.record(sample) {
            Ok(()) => {
                if let Some(ref log) = self.transparency {
                    log.record_frame_processed();
                }
                TickOutcome::Recorded(sample)
            }
            Err(e) => {
                warn!(error = %e, "Could not record sample");
                if let Some(ref log) = self.transparency {
                    log.record_tick_error();
                }
                TickOutcome::Failed(e.to_string())
            }
        }
    }

    /// Strictly increasing milliseconds since the session started.
    fn next_detection_timestamp(&mut self) -> i64 {
        let elapsed = self
            .started_instant
            .map(|start| start.elapsed().as_millis() as i64)
            .unwrap_or(0);
        let timestamp = elapsed.max(self.last_detection_ts + 1);
        self.last_detection_ts = timestamp;
        timestamp
    }

    fn release_source(&mut self) {
        if self.source.take().is_some() {
            self.ended_at = Some(Utc::now());
            info!(
                session_id = self.session_id.as_deref().unwrap_or_default(),
                samples = self.recorder.sample_count(),
                "Focus tracking stopped"
            );
        }
    }
}
