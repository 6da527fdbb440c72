//! Synheart Focus Agent - Privacy-first gaze focus tracking for proctored quizzes.
//!
//! This library turns per-frame face-mesh landmarks into a smoothed focus
//! signal, buckets it by quiz question and summarizes the session.
//!
//! # Privacy Guarantees
//!
//! - **No images**: Frames never reach this crate, only landmark coordinates
//! - **No landmark storage**: Coordinates are discarded once gaze ratios are computed
//! - **Local only**: Nothing leaves the machine unless the host exports a report
//! - **Transparency**: All processing is counted and auditable
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Synheart Focus Agent                      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐       │
//! │  │  Landmark   │──▶│  Geometry   │──▶│ Gaze/Focus  │       │
//! │  │   Source    │   │  (eyes)     │   │  (scoring)  │       │
//! │  └─────────────┘   └─────────────┘   └──────┬──────┘       │
//! │                                             ▼              │
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐       │
//! │  │   Session   │◀──│  Recorder   │◀──│  Smoothing  │       │
//! │  │   Report    │   │ (questions) │   │ (30 frames) │       │
//! │  └─────────────┘   └─────────────┘   └─────────────┘       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use synheart_focus_agent::{source::ScriptedSource, FocusTracker};
//!
//! let mut tracker = FocusTracker::new();
//! tracker.start_tracking(ScriptedSource::new()).expect("source failed to initialize");
//!
//! tracker.tick();
//! println!("{}", tracker.current_focus_label());
//! ```

pub mod config;
pub mod core;
pub mod source;
pub mod tracker;
pub mod transparency;

// Re-export key types at crate root for convenience
pub use config::{Config, ConfigError};
pub use core::{
    FocusStatus, GazeSample, PerQuestionFocus, ReportBuilder, SessionFocusSummary, SessionReport,
};
pub use source::{Detection, FaceLandmarks, Landmark, LandmarkFrame, LandmarkSource, SourceError};
pub use tracker::{FocusTracker, TickOutcome, TrackerError, TrackingHandle};
pub use transparency::{SharedTransparencyLog, TransparencyLog, TransparencyStats};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Privacy declaration that can be displayed to candidates.
pub const PRIVACY_DECLARATION: &str = r#"
╔══════════════════════════════════════════════════════════════════╗
║            SYNHEART FOCUS AGENT - PRIVACY DECLARATION            ║
╠══════════════════════════════════════════════════════════════════╣
║                                                                  ║
║  This agent estimates where you look while you take a quiz.      ║
║                                                                  ║
║  ✓ WHAT WE KEEP:                                                 ║
║    • How centered your gaze is (two ratios per frame)            ║
║    • A smoothed focus level between 0 and 100                    ║
║    • Which question was on screen at the time                    ║
║                                                                  ║
║  ✗ WHAT WE NEVER KEEP:                                           ║
║    • Camera frames or images of your face                        ║
║    • Face landmark coordinates                                   ║
║    • Anything about your screen or other applications            ║
║                                                                  ║
║  All processing happens locally. Landmarks are discarded as      ║
║  soon as the gaze ratios for a frame are computed.               ║
║                                                                  ║
║  You can view processing statistics anytime with:                ║
║    synheart-focus status                                         ║
║                                                                  ║
╚══════════════════════════════════════════════════════════════════╝
"#;
