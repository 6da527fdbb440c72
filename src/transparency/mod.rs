//! Transparency module for the Synheart Focus Agent.
//!
//! This module provides tools for tracking and exposing what the tracker
//! processes, supporting candidate trust and exam-policy compliance.

pub mod log;

// Re-export commonly used types
pub use log::{
    create_shared_log, create_shared_log_with_persistence, SharedTransparencyLog, TransparencyLog,
    TransparencyStats,
};
