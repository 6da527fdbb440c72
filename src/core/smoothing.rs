//! Temporal smoothing of the focus signal.
//!
//! Raw per-frame focus levels jitter with every blink and micro-saccade. The
//! smoothing window keeps the most recent readings (about one second of video
//! at webcam frame rates) and reports their mean.

use std::collections::VecDeque;

/// Number of raw focus levels kept in the window.
pub const SMOOTHING_WINDOW_SIZE: usize = 30;

/// Bounded FIFO of recent raw focus levels.
#[derive(Debug, Clone)]
pub struct SmoothingWindow {
    values: VecDeque<f64>,
}

impl Default for SmoothingWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl SmoothingWindow {
    pub fn new() -> Self {
        Self {
            values: VecDeque::with_capacity(SMOOTHING_WINDOW_SIZE + 1),
        }
    }

    /// Add a raw focus level and return the smoothed value.
    ///
    /// The mean is recomputed over the held values on every push rather than
    /// kept as a running sum, so it cannot drift over a long session.
    pub fn push(&mut self, focus_level: f64) -> f64 {
        self.values.push_back(focus_level);
        if self.values.len() > SMOOTHING_WINDOW_SIZE {
            self.values.pop_front();
        }
        self.mean_of_held()
    }

    /// Mean of the held values, if any.
    pub fn average(&self) -> Option<f64> {
        if self.values.is_empty() {
            None
        } else {
            Some(self.mean_of_held())
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values currently held, oldest first.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }

    /// Drop all held values (new session).
    pub fn clear(&mut self) {
        self.values.clear();
    }

    fn mean_of_held(&self) -> f64 {
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }
}
