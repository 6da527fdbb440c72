//! Channel-fed landmark source.
//!
//! A producer (face-mesh sidecar, replay reader, ...) pushes frames into a
//! bounded channel from its own thread. Each tick the source drains the channel
//! and keeps only the freshest frame, so the tracker never works through a
//! backlog of stale frames.

use crate::source::types::{Detection, LandmarkFrame};
use crate::source::{LandmarkSource, SourceError};
use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};

/// Sending half handed to the landmark producer.
pub type FrameSender = Sender<LandmarkFrame>;

/// Create a connected producer/source pair.
pub fn channel_source(capacity: usize) -> (FrameSender, ChannelSource) {
    // Use a bounded channel to prevent unbounded memory growth
    let (sender, receiver) = bounded(capacity.max(1));
    (sender, ChannelSource::new(receiver))
}

/// A [`LandmarkSource`] reading frames from a crossbeam channel.
pub struct ChannelSource {
    receiver: Receiver<LandmarkFrame>,
    dropped_frames: u64,
}

impl ChannelSource {
    pub fn new(receiver: Receiver<LandmarkFrame>) -> Self {
        Self {
            receiver,
            dropped_frames: 0,
        }
    }

    /// Frames discarded because a newer one arrived before the next tick.
    pub fn dropped_frames(&self) -> u64 {
        self.dropped_frames
    }

    /// Take the newest queued frame, discarding older ones.
    fn latest_frame(&mut self) -> Result<Option<LandmarkFrame>, SourceError> {
        let mut latest = None;
        loop {
            match self.receiver.try_recv() {
                Ok(frame) => {
                    if latest.replace(frame).is_some() {
                        self.dropped_frames += 1;
                    }
                }
                Err(TryRecvError::Empty) => return Ok(latest),
                Err(TryRecvError::Disconnected) => {
                    return match latest {
                        Some(frame) => Ok(Some(frame)),
                        None => Err(SourceError::Disconnected),
                    };
                }
            }
        }
    }
}

impl LandmarkSource for ChannelSource {
    fn detect(&mut self, _timestamp_ms: i64) -> Result<Detection, SourceError> {
        match self.latest_frame()? {
            Some(frame) => Ok(frame.into_detection()),
            None => Ok(Detection::NotReady),
        }
    }
}
