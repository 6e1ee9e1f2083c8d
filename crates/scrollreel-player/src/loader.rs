//! Frame preloading and readiness gating.

use scrollreel_core::{ReelResult, SequenceConfig};

use crate::frame_set::{FrameSet, Generation, LoadTicket};

/// One fetch the host should start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameRequest {
    pub ticket: LoadTicket,
    pub url: String,
}

/// Why playback was allowed to start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyCause {
    /// Enough frames loaded.
    Threshold,
    /// The safety timer fired first.
    SafetyTimeout,
}

/// Effect of feeding a completion or timeout into the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadEvent {
    /// Belonged to another frame set, or the slot had already settled.
    Ignored,
    /// Recorded; readiness unchanged.
    Progress,
    /// Recorded, and this flipped the loader to ready.
    BecameReady(ReadyCause),
}

/// Preloads one sequence and tracks when it is ready to play.
///
/// Readiness is reached the first time the loaded count hits
/// [`SequenceConfig::required_loads`] or the safety timeout expires, and is
/// never revoked.
#[derive(Debug)]
pub struct FrameLoader<I> {
    config: SequenceConfig,
    frames: FrameSet<I>,
    required: usize,
    ready: Option<ReadyCause>,
}

impl<I> FrameLoader<I> {
    /// Create a loader for `config` and the fetches it needs, one per frame.
    pub fn start(config: SequenceConfig, generation: Generation) -> (Self, Vec<FrameRequest>) {
        let requests = (0..config.frame_count)
            .map(|index| FrameRequest {
                ticket: LoadTicket { generation, index },
                url: config.frame_url(index),
            })
            .collect();

        tracing::debug!(
            "starting {} with {} frames from {}",
            generation,
            config.frame_count,
            config.base_url
        );

        let loader = Self {
            frames: FrameSet::new(generation, config.frame_count),
            required: config.required_loads(),
            config,
            ready: None,
        };
        (loader, requests)
    }

    pub fn config(&self) -> &SequenceConfig {
        &self.config
    }

    pub fn frames(&self) -> &FrameSet<I> {
        &self.frames
    }

    pub fn generation(&self) -> Generation {
        self.frames.generation()
    }

    pub fn required_loads(&self) -> usize {
        self.required
    }

    pub fn is_ready(&self) -> bool {
        self.ready.is_some()
    }

    pub fn ready_cause(&self) -> Option<ReadyCause> {
        self.ready
    }

    /// Record the outcome of one fetch.
    pub fn complete(&mut self, ticket: LoadTicket, outcome: ReelResult<I>) -> LoadEvent {
        if !self.frames.owns(&ticket) {
            tracing::debug!(
                "dropping completion for frame {} of {} (current {})",
                ticket.index,
                ticket.generation,
                self.generation()
            );
            return LoadEvent::Ignored;
        }

        match outcome {
            Ok(image) => {
                if !self.frames.mark_loaded(ticket.index, image) {
                    return LoadEvent::Ignored;
                }
                if self.ready.is_none() && self.frames.loaded_count() >= self.required {
                    self.ready = Some(ReadyCause::Threshold);
                    tracing::info!(
                        "sequence ready after {} of {} frames",
                        self.frames.loaded_count(),
                        self.frames.len()
                    );
                    return LoadEvent::BecameReady(ReadyCause::Threshold);
                }
                LoadEvent::Progress
            }
            Err(err) => {
                if !self.frames.mark_failed(ticket.index) {
                    return LoadEvent::Ignored;
                }
                tracing::warn!("failed to load frame {:03}: {}", ticket.index, err);
                LoadEvent::Progress
            }
        }
    }

    /// The safety timer for `generation` fired.
    pub fn expire(&mut self, generation: Generation) -> LoadEvent {
        if generation != self.generation() || self.ready.is_some() {
            return LoadEvent::Ignored;
        }
        self.ready = Some(ReadyCause::SafetyTimeout);
        tracing::warn!(
            "image sequence loading timed out with {} of {} frames loaded; showing content",
            self.frames.loaded_count(),
            self.frames.len()
        );
        LoadEvent::BecameReady(ReadyCause::SafetyTimeout)
    }
}
