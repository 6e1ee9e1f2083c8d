//! The scroll player: ties loading, scroll mapping, drawing and viewport
//! sizing together for one hero instance.

use std::time::Duration;

use scrollreel_core::{ReelResult, SequenceConfig};
use serde::Serialize;

use crate::frame_set::{FrameSet, Generation, LoadTicket};
use crate::loader::{FrameLoader, FrameRequest, LoadEvent};
use crate::render::{CanvasRenderer, DrawOutcome, Surface};
use crate::scroll::ScrollGeometry;
use crate::viewport::{sync_surface, ViewportSize};

/// Platform services the player needs but does not own.
///
/// Fetch results and timer expiry are reported back through
/// [`ScrollPlayer::on_frame_complete`] and [`ScrollPlayer::on_safety_timeout`],
/// never from inside these calls.
pub trait PlayerHost {
    /// Start fetching one frame.
    fn fetch_frame(&mut self, request: FrameRequest);

    /// Arm the one-shot safety timer for `generation`.
    fn arm_safety_timer(&mut self, generation: Generation, after: Duration);

    /// Cancel the safety timer for `generation` if it has not fired yet.
    fn disarm_safety_timer(&mut self, generation: Generation);
}

/// Playback state derived from the latest scroll event.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackState {
    pub scroll_progress: f64,
    pub current_frame_index: usize,
    pub is_ready: bool,
}

pub struct ScrollPlayer<S: Surface> {
    surface: S,
    viewport: ViewportSize,
    renderer: CanvasRenderer,
    loader: Option<FrameLoader<S::Image>>,
    next_generation: Generation,
    state: PlaybackState,
}

impl<S: Surface> ScrollPlayer<S> {
    /// Take ownership of `surface` and size it to the viewport. No sequence
    /// is loaded until [`load`](Self::load).
    pub fn mount(mut surface: S, viewport: ViewportSize) -> Self {
        sync_surface(&mut surface, viewport);
        Self {
            surface,
            viewport,
            renderer: CanvasRenderer::new(),
            loader: None,
            next_generation: Generation::first(),
            state: PlaybackState::default(),
        }
    }

    /// Switch to `config`, starting a new frame set.
    ///
    /// A config identical to the current one is a no-op so repeated calls
    /// never duplicate in-flight fetches. Returns whether a load was started.
    pub fn load(&mut self, config: SequenceConfig, host: &mut impl PlayerHost) -> ReelResult<bool> {
        config.validate()?;
        if self.loader.as_ref().map(|l| l.config()) == Some(&config) {
            return Ok(false);
        }
        self.start(config, host);
        Ok(true)
    }

    /// Drop the current frame set and fetch the same sequence again.
    pub fn restart(&mut self, host: &mut impl PlayerHost) {
        if let Some(config) = self.loader.as_ref().map(|l| l.config().clone()) {
            self.start(config, host);
        }
    }

    fn start(&mut self, config: SequenceConfig, host: &mut impl PlayerHost) {
        self.abandon(host);

        let generation = self.next_generation;
        self.next_generation = generation.next();

        let timeout = config.safety_timeout();
        let (loader, requests) = FrameLoader::start(config, generation);
        self.loader = Some(loader);
        self.state = PlaybackState::default();

        host.arm_safety_timer(generation, timeout);
        for request in requests {
            host.fetch_frame(request);
        }
    }

    /// Forget the current frame set; its late completions become stale.
    fn abandon(&mut self, host: &mut impl PlayerHost) {
        if let Some(old) = self.loader.take() {
            if !old.is_ready() {
                host.disarm_safety_timer(old.generation());
            }
            tracing::debug!("abandoning {}", old.generation());
        }
    }

    /// A fetch finished. Stale tickets are ignored.
    ///
    /// When this makes the player ready the caller should follow up with
    /// [`on_scroll`](Self::on_scroll) so the first frame is drawn from fresh
    /// geometry.
    pub fn on_frame_complete(
        &mut self,
        ticket: LoadTicket,
        outcome: ReelResult<S::Image>,
        host: &mut impl PlayerHost,
    ) -> LoadEvent {
        let Some(loader) = self.loader.as_mut() else {
            return LoadEvent::Ignored;
        };
        let event = loader.complete(ticket, outcome);
        if let LoadEvent::BecameReady(_) = event {
            host.disarm_safety_timer(loader.generation());
            self.state.is_ready = true;
        }
        event
    }

    /// The safety timer for `generation` fired.
    pub fn on_safety_timeout(&mut self, generation: Generation) -> LoadEvent {
        let Some(loader) = self.loader.as_mut() else {
            return LoadEvent::Ignored;
        };
        let event = loader.expire(generation);
        if let LoadEvent::BecameReady(_) = event {
            self.state.is_ready = true;
        }
        event
    }

    /// Map the scroll position to a frame and draw it. Does nothing until ready.
    pub fn on_scroll(&mut self, geometry: ScrollGeometry) -> Option<DrawOutcome> {
        if !self.state.is_ready {
            return None;
        }
        let loader = self.loader.as_ref()?;
        let frame_count = loader.frames().len();

        self.state.scroll_progress = geometry.progress();
        self.state.current_frame_index = geometry.frame_index(frame_count);

        Some(
            self.renderer
                .draw(&mut self.surface, loader.frames(), self.state.current_frame_index),
        )
    }

    /// Resize the surface to `viewport`, then redraw if ready.
    pub fn on_resize(
        &mut self,
        viewport: ViewportSize,
        geometry: ScrollGeometry,
    ) -> Option<DrawOutcome> {
        self.viewport = viewport;
        sync_surface(&mut self.surface, viewport);
        self.on_scroll(geometry)
    }

    /// Stop the safety timer and release the frame set.
    pub fn teardown(&mut self, host: &mut impl PlayerHost) {
        self.abandon(host);
        self.state = PlaybackState::default();
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state.is_ready
    }

    pub fn viewport(&self) -> ViewportSize {
        self.viewport
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn frames(&self) -> Option<&FrameSet<S::Image>> {
        self.loader.as_ref().map(|l| l.frames())
    }

    pub fn loader(&self) -> Option<&FrameLoader<S::Image>> {
        self.loader.as_ref()
    }

    /// Generation of the current frame set, if one is loading.
    pub fn generation(&self) -> Option<Generation> {
        self.loader.as_ref().map(|l| l.generation())
    }

    pub fn last_drawn(&self) -> Option<usize> {
        self.renderer.last_drawn()
    }
}
