//! # scrollreel-player
//!
//! Scroll-synchronized image-sequence player. Preloads a fixed set of remote
//! frames, maps scroll position to a frame index, and draws that frame with
//! cover-fit scaling onto a viewport-sized surface.
//!
//! The crate is platform-neutral: the browser binding and the native CLI
//! provide a [`Surface`] to draw on and a [`PlayerHost`] that performs fetches
//! and runs the safety timer, then report completions back to the
//! [`ScrollPlayer`].

pub mod frame_set;
pub mod loader;
pub mod player;
pub mod render;
pub mod scroll;
pub mod software;
pub mod viewport;

pub use frame_set::{FrameSet, FrameState, Generation, LoadTicket};
pub use loader::{FrameLoader, FrameRequest, LoadEvent, ReadyCause};
pub use player::{PlaybackState, PlayerHost, ScrollPlayer};
pub use render::{cover_fit, CanvasRenderer, DrawOutcome, FrameImage, SkipReason, Surface};
pub use scroll::{compute_frame_index, scroll_progress, ScrollGeometry};
pub use software::SoftwareSurface;
pub use viewport::ViewportSize;
