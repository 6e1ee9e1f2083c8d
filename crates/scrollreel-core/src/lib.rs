//! # scrollreel-core
//!
//! Core types and primitives for the scrollreel hero player.
//! This crate contains foundational types shared across all scrollreel crates:
//! colors, geometry, raster buffers, site and sequence configuration, and error types.

pub mod color;
pub mod config;
pub mod error;
pub mod frame;
pub mod math;
pub mod presets;

pub use config::*;

pub use color::Color;
pub use error::{ReelError, ReelResult};
pub use frame::FrameBuffer;
pub use math::{Rect, Size2D};
