//! Video output for the page background
//!
//! The page drives playback through the [`VideoElement`] trait and never
//! cares which backend sits behind it:
//!
//! - `playbin`: GStreamer `playbin` output with looping (feature `video`)
//! - `headless`: records what it was asked to do, used when no video
//!   backend is available and in tests
//!
//! # Playback refusals
//!
//! Starting audible playback may be refused, the same way a browser refuses
//! to autoplay sound without a user gesture. A refusal is reported as a
//! [`PlaybackError`]; callers log it and carry on.

mod headless;
#[cfg(feature = "video")]
mod playbin;

pub use headless::{AutoplayPolicy, HeadlessVideo};
#[cfg(feature = "video")]
pub use playbin::PlaybinVideo;

use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlaybackError {
    #[error("audible playback blocked by autoplay policy")]
    AutoplayBlocked,

    #[error("no video source loaded")]
    NoSource,

    #[error("video backend error: {0}")]
    Backend(String),
}

/// The element that shows the background video
pub trait VideoElement: Send {
    /// Replace the active source and reload it, ready to play from the start
    fn load(&mut self, path: &Path) -> Result<(), PlaybackError>;

    /// Start or resume playback
    fn play(&mut self) -> Result<(), PlaybackError>;

    fn set_muted(&mut self, muted: bool);

    /// Volume in `0.0..=1.0`
    fn set_volume(&mut self, volume: f64);
}
