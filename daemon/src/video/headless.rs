use std::path::{Path, PathBuf};

use super::{PlaybackError, VideoElement};

/// How the headless element treats requests to play with sound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutoplayPolicy {
    /// Every play request succeeds
    #[default]
    Allow,
    /// Play requests are refused while the element is audible
    BlockAudible,
}

/// Video element without any output.
///
/// Keeps the state it was given so it can be inspected.
#[derive(Debug, Default)]
pub struct HeadlessVideo {
    source: Option<PathBuf>,
    playing: bool,
    muted: bool,
    volume: f64,
    policy: AutoplayPolicy,
    loads: usize,
    refused: usize,
}

impl HeadlessVideo {
    pub fn new() -> Self {
        Self {
            volume: 1.0,
            ..Default::default()
        }
    }

    pub fn with_policy(policy: AutoplayPolicy) -> Self {
        Self {
            policy,
            ..Self::new()
        }
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// Number of times a source was loaded
    pub fn loads(&self) -> usize {
        self.loads
    }

    /// Number of refused play requests
    pub fn refused(&self) -> usize {
        self.refused
    }

    fn is_audible(&self) -> bool {
        !self.muted && self.volume > 0.0
    }
}

impl VideoElement for HeadlessVideo {
    fn load(&mut self, path: &Path) -> Result<(), PlaybackError> {
        log::debug!("Headless video: loading {}", path.display());
        self.source = Some(path.to_path_buf());
        self.playing = false;
        self.loads += 1;
        Ok(())
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        if self.source.is_none() {
            return Err(PlaybackError::NoSource);
        }

        if self.policy == AutoplayPolicy::BlockAudible && self.is_audible() {
            self.refused += 1;
            return Err(PlaybackError::AutoplayBlocked);
        }

        self.playing = true;
        Ok(())
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn set_volume(&mut self, volume: f64) {
        self.volume = volume;
    }
}
