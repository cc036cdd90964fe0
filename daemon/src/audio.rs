use crate::context::PageContext;
use crate::preferences::Preferences;
use crate::video::VideoElement;
use crate::warn_on_refusal;

/// Volume applied when unmuting would otherwise stay silent
pub const UNMUTE_VOLUME: f64 = 0.5;

/// Mute flag and volume of the background video.
///
/// Volume and mute act as one control when driven by the volume slider:
/// after a slider change, `muted == (volume == 0)`. The mute button flips
/// the flag on its own and leaves the stored volume alone.
#[derive(Debug)]
pub struct AudioManager {
    muted: bool,
    volume: f64,
}

impl Default for AudioManager {
    /// Starts muted so the first video can autoplay
    fn default() -> Self {
        Self {
            muted: true,
            volume: 1.0,
        }
    }
}

impl AudioManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push the startup mute flag to the element before anything plays
    pub fn attach<V: VideoElement>(&self, ctx: &mut PageContext<V>) {
        ctx.video.set_muted(self.muted);
        ctx.controls.set_mute_indicator(self.muted);
    }

    /// Apply the stored volume. The mute flag is left as it is.
    pub fn init<V: VideoElement>(&mut self, ctx: &mut PageContext<V>, prefs: &Preferences) {
        self.apply_volume(ctx, prefs.volume_or_default());
        log::info!("Audio ready: volume {:.2}, muted {}", self.volume, self.muted);
    }

    /// Set the mute flag. Unmuting also tries to resume playback.
    pub fn update_mute_state<V: VideoElement>(&mut self, ctx: &mut PageContext<V>, muted: bool) {
        self.muted = muted;
        ctx.video.set_muted(muted);
        ctx.controls.set_mute_indicator(muted);

        if !muted {
            warn_on_refusal!(ctx.video.play(), "resume after unmute");
        }
    }

    /// Mute button pressed
    pub fn toggle_mute<V: VideoElement>(&mut self, ctx: &mut PageContext<V>) {
        let muted = !self.muted;
        self.update_mute_state(ctx, muted);

        if !muted && self.volume == 0.0 {
            log::info!("Unmuted at zero volume, raising to {}", UNMUTE_VOLUME);
            self.apply_volume(ctx, UNMUTE_VOLUME);
            ctx.persister.persist(Preferences::volume(UNMUTE_VOLUME));
        }

        log::debug!("Mute toggled: muted {}, volume {:.2}", self.muted, self.volume);
    }

    /// Volume slider moved
    pub fn on_volume_slider<V: VideoElement>(&mut self, ctx: &mut PageContext<V>, value: f64) {
        self.apply_volume(ctx, value);
        ctx.persister.persist(Preferences::volume(self.volume));
        self.update_mute_state(ctx, self.volume == 0.0);
    }

    fn apply_volume<V: VideoElement>(&mut self, ctx: &mut PageContext<V>, value: f64) {
        self.volume = value.clamp(0.0, 1.0);
        ctx.video.set_volume(self.volume);
        ctx.controls.set_volume_slider(self.volume);
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }
}
