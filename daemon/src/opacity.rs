use crate::context::PageContext;
use crate::preferences::Preferences;
use crate::video::VideoElement;

/// Transparency of the overlay that holds the controls
#[derive(Debug)]
pub struct OpacityManager {
    opacity: f64,
}

impl Default for OpacityManager {
    fn default() -> Self {
        Self { opacity: 1.0 }
    }
}

impl OpacityManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn init<V: VideoElement>(&mut self, ctx: &mut PageContext<V>, prefs: &Preferences) {
        self.set_opacity(ctx, prefs.opacity_or_default());
    }

    /// Apply `value` to the overlay and move the slider to match
    pub fn set_opacity<V: VideoElement>(&mut self, ctx: &mut PageContext<V>, value: f64) {
        self.opacity = value.clamp(0.0, 1.0);
        ctx.controls.set_overlay_opacity(self.opacity);
        ctx.controls.set_opacity_slider(self.opacity);
        log::debug!("Overlay opacity set to {:.2}", self.opacity);
    }

    /// Opacity slider moved
    pub fn on_opacity_slider<V: VideoElement>(&mut self, ctx: &mut PageContext<V>, value: f64) {
        self.set_opacity(ctx, value);
        ctx.persister.persist(Preferences::opacity(self.opacity));
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }
}
