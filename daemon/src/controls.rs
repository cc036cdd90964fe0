/// State shown by the page controls.
///
/// The controls are drawn by whoever is attached to the daemon (the `bdctl`
/// client prints them); the page only keeps their values in sync.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlPanel {
    /// Value of the asset selector
    selector: Option<String>,
    /// Mute button shows the muted icon
    mute_indicator: bool,
    volume_slider: f64,
    opacity_slider: f64,
    /// Transparency applied to the overlay holding the controls
    overlay_opacity: f64,
    rotation_toggle: bool,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            selector: None,
            mute_indicator: true,
            volume_slider: 1.0,
            opacity_slider: 1.0,
            overlay_opacity: 1.0,
            rotation_toggle: false,
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_selector(&mut self, name: &str) {
        self.selector = Some(name.to_string());
    }

    pub fn selector(&self) -> Option<&str> {
        self.selector.as_deref()
    }

    pub fn set_mute_indicator(&mut self, muted: bool) {
        self.mute_indicator = muted;
    }

    pub fn mute_indicator(&self) -> bool {
        self.mute_indicator
    }

    pub fn set_volume_slider(&mut self, value: f64) {
        self.volume_slider = value;
    }

    pub fn volume_slider(&self) -> f64 {
        self.volume_slider
    }

    pub fn set_opacity_slider(&mut self, value: f64) {
        self.opacity_slider = value;
    }

    pub fn opacity_slider(&self) -> f64 {
        self.opacity_slider
    }

    pub fn set_overlay_opacity(&mut self, value: f64) {
        self.overlay_opacity = value;
    }

    pub fn overlay_opacity(&self) -> f64 {
        self.overlay_opacity
    }

    pub fn set_rotation_toggle(&mut self, enabled: bool) {
        self.rotation_toggle = enabled;
    }

    pub fn rotation_toggle(&self) -> bool {
        self.rotation_toggle
    }
}
