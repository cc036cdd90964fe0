//! The background page
//!
//! [`Page`] owns the page context and the four managers. It runs as a single
//! task: control requests and rotation ticks are handled one at a time, each
//! to completion, so no state here needs a lock.

use common::{BackdropError, Command, PageStatus, Response, RotationStatus};
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, oneshot};

use crate::assets::AssetList;
use crate::audio::AudioManager;
use crate::context::PageContext;
use crate::controls::ControlPanel;
use crate::opacity::OpacityManager;
use crate::playback::PlaybackController;
use crate::preferences::{self, PreferenceStore, Persister, Preferences};
use crate::rotation::{RotationScheduler, RotationTick};
use crate::video::VideoElement;

/// A control request and the channel its response goes back on
pub struct PageRequest {
    pub command: Command,
    pub reply: oneshot::Sender<Response>,
}

pub struct Page<V> {
    ctx: PageContext<V>,
    playback: PlaybackController,
    audio: AudioManager,
    opacity: OpacityManager,
    rotation: RotationScheduler,
    ticks: mpsc::UnboundedReceiver<RotationTick>,
    start_time: Instant,
}

impl<V: VideoElement> Page<V> {
    pub fn new(
        assets: AssetList,
        video: V,
        persister: Persister,
        rotation_interval: Duration,
    ) -> Self {
        let (tick_tx, ticks) = mpsc::unbounded_channel();

        let mut ctx = PageContext::new(assets, video, persister);
        let audio = AudioManager::new();
        audio.attach(&mut ctx);

        Self {
            ctx,
            playback: PlaybackController::new(),
            audio,
            opacity: OpacityManager::new(),
            rotation: RotationScheduler::new(rotation_interval, tick_tx),
            ticks,
            start_time: Instant::now(),
        }
    }

    /// Show a random video right away, then restore the stored preferences
    pub async fn start<S: PreferenceStore>(&mut self, store: &S) {
        self.playback.play_random_video(&mut self.ctx);

        let prefs = preferences::load_or_default(store).await;
        self.restore(&prefs);
    }

    /// Apply stored preferences without persisting anything
    pub fn restore(&mut self, prefs: &Preferences) {
        self.audio.init(&mut self.ctx, prefs);
        self.opacity.init(&mut self.ctx, prefs);

        let enabled = prefs.auto_rotate_or_default();
        self.rotation.init(enabled);
        self.ctx.controls.set_rotation_toggle(enabled);
    }

    /// Video picked from the selector
    pub fn select_video(&mut self, name: &str) -> Result<(), BackdropError> {
        if !self.playback.play_video(&mut self.ctx, name) {
            return Err(BackdropError::NotFound(format!("Unknown video: {}", name)));
        }
        self.after_manual_change();
        Ok(())
    }

    /// Random button pressed
    pub fn play_random(&mut self) -> String {
        let name = self.playback.play_random_video(&mut self.ctx);
        self.after_manual_change();
        name
    }

    /// A manual change pushes the next automatic one a full interval away
    fn after_manual_change(&mut self) {
        if self.rotation.is_running() {
            self.rotation.start_rotation();
        }
    }

    pub fn toggle_mute(&mut self) {
        self.audio.toggle_mute(&mut self.ctx);
    }

    pub fn set_volume(&mut self, value: f64) -> Result<(), BackdropError> {
        check_unit_value("volume", value)?;
        self.audio.on_volume_slider(&mut self.ctx, value);
        Ok(())
    }

    pub fn set_opacity(&mut self, value: f64) -> Result<(), BackdropError> {
        check_unit_value("opacity", value)?;
        self.opacity.on_opacity_slider(&mut self.ctx, value);
        Ok(())
    }

    /// Rotation toggle changed
    pub fn set_rotation(&mut self, enabled: bool) {
        self.ctx.controls.set_rotation_toggle(enabled);
        self.ctx.persister.persist(Preferences::auto_rotate(enabled));

        if enabled {
            self.rotation.start_rotation();
            self.playback.play_random_video(&mut self.ctx);
        } else {
            self.rotation.stop_rotation();
        }
    }

    /// Timer fired: switch video without touching the timer
    pub fn handle_tick(&mut self, tick: RotationTick) {
        if self.rotation.accept_tick(tick) {
            log::info!("Rotating to a random video");
            self.playback.play_random_video(&mut self.ctx);
        }
    }

    pub fn handle_command(&mut self, command: Command) -> Response {
        log::debug!("Handling command: {:?}", command);

        let result = match command {
            Command::Play { name } => self.select_video(&name),
            Command::PlayRandom => {
                self.play_random();
                Ok(())
            }
            Command::ToggleMute => {
                self.toggle_mute();
                Ok(())
            }
            Command::SetVolume { value } => self.set_volume(value),
            Command::SetOpacity { value } => self.set_opacity(value),
            Command::SetRotation { enabled } => {
                self.set_rotation(enabled);
                Ok(())
            }
            Command::ListAssets => {
                return Response::Assets(self.ctx.assets.iter().map(|a| a.info()).collect());
            }
            Command::Query => return Response::Status(self.status()),
            Command::Ping => return Response::Pong,
            Command::Kill => {
                return Response::Error(BackdropError::Ipc(
                    "Kill is handled by the IPC server".to_string(),
                ));
            }
        };

        match result {
            Ok(()) => Response::Ok,
            Err(e) => Response::Error(e),
        }
    }

    /// Handle requests and rotation ticks until every request sender is gone
    pub async fn run(mut self, mut requests: mpsc::UnboundedReceiver<PageRequest>) {
        log::info!("Page event loop started");

        loop {
            tokio::select! {
                request = requests.recv() => {
                    let Some(PageRequest { command, reply }) = request else {
                        break;
                    };
                    let response = self.handle_command(command);
                    if reply.send(response).is_err() {
                        log::debug!("Client went away before the response was sent");
                    }
                }
                Some(tick) = self.ticks.recv() => {
                    self.handle_tick(tick);
                }
            }
        }

        self.rotation.stop_rotation();
        self.ctx.persister.flush().await;
        log::info!("Page event loop stopped");
    }

    pub fn status(&self) -> PageStatus {
        PageStatus {
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_secs: self.start_time.elapsed().as_secs(),
            current_video: self.playback.current().map(str::to_string),
            muted: self.audio.is_muted(),
            volume: self.audio.volume(),
            opacity: self.opacity.opacity(),
            rotation: RotationStatus {
                enabled: self.rotation.is_running(),
                interval_secs: self.rotation.interval().as_secs(),
                next_rotation_secs: self.rotation.time_until_rotation().map(|d| d.as_secs()),
            },
        }
    }

    pub fn controls(&self) -> &ControlPanel {
        &self.ctx.controls
    }

    pub fn video(&self) -> &V {
        &self.ctx.video
    }

    pub fn assets(&self) -> &AssetList {
        &self.ctx.assets
    }

    pub fn current_video(&self) -> Option<&str> {
        self.playback.current()
    }

    pub fn is_muted(&self) -> bool {
        self.audio.is_muted()
    }

    pub fn volume(&self) -> f64 {
        self.audio.volume()
    }

    pub fn opacity(&self) -> f64 {
        self.opacity.opacity()
    }

    pub fn is_rotating(&self) -> bool {
        self.rotation.is_running()
    }

    pub fn time_until_rotation(&self) -> Option<Duration> {
        self.rotation.time_until_rotation()
    }

    /// Wait for queued preference writes to land
    pub async fn flush(&self) {
        self.ctx.persister.flush().await;
    }
}

fn check_unit_value(what: &str, value: f64) -> Result<(), BackdropError> {
    if common::is_valid_unit_value(value) {
        Ok(())
    } else {
        Err(BackdropError::InvalidValue(format!(
            "{} must be between 0.0 and 1.0, got {}",
            what, value
        )))
    }
}
