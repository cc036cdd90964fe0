//! GStreamer `playbin` output
//!
//! `playbin` handles demuxing, decoding and the video/audio sinks. The only
//! thing added here is looping: a watcher thread seeks back to the start on
//! end-of-stream.

use anyhow::{Context, Result};
use gstreamer as gst;
use gstreamer::prelude::*;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

use super::{PlaybackError, VideoElement};

/// How long the bus watcher blocks before checking for shutdown
const BUS_POLL_MS: u64 = 200;

/// Initialize GStreamer (idempotent, safe to call multiple times)
fn initialize_gstreamer() -> Result<()> {
    gst::init().context("Failed to initialize GStreamer")?;
    log::info!("GStreamer initialized");
    Ok(())
}

/// Looping background video played through `playbin`
pub struct PlaybinVideo {
    playbin: gst::Element,
    has_source: bool,
    stop_watcher: Arc<AtomicBool>,
    watcher: Option<JoinHandle<()>>,
}

impl PlaybinVideo {
    pub fn new() -> Result<Self> {
        initialize_gstreamer()?;

        let playbin = gst::ElementFactory::make("playbin")
            .name("backdrop")
            .build()
            .context("Failed to create playbin element")?;

        let bus = playbin.bus().context("playbin has no bus")?;
        let stop_watcher = Arc::new(AtomicBool::new(false));

        let watcher = {
            let playbin = playbin.clone();
            let stop = Arc::clone(&stop_watcher);
            std::thread::Builder::new()
                .name("backdrop-bus".to_string())
                .spawn(move || watch_bus(bus, playbin, stop))
                .context("Failed to spawn bus watcher")?
        };

        Ok(Self {
            playbin,
            has_source: false,
            stop_watcher,
            watcher: Some(watcher),
        })
    }
}

/// Loop on end-of-stream and log pipeline errors
fn watch_bus(bus: gst::Bus, playbin: gst::Element, stop: Arc<AtomicBool>) {
    while !stop.load(Ordering::Relaxed) {
        let Some(msg) = bus.timed_pop(gst::ClockTime::from_mseconds(BUS_POLL_MS)) else {
            continue;
        };

        match msg.view() {
            gst::MessageView::Eos(..) => {
                log::debug!("End of stream, looping");
                if let Err(e) = playbin.seek_simple(
                    gst::SeekFlags::FLUSH | gst::SeekFlags::KEY_UNIT,
                    gst::ClockTime::ZERO,
                ) {
                    log::warn!("Failed to loop video: {}", e);
                }
            }
            gst::MessageView::Error(err) => {
                log::warn!(
                    "Video pipeline error: {} ({:?})",
                    err.error(),
                    err.debug()
                );
            }
            _ => {}
        }
    }
}

impl VideoElement for PlaybinVideo {
    fn load(&mut self, path: &Path) -> Result<(), PlaybackError> {
        let uri = gst::glib::filename_to_uri(path, None)
            .map_err(|e| PlaybackError::Backend(format!("Invalid video path: {}", e)))?;

        log::info!("Loading video: {}", path.display());

        // Changing uri is only allowed in NULL or READY
        self.playbin
            .set_state(gst::State::Null)
            .map_err(|e| PlaybackError::Backend(e.to_string()))?;
        self.playbin.set_property("uri", uri.as_str());
        self.has_source = true;

        self.playbin
            .set_state(gst::State::Paused)
            .map_err(|e| PlaybackError::Backend(e.to_string()))?;
        Ok(())
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        if !self.has_source {
            return Err(PlaybackError::NoSource);
        }

        self.playbin
            .set_state(gst::State::Playing)
            .map_err(|e| PlaybackError::Backend(e.to_string()))?;
        Ok(())
    }

    fn set_muted(&mut self, muted: bool) {
        self.playbin.set_property("mute", muted);
    }

    fn set_volume(&mut self, volume: f64) {
        self.playbin.set_property("volume", volume);
    }
}

impl Drop for PlaybinVideo {
    fn drop(&mut self) {
        self.stop_watcher.store(true, Ordering::Relaxed);
        if let Some(watcher) = self.watcher.take() {
            let _ = watcher.join();
        }
        if let Err(e) = self.playbin.set_state(gst::State::Null) {
            log::warn!("Failed to stop playbin: {}", e);
        }
    }
}
