use crate::context::PageContext;
use crate::video::VideoElement;
use crate::warn_on_refusal;

/// Chooses which background video is shown
#[derive(Debug, Default)]
pub struct PlaybackController {
    current: Option<String>,
}

impl PlaybackController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `name` the active video, restart playback and point the selector at it.
    ///
    /// Returns `false` and changes nothing if `name` is not a known asset.
    pub fn play_video<V: VideoElement>(&mut self, ctx: &mut PageContext<V>, name: &str) -> bool {
        let Some(asset) = ctx.assets.get(name) else {
            log::warn!("Ignoring request to play unknown video: {}", name);
            return false;
        };

        log::info!("Playing video: {}", asset.display_name());

        match ctx.video.load(asset.path()) {
            Ok(()) => warn_on_refusal!(ctx.video.play(), "start playback"),
            Err(e) => log::warn!("Failed to load {}: {}", asset.path().display(), e),
        }

        ctx.controls.set_selector(name);
        self.current = Some(name.to_string());
        true
    }

    /// Play a uniformly random asset and return its name
    pub fn play_random_video<V: VideoElement>(&mut self, ctx: &mut PageContext<V>) -> String {
        let name = ctx.assets.random().name().to_string();
        log::debug!("Random pick: {}", name);
        self.play_video(ctx, &name);
        name
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetList;
    use crate::preferences::{MemoryStore, Persister};
    use crate::video::{AutoplayPolicy, HeadlessVideo};
    use std::path::Path;
    use std::sync::Arc;

    fn context(policy: AutoplayPolicy) -> PageContext<HeadlessVideo> {
        let assets = AssetList::from_paths(["/v/ocean.mp4", "/v/forest.webm", "/v/rain.mkv"]).unwrap();
        let (persister, _handle) = Persister::spawn(Arc::new(MemoryStore::new()));
        PageContext::new(assets, HeadlessVideo::with_policy(policy), persister)
    }

    #[tokio::test]
    async fn test_selector_follows_every_asset() {
        let mut ctx = context(AutoplayPolicy::Allow);
        let mut playback = PlaybackController::new();

        let names: Vec<String> = ctx.assets.iter().map(|a| a.name().to_string()).collect();
        for name in names {
            assert!(playback.play_video(&mut ctx, &name));
            assert_eq!(ctx.controls.selector(), Some(name.as_str()));
            assert_eq!(playback.current(), Some(name.as_str()));
            assert!(ctx.video.is_playing());
        }
    }

    #[tokio::test]
    async fn test_unknown_video_changes_nothing() {
        let mut ctx = context(AutoplayPolicy::Allow);
        let mut playback = PlaybackController::new();

        playback.play_video(&mut ctx, "ocean.mp4");
        assert!(!playback.play_video(&mut ctx, "missing.mp4"));
        assert_eq!(ctx.controls.selector(), Some("ocean.mp4"));
        assert_eq!(ctx.video.source(), Some(Path::new("/v/ocean.mp4")));
    }

    #[tokio::test]
    async fn test_refused_playback_still_switches() {
        let mut ctx = context(AutoplayPolicy::BlockAudible);
        let mut playback = PlaybackController::new();

        assert!(playback.play_video(&mut ctx, "rain.mkv"));
        assert_eq!(ctx.video.refused(), 1);
        assert_eq!(ctx.controls.selector(), Some("rain.mkv"));
        assert_eq!(ctx.video.source(), Some(Path::new("/v/rain.mkv")));
    }

    #[tokio::test]
    async fn test_random_is_a_known_asset() {
        let mut ctx = context(AutoplayPolicy::Allow);
        let mut playback = PlaybackController::new();

        for _ in 0..50 {
            let name = playback.play_random_video(&mut ctx);
            assert!(ctx.assets.contains(&name));
            assert_eq!(ctx.controls.selector(), Some(name.as_str()));
        }
    }
}
