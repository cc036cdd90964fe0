/// Scenario tests for the background page
/// These drive a page with a headless video element and an in-memory
/// preference store, the same way control requests would.
use daemon::assets::AssetList;
use daemon::page::{Page, PageRequest};
use daemon::preferences::{MemoryStore, Persister, Preferences};
use daemon::rotation::RotationTick;
use daemon::video::{AutoplayPolicy, HeadlessVideo};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

const INTERVAL: Duration = Duration::from_secs(900);

fn assets() -> AssetList {
    AssetList::from_paths([
        "/videos/ocean.mp4",
        "/videos/forest.webm",
        "/videos/rain.mkv",
        "/videos/city.mov",
    ])
    .unwrap()
}

async fn start_page(
    stored: Preferences,
    policy: AutoplayPolicy,
) -> (Page<HeadlessVideo>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::with_values(stored));
    let (persister, _writer) = Persister::spawn(store.clone());
    let mut page = Page::new(assets(), HeadlessVideo::with_policy(policy), persister, INTERVAL);
    page.start(store.as_ref()).await;
    (page, store)
}

#[tokio::test(start_paused = true)]
async fn test_fresh_load_uses_defaults() {
    let (page, store) = start_page(Preferences::default(), AutoplayPolicy::Allow).await;

    assert_eq!(page.volume(), 1.0);
    assert_eq!(page.opacity(), 0.8);
    assert_eq!(page.controls().overlay_opacity(), 0.8);
    assert!(!page.is_rotating());
    assert!(!page.controls().rotation_toggle());

    // One random video is already playing, muted so autoplay is allowed
    let current = page.current_video().unwrap();
    assert!(page.assets().contains(current));
    assert_eq!(page.controls().selector(), Some(current));
    assert!(page.video().is_playing());
    assert!(page.is_muted());

    // Loading defaults writes nothing back
    page.flush().await;
    assert_eq!(store.snapshot().await, Preferences::default());
}

#[tokio::test(start_paused = true)]
async fn test_stored_preferences_are_restored() {
    let stored = Preferences {
        video_volume: Some(0.25),
        ui_opacity: Some(0.0),
        auto_rotate: Some(true),
    };
    let (page, _store) = start_page(stored, AutoplayPolicy::Allow).await;

    assert_eq!(page.volume(), 0.25);
    assert_eq!(page.video().volume(), 0.25);
    // A stored zero opacity loads as the default
    assert_eq!(page.opacity(), 0.8);
    assert_eq!(page.controls().overlay_opacity(), 0.8);
    assert!(page.is_rotating());
    assert!(page.controls().rotation_toggle());

    // Restoring rotation does not switch the video a second time
    assert_eq!(page.video().loads(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_volume_slider_drives_mute() {
    let (mut page, store) = start_page(Preferences::default(), AutoplayPolicy::Allow).await;

    page.set_volume(0.0).unwrap();
    assert!(page.is_muted());
    assert!(page.controls().mute_indicator());

    page.set_volume(0.3).unwrap();
    assert!(!page.is_muted());
    assert_eq!(page.video().volume(), 0.3);

    page.flush().await;
    assert_eq!(store.snapshot().await.video_volume, Some(0.3));
}

#[tokio::test(start_paused = true)]
async fn test_out_of_range_slider_values_are_rejected() {
    let (mut page, store) = start_page(Preferences::default(), AutoplayPolicy::Allow).await;

    assert!(page.set_volume(1.5).is_err());
    assert!(page.set_volume(f64::NAN).is_err());
    assert!(page.set_opacity(-0.2).is_err());
    assert_eq!(page.volume(), 1.0);
    assert_eq!(page.opacity(), 0.8);

    page.flush().await;
    assert_eq!(store.snapshot().await, Preferences::default());
}

#[tokio::test(start_paused = true)]
async fn test_unmute_from_zero_volume() {
    let (mut page, store) = start_page(Preferences::volume(0.0), AutoplayPolicy::Allow).await;
    assert!(page.is_muted());
    assert_eq!(page.volume(), 0.0);

    page.toggle_mute();
    assert!(!page.is_muted());
    assert_eq!(page.volume(), 0.5);
    assert_eq!(page.controls().volume_slider(), 0.5);

    page.flush().await;
    assert_eq!(store.snapshot().await.video_volume, Some(0.5));
}

#[tokio::test(start_paused = true)]
async fn test_blocked_unmute_is_not_an_error() {
    let (mut page, _store) = start_page(Preferences::default(), AutoplayPolicy::BlockAudible).await;

    page.toggle_mute();
    assert!(!page.is_muted());
    assert_eq!(page.video().refused(), 1);

    // Muting again and retrying is the user's way out
    page.toggle_mute();
    assert!(page.is_muted());
}

#[tokio::test(start_paused = true)]
async fn test_rotation_toggle_on_plays_immediately() {
    let (mut page, store) = start_page(Preferences::default(), AutoplayPolicy::Allow).await;
    let loads_before = page.video().loads();

    page.set_rotation(true);
    assert!(page.is_rotating());
    assert!(page.controls().rotation_toggle());
    assert_eq!(page.video().loads(), loads_before + 1);

    page.flush().await;
    assert_eq!(store.snapshot().await.auto_rotate, Some(true));

    page.set_rotation(false);
    assert!(!page.is_rotating());
    assert_eq!(page.time_until_rotation(), None);

    page.flush().await;
    assert_eq!(store.snapshot().await.auto_rotate, Some(false));
}

#[tokio::test(start_paused = true)]
async fn test_manual_change_resets_rotation_timer() {
    let (mut page, _store) = start_page(Preferences::default(), AutoplayPolicy::Allow).await;
    page.set_rotation(true);

    tokio::time::sleep(Duration::from_secs(600)).await;
    page.select_video("rain.mkv").unwrap();
    assert_eq!(page.controls().selector(), Some("rain.mkv"));

    let remaining = page.time_until_rotation().unwrap();
    assert!(remaining > Duration::from_secs(899));
}

#[tokio::test(start_paused = true)]
async fn test_manual_change_without_rotation_starts_nothing() {
    let (mut page, _store) = start_page(Preferences::default(), AutoplayPolicy::Allow).await;

    page.play_random();
    page.select_video("city.mov").unwrap();
    assert!(!page.is_rotating());
    assert!(page.select_video("missing.mp4").is_err());
    assert_eq!(page.current_video(), Some("city.mov"));
}

#[tokio::test(start_paused = true)]
async fn test_ticks_switch_video_only_for_live_timer() {
    let (mut page, _store) = start_page(Preferences::auto_rotate(true), AutoplayPolicy::Allow).await;
    assert_eq!(page.video().loads(), 1);

    // Restored timer is the first one started
    page.handle_tick(RotationTick { generation: 1 });
    assert_eq!(page.video().loads(), 2);
    assert!(page.assets().contains(page.current_video().unwrap()));

    // A manual pick replaces the timer, so its old ticks no longer count
    page.select_video("rain.mkv").unwrap();
    assert_eq!(page.video().loads(), 3);
    page.handle_tick(RotationTick { generation: 1 });
    assert_eq!(page.video().loads(), 3);
    assert_eq!(page.current_video(), Some("rain.mkv"));

    page.handle_tick(RotationTick { generation: 2 });
    assert_eq!(page.video().loads(), 4);

    // Nothing fires once rotation is off
    page.set_rotation(false);
    page.handle_tick(RotationTick { generation: 2 });
    assert_eq!(page.video().loads(), 4);
}

async fn request(
    requests: &mpsc::UnboundedSender<PageRequest>,
    command: common::Command,
) -> common::Response {
    let (reply, response) = oneshot::channel();
    requests.send(PageRequest { command, reply }).unwrap();
    response.await.unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_event_loop_rotates_on_timer() {
    let (page, _store) = start_page(Preferences::auto_rotate(true), AutoplayPolicy::Allow).await;

    let (requests, rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(page.run(rx));

    // Three intervals pass
    tokio::time::sleep(INTERVAL * 3 + Duration::from_secs(1)).await;

    match request(&requests, common::Command::Query).await {
        common::Response::Status(status) => {
            assert!(status.rotation.enabled);
            assert_eq!(status.rotation.interval_secs, 900);
            assert!(status.current_video.is_some());

            // The countdown restarted at the last tick instead of running out
            let next = status.rotation.next_rotation_secs.unwrap();
            assert!(next > 800 && next < 900);
        }
        other => panic!("Unexpected response: {:?}", other),
    }

    match request(&requests, common::Command::ListAssets).await {
        common::Response::Assets(list) => {
            assert_eq!(list.len(), 4);
            assert_eq!(list[0].display_name, "ocean");
        }
        other => panic!("Unexpected response: {:?}", other),
    }

    assert!(matches!(
        request(
            &requests,
            common::Command::Play {
                name: "nope.mp4".to_string()
            }
        )
        .await,
        common::Response::Error(common::BackdropError::NotFound(_))
    ));

    drop(requests);
    handle.await.unwrap();
}
