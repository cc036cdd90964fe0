use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use daemon::assets::AssetList;
use daemon::config::Config;
use daemon::ipc_server;
use daemon::page::{Page, PageRequest};
use daemon::preferences::{JsonFileStore, Persister};
use daemon::video::{HeadlessVideo, VideoElement};

const PAGE_STOP_TIMEOUT: Duration = Duration::from_secs(2);

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting Backdrop daemon v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_path = Config::default_config_path()?;
    log::info!("Looking for config at: {}", config_path.display());

    let config = match Config::load() {
        Ok(cfg) => {
            log::info!("✓ Configuration loaded successfully");
            log::info!("  Log level: {}", cfg.general.log_level);
            log::info!("  Asset sources: {} path(s)", cfg.assets.sources.len());
            for source in &cfg.assets.sources {
                log::info!("    - {}", source);
            }
            log::info!("  Rotation interval: {}s", cfg.rotation.interval);
            cfg
        }
        Err(e) => {
            log::warn!("Failed to load config: {}. Using defaults.", e);
            Config::default()
        }
    };

    let assets = AssetList::load(&config.assets.sources, &config.assets.extensions)
        .context("No background videos available, check [assets] sources in the config")?;

    let prefs_path = config.preferences_path()?;
    log::info!("Preferences stored at: {}", prefs_path.display());
    let store = Arc::new(JsonFileStore::new(prefs_path));
    let (persister, _writer) = Persister::spawn(store.clone());

    let interval = Duration::from_secs(config.rotation.interval);
    let (page_tx, page_rx) = mpsc::unbounded_channel();

    #[cfg(feature = "video")]
    let page_handle = match daemon::video::PlaybinVideo::new() {
        Ok(video) => {
            log::info!("✓ GStreamer video output ready");
            spawn_page(assets, video, persister.clone(), interval, store, page_rx).await
        }
        Err(e) => {
            log::warn!("Failed to initialize video output: {}", e);
            log::info!("Falling back to headless playback");
            let video = HeadlessVideo::new();
            spawn_page(assets, video, persister.clone(), interval, store, page_rx).await
        }
    };

    #[cfg(not(feature = "video"))]
    let page_handle = {
        log::info!("Video output not compiled (build with --features video to enable)");
        let video = HeadlessVideo::new();
        spawn_page(assets, video, persister.clone(), interval, store, page_rx).await
    };

    // Start IPC server
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    let ipc_shutdown = shutdown_tx.clone();
    let mut ipc_handle = tokio::spawn(async move {
        if let Err(e) = ipc_server::start(page_tx, ipc_shutdown).await {
            log::error!("IPC server error: {}", e);
        }
    });

    // Set up signal handlers
    let signal_shutdown = shutdown_tx.clone();
    tokio::spawn(async move {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigterm = signal(SignalKind::terminate()).expect("Failed to setup SIGTERM handler");
        let mut sigint = signal(SignalKind::interrupt()).expect("Failed to setup SIGINT handler");

        tokio::select! {
            _ = sigterm.recv() => {
                log::info!("Received SIGTERM, shutting down...");
            }
            _ = sigint.recv() => {
                log::info!("Received SIGINT, shutting down...");
            }
        }

        signal_shutdown.send_replace(true);
    });

    // Wait for a shutdown request, or for the IPC server to give up
    tokio::select! {
        _ = shutdown_rx.changed() => {
            if let Err(e) = (&mut ipc_handle).await {
                log::error!("IPC server task failed: {}", e);
            }
        }
        result = &mut ipc_handle => {
            if let Err(e) = result {
                log::error!("IPC server task failed: {}", e);
            }
            log::info!("IPC server stopped");
        }
    }

    // The page loop ends once the IPC server drops its request sender
    match tokio::time::timeout(PAGE_STOP_TIMEOUT, page_handle).await {
        Ok(Err(e)) => log::error!("Page task failed: {}", e),
        Err(_) => log::warn!("Page did not stop in time, a client is still connected"),
        Ok(Ok(())) => {}
    }

    persister.flush().await;
    log::info!("Daemon shutting down");
    Ok(())
}

/// Start the page with its first video and stored preferences, then hand it
/// its own task
async fn spawn_page<V: VideoElement + 'static>(
    assets: AssetList,
    video: V,
    persister: Persister,
    interval: Duration,
    store: Arc<JsonFileStore>,
    requests: mpsc::UnboundedReceiver<PageRequest>,
) -> JoinHandle<()> {
    let mut page = Page::new(assets, video, persister, interval);
    page.start(store.as_ref()).await;
    tokio::spawn(page.run(requests))
}
