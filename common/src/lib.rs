//! Common types and utilities for Backdrop.
//!
//! This crate defines the shared data structures and IPC protocol used for
//! communication between the daemon (`backdropd`) and the control client
//! (`bdctl`).
//!
//! # IPC Protocol
//!
//! Communication happens over a Unix domain socket using newline-delimited
//! JSON messages. The client sends [`Command`] variants and receives
//! [`Response`] variants.
//!
//! # Examples
//!
//! ```no_run
//! use common::Command;
//!
//! // Move the volume slider to 30%
//! let cmd = Command::SetVolume { value: 0.3 };
//!
//! // Serialize for sending over IPC
//! let json = serde_json::to_string(&cmd).unwrap();
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Common error types shared between client and daemon.
///
/// All errors are serializable for transmission over IPC.
#[derive(Error, Debug, Serialize, Deserialize)]
pub enum BackdropError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("IPC error: {0}")]
    Ipc(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<std::io::Error> for BackdropError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<serde_json::Error> for BackdropError {
    fn from(e: serde_json::Error) -> Self {
        Self::Ipc(e.to_string())
    }
}

/// Commands sent from client to daemon via IPC.
///
/// Each command corresponds to one control on the page: the asset selector,
/// the random button, the mute button, the two sliders and the rotation
/// toggle.
///
/// # Examples
///
/// ```
/// use common::Command;
///
/// // Pick a video from the selector
/// let cmd = Command::Play {
///     name: "ocean.mp4".to_string(),
/// };
/// ```
#[derive(Debug, Serialize, Deserialize)]
pub enum Command {
    /// Play a video chosen from the asset selector.
    Play {
        /// Asset identifier (the video's filename)
        name: String,
    },
    /// Random button: play a uniformly random asset.
    PlayRandom,
    /// Mute button: flip the mute state.
    ToggleMute,
    /// Volume slider moved.
    SetVolume {
        /// New volume (0.0-1.0)
        value: f64,
    },
    /// Opacity slider moved.
    SetOpacity {
        /// New overlay opacity (0.0-1.0)
        value: f64,
    },
    /// Rotation toggle changed.
    SetRotation { enabled: bool },
    /// List the known video assets
    ListAssets,
    /// Query page status
    Query,
    /// Ping the daemon
    Ping,
    /// Kill the daemon
    Kill,
}

/// Response from daemon to client
#[derive(Debug, Serialize, Deserialize)]
pub enum Response {
    Ok,
    Error(BackdropError),
    Status(PageStatus),
    Assets(Vec<AssetInfo>),
    Pong,
}

/// Snapshot of the page state as the controls display it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageStatus {
    pub version: String,
    pub uptime_secs: u64,
    /// Asset identifier currently shown by the selector
    pub current_video: Option<String>,
    pub muted: bool,
    pub volume: f64,
    pub opacity: f64,
    pub rotation: RotationStatus,
}

/// Rotation toggle state plus the time left on the active timer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotationStatus {
    pub enabled: bool,
    pub interval_secs: u64,
    /// Seconds until the next automatic change, if the timer is running
    pub next_rotation_secs: Option<u64>,
}

/// A selectable video, as listed by the asset selector
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssetInfo {
    /// Filename, used as the asset identifier
    pub name: String,
    /// Filename without its extension
    pub display_name: String,
    pub path: String,
}

/// Check that a slider value is usable as a volume or opacity.
///
/// Accepts finite values in `0.0..=1.0`.
pub fn is_valid_unit_value(value: f64) -> bool {
    value.is_finite() && (0.0..=1.0).contains(&value)
}

/// IPC socket path helper
pub fn get_socket_path() -> std::path::PathBuf {
    let runtime_dir = std::env::var("XDG_RUNTIME_DIR")
        .unwrap_or_else(|_| format!("/run/user/{}", unsafe { libc::getuid() }));

    std::path::PathBuf::from(runtime_dir).join("backdrop.sock")
}
