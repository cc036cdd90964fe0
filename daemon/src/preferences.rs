//! Persisted page preferences
//!
//! Three keys survive a restart: `videoVolume`, `uiOpacity` and `autoRotate`.
//! Everything else about the page is rebuilt on startup.
//!
//! Reads happen once at startup through [`PreferenceStore::get`]. Writes go
//! through a [`Persister`], which queues them for a background task so the
//! page never waits on storage before updating what the user sees. Writes are
//! applied in the order they were issued.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::log_and_continue;

/// Volume used when nothing has been stored yet
pub const DEFAULT_VOLUME: f64 = 1.0;

/// Overlay opacity used when nothing has been stored yet
pub const DEFAULT_OPACITY: f64 = 0.8;

/// Rotation is off unless the user turned it on
pub const DEFAULT_AUTO_ROTATE: bool = false;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed preferences: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Keys understood by the preference store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrefKey {
    VideoVolume,
    UiOpacity,
    AutoRotate,
}

impl PrefKey {
    pub const ALL: [PrefKey; 3] = [Self::VideoVolume, Self::UiOpacity, Self::AutoRotate];

    /// Storage key name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VideoVolume => "videoVolume",
            Self::UiOpacity => "uiOpacity",
            Self::AutoRotate => "autoRotate",
        }
    }
}

/// A partial set of preference values.
///
/// `None` means the key is absent, which is different from a stored zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_volume: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui_opacity: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_rotate: Option<bool>,
}

impl Preferences {
    pub fn volume(value: f64) -> Self {
        Self {
            video_volume: Some(value),
            ..Default::default()
        }
    }

    pub fn opacity(value: f64) -> Self {
        Self {
            ui_opacity: Some(value),
            ..Default::default()
        }
    }

    pub fn auto_rotate(enabled: bool) -> Self {
        Self {
            auto_rotate: Some(enabled),
            ..Default::default()
        }
    }

    pub fn volume_or_default(&self) -> f64 {
        self.video_volume.unwrap_or(DEFAULT_VOLUME)
    }

    /// A stored opacity of exactly 0 also falls back to the default.
    // Known quirk: an overlay slid all the way to 0 comes back at 0.8 on the
    // next start. Kept so existing preference files load the same way.
    pub fn opacity_or_default(&self) -> f64 {
        match self.ui_opacity {
            Some(value) if value != 0.0 => value,
            _ => DEFAULT_OPACITY,
        }
    }

    pub fn auto_rotate_or_default(&self) -> bool {
        self.auto_rotate.unwrap_or(DEFAULT_AUTO_ROTATE)
    }

    /// Overwrite keys that are present in `other`
    pub fn merge(&mut self, other: &Preferences) {
        if other.video_volume.is_some() {
            self.video_volume = other.video_volume;
        }
        if other.ui_opacity.is_some() {
            self.ui_opacity = other.ui_opacity;
        }
        if other.auto_rotate.is_some() {
            self.auto_rotate = other.auto_rotate;
        }
    }

    /// Keep only the requested keys
    pub fn only(&self, keys: &[PrefKey]) -> Self {
        Self {
            video_volume: self.video_volume.filter(|_| keys.contains(&PrefKey::VideoVolume)),
            ui_opacity: self.ui_opacity.filter(|_| keys.contains(&PrefKey::UiOpacity)),
            auto_rotate: self.auto_rotate.filter(|_| keys.contains(&PrefKey::AutoRotate)),
        }
    }

    /// Read known keys from a JSON object.
    ///
    /// A key holding a value of the wrong type is treated as absent. Unknown
    /// keys are ignored.
    pub fn from_json_map(map: &Map<String, Value>) -> Self {
        let number = |key: PrefKey| match map.get(key.as_str()) {
            None => None,
            Some(value) => {
                let parsed = value.as_f64().filter(|v| v.is_finite());
                if parsed.is_none() {
                    log::warn!("Ignoring malformed {} value: {}", key.as_str(), value);
                }
                parsed
            }
        };

        let auto_rotate = match map.get(PrefKey::AutoRotate.as_str()) {
            None => None,
            Some(value) => {
                let parsed = value.as_bool();
                if parsed.is_none() {
                    log::warn!("Ignoring malformed autoRotate value: {}", value);
                }
                parsed
            }
        };

        Self {
            video_volume: number(PrefKey::VideoVolume),
            ui_opacity: number(PrefKey::UiOpacity),
            auto_rotate,
        }
    }
}

/// Asynchronous key-value persistence for preferences
pub trait PreferenceStore: Send + Sync + 'static {
    /// Fetch the requested keys. Absent keys come back as `None`.
    fn get(&self, keys: &[PrefKey]) -> impl Future<Output = Result<Preferences, StoreError>> + Send;

    /// Store every key that is present in `values`, leaving the others alone.
    fn set(&self, values: Preferences) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Fetch every key, falling back to an empty set if the store fails
pub async fn load_or_default<S: PreferenceStore>(store: &S) -> Preferences {
    match store.get(&PrefKey::ALL).await {
        Ok(prefs) => {
            log::debug!("Loaded preferences: {:?}", prefs);
            prefs
        }
        Err(e) => {
            log::warn!("Failed to load preferences, using defaults: {}", e);
            Preferences::default()
        }
    }
}

/// Preferences kept in a JSON file on disk
pub struct JsonFileStore {
    path: PathBuf,

    /// Serializes read-modify-write cycles
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    async fn read_all(&self) -> Result<Preferences, StoreError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Preferences::default());
            }
            Err(e) => return Err(e.into()),
        };

        if contents.trim().is_empty() {
            return Ok(Preferences::default());
        }

        match serde_json::from_str::<Value>(&contents)? {
            Value::Object(map) => Ok(Preferences::from_json_map(&map)),
            other => {
                log::warn!(
                    "Preferences file {} does not hold an object ({}), ignoring it",
                    self.path.display(),
                    other
                );
                Ok(Preferences::default())
            }
        }
    }
}

impl PreferenceStore for JsonFileStore {
    async fn get(&self, keys: &[PrefKey]) -> Result<Preferences, StoreError> {
        let _guard = self.lock.lock().await;
        Ok(self.read_all().await?.only(keys))
    }

    async fn set(&self, values: Preferences) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;

        let mut stored = self.read_all().await?;
        stored.merge(&values);

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Write to a sibling file first so a crash never leaves half a file
        let tmp_path = self.path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(&stored)?;
        tokio::fs::write(&tmp_path, json).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;

        log::debug!("Persisted preferences to {}", self.path.display());
        Ok(())
    }
}

/// Preferences kept in memory only
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<Preferences>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values(values: Preferences) -> Self {
        Self {
            values: Mutex::new(values),
        }
    }

    pub async fn snapshot(&self) -> Preferences {
        *self.values.lock().await
    }
}

impl PreferenceStore for MemoryStore {
    async fn get(&self, keys: &[PrefKey]) -> Result<Preferences, StoreError> {
        Ok(self.values.lock().await.only(keys))
    }

    async fn set(&self, values: Preferences) -> Result<(), StoreError> {
        self.values.lock().await.merge(&values);
        Ok(())
    }
}

enum PersistOp {
    Write(Preferences),
    Flush(oneshot::Sender<()>),
}

/// Fire-and-forget writer in front of a [`PreferenceStore`]
#[derive(Clone)]
pub struct Persister {
    tx: mpsc::UnboundedSender<PersistOp>,
}

impl Persister {
    /// Spawn the background writer task for `store`
    pub fn spawn<S: PreferenceStore>(store: Arc<S>) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel();

        let handle = tokio::spawn(async move {
            while let Some(op) = rx.recv().await {
                match op {
                    PersistOp::Write(values) => {
                        log_and_continue!(store.set(values).await, "persist preferences");
                    }
                    PersistOp::Flush(done) => {
                        let _ = done.send(());
                    }
                }
            }
            log::debug!("Preference writer stopped");
        });

        (Self { tx }, handle)
    }

    /// Queue a write and return immediately
    pub fn persist(&self, values: Preferences) {
        if self.tx.send(PersistOp::Write(values)).is_err() {
            log::error!("Preference writer is gone, dropping {:?}", values);
        }
    }

    /// Wait until every write queued so far has reached the store
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(PersistOp::Flush(done_tx)).is_ok() {
            let _ = done_rx.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_apply_only_to_absent_keys() {
        let empty = Preferences::default();
        assert_eq!(empty.volume_or_default(), 1.0);
        assert_eq!(empty.opacity_or_default(), 0.8);
        assert!(!empty.auto_rotate_or_default());

        // A stored zero volume is a real value, a zero opacity is not
        let zeros = Preferences {
            video_volume: Some(0.0),
            ui_opacity: Some(0.0),
            auto_rotate: Some(false),
        };
        assert_eq!(zeros.volume_or_default(), 0.0);
        assert_eq!(zeros.opacity_or_default(), 0.8);
        assert_eq!(Preferences::opacity(0.05).opacity_or_default(), 0.05);
    }

    #[test]
    fn test_wire_keys() {
        let prefs = Preferences {
            video_volume: Some(0.3),
            ui_opacity: None,
            auto_rotate: Some(true),
        };
        let json = serde_json::to_value(prefs).unwrap();
        assert_eq!(json, serde_json::json!({"videoVolume": 0.3, "autoRotate": true}));
    }

    #[test]
    fn test_malformed_values_are_absent() {
        let map = serde_json::json!({
            "videoVolume": "loud",
            "uiOpacity": 0.4,
            "autoRotate": 1,
            "somethingElse": true
        });
        let prefs = Preferences::from_json_map(map.as_object().unwrap());
        assert_eq!(prefs.video_volume, None);
        assert_eq!(prefs.ui_opacity, Some(0.4));
        assert_eq!(prefs.auto_rotate, None);
    }

    #[test]
    fn test_merge_and_only() {
        let mut prefs = Preferences::volume(0.2);
        prefs.merge(&Preferences::opacity(0.6));
        prefs.merge(&Preferences::volume(0.9));
        assert_eq!(prefs.video_volume, Some(0.9));
        assert_eq!(prefs.ui_opacity, Some(0.6));

        let filtered = prefs.only(&[PrefKey::UiOpacity]);
        assert_eq!(filtered, Preferences::opacity(0.6));
    }

    #[tokio::test]
    async fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested").join("preferences.json"));

        assert_eq!(store.get(&PrefKey::ALL).await.unwrap(), Preferences::default());

        store.set(Preferences::volume(0.3)).await.unwrap();
        store.set(Preferences::auto_rotate(true)).await.unwrap();

        let prefs = store.get(&PrefKey::ALL).await.unwrap();
        assert_eq!(prefs.video_volume, Some(0.3));
        assert_eq!(prefs.auto_rotate, Some(true));
        assert_eq!(prefs.ui_opacity, None);
    }

    #[tokio::test]
    async fn test_file_store_tolerates_garbage_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        std::fs::write(&path, r#"{"uiOpacity": "dim", "videoVolume": 0.25}"#).unwrap();

        let store = JsonFileStore::new(&path);
        let prefs = store.get(&PrefKey::ALL).await.unwrap();
        assert_eq!(prefs.ui_opacity, None);
        assert_eq!(prefs.video_volume, Some(0.25));
    }

    #[tokio::test]
    async fn test_file_store_rejects_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(matches!(
            store.get(&PrefKey::ALL).await,
            Err(StoreError::Parse(_))
        ));
        assert_eq!(load_or_default(&store).await, Preferences::default());
    }

    #[tokio::test]
    async fn test_persister_keeps_write_order() {
        let store = Arc::new(MemoryStore::new());
        let (persister, _handle) = Persister::spawn(store.clone());

        persister.persist(Preferences::volume(0.5));
        persister.persist(Preferences::volume(0.0));
        persister.persist(Preferences::volume(0.3));
        persister.flush().await;

        assert_eq!(store.snapshot().await.video_volume, Some(0.3));
    }
}
