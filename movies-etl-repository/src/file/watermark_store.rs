//! JSON file implementation of the watermark store.
//!
//! The file holds a single object mapping entity type tags to RFC 3339
//! timestamps, e.g. `{"film_work": "2024-05-01T12:00:00Z"}`.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use movies_etl_shared::EntityType;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::errors::WatermarkError;
use crate::interfaces::{initial_watermark, WatermarkStore};

type State = BTreeMap<String, DateTime<Utc>>;

/// Watermark store persisted to a local JSON file.
///
/// Writes go to a sibling temporary file that is flushed to disk and then
/// renamed over the original, so a crash mid-write leaves the previous state
/// intact.
pub struct JsonFileWatermarkStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileWatermarkStore {
    /// Create a store backed by `path`. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// The path of the state file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_state(&self) -> Result<State, WatermarkError> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(State::new()),
            Err(e) => return Err(e.into()),
        };

        if contents.trim().is_empty() {
            warn!(
                path = %self.path.display(),
                "Watermark file is empty, starting every entity from the initial watermark"
            );
            return Ok(State::new());
        }

        Ok(serde_json::from_str(&contents)?)
    }

    fn tmp_path(&self) -> PathBuf {
        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        PathBuf::from(tmp_name)
    }

    async fn write_state(&self, state: &State) -> Result<(), WatermarkError> {
        let tmp_path = self.tmp_path();
        let contents = serde_json::to_vec_pretty(state)?;

        let mut file = fs::File::create(&tmp_path).await?;
        file.write_all(&contents).await?;
        // The rename must never expose a file whose data is not on disk yet.
        file.sync_all().await?;
        drop(file);

        fs::rename(&tmp_path, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl WatermarkStore for JsonFileWatermarkStore {
    async fn get_last_state(
        &self,
        entity_type: EntityType,
    ) -> Result<DateTime<Utc>, WatermarkError> {
        let state = self.read_state().await?;
        Ok(state
            .get(entity_type.as_str())
            .copied()
            .unwrap_or_else(initial_watermark))
    }

    async fn set_last_state(
        &self,
        entity_type: EntityType,
        modified: DateTime<Utc>,
    ) -> Result<(), WatermarkError> {
        let _guard = self.write_lock.lock().await;

        let mut state = self.read_state().await?;
        let current = state.get(entity_type.as_str()).copied();
        if current.is_some_and(|current| current >= modified) {
            debug!(
                entity_type = %entity_type,
                modified = %modified,
                "Stored watermark is already at or past the new value"
            );
            return Ok(());
        }

        state.insert(entity_type.as_str().to_string(), modified);
        self.write_state(&state).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> JsonFileWatermarkStore {
        JsonFileWatermarkStore::new(dir.path().join("etl_state.json"))
    }

    #[tokio::test]
    async fn test_missing_file_returns_initial_watermark() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let watermark = store.get_last_state(EntityType::Genre).await.unwrap();
        assert_eq!(watermark, initial_watermark());
    }

    #[tokio::test]
    async fn test_set_and_get_per_entity() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let t1 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();

        store.set_last_state(EntityType::FilmWork, t1).await.unwrap();
        store.set_last_state(EntityType::Person, t2).await.unwrap();

        assert_eq!(store.get_last_state(EntityType::FilmWork).await.unwrap(), t1);
        assert_eq!(store.get_last_state(EntityType::Person).await.unwrap(), t2);
        assert_eq!(
            store.get_last_state(EntityType::Genre).await.unwrap(),
            initial_watermark()
        );
    }

    #[tokio::test]
    async fn test_state_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let modified = Utc.with_ymd_and_hms(2024, 3, 15, 8, 30, 0).unwrap();

        store_in(&dir)
            .set_last_state(EntityType::Genre, modified)
            .await
            .unwrap();

        let reopened = store_in(&dir);
        assert_eq!(
            reopened.get_last_state(EntityType::Genre).await.unwrap(),
            modified
        );
    }

    #[tokio::test]
    async fn test_watermark_never_moves_backwards() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let newer = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let older = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        store.set_last_state(EntityType::Person, newer).await.unwrap();
        store.set_last_state(EntityType::Person, older).await.unwrap();

        assert_eq!(store.get_last_state(EntityType::Person).await.unwrap(), newer);
    }

    #[tokio::test]
    async fn test_file_uses_entity_tags_and_rfc3339() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let modified = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        store.set_last_state(EntityType::FilmWork, modified).await.unwrap();

        let contents = std::fs::read_to_string(store.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(value["film_work"], "2024-05-01T12:00:00Z");
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "not json").unwrap();

        let result = store.get_last_state(EntityType::Genre).await;
        assert!(matches!(result, Err(WatermarkError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_write_replaces_file_without_leftovers() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let first = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let second = Utc.with_ymd_and_hms(2024, 5, 2, 12, 0, 0).unwrap();

        store.set_last_state(EntityType::Genre, first).await.unwrap();
        store.set_last_state(EntityType::Genre, second).await.unwrap();

        assert!(!store.tmp_path().exists());
        let contents = std::fs::read_to_string(store.path()).unwrap();
        let state: State = serde_json::from_str(&contents).unwrap();
        assert_eq!(state.get("genre"), Some(&second));
    }

    #[tokio::test]
    async fn test_empty_file_is_treated_as_no_state() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "").unwrap();

        let watermark = store.get_last_state(EntityType::Genre).await.unwrap();
        assert_eq!(watermark, initial_watermark());
    }
}
