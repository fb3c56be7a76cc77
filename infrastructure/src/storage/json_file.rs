//! JSON file conversation store.
//!
//! Layout under the configured directory:
//!
//! ```text
//! <dir>/<council>.json
//! <dir>/archive/<council>-<UTC timestamp>.json
//! ```
//!
//! Records are written to a temporary sibling and renamed into place, so a
//! crash mid-write leaves the previous record intact.

use async_trait::async_trait;
use council_application::ports::conversation_store::{ConversationStore, StoreError};
use council_domain::{ConversationRecord, Message};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;

pub struct JsonFileConversationStore {
    dir: PathBuf,
    /// Serializes read-modify-write cycles on `append_message`
    write_lock: Mutex<()>,
}

impl JsonFileConversationStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, council_id: &str) -> Result<PathBuf, StoreError> {
        validate_council_id(council_id)?;
        Ok(self.dir.join(format!("{}.json", council_id)))
    }

    async fn read_record(&self, council_id: &str) -> Result<ConversationRecord, StoreError> {
        let path = self.record_path(council_id)?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(ConversationRecord::default());
            }
            Err(e) => return Err(e.into()),
        };

        serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt {
            council: council_id.to_string(),
            reason: e.to_string(),
        })
    }

    async fn write_record(
        &self,
        council_id: &str,
        record: &ConversationRecord,
    ) -> Result<(), StoreError> {
        let path = self.record_path(council_id)?;
        write_json(&path, record).await?;
        debug!(path = %path.display(), messages = record.messages.len(), "Record written");
        Ok(())
    }
}

#[async_trait]
impl ConversationStore for JsonFileConversationStore {
    async fn get(&self, council_id: &str) -> Result<ConversationRecord, StoreError> {
        self.read_record(council_id).await
    }

    async fn put(&self, council_id: &str, record: &ConversationRecord) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        self.write_record(council_id, record).await
    }

    async fn append_message(&self, council_id: &str, message: &Message) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut record = self.read_record(council_id).await?;
        record.append(message.clone());
        self.write_record(council_id, &record).await
    }

    async fn archive(
        &self,
        council_id: &str,
        record: &ConversationRecord,
    ) -> Result<String, StoreError> {
        validate_council_id(council_id)?;
        let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%S%.3fZ");
        let name = format!("{}-{}.json", council_id, stamp);
        let path = self.dir.join("archive").join(&name);

        let _guard = self.write_lock.lock().await;
        write_json(&path, record).await?;
        debug!(path = %path.display(), "Record archived");
        Ok(name)
    }
}

/// Council ids become file names; keep them to a single path component.
fn validate_council_id(council_id: &str) -> Result<(), StoreError> {
    let valid = !council_id.is_empty()
        && council_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        && !council_id.starts_with('.');
    if valid {
        Ok(())
    } else {
        Err(StoreError::Other(format!(
            "invalid council id for file storage: {:?}",
            council_id
        )))
    }
}

async fn write_json(path: &Path, record: &ConversationRecord) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let json = serde_json::to_vec_pretty(record).map_err(|e| StoreError::Other(e.to_string()))?;

    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, json).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}
