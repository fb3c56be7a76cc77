//! In-process conversation store.

use async_trait::async_trait;
use council_application::ports::conversation_store::{ConversationStore, StoreError};
use council_domain::{ConversationRecord, Message};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct MemoryConversationStore {
    records: RwLock<HashMap<String, ConversationRecord>>,
    archives: RwLock<Vec<(String, ConversationRecord)>>,
}

impl MemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Archived records in the order they were preserved.
    pub async fn archives(&self) -> Vec<(String, ConversationRecord)> {
        self.archives.read().await.clone()
    }
}

#[async_trait]
impl ConversationStore for MemoryConversationStore {
    async fn get(&self, council_id: &str) -> Result<ConversationRecord, StoreError> {
        Ok(self
            .records
            .read()
            .await
            .get(council_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn put(&self, council_id: &str, record: &ConversationRecord) -> Result<(), StoreError> {
        self.records
            .write()
            .await
            .insert(council_id.to_string(), record.clone());
        Ok(())
    }

    async fn append_message(&self, council_id: &str, message: &Message) -> Result<(), StoreError> {
        self.records
            .write()
            .await
            .entry(council_id.to_string())
            .or_default()
            .append(message.clone());
        Ok(())
    }

    async fn archive(
        &self,
        council_id: &str,
        record: &ConversationRecord,
    ) -> Result<String, StoreError> {
        let mut archives = self.archives.write().await;
        let label = format!("{}-archive-{}", council_id, archives.len() + 1);
        archives.push((label.clone(), record.clone()));
        Ok(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_council_reads_as_empty_record() {
        let store = MemoryConversationStore::new();
        let record = store.get("nowhere").await.unwrap();
        assert!(record.messages.is_empty());
        assert!(record.topic.is_empty());
    }

    #[tokio::test]
    async fn test_append_then_get() {
        let store = MemoryConversationStore::new();
        store
            .put("c1", &ConversationRecord::convened("Tidal energy"))
            .await
            .unwrap();
        store
            .append_message("c1", &Message::from_operator("Opening remarks", 10))
            .await
            .unwrap();

        let record = store.get("c1").await.unwrap();
        assert_eq!(record.topic, "Tidal energy");
        assert_eq!(record.messages.len(), 1);
        assert_eq!(record.messages[0].content, "Opening remarks");
    }

    #[tokio::test]
    async fn test_archive_labels_are_sequential() {
        let store = MemoryConversationStore::new();
        let record = ConversationRecord::convened("First");
        assert_eq!(store.archive("c1", &record).await.unwrap(), "c1-archive-1");
        assert_eq!(store.archive("c1", &record).await.unwrap(), "c1-archive-2");
        assert_eq!(store.archives().await.len(), 2);
    }
}
