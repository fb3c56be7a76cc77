//! Conversation Store port
//!
//! Last-write-wins persistence for [`ConversationRecord`]s, keyed by council
//! id. The council actor is the only writer for its id, so no concurrency
//! token is needed.

use async_trait::async_trait;
use council_domain::{ConversationRecord, CouncilError, Message};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt record for {council}: {reason}")]
    Corrupt { council: String, reason: String },

    #[error("Store error: {0}")]
    Other(String),
}

impl From<StoreError> for CouncilError {
    fn from(err: StoreError) -> Self {
        CouncilError::transient(err.to_string())
    }
}

#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Load the record for `council_id`. A council that was never stored
    /// yields an empty record.
    async fn get(&self, council_id: &str) -> Result<ConversationRecord, StoreError>;

    /// Replace the record for `council_id`.
    async fn put(&self, council_id: &str, record: &ConversationRecord) -> Result<(), StoreError>;

    /// Append one message to the stored log.
    async fn append_message(&self, council_id: &str, message: &Message) -> Result<(), StoreError>;

    /// Save a copy of `record` outside the live slot and return a label
    /// identifying the archive.
    async fn archive(
        &self,
        council_id: &str,
        record: &ConversationRecord,
    ) -> Result<String, StoreError>;
}
