//! HTTP agent responder.
//!
//! Sends the conversation as JSON and expects `{"text": "..."}` back:
//!
//! ```text
//! POST <endpoint>
//! {"agent_id": "aster", "agent_name": "Aster", "topic": "...",
//!  "messages": [{"speaker": "Operator", "content": "..."}]}
//! ```
//!
//! One attempt per call; a failed or timed-out request is reported to the
//! controller, which pauses the session rather than retrying.

use async_trait::async_trait;
use council_application::ports::agent_responder::{
    AgentResponder, ConversationContext, ResponderError,
};
use council_domain::AgentProfile;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Serialize)]
struct ResponseRequest<'a> {
    agent_id: &'a str,
    agent_name: &'a str,
    topic: &'a str,
    messages: Vec<TranscriptLine<'a>>,
}

#[derive(Debug, Serialize)]
struct TranscriptLine<'a> {
    speaker: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ResponseBody {
    text: String,
}

pub struct HttpAgentResponder {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpAgentResponder {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ResponderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ResponderError::Other(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn classify(err: reqwest::Error) -> ResponderError {
    if err.is_timeout() {
        ResponderError::Timeout
    } else if err.is_decode() {
        ResponderError::InvalidResponse(err.to_string())
    } else {
        ResponderError::Connection(err.to_string())
    }
}

#[async_trait]
impl AgentResponder for HttpAgentResponder {
    async fn generate(
        &self,
        agent: &AgentProfile,
        context: &ConversationContext,
    ) -> Result<String, ResponderError> {
        let request = ResponseRequest {
            agent_id: agent.id.as_str(),
            agent_name: &agent.name,
            topic: &context.topic,
            messages: context
                .messages
                .iter()
                .map(|m| TranscriptLine {
                    speaker: &m.speaker_name,
                    content: &m.content,
                })
                .collect(),
        };

        debug!(agent = %agent.id, endpoint = %self.endpoint, messages = request.messages.len(), "Requesting agent reply");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResponderError::Connection(format!(
                "HTTP error: {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        let body: ResponseBody = response.json().await.map_err(classify)?;
        if body.text.trim().is_empty() {
            return Err(ResponderError::InvalidResponse(
                "empty reply text".to_string(),
            ));
        }
        Ok(body.text)
    }
}
