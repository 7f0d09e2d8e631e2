use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::message::Message;
use crate::models::tool::Tool;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: Option<i32>,
    pub output_tokens: Option<i32>,
    pub total_tokens: Option<i32>,
}

impl Usage {
    pub fn new(
        input_tokens: Option<i32>,
        output_tokens: Option<i32>,
        total_tokens: Option<i32>,
    ) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens,
        }
    }
}

/// Base trait for chat-completion providers.
///
/// The system instruction travels as the first entry of `messages`, so the
/// full history is the only conversational input. `response_format` is the
/// structured-output schema the reply must satisfy when the model does not
/// call a tool instead.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Generate the next message given the history, the declared tools, and
    /// the required output shape.
    async fn complete(
        &self,
        messages: &[Message],
        tools: &[Tool],
        response_format: &Value,
    ) -> Result<(Message, Usage)>;
}
