use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tokio::sync::Mutex as AsyncMutex;
use uuid::Uuid;

use crate::errors::{AgentError, AgentResult};
use crate::models::component::Component;
use crate::models::message::Message;
use crate::models::role::Role;
use crate::prompt::SALES_PROMPT;
use crate::providers::base::Provider;
use crate::tools::ToolRegistry;

type History = Arc<AsyncMutex<Vec<Message>>>;

/// Drives a conversation turn: one completion, at most one tool dispatch,
/// and at most one follow-up completion, returning the parsed component.
///
/// Histories are keyed by conversation id. The outer lock only guards the
/// table; each conversation's own async lock is held for the whole turn, so
/// concurrent requests to the same conversation serialize while distinct
/// conversations proceed independently.
pub struct Agent {
    provider: Box<dyn Provider + Send + Sync>,
    registry: ToolRegistry,
    conversations: Mutex<HashMap<Uuid, History>>,
}

impl Agent {
    pub fn new(provider: Box<dyn Provider + Send + Sync>, registry: ToolRegistry) -> Self {
        Self {
            provider,
            registry,
            conversations: Mutex::new(HashMap::new()),
        }
    }

    /// Handle one incoming message for the given conversation.
    ///
    /// Appends the incoming message, asks the model for either a structured
    /// component or a tool call, runs at most the first requested tool, and
    /// returns the component parsed from the model's reply. A failed tool
    /// round leaves the history exactly as it was before the round started.
    pub async fn handle(
        &self,
        conversation_id: Uuid,
        role: Role,
        content: &str,
    ) -> AgentResult<Component> {
        let history = self.conversation(conversation_id);
        let mut history = history.lock().await;

        history.push(Message::new(role).with_text(content));

        let tools = self.registry.declarations();
        let response_format = Component::response_format();

        let reply = self
            .complete(&history, &tools, &response_format)
            .await?;

        let tool_requests = reply.tool_requests();
        let request = match tool_requests.first() {
            Some(request) => *request,
            None => return parse_component(&reply),
        };
        if tool_requests.len() > 1 {
            tracing::warn!(
                ignored = tool_requests.len() - 1,
                "model requested multiple tools; only the first is honored"
            );
        }

        let call = request.tool_call.clone()?;
        let id = request.id.clone();

        // Dispatch before touching the history: an unknown tool or a failed
        // execution must leave no partial tool round behind.
        let output = self.registry.dispatch(&call).await?;

        let checkpoint = history.len();
        history.push(reply.clone());
        history.push(Message::tool().with_tool_response(id, Ok(output)));

        match self.complete(&history, &tools, &response_format).await {
            Ok(second) => parse_component(&second),
            Err(e) => {
                history.truncate(checkpoint);
                Err(e)
            }
        }
    }

    /// A snapshot of the conversation's history; empty if the conversation
    /// has never been seen.
    pub async fn history(&self, conversation_id: Uuid) -> Vec<Message> {
        let history = {
            let conversations = self
                .conversations
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            match conversations.get(&conversation_id) {
                Some(history) => history.clone(),
                None => return Vec::new(),
            }
        };
        let history = history.lock().await;
        history.clone()
    }

    async fn complete(
        &self,
        messages: &[Message],
        tools: &[crate::models::tool::Tool],
        response_format: &Value,
    ) -> AgentResult<Message> {
        let (message, usage) = self
            .provider
            .complete(messages, tools, response_format)
            .await
            .map_err(|e| AgentError::Upstream(e.to_string()))?;
        tracing::debug!(
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            "completion finished"
        );
        Ok(message)
    }

    fn conversation(&self, conversation_id: Uuid) -> History {
        let mut conversations = self
            .conversations
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        conversations
            .entry(conversation_id)
            .or_insert_with(|| {
                Arc::new(AsyncMutex::new(vec![
                    Message::system().with_text(SALES_PROMPT)
                ]))
            })
            .clone()
    }
}

fn parse_component(message: &Message) -> AgentResult<Component> {
    let text = message.text().ok_or_else(|| {
        AgentError::SchemaViolation("assistant reply carried no text content".to_string())
    })?;
    Component::from_model_text(text)
}
