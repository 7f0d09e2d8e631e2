use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::rejection::JsonRejection,
    extract::State,
    response::AppendHeaders,
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use showroom::models::role::Role;
use uuid::Uuid;

/// Response header echoing the conversation the turn was recorded under, so
/// the body can stay the raw component JSON.
pub const CONVERSATION_ID_HEADER: &str = "x-conversation-id";

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    role: String,
    content: String,
    #[serde(default)]
    conversation_id: Option<Uuid>,
}

fn parse_role(role: &str) -> Result<Role, ApiError> {
    match role {
        "system" => Ok(Role::System),
        "user" => Ok(Role::User),
        "assistant" => Ok(Role::Assistant),
        other => Err(ApiError::BadRequest(format!("unknown role: {other}"))),
    }
}

async fn chat_handler(
    State(state): State<AppState>,
    request: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let Json(request) =
        request.map_err(|e| ApiError::BadRequest(format!("invalid request body: {e}")))?;

    let role = parse_role(&request.role)?;
    if request.content.trim().is_empty() {
        return Err(ApiError::BadRequest("content must not be empty".to_string()));
    }

    let conversation_id = request.conversation_id.unwrap_or_else(Uuid::new_v4);
    let component = state
        .agent
        .handle(conversation_id, role, &request.content)
        .await?;

    Ok((
        AppendHeaders([(CONVERSATION_ID_HEADER, conversation_id.to_string())]),
        Json(component),
    ))
}

// Configure routes for this module
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/chat", post(chat_handler))
        .with_state(state)
}
