//! Assistant API endpoint.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{ChatReply, ChatRequest, ChatRole};
use crate::AppState;

/// Longest accepted message.
const MAX_MESSAGE_CHARS: usize = 4000;
/// Most turns forwarded per request.
const MAX_MESSAGES: usize = 50;

fn validate(request: &ChatRequest) -> Result<(), AppError> {
    let Some(last) = request.messages.last() else {
        return Err(AppError::Validation("messages must not be empty".to_string()));
    };
    if last.role != ChatRole::User {
        return Err(AppError::Validation(
            "the last message must come from the user".to_string(),
        ));
    }
    if request.messages.len() > MAX_MESSAGES {
        return Err(AppError::Validation(format!(
            "at most {} messages are accepted",
            MAX_MESSAGES
        )));
    }
    for message in &request.messages {
        if message.content.trim().is_empty() {
            return Err(AppError::Validation("messages must not be blank".to_string()));
        }
        if message.content.chars().count() > MAX_MESSAGE_CHARS {
            return Err(AppError::Validation(format!(
                "messages are limited to {} characters",
                MAX_MESSAGE_CHARS
            )));
        }
    }
    Ok(())
}

/// POST /api/assistant/chat - Reply to a conversation.
pub async fn chat(
    State(state): State<AppState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> ApiResult<ChatReply> {
    let Json(request) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    validate(&request)?;
    let reply = state
        .assistant
        .send(&request.messages, request.eip_number)
        .await;
    success(ChatReply { reply })
}
