use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::json_body;
use crate::error::AppError;
use crate::services::chatbot::Topic;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub success: bool,
    pub message: String,
    pub topic: Topic,
}

pub async fn api_chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let req = json_body(payload)?;
    let reply = state.responder.respond(&req.message)?;
    tracing::debug!(topic = ?reply.topic, "Chat reply");
    Ok(Json(ChatResponse {
        success: true,
        message: reply.text.to_string(),
        topic: reply.topic,
    }))
}
