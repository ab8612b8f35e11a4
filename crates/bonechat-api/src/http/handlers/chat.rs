//! Chat HTTP handlers.
//!
//! Endpoints:
//! - POST /chatbot               - Form endpoint with plain JSON replies
//! - POST /api/v1/chat           - Send a message (or reset) with a JSON body
//! - POST /api/v1/chat/reset     - Clear the session's history
//! - GET  /api/v1/chat/history   - Stored turns of the session

use std::time::Instant;

use axum::extract::State;
use axum::extract::rejection::FormRejection;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use bonechat_core::chat::command::is_reset_command;
use bonechat_types::chat::Turn;

use crate::http::error::AppError;
use crate::http::extractors::session::ChatSession;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Form fields posted by the chat page.
#[derive(Debug, Default, Deserialize)]
pub struct ChatbotForm {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub reset: Option<String>,
}

/// Body of `POST /api/v1/chat`.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub reset: bool,
}

#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub message: String,
    pub response: String,
    /// Turns stored after this exchange.
    pub turns: usize,
}

#[derive(Debug, Serialize)]
pub struct ResetReply {
    pub ok: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ChatOutcome {
    Reply(ChatReply),
    Reset(ResetReply),
}

#[derive(Debug, Serialize)]
pub struct HistoryReply {
    pub turns: Vec<Turn>,
    pub max_turns: usize,
}

type Enveloped<T> = Result<(HeaderMap, Json<ApiResponse<T>>), AppError>;

fn reset_reply(state: &AppState, session: &mut ChatSession) -> ResetReply {
    let confirmation = state.orchestrator.handle_reset(&mut session.0);
    ResetReply {
        ok: true,
        message: confirmation.to_string(),
    }
}

/// POST /chatbot - Send a message or reset, form-encoded.
///
/// `reset=1` or a `/reset` message clears the history. Replies are plain
/// JSON objects, not envelopes. A body that is not a readable form counts
/// as an empty one.
pub async fn chatbot(
    State(state): State<AppState>,
    mut session: ChatSession,
    form: Result<Form<ChatbotForm>, FormRejection>,
) -> Response {
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Unreadable chatbot form");
            ChatbotForm::default()
        }
    };

    let wants_reset = form.reset.as_deref() == Some("1")
        || form.message.as_deref().is_some_and(is_reset_command);
    if wants_reset {
        let reply = reset_reply(&state, &mut session);
        let headers = session.commit(&state);
        return (headers, Json(reply)).into_response();
    }

    let message = form.message.unwrap_or_default();
    if message.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Empty message" })),
        )
            .into_response();
    }

    match state.orchestrator.handle_message(&mut session.0, &message).await {
        Ok(response) => {
            let headers = session.commit(&state);
            (
                headers,
                Json(json!({ "message": message, "response": response })),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Chat request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

/// POST /api/v1/chat - Send a message (or reset) as JSON.
pub async fn send_message(
    State(state): State<AppState>,
    mut session: ChatSession,
    Json(req): Json<ChatRequest>,
) -> Enveloped<ChatOutcome> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let outcome = if req.reset || is_reset_command(&req.message) {
        ChatOutcome::Reset(reset_reply(&state, &mut session))
    } else {
        if req.message.is_empty() {
            return Err(AppError::Validation("Empty message".to_string()));
        }
        let response = state
            .orchestrator
            .handle_message(&mut session.0, &req.message)
            .await?;
        let turns = state.orchestrator.history(&session.0).len();
        ChatOutcome::Reply(ChatReply {
            message: req.message,
            response,
            turns,
        })
    };

    let headers = session.commit(&state);
    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(outcome, request_id, elapsed)
        .with_link("history", "/api/v1/chat/history");

    Ok((headers, Json(resp)))
}

/// POST /api/v1/chat/reset - Clear the session's history.
pub async fn reset_chat(
    State(state): State<AppState>,
    mut session: ChatSession,
) -> Enveloped<ResetReply> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let reply = reset_reply(&state, &mut session);
    let headers = session.commit(&state);

    let elapsed = start.elapsed().as_millis() as u64;
    Ok((headers, Json(ApiResponse::success(reply, request_id, elapsed))))
}

/// GET /api/v1/chat/history - Stored turns, oldest first.
pub async fn get_history(
    State(state): State<AppState>,
    session: ChatSession,
) -> Enveloped<HistoryReply> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let reply = HistoryReply {
        turns: state.orchestrator.history(&session.0),
        max_turns: state.orchestrator.turn_store().max_turns(),
    };
    let headers = session.commit(&state);

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(reply, request_id, elapsed)
        .with_link("self", "/api/v1/chat/history");

    Ok((headers, Json(resp)))
}
