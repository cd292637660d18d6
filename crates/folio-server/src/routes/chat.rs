use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use folio::agent::Agent;
use folio::cards::ProjectCard;
use folio::models::message::Message;
use folio::providers::factory;
use folio::tools::ToolRegistry;
use serde::{Deserialize, Serialize};

use crate::rate_limit::RateLimitDecision;
use crate::state::AppState;

const MAX_MESSAGES: usize = 20;
const MAX_CONTENT_LEN: usize = 4000;

#[derive(Debug, Deserialize)]
struct ChatRequest {
    messages: Vec<IncomingMessage>,
    #[serde(rename = "sessionId")]
    #[allow(dead_code)]
    session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IncomingMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatReply {
    answer: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    cards: Vec<ProjectCard>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

fn error_body(error: &str, details: Option<String>) -> Json<ErrorBody> {
    Json(ErrorBody {
        error: error.to_string(),
        details,
    })
}

/// The client identifier the rate limiter keys on: the leftmost
/// `X-Forwarded-For` entry when the proxy provides one.
fn client_key(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

fn rate_limit_headers(decision: &RateLimitDecision) -> [(&'static str, String); 3] {
    [
        ("x-ratelimit-limit", decision.limit.to_string()),
        ("x-ratelimit-remaining", decision.remaining.to_string()),
        ("x-ratelimit-reset", decision.reset.to_string()),
    ]
}

/// Check the payload shape and convert it to the internal transcript.
fn validate(request: &ChatRequest) -> Result<Vec<Message>, String> {
    if request.messages.is_empty() {
        return Err("messages must contain at least one item".to_string());
    }
    if request.messages.len() > MAX_MESSAGES {
        return Err(format!("messages must contain at most {MAX_MESSAGES} items"));
    }

    let mut transcript = Vec::with_capacity(request.messages.len());
    for (index, message) in request.messages.iter().enumerate() {
        if message.content.chars().count() > MAX_CONTENT_LEN {
            return Err(format!(
                "messages[{index}].content exceeds {MAX_CONTENT_LEN} characters"
            ));
        }
        match message.role.as_str() {
            "user" => transcript.push(Message::user().with_text(message.content.clone())),
            "assistant" => transcript.push(Message::assistant().with_text(message.content.clone())),
            other => {
                return Err(format!(
                    "messages[{index}].role must be user or assistant, got {other}"
                ))
            }
        }
    }
    Ok(transcript)
}

async fn chat_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<ChatRequest>,
) -> Response {
    let decision = state.limiter.check(&client_key(&headers));
    if !decision.allowed {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            rate_limit_headers(&decision),
            error_body("Too many requests", None),
        )
            .into_response();
    }

    let transcript = match validate(&request) {
        Ok(transcript) => transcript,
        Err(details) => {
            return (
                StatusCode::BAD_REQUEST,
                error_body("Invalid request", Some(details)),
            )
                .into_response();
        }
    };

    let provider = match factory::get_provider(state.provider_config.clone()) {
        Ok(provider) => provider,
        Err(err) => {
            // Configuration detail stays out of the client response.
            tracing::error!("provider setup failed: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_body("Something went wrong", None),
            )
                .into_response();
        }
    };

    let agent = Agent::new(provider, ToolRegistry::new(state.store.clone()));
    match agent.run(&transcript).await {
        Ok(outcome) => (
            StatusCode::OK,
            rate_limit_headers(&decision),
            Json(ChatReply {
                answer: outcome.answer,
                cards: outcome.cards,
            }),
        )
            .into_response(),
        Err(err) => {
            tracing::error!("chat request failed: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_body("Something went wrong", None),
            )
                .into_response()
        }
    }
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/chat", post(chat_handler))
        .with_state(state)
}
