//! Conversion between the internal transcript shape and the
//! OpenAI-style wire format, plus normalization of backend responses
//! into [`ChatResponse`].

use regex::Regex;
use serde_json::{json, Value};
use uuid::Uuid;

use super::base::{ChatResponse, FinishReason, Usage};
use super::marker;
use crate::errors::ProviderError;
use crate::models::message::{Message, MessageContent};
use crate::models::tool::{Tool, ToolCall};

/// Convert the internal transcript to OpenAI-style message objects.
/// Tool responses become `role: "tool"` entries keyed by call id,
/// immediately following the assistant message that requested them.
pub fn messages_to_openai_spec(messages: &[Message]) -> Vec<Value> {
    let mut spec = Vec::new();

    for message in messages {
        let mut converted = json!({ "role": message.role });
        let mut tool_outputs = Vec::new();

        for content in &message.content {
            match content {
                MessageContent::Text(text) => {
                    if !text.is_empty() {
                        converted["content"] = json!(text);
                    }
                }
                MessageContent::ToolRequest(call) => {
                    let tool_calls = converted
                        .as_object_mut()
                        .expect("converted message is an object")
                        .entry("tool_calls")
                        .or_insert(json!([]));
                    tool_calls.as_array_mut().expect("tool_calls is an array").push(json!({
                        "id": call.id,
                        "type": "function",
                        "function": {
                            "name": sanitize_function_name(&call.name),
                            "arguments": call.arguments.to_string(),
                        }
                    }));
                }
                MessageContent::ToolResponse(response) => {
                    tool_outputs.push(json!({
                        "role": "tool",
                        "content": response.output,
                        "tool_call_id": response.id,
                    }));
                }
            }
        }

        if converted.get("content").is_some() || converted.get("tool_calls").is_some() {
            spec.push(converted);
        }
        spec.extend(tool_outputs);
    }

    spec
}

/// Convert the tool catalog to OpenAI function declarations.
pub fn tools_to_openai_spec(tools: &[Tool]) -> Result<Vec<Value>, ProviderError> {
    let mut names = std::collections::HashSet::new();
    let mut spec = Vec::new();

    for tool in tools {
        if !names.insert(&tool.name) {
            return Err(ProviderError::Protocol(format!(
                "duplicate tool name: {}",
                tool.name
            )));
        }
        spec.push(json!({
            "type": "function",
            "function": {
                "name": tool.name,
                "description": tool.description,
                "parameters": tool.input_schema,
            }
        }));
    }

    Ok(spec)
}

pub fn sanitize_function_name(name: &str) -> String {
    let re = Regex::new(r"[^a-zA-Z0-9_-]").expect("valid regex");
    re.replace_all(name, "_").to_string()
}

/// Token usage if the backend reported it; missing counts are None.
pub fn get_usage(response: &Value) -> Usage {
    let Some(usage) = response.get("usage") else {
        return Usage::default();
    };
    let field = |name: &str| usage.get(name).and_then(|v| v.as_i64()).map(|v| v as i32);

    let input_tokens = field("prompt_tokens");
    let output_tokens = field("completion_tokens");
    let total_tokens = field("total_tokens").or_else(|| match (input_tokens, output_tokens) {
        (Some(input), Some(output)) => Some(input + output),
        _ => None,
    });

    Usage::new(input_tokens, output_tokens, total_tokens)
}

fn map_finish(reason: Option<&str>) -> FinishReason {
    match reason {
        Some("stop") => FinishReason::Stop,
        Some("tool_calls") => FinishReason::ToolCalls,
        Some("error") => FinishReason::Error,
        _ => FinishReason::Length,
    }
}

/// Normalize a chat-completions response body.
///
/// Grammar order on every response: native structured tool calls,
/// then the `TOOL_CALL:` marker, then `FINAL:`, then the raw text.
pub fn response_to_chat(response: &Value) -> Result<ChatResponse, ProviderError> {
    let choice = response
        .get("choices")
        .and_then(|choices| choices.get(0))
        .ok_or_else(|| ProviderError::Protocol("response has no choices".to_string()))?;
    let raw_message = choice
        .get("message")
        .ok_or_else(|| ProviderError::Protocol("choice has no message".to_string()))?;
    let backend_finish = choice.get("finish_reason").and_then(|v| v.as_str());

    let usage = get_usage(response);

    if let Some(calls) = raw_message.get("tool_calls").and_then(|v| v.as_array()) {
        if !calls.is_empty() {
            let mut message = Message::assistant();
            for call in calls {
                let id = call
                    .get("id")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string();
                let name = call["function"]["name"]
                    .as_str()
                    .unwrap_or_default()
                    .to_string();
                // Argument text that is not valid JSON becomes an
                // empty object; the call still goes through.
                let arguments = call["function"]["arguments"]
                    .as_str()
                    .and_then(|raw| serde_json::from_str::<Value>(raw).ok())
                    .filter(Value::is_object)
                    .unwrap_or_else(|| json!({}));
                message = message.with_tool_request(ToolCall::new(id, name, arguments));
            }
            return Ok(ChatResponse {
                message,
                usage,
                finish_reason: FinishReason::ToolCalls,
            });
        }
    }

    let text = raw_message.get("content").and_then(|v| v.as_str()).ok_or_else(|| {
        ProviderError::Protocol("choice has neither content nor tool calls".to_string())
    })?;

    if let Some(call) = marker::parse_tool_call(text) {
        let id = format!("marker_{}", Uuid::new_v4().simple());
        return Ok(ChatResponse {
            message: Message::assistant().with_tool_request(ToolCall::new(
                id, call.tool, call.args,
            )),
            usage,
            finish_reason: FinishReason::ToolCalls,
        });
    }

    if let Some(answer) = marker::parse_final(text) {
        return Ok(ChatResponse {
            message: Message::assistant().with_text(answer),
            usage,
            finish_reason: FinishReason::Stop,
        });
    }

    Ok(ChatResponse {
        message: Message::assistant().with_text(text),
        usage,
        finish_reason: map_finish(backend_finish),
    })
}
