use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::role::Role;
use super::tool::ToolCall;

/// The JSON text a tool handler produced, keyed to the call that
/// requested it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResponse {
    pub id: String,
    pub output: String,
}

/// Content carried inside a message: plain text, a tool request from
/// the model, or a tool result fed back to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MessageContent {
    Text(String),
    ToolRequest(ToolCall),
    ToolResponse(ToolResponse),
}

impl MessageContent {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            MessageContent::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_tool_request(&self) -> Option<&ToolCall> {
        match self {
            MessageContent::ToolRequest(call) => Some(call),
            _ => None,
        }
    }

    pub fn as_tool_response(&self) -> Option<&ToolResponse> {
        match self {
            MessageContent::ToolResponse(response) => Some(response),
            _ => None,
        }
    }
}

/// A message to or from the model. The ordered sequence of messages is
/// the transcript; it is only ever appended to, never edited in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub created: i64,
    pub content: Vec<MessageContent>,
}

impl Message {
    pub fn user() -> Self {
        Message {
            role: Role::User,
            created: Utc::now().timestamp(),
            content: Vec::new(),
        }
    }

    pub fn assistant() -> Self {
        Message {
            role: Role::Assistant,
            created: Utc::now().timestamp(),
            content: Vec::new(),
        }
    }

    pub fn with_content(mut self, content: MessageContent) -> Self {
        self.content.push(content);
        self
    }

    pub fn with_text<S: Into<String>>(self, text: S) -> Self {
        self.with_content(MessageContent::Text(text.into()))
    }

    pub fn with_tool_request(self, call: ToolCall) -> Self {
        self.with_content(MessageContent::ToolRequest(call))
    }

    pub fn with_tool_response<I, O>(self, id: I, output: O) -> Self
    where
        I: Into<String>,
        O: Into<String>,
    {
        self.with_content(MessageContent::ToolResponse(ToolResponse {
            id: id.into(),
            output: output.into(),
        }))
    }

    /// All tool requests carried by this message, in emission order.
    pub fn tool_requests(&self) -> Vec<&ToolCall> {
        self.content
            .iter()
            .filter_map(|content| content.as_tool_request())
            .collect()
    }

    /// Concatenated text content, or None when the message has none.
    pub fn text(&self) -> Option<String> {
        let texts: Vec<&str> = self
            .content
            .iter()
            .filter_map(|content| content.as_text())
            .collect();
        if texts.is_empty() {
            None
        } else {
            Some(texts.join("\n"))
        }
    }
}
