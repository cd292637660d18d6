use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::base::{ChatResponse, FinishReason, Provider, Usage};
use crate::errors::ProviderError;
use crate::models::message::Message;
use crate::models::tool::Tool;

/// A provider that replays pre-scripted responses for testing. Counts
/// how many completions were requested.
pub struct MockProvider {
    responses: Arc<Mutex<Vec<ChatResponse>>>,
    calls: Arc<AtomicUsize>,
}

impl MockProvider {
    pub fn new(responses: Vec<ChatResponse>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Build a scripted response around a message.
    pub fn reply(message: Message, finish_reason: FinishReason) -> ChatResponse {
        ChatResponse {
            message,
            usage: Usage::default(),
            finish_reason,
        }
    }

    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(
        &self,
        _system: &str,
        _messages: &[Message],
        _tools: &[Tool],
    ) -> Result<ChatResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut responses = self.responses.lock().expect("mock responses lock");
        if responses.is_empty() {
            // Out of script: an empty assistant turn.
            Ok(ChatResponse {
                message: Message::assistant(),
                usage: Usage::default(),
                finish_reason: FinishReason::Stop,
            })
        } else {
            Ok(responses.remove(0))
        }
    }
}
