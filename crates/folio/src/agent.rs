//! The orchestration loop: a bounded negotiation between the model
//! and the tool registry for one chat request.

use serde::Serialize;

use crate::cards::{extract_cards, ProjectCard};
use crate::errors::AgentError;
use crate::models::message::Message;
use crate::prompt_template::load_prompt;
use crate::providers::base::Provider;
use crate::tools::ToolRegistry;

/// Upper bound on model turns per request.
pub const MAX_ITERATIONS: usize = 5;

/// Cards returned alongside an answer are capped at this many.
pub const MAX_CARDS: usize = 5;

const FALLBACK_ANSWER: &str = "Sorry, I wasn't able to put together an answer for that. \
     Could you try rephrasing your question?";

const SYSTEM_TEMPLATE: &str = include_str!("prompts/system.md");

#[derive(Debug, Clone, PartialEq)]
pub struct ChatOutcome {
    pub answer: String,
    pub cards: Vec<ProjectCard>,
}

impl ChatOutcome {
    fn fallback() -> Self {
        Self {
            answer: FALLBACK_ANSWER.to_string(),
            cards: Vec::new(),
        }
    }
}

#[derive(Serialize)]
struct ToolDoc {
    name: String,
    description: String,
    schema: String,
}

#[derive(Serialize)]
struct PromptContext {
    owner: String,
    tools: Vec<ToolDoc>,
}

pub struct Agent {
    provider: Box<dyn Provider>,
    registry: ToolRegistry,
}

impl Agent {
    pub fn new(provider: Box<dyn Provider>, registry: ToolRegistry) -> Self {
        Self { provider, registry }
    }

    fn system_prompt(&self) -> Result<String, AgentError> {
        let context = PromptContext {
            owner: self.registry.store().profile().name.clone(),
            tools: self
                .registry
                .definitions()
                .iter()
                .map(|tool| ToolDoc {
                    name: tool.name.clone(),
                    description: tool.description.clone(),
                    schema: tool.input_schema.to_string(),
                })
                .collect(),
        };
        load_prompt(SYSTEM_TEMPLATE, &context).map_err(|e| AgentError::Internal(e.to_string()))
    }

    /// Drive up to [`MAX_ITERATIONS`] model turns. Tool calls within a
    /// turn run sequentially in emission order and their results are
    /// appended to the transcript before the next model call; the
    /// transcript is never reordered or pruned. Provider failures
    /// propagate untouched.
    pub async fn run(&self, history: &[Message]) -> Result<ChatOutcome, AgentError> {
        let system = self.system_prompt()?;
        let tools = self.registry.definitions().to_vec();
        let mut transcript: Vec<Message> = history.to_vec();
        let mut payloads: Vec<String> = Vec::new();

        for _ in 0..MAX_ITERATIONS {
            let response = self.provider.complete(&system, &transcript, &tools).await?;

            let requests: Vec<_> = response
                .message
                .tool_requests()
                .into_iter()
                .cloned()
                .collect();

            if !requests.is_empty() {
                transcript.push(response.message.clone());
                let mut results = Message::user();
                for call in requests {
                    let output = self.registry.invoke(&call.name, &call.arguments);
                    payloads.push(output.clone());
                    results = results.with_tool_response(call.id, output);
                }
                transcript.push(results);
                continue;
            }

            match response.message.text() {
                Some(answer) if !answer.trim().is_empty() => {
                    let mut cards = extract_cards(&payloads);
                    cards.truncate(MAX_CARDS);
                    return Ok(ChatOutcome { answer, cards });
                }
                // Neither tool calls nor content: nothing sensible to
                // continue from.
                _ => return Ok(ChatOutcome::fallback()),
            }
        }

        Ok(ChatOutcome::fallback())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::store::ContentStore;
    use crate::content::types::{Project, Resume, SiteProfile, SocialLinks};
    use crate::models::tool::ToolCall;
    use crate::providers::base::FinishReason;
    use crate::providers::mock::MockProvider;
    use serde_json::json;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    fn sample_registry() -> ToolRegistry {
        let profile = SiteProfile {
            name: "Ada".to_string(),
            title: "Engineer".to_string(),
            bio: "Builds Rust services.".to_string(),
            location: "Berlin".to_string(),
            email: Some("ada@example.com".to_string()),
            social: SocialLinks::default(),
        };
        let resume = Resume {
            summary: "Summary.".to_string(),
            experience: Vec::new(),
            education: Vec::new(),
            skills: Default::default(),
            certifications: Vec::new(),
        };
        let projects = vec![Project {
            slug: "raytracer".to_string(),
            title: "Raytracer".to_string(),
            description: "A toy raytracer.".to_string(),
            url: "https://example.com/raytracer".to_string(),
            tags: Vec::new(),
            tech_stack: Vec::new(),
            featured: true,
            year: 2023,
            metrics: None,
            github_url: None,
            demo_url: None,
        }];
        ToolRegistry::new(Arc::new(ContentStore::from_parts(profile, resume, projects)))
    }

    fn agent_with(responses: Vec<crate::providers::base::ChatResponse>) -> (Agent, Arc<std::sync::atomic::AtomicUsize>) {
        let provider = MockProvider::new(responses);
        let calls = provider.call_counter();
        (Agent::new(Box::new(provider), sample_registry()), calls)
    }

    fn text_reply(text: &str) -> crate::providers::base::ChatResponse {
        MockProvider::reply(Message::assistant().with_text(text), FinishReason::Stop)
    }

    fn tool_reply(id: &str, name: &str, args: serde_json::Value) -> crate::providers::base::ChatResponse {
        MockProvider::reply(
            Message::assistant().with_tool_request(ToolCall::new(id, name, args)),
            FinishReason::ToolCalls,
        )
    }

    #[tokio::test]
    async fn direct_answer_ends_after_one_turn() {
        let (agent, calls) = agent_with(vec![text_reply("Hi, ask me about Ada's work.")]);

        let outcome = agent
            .run(&[Message::user().with_text("Hello")])
            .await
            .unwrap();

        assert_eq!(outcome.answer, "Hi, ask me about Ada's work.");
        assert!(outcome.cards.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn tool_turn_then_answer_extracts_cards() {
        let (agent, calls) = agent_with(vec![
            tool_reply("call_1", "get_project", json!({"slug": "raytracer"})),
            text_reply("The raytracer is Ada's featured project."),
        ]);

        let outcome = agent
            .run(&[Message::user().with_text("Tell me about the raytracer")])
            .await
            .unwrap();

        assert_eq!(outcome.answer, "The raytracer is Ada's featured project.");
        assert_eq!(outcome.cards.len(), 1);
        assert_eq!(outcome.cards[0].url, "https://example.com/raytracer");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn contact_lookup_yields_no_cards() {
        let (agent, _) = agent_with(vec![
            tool_reply("call_1", "get_contact", json!({})),
            text_reply("My email is x@y.com"),
        ]);

        let outcome = agent
            .run(&[Message::user().with_text("What is your email?")])
            .await
            .unwrap();

        assert_eq!(outcome.answer, "My email is x@y.com");
        assert!(outcome.cards.is_empty());
    }

    #[tokio::test]
    async fn unknown_tool_is_fed_back_not_fatal() {
        let (agent, _) = agent_with(vec![
            tool_reply("call_1", "get_weather", json!({})),
            text_reply("I can only answer questions about this site."),
        ]);

        let outcome = agent
            .run(&[Message::user().with_text("What's the weather?")])
            .await
            .unwrap();

        assert_eq!(outcome.answer, "I can only answer questions about this site.");
        assert!(outcome.cards.is_empty());
    }

    #[tokio::test]
    async fn loop_is_bounded_at_five_turns() {
        let reply = tool_reply("call_1", "get_skills", json!({}));
        let (agent, calls) = agent_with(vec![reply; 10]);

        let outcome = agent
            .run(&[Message::user().with_text("Keep digging")])
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), MAX_ITERATIONS);
        assert_eq!(outcome.answer, FALLBACK_ANSWER);
        assert!(outcome.cards.is_empty());
    }

    #[tokio::test]
    async fn cards_are_capped_at_five() {
        let profile = SiteProfile {
            name: "Ada".to_string(),
            title: "Engineer".to_string(),
            bio: "Builds Rust services.".to_string(),
            location: "Berlin".to_string(),
            email: None,
            social: SocialLinks::default(),
        };
        let resume = Resume {
            summary: "Summary.".to_string(),
            experience: Vec::new(),
            education: Vec::new(),
            skills: Default::default(),
            certifications: Vec::new(),
        };
        let projects = (0..6)
            .map(|i| Project {
                slug: format!("p{i}"),
                title: format!("Project {i}"),
                description: format!("Project number {i}."),
                url: format!("https://example.com/p{i}"),
                tags: Vec::new(),
                tech_stack: Vec::new(),
                featured: false,
                year: 2018 + i,
                metrics: None,
                github_url: None,
                demo_url: None,
            })
            .collect();
        let registry =
            ToolRegistry::new(Arc::new(ContentStore::from_parts(profile, resume, projects)));

        let provider = MockProvider::new(vec![
            tool_reply("call_1", "list_projects", json!({})),
            text_reply("Here is everything I have built."),
        ]);
        let agent = Agent::new(Box::new(provider), registry);

        let outcome = agent
            .run(&[Message::user().with_text("Show me all your projects")])
            .await
            .unwrap();

        assert_eq!(outcome.cards.len(), MAX_CARDS);
        // First-five by source order survive the cap.
        assert_eq!(outcome.cards[0].url, "https://example.com/p0");
        assert_eq!(outcome.cards[4].url, "https://example.com/p4");
    }

    #[tokio::test]
    async fn empty_turn_falls_back_immediately() {
        let (agent, calls) = agent_with(vec![MockProvider::reply(
            Message::assistant(),
            FinishReason::Stop,
        )]);

        let outcome = agent
            .run(&[Message::user().with_text("Hello")])
            .await
            .unwrap();

        assert_eq!(outcome.answer, FALLBACK_ANSWER);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn multiple_calls_in_one_turn_run_in_emission_order() {
        let turn = MockProvider::reply(
            Message::assistant()
                .with_tool_request(ToolCall::new("call_1", "get_skills", json!({})))
                .with_tool_request(ToolCall::new(
                    "call_2",
                    "get_project",
                    json!({"slug": "raytracer"}),
                )),
            FinishReason::ToolCalls,
        );
        let (agent, _) = agent_with(vec![turn, text_reply("Done.")]);

        let outcome = agent
            .run(&[Message::user().with_text("skills and projects")])
            .await
            .unwrap();

        // Second call's payload is project-shaped and becomes the card.
        assert_eq!(outcome.answer, "Done.");
        assert_eq!(outcome.cards.len(), 1);
        assert_eq!(outcome.cards[0].title, "Raytracer");
    }

    #[test]
    fn system_prompt_documents_all_tools_and_markers() {
        let (agent, _) = agent_with(vec![]);
        let prompt = agent.system_prompt().unwrap();

        assert!(prompt.contains("Ada"));
        for name in [
            "search_site",
            "list_projects",
            "get_project",
            "get_skills",
            "get_resume_section",
            "get_contact",
        ] {
            assert!(prompt.contains(name), "missing tool {name}");
        }
        assert!(prompt.contains("TOOL_CALL:"));
        assert!(prompt.contains("FINAL:"));
    }
}
