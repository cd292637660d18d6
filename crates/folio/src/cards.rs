//! Project cards: structured summaries extracted from tool output for
//! rich display alongside the text answer. Cards are derived per
//! request and never stored.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectCard {
    pub title: String,
    pub description: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub demo_url: Option<String>,
}

fn string_field(value: &Value, field: &str) -> Option<String> {
    value.get(field).and_then(|v| v.as_str()).map(String::from)
}

fn string_list(value: &Value, field: &str) -> Option<Vec<String>> {
    let list: Vec<String> = value
        .get(field)?
        .as_array()?
        .iter()
        .filter_map(|v| v.as_str().map(String::from))
        .collect();
    if list.is_empty() {
        None
    } else {
        Some(list)
    }
}

fn card_from_project(value: &Value) -> Option<ProjectCard> {
    Some(ProjectCard {
        title: string_field(value, "title")?,
        description: string_field(value, "description").unwrap_or_default(),
        url: string_field(value, "url")?,
        metrics: string_field(value, "metrics"),
        tags: string_list(value, "tags"),
        github_url: string_field(value, "github_url"),
        demo_url: string_field(value, "demo_url"),
    })
}

fn card_from_search_hit(value: &Value) -> Option<ProjectCard> {
    Some(ProjectCard {
        title: string_field(value, "title")?,
        description: string_field(value, "snippet").unwrap_or_default(),
        url: string_field(value, "url")?,
        metrics: None,
        tags: None,
        github_url: None,
        demo_url: None,
    })
}

fn is_project_shaped(value: &Value) -> bool {
    value.get("slug").is_some() && value.get("title").is_some() && value.get("url").is_some()
}

/// Scan the ordered tool-result payloads for project-like records.
/// Recognizes `{"projects": [...]}` listings, single project objects,
/// and `{"results": [...]}` search listings (project-tagged entries
/// only). Deduplicates by URL keeping the first occurrence; source
/// order is preserved. Pure and idempotent.
pub fn extract_cards<S: AsRef<str>>(payloads: &[S]) -> Vec<ProjectCard> {
    let mut cards = Vec::new();

    for payload in payloads {
        let Ok(value) = serde_json::from_str::<Value>(payload.as_ref()) else {
            continue;
        };

        if let Some(projects) = value.get("projects").and_then(|v| v.as_array()) {
            cards.extend(projects.iter().filter_map(card_from_project));
        } else if is_project_shaped(&value) {
            cards.extend(card_from_project(&value));
        } else if let Some(results) = value.get("results").and_then(|v| v.as_array()) {
            cards.extend(
                results
                    .iter()
                    .filter(|hit| hit.get("type").and_then(|t| t.as_str()) == Some("project"))
                    .filter_map(card_from_search_hit),
            );
        }
    }

    let mut seen = HashSet::new();
    cards.retain(|card| seen.insert(card.url.clone()));
    cards
}
