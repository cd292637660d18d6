use serde::{Deserialize, Serialize};

use super::store::ContentStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchCategory {
    About,
    Resume,
    Experience,
    Project,
    Skills,
}

/// One keyword-search match, tagged by the content category it came
/// from. `url` and `slug` are only present for project hits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(rename = "type")]
    pub category: SearchCategory,
    pub title: String,
    pub snippet: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

fn matches(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

impl ContentStore {
    /// Case-insensitive substring search across bio, resume summary,
    /// experience highlights, project metadata, and skill lists.
    ///
    /// Result ordering is stable: about, resume summary, experience
    /// entries in original order, projects in original order, skills.
    pub fn keyword_search(&self, query: &str) -> Vec<SearchHit> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        let mut hits = Vec::new();

        if matches(&self.profile().bio, &needle) {
            hits.push(SearchHit {
                category: SearchCategory::About,
                title: format!("About {}", self.profile().name),
                snippet: self.profile().bio.clone(),
                url: None,
                slug: None,
            });
        }

        if matches(&self.resume().summary, &needle) {
            hits.push(SearchHit {
                category: SearchCategory::Resume,
                title: "Resume summary".to_string(),
                snippet: self.resume().summary.clone(),
                url: None,
                slug: None,
            });
        }

        for entry in &self.resume().experience {
            let in_highlights = entry.highlights.iter().any(|h| matches(h, &needle));
            if matches(&entry.role, &needle) || matches(&entry.company, &needle) || in_highlights {
                let snippet = entry
                    .highlights
                    .iter()
                    .find(|h| matches(h, &needle))
                    .cloned()
                    .unwrap_or_else(|| entry.period.clone());
                hits.push(SearchHit {
                    category: SearchCategory::Experience,
                    title: format!("{} at {}", entry.role, entry.company),
                    snippet,
                    url: None,
                    slug: None,
                });
            }
        }

        for project in self.projects() {
            let in_tags = project.tags.iter().any(|t| matches(t, &needle));
            let in_stack = project.tech_stack.iter().any(|t| matches(t, &needle));
            if matches(&project.title, &needle)
                || matches(&project.description, &needle)
                || in_tags
                || in_stack
            {
                hits.push(SearchHit {
                    category: SearchCategory::Project,
                    title: project.title.clone(),
                    snippet: project.description.clone(),
                    url: Some(project.url.clone()),
                    slug: Some(project.slug.clone()),
                });
            }
        }

        for (category, skills) in &self.resume().skills {
            let in_items = skills.iter().any(|s| matches(s, &needle));
            if matches(category, &needle) || in_items {
                hits.push(SearchHit {
                    category: SearchCategory::Skills,
                    title: category.clone(),
                    snippet: skills.join(", "),
                    url: None,
                    slug: None,
                });
            }
        }

        hits
    }
}
