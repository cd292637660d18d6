//! The fixed catalog of tools the model can call, and their handlers.
//!
//! Every handler is a pure read over the content store. `invoke` never
//! fails out of the registry: unknown names, missing arguments, and
//! handler errors all come back as `{"error": ...}` JSON payloads, so
//! the orchestration loop can hand them to the model as data.

use std::cmp::Reverse;
use std::sync::Arc;

use serde_json::{json, Value};

use crate::content::store::ContentStore;
use crate::errors::ToolError;
use crate::models::tool::Tool;

pub struct ToolRegistry {
    store: Arc<ContentStore>,
    tools: Vec<Tool>,
}

fn required_str<'a>(args: &'a Value, field: &'static str) -> Result<&'a str, ToolError> {
    args.get(field)
        .and_then(|v| v.as_str())
        .ok_or(ToolError::MissingArgument(field))
}

fn optional_str<'a>(args: &'a Value, field: &str) -> Option<&'a str> {
    args.get(field).and_then(|v| v.as_str())
}

impl ToolRegistry {
    pub fn new(store: Arc<ContentStore>) -> Self {
        let tools = vec![
            Tool::new(
                "search_site",
                "Search all site content (bio, resume, projects, skills) for a keyword",
                json!({
                    "type": "object",
                    "properties": {
                        "query": {"type": "string", "description": "The keyword to search for"}
                    },
                    "required": ["query"]
                }),
            ),
            Tool::new(
                "list_projects",
                "List projects, optionally filtered by tag and sorted by impact or recency",
                json!({
                    "type": "object",
                    "properties": {
                        "tag": {"type": "string", "description": "Only include projects carrying this tag"},
                        "sort": {"type": "string", "enum": ["impact", "recent"], "description": "Sort order, defaults to impact"}
                    }
                }),
            ),
            Tool::new(
                "get_project",
                "Fetch one project by its slug",
                json!({
                    "type": "object",
                    "properties": {
                        "slug": {"type": "string", "description": "The project slug"}
                    },
                    "required": ["slug"]
                }),
            ),
            Tool::new(
                "get_skills",
                "Get the full skills-by-category map and certifications",
                json!({"type": "object", "properties": {}}),
            ),
            Tool::new(
                "get_resume_section",
                "Fetch one section of the resume",
                json!({
                    "type": "object",
                    "properties": {
                        "section": {"type": "string", "enum": ["summary", "experience", "education"]}
                    },
                    "required": ["section"]
                }),
            ),
            Tool::new(
                "get_contact",
                "Get public contact information: name, location, and social links",
                json!({"type": "object", "properties": {}}),
            ),
        ];
        Self { store, tools }
    }

    pub fn definitions(&self) -> &[Tool] {
        &self.tools
    }

    pub fn store(&self) -> &ContentStore {
        &self.store
    }

    /// Dispatch a named call. Always returns JSON text; a tool-level
    /// failure is a data outcome, not a fault.
    pub fn invoke(&self, name: &str, args: &Value) -> String {
        let result = match name {
            "search_site" => self.search_site(args),
            "list_projects" => self.list_projects(args),
            "get_project" => self.get_project(args),
            "get_skills" => self.get_skills(),
            "get_resume_section" => self.get_resume_section(args),
            "get_contact" => self.get_contact(),
            other => Err(ToolError::UnknownTool(other.to_string())),
        };
        match result {
            Ok(value) => value.to_string(),
            Err(err) => json!({"error": err.to_string()}).to_string(),
        }
    }

    fn search_site(&self, args: &Value) -> Result<Value, ToolError> {
        let query = required_str(args, "query")?;
        let results = self.store.keyword_search(query);
        Ok(json!({
            "query": query,
            "resultsCount": results.len(),
            "results": results,
        }))
    }

    fn list_projects(&self, args: &Value) -> Result<Value, ToolError> {
        let mut projects: Vec<_> = self.store.projects().iter().collect();

        if let Some(tag) = optional_str(args, "tag") {
            projects.retain(|project| {
                project.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
            });
        }

        match optional_str(args, "sort").unwrap_or("impact") {
            // Stable: featured first, original order within each group.
            "impact" => projects.sort_by_key(|project| !project.featured),
            "recent" => projects.sort_by_key(|project| Reverse(project.year)),
            other => {
                return Err(ToolError::InvalidArgument(format!(
                    "Unknown sort: {other}"
                )))
            }
        }

        Ok(json!({
            "count": projects.len(),
            "projects": projects,
        }))
    }

    fn get_project(&self, args: &Value) -> Result<Value, ToolError> {
        let slug = required_str(args, "slug")?;
        match self.store.project_by_slug(slug) {
            Some(project) => Ok(json!(project)),
            None => Ok(json!({
                "error": format!("No project with slug: {slug}"),
                "availableSlugs": self.store.slugs(),
            })),
        }
    }

    fn get_skills(&self) -> Result<Value, ToolError> {
        let resume = self.store.resume();
        Ok(json!({
            "skills": resume.skills,
            "certifications": resume.certifications,
        }))
    }

    fn get_resume_section(&self, args: &Value) -> Result<Value, ToolError> {
        let resume = self.store.resume();
        match required_str(args, "section")? {
            "summary" => Ok(json!({"section": "summary", "summary": resume.summary})),
            "experience" => Ok(json!({"section": "experience", "experience": resume.experience})),
            "education" => Ok(json!({"section": "education", "education": resume.education})),
            other => Err(ToolError::InvalidArgument(format!(
                "Unknown resume section: {other}"
            ))),
        }
    }

    /// Name, location, and social links only. The profile's email is
    /// deliberately withheld.
    fn get_contact(&self) -> Result<Value, ToolError> {
        let profile = self.store.profile();
        Ok(json!({
            "name": profile.name,
            "location": profile.location,
            "social": profile.social,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::types::{Project, Resume, SiteProfile, SocialLinks};
    use std::collections::BTreeMap;

    fn project(slug: &str, featured: bool, year: i32, tags: &[&str]) -> Project {
        Project {
            slug: slug.to_string(),
            title: slug.to_uppercase(),
            description: format!("The {slug} project."),
            url: format!("https://example.com/{slug}"),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            tech_stack: Vec::new(),
            featured,
            year,
            metrics: None,
            github_url: None,
            demo_url: None,
        }
    }

    fn registry() -> ToolRegistry {
        let profile = SiteProfile {
            name: "Ada".to_string(),
            title: "Engineer".to_string(),
            bio: "Bio text.".to_string(),
            location: "Berlin".to_string(),
            email: Some("ada@example.com".to_string()),
            social: SocialLinks {
                github: Some("https://github.com/ada".to_string()),
                ..SocialLinks::default()
            },
        };
        let mut skills = BTreeMap::new();
        skills.insert("languages".to_string(), vec!["Rust".to_string()]);
        let resume = Resume {
            summary: "Summary.".to_string(),
            experience: Vec::new(),
            education: Vec::new(),
            skills,
            certifications: vec!["CKA".to_string()],
        };
        let projects = vec![
            project("alpha", false, 2024, &["web"]),
            project("beta", true, 2021, &["systems"]),
            project("gamma", true, 2023, &["web", "systems"]),
        ];
        ToolRegistry::new(Arc::new(ContentStore::from_parts(profile, resume, projects)))
    }

    fn invoke(registry: &ToolRegistry, name: &str, args: Value) -> Value {
        serde_json::from_str(&registry.invoke(name, &args)).unwrap()
    }

    #[test]
    fn catalog_has_exactly_six_tools() {
        let registry = registry();
        let names: Vec<&str> = registry
            .definitions()
            .iter()
            .map(|tool| tool.name.as_str())
            .collect();
        assert_eq!(
            names,
            vec![
                "search_site",
                "list_projects",
                "get_project",
                "get_skills",
                "get_resume_section",
                "get_contact",
            ]
        );
    }

    #[test]
    fn unknown_tool_is_an_error_payload_not_a_panic() {
        let registry = registry();
        let value = invoke(&registry, "launch_missiles", json!({}));
        assert_eq!(value["error"], "Unknown tool: launch_missiles");
    }

    #[test]
    fn missing_required_argument_is_an_error_payload() {
        let registry = registry();
        let value = invoke(&registry, "search_site", json!({}));
        assert_eq!(value["error"], "Missing required argument: query");
    }

    #[test]
    fn get_project_miss_lists_available_slugs() {
        let registry = registry();
        let value = invoke(&registry, "get_project", json!({"slug": "delta"}));
        assert!(value["error"].as_str().unwrap().contains("delta"));
        assert_eq!(value["availableSlugs"], json!(["alpha", "beta", "gamma"]));
    }

    #[test]
    fn get_project_hit_returns_the_record() {
        let registry = registry();
        let value = invoke(&registry, "get_project", json!({"slug": "beta"}));
        assert_eq!(value["slug"], "beta");
        assert_eq!(value["url"], "https://example.com/beta");
    }

    #[test]
    fn impact_sort_puts_featured_first_preserving_order() {
        let registry = registry();
        let value = invoke(&registry, "list_projects", json!({"sort": "impact"}));
        let slugs: Vec<&str> = value["projects"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["slug"].as_str().unwrap())
            .collect();
        assert_eq!(slugs, vec!["beta", "gamma", "alpha"]);
    }

    #[test]
    fn recent_sort_orders_by_year_descending() {
        let registry = registry();
        let value = invoke(&registry, "list_projects", json!({"sort": "recent"}));
        let slugs: Vec<&str> = value["projects"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["slug"].as_str().unwrap())
            .collect();
        assert_eq!(slugs, vec!["alpha", "gamma", "beta"]);
    }

    #[test]
    fn tag_filter_is_case_insensitive() {
        let registry = registry();
        let value = invoke(&registry, "list_projects", json!({"tag": "WEB"}));
        assert_eq!(value["count"], 2);
    }

    #[test]
    fn unknown_sort_value_is_an_error_payload() {
        let registry = registry();
        let value = invoke(&registry, "list_projects", json!({"sort": "alphabetical"}));
        assert_eq!(value["error"], "Invalid argument: Unknown sort: alphabetical");
    }

    #[test]
    fn unknown_resume_section_is_an_error_payload() {
        let registry = registry();
        let value = invoke(&registry, "get_resume_section", json!({"section": "hobbies"}));
        assert_eq!(
            value["error"],
            "Invalid argument: Unknown resume section: hobbies"
        );
    }

    #[test]
    fn resume_section_returns_only_the_requested_slice() {
        let registry = registry();
        let value = invoke(&registry, "get_resume_section", json!({"section": "summary"}));
        assert_eq!(value["summary"], "Summary.");
        assert!(value.get("experience").is_none());
    }

    #[test]
    fn get_skills_returns_map_and_certifications() {
        let registry = registry();
        let value = invoke(&registry, "get_skills", json!({}));
        assert_eq!(value["skills"]["languages"], json!(["Rust"]));
        assert_eq!(value["certifications"], json!(["CKA"]));
    }

    #[test]
    fn get_contact_never_exposes_email() {
        let registry = registry();
        let value = invoke(&registry, "get_contact", json!({}));
        assert_eq!(value["name"], "Ada");
        assert_eq!(value["location"], "Berlin");
        assert_eq!(value["social"]["github"], "https://github.com/ada");
        assert!(value.get("email").is_none());
        assert!(!registry.invoke("get_contact", &json!({})).contains("ada@example.com"));
    }

    #[test]
    fn search_site_reports_count_and_results() {
        let registry = registry();
        let value = invoke(&registry, "search_site", json!({"query": "gamma"}));
        assert_eq!(value["query"], "gamma");
        assert_eq!(value["resultsCount"], 1);
        assert_eq!(value["results"][0]["type"], "project");
    }
}
