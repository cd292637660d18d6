use std::fmt;
use std::path::Path;

use serde::de::DeserializeOwned;

use super::types::{Project, Resume, SiteProfile};
use crate::errors::ContentError;

/// Which of the three content records a load or parse failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Profile,
    Resume,
    Projects,
}

impl ContentKind {
    fn file_name(&self) -> &'static str {
        match self {
            ContentKind::Profile => "profile.json",
            ContentKind::Resume => "resume.json",
            ContentKind::Projects => "projects.json",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// All site content, loaded once and immutable afterwards.
#[derive(Debug, Clone)]
pub struct ContentStore {
    profile: SiteProfile,
    resume: Resume,
    projects: Vec<Project>,
}

fn load_record<T: DeserializeOwned>(dir: &Path, kind: ContentKind) -> Result<T, ContentError> {
    let path = dir.join(kind.file_name());
    let raw = std::fs::read_to_string(&path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ContentError::NotFound(kind)
        } else {
            ContentError::Io { kind, source }
        }
    })?;
    serde_json::from_str(&raw).map_err(|source| ContentError::Malformed { kind, source })
}

impl ContentStore {
    /// Read all three records from `dir`. Called once at startup; the
    /// returned store is the process-wide cache.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, ContentError> {
        let dir = dir.as_ref();
        Ok(Self {
            profile: load_record(dir, ContentKind::Profile)?,
            resume: load_record(dir, ContentKind::Resume)?,
            projects: load_record(dir, ContentKind::Projects)?,
        })
    }

    /// Assemble a store from already-built records. Used by tests and
    /// by embedders that keep content somewhere other than disk.
    pub fn from_parts(profile: SiteProfile, resume: Resume, projects: Vec<Project>) -> Self {
        Self {
            profile,
            resume,
            projects,
        }
    }

    pub fn profile(&self) -> &SiteProfile {
        &self.profile
    }

    pub fn resume(&self) -> &Resume {
        &self.resume
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn project_by_slug(&self, slug: &str) -> Option<&Project> {
        self.projects.iter().find(|project| project.slug == slug)
    }

    pub fn featured_projects(&self) -> Vec<&Project> {
        self.projects.iter().filter(|project| project.featured).collect()
    }

    pub fn slugs(&self) -> Vec<&str> {
        self.projects.iter().map(|project| project.slug.as_str()).collect()
    }
}
