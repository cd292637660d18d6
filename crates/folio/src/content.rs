//! Read-only structured site content: profile, resume, projects.
//!
//! Records are deserialized once at startup from pre-validated JSON
//! files and never mutated afterwards, so the store is safe to share
//! across request handlers without synchronization.

pub mod search;
pub mod store;
pub mod types;
