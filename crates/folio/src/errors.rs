use thiserror::Error;

use crate::content::store::ContentKind;

/// Failures loading the read-only content records at startup.
#[derive(Error, Debug)]
pub enum ContentError {
    #[error("content record not found: {0}")]
    NotFound(ContentKind),

    #[error("malformed content record {kind}: {source}")]
    Malformed {
        kind: ContentKind,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read content record {kind}: {source}")]
    Io {
        kind: ContentKind,
        #[source]
        source: std::io::Error,
    },
}

/// Failures inside a tool handler. These never escape the registry:
/// `ToolRegistry::invoke` folds them into an `{"error": ...}` payload
/// so the model can react to them.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Missing required argument: {0}")]
    MissingArgument(&'static str),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Failures from the model gateway. These propagate: the loop does not
/// catch or retry them.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("provider configuration error: {0}")]
    Configuration(String),

    #[error("backend request failed with status {status}: {body}")]
    Backend { status: u16, body: String },

    #[error("unexpected backend response: {0}")]
    Protocol(String),

    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

#[derive(Error, Debug)]
pub enum AgentError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("internal error: {0}")]
    Internal(String),
}
