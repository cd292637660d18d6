use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required configuration: set {env_var}")]
    MissingEnvVar { env_var: String },

    #[error(transparent)]
    Other(#[from] config::ConfigError),
}

/// Map a config field path like `provider.api_key` (or a bare field
/// name surfaced by serde, which always belongs to the provider table)
/// to the environment variable that sets it.
pub fn to_env_var(field: &str) -> String {
    let path = if field == "provider" {
        // The whole provider table is missing; the tag selects it.
        "provider__type".to_string()
    } else if field.contains('.') {
        field.replace('.', "__")
    } else {
        format!("provider__{field}")
    };
    format!("FOLIO_{}", path.to_uppercase())
}
