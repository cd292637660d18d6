use std::sync::Arc;

use folio::content::store::ContentStore;
use folio::providers::configs::ProviderConfig;

use crate::rate_limit::RateLimiter;

/// Shared application state. The content store is read-only after
/// startup; the rate limiter is the only cross-request mutable piece.
#[derive(Clone)]
pub struct AppState {
    pub provider_config: ProviderConfig,
    pub store: Arc<ContentStore>,
    pub limiter: Arc<RateLimiter>,
}
