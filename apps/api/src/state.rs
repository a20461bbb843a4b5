use std::sync::Arc;

use crate::config::Config;
use crate::entries::enhancement::TextEnhancer;
use crate::entries::sessions::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Backend for "Improve with AI". Default: LlmTextEnhancer.
    pub enhancer: Arc<dyn TextEnhancer>,
    /// Open entry editors, keyed by session id.
    pub sessions: SessionStore,
}
