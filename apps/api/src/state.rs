use std::sync::Arc;

use crate::llm_client::GenerationBackend;
use crate::notify::Notifier;
use crate::wizard::store::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// The remote generation seam. Production wires `LlmClient`;
    /// tests swap in scripted backends.
    pub backend: Arc<dyn GenerationBackend>,
    pub sessions: SessionStore,
    pub notifier: Notifier,
}
