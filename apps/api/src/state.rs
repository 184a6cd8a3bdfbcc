use std::sync::Arc;

use crate::analysis::session::SessionRegistry;
use crate::llm_client::TextGenerator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Analysis backend. `LlmClient` in production, scripted in tests.
    pub generator: Arc<dyn TextGenerator>,
    /// In-memory demo sessions; nothing here outlives the process.
    pub sessions: SessionRegistry,
}
