use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::ModelClient;
use crate::media::sampler::FrameSampler;

/// Shared application state injected into all route handlers via Axum extractors.
/// Immutable after startup; analysis results are request-scoped, never stored here.
#[derive(Clone)]
pub struct AppState {
    pub model: Arc<dyn ModelClient>,
    pub sampler: Arc<FrameSampler>,
    pub config: Config,
}
