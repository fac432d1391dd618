use std::sync::Arc;

use crate::quiz::service::QuizService;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Live interview sessions plus their collaborators (generator, explainer, result store).
    pub quiz: Arc<QuizService>,
}
