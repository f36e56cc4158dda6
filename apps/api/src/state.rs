use std::sync::Arc;

use crate::config::Config;
use crate::parser::ResumeParser;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Stateless between documents; shared by every request.
    pub parser: Arc<ResumeParser>,
}
