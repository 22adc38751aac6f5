use crate::config::Config;
use crate::matching::ranking::JobRanker;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Ranking engine. Holds the embedding client and skill vocabulary.
    pub ranker: JobRanker,
}
