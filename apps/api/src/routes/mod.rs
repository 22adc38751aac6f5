pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::errors::AppError;
use crate::matching::handlers;
use crate::state::AppState;

async fn not_found() -> AppError {
    AppError::NotFound("No such route".to_string())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Matching API
        .route("/api/v1/jobs/rank", post(handlers::handle_rank_jobs))
        // Tailoring API
        .route("/api/v1/resumes/tailor", post(handlers::handle_tailor))
        .route("/api/v1/resumes/evidence", post(handlers::handle_evidence))
        .fallback(not_found)
        .with_state(state)
}
