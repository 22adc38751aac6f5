//! Axum route handlers for the Matching API.
//!
//! Input validation happens here; the engine below never sees a missing
//! candidate or an empty batch.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::matching::evidence::{build_evidence_pack, fallback_draft, EvidencePack, TailoredDraft};
use crate::matching::ranking::RankingResponse;
use crate::models::candidate::CandidateProfile;
use crate::models::job::{JobPosting, TailorJob};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RankJobsRequest {
    pub candidate: Option<CandidateProfile>,
    pub jobs: Option<Vec<JobPosting>>,
}

#[derive(Debug, Deserialize)]
pub struct TailorRequest {
    pub candidate: Option<CandidateProfile>,
    pub job: Option<TailorJob>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TailorResponse {
    /// Always "fallback": drafts are assembled from evidence, not generated.
    pub mode: &'static str,
    pub tailored_draft: TailoredDraft,
}

#[derive(Debug, Deserialize)]
pub struct EvidenceRequest {
    pub candidate: Option<CandidateProfile>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceResponse {
    pub evidence: EvidencePack,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/jobs/rank
///
/// Scores and orders a batch of jobs for one candidate. Embedding provider
/// failures degrade the scoring mode; they never fail the request.
pub async fn handle_rank_jobs(
    State(state): State<AppState>,
    payload: Result<Json<RankJobsRequest>, JsonRejection>,
) -> Result<Json<RankingResponse>, AppError> {
    let Json(request) = payload?;
    let candidate = request
        .candidate
        .ok_or_else(|| AppError::Validation("candidate is required".to_string()))?;

    let jobs = request.jobs.unwrap_or_default();
    if jobs.is_empty() {
        return Err(AppError::Validation(
            "jobs must contain at least one item".to_string(),
        ));
    }

    let response = state.ranker.rank(&candidate, jobs).await;
    info!(
        "Ranked {} of {} jobs (mode: {:?})",
        response.total_ranked_jobs, response.total_input_jobs, response.scoring_mode
    );

    Ok(Json(response))
}

/// POST /api/v1/resumes/tailor
///
/// Returns a draft built only from the candidate's own evidence, with unmet
/// requirements listed separately.
pub async fn handle_tailor(
    State(state): State<AppState>,
    payload: Result<Json<TailorRequest>, JsonRejection>,
) -> Result<Json<TailorResponse>, AppError> {
    let Json(request) = payload?;
    let (Some(candidate), Some(job)) = (request.candidate, request.job) else {
        return Err(AppError::Validation(
            "candidate and job are required".to_string(),
        ));
    };

    let tailored_draft = fallback_draft(&candidate, &job, state.ranker.vocabulary());

    Ok(Json(TailorResponse {
        mode: "fallback",
        tailored_draft,
    }))
}

/// POST /api/v1/resumes/evidence
pub async fn handle_evidence(
    payload: Result<Json<EvidenceRequest>, JsonRejection>,
) -> Result<Json<EvidenceResponse>, AppError> {
    let Json(request) = payload?;
    let candidate = request
        .candidate
        .ok_or_else(|| AppError::Validation("candidate is required".to_string()))?;

    Ok(Json(EvidenceResponse {
        evidence: build_evidence_pack(&candidate),
    }))
}
