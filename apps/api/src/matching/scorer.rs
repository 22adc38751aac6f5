//! Hybrid scorer — blends lexical and embedding similarity into one score.
//!
//! Lexical similarity is always computed. When the candidate embedding is
//! available and the job embedding can be obtained, the combined score is
//! `0.8 * embedding + 0.2 * lexical`; otherwise it is the lexical score alone.

use serde::Serialize;

use crate::embedding_client::{embed_or_absent, EmbeddingClient};
use crate::matching::vector::{cosine_from_embeddings, cosine_from_text, to_percent};

pub const EMBEDDING_WEIGHT: f64 = 0.8;
pub const LEXICAL_WEIGHT: f64 = 0.2;

/// Similarity signals for one job. All similarities lie in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreResult {
    pub lexical: f64,
    /// Absent when this job was scored without an embedding.
    pub embedding: Option<f64>,
    pub combined: f64,
    /// round(combined * 100), within 0..=100.
    pub percent: u8,
}

impl ScoreResult {
    /// Combines a lexical similarity with an optional raw embedding cosine.
    ///
    /// The blend uses the raw cosine; every reported field is clamped to [0, 1]
    /// afterwards so a negative cosine drags the blend down without ever
    /// surfacing as a negative similarity.
    pub fn combine(lexical: f64, embedding: Option<f64>) -> Self {
        let lexical = clamp_unit(lexical);
        let combined = match embedding {
            Some(raw) => EMBEDDING_WEIGHT * raw + LEXICAL_WEIGHT * lexical,
            None => lexical,
        };
        let combined = clamp_unit(combined);

        Self {
            lexical,
            embedding: embedding.map(clamp_unit),
            combined,
            percent: to_percent(combined),
        }
    }

    pub fn lexical_percent(&self) -> u8 {
        to_percent(self.lexical)
    }

    pub fn embedding_percent(&self) -> Option<u8> {
        self.embedding.map(to_percent)
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Scores one job against the candidate.
///
/// The job embedding is requested only when `candidate_embedding` is present.
/// A failed job embedding degrades this job alone to lexical scoring.
pub async fn score(
    embedder: &dyn EmbeddingClient,
    candidate_text: &str,
    candidate_embedding: Option<&[f32]>,
    job_text: &str,
) -> ScoreResult {
    let lexical = cosine_from_text(candidate_text, job_text);

    let embedding = match candidate_embedding {
        Some(candidate_vector) => embed_or_absent(embedder, job_text)
            .await
            .map(|job_vector| cosine_from_embeddings(candidate_vector, &job_vector)),
        None => None,
    };

    ScoreResult::combine(lexical, embedding)
}
