//! Ranking orchestrator — scores a batch of jobs for one candidate,
//! explains each score and orders the batch.
//!
//! Flow: profile text → one candidate embedding (decides the batch mode) →
//!       per-job score + fit breakdown, fanned out concurrently →
//!       stable sort by percent score.

use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, info};

use crate::embedding_client::{embed_or_absent, EmbeddingClient};
use crate::matching::fit::{fit_breakdown, FitBreakdown};
use crate::matching::scorer::{score, ScoreResult};
use crate::matching::skills::SkillVocabulary;
use crate::models::candidate::CandidateProfile;
use crate::models::job::JobPosting;

/// How many declared skills go into the profile text.
const PROFILE_SKILL_LIMIT: usize = 20;
/// Work entries and projects rendered into the profile text.
const PROFILE_ENTRY_LIMIT: usize = 4;
/// Skill mentions in the "why matched" lines.
const WHY_OVERLAP_LIMIT: usize = 4;
const WHY_MISSING_LIMIT: usize = 3;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// Scoring basis for a whole batch. Never mixed within one response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScoringMode {
    #[serde(rename = "lexical")]
    LexicalOnly,
    #[serde(rename = "hybrid-embeddings+lexical")]
    Hybrid,
}

/// Per-signal percentages as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MatchSignals {
    pub lexical: u8,
    pub embedding: Option<u8>,
}

/// A job with its score and explanation attached.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedJob {
    #[serde(flatten)]
    pub job: JobPosting,
    pub match_score: u8,
    pub match_signals: MatchSignals,
    pub why_matched: Vec<String>,
    pub fit_breakdown: FitBreakdown,
    #[serde(skip)]
    pub score: ScoreResult,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingResponse {
    pub scoring_mode: ScoringMode,
    pub total_input_jobs: usize,
    pub total_ranked_jobs: usize,
    pub ranked_jobs: Vec<RankedJob>,
}

// ────────────────────────────────────────────────────────────────────────────
// Text builders
// ────────────────────────────────────────────────────────────────────────────

/// Renders the candidate into one text for lexical and embedding comparison.
/// Every field line is emitted even when empty.
pub fn build_candidate_profile_text(candidate: &CandidateProfile) -> String {
    let skills = candidate
        .skills
        .iter()
        .take(PROFILE_SKILL_LIMIT)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    let work = candidate
        .work_history
        .iter()
        .take(PROFILE_ENTRY_LIMIT)
        .map(|item| {
            format!(
                "{} at {}: {}",
                item.role.as_deref().unwrap_or(""),
                item.company.as_deref().unwrap_or(""),
                item.description.as_deref().unwrap_or("")
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let projects = candidate
        .projects
        .iter()
        .take(PROFILE_ENTRY_LIMIT)
        .map(|item| {
            format!(
                "{}: {}",
                item.label().unwrap_or("Project"),
                item.description.as_deref().unwrap_or("")
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let locations = candidate.preferred_locations.join(", ");

    format!(
        "Role: {}\nYears of experience: {}\nSkills: {}\nPreferred locations: {}\nWork highlights:\n{}\nProjects:\n{}",
        candidate.current_title.as_deref().unwrap_or(""),
        candidate.years_of_experience,
        skills,
        locations,
        work,
        projects
    )
    .trim()
    .to_string()
}

/// Renders the scoring-relevant fields of a job into one text.
pub fn build_job_text(job: &JobPosting) -> String {
    format!(
        "Role: {}\nCompany: {}\nLocation: {}\nDescription: {}\nRequirements: {}\nEmployment type: {}",
        job.role.as_deref().unwrap_or(""),
        job.company.as_deref().unwrap_or(""),
        job.location.as_deref().unwrap_or(""),
        job.description.as_deref().unwrap_or(""),
        job.requirements.as_deref().unwrap_or(""),
        job.employment_type.as_deref().unwrap_or("")
    )
    .trim()
    .to_string()
}

/// Three explanation lines in fixed order: overlap, seniority, gaps.
pub fn why_matched(breakdown: &FitBreakdown) -> Vec<String> {
    let overlap = if breakdown.matched_skills.is_empty() {
        "Role and description align with your profile context.".to_string()
    } else {
        format!(
            "Skill overlap: {}",
            breakdown.matched_skills[..breakdown.matched_skills.len().min(WHY_OVERLAP_LIMIT)].join(", ")
        )
    };

    let seniority = match &breakdown.seniority_mismatch {
        Some(mismatch) => format!("Seniority gap detected: {mismatch}."),
        None => "Experience level appears aligned.".to_string(),
    };

    let gaps = if breakdown.missing_skills.is_empty() {
        "No major skill gaps found in extracted requirements.".to_string()
    } else {
        format!(
            "Missing skills to address: {}",
            breakdown.missing_skills[..breakdown.missing_skills.len().min(WHY_MISSING_LIMIT)].join(", ")
        )
    };

    vec![overlap, seniority, gaps]
}

// ────────────────────────────────────────────────────────────────────────────
// Orchestrator
// ────────────────────────────────────────────────────────────────────────────

/// Ranks job batches for a candidate. Cheap to clone; shared via `AppState`.
#[derive(Clone)]
pub struct JobRanker {
    embedder: Arc<dyn EmbeddingClient>,
    vocabulary: Arc<SkillVocabulary>,
}

impl JobRanker {
    pub fn new(embedder: Arc<dyn EmbeddingClient>, vocabulary: Arc<SkillVocabulary>) -> Self {
        Self {
            embedder,
            vocabulary,
        }
    }

    pub fn vocabulary(&self) -> &SkillVocabulary {
        &self.vocabulary
    }

    /// Scores, explains and sorts `jobs` for `candidate`.
    ///
    /// The candidate embedding is requested once; its absence puts the whole
    /// batch in lexical mode. Per-job embedding calls run concurrently and
    /// results are joined back in input order before the stable sort, so
    /// completion order never affects the output. Never fails.
    pub async fn rank(&self, candidate: &CandidateProfile, jobs: Vec<JobPosting>) -> RankingResponse {
        let total_input_jobs = jobs.len();
        if jobs.is_empty() {
            return RankingResponse {
                scoring_mode: ScoringMode::LexicalOnly,
                total_input_jobs,
                total_ranked_jobs: 0,
                ranked_jobs: Vec::new(),
            };
        }

        let candidate_text = build_candidate_profile_text(candidate);
        let candidate_embedding = embed_or_absent(self.embedder.as_ref(), &candidate_text).await;
        let scoring_mode = if candidate_embedding.is_some() {
            ScoringMode::Hybrid
        } else {
            ScoringMode::LexicalOnly
        };

        info!(
            "Ranking {} jobs in {:?} mode",
            total_input_jobs, scoring_mode
        );

        let candidate_embedding = candidate_embedding.as_deref();
        let mut ranked_jobs = join_all(
            jobs.into_iter()
                .map(|job| self.rank_one(candidate, &candidate_text, candidate_embedding, job)),
        )
        .await;

        // Stable: equal scores keep input order.
        ranked_jobs.sort_by(|a, b| b.match_score.cmp(&a.match_score));

        if let Some(top) = ranked_jobs.first() {
            debug!(
                lexical = top.score.lexical,
                embedding = ?top.score.embedding,
                combined = top.score.combined,
                "Top-ranked job similarity"
            );
        }

        RankingResponse {
            scoring_mode,
            total_input_jobs,
            total_ranked_jobs: ranked_jobs.len(),
            ranked_jobs,
        }
    }

    async fn rank_one(
        &self,
        candidate: &CandidateProfile,
        candidate_text: &str,
        candidate_embedding: Option<&[f32]>,
        job: JobPosting,
    ) -> RankedJob {
        let job_text = build_job_text(&job);
        let score = score(
            self.embedder.as_ref(),
            candidate_text,
            candidate_embedding,
            &job_text,
        )
        .await;
        let fit_breakdown = fit_breakdown(candidate, &job_text, &self.vocabulary);

        RankedJob {
            job,
            match_score: score.percent,
            match_signals: MatchSignals {
                lexical: score.lexical_percent(),
                embedding: score.embedding_percent(),
            },
            why_matched: why_matched(&fit_breakdown),
            fit_breakdown,
            score,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding_client::{DisabledEmbeddingClient, EmbeddingError};
    use crate::models::candidate::{ProjectEntry, WorkEntry};
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::time::Duration;

    /// Looks up canned vectors by exact text; unknown texts fail.
    struct LookupEmbedder {
        vectors: HashMap<String, Vec<f32>>,
        default: Option<Vec<f32>>,
    }

    #[async_trait]
    impl EmbeddingClient for LookupEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
            self.vectors
                .get(text)
                .cloned()
                .or_else(|| self.default.clone())
                .ok_or_else(|| EmbeddingError::Malformed("unknown text".into()))
        }
    }

    /// Answers after a delay that shrinks with input position, so later jobs
    /// complete first.
    struct ReverseLatencyEmbedder;

    #[async_trait]
    impl EmbeddingClient for ReverseLatencyEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
            let delay = if text.contains("first") { 30 } else if text.contains("second") { 20 } else { 10 };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok(vec![1.0, 0.0])
        }
    }

    /// Every call takes the same fixed delay.
    struct SlowEmbedder;

    #[async_trait]
    impl EmbeddingClient for SlowEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
            tokio::time::sleep(Duration::from_millis(100)).await;
            Ok(vec![1.0, 0.0])
        }
    }

    fn ranker(embedder: impl EmbeddingClient + 'static) -> JobRanker {
        JobRanker::new(Arc::new(embedder), Arc::new(SkillVocabulary::default()))
    }

    fn make_candidate() -> CandidateProfile {
        CandidateProfile {
            current_title: Some("Backend Engineer".into()),
            years_of_experience: 3,
            skills: vec!["Python".into(), "Docker".into()],
            preferred_locations: vec!["Remote".into()],
            work_history: vec![WorkEntry {
                company: Some("Acme".into()),
                role: Some("Engineer".into()),
                description: Some("Built python services on docker".into()),
                duration: Some("3y".into()),
            }],
            projects: vec![ProjectEntry {
                name: None,
                title: Some("etl-kit".into()),
                description: Some("Python ETL toolkit".into()),
            }],
            ..Default::default()
        }
    }

    fn make_job(role: &str, description: &str) -> JobPosting {
        JobPosting {
            role: Some(role.into()),
            description: Some(description.into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_profile_text_renders_every_line() {
        let text = build_candidate_profile_text(&CandidateProfile::default());
        assert_eq!(
            text,
            "Role: \nYears of experience: 0\nSkills: \nPreferred locations: \nWork highlights:\n\nProjects:"
        );
    }

    #[test]
    fn test_profile_text_limits_entries() {
        let mut candidate = make_candidate();
        candidate.skills = (0..30).map(|i| format!("skill{i}")).collect();
        candidate.work_history = (0..6)
            .map(|i| WorkEntry {
                role: Some(format!("role{i}")),
                ..Default::default()
            })
            .collect();
        let text = build_candidate_profile_text(&candidate);
        assert!(text.contains("skill19"));
        assert!(!text.contains("skill20"));
        assert!(text.contains("role3 at : "));
        assert!(!text.contains("role4"));
        assert!(text.contains("etl-kit: Python ETL toolkit"));
    }

    #[test]
    fn test_job_text_layout() {
        let job = JobPosting {
            role: Some("SRE".into()),
            company: Some("Initech".into()),
            employment_type: Some("FULLTIME".into()),
            ..Default::default()
        };
        assert_eq!(
            build_job_text(&job),
            "Role: SRE\nCompany: Initech\nLocation: \nDescription: \nRequirements: \nEmployment type: FULLTIME"
        );
    }

    #[test]
    fn test_why_matched_generic_lines() {
        let lines = why_matched(&FitBreakdown::default());
        assert_eq!(
            lines,
            vec![
                "Role and description align with your profile context.",
                "Experience level appears aligned.",
                "No major skill gaps found in extracted requirements.",
            ]
        );
    }

    #[test]
    fn test_why_matched_truncates_skill_mentions() {
        let breakdown = FitBreakdown {
            matched_skills: ["a1", "a2", "a3", "a4", "a5"].map(String::from).to_vec(),
            missing_skills: ["m1", "m2", "m3", "m4"].map(String::from).to_vec(),
            seniority_mismatch: Some("5+ years requested, profile has 2".into()),
        };
        let lines = why_matched(&breakdown);
        assert_eq!(lines[0], "Skill overlap: a1, a2, a3, a4");
        assert_eq!(lines[1], "Seniority gap detected: 5+ years requested, profile has 2.");
        assert_eq!(lines[2], "Missing skills to address: m1, m2, m3");
    }

    #[tokio::test]
    async fn test_provider_down_means_lexical_batch() {
        let jobs = vec![
            make_job("Python Engineer", "python docker"),
            make_job("Chef", "cooking"),
        ];
        let response = ranker(DisabledEmbeddingClient).rank(&make_candidate(), jobs).await;

        assert_eq!(response.scoring_mode, ScoringMode::LexicalOnly);
        assert_eq!(response.total_input_jobs, 2);
        assert_eq!(response.total_ranked_jobs, 2);
        assert!(response
            .ranked_jobs
            .iter()
            .all(|job| job.match_signals.embedding.is_none()));
    }

    #[tokio::test]
    async fn test_sorted_descending_by_lexical_similarity() {
        let candidate = CandidateProfile {
            current_title: Some("rust".into()),
            ..Default::default()
        };
        let jobs = vec![
            make_job("rust", "rust rust rust"),
            make_job("cobol", "mainframe"),
            make_job("rust", "mainframe"),
        ];
        let response = ranker(DisabledEmbeddingClient).rank(&candidate, jobs).await;
        let order: Vec<_> = response
            .ranked_jobs
            .iter()
            .map(|j| j.job.description.clone().unwrap_or_default())
            .collect();
        assert_eq!(order, vec!["rust rust rust", "mainframe", "mainframe"]);
        assert_eq!(response.ranked_jobs[1].job.role.as_deref(), Some("rust"));
        assert!(response
            .ranked_jobs
            .windows(2)
            .all(|w| w[0].match_score >= w[1].match_score));
    }

    #[tokio::test]
    async fn test_equal_scores_keep_input_order() {
        let candidate = CandidateProfile::default();
        // Only the id differs, so every job text and score is identical.
        let jobs: Vec<_> = ["one", "two", "three"]
            .iter()
            .map(|id| JobPosting {
                id: Some(json!(id)),
                ..Default::default()
            })
            .collect();
        let response = ranker(DisabledEmbeddingClient).rank(&candidate, jobs).await;
        let ids: Vec<_> = response
            .ranked_jobs
            .iter()
            .map(|j| j.job.id.clone())
            .collect();
        assert_eq!(ids, vec![Some(json!("one")), Some(json!("two")), Some(json!("three"))]);
        assert!(response
            .ranked_jobs
            .windows(2)
            .all(|w| w[0].match_score == w[1].match_score));
    }

    #[tokio::test]
    async fn test_hybrid_mode_uses_embeddings() {
        let candidate = make_candidate();
        let candidate_text = build_candidate_profile_text(&candidate);
        let close = make_job("Close", "unrelated words");
        let far = make_job("Far", "unrelated words");
        let embedder = LookupEmbedder {
            vectors: HashMap::from([
                (candidate_text, vec![1.0, 0.0]),
                (build_job_text(&close), vec![1.0, 0.0]),
                (build_job_text(&far), vec![0.0, 1.0]),
            ]),
            default: None,
        };

        let response = ranker(embedder).rank(&candidate, vec![far, close]).await;

        assert_eq!(response.scoring_mode, ScoringMode::Hybrid);
        assert_eq!(response.ranked_jobs[0].job.role.as_deref(), Some("Close"));
        assert_eq!(response.ranked_jobs[0].match_signals.embedding, Some(100));
        assert_eq!(response.ranked_jobs[1].match_signals.embedding, Some(0));
    }

    #[tokio::test]
    async fn test_single_job_embedding_failure_degrades_only_that_job() {
        let candidate = make_candidate();
        let good = make_job("Good", "python");
        let embedder = LookupEmbedder {
            vectors: HashMap::from([
                (build_candidate_profile_text(&candidate), vec![1.0, 0.0]),
                (build_job_text(&good), vec![1.0, 0.0]),
            ]),
            default: None,
        };

        let response = ranker(embedder)
            .rank(&candidate, vec![make_job("Bad", "python"), good])
            .await;

        assert_eq!(response.scoring_mode, ScoringMode::Hybrid);
        assert_eq!(response.total_ranked_jobs, 2);
        let bad = response
            .ranked_jobs
            .iter()
            .find(|j| j.job.role.as_deref() == Some("Bad"))
            .unwrap();
        assert!(bad.match_signals.embedding.is_none());
        assert_eq!(bad.match_score, bad.match_signals.lexical);
    }

    #[tokio::test]
    async fn test_completion_order_does_not_change_result() {
        let jobs = vec![
            make_job("first", "python"),
            make_job("second", "python"),
            make_job("third", "python"),
        ];
        let response = ranker(ReverseLatencyEmbedder).rank(&make_candidate(), jobs).await;
        let roles: Vec<_> = response
            .ranked_jobs
            .iter()
            .map(|j| j.job.role.clone().unwrap_or_default())
            .collect();
        assert_eq!(roles, vec!["first", "second", "third"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_per_job_embedding_calls_overlap() {
        let jobs: Vec<_> = (0..5).map(|i| make_job(&format!("job{i}"), "python")).collect();
        let started = tokio::time::Instant::now();
        let response = ranker(SlowEmbedder).rank(&make_candidate(), jobs).await;
        let elapsed = started.elapsed();

        assert_eq!(response.scoring_mode, ScoringMode::Hybrid);
        assert_eq!(response.total_ranked_jobs, 5);
        // One candidate call, then all job calls in parallel: two delays, not six.
        assert!(elapsed >= Duration::from_millis(200), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(300), "{elapsed:?}");
    }

    #[tokio::test]
    async fn test_empty_batch_returns_empty_list() {
        let response = ranker(DisabledEmbeddingClient)
            .rank(&make_candidate(), Vec::new())
            .await;
        assert_eq!(response.total_ranked_jobs, 0);
        assert!(response.ranked_jobs.is_empty());
    }

    #[tokio::test]
    async fn test_breakdown_attached_to_each_job() {
        let jobs = vec![make_job("Python Engineer", "Python, Docker and AWS. 5+ years")];
        let response = ranker(DisabledEmbeddingClient).rank(&make_candidate(), jobs).await;
        let job = &response.ranked_jobs[0];
        assert_eq!(job.fit_breakdown.matched_skills, vec!["python", "docker"]);
        assert_eq!(job.fit_breakdown.missing_skills, vec!["aws"]);
        assert_eq!(
            job.fit_breakdown.seniority_mismatch.as_deref(),
            Some("5+ years requested, profile has 3")
        );
        assert_eq!(job.why_matched.len(), 3);
    }

    #[test]
    fn test_response_serializes_contract_fields() {
        let response = RankingResponse {
            scoring_mode: ScoringMode::Hybrid,
            total_input_jobs: 1,
            total_ranked_jobs: 1,
            ranked_jobs: vec![RankedJob {
                job: JobPosting {
                    id: Some("j1".into()),
                    ..Default::default()
                },
                match_score: 42,
                match_signals: MatchSignals {
                    lexical: 10,
                    embedding: None,
                },
                why_matched: vec![],
                fit_breakdown: FitBreakdown::default(),
                score: ScoreResult::combine(0.1, None),
            }],
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["scoringMode"], "hybrid-embeddings+lexical");
        assert_eq!(value["totalRankedJobs"], 1);
        let job = &value["rankedJobs"][0];
        assert_eq!(job["id"], "j1");
        assert_eq!(job["matchScore"], 42);
        assert_eq!(job["matchSignals"]["embedding"], serde_json::Value::Null);
        assert_eq!(job["fitBreakdown"]["seniorityMismatch"], serde_json::Value::Null);
        assert!(job.get("score").is_none());
    }
}
