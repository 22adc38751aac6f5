//! Evidence selection — picks the candidate's most job-relevant lines and
//! assembles a grounded fallback draft from them.
//!
//! Nothing here invents content: every line in a draft is copied from the
//! evidence pack, and unmet requirements are listed rather than papered over.

use std::collections::HashSet;

use serde::Serialize;

use crate::matching::fit::{fit_breakdown, partition_skills};
use crate::matching::skills::SkillVocabulary;
use crate::matching::vector::cosine_from_text;
use crate::models::candidate::CandidateProfile;
use crate::models::job::TailorJob;

const EXPERIENCE_LINES: usize = 4;
const PROJECT_LINES: usize = 2;
const DRAFT_SKILL_LIMIT: usize = 12;
const MISSING_REQUIREMENT_LIMIT: usize = 5;

pub const GROUNDING_NOTE: &str =
    "Generated from resume evidence only. Missing requirements are listed instead of invented.";

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// The only material a tailored draft may draw from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidencePack {
    pub current_title: String,
    pub years_of_experience: u32,
    pub skills: Vec<String>,
    pub work_bullets: Vec<String>,
    pub project_bullets: Vec<String>,
    pub education: Vec<String>,
    pub preferred_locations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TailoredDraft {
    pub summary: String,
    pub skills: Vec<String>,
    pub selected_experience: Vec<String>,
    pub selected_projects: Vec<String>,
    pub missing_requirements: Vec<String>,
    pub grounding_note: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Selection
// ────────────────────────────────────────────────────────────────────────────

/// Returns the `take` lines most similar to `job_text`, best first.
///
/// Ties keep their original order. Fewer than `take` lines → all of them.
pub fn select_relevant<S: AsRef<str>>(job_text: &str, lines: &[S], take: usize) -> Vec<String> {
    let mut scored: Vec<(f64, &str)> = lines
        .iter()
        .map(|line| (cosine_from_text(job_text, line.as_ref()), line.as_ref()))
        .collect();

    scored.sort_by(|a, b| b.0.total_cmp(&a.0));

    scored
        .into_iter()
        .take(take)
        .map(|(_, line)| line.to_string())
        .collect()
}

/// Flattens the candidate profile into display lines, filling placeholders
/// for missing fields.
pub fn build_evidence_pack(candidate: &CandidateProfile) -> EvidencePack {
    let work_bullets = candidate
        .work_history
        .iter()
        .map(|item| {
            format!(
                "{} at {} ({}): {}",
                item.role.as_deref().unwrap_or("Role"),
                item.company.as_deref().unwrap_or("Company"),
                item.duration.as_deref().unwrap_or("Duration"),
                item.description.as_deref().unwrap_or("")
            )
        })
        .collect();

    let project_bullets = candidate
        .projects
        .iter()
        .map(|item| {
            format!(
                "{}: {}",
                item.label().unwrap_or("Project"),
                item.description.as_deref().unwrap_or("")
            )
        })
        .collect();

    let education = candidate
        .education
        .iter()
        .map(|item| {
            format!(
                "{} - {} ({})",
                item.degree.as_deref().unwrap_or("Degree"),
                item.institution.as_deref().unwrap_or("Institution"),
                item.graduation_year
                    .map(|year| year.to_string())
                    .unwrap_or_else(|| "Year".to_string())
            )
        })
        .collect();

    EvidencePack {
        current_title: candidate.current_title.clone().unwrap_or_default(),
        years_of_experience: candidate.years_of_experience,
        skills: candidate.skills.clone(),
        work_bullets,
        project_bullets,
        education,
        preferred_locations: candidate.preferred_locations.clone(),
    }
}

/// Builds a tailored draft for `job` using only the candidate's evidence.
pub fn fallback_draft(
    candidate: &CandidateProfile,
    job: &TailorJob,
    vocabulary: &SkillVocabulary,
) -> TailoredDraft {
    let evidence = build_evidence_pack(candidate);
    let job_text = format!(
        "{} {} {}",
        job.title.as_deref().unwrap_or(""),
        job.description.as_deref().unwrap_or(""),
        job.requirements.as_deref().unwrap_or("")
    );

    let selected_experience = select_relevant(&job_text, &evidence.work_bullets, EXPERIENCE_LINES);
    let selected_projects = select_relevant(&job_text, &evidence.project_bullets, PROJECT_LINES);
    let breakdown = fit_breakdown(candidate, &job_text, vocabulary);
    let (owned_job_skills, _) = partition_skills(candidate, &job_text, vocabulary);

    // Job-relevant owned skills first, then the rest in declared order.
    let mut seen = HashSet::new();
    let skills = owned_job_skills
        .iter()
        .chain(evidence.skills.iter())
        .map(|skill| skill.trim())
        .filter(|skill| !skill.is_empty() && seen.insert(skill.to_lowercase()))
        .take(DRAFT_SKILL_LIMIT)
        .map(str::to_string)
        .collect();

    let missing_requirements = breakdown
        .missing_skills
        .iter()
        .take(MISSING_REQUIREMENT_LIMIT)
        .cloned()
        .chain(breakdown.seniority_mismatch.clone())
        .collect();

    let title = if evidence.current_title.trim().is_empty() {
        "Software professional"
    } else {
        evidence.current_title.as_str()
    };

    TailoredDraft {
        summary: format!(
            "{} with {} years of experience targeting {} at {}.",
            title,
            evidence.years_of_experience,
            job.title.as_deref().unwrap_or("this role"),
            job.company.as_deref().unwrap_or("the company")
        ),
        skills,
        selected_experience,
        selected_projects,
        missing_requirements,
        grounding_note: GROUNDING_NOTE.to_string(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
