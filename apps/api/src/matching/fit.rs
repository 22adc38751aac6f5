//! Fit breakdown: skill overlap, skill gaps and seniority gap between a
//! candidate and one job's text.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::matching::skills::SkillVocabulary;
use crate::matching::text::normalize;
use crate::models::candidate::CandidateProfile;

/// Cap on each skill list in a breakdown.
pub const BREAKDOWN_SKILL_CAP: usize = 8;

/// "3-5 years", "2 - 4 yrs". Only the lower bound is used.
static YEARS_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]+)\s*-\s*([0-9]+)\s*(?:\+?\s*)?(?:years?|yrs?)").expect("Invalid regex")
});

/// "5+ years", "5 plus yrs", "5 years".
static YEARS_SINGLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]+)\s*(?:\+|plus)?\s*(?:years?|yrs?)").expect("Invalid regex")
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FitBreakdown {
    /// Extracted job skills the candidate declared (max 8, extraction order).
    pub matched_skills: Vec<String>,
    /// Extracted job skills the candidate did not declare (max 8).
    pub missing_skills: Vec<String>,
    /// Present only when the job states a minimum the candidate falls short of.
    pub seniority_mismatch: Option<String>,
}

/// Finds the minimum years of experience stated in `text`, if any.
///
/// The range pattern is tried before the single-bound pattern; the first
/// pattern that matches anywhere in the text wins.
pub fn extract_years_requirement(text: &str) -> Option<u32> {
    let normalized = normalize(text);
    [&*YEARS_RANGE, &*YEARS_SINGLE]
        .into_iter()
        .find_map(|pattern| pattern.captures(&normalized))
        .and_then(|caps| caps.get(1))
        // An absurdly long digit run still states a requirement; saturate it.
        .map(|lower| lower.as_str().parse::<u32>().unwrap_or(u32::MAX))
}

/// Splits the skills extracted from `job_text` into those the candidate
/// declared and those they did not, both in extraction order and uncapped.
pub fn partition_skills(
    candidate: &CandidateProfile,
    job_text: &str,
    vocabulary: &SkillVocabulary,
) -> (Vec<String>, Vec<String>) {
    let declared: Vec<String> = candidate
        .skills
        .iter()
        .map(|skill| skill.trim().to_lowercase())
        .collect();

    vocabulary
        .extract_skills(job_text, &candidate.skills)
        .into_iter()
        .partition(|skill| declared.contains(skill))
}

/// Builds the matched/missing/seniority breakdown for one job.
///
/// Pure: identical inputs always produce identical output.
pub fn fit_breakdown(
    candidate: &CandidateProfile,
    job_text: &str,
    vocabulary: &SkillVocabulary,
) -> FitBreakdown {
    let (matched, missing) = partition_skills(candidate, job_text, vocabulary);

    let seniority_mismatch = extract_years_requirement(job_text)
        .filter(|&needed| candidate.years_of_experience < needed)
        .map(|needed| {
            format!(
                "{needed}+ years requested, profile has {}",
                candidate.years_of_experience
            )
        });

    FitBreakdown {
        matched_skills: matched.into_iter().take(BREAKDOWN_SKILL_CAP).collect(),
        missing_skills: missing.into_iter().take(BREAKDOWN_SKILL_CAP).collect(),
        seniority_mismatch,
    }
}
