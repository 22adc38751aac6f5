//! Skill extraction against a vocabulary of known technology terms.
//!
//! The baseline vocabulary is a data file (`assets/skills.txt`) rather than
//! code, so deployments can swap it via `SKILL_VOCABULARY_PATH`.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};

use crate::matching::text::normalize;

const BASELINE_VOCABULARY: &str = include_str!("../../assets/skills.txt");

/// Ordered list of lower-cased skill terms. Extraction results follow this order.
#[derive(Debug, Clone, PartialEq)]
pub struct SkillVocabulary {
    terms: Vec<String>,
}

impl Default for SkillVocabulary {
    fn default() -> Self {
        Self::parse(BASELINE_VOCABULARY)
    }
}

impl SkillVocabulary {
    /// Parses one term per line. Blank lines and `#` comments are skipped,
    /// duplicates keep their first position.
    pub fn parse(source: &str) -> Self {
        let mut seen = HashSet::new();
        let terms = source
            .lines()
            .map(|line| line.trim().to_lowercase())
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter(|term| seen.insert(term.clone()))
            .collect();
        Self { terms }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read skill vocabulary from {}", path.display()))?;
        let vocabulary = Self::parse(&source);
        anyhow::ensure!(
            !vocabulary.is_empty(),
            "Skill vocabulary at {} contains no terms",
            path.display()
        );
        Ok(vocabulary)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Returns every vocabulary term found in `text`.
    ///
    /// The vocabulary is the candidate's declared skills (trimmed, lower-cased,
    /// in declared order) followed by the baseline terms, deduplicated. Matching
    /// is a substring test against the normalized text, so "react" also hits
    /// "react.js". Results follow vocabulary order, not text order.
    pub fn extract_skills(&self, text: &str, candidate_skills: &[String]) -> Vec<String> {
        let normalized = normalize(text);
        if normalized.is_empty() {
            return Vec::new();
        }

        let mut seen = HashSet::new();
        candidate_skills
            .iter()
            .map(|skill| skill.trim().to_lowercase())
            .filter(|skill| !skill.is_empty())
            .chain(self.terms.iter().cloned())
            .filter(|skill| seen.insert(skill.clone()))
            .filter(|skill| normalized.contains(skill.as_str()))
            .collect()
    }
}
