//! Vector-space similarity: sparse term-frequency cosine for text, dense
//! cosine for provider embeddings.

use std::collections::HashMap;

use crate::matching::text::tokenize;

/// Bag-of-words term frequencies for one text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermVector {
    counts: HashMap<String, u32>,
}

impl TermVector {
    pub fn from_text(text: &str) -> Self {
        let mut counts = HashMap::new();
        for token in tokenize(text) {
            *counts.entry(token).or_insert(0) += 1;
        }
        Self { counts }
    }

    pub fn norm(&self) -> f64 {
        self.counts
            .values()
            .map(|&c| (c as f64) * (c as f64))
            .sum::<f64>()
            .sqrt()
    }

    pub fn dot(&self, other: &TermVector) -> f64 {
        // Iterate the smaller map; only shared keys contribute.
        let (small, large) = if self.counts.len() <= other.counts.len() {
            (&self.counts, &other.counts)
        } else {
            (&other.counts, &self.counts)
        };
        small
            .iter()
            .filter_map(|(token, &a)| large.get(token).map(|&b| a as f64 * b as f64))
            .sum()
    }
}

/// Cosine similarity between the term-frequency vectors of two texts.
/// Returns 0.0 when either side has no tokens.
pub fn cosine_from_text(left: &str, right: &str) -> f64 {
    let left = TermVector::from_text(left);
    let right = TermVector::from_text(right);

    let left_norm = left.norm();
    let right_norm = right.norm();
    if left_norm == 0.0 || right_norm == 0.0 {
        return 0.0;
    }

    (left.dot(&right) / (left_norm * right_norm)).clamp(0.0, 1.0)
}

/// Cosine similarity between two dense embeddings.
///
/// Returns 0.0 for empty input, mismatched lengths, zero vectors or any
/// non-finite result. The value is the raw cosine and may be negative.
pub fn cosine_from_embeddings(left: &[f32], right: &[f32]) -> f64 {
    if left.is_empty() || right.is_empty() || left.len() != right.len() {
        if left.len() != right.len() {
            tracing::debug!(
                left_len = left.len(),
                right_len = right.len(),
                "embedding dimension mismatch; returning zero similarity"
            );
        }
        return 0.0;
    }

    let mut dot = 0.0_f64;
    let mut left_norm = 0.0_f64;
    let mut right_norm = 0.0_f64;
    for (&a, &b) in left.iter().zip(right) {
        let (a, b) = (a as f64, b as f64);
        dot += a * b;
        left_norm += a * a;
        right_norm += b * b;
    }

    if left_norm == 0.0 || right_norm == 0.0 {
        return 0.0;
    }

    let similarity = dot / (left_norm.sqrt() * right_norm.sqrt());
    if similarity.is_finite() {
        similarity
    } else {
        0.0
    }
}

/// Scales a similarity to an integer percentage: round(clamp(v, 0, 1) * 100).
pub fn to_percent(value: f64) -> u8 {
    if !value.is_finite() {
        return 0;
    }
    (value.clamp(0.0, 1.0) * 100.0).round() as u8
}
