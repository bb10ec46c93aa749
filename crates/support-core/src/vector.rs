//! Small vector math helpers shared by the stores and the rerank pass.

use std::cmp::Ordering;

use crate::error::{Result, SupportError};

/// Cosine similarity between two vectors of equal length.
pub fn cosine_similarity(query: &[f32], candidate: &[f32]) -> Result<f32> {
    if query.is_empty() || candidate.is_empty() {
        return Err(SupportError::invalid_argument("Vectors must not be empty"));
    }
    if query.len() != candidate.len() {
        return Err(SupportError::invalid_argument(format!(
            "Vector length mismatch: {} != {}",
            query.len(),
            candidate.len()
        )));
    }

    let mut dot = 0.0f32;
    let mut query_norm = 0.0f32;
    let mut candidate_norm = 0.0f32;
    for (a, b) in query.iter().zip(candidate.iter()) {
        dot += a * b;
        query_norm += a * a;
        candidate_norm += b * b;
    }

    let denom = query_norm.sqrt() * candidate_norm.sqrt();
    if denom <= f32::EPSILON {
        return Ok(0.0);
    }

    Ok(dot / denom)
}

/// Score every candidate against the query and return `(index, score)` pairs
/// sorted by descending similarity.
pub fn rank_descending_by_cosine(
    query: &[f32],
    candidates: &[Vec<f32>],
) -> Result<Vec<(usize, f32)>> {
    let mut scores = Vec::with_capacity(candidates.len());
    for (idx, candidate) in candidates.iter().enumerate() {
        let score = cosine_similarity(query, candidate)?;
        scores.push((idx, score));
    }

    scores.sort_by(|left, right| right.1.partial_cmp(&left.1).unwrap_or(Ordering::Equal));
    Ok(scores)
}
