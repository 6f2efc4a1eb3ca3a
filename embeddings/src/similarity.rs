//! Vector math used to rank chunks against a question.

use std::cmp::Reverse;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::error::{EmbeddingError, Result};

/// Cosine of the angle between `a` and `b`, in `[-1.0, 1.0]`.
///
/// If either side has zero length the score is 0.0. Vectors of different
/// lengths are a [`EmbeddingError::DimensionMismatch`].
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    let dot = dot_product(a, b)?;
    let norms = length(a) * length(b);
    if norms == 0.0 {
        return Ok(0.0);
    }
    Ok(dot / norms)
}

/// Sum of the element-wise products of `a` and `b`.
pub fn dot_product(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(EmbeddingError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }
    Ok(a.iter().zip(b).map(|(x, y)| x * y).sum())
}

/// Scale `vector` in place to unit length. An all-zero vector stays as is.
pub fn normalize(vector: &mut [f32]) {
    let len = length(vector);
    if len > 0.0 {
        vector.iter_mut().for_each(|x| *x /= len);
    }
}

fn length(vector: &[f32]) -> f32 {
    vector.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// One ranked hit from [`find_top_k`] or an index search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarityResult {
    pub id: String,
    pub score: f32,
    /// Metadata stored alongside the entry, if any.
    pub metadata: Option<serde_json::Value>,
}

impl SimilarityResult {
    pub fn new(id: impl Into<String>, score: f32) -> Self {
        Self {
            id: id.into(),
            score,
            metadata: None,
        }
    }
}

/// Rank `candidates` by cosine similarity to `query` and keep the best `k`
/// whose score reaches `min_score`.
///
/// Equal scores keep the order the candidates were yielded in.
pub fn find_top_k<'a, I>(
    query: &[f32],
    candidates: I,
    k: usize,
    min_score: f32,
) -> Result<Vec<SimilarityResult>>
where
    I: IntoIterator<Item = (&'a str, &'a [f32])>,
{
    if k == 0 {
        return Ok(Vec::new());
    }

    let mut ranked = Vec::new();
    for (id, vector) in candidates {
        let score = cosine_similarity(query, vector)?;
        if score >= min_score {
            ranked.push((OrderedFloat(score), id));
        }
    }

    // sort_by_key is stable
    ranked.sort_by_key(|(score, _)| Reverse(*score));
    ranked.truncate(k);

    Ok(ranked
        .into_iter()
        .map(|(score, id)| SimilarityResult::new(id, score.into_inner()))
        .collect())
}
