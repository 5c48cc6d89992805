//! Cross-modal attention scoring.

use materia_spec::cosine_similarity;

/// Per-vector attention score: mean cosine similarity to every other vector.
///
/// A lone vector scores 0.
pub fn attention_scores(vectors: &[&[f64]]) -> Vec<f64> {
    let n = vectors.len();
    if n < 2 {
        return vec![0.0; n];
    }
    (0..n)
        .map(|i| {
            let total: f64 = (0..n)
                .filter(|&j| j != i)
                .map(|j| cosine_similarity(vectors[i], vectors[j]))
                .sum();
            total / (n - 1) as f64
        })
        .collect()
}

/// Temperature-scaled softmax, `exp((x - max) / T) / Σ`.
pub fn softmax(scores: &[f64], temperature: f64) -> Vec<f64> {
    if scores.is_empty() {
        return Vec::new();
    }
    let t = if temperature > 0.0 { temperature } else { 1.0 };
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|s| ((s - max) / t).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.iter().map(|e| e / total).collect()
}

/// Mean pairwise cosine similarity, 1.0 when fewer than two vectors.
pub fn mean_pairwise_similarity(vectors: &[&[f64]]) -> f64 {
    let n = vectors.len();
    if n < 2 {
        return 1.0;
    }
    let mut total = 0.0;
    let mut pairs = 0usize;
    for i in 0..n {
        for j in i + 1..n {
            total += cosine_similarity(vectors[i], vectors[j]);
            pairs += 1;
        }
    }
    total / pairs as f64
}
