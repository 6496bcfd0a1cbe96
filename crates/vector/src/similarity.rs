//! Dense cosine similarity
//!
//! The whole N×N matrix comes from one GEMM over the row-normalized
//! embedding buffer; zero vectors normalize to zero rows and therefore
//! score 0.0 against everything.

use ndarray::{Array2, ArrayView1, Axis};
use std::cmp::Ordering;

/// Euclidean norm accumulated in f64; any finite f32 vector has a finite result
fn norm_f64<'a>(values: impl IntoIterator<Item = &'a f32>) -> f64 {
    values
        .into_iter()
        .map(|&x| f64::from(x) * f64::from(x))
        .sum::<f64>()
        .sqrt()
}

/// Cosine similarity of two vectors; 0.0 when either norm is zero
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f64 = a
        .iter()
        .zip(b)
        .map(|(&x, &y)| f64::from(x) * f64::from(y))
        .sum();
    let norm_a = norm_f64(a);
    let norm_b = norm_f64(b);

    if norm_a == 0.0 || norm_b == 0.0 || !norm_a.is_finite() || !norm_b.is_finite() {
        return 0.0;
    }
    // Divide one norm at a time so the denominator cannot overflow
    ((dot / norm_a / norm_b) as f32).clamp(-1.0, 1.0)
}

/// Symmetric N×N cosine similarity matrix with a unit diagonal
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    scores: Array2<f32>,
}

impl SimilarityMatrix {
    /// Compute all pairwise similarities of the rows of an N×D buffer
    pub fn build(embeddings: &Array2<f32>) -> Self {
        // Row-normalize; norms in f64 so large elements do not overflow
        let mut normalized = embeddings.to_owned();
        for mut row in normalized.axis_iter_mut(Axis(0)) {
            let norm = norm_f64(row.iter());
            if norm > 0.0 && norm.is_finite() {
                row.mapv_inplace(|x| (f64::from(x) / norm) as f32);
            } else {
                row.fill(0.0);
            }
        }

        let mut scores = normalized.dot(&normalized.t());

        // Mirror the upper triangle so symmetry is exact regardless of
        // GEMM summation order.
        let n = scores.nrows();
        for i in 0..n {
            scores[[i, i]] = 1.0;
            for j in (i + 1)..n {
                let s = scores[[i, j]].clamp(-1.0, 1.0);
                scores[[i, j]] = s;
                scores[[j, i]] = s;
            }
        }

        Self { scores }
    }

    /// Number of items (N)
    pub fn len(&self) -> usize {
        self.scores.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn get(&self, i: usize, j: usize) -> Option<f32> {
        self.scores.get([i, j]).copied()
    }

    pub fn row(&self, i: usize) -> ArrayView1<'_, f32> {
        self.scores.row(i)
    }

    pub fn as_array(&self) -> &Array2<f32> {
        &self.scores
    }

    /// Largest absolute element-wise difference to another matrix
    pub fn max_abs_diff(&self, other: &SimilarityMatrix) -> Option<f32> {
        if self.scores.dim() != other.scores.dim() {
            return None;
        }
        Some(
            self.scores
                .iter()
                .zip(other.scores.iter())
                .map(|(a, b)| (a - b).abs())
                .fold(0.0, f32::max),
        )
    }

    /// The `k` best neighbors of `index`, itself excluded, best first.
    /// Equal scores keep corpus order. Callers check `index < len()`.
    pub fn ranked_neighbors(&self, index: usize, k: usize) -> Vec<(usize, f32)> {
        let mut ranked: Vec<(usize, f32)> = self
            .row(index)
            .iter()
            .copied()
            .enumerate()
            .filter(|&(j, _)| j != index)
            .collect();

        // sort_by is stable
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        ranked.truncate(k);
        ranked
    }
}
