//! Distance utilities for inter-drone proximity checks.

use ndarray::{Array1, Array2};

use crate::motion::sample::Position;

/// Euclidean distance between two points.
#[inline]
pub fn calc_distance(a: &Position, b: &Position) -> f64 {
    (a - b).norm()
}

/// Distances from `origin` to every point in `others`, in input order.
pub fn distances_to(origin: &Position, others: &[Position]) -> Array1<f64> {
    others.iter().map(|p| calc_distance(origin, p)).collect()
}

/// Symmetric pairwise distance matrix of shape (N, N).
///
/// The diagonal is zero.
pub fn pairwise_distances(points: &[Position]) -> Array2<f64> {
    let n = points.len();
    let mut dists = Array2::zeros((n, n));
    for i in 0..n {
        for j in (i + 1)..n {
            let d = calc_distance(&points[i], &points[j]);
            dists[[i, j]] = d;
            dists[[j, i]] = d;
        }
    }
    dists
}

/// Unordered pairs `(i, j)` with `i < j` closer than `limit`.
pub fn pairs_within(dists: &Array2<f64>, limit: f64) -> Vec<(usize, usize)> {
    let (rows, cols) = dists.dim();
    let mut pairs = Vec::new();
    for i in 0..rows {
        for j in (i + 1)..cols {
            if dists[[i, j]] < limit {
                pairs.push((i, j));
            }
        }
    }
    pairs
}
