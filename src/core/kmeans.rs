//! Seeded k-means (k-means++ initialisation, Lloyd iterations)
//!
//! Deterministic for a given seed: the same points always produce the
//! same partition. Labels are renumbered by first appearance so label 0
//! is the cluster of the first point.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{KMEANS_MAX_ITERATIONS, KMEANS_RESTARTS, KMEANS_SEED, KMEANS_TOLERANCE};

/// k-means configuration
#[derive(Debug, Clone, Copy)]
pub struct KMeans {
    pub k: usize,
    pub seed: u64,
    pub restarts: usize,
    pub max_iterations: usize,
    pub tolerance: f64,
}

/// A fitted partition
#[derive(Debug, Clone, PartialEq)]
pub struct KMeansFit {
    /// Cluster per point, 0..centroids.len()
    pub labels: Vec<usize>,
    /// Mean of each non-empty cluster
    pub centroids: Vec<Vec<f64>>,
    /// Sum of squared distances to assigned centroids
    pub inertia: f64,
}

impl KMeans {
    /// Default restarts, iterations and seed
    pub fn new(k: usize) -> Self {
        Self {
            k,
            seed: KMEANS_SEED,
            restarts: KMEANS_RESTARTS,
            max_iterations: KMEANS_MAX_ITERATIONS,
            tolerance: KMEANS_TOLERANCE,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_restarts(mut self, restarts: usize) -> Self {
        self.restarts = restarts.max(1);
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    /// Fit `points`; the best of all restarts by inertia wins
    pub fn fit(&self, points: &[Vec<f64>]) -> KMeansFit {
        if points.is_empty() || self.k == 0 {
            return KMeansFit {
                labels: vec![0; points.len()],
                centroids: Vec::new(),
                inertia: 0.0,
            };
        }

        let k = self.k.min(points.len());
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut best: Option<(Vec<usize>, Vec<Vec<f64>>, f64)> = None;

        for _ in 0..self.restarts.max(1) {
            let initial = plus_plus_init(points, k, &mut rng);
            let (labels, centroids, inertia) = self.lloyd(points, initial);
            if best.as_ref().map_or(true, |(_, _, b)| inertia < *b) {
                best = Some((labels, centroids, inertia));
            }
        }

        let (labels, centroids, inertia) = best.unwrap_or_default();
        compact(points, labels, centroids, inertia)
    }

    fn lloyd(&self, points: &[Vec<f64>], mut centroids: Vec<Vec<f64>>) -> (Vec<usize>, Vec<Vec<f64>>, f64) {
        let mut labels = assign(points, &centroids);

        for _ in 0..self.max_iterations {
            let updated = update_centroids(points, &labels, &centroids);
            let shift = centroids
                .iter()
                .zip(&updated)
                .map(|(a, b)| squared_distance(a, b))
                .fold(0.0, f64::max);
            centroids = updated;

            let next = assign(points, &centroids);
            let unchanged = next == labels;
            labels = next;
            if unchanged || shift < self.tolerance {
                break;
            }
        }

        let inertia = points
            .iter()
            .zip(&labels)
            .map(|(p, &l)| squared_distance(p, &centroids[l]))
            .sum();
        (labels, centroids, inertia)
    }
}

/// Spread initial centroids with D² weighting
fn plus_plus_init(points: &[Vec<f64>], k: usize, rng: &mut StdRng) -> Vec<Vec<f64>> {
    let mut centroids = Vec::with_capacity(k);
    centroids.push(points[rng.gen_range(0..points.len())].clone());

    while centroids.len() < k {
        let distances: Vec<f64> = points
            .iter()
            .map(|p| {
                centroids
                    .iter()
                    .map(|c| squared_distance(p, c))
                    .fold(f64::INFINITY, f64::min)
            })
            .collect();
        let total: f64 = distances.iter().sum();

        let next = if total > 0.0 {
            let mut threshold = rng.gen::<f64>() * total;
            let mut chosen = argmax(&distances);
            for (i, d) in distances.iter().enumerate() {
                threshold -= d;
                if threshold <= 0.0 && *d > 0.0 {
                    chosen = i;
                    break;
                }
            }
            chosen
        } else {
            // every point coincides with a centroid already
            rng.gen_range(0..points.len())
        };
        centroids.push(points[next].clone());
    }
    centroids
}

/// Index of the largest value, first on ties
fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate() {
        if *v > values[best] {
            best = i;
        }
    }
    best
}

/// Nearest centroid per point, ties to the lowest index
fn assign(points: &[Vec<f64>], centroids: &[Vec<f64>]) -> Vec<usize> {
    points
        .iter()
        .map(|p| {
            let mut best = 0;
            let mut best_distance = f64::INFINITY;
            for (i, c) in centroids.iter().enumerate() {
                let d = squared_distance(p, c);
                if d < best_distance {
                    best = i;
                    best_distance = d;
                }
            }
            best
        })
        .collect()
}

/// Member means; an empty cluster keeps its previous centroid
fn update_centroids(points: &[Vec<f64>], labels: &[usize], previous: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let dim = points[0].len();
    let mut sums = vec![vec![0.0; dim]; previous.len()];
    let mut counts = vec![0usize; previous.len()];

    for (p, &l) in points.iter().zip(labels) {
        counts[l] += 1;
        for (s, x) in sums[l].iter_mut().zip(p) {
            *s += x;
        }
    }

    sums.into_iter()
        .zip(counts)
        .zip(previous)
        .map(|((sum, count), prev)| {
            if count == 0 {
                prev.clone()
            } else {
                sum.into_iter().map(|s| s / count as f64).collect()
            }
        })
        .collect()
}

/// Drop empty clusters and renumber by first appearance
fn compact(points: &[Vec<f64>], labels: Vec<usize>, centroids: Vec<Vec<f64>>, inertia: f64) -> KMeansFit {
    let mut remap = vec![usize::MAX; centroids.len()];
    let mut next = 0;
    let labels: Vec<usize> = labels
        .into_iter()
        .map(|l| {
            if remap[l] == usize::MAX {
                remap[l] = next;
                next += 1;
            }
            remap[l]
        })
        .collect();

    let placeholder = vec![0.0; points.first().map_or(0, Vec::len)];
    let compacted = update_centroids(points, &labels, &vec![placeholder; next]);
    KMeansFit {
        labels,
        centroids: compacted,
        inertia,
    }
}

/// Squared Euclidean distance
pub fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn blobs() -> Vec<Vec<f64>> {
        vec![
            vec![0.0, 0.0],
            vec![10.0, 10.0],
            vec![0.1, 0.0],
            vec![10.1, 10.0],
            vec![0.0, 0.1],
            vec![10.0, 10.1],
        ]
    }

    #[test]
    fn test_two_blobs() {
        let fit = KMeans::new(2).fit(&blobs());
        assert_eq!(fit.labels, vec![0, 1, 0, 1, 0, 1]);
        assert_eq!(fit.centroids.len(), 2);
        assert!((fit.centroids[0][0] - 0.1 / 3.0).abs() < 1e-12);
        assert!(fit.inertia < 0.1);
    }

    #[test]
    fn test_deterministic() {
        let points: Vec<Vec<f64>> = (0..20).map(|i| vec![(i * 7 % 11) as f64, (i * 3 % 5) as f64]).collect();
        let a = KMeans::new(3).fit(&points);
        let b = KMeans::new(3).fit(&points);
        assert_eq!(a, b);
    }

    #[test]
    fn test_k_larger_than_points() {
        let fit = KMeans::new(5).fit(&[vec![1.0], vec![2.0]]);
        assert_eq!(fit.centroids.len(), 2);
        assert_eq!(fit.labels, vec![0, 1]);
    }

    #[test]
    fn test_identical_points_collapse() {
        let points = vec![vec![1.0, 1.0]; 4];
        let fit = KMeans::new(3).fit(&points);
        assert_eq!(fit.labels, vec![0, 0, 0, 0]);
        assert_eq!(fit.centroids, vec![vec![1.0, 1.0]]);
        assert_eq!(fit.inertia, 0.0);
    }
}
