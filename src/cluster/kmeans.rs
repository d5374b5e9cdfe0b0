//! K-means clustering.
//!
//! Partitions data into k clusters by minimizing **within-cluster sum of squares**
//! (WCSS):
//!
//! ```text
//! WCSS = Σₖ Σᵢ∈Cₖ ||xᵢ - μₖ||²
//! ```
//!
//! # Lloyd's Algorithm
//!
//! 1. Initialize k centroids via k-means++
//! 2. **Assign**: each point → nearest centroid
//! 3. **Update**: each centroid → mean of assigned points
//! 4. Repeat until the total centroid shift drops below `tol`
//!
//! A cluster left empty by an update is reseeded from the point farthest from
//! its own centroid. A final assignment pass runs after the loop, so the
//! returned labels always agree with the returned centroids.
//!
//! ## Determinism
//!
//! With a seed set, the same input produces the same centroids and labels.
//! Nearest-centroid ties go to the lowest cluster id.

use super::traits::Clustering;
use super::util::squared_euclidean;
use crate::error::{Error, Result};
use rand::prelude::*;

/// K-means clustering algorithm.
#[derive(Debug, Clone)]
pub struct Kmeans {
    k: usize,
    max_iter: usize,
    tol: f64,
    seed: Option<u64>,
}

/// A fitted k-means model: centroids plus the labels of the training points.
#[derive(Debug, Clone, PartialEq)]
pub struct KmeansFit {
    /// One centroid per cluster, indexed by cluster id.
    pub centroids: Vec<Vec<f32>>,
    /// Cluster id of every training point, in input order.
    pub labels: Vec<usize>,
    /// Within-cluster sum of squares at the final assignment.
    pub inertia: f32,
    /// Lloyd iterations run.
    pub n_iter: usize,
}

impl Kmeans {
    /// Create a new K-means clusterer.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            max_iter: 300,
            tol: 1e-4,
            seed: None,
        }
    }

    /// Set maximum iterations.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set convergence tolerance.
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Set random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Fit the model and keep the centroids for later assignment.
    pub fn fit(&self, data: &[Vec<f32>]) -> Result<KmeansFit> {
        if self.k == 0 {
            return Err(Error::InvalidParameter {
                name: "k",
                message: "must be at least 1",
            });
        }
        if data.is_empty() {
            return Err(Error::EmptyInput);
        }

        let n = data.len();
        let d = data[0].len();

        if self.k > n {
            return Err(Error::InvalidClusterCount {
                requested: self.k,
                n_items: n,
            });
        }
        for point in data {
            if point.len() != d {
                return Err(Error::DimensionMismatch {
                    expected: d,
                    found: point.len(),
                });
            }
        }

        let mut rng: Box<dyn RngCore> = match self.seed {
            Some(s) => Box::new(StdRng::seed_from_u64(s)),
            None => Box::new(rand::rng()),
        };

        let mut centroids = self.init_centroids(data, &mut rng);
        let mut labels = vec![0usize; n];
        let mut n_iter = 0;

        for _ in 0..self.max_iter {
            n_iter += 1;
            for (label, point) in labels.iter_mut().zip(data) {
                *label = nearest(&centroids, point).0;
            }

            // Update step
            let mut new_centroids = vec![vec![0.0f32; d]; self.k];
            let mut counts = vec![0usize; self.k];
            for (point, &label) in data.iter().zip(&labels) {
                for (acc, &x) in new_centroids[label].iter_mut().zip(point) {
                    *acc += x;
                }
                counts[label] += 1;
            }

            let mut far = if counts.contains(&0) {
                farthest_first(data, &centroids, &labels)
            } else {
                Vec::new()
            }
            .into_iter();
            for (k, (centroid, &count)) in new_centroids.iter_mut().zip(&counts).enumerate() {
                if count > 0 {
                    for x in centroid.iter_mut() {
                        *x /= count as f32;
                    }
                } else if let Some(idx) = far.next() {
                    // Empty cluster: reseed from the worst-fit point.
                    centroid.copy_from_slice(&data[idx]);
                } else {
                    // Every point sits on its centroid; keep the old one.
                    centroid.copy_from_slice(&centroids[k]);
                }
            }

            let shift: f32 = centroids
                .iter()
                .zip(&new_centroids)
                .map(|(a, b)| squared_euclidean(a, b))
                .sum();

            centroids = new_centroids;

            if f64::from(shift) < self.tol {
                break;
            }
        }

        let mut inertia = 0.0f32;
        for (label, point) in labels.iter_mut().zip(data) {
            let (best, dist) = nearest(&centroids, point);
            *label = best;
            inertia += dist;
        }

        Ok(KmeansFit {
            centroids,
            labels,
            inertia,
            n_iter,
        })
    }

    /// Initialize centroids using k-means++.
    fn init_centroids(&self, data: &[Vec<f32>], rng: &mut impl Rng) -> Vec<Vec<f32>> {
        let n = data.len();
        let mut centroids: Vec<Vec<f32>> = Vec::with_capacity(self.k);

        let first = rng.random_range(0..n);
        centroids.push(data[first].clone());

        while centroids.len() < self.k {
            let distances: Vec<f32> = data.iter().map(|p| nearest(&centroids, p).1).collect();

            let total: f32 = distances.iter().sum();
            if total == 0.0 {
                let idx = rng.random_range(0..n);
                centroids.push(data[idx].clone());
                continue;
            }

            // Sample proportional to squared distance
            let threshold = rng.random::<f32>() * total;
            let mut cumsum = 0.0;
            let mut selected = n - 1;
            for (j, &dist) in distances.iter().enumerate() {
                cumsum += dist;
                if cumsum >= threshold && dist > 0.0 {
                    selected = j;
                    break;
                }
            }

            centroids.push(data[selected].clone());
        }

        centroids
    }
}

impl Clustering for Kmeans {
    fn fit_predict(&self, data: &[Vec<f32>]) -> Result<Vec<usize>> {
        Ok(self.fit(data)?.labels)
    }

    fn n_clusters(&self) -> usize {
        self.k
    }
}

impl KmeansFit {
    /// Number of clusters in the model.
    pub fn n_clusters(&self) -> usize {
        self.centroids.len()
    }

    /// Dimensionality of the feature space.
    pub fn n_features(&self) -> usize {
        self.centroids.first().map_or(0, Vec::len)
    }

    /// Assign a point to its nearest centroid (lowest id on ties).
    pub fn predict(&self, point: &[f32]) -> Result<usize> {
        if point.len() != self.n_features() {
            return Err(Error::DimensionMismatch {
                expected: self.n_features(),
                found: point.len(),
            });
        }
        Ok(nearest(&self.centroids, point).0)
    }

    /// Number of training points assigned to each cluster.
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0usize; self.n_clusters()];
        for &label in &self.labels {
            sizes[label] += 1;
        }
        sizes
    }
}

/// Point indices by descending distance to their assigned centroid.
///
/// Ties keep input order. Points already sitting on a centroid are skipped, so a
/// reseeded cluster never duplicates an existing centroid.
fn farthest_first(data: &[Vec<f32>], centroids: &[Vec<f32>], labels: &[usize]) -> Vec<usize> {
    let mut dists: Vec<(usize, f32)> = data
        .iter()
        .zip(labels)
        .enumerate()
        .map(|(i, (point, &label))| (i, squared_euclidean(point, &centroids[label])))
        .filter(|&(_, d)| d > 0.0)
        .collect();
    dists.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    dists.into_iter().map(|(i, _)| i).collect()
}

/// Index of and squared distance to the nearest centroid.
///
/// Strict comparison keeps the first (lowest) id when distances tie.
fn nearest(centroids: &[Vec<f32>], point: &[f32]) -> (usize, f32) {
    let mut best = 0;
    let mut best_dist = f32::MAX;
    for (k, centroid) in centroids.iter().enumerate() {
        let dist = squared_euclidean(point, centroid);
        if dist < best_dist {
            best_dist = dist;
            best = k;
        }
    }
    (best, best_dist)
}
