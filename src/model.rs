//! Seeded K-Means clustering

use crate::error::FeatureError;
use linfa::prelude::*;
use linfa_clustering::KMeans;
use linfa_nn::distance::L2Dist;
use ndarray::{s, Array1, Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Parameters for one K-Means fit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KMeansSettings {
    pub n_clusters: usize,
    pub seed: u64,
    pub max_iters: u64,
    pub tolerance: f64,
}

impl From<&crate::config::PipelineConfig> for KMeansSettings {
    fn from(config: &crate::config::PipelineConfig) -> Self {
        Self {
            n_clusters: config.clusters,
            seed: config.seed,
            max_iters: config.max_iters,
            tolerance: config.tolerance,
        }
    }
}

/// Fitted K-Means result for one neighbourhood
#[derive(Debug)]
pub struct ClusterModel {
    pub n_clusters: usize,
    /// Cluster assignment per feature-table row
    pub labels: Array1<usize>,
    /// Cluster centroids in standardized space
    pub centroids: Array2<f64>,
    /// Within-cluster sum of squares
    pub inertia: f64,
}

impl ClusterModel {
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.n_clusters];
        for &label in self.labels.iter().filter(|&&l| l < self.n_clusters) {
            sizes[label] += 1;
        }
        sizes
    }

    /// Mean silhouette coefficient over the first `sample_size` rows.
    ///
    /// Rows whose cluster has no other sampled member, or when only one
    /// cluster is sampled, score 0.
    pub fn compute_silhouette_sample(&self, features: &Array2<f64>, sample_size: usize) -> f64 {
        let n_samples = features.nrows().min(sample_size);
        if n_samples < 2 {
            return 0.0;
        }
        let sample = features.slice(s![..n_samples, ..]);

        let total: f64 = (0..n_samples)
            .map(|i| {
                let own = self.labels[i];
                let mut sums = vec![0.0; self.n_clusters];
                let mut counts = vec![0usize; self.n_clusters];
                for (j, other) in sample.outer_iter().enumerate() {
                    let label = self.labels[j];
                    if j == i || label >= self.n_clusters {
                        continue;
                    }
                    sums[label] += distance(sample.row(i), other);
                    counts[label] += 1;
                }

                let mean_to = |c: usize| sums[c] / counts[c] as f64;
                if counts[own] == 0 {
                    return 0.0;
                }
                let cohesion = mean_to(own);
                let separation = (0..self.n_clusters)
                    .filter(|&c| c != own && counts[c] > 0)
                    .map(mean_to)
                    .fold(f64::INFINITY, f64::min);
                if separation.is_infinite() || cohesion.max(separation) == 0.0 {
                    0.0
                } else {
                    (separation - cohesion) / cohesion.max(separation)
                }
            })
            .sum();

        total / n_samples as f64
    }
}

/// Fit K-Means on a standardized feature matrix
///
/// # Arguments
/// * `features` - Standardized features, one row per listing
/// * `settings` - Cluster count, RNG seed, iteration cap and tolerance
///
/// # Returns
/// * `ClusterModel` with labels, centroids and inertia. The RNG is seeded
///   from `settings.seed`, so the same matrix and settings always produce
///   the same labels.
pub fn fit_kmeans(features: &Array2<f64>, settings: KMeansSettings) -> crate::Result<ClusterModel> {
    let n_clusters = settings.n_clusters;
    if n_clusters < 2 {
        anyhow::bail!("Number of clusters must be at least 2, got {}", n_clusters);
    }

    if features.nrows() < n_clusters {
        return Err(FeatureError::TooFewRows {
            required: n_clusters,
            provided: features.nrows(),
        }
        .into());
    }

    let targets: Array1<usize> = Array1::zeros(features.nrows());
    let dataset = Dataset::new(features.clone(), targets);

    let rng = StdRng::seed_from_u64(settings.seed);
    let model = KMeans::params_with(n_clusters, rng, L2Dist)
        .max_n_iterations(settings.max_iters)
        .tolerance(settings.tolerance)
        .fit(&dataset)?;

    let labels = model.predict(&dataset);
    let centroids = model.centroids().clone();
    let inertia = inertia(features, &labels, &centroids);

    log::debug!(
        "{:<32}{:<32}",
        "fitted kmeans",
        format!("k={} inertia={:.3}", n_clusters, inertia)
    );

    Ok(ClusterModel {
        n_clusters,
        labels,
        centroids,
        inertia,
    })
}

fn inertia(features: &Array2<f64>, labels: &Array1<usize>, centroids: &Array2<f64>) -> f64 {
    features
        .outer_iter()
        .zip(labels.iter())
        .filter(|(_, &cluster)| cluster < centroids.nrows())
        .map(|(row, &cluster)| (&row - &centroids.row(cluster)).mapv(|d| d * d).sum())
        .sum()
}

fn distance(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    (&a - &b).mapv(|d| d * d).sum().sqrt()
}
