//! Explicit pipeline configuration

use crate::error::SourceError;

/// Column the listings table is partitioned on.
pub const DEFAULT_NEIGHBOURHOOD_COLUMN: &str = "neighbourhood_cleansed";
pub const DEFAULT_CLUSTERS: usize = 3;
pub const DEFAULT_SEED: u64 = 170;
pub const DEFAULT_TOP_AMENITIES: usize = 60;
pub const DEFAULT_MAX_ITERS: u64 = 300;
pub const DEFAULT_TOLERANCE: f64 = 1e-4;

/// Everything one run needs, passed by reference into the source and the
/// per-neighbourhood pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// CSV export of the listings table
    pub input: String,
    pub neighbourhood_column: String,
    /// Restrict the run to a single neighbourhood
    pub only_neighbourhood: Option<String>,
    pub clusters: usize,
    pub seed: u64,
    /// Number of amenity indicator columns kept after frequency ranking
    pub top_amenities: usize,
    pub max_iters: u64,
    pub tolerance: f64,
    pub verbose: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input: "combined_listings.csv".to_string(),
            neighbourhood_column: DEFAULT_NEIGHBOURHOOD_COLUMN.to_string(),
            only_neighbourhood: None,
            clusters: DEFAULT_CLUSTERS,
            seed: DEFAULT_SEED,
            top_amenities: DEFAULT_TOP_AMENITIES,
            max_iters: DEFAULT_MAX_ITERS,
            tolerance: DEFAULT_TOLERANCE,
            verbose: false,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), SourceError> {
        if self.clusters < 2 {
            return Err(SourceError::InvalidConfig(format!(
                "number of clusters must be at least 2, got {}",
                self.clusters
            )));
        }
        if self.max_iters == 0 {
            return Err(SourceError::InvalidConfig(
                "max iterations must be positive".to_string(),
            ));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(SourceError::InvalidConfig(format!(
                "tolerance must be a positive number, got {}",
                self.tolerance
            )));
        }
        if self.neighbourhood_column.trim().is_empty() {
            return Err(SourceError::InvalidConfig(
                "neighbourhood column name is empty".to_string(),
            ));
        }
        Ok(())
    }
}
