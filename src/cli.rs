//! Command-line interface definitions and argument parsing

use crate::config::PipelineConfig;
use clap::Parser;

/// Cluster short-term rental listings per neighbourhood using K-Means
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the listings CSV file
    #[arg(short, long, default_value = "combined_listings.csv")]
    pub input: String,

    /// Column the listings are partitioned on
    #[arg(long, default_value = "neighbourhood_cleansed")]
    pub neighbourhood_column: String,

    /// Only process this neighbourhood
    #[arg(short, long)]
    pub neighbourhood: Option<String>,

    /// Number of clusters for K-Means
    #[arg(short = 'k', long, default_value = "3")]
    pub clusters: usize,

    /// Seed for K-Means initialisation
    #[arg(long, default_value = "170")]
    pub seed: u64,

    /// Number of most frequent amenities kept as features
    #[arg(long, default_value = "60")]
    pub top_amenities: usize,

    /// Maximum iterations for K-Means algorithm
    #[arg(long, default_value = "300")]
    pub max_iters: u64,

    /// Tolerance for K-Means convergence
    #[arg(long, default_value = "1e-4")]
    pub tolerance: f64,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Build the validated pipeline configuration from the parsed flags
    pub fn to_config(&self) -> crate::Result<PipelineConfig> {
        let config = PipelineConfig {
            input: self.input.clone(),
            neighbourhood_column: self.neighbourhood_column.clone(),
            only_neighbourhood: self.neighbourhood.clone(),
            clusters: self.clusters,
            seed: self.seed,
            top_amenities: self.top_amenities,
            max_iters: self.max_iters,
            tolerance: self.tolerance,
            verbose: self.verbose,
        };
        config.validate()?;
        Ok(config)
    }
}
