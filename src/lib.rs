//! listing-clusters: per-neighbourhood K-Means clustering of short-term rental listings
//!
//! The listings table is partitioned by neighbourhood; each subset gets its
//! own feature table (parsed prices, amenity and room/property indicators),
//! is standardized and clustered with a seeded K-Means.

pub mod amenity;
pub mod cli;
pub mod config;
pub mod encode;
pub mod error;
pub mod features;
pub mod listing;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod source;

// Re-export public items for easier access
pub use amenity::{encode_amenities, AmenityVocabulary};
pub use cli::Args;
pub use config::PipelineConfig;
pub use encode::{encode_categorical, IndicatorMatrix};
pub use error::{fatal_record, FeatureError, PriceError, SourceError};
pub use features::{FeatureTable, StandardScaler};
pub use listing::{parse_price, Listing};
pub use model::{fit_kmeans, ClusterModel, KMeansSettings};
pub use pipeline::{cluster_listings, run_all, ClusterAssignment, ClusteredNeighbourhood};
pub use source::{CsvListingSource, ListingSource};

/// Common result type used throughout the application
pub type Result<T> = anyhow::Result<T>;
