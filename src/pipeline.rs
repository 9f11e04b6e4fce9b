//! Per-neighbourhood clustering pipeline

use crate::config::PipelineConfig;
use crate::features::{FeatureTable, StandardScaler};
use crate::listing::Listing;
use crate::model::{fit_kmeans, ClusterModel, KMeansSettings};
use crate::source::ListingSource;
use anyhow::Context;
use polars::prelude::*;

/// Cluster label for one listing, with the fields kept out of the distance.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterAssignment {
    pub id: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub price: Option<f64>,
    pub cluster: usize,
}

/// Output of one neighbourhood run
#[derive(Debug)]
pub struct ClusteredNeighbourhood {
    pub neighbourhood: String,
    pub feature_columns: Vec<String>,
    /// Standardized matrix the model was fitted on
    pub features: ndarray::Array2<f64>,
    pub model: ClusterModel,
    pub assignments: Vec<ClusterAssignment>,
}

impl ClusteredNeighbourhood {
    /// id / latitude / longitude / price / cluster as a Polars frame
    pub fn to_frame(&self) -> crate::Result<DataFrame> {
        let ids: Vec<&str> = self.assignments.iter().map(|a| a.id.as_str()).collect();
        let latitudes: Vec<Option<f64>> = self.assignments.iter().map(|a| a.latitude).collect();
        let longitudes: Vec<Option<f64>> = self.assignments.iter().map(|a| a.longitude).collect();
        let prices: Vec<Option<f64>> = self.assignments.iter().map(|a| a.price).collect();
        let clusters: Vec<u32> = self.assignments.iter().map(|a| a.cluster as u32).collect();
        let frame = df!(
            "id" => ids,
            "latitude" => latitudes,
            "longitude" => longitudes,
            "price" => prices,
            "cluster" => clusters
        )?;
        Ok(frame)
    }
}

/// Engineer features for one neighbourhood subset and cluster it
///
/// # Arguments
/// * `neighbourhood` - Name carried into the result
/// * `listings` - Listings of the neighbourhood; ids may repeat or be blank
/// * `config` - Amenity cut-off and K-Means settings
///
/// # Returns
/// * `ClusteredNeighbourhood` with one assignment per listing, in input order
pub fn cluster_listings(
    neighbourhood: &str,
    listings: &[Listing],
    config: &PipelineConfig,
) -> crate::Result<ClusteredNeighbourhood> {
    let mut table = FeatureTable::build(listings, config.top_amenities)?;
    table.fill_missing(0.0);
    log::debug!(
        "{:<32}{:<32}",
        "feature table",
        format!("{} x {}", table.nrows(), table.ncols())
    );

    let features = StandardScaler::fit_transform(&table.values)?;
    let model = fit_kmeans(&features, KMeansSettings::from(config))?;

    let mut assignments = Vec::with_capacity(listings.len());
    for (position, listing) in listings.iter().enumerate() {
        let row = table
            .row_of(position)
            .with_context(|| format!("listing at row {} has no feature row", position))?;
        assignments.push(ClusterAssignment {
            id: listing.id.clone(),
            latitude: listing.latitude,
            longitude: listing.longitude,
            price: listing.price,
            cluster: model.labels[row],
        });
    }

    Ok(ClusteredNeighbourhood {
        neighbourhood: neighbourhood.to_string(),
        feature_columns: table.columns,
        features,
        model,
        assignments,
    })
}

/// Fetch and cluster one neighbourhood.
pub fn run_neighbourhood(
    source: &dyn ListingSource,
    neighbourhood: &str,
    config: &PipelineConfig,
) -> crate::Result<ClusteredNeighbourhood> {
    let listings = source.fetch(neighbourhood)?;
    log::info!(
        "{:<32}{:<32}",
        "clustering neighbourhood",
        format!("{} ({} listings)", neighbourhood, listings.len())
    );
    cluster_listings(neighbourhood, &listings, config)
        .with_context(|| format!("clustering neighbourhood '{}'", neighbourhood))
}

/// Cluster every neighbourhood of a source in turn
///
/// # Arguments
/// * `source` - Listings table to partition
/// * `config` - Pipeline configuration; `only_neighbourhood` narrows the run
/// * `emit` - Called with each result before the next neighbourhood is fetched
///
/// # Returns
/// * Number of neighbourhoods processed. The first error stops the run.
pub fn run_all<F>(source: &dyn ListingSource, config: &PipelineConfig, mut emit: F) -> crate::Result<usize>
where
    F: FnMut(&ClusteredNeighbourhood) -> crate::Result<()>,
{
    let neighbourhoods = match &config.only_neighbourhood {
        Some(only) => vec![only.clone()],
        None => source.neighbourhoods()?,
    };
    log::info!("{:<32}{:<32}", "neighbourhoods", neighbourhoods.len());

    for neighbourhood in &neighbourhoods {
        let result = run_neighbourhood(source, neighbourhood, config)?;
        emit(&result)?;
    }
    Ok(neighbourhoods.len())
}
