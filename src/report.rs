//! Console output for clustered neighbourhoods

use crate::pipeline::ClusteredNeighbourhood;

/// Rows used for the sampled silhouette score
const SILHOUETTE_SAMPLE: usize = 100;

/// Cluster sizes as `(cluster, size, percentage)`
pub fn cluster_shares(result: &ClusteredNeighbourhood) -> Vec<(usize, usize, f64)> {
    let total = result.assignments.len().max(1) as f64;
    result
        .model
        .cluster_sizes()
        .into_iter()
        .enumerate()
        .map(|(cluster, size)| (cluster, size, size as f64 / total * 100.0))
        .collect()
}

/// Print cluster statistics to console
pub fn print_cluster_statistics(result: &ClusteredNeighbourhood) {
    println!("\n=== Cluster Statistics ===");
    println!("Number of clusters: {}", result.model.n_clusters);
    println!("Total listings: {}", result.assignments.len());
    println!(
        "Within-cluster sum of squares (Inertia): {:.2}",
        result.model.inertia
    );

    let silhouette_score = result
        .model
        .compute_silhouette_sample(&result.features, SILHOUETTE_SAMPLE);
    println!("Silhouette score (sample): {:.3}", silhouette_score);

    println!("\nCluster sizes:");
    for (cluster, size, percentage) in cluster_shares(result) {
        println!("  Cluster {}: {} listings ({:.1}%)", cluster, size, percentage);
    }

    println!("\nMean price per cluster:");
    for (cluster, mean) in mean_price_by_cluster(result).into_iter().enumerate() {
        match mean {
            Some(mean) => println!("  Cluster {}: {:.2}", cluster, mean),
            None => println!("  Cluster {}: n/a", cluster),
        }
    }
}

/// Average parsed price of each cluster; `None` when no listing in the
/// cluster has a price.
pub fn mean_price_by_cluster(result: &ClusteredNeighbourhood) -> Vec<Option<f64>> {
    let mut sums = vec![(0.0, 0usize); result.model.n_clusters];
    for assignment in &result.assignments {
        if let (Some(price), Some(slot)) = (assignment.price, sums.get_mut(assignment.cluster)) {
            slot.0 += price;
            slot.1 += 1;
        }
    }
    sums.into_iter()
        .map(|(sum, n)| if n == 0 { None } else { Some(sum / n as f64) })
        .collect()
}

/// Print one neighbourhood: header, assignment table and statistics
pub fn print_neighbourhood(result: &ClusteredNeighbourhood, verbose: bool) -> crate::Result<()> {
    println!("\n=== Neighbourhood: {} ===", result.neighbourhood);
    println!("Listings: {}", result.assignments.len());
    println!("Feature columns: {}", result.feature_columns.len());
    if verbose {
        for column in &result.feature_columns {
            println!("  {}", column);
        }
    }

    println!("{}", result.to_frame()?);
    print_cluster_statistics(result);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use crate::listing::{Listing, ACCOMMODATES, NUMBER_OF_REVIEWS};
    use crate::pipeline::cluster_listings;

    fn result() -> ClusteredNeighbourhood {
        let listings: Vec<Listing> = (0..6)
            .map(|i| {
                let mut numeric = [None; 13];
                numeric[ACCOMMODATES] = Some(if i < 3 { 1.0 } else { 6.0 });
                numeric[NUMBER_OF_REVIEWS] = Some(i as f64);
                Listing {
                    id: i.to_string(),
                    price: if i == 0 { None } else { Some(100.0 * i as f64) },
                    numeric,
                    amenities: "{Wifi}".to_string(),
                    room_type: Some("Private room".to_string()),
                    property_type: Some("Loft".to_string()),
                    ..Listing::default()
                }
            })
            .collect();
        cluster_listings("Mission", &listings, &PipelineConfig::default()).unwrap()
    }

    #[test]
    fn test_cluster_shares() {
        let result = result();
        let shares = cluster_shares(&result);

        assert_eq!(shares.len(), 3);
        assert_eq!(shares.iter().map(|s| s.1).sum::<usize>(), 6);
        let total: f64 = shares.iter().map(|s| s.2).sum();
        assert!((total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_mean_price_by_cluster() {
        let result = result();
        let means = mean_price_by_cluster(&result);
        assert_eq!(means.len(), 3);
        assert!(means.iter().flatten().all(|m| *m > 0.0));
    }

    #[test]
    fn test_print_neighbourhood() {
        let result = result();
        assert!(print_neighbourhood(&result, true).is_ok());
    }
}
