//! Feature table construction and standardization

use crate::amenity::{encode_amenities, AmenityVocabulary};
use crate::encode::{encode_categorical, IndicatorMatrix};
use crate::error::FeatureError;
use crate::listing::{Listing, AVAILABILITY_FEATURE, NUMERIC_FEATURES};
use ndarray::{concatenate, Array1, Array2, Axis};
use std::collections::HashMap;

/// Numeric features of one neighbourhood subset, one row per listing.
///
/// Rows are keyed by the listing's position in the subset; listing ids are
/// output data only and may repeat or be blank. Identifier, price and
/// coordinates never enter the table. Missing numeric values are `NaN`
/// until [`FeatureTable::fill_missing`] runs.
#[derive(Debug, Clone)]
pub struct FeatureTable {
    pub keys: Vec<usize>,
    pub columns: Vec<String>,
    pub values: Array2<f64>,
    index: HashMap<usize, usize>,
}

impl FeatureTable {
    /// Numeric base table: [`NUMERIC_FEATURES`] plus derived availability.
    pub fn from_listings(listings: &[Listing]) -> crate::Result<Self> {
        let width = NUMERIC_FEATURES.len() + 1;
        let mut data = Vec::with_capacity(listings.len() * width);
        for listing in listings {
            data.extend(listing.numeric.iter().map(|v| v.unwrap_or(f64::NAN)));
            data.push(listing.availability().unwrap_or(f64::NAN));
        }
        let values = Array2::from_shape_vec((listings.len(), width), data)?;

        let mut columns: Vec<String> = NUMERIC_FEATURES.iter().map(|c| c.to_string()).collect();
        columns.push(AVAILABILITY_FEATURE.to_string());

        let keys: Vec<usize> = (0..listings.len()).collect();
        let index = keys.iter().enumerate().map(|(row, &key)| (key, row)).collect();

        Ok(Self {
            keys,
            columns,
            values,
            index,
        })
    }

    /// Build the full feature table for one neighbourhood subset
    ///
    /// # Arguments
    /// * `listings` - Listings of one neighbourhood, in fetch order
    /// * `top_amenities` - Number of most frequent amenity columns to keep
    ///
    /// # Returns
    /// * `FeatureTable` with the numeric fields, amenity indicators, then
    ///   room and property type indicators; row `i` is `listings[i]`
    pub fn build(listings: &[Listing], top_amenities: usize) -> crate::Result<Self> {
        let mut table = Self::from_listings(listings)?;
        let keys: Vec<usize> = (0..listings.len()).collect();

        let vocabulary = AmenityVocabulary::from_listings(listings);
        table.join(encode_amenities(listings, &vocabulary, top_amenities).with_prefix("amenity"))?;

        let room_types: Vec<Option<&str>> =
            listings.iter().map(|l| l.room_type.as_deref()).collect();
        table.join(encode_categorical(keys.clone(), &room_types).with_prefix("room_type"))?;

        let property_types: Vec<Option<&str>> =
            listings.iter().map(|l| l.property_type.as_deref()).collect();
        table.join(encode_categorical(keys, &property_types).with_prefix("property_type"))?;

        Ok(table)
    }

    pub fn nrows(&self) -> usize {
        self.values.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.values.ncols()
    }

    /// Append indicator columns, aligning rows by key.
    pub fn join(&mut self, indicators: IndicatorMatrix) -> crate::Result<()> {
        let mut positions = HashMap::with_capacity(indicators.keys.len());
        for (row, &key) in indicators.keys.iter().enumerate() {
            if positions.insert(key, row).is_some() {
                return Err(FeatureError::DuplicateKey(key).into());
            }
        }
        let mut order = Vec::with_capacity(self.keys.len());
        for &key in &self.keys {
            match positions.get(&key) {
                Some(&row) => order.push(row),
                None => return Err(FeatureError::MissingKey(key).into()),
            }
        }
        let aligned = indicators.values.select(Axis(0), &order);
        self.values = concatenate(Axis(1), &[self.values.view(), aligned.view()])?;
        self.columns.extend(indicators.columns);
        Ok(())
    }

    /// Table row holding the listing at `key` in the subset.
    pub fn row_of(&self, key: usize) -> Option<usize> {
        self.index.get(&key).copied()
    }

    /// Replace `NaN` (missing) cells.
    pub fn fill_missing(&mut self, value: f64) {
        self.values
            .mapv_inplace(|v| if v.is_nan() { value } else { v });
    }
}

/// Per-column standardization to zero mean and unit variance.
///
/// Uses the population standard deviation. Constant columns get a scale of
/// one so they map to zero instead of `NaN`.
#[derive(Debug, Clone)]
pub struct StandardScaler {
    pub mean: Array1<f64>,
    pub scale: Array1<f64>,
}

impl StandardScaler {
    pub fn fit(features: &Array2<f64>) -> crate::Result<Self> {
        let mean = features.mean_axis(Axis(0)).ok_or(FeatureError::Empty)?;
        let scale = features
            .std_axis(Axis(0), 0.0)
            .mapv(|s| if s > f64::EPSILON { s } else { 1.0 });
        Ok(Self { mean, scale })
    }

    pub fn transform(&self, features: &Array2<f64>) -> Array2<f64> {
        (features - &self.mean) / &self.scale
    }

    pub fn fit_transform(features: &Array2<f64>) -> crate::Result<Array2<f64>> {
        let scaler = Self::fit(features)?;
        Ok(scaler.transform(features))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::{ACCOMMODATES, AVAILABILITY_365};
    use ndarray::array;

    fn listing(id: &str, accommodates: f64, room: &str, amenities: &str) -> Listing {
        let mut numeric = [None; 13];
        numeric[ACCOMMODATES] = Some(accommodates);
        numeric[AVAILABILITY_365] = Some(365.0);
        Listing {
            id: id.to_string(),
            numeric,
            amenities: amenities.to_string(),
            room_type: Some(room.to_string()),
            property_type: Some("Apartment".to_string()),
            ..Listing::default()
        }
    }

    #[test]
    fn test_from_listings() {
        let listings = vec![listing("a", 2.0, "Private room", "{}"), listing("b", 4.0, "Private room", "{}")];
        let table = FeatureTable::from_listings(&listings).unwrap();

        assert_eq!(table.values.shape(), &[2, 14]);
        assert_eq!(table.columns.last().map(String::as_str), Some("availability"));
        assert_eq!(table.values[[1, 0]], 4.0);
        assert_eq!(table.values[[0, 13]], 1.0);
        assert!(table.values[[0, 1]].is_nan());
        assert_eq!(table.row_of(1), Some(1));
    }

    #[test]
    fn test_repeated_and_blank_ids_keep_their_rows() {
        let listings = vec![
            listing("a", 2.0, "Private room", "{Wifi}"),
            listing("", 4.0, "Private room", "{}"),
            listing("a", 6.0, "Entire home/apt", "{Wifi}"),
            listing("", 8.0, "Private room", "{}"),
        ];
        let table = FeatureTable::build(&listings, 60).unwrap();

        assert_eq!(table.nrows(), 4);
        assert_eq!(table.keys, vec![0, 1, 2, 3]);
        assert_eq!(table.values.column(0).to_vec(), vec![2.0, 4.0, 6.0, 8.0]);
        assert_eq!(table.row_of(3), Some(3));
    }

    #[test]
    fn test_join_aligns_by_key() {
        let listings = vec![listing("a", 2.0, "Hotel room", "{}"), listing("b", 4.0, "Shared room", "{}")];
        let mut table = FeatureTable::from_listings(&listings).unwrap();

        // indicator rows deliberately in reverse order
        let indicators = IndicatorMatrix {
            keys: vec![1, 0],
            columns: vec!["flag".to_string()],
            values: array![[1.0], [0.0]],
        };
        table.join(indicators).unwrap();

        assert_eq!(table.ncols(), 15);
        assert_eq!(table.values[[0, 14]], 0.0);
        assert_eq!(table.values[[1, 14]], 1.0);
    }

    #[test]
    fn test_join_missing_key() {
        let listings = vec![listing("a", 2.0, "Hotel room", "{}")];
        let mut table = FeatureTable::from_listings(&listings).unwrap();
        let indicators = IndicatorMatrix {
            keys: vec![7],
            columns: vec!["flag".to_string()],
            values: array![[1.0]],
        };
        assert!(table.join(indicators).is_err());
    }

    #[test]
    fn test_build() {
        let listings = vec![
            listing("a", 2.0, "Private room", "{Wifi,TV}"),
            listing("b", 4.0, "Entire home/apt", "{Wifi}"),
            listing("c", 6.0, "Private room", "{Kitchen}"),
        ];
        let table = FeatureTable::build(&listings, 60).unwrap();

        // 14 numeric + 3 amenities + 2 room types + 1 property type
        assert_eq!(table.ncols(), 20);
        assert_eq!(table.nrows(), 3);
        assert!(table.columns.contains(&"amenity:Wifi".to_string()));
        assert!(table.columns.contains(&"room_type:Entire home/apt".to_string()));
        assert!(table.columns.contains(&"property_type:Apartment".to_string()));
    }

    #[test]
    fn test_fill_missing() {
        let listings = vec![listing("a", 2.0, "Private room", "{}")];
        let mut table = FeatureTable::from_listings(&listings).unwrap();
        table.fill_missing(0.0);
        assert!(table.values.iter().all(|v| !v.is_nan()));
        assert_eq!(table.values[[0, 1]], 0.0);
    }

    #[test]
    fn test_standard_scaler() {
        let features = array![[1.0, 5.0], [3.0, 5.0], [5.0, 5.0]];
        let scaled = StandardScaler::fit_transform(&features).unwrap();

        let means = scaled.mean_axis(Axis(0)).unwrap();
        assert!(means.iter().all(|m| m.abs() < 1e-12));
        let stds = scaled.std_axis(Axis(0), 0.0);
        assert!((stds[0] - 1.0).abs() < 1e-12);
        // constant column maps to zero
        assert!(scaled.column(1).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_standard_scaler_empty() {
        let features = Array2::<f64>::zeros((0, 3));
        assert!(StandardScaler::fit(&features).is_err());
    }
}
