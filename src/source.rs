//! Listings table access and neighbourhood partitioning using Polars

use crate::config::PipelineConfig;
use crate::error::SourceError;
use crate::listing::{parse_price, Listing, NUMERIC_FEATURES};
use anyhow::Context;
use polars::prelude::*;

/// Read side of the listings table.
pub trait ListingSource {
    /// Distinct neighbourhood values, in order of first appearance.
    fn neighbourhoods(&self) -> crate::Result<Vec<String>>;

    /// All listings of one neighbourhood.
    fn fetch(&self, neighbourhood: &str) -> crate::Result<Vec<Listing>>;
}

/// Listings table loaded from a CSV export, held in memory for the run.
pub struct CsvListingSource {
    frame: DataFrame,
    neighbourhood_column: String,
}

impl CsvListingSource {
    /// Load the listings table from a CSV export
    ///
    /// # Arguments
    /// * `config` - Pipeline configuration; `input` names the CSV file and
    ///   `neighbourhood_column` the partition column
    ///
    /// # Returns
    /// * `CsvListingSource` holding the whole table for the run, or a
    ///   `SourceError` when the file is unreadable or lacks the column
    pub fn open(config: &PipelineConfig) -> crate::Result<Self> {
        let frame = LazyCsvReader::new(&config.input)
            .with_has_header(true)
            .with_infer_schema_length(Some(10_000))
            .finish()
            .and_then(|lazy| lazy.collect())
            .map_err(|e| SourceError::Unreadable {
                path: config.input.clone(),
                reason: e.to_string(),
            })?;
        let source = Self::from_frame(frame, &config.neighbourhood_column)?;
        log::info!(
            "{:<32}{:<32}",
            "loaded listings table",
            format!("{} ({} rows)", config.input, source.height())
        );
        Ok(source)
    }

    /// Wrap an already-loaded frame.
    pub fn from_frame(frame: DataFrame, neighbourhood_column: &str) -> crate::Result<Self> {
        if frame.column(neighbourhood_column).is_err() {
            return Err(SourceError::MissingColumn(neighbourhood_column.to_string()).into());
        }
        Ok(Self {
            frame,
            neighbourhood_column: neighbourhood_column.to_string(),
        })
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    fn neighbourhood_expr(&self) -> Expr {
        col(&self.neighbourhood_column).cast(DataType::String)
    }
}

impl ListingSource for CsvListingSource {
    fn neighbourhoods(&self) -> crate::Result<Vec<String>> {
        let distinct = self
            .frame
            .clone()
            .lazy()
            .select([self.neighbourhood_expr()])
            .unique_stable(None, UniqueKeepStrategy::First)
            .collect()
            .map_err(|e| SourceError::Query(e.to_string()))?;
        let values = distinct
            .column(&self.neighbourhood_column)
            .map_err(|e| SourceError::Query(e.to_string()))?
            .str()
            .map_err(|e| SourceError::Query(e.to_string()))?
            .into_iter()
            .flatten()
            .map(str::to_string)
            .collect();
        Ok(values)
    }

    /// Rows whose neighbourhood equals `neighbourhood`, compared as a typed
    /// expression so the value is never spliced into query text.
    fn fetch(&self, neighbourhood: &str) -> crate::Result<Vec<Listing>> {
        let subset = self
            .frame
            .clone()
            .lazy()
            .filter(self.neighbourhood_expr().eq(lit(neighbourhood)))
            .collect()
            .map_err(|e| SourceError::Query(e.to_string()))?;
        log::debug!(
            "{:<32}{:<32}",
            "fetched neighbourhood",
            format!("{} ({} rows)", neighbourhood, subset.height())
        );
        listings_from_frame(&subset)
            .with_context(|| format!("reading listings of neighbourhood '{}'", neighbourhood))
    }
}

/// Convert a listings frame into typed records.
pub fn listings_from_frame(df: &DataFrame) -> crate::Result<Vec<Listing>> {
    let ids = string_column(df, "id")?;
    let latitudes = float_column(df, "latitude")?;
    let longitudes = float_column(df, "longitude")?;
    let prices = string_column(df, "price")?;
    let amenities = string_column(df, "amenities")?;
    let room_types = string_column(df, "room_type")?;
    let property_types = string_column(df, "property_type")?;
    let numeric = NUMERIC_FEATURES
        .iter()
        .map(|name| float_column(df, name))
        .collect::<crate::Result<Vec<_>>>()?;

    let mut listings = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        let price = match &prices[row] {
            Some(raw) => parse_price(raw)?,
            None => None,
        };
        let mut values = [None; 13];
        for (slot, column) in values.iter_mut().zip(&numeric) {
            *slot = column[row];
        }
        listings.push(Listing {
            id: ids[row].clone().unwrap_or_default(),
            latitude: latitudes[row],
            longitude: longitudes[row],
            price,
            numeric: values,
            amenities: amenities[row].clone().unwrap_or_default(),
            room_type: room_types[row].clone(),
            property_type: property_types[row].clone(),
        });
    }
    Ok(listings)
}

fn column<'a>(df: &'a DataFrame, name: &str) -> crate::Result<&'a Series> {
    df.column(name)
        .map_err(|_| SourceError::MissingColumn(name.to_string()).into())
}

fn string_column(df: &DataFrame, name: &str) -> crate::Result<Vec<Option<String>>> {
    let series = column(df, name)?.cast(&DataType::String)?;
    Ok(series
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

fn float_column(df: &DataFrame, name: &str) -> crate::Result<Vec<Option<f64>>> {
    let series = column(df, name)?.cast(&DataType::Float64)?;
    Ok(series.f64()?.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::ACCOMMODATES;

    fn frame() -> DataFrame {
        let mut columns: Vec<Series> = vec![
            Series::new("id", &[1i64, 2, 3]),
            Series::new("neighbourhood_cleansed", &["Mission", "SoMa", "Mission"]),
            Series::new("latitude", &[37.75, 37.78, 37.76]),
            Series::new("longitude", &[-122.41, -122.40, -122.42]),
            Series::new("price", &[Some("$1,250.00"), Some("$80.00"), None]),
            Series::new("amenities", &["{TV,Wifi}", "{Wifi}", "{}"]),
            Series::new("room_type", &["Entire home/apt", "Private room", "Private room"]),
            Series::new("property_type", &["House", "Apartment", "Apartment"]),
        ];
        for name in NUMERIC_FEATURES {
            columns.push(Series::new(name, &[Some(1.0), None, Some(3.0)]));
        }
        DataFrame::new(columns).unwrap()
    }

    #[test]
    fn test_neighbourhoods() {
        let source = CsvListingSource::from_frame(frame(), "neighbourhood_cleansed").unwrap();
        assert_eq!(source.neighbourhoods().unwrap(), vec!["Mission", "SoMa"]);
        assert_eq!(source.height(), 3);
    }

    #[test]
    fn test_fetch() {
        let source = CsvListingSource::from_frame(frame(), "neighbourhood_cleansed").unwrap();
        let listings = source.fetch("Mission").unwrap();

        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].id, "1");
        assert_eq!(listings[0].price, Some(1250.0));
        assert_eq!(listings[1].price, None);
        assert_eq!(listings[0].numeric[ACCOMMODATES], Some(1.0));
        assert_eq!(listings[0].room_type.as_deref(), Some("Entire home/apt"));

        assert!(source.fetch("Nowhere").unwrap().is_empty());
    }

    #[test]
    fn test_null_ids_become_blank() {
        let mut df = frame();
        df.replace("id", Series::new("id", &[None, Some(2i64), None]))
            .unwrap();
        let source = CsvListingSource::from_frame(df, "neighbourhood_cleansed").unwrap();
        let listings = source.fetch("Mission").unwrap();

        assert_eq!(listings.len(), 2);
        assert!(listings.iter().all(|l| l.id.is_empty()));
    }

    #[test]
    fn test_fetch_is_not_string_interpolated() {
        let source = CsvListingSource::from_frame(frame(), "neighbourhood_cleansed").unwrap();
        let listings = source.fetch("Mission' OR '1'='1").unwrap();
        assert!(listings.is_empty());
    }

    #[test]
    fn test_missing_column() {
        let result = CsvListingSource::from_frame(frame(), "borough");
        let err = result.err().unwrap();
        assert!(matches!(
            err.downcast_ref::<SourceError>(),
            Some(SourceError::MissingColumn(_))
        ));

        let df = frame().drop("amenities").unwrap();
        assert!(listings_from_frame(&df).is_err());
    }

    #[test]
    fn test_malformed_price_is_fatal() {
        let mut df = frame();
        df.replace("price", Series::new("price", &["$10", "free", "$5"]))
            .unwrap();
        let source = CsvListingSource::from_frame(df, "neighbourhood_cleansed").unwrap();
        assert!(source.fetch("SoMa").is_err());
        assert!(source.fetch("Mission").is_ok());
    }
}
