//! Listing records and price normalization

use crate::error::PriceError;

/// Numeric listing attributes that feed the clustering distance, in
/// feature-table column order.
pub const NUMERIC_FEATURES: [&str; 13] = [
    "accommodates",
    "bedrooms",
    "beds",
    "minimum_nights",
    "maximum_nights",
    "availability_365",
    "number_of_reviews",
    "review_scores_rating",
    "review_scores_cleanliness",
    "review_scores_checkin",
    "review_scores_communication",
    "review_scores_location",
    "review_scores_value",
];

/// Positions in [`NUMERIC_FEATURES`] the pipeline reads directly.
pub const ACCOMMODATES: usize = 0;
pub const BEDROOMS: usize = 1;
pub const AVAILABILITY_365: usize = 5;
pub const NUMBER_OF_REVIEWS: usize = 6;

/// Name of the derived `availability_365 / 365` column.
pub const AVAILABILITY_FEATURE: &str = "availability";

/// One rental unit from the listings table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Listing {
    pub id: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Nightly price with currency formatting removed
    pub price: Option<f64>,
    /// Values for [`NUMERIC_FEATURES`], same order
    pub numeric: [Option<f64>; 13],
    /// Serialized amenity set as stored in the table
    pub amenities: String,
    pub room_type: Option<String>,
    pub property_type: Option<String>,
}

impl Listing {
    pub fn availability_365(&self) -> Option<f64> {
        self.numeric[AVAILABILITY_365]
    }

    /// Share of the year the listing is bookable.
    pub fn availability(&self) -> Option<f64> {
        self.availability_365().map(|days| days / 365.0)
    }
}

/// Parse a currency-formatted price such as `"$1,250.00"`.
///
/// Currency symbols, thousands separators and whitespace are dropped before
/// parsing. Blank input yields `None`.
pub fn parse_price(raw: &str) -> Result<Option<f64>, PriceError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    let digits: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    digits
        .parse::<f64>()
        .map(Some)
        .map_err(|_| PriceError {
            raw: raw.to_string(),
        })
}
