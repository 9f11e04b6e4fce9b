//! Amenity vocabulary extraction and one-hot encoding

use crate::encode::IndicatorMatrix;
use crate::listing::Listing;
use std::collections::BTreeSet;

/// Tokens starting with this marker are untranslated amenity keys
/// (e.g. `translation missing: en.hosting_amenity_49`), not amenities.
pub const TRANSLATION_MARKER: &str = "translation";

const FORMATTING_CHARS: [char; 5] = ['{', '}', '[', ']', '"'];

/// Split a serialized amenity set (`{TV,"Cable TV"}` or `["TV", "Wifi"]`)
/// into trimmed tokens. Empty tokens are kept; the vocabulary drops them.
pub fn tokenize(raw: &str) -> impl Iterator<Item = String> + '_ {
    raw.split(',').map(|token| {
        token
            .chars()
            .filter(|c| !FORMATTING_CHARS.contains(c))
            .collect::<String>()
            .trim()
            .to_string()
    })
}

pub fn is_translation_marker(token: &str) -> bool {
    token.starts_with(TRANSLATION_MARKER)
}

/// Distinct amenity tokens observed across a neighbourhood subset, in
/// lexicographic order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AmenityVocabulary {
    tokens: BTreeSet<String>,
}

impl AmenityVocabulary {
    pub fn build<'a>(raw_amenities: impl IntoIterator<Item = &'a str>) -> Self {
        let tokens = raw_amenities
            .into_iter()
            .flat_map(tokenize)
            .filter(|token| !token.is_empty() && !is_translation_marker(token))
            .collect();
        Self { tokens }
    }

    pub fn from_listings(listings: &[Listing]) -> Self {
        Self::build(listings.iter().map(|l| l.amenities.as_str()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }
}

/// Encode every listing against the vocabulary and keep the `top` most
/// frequent amenity columns.
///
/// A cell fires when the token is a substring of the listing's raw amenity
/// text, so a short token like `TV` also fires for `Cable TV`.
pub fn encode_amenities(
    listings: &[Listing],
    vocabulary: &AmenityVocabulary,
    top: usize,
) -> IndicatorMatrix {
    let keys = (0..listings.len()).collect();
    let texts: Vec<&str> = listings.iter().map(|l| l.amenities.as_str()).collect();
    let columns = vocabulary.iter().map(str::to_string).collect();
    let full = IndicatorMatrix::from_substring_matches(keys, &texts, columns);
    log::debug!(
        "{:<32}{:<32}",
        "amenity vocabulary",
        format!("{} tokens, keeping {}", full.ncols(), top.min(full.ncols()))
    );
    full.top_columns(top)
}
