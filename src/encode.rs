//! Indicator (one-hot) matrices keyed by subset row

use ndarray::{Array2, Axis};

/// Listing × token 0/1 matrix. Each row carries the listing's position in
/// its neighbourhood subset as a key, so the matrix joins into a feature
/// table by key whatever order its rows end up in.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorMatrix {
    pub keys: Vec<usize>,
    pub columns: Vec<String>,
    pub values: Array2<f64>,
}

impl IndicatorMatrix {
    /// Build by substring containment: cell `(i, j)` is 1 iff `columns[j]`
    /// occurs in `texts[i]`.
    pub fn from_substring_matches(keys: Vec<usize>, texts: &[&str], columns: Vec<String>) -> Self {
        let mut values = Array2::zeros((texts.len(), columns.len()));
        for (i, text) in texts.iter().enumerate() {
            for (j, token) in columns.iter().enumerate() {
                if text.contains(token.as_str()) {
                    values[[i, j]] = 1.0;
                }
            }
        }
        Self {
            keys,
            columns,
            values,
        }
    }

    pub fn nrows(&self) -> usize {
        self.values.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.values.ncols()
    }

    /// Number of listings each column fires for.
    pub fn column_counts(&self) -> Vec<f64> {
        self.values.sum_axis(Axis(0)).to_vec()
    }

    /// Keep the `n` columns with the highest counts, ordered by descending
    /// count. Equal counts keep their current column order.
    pub fn top_columns(&self, n: usize) -> Self {
        let counts = self.column_counts();
        let mut order: Vec<usize> = (0..counts.len()).collect();
        order.sort_by(|&a, &b| counts[b].total_cmp(&counts[a]));
        order.truncate(n);
        self.select(&order)
    }

    pub fn select(&self, indices: &[usize]) -> Self {
        Self {
            keys: self.keys.clone(),
            columns: indices.iter().map(|&i| self.columns[i].clone()).collect(),
            values: self.values.select(Axis(1), indices),
        }
    }

    /// Prefix every column name, e.g. `room_type:`.
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.columns = self
            .columns
            .into_iter()
            .map(|c| format!("{}:{}", prefix, c))
            .collect();
        self
    }
}

/// One-hot encode a categorical field.
///
/// Columns are the distinct non-missing values in order of first appearance.
/// Matching is by substring, so a value contained in another value's name
/// fires for both. Missing values match nothing.
pub fn encode_categorical(keys: Vec<usize>, values: &[Option<&str>]) -> IndicatorMatrix {
    let mut distinct: Vec<String> = Vec::new();
    for value in values.iter().flatten() {
        if !distinct.iter().any(|d| d == value) {
            distinct.push(value.to_string());
        }
    }
    let texts: Vec<&str> = values.iter().map(|v| v.unwrap_or("")).collect();
    IndicatorMatrix::from_substring_matches(keys, &texts, distinct)
}
