use serde::{Deserialize, Serialize};

use super::EncodingError;

/// Categories learned for one input column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedColumn {
    pub name: String,
    /// Sorted, de-duplicated category labels.
    pub categories: Vec<String>,
}

/// One-hot encoder with ignore-unknown semantics.
///
/// Unseen categories encode to an all-zero block rather than failing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    pub columns: Vec<EncodedColumn>,
}

impl OneHotEncoder {
    /// Learn the sorted category set of each column from `rows`.
    ///
    /// Every row must hold one value per column, in column order.
    pub fn fit<R, S>(columns: &[&str], rows: &[R]) -> Result<Self, EncodingError>
    where
        R: AsRef<[S]>,
        S: AsRef<str>,
    {
        let mut categories: Vec<Vec<String>> = vec![Vec::new(); columns.len()];
        for row in rows {
            let row = row.as_ref();
            if row.len() != columns.len() {
                return Err(EncodingError::Arity {
                    expected: columns.len(),
                    found: row.len(),
                });
            }
            for (slot, value) in categories.iter_mut().zip(row) {
                slot.push(value.as_ref().to_string());
            }
        }

        let mut encoded = Vec::with_capacity(columns.len());
        for (name, mut values) in columns.iter().zip(categories) {
            values.sort();
            values.dedup();
            if values.is_empty() {
                return Err(EncodingError::NoCategories((*name).to_string()));
            }
            encoded.push(EncodedColumn {
                name: (*name).to_string(),
                categories: values,
            });
        }
        Ok(Self { columns: encoded })
    }

    /// Names of the indicator columns, `<column>_<category>`, in output order.
    pub fn feature_names_out(&self) -> Vec<String> {
        self.columns
            .iter()
            .flat_map(|column| {
                column
                    .categories
                    .iter()
                    .map(move |category| format!("{}_{}", column.name, category))
            })
            .collect()
    }

    /// Number of indicator columns produced per row.
    pub fn output_len(&self) -> usize {
        self.columns.iter().map(|c| c.categories.len()).sum()
    }

    /// Encode one row of categorical values into indicator values.
    pub fn transform<S: AsRef<str>>(&self, row: &[S]) -> Result<Vec<f64>, EncodingError> {
        if row.len() != self.columns.len() {
            return Err(EncodingError::Arity {
                expected: self.columns.len(),
                found: row.len(),
            });
        }
        let mut out = Vec::with_capacity(self.output_len());
        for (column, value) in self.columns.iter().zip(row) {
            let value = value.as_ref();
            out.extend(
                column
                    .categories
                    .iter()
                    .map(|category| if category == value { 1.0 } else { 0.0 }),
            );
        }
        Ok(out)
    }

    /// Validate structural invariants after deserializing.
    pub fn validate(&self) -> Result<(), EncodingError> {
        for column in &self.columns {
            if column.categories.is_empty() {
                return Err(EncodingError::NoCategories(column.name.clone()));
            }
            if column.categories.windows(2).any(|pair| pair[0] >= pair[1]) {
                return Err(EncodingError::UnsortedCategories(column.name.clone()));
            }
        }
        Ok(())
    }
}
