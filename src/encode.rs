//! Categorical encoding with explicitly captured vocabularies.
//!
//! Fitted vocabularies are returned to the caller and re-applied explicitly;
//! re-encoding new data with a captured vocabulary is deterministic.

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A fitted category-to-integer mapping for one column.
///
/// Categories are held in sorted order, so the vocabulary is independent of
/// row order; a category's code is its position in that order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelVocabulary {
    column: String,
    categories: Vec<String>,
}

impl LabelVocabulary {
    /// Fit a vocabulary over the distinct values of a column.
    pub fn fit<'a>(column: &str, values: impl IntoIterator<Item = &'a str>) -> Self {
        let distinct: BTreeSet<&str> = values.into_iter().collect();
        Self {
            column: column.to_string(),
            categories: distinct.into_iter().map(str::to_string).collect(),
        }
    }

    /// Encode one value. Unseen categories fail rather than producing an
    /// out-of-range code.
    pub fn encode(&self, value: &str) -> Result<i64> {
        self.categories
            .binary_search_by(|category| category.as_str().cmp(value))
            .map(|code| code as i64)
            .map_err(|_| PipelineError::UnknownCategory {
                column: self.column.clone(),
                value: value.to_string(),
            })
    }

    /// Recover the category string for a code.
    pub fn decode(&self, code: i64) -> Option<&str> {
        usize::try_from(code)
            .ok()
            .and_then(|idx| self.categories.get(idx))
            .map(String::as_str)
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// A fitted one-hot encoding for one column.
///
/// The first category in sorted order is the dropped reference level; rows
/// holding it read as all-false indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoding {
    column: String,
    categories: Vec<String>,
}

impl OneHotEncoding {
    /// Fit over the distinct values of a column.
    pub fn fit<'a>(column: &str, values: impl IntoIterator<Item = &'a str>) -> Self {
        let distinct: BTreeSet<&str> = values.into_iter().collect();
        Self {
            column: column.to_string(),
            categories: distinct.into_iter().map(str::to_string).collect(),
        }
    }

    /// The dropped reference category, if the column had any values.
    pub fn reference(&self) -> Option<&str> {
        self.categories.first().map(String::as_str)
    }

    /// Names of the indicator columns, `{column}_{category}` for every
    /// category after the reference. The prefix keeps names collision-free
    /// across source columns with overlapping category sets.
    pub fn output_columns(&self) -> Vec<String> {
        self.categories
            .iter()
            .skip(1)
            .map(|category| format!("{}_{}", self.column, category))
            .collect()
    }

    /// Indicator values for one input, aligned with [`Self::output_columns`].
    pub fn encode(&self, value: &str) -> Result<Vec<f64>> {
        if !self.categories.iter().any(|c| c == value) {
            return Err(PipelineError::UnknownCategory {
                column: self.column.clone(),
                value: value.to_string(),
            });
        }
        Ok(self
            .categories
            .iter()
            .skip(1)
            .map(|category| if category == value { 1.0 } else { 0.0 })
            .collect())
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_codes_follow_sorted_order() {
        let vocab = LabelVocabulary::fit("browser", ["Safari", "Chrome", "IE", "Chrome"]);

        assert_eq!(vocab.len(), 3);
        assert_eq!(vocab.encode("Chrome").unwrap(), 0);
        assert_eq!(vocab.encode("IE").unwrap(), 1);
        assert_eq!(vocab.encode("Safari").unwrap(), 2);
    }

    #[test]
    fn test_label_round_trip() {
        let values = ["SEO", "Ads", "Direct", "SEO"];
        let vocab = LabelVocabulary::fit("source", values);

        for value in values {
            let code = vocab.encode(value).unwrap();
            assert_eq!(vocab.decode(code), Some(value));
        }
        assert_eq!(vocab.decode(99), None);
    }

    #[test]
    fn test_label_unknown_category() {
        let vocab = LabelVocabulary::fit("source", ["SEO", "Ads"]);
        let err = vocab.encode("Direct").unwrap_err();
        assert!(matches!(err, PipelineError::UnknownCategory { .. }));
    }

    #[test]
    fn test_one_hot_drops_first_category() {
        let encoding = OneHotEncoding::fit("browser", ["Safari", "Chrome", "IE"]);

        assert_eq!(encoding.reference(), Some("Chrome"));
        assert_eq!(
            encoding.output_columns(),
            vec!["browser_IE".to_string(), "browser_Safari".to_string()]
        );

        assert_eq!(encoding.encode("Chrome").unwrap(), vec![0.0, 0.0]);
        assert_eq!(encoding.encode("IE").unwrap(), vec![1.0, 0.0]);
        assert_eq!(encoding.encode("Safari").unwrap(), vec![0.0, 1.0]);
    }

    #[test]
    fn test_one_hot_unknown_category() {
        let encoding = OneHotEncoding::fit("browser", ["Chrome", "IE"]);
        assert!(encoding.encode("Opera").is_err());
    }

    #[test]
    fn test_one_hot_names_disambiguate_source_columns() {
        let sex = OneHotEncoding::fit("sex", ["F", "M"]);
        let grade = OneHotEncoding::fit("grade", ["F", "M", "P"]);

        assert_eq!(sex.output_columns(), vec!["sex_M".to_string()]);
        assert_eq!(
            grade.output_columns(),
            vec!["grade_M".to_string(), "grade_P".to_string()]
        );
    }
}
