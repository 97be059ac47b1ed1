//! Pipeline orchestration: normalize, enrich, derive, encode.

use crate::clean;
use crate::encode::{LabelVocabulary, OneHotEncoding};
use crate::error::PipelineError;
use crate::features;
use crate::geo::{self, IpRangeTable};
use crate::report::RunReport;
use crate::scale::{ScalerKind, ScalerParams};
use crate::types::event::{FeatureRecord, RawEvent, CATEGORICAL_COLUMNS, NUMERIC_COLUMNS};
use crate::types::table::FeatureTable;
use anyhow::{bail, Result};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::info;

/// Per-column transform selection for the encoding stage.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeatureConfig {
    /// Categorical columns mapped to integer codes.
    #[serde(default)]
    pub label_columns: Vec<String>,
    /// Categorical columns expanded to indicator columns.
    #[serde(default)]
    pub one_hot_columns: Vec<String>,
    /// Numeric columns scaled to the unit interval.
    #[serde(default)]
    pub min_max_columns: Vec<String>,
    /// Numeric columns standardized to zero mean, unit deviation.
    #[serde(default)]
    pub z_score_columns: Vec<String>,
}

impl FeatureConfig {
    /// Reject contradictory or unknown column assignments.
    ///
    /// Min-max and z-score are mutually exclusive per column; every named
    /// column must exist in the feature record schema.
    pub fn validate(&self) -> Result<()> {
        for column in &self.min_max_columns {
            if self.z_score_columns.contains(column) {
                bail!("column `{column}` is assigned both min-max and z-score scaling");
            }
        }
        for column in self.min_max_columns.iter().chain(&self.z_score_columns) {
            if !NUMERIC_COLUMNS.contains(&column.as_str()) {
                return Err(PipelineError::ColumnNotFound {
                    column: column.clone(),
                }
                .into());
            }
        }
        for column in self.label_columns.iter().chain(&self.one_hot_columns) {
            if !CATEGORICAL_COLUMNS.contains(&column.as_str()) {
                return Err(PipelineError::ColumnNotFound {
                    column: column.clone(),
                }
                .into());
            }
        }
        Ok(())
    }

    fn scaler_kind(&self, column: &str) -> Option<ScalerKind> {
        if self.min_max_columns.iter().any(|c| c == column) {
            Some(ScalerKind::MinMax)
        } else if self.z_score_columns.iter().any(|c| c == column) {
            Some(ScalerKind::ZScore)
        } else {
            None
        }
    }
}

/// Everything a pipeline run produces.
#[derive(Debug)]
pub struct PipelineOutput {
    /// The terminal encoded table.
    pub table: FeatureTable,
    /// The feature records the table was encoded from, for consumers that
    /// aggregate over readable columns (summaries, trends).
    pub records: Vec<FeatureRecord>,
    /// Fitted label vocabularies, keyed by column.
    pub vocabularies: HashMap<String, LabelVocabulary>,
    /// Fitted one-hot encodings, keyed by column.
    pub one_hot: HashMap<String, OneHotEncoding>,
    /// Fitted scaler parameters, keyed by column.
    pub scalers: HashMap<String, ScalerParams>,
    /// Run counters and excluded-row detail.
    pub report: RunReport,
}

/// Run the full pipeline over a raw batch.
///
/// Stages run strictly in order, each producing a new table; a structural
/// error aborts the whole run and no partial table is returned.
pub fn build_feature_table(
    raw_events: &[RawEvent],
    ranges: &IpRangeTable,
    config: &FeatureConfig,
) -> Result<PipelineOutput> {
    config.validate()?;

    let mut report = RunReport {
        rows_in: raw_events.len() as u64,
        ..RunReport::default()
    };

    let cleaned = clean::clean(raw_events);
    report.duplicates_removed = cleaned.duplicates_removed;
    for error in &cleaned.exclusions {
        report.record_exclusion(error);
    }
    info!(
        rows = cleaned.events.len(),
        duplicates_removed = cleaned.duplicates_removed,
        excluded = cleaned.exclusions.len(),
        "Normalized raw events"
    );

    let enriched = geo::enrich(cleaned.events, ranges);
    report.unresolved_addresses = enriched.unresolved;
    report.unparseable_addresses = enriched.unparseable;
    info!(
        rows = enriched.events.len(),
        unresolved = enriched.unresolved,
        "Enriched events with countries"
    );

    let records = features::build_feature_records(enriched.events);
    report.rows_out = records.len() as u64;

    let (table, vocabularies, one_hot, scalers) = encode_records(&records, config)?;
    info!(
        rows = table.len(),
        columns = table.columns().len(),
        "Encoded feature table"
    );

    Ok(PipelineOutput {
        table,
        records,
        vocabularies,
        one_hot,
        scalers,
        report,
    })
}

type EncodedStage = (
    FeatureTable,
    HashMap<String, LabelVocabulary>,
    HashMap<String, OneHotEncoding>,
    HashMap<String, ScalerParams>,
);

/// Fit encoders/scalers over the records, then materialize the table with a
/// stable column order: numeric columns, label codes, one-hot indicators,
/// then the class label.
fn encode_records(records: &[FeatureRecord], config: &FeatureConfig) -> Result<EncodedStage> {
    let mut scalers = HashMap::new();
    for column in NUMERIC_COLUMNS {
        if let Some(kind) = config.scaler_kind(column) {
            let values = records
                .iter()
                .map(|r| r.numeric(column))
                .collect::<Result<Vec<f64>, _>>()?;
            scalers.insert(column.to_string(), ScalerParams::fit(kind, &values));
        }
    }

    let mut vocabularies = HashMap::new();
    for column in &config.label_columns {
        let values = records
            .iter()
            .map(|r| r.categorical(column))
            .collect::<Result<Vec<&str>, _>>()?;
        vocabularies.insert(column.clone(), LabelVocabulary::fit(column, values));
    }

    let mut one_hot = HashMap::new();
    for column in &config.one_hot_columns {
        let values = records
            .iter()
            .map(|r| r.categorical(column))
            .collect::<Result<Vec<&str>, _>>()?;
        one_hot.insert(column.clone(), OneHotEncoding::fit(column, values));
    }

    let mut columns: Vec<String> = NUMERIC_COLUMNS.iter().map(|c| c.to_string()).collect();
    columns.extend(config.label_columns.iter().cloned());
    for column in &config.one_hot_columns {
        columns.extend(one_hot[column].output_columns());
    }
    columns.push("class".to_string());

    let mut table = FeatureTable::new(columns);
    for record in records {
        let mut row = Vec::with_capacity(table.columns().len());

        for column in NUMERIC_COLUMNS {
            let value = record.numeric(column)?;
            row.push(match scalers.get(column) {
                Some(params) => params.apply(value),
                None => value,
            });
        }
        for column in &config.label_columns {
            let code = vocabularies[column].encode(record.categorical(column)?)?;
            row.push(code as f64);
        }
        for column in &config.one_hot_columns {
            row.extend(one_hot[column].encode(record.categorical(column)?)?);
        }
        row.push(if record.event.is_fraud { 1.0 } else { 0.0 });

        table.push_row(row);
    }

    Ok((table, vocabularies, one_hot, scalers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::IpRange;

    fn raw(
        user_id: &str,
        purchase_time: &str,
        value: &str,
        ip: &str,
        browser: &str,
        label: &str,
    ) -> RawEvent {
        RawEvent {
            user_id: user_id.to_string(),
            signup_time: "2015-01-01 00:00:00".to_string(),
            purchase_time: purchase_time.to_string(),
            purchase_value: value.to_string(),
            device_id: format!("dev-{user_id}"),
            source: "SEO".to_string(),
            browser: browser.to_string(),
            sex: "M".to_string(),
            age: "30".to_string(),
            ip_address: ip.to_string(),
            label: label.to_string(),
        }
    }

    fn ranges() -> IpRangeTable {
        IpRangeTable::new(vec![
            IpRange::new(1000, 2000, "A"),
            IpRange::new(3000, 6000, "B"),
        ])
    }

    fn config() -> FeatureConfig {
        FeatureConfig {
            label_columns: vec!["country".to_string()],
            one_hot_columns: vec!["browser".to_string()],
            min_max_columns: vec!["purchase_value".to_string()],
            z_score_columns: vec![],
        }
    }

    #[test]
    fn test_schema_is_stable_and_ordered() {
        let events = vec![
            raw("u1", "2015-03-09 12:00:00", "10", "1500", "Chrome", "0"),
            raw("u2", "2015-03-09 13:00:00", "20", "5000", "Safari", "1"),
        ];
        let output = build_feature_table(&events, &ranges(), &config()).unwrap();

        assert_eq!(
            output.table.columns(),
            &[
                "purchase_value",
                "age",
                "transaction_count",
                "time_since_last_transaction",
                "hour_of_day",
                "day_of_week",
                "country",
                "browser_Safari",
                "class",
            ]
        );
        assert_eq!(output.table.len(), 2);
    }

    #[test]
    fn test_rejects_conflicting_scaler_assignment() {
        let config = FeatureConfig {
            min_max_columns: vec!["age".to_string()],
            z_score_columns: vec!["age".to_string()],
            ..FeatureConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_unknown_columns() {
        let config = FeatureConfig {
            one_hot_columns: vec!["no_such_column".to_string()],
            ..FeatureConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::ColumnNotFound { .. })
        ));
    }

    #[test]
    fn test_enrichment_feeds_label_encoding() {
        let events = vec![
            raw("u1", "2015-03-09 12:00:00", "10", "1500", "Chrome", "0"),
            raw("u2", "2015-03-09 13:00:00", "20", "2500", "Chrome", "0"),
        ];
        let output = build_feature_table(&events, &ranges(), &config()).unwrap();

        let vocab = &output.vocabularies["country"];
        // Categories are sorted: "A" then the unresolved sentinel.
        assert_eq!(vocab.categories(), &["A", "unknown"]);
        assert_eq!(output.report.unresolved_addresses, 1);

        let codes = output.table.column_values("country").unwrap();
        assert_eq!(codes, vec![0.0, 1.0]);
    }

    #[test]
    fn test_min_max_applies_to_purchase_value() {
        let events = vec![
            raw("u1", "2015-03-09 12:00:00", "10", "1500", "Chrome", "0"),
            raw("u2", "2015-03-09 13:00:00", "30", "1500", "Chrome", "0"),
            raw("u3", "2015-03-09 14:00:00", "20", "1500", "Chrome", "1"),
        ];
        let output = build_feature_table(&events, &ranges(), &config()).unwrap();

        let scaled = output.table.column_values("purchase_value").unwrap();
        assert_eq!(scaled, vec![0.0, 1.0, 0.5]);
        assert!(output.scalers.contains_key("purchase_value"));
    }

    #[test]
    fn test_report_tracks_exclusions_and_duplicates() {
        let good = raw("u1", "2015-03-09 12:00:00", "10", "1500", "Chrome", "0");
        let events = vec![
            good.clone(),
            good,
            raw("u2", "2015-03-09 13:00:00", "bad", "1500", "Chrome", "0"),
        ];
        let output = build_feature_table(&events, &ranges(), &config()).unwrap();

        assert_eq!(output.report.rows_in, 3);
        assert_eq!(output.report.duplicates_removed, 1);
        assert_eq!(output.report.rows_excluded, 1);
        assert_eq!(output.report.rows_out, 1);
    }

    #[test]
    fn test_empty_input_yields_empty_table_with_schema() {
        let output = build_feature_table(&[], &ranges(), &config()).unwrap();

        assert!(output.table.is_empty());
        assert!(output.table.column_index("class").is_some());
        assert_eq!(output.report.rows_out, 0);
    }
}
