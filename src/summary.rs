//! Pre-aggregated fraud summaries consumed by the reporting services.

use crate::types::event::FeatureRecord;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Headline counts over a feature table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FraudSummary {
    pub total_transactions: u64,
    pub fraud_cases: u64,
    pub fraud_percentage: f64,
}

/// Total/fraud counts and fraud percentage; zero on an empty table.
pub fn fraud_summary(records: &[FeatureRecord]) -> FraudSummary {
    let total_transactions = records.len() as u64;
    let fraud_cases = records.iter().filter(|r| r.event.is_fraud).count() as u64;
    let fraud_percentage = if total_transactions > 0 {
        fraud_cases as f64 / total_transactions as f64 * 100.0
    } else {
        0.0
    };
    FraudSummary {
        total_transactions,
        fraud_cases,
        fraud_percentage,
    }
}

/// Fraud-row counts keyed by day of week (Monday = 0), ordered.
pub fn fraud_by_day_of_week(records: &[FeatureRecord]) -> BTreeMap<u32, u64> {
    let mut counts = BTreeMap::new();
    for record in records.iter().filter(|r| r.event.is_fraud) {
        *counts.entry(record.day_of_week).or_insert(0) += 1;
    }
    counts
}

/// Fraud-row counts keyed by device identifier.
pub fn fraud_by_device(records: &[FeatureRecord]) -> HashMap<String, u64> {
    let mut counts = HashMap::new();
    for record in records.iter().filter(|r| r.event.is_fraud) {
        *counts.entry(record.event.device_id.clone()).or_insert(0) += 1;
    }
    counts
}

/// Fraud-row counts keyed by browser.
pub fn fraud_by_browser(records: &[FeatureRecord]) -> HashMap<String, u64> {
    let mut counts = HashMap::new();
    for record in records.iter().filter(|r| r.event.is_fraud) {
        *counts.entry(record.event.browser.clone()).or_insert(0) += 1;
    }
    counts
}
