//! Per-run counters surfaced to the caller alongside the feature table.

use crate::error::PipelineError;
use serde::Serialize;
use tracing::info;

/// One excluded row and why it was dropped.
#[derive(Debug, Clone, Serialize)]
pub struct RowExclusion {
    pub row: usize,
    pub column: String,
    pub value: String,
    pub reason: String,
}

/// Counters accumulated across a pipeline run.
///
/// Per-row coercion failures land here instead of aborting the run;
/// structural errors never reach a report because no partial table is
/// returned.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub rows_in: u64,
    pub duplicates_removed: u64,
    pub rows_excluded: u64,
    pub exclusions: Vec<RowExclusion>,
    pub unparseable_addresses: u64,
    pub unresolved_addresses: u64,
    pub rows_out: u64,
}

impl RunReport {
    /// Record a coercion failure for an excluded row.
    pub fn record_exclusion(&mut self, error: &PipelineError) {
        self.rows_excluded += 1;
        if let PipelineError::Type {
            row,
            column,
            value,
            ..
        } = error
        {
            self.exclusions.push(RowExclusion {
                row: *row,
                column: column.to_string(),
                value: value.clone(),
                reason: error.to_string(),
            });
        }
    }

    /// Emit the run summary through structured logging.
    pub fn log_summary(&self) {
        info!(
            rows_in = self.rows_in,
            duplicates_removed = self.duplicates_removed,
            rows_excluded = self.rows_excluded,
            unparseable_addresses = self.unparseable_addresses,
            unresolved_addresses = self.unresolved_addresses,
            rows_out = self.rows_out,
            "Pipeline run summary"
        );
        for exclusion in &self.exclusions {
            info!(
                row = exclusion.row,
                column = %exclusion.column,
                value = %exclusion.value,
                "Excluded row"
            );
        }
    }
}
