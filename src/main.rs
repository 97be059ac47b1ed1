//! Fraud Feature Pipeline - Main Entry Point
//!
//! Loads the raw event and IP-range datasets, runs the feature-engineering
//! pipeline, logs the run report and fraud summaries, and exports the
//! encoded feature table.

use anyhow::Result;
use fraud_feature_pipeline::{
    config::AppConfig, geo::IpRangeTable, loader::DatasetLoader, pipeline, summary,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Load configuration
    let config = AppConfig::load()?;

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("fraud_feature_pipeline={}", config.logging.level))
        }))
        .init();

    info!("Starting Fraud Feature Pipeline");
    info!(
        events = %config.data.events_path,
        ip_ranges = %config.data.ip_ranges_path,
        "Configuration loaded successfully"
    );

    // Load input datasets
    let raw_events = DatasetLoader::load_events(&config.data.events_path)?;
    info!(rows = raw_events.len(), "Loaded raw events");

    let ranges = IpRangeTable::new(DatasetLoader::load_ip_ranges(&config.data.ip_ranges_path)?);
    info!(ranges = ranges.len(), "Loaded IP-to-country ranges");

    // Run the pipeline
    let output = pipeline::build_feature_table(&raw_events, &ranges, &config.features)?;
    output.report.log_summary();

    // Fraud summaries for the reporting services
    let fraud = summary::fraud_summary(&output.records);
    info!(
        total_transactions = fraud.total_transactions,
        fraud_cases = fraud.fraud_cases,
        fraud_percentage = format!("{:.2}%", fraud.fraud_percentage),
        "Fraud summary"
    );
    info!(
        trend = %serde_json::to_string(&summary::fraud_by_day_of_week(&output.records))?,
        "Fraud cases by day of week"
    );
    info!(
        browsers = %serde_json::to_string(&summary::fraud_by_browser(&output.records))?,
        "Fraud cases by browser"
    );

    // Export the feature table
    DatasetLoader::save_feature_table(&output.table, &config.data.output_path)?;
    info!(
        rows = output.table.len(),
        columns = output.table.columns().len(),
        path = %config.data.output_path,
        "Feature table written"
    );

    Ok(())
}
