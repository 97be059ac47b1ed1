//! CSV ingestion and export
//!
//! Loads the raw event and IP-range datasets and writes the encoded feature
//! table. Header validation happens here, before the pipeline runs: a missing
//! required column aborts the run with a schema error.

use crate::error::PipelineError;
use crate::geo::IpRange;
use crate::types::event::RawEvent;
use crate::types::table::FeatureTable;
use anyhow::{Context, Result};
use csv::{Reader, Writer};
use serde::Deserialize;
use std::fs::File;
use std::path::Path;

/// Columns the raw event dataset must carry.
const REQUIRED_EVENT_COLUMNS: [&str; 11] = [
    "user_id",
    "signup_time",
    "purchase_time",
    "purchase_value",
    "device_id",
    "source",
    "browser",
    "sex",
    "age",
    "ip_address",
    "class",
];

/// Columns the IP-range dataset must carry.
const REQUIRED_RANGE_COLUMNS: [&str; 3] =
    ["lower_bound_ip_address", "upper_bound_ip_address", "country"];

/// Range bounds arrive as floats in the source dataset; truncate to integers.
#[derive(Debug, Deserialize)]
struct IpRangeRow {
    lower_bound_ip_address: f64,
    upper_bound_ip_address: f64,
    country: String,
}

/// Loader for the pipeline's CSV datasets
pub struct DatasetLoader;

impl DatasetLoader {
    /// Load raw events from a CSV file
    pub fn load_events<P: AsRef<Path>>(path: P) -> Result<Vec<RawEvent>> {
        let file = File::open(&path)
            .with_context(|| format!("Failed to open file: {:?}", path.as_ref()))?;

        let mut reader = Reader::from_reader(file);
        validate_headers(&mut reader, &REQUIRED_EVENT_COLUMNS)?;

        let mut events = Vec::new();
        for result in reader.deserialize() {
            let event: RawEvent = result.context("Failed to parse event row")?;
            events.push(event);
        }

        Ok(events)
    }

    /// Load IP-to-country ranges from a CSV file
    pub fn load_ip_ranges<P: AsRef<Path>>(path: P) -> Result<Vec<IpRange>> {
        let file = File::open(&path)
            .with_context(|| format!("Failed to open file: {:?}", path.as_ref()))?;

        let mut reader = Reader::from_reader(file);
        validate_headers(&mut reader, &REQUIRED_RANGE_COLUMNS)?;

        let mut ranges = Vec::new();
        for result in reader.deserialize() {
            let row: IpRangeRow = result.context("Failed to parse IP range row")?;
            ranges.push(IpRange::new(
                row.lower_bound_ip_address.trunc() as u64,
                row.upper_bound_ip_address.trunc() as u64,
                row.country,
            ));
        }

        Ok(ranges)
    }

    /// Write the encoded feature table to a CSV file
    pub fn save_feature_table<P: AsRef<Path>>(table: &FeatureTable, path: P) -> Result<()> {
        let file = File::create(&path)
            .with_context(|| format!("Failed to create file: {:?}", path.as_ref()))?;

        let mut writer = Writer::from_writer(file);
        writer.write_record(table.columns())?;
        for row in table.rows() {
            writer.write_record(row.iter().map(|v| v.to_string()))?;
        }

        writer.flush()?;
        Ok(())
    }
}

fn validate_headers(reader: &mut Reader<File>, required: &[&str]) -> Result<()> {
    let headers = reader.headers().context("Failed to read CSV headers")?;
    for column in required {
        if !headers.iter().any(|h| h == *column) {
            return Err(PipelineError::Schema {
                column: column.to_string(),
            }
            .into());
        }
    }
    Ok(())
}
