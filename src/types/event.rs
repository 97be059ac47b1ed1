//! Event records for each pipeline stage.
//!
//! Every stage consumes one record type and produces the next; rows are
//! immutable values and no stage mutates its input in place.

use crate::error::{PipelineError, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Category assigned when no address range contains a record's IP key.
pub const UNRESOLVED_COUNTRY: &str = "unknown";

/// Numeric columns exposed by a [`FeatureRecord`], in canonical order.
pub const NUMERIC_COLUMNS: [&str; 6] = [
    "purchase_value",
    "age",
    "transaction_count",
    "time_since_last_transaction",
    "hour_of_day",
    "day_of_week",
];

/// Categorical columns exposed by a [`FeatureRecord`].
pub const CATEGORICAL_COLUMNS: [&str; 6] =
    ["user_id", "device_id", "source", "browser", "sex", "country"];

/// A raw transaction/signup row exactly as loaded, all fields untyped text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RawEvent {
    /// Entity (account) identifier
    pub user_id: String,

    /// Account signup timestamp
    pub signup_time: String,

    /// Purchase timestamp
    pub purchase_time: String,

    /// Purchase amount
    pub purchase_value: String,

    /// Device identifier
    pub device_id: String,

    /// Acquisition channel (SEO, Ads, ...)
    pub source: String,

    /// Browser name
    pub browser: String,

    /// Customer sex
    pub sex: String,

    /// Customer age
    pub age: String,

    /// Network address token (dotted quad or numeric form)
    pub ip_address: String,

    /// Fraud label (1 = fraud, 0 = legitimate)
    #[serde(rename = "class")]
    pub label: String,
}

/// A normalized event with fixed column types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanEvent {
    pub user_id: String,
    pub device_id: String,
    pub source: String,
    pub browser: String,
    pub sex: String,
    pub age: i64,
    pub ip_address: String,

    /// Local calendar timestamps; no timezone conversion is applied anywhere.
    pub signup_time: NaiveDateTime,
    pub purchase_time: NaiveDateTime,

    pub purchase_value: f64,
    pub is_fraud: bool,
}

/// A clean event plus its resolved country (`None` = unresolved).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedEvent {
    pub event: CleanEvent,
    pub country: Option<String>,
}

/// An enriched event plus the derived numeric feature columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub event: CleanEvent,
    pub country: Option<String>,

    /// Total rows sharing this record's `user_id`, broadcast to every row.
    pub transaction_count: u64,

    /// Seconds since the entity's previous purchase; 0.0 for the first event.
    pub time_since_last_transaction: f64,

    /// Purchase hour, 0-23
    pub hour_of_day: u32,

    /// Purchase weekday, Monday = 0 .. Sunday = 6
    pub day_of_week: u32,
}

impl FeatureRecord {
    /// Look up a categorical column by name.
    ///
    /// Unresolved countries read as [`UNRESOLVED_COUNTRY`] so encoders see a
    /// real category rather than a missing value.
    pub fn categorical(&self, column: &str) -> Result<&str> {
        match column {
            "user_id" => Ok(&self.event.user_id),
            "device_id" => Ok(&self.event.device_id),
            "source" => Ok(&self.event.source),
            "browser" => Ok(&self.event.browser),
            "sex" => Ok(&self.event.sex),
            "country" => Ok(self.country.as_deref().unwrap_or(UNRESOLVED_COUNTRY)),
            _ => Err(PipelineError::ColumnNotFound {
                column: column.to_string(),
            }),
        }
    }

    /// Look up a numeric column by name.
    pub fn numeric(&self, column: &str) -> Result<f64> {
        match column {
            "purchase_value" => Ok(self.event.purchase_value),
            "age" => Ok(self.event.age as f64),
            "transaction_count" => Ok(self.transaction_count as f64),
            "time_since_last_transaction" => Ok(self.time_since_last_transaction),
            "hour_of_day" => Ok(self.hour_of_day as f64),
            "day_of_week" => Ok(self.day_of_week as f64),
            _ => Err(PipelineError::ColumnNotFound {
                column: column.to_string(),
            }),
        }
    }
}
