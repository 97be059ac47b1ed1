//! Record normalization: duplicate removal and type coercion.

use crate::error::PipelineError;
use crate::types::event::{CleanEvent, RawEvent};
use chrono::NaiveDateTime;
use std::collections::HashSet;
use tracing::warn;

/// Timestamp formats accepted for signup/purchase times. The source datasets
/// carry the first form; the second covers ISO-8601 output of serde round trips.
const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

/// Result of the normalization stage.
///
/// Rows that fail coercion are excluded and their errors collected; they are
/// never silently zeroed, so aggregate statistics stay uncorrupted.
#[derive(Debug)]
pub struct CleanOutcome {
    pub events: Vec<CleanEvent>,
    pub duplicates_removed: u64,
    pub exclusions: Vec<PipelineError>,
}

/// Normalize raw rows into the canonical typed schema.
///
/// Exact-duplicate rows (all columns equal) are dropped keeping the first
/// occurrence, then each surviving row is coerced independently.
pub fn clean(raw: &[RawEvent]) -> CleanOutcome {
    let mut seen: HashSet<&RawEvent> = HashSet::with_capacity(raw.len());
    let mut events = Vec::with_capacity(raw.len());
    let mut duplicates_removed = 0u64;
    let mut exclusions = Vec::new();

    for (row, event) in raw.iter().enumerate() {
        if !seen.insert(event) {
            duplicates_removed += 1;
            continue;
        }

        match coerce(row, event) {
            Ok(clean) => events.push(clean),
            Err(err) => {
                warn!(row, error = %err, "Excluding row that failed coercion");
                exclusions.push(err);
            }
        }
    }

    CleanOutcome {
        events,
        duplicates_removed,
        exclusions,
    }
}

fn coerce(row: usize, event: &RawEvent) -> Result<CleanEvent, PipelineError> {
    let signup_time = parse_timestamp(row, "signup_time", &event.signup_time)?;
    let purchase_time = parse_timestamp(row, "purchase_time", &event.purchase_time)?;
    let age = parse_age(row, &event.age)?;
    let purchase_value = event.purchase_value.trim().parse::<f64>().map_err(|_| {
        PipelineError::Type {
            row,
            column: "purchase_value",
            value: event.purchase_value.clone(),
            expected: "float",
        }
    })?;
    let is_fraud = parse_label(row, &event.label)?;

    Ok(CleanEvent {
        user_id: event.user_id.clone(),
        device_id: event.device_id.clone(),
        source: event.source.clone(),
        browser: event.browser.clone(),
        sex: event.sex.clone(),
        age,
        ip_address: event.ip_address.clone(),
        signup_time,
        purchase_time,
        purchase_value,
        is_fraud,
    })
}

fn parse_timestamp(
    row: usize,
    column: &'static str,
    value: &str,
) -> Result<NaiveDateTime, PipelineError> {
    let trimmed = value.trim();
    for format in TIMESTAMP_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(ts);
        }
    }
    Err(PipelineError::Type {
        row,
        column,
        value: value.to_string(),
        expected: "timestamp",
    })
}

/// Ages arrive as integers but occasionally as float text; fractional values
/// truncate toward zero, matching an integer cast in the source system.
fn parse_age(row: usize, value: &str) -> Result<i64, PipelineError> {
    let trimmed = value.trim();
    if let Ok(age) = trimmed.parse::<i64>() {
        return Ok(age);
    }
    if let Ok(age) = trimmed.parse::<f64>() {
        if age.is_finite() {
            return Ok(age.trunc() as i64);
        }
    }
    Err(PipelineError::Type {
        row,
        column: "age",
        value: value.to_string(),
        expected: "integer",
    })
}

fn parse_label(row: usize, value: &str) -> Result<bool, PipelineError> {
    match value.trim() {
        "1" | "1.0" => Ok(true),
        "0" | "0.0" => Ok(false),
        _ => Err(PipelineError::Type {
            row,
            column: "class",
            value: value.to_string(),
            expected: "binary label",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_event(user_id: &str, age: &str, purchase_value: &str) -> RawEvent {
        RawEvent {
            user_id: user_id.to_string(),
            signup_time: "2015-02-24 22:55:49".to_string(),
            purchase_time: "2015-04-18 02:47:11".to_string(),
            purchase_value: purchase_value.to_string(),
            device_id: "QVPSPJUOCKZAR".to_string(),
            source: "SEO".to_string(),
            browser: "Chrome".to_string(),
            sex: "M".to_string(),
            age: age.to_string(),
            ip_address: "732758368.8".to_string(),
            label: "0".to_string(),
        }
    }

    #[test]
    fn test_coercion() {
        let outcome = clean(&[raw_event("u1", "39", "34.5")]);

        assert_eq!(outcome.events.len(), 1);
        let event = &outcome.events[0];
        assert_eq!(event.age, 39);
        assert_eq!(event.purchase_value, 34.5);
        assert!(!event.is_fraud);
        assert_eq!(event.purchase_time.to_string(), "2015-04-18 02:47:11");
    }

    #[test]
    fn test_duplicates_keep_first() {
        let row = raw_event("u1", "39", "34");
        let outcome = clean(&[row.clone(), row.clone(), row]);

        assert_eq!(outcome.events.len(), 1);
        assert_eq!(outcome.duplicates_removed, 2);
    }

    #[test]
    fn test_bad_rows_excluded_not_zeroed() {
        let rows = vec![
            raw_event("u1", "39", "34"),
            raw_event("u2", "not-a-number", "34"),
            raw_event("u3", "41", "nope"),
        ];
        let outcome = clean(&rows);

        assert_eq!(outcome.events.len(), 1);
        assert_eq!(outcome.exclusions.len(), 2);
        assert!(matches!(
            outcome.exclusions[0],
            PipelineError::Type { column: "age", .. }
        ));
        assert!(matches!(
            outcome.exclusions[1],
            PipelineError::Type {
                column: "purchase_value",
                ..
            }
        ));
    }

    #[test]
    fn test_float_age_truncates() {
        let outcome = clean(&[raw_event("u1", "39.7", "34")]);
        assert_eq!(outcome.events[0].age, 39);
    }
}
