//! Per-entity aggregate features: transaction counts and velocity.

use crate::types::event::EnrichedEvent;
use std::collections::HashMap;

/// Aggregate values for one row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityAggregates {
    /// Total rows sharing the row's `user_id`.
    pub transaction_count: u64,
    /// Seconds since the entity's previous purchase in time order; exactly
    /// 0.0 for the entity's earliest event. Not clamped: anomalous data may
    /// surface as a negative delta and is kept as-is.
    pub time_since_last_transaction: f64,
}

/// Group row positions by entity key, preserving table order within groups.
fn group_index(events: &[EnrichedEvent]) -> HashMap<&str, Vec<usize>> {
    let mut groups: HashMap<&str, Vec<usize>> = HashMap::new();
    for (position, enriched) in events.iter().enumerate() {
        groups
            .entry(enriched.event.user_id.as_str())
            .or_default()
            .push(position);
    }
    groups
}

/// Compute per-row aggregates, aligned with the input row order.
///
/// Within each group rows are scanned in purchase-time order (ties broken by
/// original position, so repeated runs are identical) and the count is
/// broadcast to every member row.
pub fn entity_aggregates(events: &[EnrichedEvent]) -> Vec<EntityAggregates> {
    let mut aggregates = vec![
        EntityAggregates {
            transaction_count: 0,
            time_since_last_transaction: 0.0,
        };
        events.len()
    ];

    for positions in group_index(events).into_values() {
        let count = positions.len() as u64;

        let mut ordered = positions;
        ordered.sort_by_key(|&i| (events[i].event.purchase_time, i));

        let mut previous: Option<chrono::NaiveDateTime> = None;
        for &i in &ordered {
            let ts = events[i].event.purchase_time;
            let delta = match previous {
                Some(prev) => (ts - prev).num_milliseconds() as f64 / 1000.0,
                None => 0.0,
            };
            aggregates[i] = EntityAggregates {
                transaction_count: count,
                time_since_last_transaction: delta,
            };
            previous = Some(ts);
        }
    }

    aggregates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::event::CleanEvent;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(seconds: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2015, 3, 9)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
            + chrono::Duration::seconds(seconds as i64)
    }

    fn event(user_id: &str, purchase_time: NaiveDateTime, value: f64) -> EnrichedEvent {
        EnrichedEvent {
            event: CleanEvent {
                user_id: user_id.to_string(),
                device_id: "d1".to_string(),
                source: "SEO".to_string(),
                browser: "Chrome".to_string(),
                sex: "M".to_string(),
                age: 30,
                ip_address: "1.2.3.4".to_string(),
                signup_time: purchase_time,
                purchase_time,
                purchase_value: value,
                is_fraud: false,
            },
            country: None,
        }
    }

    #[test]
    fn test_out_of_order_events_sorted_before_deltas() {
        // U1 at T, T+60, T+30 in table order: time-sorted deltas are
        // [0, 30, 30], not [0, 60, 30].
        let events = vec![
            event("U1", at(0), 10.0),
            event("U1", at(60), 20.0),
            event("U1", at(30), 30.0),
        ];

        let aggregates = entity_aggregates(&events);

        assert!(aggregates.iter().all(|a| a.transaction_count == 3));
        assert_eq!(aggregates[0].time_since_last_transaction, 0.0);
        assert_eq!(aggregates[1].time_since_last_transaction, 30.0);
        assert_eq!(aggregates[2].time_since_last_transaction, 30.0);
    }

    #[test]
    fn test_single_event_entity() {
        let events = vec![event("U1", at(0), 10.0)];
        let aggregates = entity_aggregates(&events);

        assert_eq!(aggregates[0].transaction_count, 1);
        assert_eq!(aggregates[0].time_since_last_transaction, 0.0);
    }

    #[test]
    fn test_count_broadcast_across_groups() {
        let events = vec![
            event("U1", at(0), 10.0),
            event("U2", at(5), 10.0),
            event("U1", at(10), 10.0),
        ];
        let aggregates = entity_aggregates(&events);

        assert_eq!(aggregates[0].transaction_count, 2);
        assert_eq!(aggregates[1].transaction_count, 1);
        assert_eq!(aggregates[2].transaction_count, 2);
        assert_eq!(aggregates[2].time_since_last_transaction, 10.0);
    }

    #[test]
    fn test_equal_timestamps_tie_break_by_position() {
        let events = vec![event("U1", at(0), 1.0), event("U1", at(0), 2.0)];
        let aggregates = entity_aggregates(&events);

        // Earliest row keeps the sentinel; the tied follower sees a zero gap.
        assert_eq!(aggregates[0].time_since_last_transaction, 0.0);
        assert_eq!(aggregates[1].time_since_last_transaction, 0.0);
        assert!(aggregates.iter().all(|a| a.transaction_count == 2));
    }
}
