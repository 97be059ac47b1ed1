//! Derived feature computation: temporal and per-entity aggregates.

pub mod aggregate;
pub mod temporal;

use crate::types::event::{EnrichedEvent, FeatureRecord};

/// Attach the derived numeric columns to each enriched event.
pub fn build_feature_records(events: Vec<EnrichedEvent>) -> Vec<FeatureRecord> {
    let aggregates = aggregate::entity_aggregates(&events);

    events
        .into_iter()
        .zip(aggregates)
        .map(|(enriched, agg)| {
            let purchase_time = enriched.event.purchase_time;
            FeatureRecord {
                event: enriched.event,
                country: enriched.country,
                transaction_count: agg.transaction_count,
                time_since_last_transaction: agg.time_since_last_transaction,
                hour_of_day: temporal::hour_of_day(purchase_time),
                day_of_week: temporal::day_of_week(purchase_time),
            }
        })
        .collect()
}
