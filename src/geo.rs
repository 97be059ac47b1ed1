//! IP-to-country enrichment via sorted interval lookup.

use crate::types::event::{CleanEvent, EnrichedEvent};
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use tracing::debug;

/// One `[lower_bound, upper_bound] -> country` interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpRange {
    pub lower_bound: u64,
    pub upper_bound: u64,
    pub country: String,
}

impl IpRange {
    pub fn new(lower_bound: u64, upper_bound: u64, country: impl Into<String>) -> Self {
        Self {
            lower_bound,
            upper_bound,
            country: country.into(),
        }
    }
}

/// Address ranges sorted ascending by lower bound, read-only after
/// construction and shareable across enrichment calls.
#[derive(Debug, Clone)]
pub struct IpRangeTable {
    ranges: Vec<IpRange>,
}

impl IpRangeTable {
    pub fn new(mut ranges: Vec<IpRange>) -> Self {
        // Stable sort keeps first-encountered order within equal lower bounds.
        ranges.sort_by_key(|r| r.lower_bound);
        Self { ranges }
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Resolve the country containing `key`, if any.
    ///
    /// Two steps, both required: match the interval with the largest
    /// `lower_bound <= key`, then accept only if `key <= upper_bound`. A
    /// nearest-lower-bound match alone would assign out-of-range keys to the
    /// neighboring interval. Equal lower bounds resolve to the first interval
    /// in sorted order.
    pub fn lookup(&self, key: u64) -> Option<&str> {
        let idx = self.ranges.partition_point(|r| r.lower_bound <= key);
        if idx == 0 {
            return None;
        }

        let mut i = idx - 1;
        while i > 0 && self.ranges[i - 1].lower_bound == self.ranges[i].lower_bound {
            i -= 1;
        }

        let candidate = &self.ranges[i];
        if key <= candidate.upper_bound {
            Some(&candidate.country)
        } else {
            None
        }
    }
}

/// Convert an address token to its unsigned integer key.
///
/// Accepts dotted-quad IPv4 text, plain integers, and float text (the source
/// dataset stores some addresses in float form); floats truncate.
pub fn ip_to_int(token: &str) -> Option<u64> {
    let trimmed = token.trim();
    if let Ok(addr) = trimmed.parse::<Ipv4Addr>() {
        return Some(u64::from(u32::from(addr)));
    }
    if let Ok(n) = trimmed.parse::<u64>() {
        return Some(n);
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        if f.is_finite() && f >= 0.0 {
            return Some(f.trunc() as u64);
        }
    }
    None
}

/// Result of the enrichment stage.
#[derive(Debug)]
pub struct EnrichOutcome {
    pub events: Vec<EnrichedEvent>,
    /// Keys that fell outside every interval.
    pub unresolved: u64,
    /// Address tokens that could not be converted to an integer key; the rows
    /// are kept with an unresolved country.
    pub unparseable: u64,
}

/// Attach a country to each event. The join is pure; rows are never dropped.
pub fn enrich(events: Vec<CleanEvent>, ranges: &IpRangeTable) -> EnrichOutcome {
    let mut enriched = Vec::with_capacity(events.len());
    let mut unresolved = 0u64;
    let mut unparseable = 0u64;

    for event in events {
        let country = match ip_to_int(&event.ip_address) {
            Some(key) => {
                let country = ranges.lookup(key).map(str::to_string);
                if country.is_none() {
                    unresolved += 1;
                }
                country
            }
            None => {
                debug!(ip_address = %event.ip_address, "Address token not convertible to integer");
                unparseable += 1;
                None
            }
        };
        enriched.push(EnrichedEvent { event, country });
    }

    EnrichOutcome {
        events: enriched,
        unresolved,
        unparseable,
    }
}
