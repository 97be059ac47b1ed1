//! Type definitions for the feature pipeline

pub mod event;
pub mod table;

pub use event::{CleanEvent, EnrichedEvent, FeatureRecord, RawEvent};
pub use table::FeatureTable;
