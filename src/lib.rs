//! Fraud Feature Pipeline Library
//!
//! A batch feature-engineering pipeline for e-commerce fraud detection:
//! normalizes raw transaction records, enriches them with countries via an
//! IP-range join, derives temporal and per-user aggregate features, and
//! encodes categoricals into a stable numeric feature table.

pub mod clean;
pub mod config;
pub mod encode;
pub mod error;
pub mod features;
pub mod geo;
pub mod loader;
pub mod pipeline;
pub mod report;
pub mod scale;
pub mod summary;
pub mod types;

pub use config::AppConfig;
pub use encode::{LabelVocabulary, OneHotEncoding};
pub use error::PipelineError;
pub use geo::{IpRange, IpRangeTable};
pub use loader::DatasetLoader;
pub use pipeline::{build_feature_table, FeatureConfig, PipelineOutput};
pub use report::RunReport;
pub use scale::{ScalerKind, ScalerParams};
pub use types::{CleanEvent, EnrichedEvent, FeatureRecord, FeatureTable, RawEvent};
