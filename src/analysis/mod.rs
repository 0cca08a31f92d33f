//! CSV ingestion and aggregation.

pub mod aggregator;

pub use aggregator::aggregate;
