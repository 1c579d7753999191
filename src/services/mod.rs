//! Storage adapters and the rating aggregator.

pub mod blob_store;
pub mod metadata_store;
pub mod rating_aggregator;
