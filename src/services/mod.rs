/// OpenAPI documentation generation.
pub mod documentation;
/// Chronological event feed reads.
pub mod event_feed;
/// Health check service.
pub mod health_service;
/// Match creation and every live mutation.
pub mod match_service;
/// Listing filters and dashboard buckets.
pub mod query_engine;
/// Share-code resolution for anonymous viewers.
pub mod share_resolver;
/// Storage connection supervisor with backoff.
pub mod storage_supervisor;
