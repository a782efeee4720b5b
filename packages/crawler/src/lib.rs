// Same-origin-aware website crawler with bounded concurrency.
//
// One driver task owns the frontier (queue + visited/in-flight sets) and
// schedules fetches in small concurrent batches. Pages are fetched,
// content-extracted, and link-harvested; results are delivered buffered or
// incrementally via a per-page callback.

pub mod config;
pub mod extract;
pub mod fetch;
pub mod frontier;
pub mod normalize;
pub mod types;

pub use config::CrawlPolicy;
pub use fetch::{FetchedPage, HttpFetcher, PageFetcher};
pub use frontier::Crawler;
pub use types::PageResult;
