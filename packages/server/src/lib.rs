// Ragline ingest API.
//
// Crawls customer sites into RAG-ready page content. The crawling core
// lives in the site-crawler package; this crate is the HTTP boundary:
// request validation, result delivery (buffered or NDJSON streaming),
// webhook intake.

pub mod config;
pub mod kernel;
pub mod server;

pub use config::*;
