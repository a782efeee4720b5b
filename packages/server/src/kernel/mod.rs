// Shared infrastructure for the HTTP boundary.
pub mod idempotency;
pub mod signature;

pub use idempotency::RecencyCache;
