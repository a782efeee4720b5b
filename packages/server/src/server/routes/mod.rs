// HTTP routes
pub mod crawl;
pub mod health;
pub mod webhooks;

pub use crawl::*;
pub use health::*;
pub use webhooks::*;
