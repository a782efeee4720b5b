use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Shared secret for webhook signature verification. Verification is
    /// skipped, with a warning, when unset (local development).
    pub webhook_secret: Option<String>,
    /// Page budget applied to every crawl request.
    pub crawl_max_pages: usize,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            webhook_secret: env::var("WEBHOOK_SECRET").ok(),
            crawl_max_pages: env::var("CRAWL_MAX_PAGES")
                .unwrap_or_else(|_| "100".to_string())
                .parse()
                .context("CRAWL_MAX_PAGES must be a valid number")?,
        })
    }
}
