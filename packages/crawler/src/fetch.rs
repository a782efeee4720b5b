//! Page fetching.
//!
//! `HttpFetcher` is the production implementation; the trait exists so the
//! scheduler can run against an in-memory site graph in tests.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, warn};
use url::Url;

use crate::extract::{extract_content, harvest_links};
use crate::types::PageResult;

/// Hard timeout for a single page fetch.
const FETCH_TIMEOUT: Duration = Duration::from_secs(15);
/// Redirect cap per fetch.
const MAX_REDIRECTS: usize = 5;
/// Descriptive agent string so site owners can identify the crawler.
const USER_AGENT: &str = concat!(
    "ragline-crawler/",
    env!("CARGO_PKG_VERSION"),
    " (+https://ragline.dev/crawler)"
);

/// One settled fetch: the page (depth unstamped) and its outbound links.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub page: PageResult,
    /// Normalized, de-duplicated, in discovery order.
    pub links: Vec<String>,
}

impl FetchedPage {
    /// Degraded outcome: an error page and no links.
    pub fn failed(url: &str, message: String) -> Self {
        Self {
            page: PageResult::error(url, message),
            links: Vec::new(),
        }
    }
}

/// Network access and content extraction behind one seam.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url` and harvest its links. `base_host` restricts harvested
    /// links to that host; `None` keeps cross-host links.
    ///
    /// Never fails: fetch-level errors (network, timeout, redirect cap,
    /// non-success status) come back as a degraded page with zero links.
    async fn fetch(&self, url: &str, base_host: Option<&str>) -> FetchedPage;
}

/// Production fetcher: reqwest + readability/scraper extraction.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    async fn fetch_html(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("HTTP request failed")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("HTTP {} for {}", status, url);
        }

        response
            .text()
            .await
            .context("Failed to read response body")
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, base_host: Option<&str>) -> FetchedPage {
        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(url = %url, error = %e, "Unparseable URL reached the fetcher");
                return FetchedPage::failed(url, format!("Invalid URL: {e}"));
            }
        };

        let html = match self.fetch_html(url).await {
            Ok(html) => html,
            Err(e) => {
                warn!(url = %url, error = %e, "Fetch failed");
                return FetchedPage::failed(url, format!("{e:#}"));
            }
        };

        debug!(url = %url, bytes = html.len(), "Fetched page");

        let extracted = extract_content(&html, &parsed);
        let links = harvest_links(&html, &parsed, base_host);

        FetchedPage {
            page: PageResult {
                url: url.to_string(),
                title: extracted.title,
                description: extracted.description,
                content: extracted.content,
                text_content: extracted.text,
                excerpt: extracted.excerpt,
                depth: 0,
                word_count: extracted.word_count,
            },
            links,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_fetch_is_a_degraded_page() {
        let fetched = FetchedPage::failed("https://a.com/x", "connection refused".to_string());

        assert!(fetched.links.is_empty());
        assert_eq!(fetched.page.title, "Error loading page");
        assert_eq!(fetched.page.description, "connection refused");
        assert!(fetched.page.content.is_empty());
        assert_eq!(fetched.page.word_count, 0);
    }

    #[test]
    fn user_agent_identifies_the_crawler() {
        assert!(USER_AGENT.starts_with("ragline-crawler/"));
    }
}
