//! Breadth-biased frontier scheduler with bounded concurrency.
//!
//! One driver task owns the queue and the visited/in-flight sets; fetches
//! run concurrently in batches of at most `max_concurrency`, and the whole
//! batch settles before the next one is selected. Results arrive in
//! completion order, not discovery order.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use tracing::{debug, info};

use crate::config::CrawlPolicy;
use crate::fetch::{HttpFetcher, PageFetcher};
use crate::normalize::normalize_url;
use crate::types::PageResult;

/// Wait when the queue is momentarily starved but fetches are in flight.
const STARVATION_WAIT: Duration = Duration::from_millis(100);
/// Self-imposed pause between batches.
const BATCH_PAUSE: Duration = Duration::from_millis(50);

/// A discovered URL waiting for dispatch. Never mutated after creation.
#[derive(Debug, Clone)]
struct QueueItem {
    url: String,
    depth: u32,
}

/// Frontier crawler. Holds the fetcher seam; all per-run state lives
/// inside a single `crawl_with` invocation.
pub struct Crawler {
    fetcher: Arc<dyn PageFetcher>,
}

impl Crawler {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }

    /// Crawler backed by the production HTTP fetcher.
    pub fn with_http_fetcher() -> anyhow::Result<Self> {
        Ok(Self::new(Arc::new(HttpFetcher::new()?)))
    }

    /// Run a crawl to completion and return every page produced.
    pub async fn crawl(&self, policy: &CrawlPolicy) -> Vec<PageResult> {
        self.crawl_with(policy, |_| {}).await
    }

    /// Run a crawl, invoking `on_page` synchronously with each result as it
    /// settles. The callback runs on the driver: while it blocks, the crawl
    /// stalls.
    pub async fn crawl_with<F>(&self, policy: &CrawlPolicy, mut on_page: F) -> Vec<PageResult>
    where
        F: FnMut(&PageResult),
    {
        let base_host = policy.base_host().map(str::to_string);

        let mut queue: VecDeque<QueueItem> = VecDeque::new();
        queue.push_back(QueueItem {
            url: normalize_url(policy.seed_url.as_str()),
            depth: 0,
        });

        let mut visited: HashSet<String> = HashSet::new();
        let mut in_progress: HashSet<String> = HashSet::new();
        let mut results: Vec<PageResult> = Vec::new();

        info!(
            seed = %policy.seed_url,
            max_depth = policy.max_depth,
            max_pages = policy.max_pages,
            concurrency = policy.max_concurrency,
            follow_external = policy.follow_external,
            "Starting crawl"
        );

        while (!queue.is_empty() || !in_progress.is_empty()) && results.len() < policy.max_pages {
            // Batch selection. Budget is reserved at dispatch, so the page
            // cap is hard: results never outgrow max_pages.
            let mut batch: Vec<QueueItem> = Vec::new();
            while batch.len() < policy.max_concurrency
                && results.len() + in_progress.len() + batch.len() < policy.max_pages
            {
                let item = match queue.pop_front() {
                    Some(item) => item,
                    None => break,
                };
                if item.depth > policy.max_depth {
                    continue;
                }
                if visited.contains(&item.url) || in_progress.contains(&item.url) {
                    continue;
                }
                batch.push(item);
            }

            if batch.is_empty() {
                if in_progress.is_empty() {
                    // Queue exhausted.
                    break;
                }
                // In-flight fetches may still enqueue fresh links.
                tokio::time::sleep(STARVATION_WAIT).await;
                continue;
            }

            // Dispatch. Bookkeeping happens before any fetch starts, so the
            // same normalized URL can never be in flight twice.
            let mut in_flight = FuturesUnordered::new();
            for item in batch {
                visited.insert(item.url.clone());
                in_progress.insert(item.url.clone());

                let fetcher = Arc::clone(&self.fetcher);
                let host = base_host.clone();
                in_flight.push(async move {
                    let fetched = fetcher.fetch(&item.url, host.as_deref()).await;
                    (item, fetched)
                });
            }

            // Settle the whole batch before selecting the next one.
            while let Some((item, fetched)) = in_flight.next().await {
                debug!(
                    url = %item.url,
                    depth = item.depth,
                    links = fetched.links.len(),
                    "Page settled"
                );

                if item.depth < policy.max_depth {
                    for link in fetched.links {
                        if visited.contains(&link) || in_progress.contains(&link) {
                            continue;
                        }
                        queue.push_back(QueueItem {
                            url: link,
                            depth: item.depth + 1,
                        });
                    }
                }

                let mut page = fetched.page;
                page.depth = item.depth;
                on_page(&page);
                results.push(page);

                in_progress.remove(&item.url);
            }

            tokio::time::sleep(BATCH_PAUSE).await;
        }

        info!(pages = results.len(), visited = visited.len(), "Crawl finished");
        results
    }
}
