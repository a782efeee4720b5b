//! Crawl endpoint.
//!
//! POST /api/crawl
//!
//! Buffered mode returns every page in one JSON document once the crawl
//! finishes. Streaming mode (`"stream": true`) returns newline-delimited
//! JSON: one `{"type":"page"}` object per settled page in completion
//! order, closed by a single `{"type":"done"}` or `{"type":"error"}` line.

use axum::body::Body;
use axum::extract::Extension;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::StreamExt;
use tracing::{error, info};
use url::Url;

use site_crawler::{CrawlPolicy, PageResult};

use crate::server::app::AppState;
use crate::server::error::ApiError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlRequest {
    pub url: String,
    #[serde(default)]
    pub depth: Option<String>,
    #[serde(default)]
    pub follow_external: bool,
    #[serde(default)]
    pub stream: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlResponse {
    pub success: bool,
    pub pages: Vec<PageResult>,
    pub total_pages: usize,
}

/// NDJSON frames for streaming delivery.
#[derive(Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum StreamEvent {
    Page { data: PageResult },
    Done,
    Error { error: String },
}

/// Map a request depth token onto a depth ceiling. Unknown or missing
/// tokens fall back to the default rather than erroring.
fn depth_from_token(token: Option<&str>) -> u32 {
    match token {
        Some("single") => 0,
        Some("2") => 2,
        Some("full") => 3,
        _ => 1,
    }
}

pub async fn crawl_handler(
    Extension(state): Extension<AppState>,
    Json(request): Json<CrawlRequest>,
) -> Result<Response, ApiError> {
    let seed = Url::parse(&request.url)
        .map_err(|e| ApiError::BadRequest(format!("Invalid URL '{}': {}", request.url, e)))?;
    if seed.host_str().is_none() {
        return Err(ApiError::BadRequest(format!(
            "URL has no host: {}",
            request.url
        )));
    }

    let policy = CrawlPolicy::new(seed)
        .with_max_depth(depth_from_token(request.depth.as_deref()))
        .with_follow_external(request.follow_external)
        .with_max_pages(state.crawl_max_pages);

    info!(
        url = %request.url,
        max_depth = policy.max_depth,
        follow_external = policy.follow_external,
        stream = request.stream,
        "Crawl requested"
    );

    if request.stream {
        Ok(stream_crawl(state, policy))
    } else {
        buffered_crawl(state, policy).await
    }
}

async fn buffered_crawl(state: AppState, policy: CrawlPolicy) -> Result<Response, ApiError> {
    // Run on its own task: a driver panic becomes a 500 instead of tearing
    // down the connection mid-response.
    let handle = tokio::spawn(async move { state.crawler.crawl(&policy).await });
    let pages = handle
        .await
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("Crawl run failed: {e}")))?;

    let total_pages = pages.len();
    info!(pages = total_pages, "Crawl finished");

    Ok(Json(CrawlResponse {
        success: true,
        pages,
        total_pages,
    })
    .into_response())
}

fn stream_crawl(state: AppState, policy: CrawlPolicy) -> Response {
    let (tx, rx) = mpsc::unbounded_channel::<StreamEvent>();

    tokio::spawn(async move {
        let page_tx = tx.clone();
        let crawler = state.crawler.clone();
        let run = tokio::spawn(async move {
            crawler
                .crawl_with(&policy, move |page| {
                    let _ = page_tx.send(StreamEvent::Page { data: page.clone() });
                })
                .await
        });

        match run.await {
            Ok(pages) => {
                info!(pages = pages.len(), "Streaming crawl finished");
                let _ = tx.send(StreamEvent::Done);
            }
            Err(e) => {
                error!(error = %e, "Streaming crawl failed");
                let _ = tx.send(StreamEvent::Error {
                    error: e.to_string(),
                });
            }
        }
    });

    let lines = UnboundedReceiverStream::new(rx)
        .map(|event| serde_json::to_string(&event).map(|line| format!("{line}\n")));

    (
        [(CONTENT_TYPE, "application/x-ndjson")],
        Body::from_stream(lines),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::RecencyCache;
    use crate::server::app::{build_app, AppState};
    use async_trait::async_trait;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use site_crawler::{Crawler, FetchedPage, PageFetcher};
    use std::sync::Arc;
    use tokio::sync::Mutex;
    use tower::ServiceExt;

    /// Two-page site: the seed links to /next, /next links nowhere.
    struct StubFetcher;

    #[async_trait]
    impl PageFetcher for StubFetcher {
        async fn fetch(&self, url: &str, _base_host: Option<&str>) -> FetchedPage {
            let links = if url.ends_with("/next") {
                Vec::new()
            } else {
                vec![format!("{url}/next")]
            };
            FetchedPage {
                page: PageResult {
                    url: url.to_string(),
                    title: "Stub".to_string(),
                    description: "stub page".to_string(),
                    content: "<p>hello</p>".to_string(),
                    text_content: "hello".to_string(),
                    excerpt: Some("hello".to_string()),
                    depth: 0,
                    word_count: 1,
                },
                links,
            }
        }
    }

    fn test_state() -> AppState {
        AppState {
            crawler: Arc::new(Crawler::new(Arc::new(StubFetcher))),
            processed_events: Arc::new(Mutex::new(RecencyCache::new(16))),
            webhook_secret: None,
            crawl_max_pages: 10,
        }
    }

    fn crawl_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/crawl")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[test]
    fn depth_tokens_map_to_ceilings() {
        assert_eq!(depth_from_token(Some("single")), 0);
        assert_eq!(depth_from_token(Some("1")), 1);
        assert_eq!(depth_from_token(Some("2")), 2);
        assert_eq!(depth_from_token(Some("full")), 3);
        assert_eq!(depth_from_token(Some("bogus")), 1);
        assert_eq!(depth_from_token(None), 1);
    }

    #[tokio::test]
    async fn rejects_an_invalid_seed_url() {
        let app = build_app(test_state());

        let response = app
            .oneshot(crawl_request(r#"{"url": "not a url"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(value["error"].as_str().unwrap().contains("Invalid URL"));
    }

    #[tokio::test]
    async fn buffered_crawl_returns_all_pages() {
        let app = build_app(test_state());

        let response = app
            .oneshot(crawl_request(r#"{"url": "https://a.com/start"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(value["success"], true);
        assert_eq!(value["totalPages"], 2);
        assert_eq!(value["pages"].as_array().unwrap().len(), 2);

        let urls: Vec<&str> = value["pages"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["url"].as_str().unwrap())
            .collect();
        assert!(urls.contains(&"https://a.com/start"));
        assert!(urls.contains(&"https://a.com/start/next"));
    }

    #[tokio::test]
    async fn single_depth_token_limits_to_the_seed() {
        let app = build_app(test_state());

        let response = app
            .oneshot(crawl_request(
                r#"{"url": "https://a.com/start", "depth": "single"}"#,
            ))
            .await
            .unwrap();

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["totalPages"], 1);
    }

    #[tokio::test]
    async fn streaming_crawl_emits_pages_then_done() {
        let app = build_app(test_state());

        let response = app
            .oneshot(crawl_request(
                r#"{"url": "https://a.com/start", "stream": true}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[CONTENT_TYPE],
            "application/x-ndjson"
        );

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let text = String::from_utf8(body.to_vec()).unwrap();
        let frames: Vec<serde_json::Value> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(frames.len(), 3);
        assert!(frames[..2].iter().all(|f| f["type"] == "page"));
        assert_eq!(frames[2]["type"], "done");
        assert_eq!(frames[0]["data"]["title"], "Stub");
    }
}
