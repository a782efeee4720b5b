use serde::{Deserialize, Serialize};

/// One crawled page. Immutable once appended to a crawl's results.
///
/// A failed fetch still produces a `PageResult` (see [`PageResult::error`]);
/// the crawl never aborts on a single bad page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult {
    pub url: String,
    pub title: String,
    pub description: String,
    /// Cleaned HTML of the main content area.
    pub content: String,
    /// Plain-text rendering of the main content.
    pub text_content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    /// Link hops from the seed URL.
    pub depth: u32,
    pub word_count: usize,
}

impl PageResult {
    /// Degraded result for a page whose fetch failed. Still counts toward
    /// the page budget and the visited set.
    pub fn error(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: "Error loading page".to_string(),
            description: message.into(),
            content: String::new(),
            text_content: String::new(),
            excerpt: None,
            depth: 0,
            word_count: 0,
        }
    }
}
