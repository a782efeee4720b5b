//! Two-stage main-content extraction plus link harvesting.
//!
//! The primary pass runs the readability algorithm over the full document.
//! When it cannot isolate an article, a heuristic pass strips boilerplate
//! elements and looks for a content container instead. Link harvesting
//! always uses the heuristic DOM pass, independent of which extraction
//! path won.

use std::collections::HashSet;
use std::io::Cursor;

use readability::extractor;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::normalize::{normalize_url, resolve_link};

/// Maximum excerpt length, in characters.
const EXCERPT_LEN: usize = 300;

/// Selectors that usually wrap the primary content of a page, in
/// preference order.
const CONTENT_SELECTORS: &[&str] = &[
    "article",
    "main",
    "[role='main']",
    "#content",
    "#main",
    ".content",
    ".main",
    ".post-content",
    ".entry-content",
];

/// Elements that never contribute readable content.
const BOILERPLATE_SELECTORS: &[&str] = &[
    "script",
    "style",
    "noscript",
    "iframe",
    "nav",
    "header",
    "footer",
    "aside",
    ".nav",
    ".navbar",
    ".menu",
    ".sidebar",
    ".advertisement",
    ".ads",
    "#nav",
    "#header",
    "#footer",
    "#sidebar",
];

/// Readable core of a page, before the scheduler stamps a depth.
#[derive(Debug, Clone)]
pub struct ExtractedContent {
    pub title: String,
    pub description: String,
    pub content: String,
    pub text: String,
    pub excerpt: Option<String>,
    pub word_count: usize,
}

/// Extract the readable core of `html`, fetched from `page_url`.
pub fn extract_content(html: &str, page_url: &Url) -> ExtractedContent {
    let document = Html::parse_document(html);

    let (title, content, text) = match primary_pass(html, page_url) {
        Some((title, content, text)) => {
            let title = non_empty(title)
                .or_else(|| document_title(&document))
                .unwrap_or_else(|| "No title".to_string());
            (title, content, text)
        }
        None => {
            let (content, text) = fallback_content(&document);
            let title = document_title(&document)
                .or_else(|| first_heading(&document))
                .unwrap_or_else(|| "No title".to_string());
            (title, content, text)
        }
    };

    let excerpt = make_excerpt(&text);
    let description = meta_content(&document, "meta[name='description']")
        .or_else(|| meta_content(&document, "meta[property='og:description']"))
        .or_else(|| excerpt.clone())
        .unwrap_or_else(|| "No description".to_string());
    let word_count = text.split_whitespace().count();

    ExtractedContent {
        title,
        description,
        content,
        text,
        excerpt,
        word_count,
    }
}

/// Collect outbound links: resolved against the page URL, http(s) only,
/// optionally restricted to `base_host`, normalized, de-duplicated with the
/// first occurrence winning.
pub fn harvest_links(html: &str, page_url: &Url, base_host: Option<&str>) -> Vec<String> {
    let selector = match Selector::parse("a[href]") {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };
    let document = Html::parse_document(html);

    let candidates = document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(page_url, href))
        .filter(|resolved| match base_host {
            Some(host) => resolved.host_str() == Some(host),
            None => true,
        })
        .map(|resolved| normalize_url(resolved.as_str()));

    let mut seen = HashSet::new();
    let mut links = Vec::new();
    for link in candidates {
        if seen.insert(link.clone()) {
            links.push(link);
        }
    }
    links
}

/// Readability pass. `None` when the algorithm errors out or isolates no
/// text, which sends the caller down the heuristic path.
fn primary_pass(html: &str, page_url: &Url) -> Option<(String, String, String)> {
    let mut cursor = Cursor::new(html.as_bytes());
    let product = extractor::extract(&mut cursor, page_url).ok()?;
    if product.text.trim().is_empty() {
        return None;
    }
    Some((product.title, product.content, product.text))
}

/// Heuristic pass: strip boilerplate from the body, then prefer the first
/// content container; fall back to the whole cleaned body.
fn fallback_content(document: &Html) -> (String, String) {
    let body_html = body_inner_html(document);
    let cleaned = strip_boilerplate(&body_html);
    let fragment = Html::parse_fragment(&cleaned);

    for selector_str in CONTENT_SELECTORS {
        if let Ok(selector) = Selector::parse(selector_str) {
            if let Some(container) = fragment.select(&selector).next() {
                return (container.inner_html(), element_text(container));
            }
        }
    }

    let text = fragment.root_element().text().collect::<String>();
    (cleaned, text.trim().to_string())
}

/// Serialized contents of `<body>`, or the whole document when there is
/// no body element.
fn body_inner_html(document: &Html) -> String {
    Selector::parse("body")
        .ok()
        .and_then(|selector| document.select(&selector).next())
        .map(|body| body.inner_html())
        .unwrap_or_else(|| document.root_element().html())
}

/// Remove boilerplate elements by erasing their serialized form from the
/// markup. Lossy, but good enough for the heuristic pass.
fn strip_boilerplate(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut cleaned = html.to_string();
    for selector_str in BOILERPLATE_SELECTORS {
        if let Ok(selector) = Selector::parse(selector_str) {
            for element in fragment.select(&selector) {
                cleaned = cleaned.replace(&element.html(), "");
            }
        }
    }
    cleaned
}

fn document_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|title| !title.is_empty())
}

fn first_heading(document: &Html) -> Option<String> {
    let selector = Selector::parse("h1").ok()?;
    document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|heading| !heading.is_empty())
}

fn meta_content(document: &Html, selector_str: &str) -> Option<String> {
    let selector = Selector::parse(selector_str).ok()?;
    document
        .select(&selector)
        .next()
        .and_then(|element| element.value().attr("content"))
        .map(str::trim)
        .filter(|content| !content.is_empty())
        .map(str::to_string)
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// First [`EXCERPT_LEN`] characters of the text with whitespace collapsed,
/// plus an ellipsis marker when truncated. `None` for empty text.
fn make_excerpt(text: &str) -> Option<String> {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return None;
    }
    if collapsed.chars().count() <= EXCERPT_LEN {
        Some(collapsed)
    } else {
        let cut: String = collapsed.chars().take(EXCERPT_LEN).collect();
        Some(format!("{cut}..."))
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
