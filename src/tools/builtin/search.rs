//! Web search tool: Google Custom Search scoped to Wikipedia.
//!
//! Runs a search for "<topic> wikipedia", fetches the first hit, and
//! extracts the article's paragraph text for the responder.

use std::time::Instant;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::tools::tool::{Tool, ToolError, ToolOutput, require_str_any};

const SEARCH_URL: &str = "https://www.googleapis.com/customsearch/v1";

/// Paragraphs shorter than this are navigation noise, not prose.
const MIN_PARAGRAPH_CHARS: usize = 50;

/// Google Custom Search + Wikipedia extraction tool.
pub struct SearchTool {
    http: reqwest::Client,
    api_key: Option<SecretString>,
    cx: Option<String>,
}

impl SearchTool {
    pub fn new(http: reqwest::Client, api_key: Option<SecretString>, cx: Option<String>) -> Self {
        Self { http, api_key, cx }
    }

    async fn first_hit(&self, topic: &str) -> Result<String, ToolError> {
        let key = self
            .api_key
            .as_ref()
            .ok_or_else(|| ToolError::NotConfigured("SEARCH_API_KEY is not set".to_string()))?;
        let cx = self
            .cx
            .as_deref()
            .ok_or_else(|| ToolError::NotConfigured("SEARCH_CSX_ID is not set".to_string()))?;

        let query = format!("{} wikipedia", topic);
        let response = self
            .http
            .get(SEARCH_URL)
            .query(&[("key", key.expose_secret()), ("cx", cx), ("q", query.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ToolError::ExecutionFailed(format!(
                "search provider returned {}: {}",
                status, body
            )));
        }

        let body: SearchResponse = response.json().await?;
        body.items
            .into_iter()
            .flatten()
            .next()
            .map(|item| item.link)
            .ok_or_else(|| {
                ToolError::ExecutionFailed(format!("no search results for \"{}\"", query))
            })
    }

    async fn fetch_page(&self, url: &str) -> Result<String, ToolError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ToolError::ExecutionFailed(format!(
                "page fetch returned {} for {}",
                status, url
            )));
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl Tool for SearchTool {
    fn name(&self) -> &str {
        "get_search"
    }

    fn description(&self) -> &str {
        "Performs a web search and returns Wikipedia content for the topic. \
         Use when the user explicitly asks to search or look something up."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "topic": {
                    "type": "string",
                    "description": "Topic to search for"
                }
            },
            "required": ["topic"]
        })
    }

    async fn execute(&self, params: serde_json::Value) -> Result<ToolOutput, ToolError> {
        let topic = require_str_any(&params, &["topic", "query", "input", "q"])?;

        let start = Instant::now();
        let url = self.first_hit(topic).await?;
        tracing::debug!(%url, "Fetching first search hit");
        let html = self.fetch_page(&url).await?;

        let text = extract_article_text(&html);
        if text.is_empty() {
            return Err(ToolError::ExecutionFailed(format!(
                "no readable content at {}",
                url
            )));
        }
        Ok(ToolOutput::text(text, start.elapsed()))
    }
}

/// Pull paragraph prose out of a Wikipedia-style article body.
fn extract_article_text(html: &str) -> String {
    use scraper::{Html, Selector};

    let document = Html::parse_document(html);
    // Static, known-valid selector.
    let Ok(selector) = Selector::parse("#mw-content-text p") else {
        return String::new();
    };

    document
        .select(&selector)
        .map(|p| {
            p.text()
                .collect::<String>()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|text| text.len() > MIN_PARAGRAPH_CHARS)
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    items: Option<Vec<SearchItem>>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    link: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_HTML: &str = r#"
        <html><body>
        <div id="mw-content-text">
            <p>Short.</p>
            <p>Rust is a multi-paradigm, general-purpose programming language that
               emphasizes performance, type safety, and concurrency.</p>
            <p>It enforces memory safety, meaning that all references point to
               valid memory, without a garbage collector.</p>
        </div>
        <div id="footer"><p>This footer paragraph is long enough but lives outside the content div.</p></div>
        </body></html>
    "#;

    #[test]
    fn test_extract_article_text_keeps_long_content_paragraphs() {
        let text = extract_article_text(SAMPLE_HTML);
        assert!(text.contains("multi-paradigm"));
        assert!(text.contains("memory safety"));
    }

    #[test]
    fn test_extract_article_text_drops_short_and_external() {
        let text = extract_article_text(SAMPLE_HTML);
        assert!(!text.contains("Short."));
        assert!(!text.contains("footer paragraph"));
    }

    #[test]
    fn test_extract_article_text_collapses_whitespace() {
        let text = extract_article_text(SAMPLE_HTML);
        assert!(text.contains("language that emphasizes"));
    }

    #[test]
    fn test_extract_article_text_empty_document() {
        assert!(extract_article_text("<html><body></body></html>").is_empty());
    }

    #[test]
    fn test_parse_search_response() {
        let body = r#"{"items": [{"link": "https://en.wikipedia.org/wiki/Rust"}]}"#;
        let parsed: SearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(
            parsed.items.unwrap()[0].link,
            "https://en.wikipedia.org/wiki/Rust"
        );

        let empty: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(empty.items.is_none());
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_network() {
        let tool = SearchTool::new(reqwest::Client::new(), None, Some("cx".to_string()));
        let err = tool
            .execute(serde_json::json!({"topic": "rust"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::NotConfigured(_)));
    }

    #[tokio::test]
    async fn test_missing_cx_fails_before_network() {
        let tool = SearchTool::new(
            reqwest::Client::new(),
            Some(SecretString::from("key")),
            None,
        );
        let err = tool
            .execute(serde_json::json!({"topic": "rust"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::NotConfigured(_)));
    }
}
