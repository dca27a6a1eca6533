//! News tool backed by NewsAPI.
//!
//! Fetches recent articles on a topic, sorted by publication time, and
//! formats the top headlines.

use std::time::Instant;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::tools::tool::{Tool, ToolError, ToolOutput, require_str_any};

const BASE_URL: &str = "https://newsapi.org/v2/everything";

/// How many articles make it into the summary.
const MAX_ARTICLES: usize = 10;

/// NewsAPI headlines tool.
pub struct NewsTool {
    http: reqwest::Client,
    api_key: Option<SecretString>,
}

impl NewsTool {
    pub fn new(http: reqwest::Client, api_key: Option<SecretString>) -> Self {
        Self { http, api_key }
    }

    async fn fetch(&self, topic: &str) -> Result<Vec<Article>, ToolError> {
        let key = self
            .api_key
            .as_ref()
            .ok_or_else(|| ToolError::NotConfigured("NEWS_API_KEY is not set".to_string()))?;

        let from = yesterday();
        let response = self
            .http
            .get(BASE_URL)
            .query(&[
                ("q", topic),
                ("from", from.as_str()),
                ("sortBy", "publishedAt"),
                ("apiKey", key.expose_secret()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ToolError::ExecutionFailed(format!(
                "news provider returned {}: {}",
                status,
                provider_message(&body)
            )));
        }

        let body: NewsResponse = response.json().await?;
        Ok(body.articles)
    }
}

#[async_trait]
impl Tool for NewsTool {
    fn name(&self) -> &str {
        "get_news"
    }

    fn description(&self) -> &str {
        "Fetches the latest news articles on a specific topic."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "topic": {
                    "type": "string",
                    "description": "Topic to search news for, e.g. \"climate\""
                }
            },
            "required": ["topic"]
        })
    }

    async fn execute(&self, params: serde_json::Value) -> Result<ToolOutput, ToolError> {
        let topic = require_str_any(&params, &["topic", "query", "input", "q"])?;

        let start = Instant::now();
        let articles = self.fetch(topic).await?;
        Ok(ToolOutput::text(
            format_articles(topic, &articles),
            start.elapsed(),
        ))
    }
}

/// ISO date for yesterday, the `from` window NewsAPI expects.
fn yesterday() -> String {
    (chrono::Utc::now().date_naive() - chrono::Days::new(1)).to_string()
}

fn provider_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: String,
    }

    serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.message)
        .unwrap_or_else(|_| body.to_string())
}

fn format_articles(topic: &str, articles: &[Article]) -> String {
    if articles.is_empty() {
        return format!("No recent articles found for \"{}\".", topic);
    }

    articles
        .iter()
        .take(MAX_ARTICLES)
        .map(|article| {
            let mut entry = format!("{}: {}", article.source.name, article.title);
            if let Some(description) = article
                .description
                .as_deref()
                .filter(|d| !d.trim().is_empty())
            {
                entry.push_str(&format!("\n{}", description));
            }
            entry.push_str(&format!("\nLink: {}", article.url));
            entry
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[derive(Debug, Deserialize)]
struct NewsResponse {
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
struct Article {
    source: Source,
    title: String,
    description: Option<String>,
    url: String,
}

#[derive(Debug, Deserialize)]
struct Source {
    name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(source: &str, title: &str, description: Option<&str>) -> Article {
        Article {
            source: Source {
                name: source.to_string(),
            },
            title: title.to_string(),
            description: description.map(String::from),
            url: format!("https://example.com/{}", title.replace(' ', "-")),
        }
    }

    #[test]
    fn test_yesterday_is_one_day_back() {
        let date: chrono::NaiveDate = yesterday().parse().unwrap();
        assert_eq!(
            chrono::Utc::now().date_naive() - date,
            chrono::Duration::days(1)
        );
    }

    #[test]
    fn test_format_articles_basic() {
        let articles = vec![
            article("Reuters", "Markets rally", Some("Stocks climbed on Monday.")),
            article("BBC", "Rates held", None),
        ];
        let text = format_articles("markets", &articles);
        assert!(text.contains("Reuters: Markets rally"));
        assert!(text.contains("Stocks climbed on Monday."));
        assert!(text.contains("BBC: Rates held"));
        assert!(text.contains("Link: https://example.com/Rates-held"));
    }

    #[test]
    fn test_format_articles_caps_at_ten() {
        let articles: Vec<Article> = (0..15)
            .map(|i| article("Wire", &format!("story {}", i), None))
            .collect();
        let text = format_articles("anything", &articles);
        assert!(text.contains("story 9"));
        assert!(!text.contains("story 10"));
    }

    #[test]
    fn test_format_articles_empty() {
        let text = format_articles("obscure topic", &[]);
        assert!(text.contains("No recent articles"));
        assert!(text.contains("obscure topic"));
    }

    #[test]
    fn test_parse_news_response() {
        let body = r#"{
            "status": "ok",
            "totalResults": 1,
            "articles": [{
                "source": {"id": null, "name": "Reuters"},
                "title": "Headline",
                "description": "Body",
                "url": "https://example.com/a"
            }]
        }"#;
        let parsed: NewsResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.articles.len(), 1);
        assert_eq!(parsed.articles[0].source.name, "Reuters");
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_network() {
        let tool = NewsTool::new(reqwest::Client::new(), None);
        let err = tool
            .execute(serde_json::json!({"topic": "markets"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::NotConfigured(_)));
    }
}
