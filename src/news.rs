//! # Headline lookup
//!
//! Optional NewsAPI grounding for the `scripts` command. Every failure here is
//! soft: a missing key, a transport error or an error payload all log a warning
//! and yield no articles, and the scripts are generated without news context.

use std::{env, time::Duration};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::error::{Error, Result};

pub const NEWS_API_BASE: &str = "https://newsapi.org/v2";
pub const NEWS_KEY_VARS: [&str; 2] = ["NEWS_API_KEY", "NEW_API_KEY"];
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// A headline kept for prompting and for the saved script files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    pub description: String,
    pub url: Option<String>,
    pub source: Option<String>,
    #[serde(rename = "publishedAt")]
    pub published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    status: String,
    message: Option<String>,
    #[serde(default)]
    articles: Vec<ApiArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiArticle {
    title: Option<String>,
    description: Option<String>,
    content: Option<String>,
    url: Option<String>,
    source: Option<ApiSource>,
    published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiSource {
    name: Option<String>,
}

impl ApiArticle {
    fn into_article(self) -> Option<NewsArticle> {
        let title = self.title.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())?;
        let description = self
            .description
            .filter(|d| !d.trim().is_empty())
            .or(self.content)
            .unwrap_or_default()
            .trim()
            .to_string();
        Some(NewsArticle {
            title,
            description,
            url: self.url,
            source: self.source.and_then(|s| s.name),
            published_at: self.published_at,
        })
    }
}

/// What to search for.
#[derive(Debug, Clone)]
pub struct NewsQuery {
    pub topic: String,
    pub max_articles: usize,
    /// Two-letter country code. Switches the lookup to top headlines.
    pub country: Option<String>,
}

pub struct NewsClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl NewsClient {
    pub fn new(api_key: Option<String>, base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::provider("newsapi", format!("could not build HTTP client: {e}")))?;
        Ok(Self {
            http,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: base_url.into(),
        })
    }

    /// Uses `NEWS_API_KEY`, falling back to `NEW_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key = NEWS_KEY_VARS
            .iter()
            .filter_map(|name| env::var(name).ok())
            .find(|v| !v.trim().is_empty());
        Self::new(api_key, NEWS_API_BASE)
    }

    pub fn has_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Fetches up to `query.max_articles` headlines. Never fails.
    #[instrument(skip(self), fields(topic = %query.topic))]
    pub async fn fetch_headlines(&self, query: &NewsQuery) -> Vec<NewsArticle> {
        let Some(api_key) = &self.api_key else {
            debug!("No news API key configured");
            return Vec::new();
        };

        let base = self.base_url.trim_end_matches('/');
        let page_size = query.max_articles.to_string();
        let mut params = vec![("q", query.topic.as_str()), ("pageSize", page_size.as_str())];
        let endpoint = match &query.country {
            Some(country) => {
                params.push(("country", country.as_str()));
                format!("{base}/top-headlines")
            }
            None => {
                params.extend([
                    ("language", "en"),
                    ("sortBy", "publishedAt"),
                    ("searchIn", "title,description"),
                ]);
                format!("{base}/everything")
            }
        };

        let response = match self
            .http
            .get(&endpoint)
            .header("X-Api-Key", api_key)
            .query(&params)
            .send()
            .await
            .and_then(|r| r.error_for_status())
        {
            Ok(response) => response,
            Err(e) => {
                warn!("Could not fetch news headlines ({e}). Continuing without news context.");
                return Vec::new();
            }
        };

        let payload: ApiResponse = match response.json().await {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Could not decode NewsAPI response: {e}");
                return Vec::new();
            }
        };

        if payload.status != "ok" {
            warn!(
                "NewsAPI returned an error: {}",
                payload.message.as_deref().unwrap_or("Unknown error")
            );
            return Vec::new();
        }

        let articles: Vec<NewsArticle> = payload
            .articles
            .into_iter()
            .filter_map(ApiArticle::into_article)
            .take(query.max_articles)
            .collect();
        debug!(count = articles.len(), "Fetched headlines");
        articles
    }
}

/// Renders headlines as prompt context. Empty input gives an empty string.
pub fn build_news_context(articles: &[NewsArticle]) -> String {
    if articles.is_empty() {
        return String::new();
    }

    let mut lines = vec![
        "Use the following recent news stories as factual inspiration. \
         Keep references to the actual events accurate and concise:"
            .to_string(),
        String::new(),
    ];
    for (i, article) in articles.iter().enumerate() {
        match &article.source {
            Some(source) => lines.push(format!("{}. {} ({source})", i + 1, article.title)),
            None => lines.push(format!("{}. {}", i + 1, article.title)),
        }
        if !article.description.is_empty() {
            lines.push(format!("   Summary: {}", article.description));
        }
        if let Some(url) = &article.url {
            lines.push(format!("   URL: {url}"));
        }
        lines.push(String::new());
    }
    lines.join("\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn query(country: Option<&str>) -> NewsQuery {
        NewsQuery {
            topic: "electric cars".to_string(),
            max_articles: 2,
            country: country.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_no_key_returns_nothing() {
        let client = NewsClient::new(None, "http://127.0.0.1:9").unwrap();
        assert!(!client.has_key());
        assert!(client.fetch_headlines(&query(None)).await.is_empty());

        let blank = NewsClient::new(Some("  ".to_string()), "http://127.0.0.1:9").unwrap();
        assert!(!blank.has_key());
    }

    #[tokio::test]
    async fn test_everything_search() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/everything")
                    .header("X-Api-Key", "news-key")
                    .query_param("q", "electric cars")
                    .query_param("pageSize", "2")
                    .query_param("language", "en")
                    .query_param("sortBy", "publishedAt");
                then.status(200).json_body(json!({
                    "status": "ok",
                    "articles": [
                        {
                            "title": "  EV sales climb  ",
                            "description": null,
                            "content": "Sales rose 20%.",
                            "url": "https://example.com/ev",
                            "source": { "name": "Daily" },
                            "publishedAt": "2025-01-01T00:00:00Z"
                        },
                        { "title": "", "description": "dropped" },
                        { "title": "Charging networks expand", "description": "More chargers." },
                        { "title": "Over the limit", "description": "cut" }
                    ]
                }));
            })
            .await;

        let client = NewsClient::new(Some("news-key".to_string()), server.base_url()).unwrap();
        let articles = client.fetch_headlines(&query(None)).await;

        mock.assert_async().await;
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].title, "EV sales climb");
        assert_eq!(articles[0].description, "Sales rose 20%.");
        assert_eq!(articles[0].source.as_deref(), Some("Daily"));
        assert_eq!(articles[1].title, "Charging networks expand");
        assert_eq!(articles[1].url, None);
    }

    #[tokio::test]
    async fn test_country_uses_top_headlines() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/top-headlines")
                    .query_param("country", "fr");
                then.status(200)
                    .json_body(json!({ "status": "ok", "articles": [] }));
            })
            .await;

        let client = NewsClient::new(Some("k".to_string()), server.base_url()).unwrap();
        assert!(client.fetch_headlines(&query(Some("fr"))).await.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_status_returns_nothing() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/everything");
                then.status(401).json_body(json!({
                    "status": "error",
                    "code": "apiKeyInvalid",
                    "message": "Your API key is invalid."
                }));
            })
            .await;

        let client = NewsClient::new(Some("bad".to_string()), server.base_url()).unwrap();
        assert!(client.fetch_headlines(&query(None)).await.is_empty());
    }

    #[tokio::test]
    async fn test_error_payload_returns_nothing() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/everything");
                then.status(200)
                    .json_body(json!({ "status": "error", "message": "rate limited" }));
            })
            .await;

        let client = NewsClient::new(Some("k".to_string()), server.base_url()).unwrap();
        assert!(client.fetch_headlines(&query(None)).await.is_empty());
    }

    #[test]
    fn test_build_news_context() {
        assert_eq!(build_news_context(&[]), "");

        let articles = vec![NewsArticle {
            title: "EV sales climb".to_string(),
            description: "Sales rose 20%.".to_string(),
            url: Some("https://example.com/ev".to_string()),
            source: Some("Daily".to_string()),
            published_at: None,
        }];
        let context = build_news_context(&articles);
        assert!(context.starts_with("Use the following recent news stories"));
        assert!(context.contains("1. EV sales climb (Daily)"));
        assert!(context.contains("   Summary: Sales rose 20%."));
        assert!(context.ends_with("   URL: https://example.com/ev"));
    }
}
