//! Financial news capability
//!
//! Fetches up to five recent headlines for a query from NewsAPI, English
//! language only, in provider relevance order. Zero results is a valid,
//! success-tagged outcome distinct from a transport or credential fault.

use crate::capabilities::Capability;
use crate::error::AgentError;
use crate::Result;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

const NEWS_API_URL: &str = "https://newsapi.org/v2/everything";

/// Maximum headlines retained per query.
pub const MAX_HEADLINES: usize = 5;

/// NewsAPI client (connection-pooled); the API key is injected once at
/// construction.
pub struct NewsApiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl NewsApiClient {
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(60))
            .pool_max_idle_per_host(8)
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        Self {
            client,
            api_key,
            base_url: NEWS_API_URL.to_string(),
        }
    }

    /// Fetch up to [`MAX_HEADLINES`] headline titles for `query`.
    ///
    /// An empty vector is a success ("no articles found"), not an error.
    pub async fn top_headlines(&self, query: &str) -> Result<Vec<String>> {
        if self.api_key.is_empty() {
            return Err(AgentError::Credential(
                "NEWS_API_KEY not configured".to_string(),
            ));
        }

        debug!(query, "Fetching news headlines");

        let page_size = MAX_HEADLINES.to_string();
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("q", query),
                ("language", "en"),
                ("pageSize", page_size.as_str()),
                ("sortBy", "relevancy"),
            ])
            .header("X-Api-Key", &self.api_key)
            .send()
            .await
            .map_err(|e| AgentError::Transport(format!("NewsAPI request failed: {}", e)))?;

        let status = response.status();
        let body: NewsResponse = response
            .json()
            .await
            .map_err(|e| AgentError::Transport(format!("Invalid NewsAPI response: {}", e)))?;

        if !status.is_success() || body.status == "error" {
            let message = body
                .message
                .unwrap_or_else(|| format!("NewsAPI returned {}", status));
            warn!(query, %status, "NewsAPI request rejected");

            return Err(if status == StatusCode::UNAUTHORIZED {
                AgentError::Credential(message)
            } else {
                AgentError::Transport(message)
            });
        }

        Ok(body
            .articles
            .into_iter()
            .map(|article| article.title)
            .take(MAX_HEADLINES)
            .collect())
    }
}

//
// ================= Wire Types =================
//

#[derive(Debug, Deserialize)]
struct NewsResponse {
    status: String,
    message: Option<String>,
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
struct Article {
    title: String,
}

//
// ================= Capability =================
//

/// News capability registered as `get_financial_news`.
pub struct NewsCapability {
    client: NewsApiClient,
}

impl NewsCapability {
    pub fn new(api_key: String) -> Self {
        Self {
            client: NewsApiClient::new(api_key),
        }
    }
}

#[async_trait::async_trait]
impl Capability for NewsCapability {
    fn name(&self) -> &'static str {
        "get_financial_news"
    }

    fn description(&self) -> &'static str {
        "Fetches the top 5 recent financial news headlines for a given company or query."
    }

    async fn invoke(&self, input: &str) -> String {
        let query = input.trim();

        match self.client.top_headlines(query).await {
            Ok(headlines) if headlines.is_empty() => format_empty(query),
            Ok(headlines) => format_success(query, &headlines),
            Err(e) => format_fault(query, &e),
        }
    }
}

fn format_empty(query: &str) -> String {
    format!("No news articles found for '{}'.", query)
}

fn format_success(query: &str, headlines: &[String]) -> String {
    let json = serde_json::to_string(headlines).unwrap_or_else(|_| "[]".to_string());
    format!("Successfully fetched news for {}: {}", query, json)
}

fn format_fault(query: &str, error: &AgentError) -> String {
    format!("Error fetching news for {}: {}", query, error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_results_is_success_tagged() {
        let text = format_empty("Obscure Industries");

        assert!(text.contains("No news articles found"));
        assert!(text.contains("Obscure Industries"));
        assert!(!text.starts_with("Error"));
    }

    #[test]
    fn test_success_lists_titles_in_order() {
        let headlines = vec![
            "NVIDIA surges on earnings beat".to_string(),
            "Chipmakers rally".to_string(),
            "Analysts raise targets".to_string(),
        ];

        let text = format_success("NVIDIA", &headlines);

        assert!(text.starts_with("Successfully fetched news for NVIDIA"));
        let first = text.find("NVIDIA surges").unwrap();
        let second = text.find("Chipmakers rally").unwrap();
        let third = text.find("Analysts raise").unwrap();
        assert!(first < second && second < third);
    }

    #[test]
    fn test_fault_names_query_and_cause() {
        let error = AgentError::Credential("invalid api key".to_string());
        let text = format_fault("NVIDIA", &error);

        assert!(text.starts_with("Error fetching news for NVIDIA"));
        assert!(text.contains("invalid api key"));
    }

    #[test]
    fn test_response_parsing_caps_at_five_titles() {
        let json = serde_json::json!({
            "status": "ok",
            "totalResults": 7,
            "articles": (0..7)
                .map(|i| serde_json::json!({ "title": format!("Headline {}", i) }))
                .collect::<Vec<_>>()
        });

        let parsed: NewsResponse = serde_json::from_value(json).unwrap();
        let titles: Vec<String> = parsed
            .articles
            .into_iter()
            .map(|article| article.title)
            .take(MAX_HEADLINES)
            .collect();

        assert_eq!(titles.len(), MAX_HEADLINES);
        assert_eq!(titles[0], "Headline 0");
        assert_eq!(titles[4], "Headline 4");
    }

    #[tokio::test]
    async fn test_missing_api_key_is_credential_fault() {
        let client = NewsApiClient::new(String::new());
        let result = client.top_headlines("NVIDIA").await;
        assert!(matches!(result, Err(AgentError::Credential(_))));
    }
}
