use async_trait::async_trait;
use courier_core::{Tool, ToolError};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::args::query_with_limit;

pub const CUSTOM_SEARCH_URL: &str = "https://www.googleapis.com/customsearch/v1";
pub const DEFAULT_NUM_RESULTS: u32 = 3;
// Custom Search serves at most ten results per request.
const MAX_NUM_RESULTS: u32 = 10;

/// Web search through the Google Custom Search JSON API.
#[derive(Clone)]
pub struct GoogleSearchTool {
    api_key: Option<SecretString>,
    engine_id: Option<String>,
    base_url: String,
    default_num_results: u32,
    http: Client,
}

impl std::fmt::Debug for GoogleSearchTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleSearchTool")
            .field("engine_id", &self.engine_id)
            .field("base_url", &self.base_url)
            .field("default_num_results", &self.default_num_results)
            .finish()
    }
}

impl Default for GoogleSearchTool {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

#[derive(Debug, Deserialize)]
struct SearchErrorResponse {
    error: SearchErrorDetail,
}

#[derive(Debug, Deserialize)]
struct SearchErrorDetail {
    message: String,
}

impl GoogleSearchTool {
    pub fn new() -> Self {
        Self {
            api_key: None,
            engine_id: None,
            base_url: CUSTOM_SEARCH_URL.to_string(),
            default_num_results: DEFAULT_NUM_RESULTS,
            http: Client::new(),
        }
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::new(api_key.into()));
        self
    }

    pub fn engine_id(mut self, engine_id: impl Into<String>) -> Self {
        self.engine_id = Some(engine_id.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn default_num_results(mut self, num_results: u32) -> Self {
        self.default_num_results = num_results.clamp(1, MAX_NUM_RESULTS);
        self
    }
}

fn format_items(items: &[SearchItem]) -> String {
    items
        .iter()
        .map(|item| {
            format!(
                "Title: {}\nLink: {}\nSnippet: {}\n",
                item.title, item.link, item.snippet
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl Tool for GoogleSearchTool {
    fn name(&self) -> &str {
        "google_search"
    }

    fn description(&self) -> &str {
        "Search the web with Google. Input is the search query, or query=\"...\", \
         num_results=N. Returns title, link and snippet for each result."
    }

    async fn invoke(&self, input: &str) -> Result<String, ToolError> {
        let (Some(api_key), Some(engine_id)) = (&self.api_key, &self.engine_id) else {
            return Err(ToolError::Config(
                "Missing Google CSE API key or CX".to_string(),
            ));
        };

        let (query, limit) = query_with_limit(input, "num_results");
        let num = limit
            .unwrap_or(self.default_num_results)
            .clamp(1, MAX_NUM_RESULTS)
            .to_string();

        let response = self
            .http
            .get(&self.base_url)
            .query(&[
                ("q", query.as_str()),
                ("key", api_key.expose_secret().as_str()),
                ("cx", engine_id.as_str()),
                ("num", num.as_str()),
            ])
            .send()
            .await
            .map_err(|err| ToolError::ExecutionFailed(format!("search request failed: {err}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| ToolError::ExecutionFailed(format!("search request failed: {err}")))?;
        if !status.is_success() {
            let message = serde_json::from_str::<SearchErrorResponse>(&body)
                .map(|err| err.error.message)
                .unwrap_or(body);
            return Err(ToolError::ExecutionFailed(format!(
                "search returned {status}: {message}"
            )));
        }

        let results: SearchResponse = serde_json::from_str(&body)?;
        tracing::debug!(query = %query, found = results.items.len(), "web search");
        if results.items.is_empty() {
            return Ok("No results found".to_string());
        }
        Ok(format_items(&results.items))
    }
}
