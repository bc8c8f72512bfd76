use std::path::PathBuf;
use std::sync::Arc;

use courier_core::{Tool, ToolError};
use secrecy::{ExposeSecret, SecretString};

use crate::email::SENDER_PLACEHOLDER;
use crate::gmail::{GmailAuth, GmailClient, SearchEmailsTool, SendEmailTool, DEFAULT_MAX_EMAILS};
use crate::scrape::WebScrapingTool;
use crate::search::{GoogleSearchTool, DEFAULT_NUM_RESULTS};

/// Settings for the default tool set.
#[derive(Clone)]
pub struct ToolsConfig {
    sender_name: String,
    search_api_key: Option<SecretString>,
    search_engine_id: Option<String>,
    credentials_path: PathBuf,
    token_path: PathBuf,
    max_email_results: u32,
    max_search_results: u32,
}

impl std::fmt::Debug for ToolsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolsConfig")
            .field("sender_name", &self.sender_name)
            .field("search_api_key", &self.search_api_key.as_ref().map(|_| "<redacted>"))
            .field("search_engine_id", &self.search_engine_id)
            .field("credentials_path", &self.credentials_path)
            .field("token_path", &self.token_path)
            .finish()
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            sender_name: SENDER_PLACEHOLDER.to_string(),
            search_api_key: None,
            search_engine_id: None,
            credentials_path: PathBuf::from("credentials.json"),
            token_path: PathBuf::from("token.json"),
            max_email_results: DEFAULT_MAX_EMAILS,
            max_search_results: DEFAULT_NUM_RESULTS,
        }
    }
}

impl ToolsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sender_name(mut self, name: impl Into<String>) -> Self {
        self.sender_name = name.into();
        self
    }

    pub fn search_api_key(mut self, key: Option<String>) -> Self {
        self.search_api_key = key.filter(|k| !k.is_empty()).map(SecretString::new);
        self
    }

    pub fn search_engine_id(mut self, id: Option<String>) -> Self {
        self.search_engine_id = id.filter(|id| !id.is_empty());
        self
    }

    pub fn credentials_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials_path = path.into();
        self
    }

    pub fn token_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_path = path.into();
        self
    }

    pub fn max_email_results(mut self, max: u32) -> Self {
        self.max_email_results = max;
        self
    }

    pub fn max_search_results(mut self, max: u32) -> Self {
        self.max_search_results = max;
        self
    }

    pub fn gmail_auth(&self) -> GmailAuth {
        GmailAuth::new(&self.credentials_path, &self.token_path)
    }

    /// The four standard tools in catalog order: inbox search, send, web
    /// search, page scraping.
    pub fn build_tools(&self) -> Result<Vec<Arc<dyn Tool>>, ToolError> {
        let gmail = GmailClient::new(Arc::new(self.gmail_auth()));

        let mut search = GoogleSearchTool::new().default_num_results(self.max_search_results);
        if let Some(key) = &self.search_api_key {
            search = search.api_key(key.expose_secret().clone());
        }
        if let Some(id) = &self.search_engine_id {
            search = search.engine_id(id.clone());
        }

        let inbox: Arc<dyn Tool> = Arc::new(
            SearchEmailsTool::new(gmail.clone()).with_default_max_results(self.max_email_results),
        );
        let send: Arc<dyn Tool> = Arc::new(SendEmailTool::new(gmail, self.sender_name.clone()));
        let scrape: Arc<dyn Tool> = Arc::new(WebScrapingTool::new()?);
        Ok(vec![inbox, send, Arc::new(search), scrape])
    }
}
