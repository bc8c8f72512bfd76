pub mod auth;
mod client;

pub use auth::{capture_redirect, AuthError, ClientSecrets, GmailAuth, StoredToken, GMAIL_SCOPES};
pub use client::{GmailClient, MessageSummary, GMAIL_BASE_URL};

use async_trait::async_trait;
use courier_core::{Tool, ToolError};

use crate::args::query_with_limit;
use crate::email::EmailRequest;

pub const DEFAULT_MAX_EMAILS: u32 = 5;

/// Searches the inbox with Gmail query syntax.
#[derive(Debug, Clone)]
pub struct SearchEmailsTool {
    client: GmailClient,
    default_max_results: u32,
}

impl SearchEmailsTool {
    pub fn new(client: GmailClient) -> Self {
        Self {
            client,
            default_max_results: DEFAULT_MAX_EMAILS,
        }
    }

    pub fn with_default_max_results(mut self, max_results: u32) -> Self {
        self.default_max_results = max_results.max(1);
        self
    }
}

#[async_trait]
impl Tool for SearchEmailsTool {
    fn name(&self) -> &str {
        "search_emails"
    }

    fn description(&self) -> &str {
        "Search Gmail with Gmail query syntax (e.g. from:alice is:unread). Input is the query, \
         or query=\"...\", max_results=N. Returns sender, subject, date and a snippet per message."
    }

    async fn invoke(&self, input: &str) -> Result<String, ToolError> {
        let (query, limit) = query_with_limit(input, "max_results");
        let max_results = limit.map_or(self.default_max_results, |limit| limit.max(1));
        let summaries = self.client.search(&query, max_results).await?;
        tracing::debug!(query = %query, found = summaries.len(), "gmail search");
        Ok(serde_json::to_string_pretty(&summaries)?)
    }
}

/// Sends a plain-text email from the authorized account.
#[derive(Debug, Clone)]
pub struct SendEmailTool {
    client: GmailClient,
    sender_name: String,
}

impl SendEmailTool {
    pub fn new(client: GmailClient, sender_name: impl Into<String>) -> Self {
        Self {
            client,
            sender_name: sender_name.into(),
        }
    }
}

#[async_trait]
impl Tool for SendEmailTool {
    fn name(&self) -> &str {
        "send_email"
    }

    fn description(&self) -> &str {
        "Send an email. Input must be to=\"address\", subject=\"subject\", body=\"body\". \
         Use \\n for line breaks in the body."
    }

    async fn invoke(&self, input: &str) -> Result<String, ToolError> {
        let email = EmailRequest::parse(input, &self.sender_name)?;
        self.client.send_raw(&email.to_raw()).await?;
        tracing::info!(to = %email.to, "email sent");
        Ok(format!("Email successfully sent to {}", email.to))
    }
}
