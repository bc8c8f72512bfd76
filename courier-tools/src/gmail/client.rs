use std::sync::Arc;

use courier_core::ToolError;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};

use super::auth::{AuthError, GmailAuth};

pub const GMAIL_BASE_URL: &str = "https://gmail.googleapis.com/gmail/v1";

impl From<AuthError> for ToolError {
    fn from(err: AuthError) -> Self {
        ToolError::Auth(err.to_string())
    }
}

/// Thin Gmail REST client over the `users/me` endpoints.
#[derive(Debug, Clone)]
pub struct GmailClient {
    base_url: String,
    http: Client,
    auth: Arc<GmailAuth>,
}

#[derive(Debug, Deserialize)]
struct MessageList {
    #[serde(default)]
    messages: Vec<MessageRef>,
}

#[derive(Debug, Deserialize)]
struct MessageRef {
    id: String,
}

#[derive(Debug, Deserialize)]
struct MessageMetadata {
    #[serde(default)]
    snippet: String,
    payload: Option<Payload>,
}

#[derive(Debug, Deserialize)]
struct Payload {
    #[serde(default)]
    headers: Vec<Header>,
}

#[derive(Debug, Deserialize)]
struct Header {
    name: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct GmailErrorResponse {
    error: GmailErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GmailErrorDetail {
    message: String,
}

/// The per-message view returned to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageSummary {
    #[serde(rename = "From")]
    pub from: Option<String>,
    #[serde(rename = "Subject")]
    pub subject: Option<String>,
    #[serde(rename = "Date")]
    pub date: Option<String>,
    #[serde(rename = "Snippet")]
    pub snippet: String,
}

const SNIPPET_CHARS: usize = 100;

impl MessageMetadata {
    fn header(&self, name: &str) -> Option<String> {
        self.payload.as_ref().and_then(|payload| {
            payload
                .headers
                .iter()
                .find(|header| header.name.eq_ignore_ascii_case(name))
                .map(|header| header.value.clone())
        })
    }

    fn into_summary(self) -> MessageSummary {
        let snippet = format!(
            "{}...",
            self.snippet.chars().take(SNIPPET_CHARS).collect::<String>()
        );
        MessageSummary {
            from: self.header("From"),
            subject: self.header("Subject"),
            date: self.header("Date"),
            snippet,
        }
    }
}

impl GmailClient {
    pub fn new(auth: Arc<GmailAuth>) -> Self {
        Self {
            base_url: GMAIL_BASE_URL.to_string(),
            http: Client::new(),
            auth,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/users/me/{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, ToolError> {
        let token = self.auth.access_token().await?;
        Ok(request.bearer_auth(token))
    }

    async fn send<T>(&self, request: RequestBuilder) -> Result<T, ToolError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let response = self
            .authorized(request)
            .await?
            .send()
            .await
            .map_err(|err| ToolError::ExecutionFailed(format!("Gmail request failed: {err}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| ToolError::ExecutionFailed(format!("Gmail request failed: {err}")))?;
        if !status.is_success() {
            let message = serde_json::from_str::<GmailErrorResponse>(&body)
                .map(|err| err.error.message)
                .unwrap_or(body);
            return Err(ToolError::ExecutionFailed(format!(
                "Gmail API returned {status}: {message}"
            )));
        }
        Ok(serde_json::from_str(&body)?)
    }

    /// Lists matching messages and fetches the header metadata of each.
    pub async fn search(&self, query: &str, max_results: u32) -> Result<Vec<MessageSummary>, ToolError> {
        let max_results = max_results.to_string();
        let list: MessageList = self
            .send(
                self.http
                    .get(self.url("messages"))
                    .query(&[("q", query), ("maxResults", max_results.as_str())]),
            )
            .await?;

        let mut summaries = Vec::with_capacity(list.messages.len());
        for message in list.messages {
            let metadata: MessageMetadata = self
                .send(
                    self.http
                        .get(self.url(&format!("messages/{}", message.id)))
                        .query(&[("format", "metadata")]),
                )
                .await?;
            summaries.push(metadata.into_summary());
        }
        Ok(summaries)
    }

    /// Sends an already encoded RFC 822 message.
    pub async fn send_raw(&self, raw: &str) -> Result<(), ToolError> {
        let _: serde_json::Value = self
            .send(
                self.http
                    .post(self.url("messages/send"))
                    .json(&serde_json::json!({ "raw": raw })),
            )
            .await?;
        Ok(())
    }
}
