//! OAuth token store for the Gmail tools.
//!
//! Tokens live in an authorized-user JSON file next to the client
//! configuration downloaded from the Google Cloud console. Expired access
//! tokens are refreshed with the stored refresh token and written back.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

pub const GMAIL_SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/gmail.readonly",
    "https://www.googleapis.com/auth/gmail.send",
];

const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const EXPIRY_SKEW_SECS: i64 = 60;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("no saved Gmail token at {0}; run `courier auth` first")]
    NotAuthorized(PathBuf),
    #[error("saved token cannot be refreshed: missing {0}")]
    Incomplete(&'static str),
    #[error("cannot read client credentials at {path}: {reason}")]
    Credentials { path: PathBuf, reason: String },
    #[error("token endpoint rejected the request: {0}")]
    TokenEndpoint(String),
    #[error("authorization redirect did not carry a code: {0}")]
    Redirect(String),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Authorized-user token file, field-compatible with Google's client libraries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredToken {
    pub token: Option<String>,
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default, with = "expiry_format", skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl StoredToken {
    /// A token with no expiry never goes stale.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.token.is_some()
            && self
                .expiry
                .map_or(true, |expiry| expiry - Duration::seconds(EXPIRY_SKEW_SECS) > now)
    }
}

mod expiry_format {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(expiry) => {
                serializer.serialize_str(&expiry.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string())
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        raw.map(|value| super::parse_expiry(&value).map_err(serde::de::Error::custom))
            .transpose()
    }
}

fn parse_expiry(value: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|err| format!("invalid expiry `{value}`: {err}"))
}

/// OAuth client configuration (`installed` or `web` section).
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.to_string()
}

#[derive(Debug, Deserialize)]
struct ClientSecretsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

#[derive(Debug, Deserialize)]
struct TokenGrant {
    access_token: String,
    expires_in: Option<i64>,
    refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenEndpointError {
    error: String,
    error_description: Option<String>,
}

pub struct GmailAuth {
    credentials_path: PathBuf,
    token_path: PathBuf,
    http: Client,
    cached: Mutex<Option<StoredToken>>,
}

impl std::fmt::Debug for GmailAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GmailAuth")
            .field("credentials_path", &self.credentials_path)
            .field("token_path", &self.token_path)
            .finish()
    }
}

impl GmailAuth {
    pub fn new(credentials_path: impl Into<PathBuf>, token_path: impl Into<PathBuf>) -> Self {
        Self {
            credentials_path: credentials_path.into(),
            token_path: token_path.into(),
            http: Client::new(),
            cached: Mutex::new(None),
        }
    }

    pub fn credentials_path(&self) -> &Path {
        &self.credentials_path
    }

    pub fn token_path(&self) -> &Path {
        &self.token_path
    }

    /// Returns a usable access token, refreshing and persisting it first when
    /// the stored one is stale. Concurrent callers wait on the same refresh.
    pub async fn access_token(&self) -> Result<String, AuthError> {
        let mut cached = self.cached.lock().await;
        if cached.is_none() {
            *cached = Some(self.load_token().await?);
        }
        let Some(token) = cached.as_mut() else {
            return Err(AuthError::NotAuthorized(self.token_path.clone()));
        };

        if !token.is_fresh(Utc::now()) {
            tracing::info!(path = %self.token_path.display(), "refreshing Gmail access token");
            self.refresh(token).await?;
            self.save_token(token).await?;
        }

        token
            .token
            .clone()
            .ok_or(AuthError::Incomplete("token"))
    }

    pub async fn load_token(&self) -> Result<StoredToken, AuthError> {
        let raw = match tokio::fs::read_to_string(&self.token_path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(AuthError::NotAuthorized(self.token_path.clone()))
            }
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_str(&raw)?)
    }

    async fn save_token(&self, token: &StoredToken) -> Result<(), AuthError> {
        if let Some(parent) = self.token_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let body = serde_json::to_string_pretty(token)?;
        tokio::fs::write(&self.token_path, body).await?;
        Ok(())
    }

    async fn refresh(&self, token: &mut StoredToken) -> Result<(), AuthError> {
        let refresh_token = token
            .refresh_token
            .clone()
            .ok_or(AuthError::Incomplete("refresh_token"))?;
        let client_id = token
            .client_id
            .clone()
            .ok_or(AuthError::Incomplete("client_id"))?;
        let client_secret = token
            .client_secret
            .clone()
            .ok_or(AuthError::Incomplete("client_secret"))?;

        let response = self
            .http
            .post(&token.token_uri)
            .form(&[
                ("client_id", client_id.as_str()),
                ("client_secret", client_secret.as_str()),
                ("refresh_token", refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await?;

        let grant = read_grant(response).await?;
        token.token = Some(grant.access_token);
        token.expiry = grant
            .expires_in
            .map(|secs| Utc::now() + Duration::seconds(secs));
        if let Some(rotated) = grant.refresh_token {
            token.refresh_token = Some(rotated);
        }
        Ok(())
    }

    pub async fn client_secrets(&self) -> Result<ClientSecrets, AuthError> {
        let raw = tokio::fs::read_to_string(&self.credentials_path)
            .await
            .map_err(|err| AuthError::Credentials {
                path: self.credentials_path.clone(),
                reason: err.to_string(),
            })?;
        let file: ClientSecretsFile =
            serde_json::from_str(&raw).map_err(|err| AuthError::Credentials {
                path: self.credentials_path.clone(),
                reason: err.to_string(),
            })?;
        file.installed
            .or(file.web)
            .ok_or_else(|| AuthError::Credentials {
                path: self.credentials_path.clone(),
                reason: "expected an `installed` or `web` section".to_string(),
            })
    }

    /// Builds the browser URL that asks the user to grant the Gmail scopes.
    pub async fn consent_url(&self, redirect_uri: &str) -> Result<String, AuthError> {
        let secrets = self.client_secrets().await?;
        let scope = GMAIL_SCOPES.join(" ");
        let url = url::Url::parse_with_params(
            &secrets.auth_uri,
            &[
                ("client_id", secrets.client_id.as_str()),
                ("redirect_uri", redirect_uri),
                ("response_type", "code"),
                ("scope", scope.as_str()),
                ("access_type", "offline"),
                ("prompt", "consent"),
            ],
        )
        .map_err(|err| AuthError::Credentials {
            path: self.credentials_path.clone(),
            reason: format!("invalid auth_uri: {err}"),
        })?;
        Ok(url.to_string())
    }

    /// Trades an authorization code for tokens and writes the token store.
    pub async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<(), AuthError> {
        let secrets = self.client_secrets().await?;
        let response = self
            .http
            .post(&secrets.token_uri)
            .form(&[
                ("code", code),
                ("client_id", secrets.client_id.as_str()),
                ("client_secret", secrets.client_secret.as_str()),
                ("redirect_uri", redirect_uri),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?;
        let grant = read_grant(response).await?;

        let token = StoredToken {
            token: Some(grant.access_token),
            refresh_token: grant.refresh_token,
            token_uri: secrets.token_uri,
            client_id: Some(secrets.client_id),
            client_secret: Some(secrets.client_secret),
            scopes: GMAIL_SCOPES.iter().map(|s| s.to_string()).collect(),
            expiry: grant
                .expires_in
                .map(|secs| Utc::now() + Duration::seconds(secs)),
        };

        let mut cached = self.cached.lock().await;
        self.save_token(&token).await?;
        *cached = Some(token);
        tracing::info!(path = %self.token_path.display(), "saved Gmail token");
        Ok(())
    }
}

async fn read_grant(response: reqwest::Response) -> Result<TokenGrant, AuthError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        let message = serde_json::from_str::<TokenEndpointError>(&body)
            .map(|err| match err.error_description {
                Some(description) => format!("{}: {}", err.error, description),
                None => err.error,
            })
            .unwrap_or_else(|_| format!("HTTP {status}: {body}"));
        return Err(AuthError::TokenEndpoint(message));
    }
    Ok(serde_json::from_str(&body)?)
}

/// Waits for the browser to hit the loopback redirect and returns the
/// authorization code from its query string.
pub async fn capture_redirect(listener: TcpListener) -> Result<String, AuthError> {
    let (mut socket, _) = listener.accept().await?;

    let mut received = Vec::new();
    let mut buf = [0_u8; 1024];
    loop {
        let read = socket.read(&mut buf).await?;
        if read == 0 {
            break;
        }
        received.extend_from_slice(&buf[..read]);
        if received.windows(4).any(|window| window == b"\r\n\r\n") {
            break;
        }
    }

    let request = String::from_utf8_lossy(&received);
    let result = authorization_code(&request);

    let page = match &result {
        Ok(_) => "Authorization complete. You can close this window.",
        Err(_) => "Authorization failed. Return to the terminal for details.",
    };
    let reply = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/plain; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        page.len(),
        page
    );
    socket.write_all(reply.as_bytes()).await?;
    let _ = socket.shutdown().await;

    result
}

fn authorization_code(request: &str) -> Result<String, AuthError> {
    let target = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .ok_or_else(|| AuthError::Redirect("empty request".to_string()))?;
    let url = url::Url::parse(&format!("http://localhost{target}"))
        .map_err(|err| AuthError::Redirect(err.to_string()))?;

    let mut code = None;
    let mut error = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            _ => {}
        }
    }

    match (code, error) {
        (Some(code), _) => Ok(code),
        (None, Some(error)) => Err(AuthError::Redirect(error)),
        (None, None) => Err(AuthError::Redirect(target.to_string())),
    }
}
