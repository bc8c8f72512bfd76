use std::path::Path;
use std::sync::Arc;

use courier_core::{Tool, ToolError};
use courier_tools::gmail::{capture_redirect, StoredToken};
use courier_tools::{GmailAuth, GmailClient, SearchEmailsTool, SendEmailTool};
use httpmock::prelude::*;
use serde_json::json;
use tempfile::TempDir;

fn write_token(dir: &Path, token_uri: &str, expiry: &str) -> std::path::PathBuf {
    let path = dir.join("token.json");
    let body = json!({
        "token": "access-1",
        "refresh_token": "refresh-1",
        "token_uri": token_uri,
        "client_id": "client-id",
        "client_secret": "client-secret",
        "scopes": ["https://www.googleapis.com/auth/gmail.readonly"],
        "expiry": expiry
    });
    std::fs::write(&path, body.to_string()).unwrap();
    path
}

fn gmail(server: &MockServer, dir: &TempDir, expiry: &str) -> GmailClient {
    let token = write_token(dir.path(), &server.url("/token"), expiry);
    let auth = GmailAuth::new(dir.path().join("credentials.json"), token);
    GmailClient::new(Arc::new(auth)).with_base_url(server.url("/gmail/v1"))
}

#[tokio::test]
async fn search_emails_returns_header_summaries() {
    let server = MockServer::start();
    let dir = TempDir::new().unwrap();
    let list = server.mock(|when, then| {
        when.method(GET)
            .path("/gmail/v1/users/me/messages")
            .query_param("q", "from:alice")
            .query_param("maxResults", "5")
            .header("authorization", "Bearer access-1");
        then.status(200)
            .json_body(json!({"messages": [{"id": "m1", "threadId": "t1"}]}));
    });
    let get = server.mock(|when, then| {
        when.method(GET)
            .path("/gmail/v1/users/me/messages/m1")
            .query_param("format", "metadata");
        then.status(200).json_body(json!({
            "id": "m1",
            "snippet": "x".repeat(150),
            "payload": {"headers": [
                {"name": "From", "value": "Alice <alice@example.com>"},
                {"name": "Subject", "value": "Lunch"},
                {"name": "Date", "value": "Mon, 1 Jan 2024 10:00:00 +0000"}
            ]}
        }));
    });

    let tool = SearchEmailsTool::new(gmail(&server, &dir, "2099-01-01T00:00:00Z"));
    let output = tool.invoke("from:alice").await.unwrap();

    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(parsed[0]["From"], "Alice <alice@example.com>");
    assert_eq!(parsed[0]["Subject"], "Lunch");
    assert_eq!(parsed[0]["Date"], "Mon, 1 Jan 2024 10:00:00 +0000");
    assert_eq!(parsed[0]["Snippet"], format!("{}...", "x".repeat(100)));
    list.assert();
    get.assert();
}

#[tokio::test]
async fn search_emails_honours_max_results_assignment() {
    let server = MockServer::start();
    let dir = TempDir::new().unwrap();
    let list = server.mock(|when, then| {
        when.method(GET)
            .path("/gmail/v1/users/me/messages")
            .query_param("q", "is:unread")
            .query_param("maxResults", "2");
        then.status(200).json_body(json!({"resultSizeEstimate": 0}));
    });

    let tool = SearchEmailsTool::new(gmail(&server, &dir, "2099-01-01T00:00:00Z"));
    let output = tool
        .invoke(r#"query="is:unread", max_results=2"#)
        .await
        .unwrap();
    assert_eq!(output, "[]");
    list.assert();
}

#[tokio::test]
async fn search_emails_asks_for_at_least_one_message() {
    let server = MockServer::start();
    let dir = TempDir::new().unwrap();
    let list = server.mock(|when, then| {
        when.method(GET)
            .path("/gmail/v1/users/me/messages")
            .query_param("q", "from:bob")
            .query_param("maxResults", "1");
        then.status(200).json_body(json!({"resultSizeEstimate": 0}));
    });

    let tool = SearchEmailsTool::new(gmail(&server, &dir, "2099-01-01T00:00:00Z"));
    let output = tool
        .invoke(r#"query="from:bob", max_results=0"#)
        .await
        .unwrap();
    assert_eq!(output, "[]");
    list.assert();
}

#[tokio::test]
async fn stale_token_is_refreshed_and_written_back() {
    let server = MockServer::start();
    let dir = TempDir::new().unwrap();
    let refresh = server.mock(|when, then| {
        when.method(POST)
            .path("/token")
            .body_contains("grant_type=refresh_token")
            .body_contains("refresh_token=refresh-1");
        then.status(200)
            .json_body(json!({"access_token": "access-2", "expires_in": 3600, "token_type": "Bearer"}));
    });
    let list = server.mock(|when, then| {
        when.method(GET)
            .path("/gmail/v1/users/me/messages")
            .header("authorization", "Bearer access-2");
        then.status(200).json_body(json!({}));
    });

    let tool = SearchEmailsTool::new(gmail(&server, &dir, "2000-01-01T00:00:00.000000Z"));
    tool.invoke("anything").await.unwrap();
    tool.invoke("anything").await.unwrap();

    refresh.assert_hits(1);
    list.assert_hits(2);
    let saved: StoredToken =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("token.json")).unwrap())
            .unwrap();
    assert_eq!(saved.token.as_deref(), Some("access-2"));
    assert_eq!(saved.refresh_token.as_deref(), Some("refresh-1"));
    assert!(saved.expiry.is_some());
}

#[tokio::test]
async fn rejected_refresh_is_an_auth_error() {
    let server = MockServer::start();
    let dir = TempDir::new().unwrap();
    server.mock(|when, then| {
        when.method(POST).path("/token");
        then.status(400)
            .json_body(json!({"error": "invalid_grant", "error_description": "Token has been revoked."}));
    });

    let tool = SearchEmailsTool::new(gmail(&server, &dir, "2000-01-01T00:00:00Z"));
    let err = tool.invoke("x").await.unwrap_err();
    assert!(matches!(err, ToolError::Auth(_)));
    assert!(err.to_string().contains("invalid_grant: Token has been revoked."));
}

#[tokio::test]
async fn missing_token_file_asks_for_authorization() {
    let dir = TempDir::new().unwrap();
    let auth = GmailAuth::new(dir.path().join("credentials.json"), dir.path().join("token.json"));
    let tool = SearchEmailsTool::new(GmailClient::new(Arc::new(auth)));

    let err = tool.invoke("x").await.unwrap_err();
    assert!(matches!(err, ToolError::Auth(_)));
    assert!(err.to_string().contains("courier auth"));
}

#[tokio::test]
async fn send_email_posts_raw_message() {
    let server = MockServer::start();
    let dir = TempDir::new().unwrap();
    let send = server.mock(|when, then| {
        when.method(POST)
            .path("/gmail/v1/users/me/messages/send")
            .header("authorization", "Bearer access-1")
            .body_contains("\"raw\":");
        then.status(200).json_body(json!({"id": "sent-1", "labelIds": ["SENT"]}));
    });

    let tool = SendEmailTool::new(gmail(&server, &dir, "2099-01-01T00:00:00Z"), "Sam");
    let output = tool
        .invoke(r#"to="bob@example.com", subject="Hi", body="Hello\n[Your Name]""#)
        .await
        .unwrap();
    assert_eq!(output, "Email successfully sent to bob@example.com");
    send.assert();
}

#[tokio::test]
async fn send_email_validates_before_calling_gmail() {
    let server = MockServer::start();
    let dir = TempDir::new().unwrap();
    let send = server.mock(|when, then| {
        when.method(POST).path("/gmail/v1/users/me/messages/send");
        then.status(200).json_body(json!({}));
    });

    let tool = SendEmailTool::new(gmail(&server, &dir, "2099-01-01T00:00:00Z"), "Sam");
    let err = tool
        .invoke(r#"to="bad", subject="Hi", body="x""#)
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::InvalidInput(_)));
    assert_eq!(err.to_string(), "Invalid email address format");
    send.assert_hits(0);
}

#[tokio::test]
async fn gmail_api_error_message_is_surfaced() {
    let server = MockServer::start();
    let dir = TempDir::new().unwrap();
    server.mock(|when, then| {
        when.method(POST).path("/gmail/v1/users/me/messages/send");
        then.status(403)
            .json_body(json!({"error": {"code": 403, "message": "Insufficient Permission"}}));
    });

    let tool = SendEmailTool::new(gmail(&server, &dir, "2099-01-01T00:00:00Z"), "Sam");
    let err = tool
        .invoke(r#"to="bob@example.com", subject="Hi", body="x""#)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Insufficient Permission"));
}

#[tokio::test]
async fn consent_url_and_code_exchange_write_the_token_store() {
    let server = MockServer::start();
    let dir = TempDir::new().unwrap();
    let credentials = dir.path().join("credentials.json");
    std::fs::write(
        &credentials,
        json!({"installed": {
            "client_id": "client-id",
            "client_secret": "client-secret",
            "auth_uri": server.url("/auth"),
            "token_uri": server.url("/token")
        }})
        .to_string(),
    )
    .unwrap();
    let exchange = server.mock(|when, then| {
        when.method(POST)
            .path("/token")
            .body_contains("grant_type=authorization_code")
            .body_contains("code=the-code");
        then.status(200).json_body(json!({
            "access_token": "access-9",
            "refresh_token": "refresh-9",
            "expires_in": 3599
        }));
    });

    let token_path = dir.path().join("nested").join("token.json");
    let auth = GmailAuth::new(&credentials, &token_path);

    let url = auth.consent_url("http://127.0.0.1:8765/").await.unwrap();
    assert!(url.starts_with(&server.url("/auth")));
    assert!(url.contains("client_id=client-id"));
    assert!(url.contains("access_type=offline"));
    assert!(url.contains("gmail.send"));

    auth.exchange_code("the-code", "http://127.0.0.1:8765/")
        .await
        .unwrap();
    exchange.assert();

    let saved = auth.load_token().await.unwrap();
    assert_eq!(saved.token.as_deref(), Some("access-9"));
    assert_eq!(saved.refresh_token.as_deref(), Some("refresh-9"));
    assert_eq!(saved.token_uri, server.url("/token"));
    assert_eq!(saved.scopes.len(), 2);
    assert_eq!(auth.access_token().await.unwrap(), "access-9");
}

#[tokio::test]
async fn loopback_redirect_yields_the_code() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let waiter = tokio::spawn(capture_redirect(listener));

    let page = reqwest::get(format!("http://{addr}/?code=abc123&scope=x"))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("Authorization complete"));
    assert_eq!(waiter.await.unwrap().unwrap(), "abc123");
}
