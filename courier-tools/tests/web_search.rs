use courier_core::{Tool, ToolError};
use courier_tools::GoogleSearchTool;
use httpmock::prelude::*;
use serde_json::json;

fn tool(server: &MockServer) -> GoogleSearchTool {
    GoogleSearchTool::new()
        .api_key("cse-key")
        .engine_id("cse-cx")
        .with_base_url(server.url("/customsearch/v1"))
}

#[tokio::test]
async fn formats_each_result() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/customsearch/v1")
            .query_param("q", "rust async")
            .query_param("key", "cse-key")
            .query_param("cx", "cse-cx")
            .query_param("num", "3");
        then.status(200).json_body(json!({
            "items": [
                {"title": "Tokio", "link": "https://tokio.rs", "snippet": "An async runtime"},
                {"title": "Async Book", "link": "https://rust-lang.github.io/async-book", "snippet": "Guide"}
            ]
        }));
    });

    let output = tool(&server).invoke("rust async").await.unwrap();
    assert_eq!(
        output,
        "Title: Tokio\nLink: https://tokio.rs\nSnippet: An async runtime\n\n\
         Title: Async Book\nLink: https://rust-lang.github.io/async-book\nSnippet: Guide\n"
    );
    mock.assert();
}

#[tokio::test]
async fn num_results_assignment_sets_count() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/customsearch/v1")
            .query_param("q", "weather today")
            .query_param("num", "5");
        then.status(200).json_body(json!({"searchInformation": {"totalResults": "0"}}));
    });

    let output = tool(&server)
        .invoke(r#"query="weather today", num_results=5"#)
        .await
        .unwrap();
    assert_eq!(output, "No results found");
    mock.assert();
}

#[tokio::test]
async fn missing_credentials_fail_without_a_request() {
    let err = GoogleSearchTool::new()
        .engine_id("cse-cx")
        .invoke("anything")
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::Config(_)));
    assert_eq!(err.to_string(), "Missing Google CSE API key or CX");
}

#[tokio::test]
async fn api_error_is_reported() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/customsearch/v1");
        then.status(429)
            .json_body(json!({"error": {"code": 429, "message": "Quota exceeded"}}));
    });

    let err = tool(&server).invoke("x").await.unwrap_err();
    assert!(err.to_string().contains("Quota exceeded"));
}
