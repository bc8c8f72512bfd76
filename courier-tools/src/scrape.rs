use std::time::Duration;

use async_trait::async_trait;
use courier_core::{Tool, ToolError};
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};

use crate::args::strip_quotes;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
pub const DEFAULT_SCRAPE_TIMEOUT: Duration = Duration::from_secs(10);

const IGNORED_TAGS: [&str; 5] = ["script", "style", "nav", "footer", "header"];
const CONTENT_TAGS: [&str; 3] = ["article", "main", "div"];
const CONTENT_CLASSES: [&str; 3] = ["content", "main", "article"];
const TEXT_SELECTOR: &str = "p, h1, h2, h3, h4, h5, h6";

const PREVIEW_CHARS: usize = 1000;
const TOPIC_CHARS: usize = 200;
const KEY_LINE_CHARS: usize = 50;
const KEY_LINES: usize = 3;

/// Fetches a page and returns a short text analysis of its readable content.
#[derive(Debug, Clone)]
pub struct WebScrapingTool {
    http: Client,
}

impl WebScrapingTool {
    pub fn new() -> Result<Self, ToolError> {
        Self::with_timeout(DEFAULT_SCRAPE_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, ToolError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|err| ToolError::Config(format!("could not build HTTP client: {err}")))?;
        Ok(Self { http })
    }
}

#[async_trait]
impl Tool for WebScrapingTool {
    fn name(&self) -> &str {
        "web_scraping"
    }

    fn description(&self) -> &str {
        "Fetch a public web page and summarize its main text. Input is the full URL \
         including http:// or https://."
    }

    async fn invoke(&self, input: &str) -> Result<String, ToolError> {
        let url = strip_quotes(input);
        if url.is_empty() {
            return Err(ToolError::InvalidInput("a URL is required".to_string()));
        }

        let response = self
            .http
            .get(url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|err| ToolError::ExecutionFailed(format!("could not access {url}: {err}")))?;
        let html = response
            .text()
            .await
            .map_err(|err| ToolError::ExecutionFailed(format!("could not read {url}: {err}")))?;

        tracing::debug!(url = %url, bytes = html.len(), "fetched page");
        analyze_page(&html)
    }
}

/// Extracts title and readable text from an HTML document and renders the
/// analysis text.
pub fn analyze_page(html: &str) -> Result<String, ToolError> {
    let document = Html::parse_document(html);
    let title = page_title(&document)?.unwrap_or_else(|| "No title found".to_string());
    let blocks = text_blocks(&document)?;
    Ok(render_analysis(&title, &blocks))
}

fn selector(css: &str) -> Result<Selector, ToolError> {
    Selector::parse(css)
        .map_err(|err| ToolError::ExecutionFailed(format!("bad selector `{css}`: {err:?}")))
}

fn is_ignored(element: ElementRef<'_>) -> bool {
    IGNORED_TAGS.contains(&element.value().name())
}

fn inside_ignored(element: ElementRef<'_>) -> bool {
    is_ignored(element) || element.ancestors().filter_map(ElementRef::wrap).any(is_ignored)
}

fn page_title(document: &Html) -> Result<Option<String>, ToolError> {
    let title = selector("title")?;
    Ok(document
        .select(&title)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty()))
}

fn content_root(document: &Html) -> Result<ElementRef<'_>, ToolError> {
    let candidates = CONTENT_TAGS
        .iter()
        .flat_map(|tag| CONTENT_CLASSES.iter().map(move |class| format!("{tag}.{class}")))
        .collect::<Vec<_>>()
        .join(", ");
    let candidates = selector(&candidates)?;
    if let Some(root) = document
        .select(&candidates)
        .find(|element| !inside_ignored(*element))
    {
        return Ok(root);
    }

    let body = selector("body")?;
    Ok(document
        .select(&body)
        .next()
        .unwrap_or_else(|| document.root_element()))
}

fn visible_text(element: ElementRef<'_>) -> String {
    element
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let hidden = node.ancestors().filter_map(ElementRef::wrap).any(is_ignored);
            (!hidden).then_some(&**text)
        })
        .collect()
}

fn text_blocks(document: &Html) -> Result<Vec<String>, ToolError> {
    let root = content_root(document)?;
    let text = selector(TEXT_SELECTOR)?;
    Ok(root
        .select(&text)
        .filter(|element| !inside_ignored(*element))
        .map(|element| visible_text(element).trim().to_string())
        .filter(|block| !block.is_empty())
        .collect())
}

fn prefix(text: &str, chars: usize) -> String {
    text.chars().take(chars).collect()
}

fn render_analysis(title: &str, blocks: &[String]) -> String {
    let content = blocks.join("\n");
    let key_lines = blocks
        .iter()
        .take(KEY_LINES)
        .map(|line| prefix(line, KEY_LINE_CHARS))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Webpage Analysis:\n\
         Title: {title}\n\
         \n\
         Main Content Summary:\n\
         {preview}...\n\
         \n\
         Key Points:\n\
         1. The page appears to be about: {topic}...\n\
         2. Main topics discussed: {key_lines}\n\
         3. Content length: {length} characters\n\
         \n\
         Note: This is a summary of the publicly accessible content. Some content may be \
         restricted or require authentication.",
        preview = prefix(&content, PREVIEW_CHARS),
        topic = prefix(&content, TOPIC_CHARS),
        length = content.chars().count(),
    )
}
