//! Terminal presentation: cleaning agent text for display and showing what
//! the agent is busy with.

use std::io::Write;
use std::sync::{Mutex, OnceLock};

use courier_agent::{AgentEvent, AgentObserver};
use regex::Regex;

pub const FAILURE_NOTICE: &str = "Sorry, I couldn't generate a response.";

const BOILERPLATE: [&str; 2] = ["> Finished chain.", "❌ Error: No message found in input"];
const RULE_WIDTH: usize = 50;

fn ansi_escape() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"\x1B(?:[@-Z\\-_]|\[[0-?]*[ -/]*[@-~])").ok())
        .as_ref()
}

/// Strips terminal escapes and agent-framework boilerplate from `text`.
pub fn clean_output(text: &str) -> String {
    let mut cleaned = match ansi_escape() {
        Some(pattern) => pattern.replace_all(text, "").into_owned(),
        None => text.to_string(),
    };
    for noise in BOILERPLATE {
        cleaned = cleaned.replace(noise, "");
    }
    cleaned = cleaned.replace(&"=".repeat(RULE_WIDTH), "");
    cleaned.trim().to_string()
}

/// First tool named by an `Action:` line in an agent trace.
pub fn detect_tool(trace: &str) -> Option<&str> {
    trace.match_indices("Action:").find_map(|(at, marker)| {
        let rest = trace[at + marker.len()..].trim_start();
        let end = rest
            .find(|c: char| !(c.is_alphanumeric() || c == '_'))
            .unwrap_or(rest.len());
        let name = &rest[..end];
        (!name.is_empty()).then_some(name)
    })
}

pub fn tool_status_message(tool: Option<&str>) -> &'static str {
    match tool {
        Some("search_emails") => "🔍 Searching your inbox...",
        Some("send_email") => "📧 Preparing to send email...",
        Some("google_search") => "🌐 Searching the web...",
        Some("web_scraping") => "🕸️ Analyzing webpage content...",
        _ => "🤖 Processing your request...",
    }
}

/// Prints a one-line status whenever the agent starts thinking or calls a
/// tool.
pub struct StatusReporter<W> {
    out: Mutex<W>,
}

impl StatusReporter<std::io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(std::io::stderr())
    }
}

impl<W> StatusReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<W> AgentObserver for StatusReporter<W>
where
    W: Write + Send,
{
    fn on_event(&self, event: &AgentEvent) {
        let line = match event {
            AgentEvent::Thinking { step: 1 } => tool_status_message(None),
            AgentEvent::ToolStarted { tool, .. } => tool_status_message(Some(tool.as_str())),
            _ => return,
        };
        if let Ok(mut out) = self.out.lock() {
            let _ = writeln!(out, "{line}");
            let _ = out.flush();
        }
    }
}
