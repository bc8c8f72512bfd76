//! Tools the courier agent can call: Gmail search and send, Google web
//! search, and page scraping.
//!
//! Every tool takes the model's raw `Action Input` text and answers with a
//! string, or a [`courier_core::ToolError`] the agent turns into an
//! observation.

mod args;
mod config;
mod email;
pub mod gmail;
mod scrape;
mod search;

pub use args::{parse_assignments, strip_quotes};
pub use config::ToolsConfig;
pub use email::{EmailArgsError, EmailRequest, SENDER_PLACEHOLDER};
pub use gmail::{GmailAuth, GmailClient, SearchEmailsTool, SendEmailTool};
pub use scrape::{analyze_page, WebScrapingTool, DEFAULT_SCRAPE_TIMEOUT};
pub use search::{GoogleSearchTool, CUSTOM_SEARCH_URL};
