use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use clap::{ArgAction, Args, Parser, Subcommand};
use courier_agent::{AgentExecutor, AgentObserver, ChatSession, ToolRegistry, DEFAULT_MAX_ITERATIONS};
use courier_llm::{GoogleClient, DEFAULT_GEMINI_MODEL};
use courier_tools::{ToolsConfig, SENDER_PLACEHOLDER};

#[derive(Debug, Parser)]
#[command(
    name = "courier",
    version,
    about = "Chat assistant that reads and sends Gmail, searches the web and reads pages"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub agent: AgentArgs,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Interactive chat (default)
    Chat,
    /// Answer a single question and exit
    Ask {
        #[arg(required = true)]
        query: Vec<String>,
    },
    /// Authorize Gmail access and save the token
    Auth {
        /// Local port for the OAuth redirect (0 picks a free one)
        #[arg(long, default_value_t = 0)]
        port: u16,
    },
}

#[derive(Debug, Clone, Args)]
pub struct AgentArgs {
    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, env = "COURIER_MODEL", default_value = DEFAULT_GEMINI_MODEL)]
    pub model: String,

    /// Google Custom Search API key
    #[arg(long, env = "GOOGLE_CSE_API_KEY", hide_env_values = true)]
    pub cse_api_key: Option<String>,

    /// Google Custom Search engine id
    #[arg(long, env = "GOOGLE_CSE_CX")]
    pub cse_cx: Option<String>,

    /// Name used to sign outgoing email
    #[arg(long, env = "USER_NAME", default_value = SENDER_PLACEHOLDER)]
    pub user_name: String,

    /// OAuth client file downloaded from the Google Cloud console
    #[arg(long, env = "COURIER_CREDENTIALS", default_value = "credentials.json")]
    pub credentials: PathBuf,

    /// Where the Gmail token is stored
    #[arg(long, env = "COURIER_TOKEN", default_value = "token.json")]
    pub token: PathBuf,

    /// Tool calls allowed per question
    #[arg(long, env = "COURIER_MAX_ITERATIONS", default_value_t = DEFAULT_MAX_ITERATIONS)]
    pub max_iterations: u32,
}

impl AgentArgs {
    pub fn tools_config(&self) -> ToolsConfig {
        ToolsConfig::new()
            .sender_name(self.user_name.clone())
            .search_api_key(self.cse_api_key.clone())
            .search_engine_id(self.cse_cx.clone())
            .credentials_path(&self.credentials)
            .token_path(&self.token)
    }

    pub fn build_session(
        &self,
        observer: Option<Arc<dyn AgentObserver>>,
    ) -> anyhow::Result<ChatSession<GoogleClient>> {
        let api_key = self
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| anyhow!("GEMINI_API_KEY is not set (use --api-key or a .env file)"))?;

        let tools = self
            .tools_config()
            .build_tools()
            .context("building the tool set")?;
        let tools = ToolRegistry::from_tools(tools).context("building the tool set")?;
        let llm = GoogleClient::new(api_key, self.model.clone())
            .context("building the Gemini client")?;

        let mut executor = AgentExecutor::new(llm, tools)
            .with_model(self.model.clone())
            .with_max_iterations(self.max_iterations);
        if let Some(observer) = observer {
            executor = executor.with_observer(observer);
        }
        Ok(ChatSession::new(executor))
    }
}
