pub mod auth;
pub mod chat;
pub mod cli;
pub mod frontend;

pub use cli::{AgentArgs, Cli, Command};
