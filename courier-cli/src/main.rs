use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use courier_cli::auth::run_auth;
use courier_cli::chat::{respond, run_chat};
use courier_cli::frontend::StatusReporter;
use courier_cli::{Cli, Command};
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,courier={level},courier_agent={level},courier_tools={level},courier_cli={level}"
        ))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; variables may come from the environment.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command.unwrap_or(Command::Chat) {
        Command::Chat => {
            let mut session = cli
                .agent
                .build_session(Some(Arc::new(StatusReporter::stderr())))?;
            run_chat(&mut session).await?;
        }
        Command::Ask { query } => {
            let mut session = cli
                .agent
                .build_session(Some(Arc::new(StatusReporter::stderr())))?;
            println!("{}", respond(&mut session, &query.join(" ")).await);
        }
        Command::Auth { port } => run_auth(&cli.agent, port).await?,
    }
    Ok(())
}
