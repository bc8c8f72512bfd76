use anyhow::Context;
use courier_tools::gmail::capture_redirect;
use tokio::net::TcpListener;

use crate::cli::AgentArgs;

/// Walks the user through Gmail consent and writes the token store.
pub async fn run_auth(args: &AgentArgs, port: u16) -> anyhow::Result<()> {
    let auth = args.tools_config().gmail_auth();

    let listener = TcpListener::bind(("127.0.0.1", port))
        .await
        .context("opening the local OAuth redirect port")?;
    let redirect_uri = format!("http://127.0.0.1:{}/", listener.local_addr()?.port());

    let url = auth
        .consent_url(&redirect_uri)
        .await
        .with_context(|| format!("reading {}", auth.credentials_path().display()))?;
    println!("Open this URL in your browser to let courier use Gmail:\n\n{url}\n");
    println!("Waiting for the browser to return...");

    let code = capture_redirect(listener).await?;
    auth.exchange_code(&code, &redirect_uri).await?;

    println!("Saved Gmail token to {}", auth.token_path().display());
    Ok(())
}
