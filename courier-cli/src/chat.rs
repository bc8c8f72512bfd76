use std::path::PathBuf;

use courier_agent::ChatSession;
use courier_llm::Llm;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::frontend::{clean_output, FAILURE_NOTICE};

const PROMPT: &str = "you> ";

/// Runs one submission and returns the text to show the user.
pub async fn respond<L: Llm>(session: &mut ChatSession<L>, input: &str) -> String {
    match session.submit(input).await {
        Ok(run) => {
            let cleaned = clean_output(&run.output);
            if cleaned.is_empty() {
                FAILURE_NOTICE.to_string()
            } else {
                cleaned
            }
        }
        Err(err) => {
            tracing::error!(error = %err, "agent run failed");
            FAILURE_NOTICE.to_string()
        }
    }
}

fn history_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("courier").join("history.txt"))
}

pub async fn run_chat<L: Llm>(session: &mut ChatSession<L>) -> anyhow::Result<()> {
    let mut editor = DefaultEditor::new()?;
    let history = history_path();
    if let Some(path) = &history {
        let _ = editor.load_history(path);
    }

    println!("courier: ask about your inbox, send an email, or search the web.");
    println!("Type /clear to start over, exit to leave.\n");

    loop {
        let line = match editor.readline(PROMPT) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        let _ = editor.add_history_entry(input);

        match input {
            "exit" | "quit" => break,
            "/clear" => {
                session.clear();
                println!("Conversation cleared.\n");
            }
            _ => {
                let reply = respond(session, input).await;
                println!("\n{reply}\n");
            }
        }
    }

    if let Some(path) = &history {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        if let Err(err) = editor.save_history(path) {
            tracing::debug!(error = %err, "could not save line history");
        }
    }
    Ok(())
}
