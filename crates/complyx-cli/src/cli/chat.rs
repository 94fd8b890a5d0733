//! Chat CLI commands: send, history, clear.
//!
//! All three operate on the active session; the message log's working view
//! is pointed at it before any mutation.

use anyhow::{Context, Result};
use clap::Subcommand;
use console::style;
use dialoguer::Confirm;
use uuid::Uuid;

use complyx_core::chat::NewMessage;

use crate::state::AppState;

/// Preview length shown in session listings.
const PREVIEW_CHARS: usize = 60;

#[derive(Subcommand)]
pub enum ChatCommand {
    /// Send a message in the active session.
    Send {
        /// Message text.
        content: String,
        /// Assessment question this message relates to.
        #[arg(long)]
        question: Option<String>,
    },

    /// Show the active session's message history.
    History,

    /// Clear the active session's message history.
    Clear {
        /// Skip the confirmation prompt.
        #[arg(long)]
        force: bool,
    },
}

pub async fn run(state: &mut AppState, command: ChatCommand, json: bool) -> Result<()> {
    match command {
        ChatCommand::Send { content, question } => send(state, content, question, json).await,
        ChatCommand::History => history(state, json).await,
        ChatCommand::Clear { force } => clear(state, force, json).await,
    }
}

fn active_session(state: &AppState) -> Result<Uuid> {
    state.sessions.active_session_id().context(
        "No active session. Create one with: complyx session new",
    )
}

async fn send(
    state: &mut AppState,
    content: String,
    question: Option<String>,
    json: bool,
) -> Result<()> {
    let session_id = active_session(state)?;
    state.log.set_current_session(Some(session_id)).await?;

    let mut draft = NewMessage::user(content.as_str());
    if let Some(question_id) = question {
        draft = draft.with_question_id(question_id);
    }
    let message_id = state
        .log
        .add_message(draft)
        .await?
        .context("message was not added")?;

    // Keep the registry's derived display fields in step with the log.
    state
        .sessions
        .update_session_preview(session_id, preview_of(&content))
        .await?;
    state
        .sessions
        .update_session_message_count(session_id, state.log.messages().len() as u32)
        .await?;

    if json {
        println!(
            "{}",
            serde_json::json!({
                "sent": true,
                "session_id": session_id.to_string(),
                "message_id": message_id.to_string(),
            })
        );
    } else {
        println!(
            "  {} Message sent ({} in session).",
            style("+").green().bold(),
            state.log.messages().len()
        );
    }
    Ok(())
}

async fn history(state: &mut AppState, json: bool) -> Result<()> {
    let session_id = active_session(state)?;
    state.log.set_current_session(Some(session_id)).await?;

    let messages = state.log.messages();

    if json {
        println!("{}", serde_json::to_string_pretty(messages)?);
        return Ok(());
    }

    if messages.is_empty() {
        println!();
        println!("  {} No messages yet.", style("i").blue().bold());
        println!();
        return Ok(());
    }

    println!();
    for message in messages {
        let who = if message.is_user {
            style("You").cyan().bold()
        } else {
            style("Advisor").magenta().bold()
        };
        let time = message.timestamp.format("%H:%M");
        let status = message
            .status
            .map(|s| format!(" [{s}]"))
            .unwrap_or_default();
        println!("  {who} ({time}){status}");
        println!("  {}", message.content);
        println!();
    }

    Ok(())
}

async fn clear(state: &mut AppState, force: bool, json: bool) -> Result<()> {
    let session_id = active_session(state)?;
    state.log.set_current_session(Some(session_id)).await?;

    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Clear {} message(s) from the active session?",
                state.log.messages().len()
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    state.log.clear_messages().await?;
    state
        .sessions
        .update_session_message_count(session_id, 0)
        .await?;

    if json {
        println!(
            "{}",
            serde_json::json!({"cleared": true, "session_id": session_id.to_string()})
        );
    } else {
        println!("  {} History cleared.", style("x").red().bold());
    }
    Ok(())
}

/// Truncate message content to the preview shown in session listings.
fn preview_of(content: &str) -> String {
    if content.chars().count() <= PREVIEW_CHARS {
        content.to_string()
    } else {
        let cut: String = content.chars().take(PREVIEW_CHARS - 3).collect();
        format!("{cut}...")
    }
}
