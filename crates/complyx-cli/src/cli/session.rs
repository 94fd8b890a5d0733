//! Session management CLI commands: list, new, rename, delete, use.
//!
//! Provides session browsing with rich tables and deletion with a
//! confirmation prompt.

use anyhow::{Context, Result};
use clap::Subcommand;
use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use console::style;
use dialoguer::Confirm;
use uuid::Uuid;

use crate::state::AppState;

#[derive(Subcommand)]
pub enum SessionCommand {
    /// List sessions (most recently created first).
    #[command(alias = "ls")]
    List,

    /// Create a session and make it active.
    New {
        /// Session name; defaults to the current date/time.
        name: Option<String>,
    },

    /// Rename a session.
    Rename {
        /// Session id.
        id: Uuid,
        /// New name (an empty name leaves the session untouched).
        name: String,
    },

    /// Delete a session. Its message history is kept (recoverable by id).
    #[command(alias = "rm")]
    Delete {
        /// Session id.
        id: Uuid,
        /// Skip the confirmation prompt.
        #[arg(long)]
        force: bool,
    },

    /// Make a session active.
    Use {
        /// Session id.
        id: Uuid,
    },
}

pub async fn run(state: &mut AppState, command: SessionCommand, json: bool) -> Result<()> {
    match command {
        SessionCommand::List => list_sessions(state, json),
        SessionCommand::New { name } => new_session(state, name, json).await,
        SessionCommand::Rename { id, name } => rename_session(state, id, &name, json).await,
        SessionCommand::Delete { id, force } => delete_session(state, id, force, json).await,
        SessionCommand::Use { id } => use_session(state, id, json).await,
    }
}

fn list_sessions(state: &AppState, json: bool) -> Result<()> {
    let sessions = state.sessions.sessions();
    let active = state.sessions.active_session_id();

    if json {
        println!("{}", serde_json::to_string_pretty(sessions)?);
        return Ok(());
    }

    if sessions.is_empty() {
        println!();
        println!(
            "  {} No sessions yet. Start one with: {}",
            style("i").blue().bold(),
            style("complyx session new").yellow()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("").fg(Color::White),
        Cell::new("Name").fg(Color::White),
        Cell::new("Id").fg(Color::White),
        Cell::new("Created").fg(Color::White),
        Cell::new("Messages").fg(Color::White),
        Cell::new("Preview").fg(Color::White),
    ]);

    for session in sessions {
        let marker = if Some(session.id) == active { "*" } else { "" };
        let preview = session.preview.as_deref().unwrap_or("");

        table.add_row(vec![
            Cell::new(marker).fg(Color::Green),
            Cell::new(&session.name).fg(Color::Cyan),
            Cell::new(session.id.to_string()).fg(Color::DarkGrey),
            Cell::new(session.created_at.format("%Y-%m-%d %H:%M").to_string())
                .fg(Color::White),
            Cell::new(session.message_count.to_string()).fg(Color::White),
            Cell::new(preview).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} session{}",
        style(sessions.len()).bold(),
        if sessions.len() == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}

async fn new_session(state: &mut AppState, name: Option<String>, json: bool) -> Result<()> {
    let id = state.sessions.create_session(name).await?;
    state.log.set_current_session(Some(id)).await?;

    if json {
        println!(
            "{}",
            serde_json::json!({"created": true, "session_id": id.to_string()})
        );
    } else {
        let session = state
            .sessions
            .get_session(&id)
            .context("session vanished after creation")?;
        println!(
            "  {} Session '{}' created and active.",
            style("+").green().bold(),
            style(&session.name).cyan()
        );
    }
    Ok(())
}

async fn rename_session(state: &mut AppState, id: Uuid, name: &str, json: bool) -> Result<()> {
    state
        .sessions
        .get_session(&id)
        .with_context(|| format!("Session '{id}' not found"))?;

    state.sessions.rename_session(id, name).await?;

    let session = state
        .sessions
        .get_session(&id)
        .with_context(|| format!("Session '{id}' not found"))?;

    if json {
        println!(
            "{}",
            serde_json::json!({"session_id": id.to_string(), "name": session.name})
        );
    } else if name.trim().is_empty() {
        println!("  {} Empty name ignored.", style("i").blue().bold());
    } else {
        println!(
            "  {} Session renamed to '{}'.",
            style("~").yellow().bold(),
            style(&session.name).cyan()
        );
    }
    Ok(())
}

async fn delete_session(state: &mut AppState, id: Uuid, force: bool, json: bool) -> Result<()> {
    let session = state
        .sessions
        .get_session(&id)
        .with_context(|| format!("Session '{id}' not found"))?
        .clone();

    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete session '{}' ({} messages)?",
                style(&session.name).red().bold(),
                session.message_count
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    state.sessions.delete_session(id).await?;

    // Keep the log's pointer in step with the registry's promotion.
    state
        .log
        .set_current_session(state.sessions.active_session_id())
        .await?;

    if json {
        println!(
            "{}",
            serde_json::json!({"deleted": true, "session_id": id.to_string()})
        );
    } else {
        println!(
            "  {} Session '{}' deleted.",
            style("x").red().bold(),
            session.name
        );
    }
    Ok(())
}

async fn use_session(state: &mut AppState, id: Uuid, json: bool) -> Result<()> {
    let session = state
        .sessions
        .get_session(&id)
        .with_context(|| format!("Session '{id}' not found"))?
        .clone();

    state.sessions.set_active_session(id).await?;
    state.log.set_current_session(Some(id)).await?;

    if json {
        println!(
            "{}",
            serde_json::json!({"active": true, "session_id": id.to_string()})
        );
    } else {
        println!(
            "  {} Session '{}' is now active.",
            style(">").green().bold(),
            style(&session.name).cyan()
        );
    }
    Ok(())
}
