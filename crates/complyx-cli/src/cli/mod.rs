//! CLI command definitions and dispatch for the `complyx` binary.
//!
//! Uses clap derive macros for argument parsing. The CLI follows a
//! verb-noun pattern (e.g., `complyx session new`, `complyx assessment
//! answer`).

pub mod assessment;
pub mod chat;
pub mod session;

use clap::{Parser, Subcommand};

/// IFRS sustainability-disclosure assessment and chat client.
#[derive(Parser)]
#[command(name = "complyx", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage chat sessions (list, new, rename, delete, use).
    Session {
        #[command(subcommand)]
        action: session::SessionCommand,
    },

    /// Chat within the active session (send, history, clear).
    Chat {
        #[command(subcommand)]
        action: chat::ChatCommand,
    },

    /// Drive the IFRS disclosure assessment (answer, status, scores, sync).
    Assessment {
        #[command(subcommand)]
        action: assessment::AssessmentCommand,
    },
}
