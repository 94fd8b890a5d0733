//! Assessment CLI commands: start, answer, status, scores, sync, reset.
//!
//! Local mutations always land (write-through); backend refreshes are best
//! effort -- a failed call is reported inline and the command still
//! succeeds with the local state.

use anyhow::{anyhow, Result};
use clap::Subcommand;
use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use console::style;
use dialoguer::Confirm;

use complyx_core::backend::AssessmentBackend;
use complyx_types::backend::{NextQuestionRequest, ProgressRequest, ScoreRequest};
use complyx_types::error::BackendError;

use crate::state::AppState;

#[derive(Subcommand)]
pub enum AssessmentCommand {
    /// Set the standard/phase and mark the assessment in progress.
    Start {
        /// IFRS standard (S1 or S2).
        #[arg(long)]
        standard: Option<String>,
        /// Questionnaire phase (quick, detailed, followup).
        #[arg(long)]
        phase: Option<String>,
    },

    /// Submit an answer, refresh progress, and show the next question.
    Answer {
        /// Question id (e.g. S1-GOV-01).
        question_id: String,
        /// Answer value.
        value: String,
        /// Skip the backend progress/next-question refresh.
        #[arg(long)]
        no_refresh: bool,
    },

    /// Remove an answer.
    #[command(alias = "rm")]
    Remove {
        /// Question id.
        question_id: String,
    },

    /// Show the assessment's current state.
    Status,

    /// Show cached compliance scores, optionally recomputing them first.
    Scores {
        /// Fetch fresh scores from the backend before printing.
        #[arg(long)]
        refresh: bool,
    },

    /// Mirror the assessment to the backend.
    Sync {
        /// Use the fire-and-forget autosave endpoint.
        #[arg(long)]
        autosave: bool,
    },

    /// Restore the assessment from a server-side mirror.
    Load {
        /// Server session id.
        session_id: String,
    },

    /// Reset the assessment to its initial state.
    Reset {
        /// Skip the confirmation prompt.
        #[arg(long)]
        force: bool,
    },
}

pub async fn run(state: &mut AppState, command: AssessmentCommand, json: bool) -> Result<()> {
    match command {
        AssessmentCommand::Start { standard, phase } => start(state, standard, phase, json).await,
        AssessmentCommand::Answer {
            question_id,
            value,
            no_refresh,
        } => answer(state, question_id, value, no_refresh, json).await,
        AssessmentCommand::Remove { question_id } => remove(state, &question_id, json).await,
        AssessmentCommand::Status => status(state, json),
        AssessmentCommand::Scores { refresh } => scores(state, refresh, json).await,
        AssessmentCommand::Sync { autosave } => sync(state, autosave, json).await,
        AssessmentCommand::Load { session_id } => load(state, &session_id, json).await,
        AssessmentCommand::Reset { force } => reset(state, force, json).await,
    }
}

async fn start(
    state: &mut AppState,
    standard: Option<String>,
    phase: Option<String>,
    json: bool,
) -> Result<()> {
    if let Some(standard) = standard {
        let standard = standard.parse().map_err(|e: String| anyhow!(e))?;
        state.tracker.set_ifrs_standard(Some(standard)).await?;
    }
    if let Some(phase) = phase {
        let phase = phase.parse().map_err(|e: String| anyhow!(e))?;
        state.tracker.set_current_phase(Some(phase)).await?;
    }
    state
        .tracker
        .set_status(complyx_types::assessment::AssessmentStatus::InProgress)
        .await?;

    if json {
        println!("{}", serde_json::json!({"started": true}));
    } else {
        let standard = state
            .tracker
            .ifrs_standard()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "unset".to_string());
        let phase = state
            .tracker
            .current_phase()
            .map(|p| p.to_string())
            .unwrap_or_else(|| "unset".to_string());
        println!(
            "  {} Assessment in progress (standard: {}, phase: {}).",
            style(">").green().bold(),
            style(standard).cyan(),
            style(phase).cyan()
        );
    }
    Ok(())
}

async fn answer(
    state: &mut AppState,
    question_id: String,
    value: String,
    no_refresh: bool,
    json: bool,
) -> Result<()> {
    state.tracker.add_answer(question_id.as_str(), value.as_str()).await?;

    let mut next_question = None;
    if !no_refresh {
        refresh_progress(state, json).await;

        let request = NextQuestionRequest {
            answered_questions: state.tracker.answered_ids(),
            answered_answers: state.tracker.answers().to_vec(),
            ifrs_standard: state.tracker.ifrs_standard(),
            phase: state.tracker.current_phase(),
        };
        match state.backend.next_question(&request).await {
            Ok(question) => next_question = question,
            Err(err) => report_backend_error("next question", &err, json),
        }
    }

    if json {
        println!(
            "{}",
            serde_json::json!({
                "recorded": true,
                "question_id": question_id,
                "answered_count": state.tracker.answers().len(),
                "progress": state.tracker.progress(),
                "next_question": next_question,
            })
        );
        return Ok(());
    }

    println!(
        "  {} Answer recorded for {} ({} answered, {:.1}% progress).",
        style("+").green().bold(),
        style(&question_id).cyan(),
        state.tracker.answers().len(),
        state.tracker.progress()
    );
    match next_question {
        Some(question) => {
            println!();
            println!(
                "  Next: {} {}",
                style(&question.id).cyan().bold(),
                question.text
            );
            if let Some(category) = &question.category {
                println!("  Category: {}", style(category).dim());
            }
        }
        None if !no_refresh => {
            println!(
                "  {} No further questions in this phase.",
                style("i").blue().bold()
            );
        }
        None => {}
    }
    Ok(())
}

async fn remove(state: &mut AppState, question_id: &str, json: bool) -> Result<()> {
    state.tracker.remove_answer(question_id).await?;
    refresh_progress(state, json).await;

    if json {
        println!(
            "{}",
            serde_json::json!({"removed": true, "question_id": question_id})
        );
    } else {
        println!(
            "  {} Answer for {} removed.",
            style("x").red().bold(),
            style(question_id).cyan()
        );
    }
    Ok(())
}

fn status(state: &AppState, json: bool) -> Result<()> {
    let tracker = &state.tracker;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&tracker.session_state())?
        );
        return Ok(());
    }

    println!();
    println!(
        "  Assessment: {}",
        style(tracker.assessment_id().unwrap_or("(local only)")).cyan()
    );
    println!(
        "  Standard: {}   Phase: {}   Status: {}",
        style(
            tracker
                .ifrs_standard()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "unset".to_string())
        )
        .cyan(),
        style(
            tracker
                .current_phase()
                .map(|p| p.to_string())
                .unwrap_or_else(|| "unset".to_string())
        )
        .cyan(),
        style(tracker.status().to_string()).cyan()
    );
    println!(
        "  Progress: {:.1}%   Answered: {}/{}",
        tracker.progress(),
        tracker.answered_count(),
        tracker.total_count()
    );

    if !tracker.answers().is_empty() {
        let mut table = Table::new();
        table.load_preset(presets::UTF8_FULL_CONDENSED);
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec![
            Cell::new("Question").fg(Color::White),
            Cell::new("Answer").fg(Color::White),
            Cell::new("Answered at").fg(Color::White),
        ]);
        for answer in tracker.answers() {
            table.add_row(vec![
                Cell::new(&answer.question_id).fg(Color::Cyan),
                Cell::new(&answer.value).fg(Color::White),
                Cell::new(answer.timestamp.format("%Y-%m-%d %H:%M").to_string())
                    .fg(Color::DarkGrey),
            ]);
        }
        println!();
        println!("{table}");
    }
    println!();
    Ok(())
}

async fn scores(state: &mut AppState, refresh: bool, json: bool) -> Result<()> {
    if refresh {
        let request = ScoreRequest {
            answers: state.tracker.answers().to_vec(),
            ifrs_standard: state.tracker.ifrs_standard(),
            phase: state.tracker.current_phase(),
            assessment_id: state.tracker.assessment_id().map(str::to_string),
        };
        match state.backend.calculate_scores(&request).await {
            Ok(scores) => state.tracker.set_scores(Some(scores)).await?,
            Err(err) => report_backend_error("score calculation", &err, json),
        }
    }

    let Some(scores) = state.tracker.scores() else {
        if json {
            println!("null");
        } else {
            println!();
            println!(
                "  {} No cached scores. Fetch them with: {}",
                style("i").blue().bold(),
                style("complyx assessment scores --refresh").yellow()
            );
            println!();
        }
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(scores)?);
        return Ok(());
    }

    println!();
    println!(
        "  Overall: {} / {:.1}%   ({}/{} answered)",
        style(format!("{:.1}", scores.overall_score)).cyan().bold(),
        scores.overall_percentage,
        scores.total_answered,
        scores.total_questions
    );

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Category").fg(Color::White),
        Cell::new("Score").fg(Color::White),
        Cell::new("Max").fg(Color::White),
        Cell::new("%").fg(Color::White),
        Cell::new("Answered").fg(Color::White),
    ]);
    for category in &scores.category_scores {
        table.add_row(vec![
            Cell::new(&category.category).fg(Color::Cyan),
            Cell::new(format!("{:.1}", category.score)).fg(Color::White),
            Cell::new(format!("{:.1}", category.max_score)).fg(Color::DarkGrey),
            Cell::new(format!("{:.1}", category.percentage)).fg(Color::White),
            Cell::new(format!(
                "{}/{}",
                category.answered_count, category.total_count
            ))
            .fg(Color::DarkGrey),
        ]);
    }
    println!();
    println!("{table}");
    println!();
    Ok(())
}

async fn sync(state: &mut AppState, autosave: bool, json: bool) -> Result<()> {
    let session_state = state.tracker.session_state();

    if autosave {
        state.backend.autosave_session(&session_state).await?;
        if json {
            println!("{}", serde_json::json!({"autosaved": true}));
        } else {
            println!("  {} Autosaved to backend.", style("+").green().bold());
        }
        return Ok(());
    }

    let session_id = state.backend.save_session(&session_state).await?;
    state
        .tracker
        .set_assessment_id(Some(session_id.clone()))
        .await?;

    if json {
        println!(
            "{}",
            serde_json::json!({"saved": true, "session_id": session_id})
        );
    } else {
        println!(
            "  {} Saved to backend as '{}'.",
            style("+").green().bold(),
            style(session_id).cyan()
        );
    }
    Ok(())
}

async fn load(state: &mut AppState, session_id: &str, json: bool) -> Result<()> {
    let Some(mirror) = state.backend.load_session(session_id).await? else {
        if json {
            println!("{}", serde_json::json!({"loaded": false}));
        } else {
            println!(
                "  {} No backend session '{}'.",
                style("i").blue().bold(),
                session_id
            );
        }
        return Ok(());
    };

    state.tracker.apply_session_state(mirror).await?;

    if json {
        println!(
            "{}",
            serde_json::json!({"loaded": true, "session_id": session_id})
        );
    } else {
        println!(
            "  {} Assessment restored from '{}' ({} answers).",
            style("+").green().bold(),
            style(session_id).cyan(),
            state.tracker.answers().len()
        );
    }
    Ok(())
}

async fn reset(state: &mut AppState, force: bool, json: bool) -> Result<()> {
    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Reset the assessment ({} answers)?",
                state.tracker.answers().len()
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    state.tracker.reset_assessment().await?;

    if json {
        println!("{}", serde_json::json!({"reset": true}));
    } else {
        println!("  {} Assessment reset.", style("x").red().bold());
    }
    Ok(())
}

/// Best-effort backend progress refresh after an answer mutation.
async fn refresh_progress(state: &mut AppState, json: bool) {
    let request = ProgressRequest {
        answered_questions: state.tracker.answered_ids(),
        ifrs_standard: state.tracker.ifrs_standard(),
        phase: state.tracker.current_phase(),
    };
    match state.backend.calculate_progress(&request).await {
        Ok(progress) => {
            if let Err(err) = state.tracker.apply_progress(progress).await {
                tracing::warn!(error = %err, "Failed to persist refreshed progress");
            }
        }
        Err(err) => report_backend_error("progress calculation", &err, json),
    }
}

fn report_backend_error(what: &str, err: &BackendError, json: bool) {
    tracing::warn!(error = %err, "Backend {what} failed");
    if !json {
        println!(
            "  {} Backend {what} failed: {}",
            style("!").yellow().bold(),
            err
        );
    }
}
