use anyhow::{Context, Result};
use interview_sim::bank::QuestionBank;
use interview_sim::interview::{InterviewSession, NextStep};
use interview_sim::scoring::Evaluator;
use interview_sim::settings::Settings;
use interview_sim::utils::{
    log_generic_error, log_next_step, log_question, log_report, log_report_saved,
    log_startup_config, log_turn,
};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::subscriber::set_global_default;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const QUIT_COMMANDS: &[&str] = &["quit", "exit", ":q"];

fn prompt() -> Result<()> {
    print!("> ");
    std::io::stdout().flush().context("failed to flush stdout")
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("interview_sim=warn".parse()?))
        .with(
            fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        );
    set_global_default(subscriber).context("failed to set tracing subscriber")?;

    let domain = std::env::var("INTERVIEW_DOMAIN").unwrap_or_else(|_| "人工智能".to_string());
    let position = std::env::var("INTERVIEW_POSITION").unwrap_or_else(|_| "技术岗".to_string());
    let bank_path = std::env::var("QUESTION_BANK").ok();
    let report_path = std::env::var("REPORT_PATH").ok();

    let evaluator = Evaluator::new(Arc::new(Settings::load()));
    let bank = match &bank_path {
        Some(path) => QuestionBank::load(Path::new(path))?,
        None => QuestionBank::builtin(),
    };

    let mut session = {
        let mut rng = rand::rng();
        InterviewSession::plan(&evaluator, &bank, &domain, &position, &mut rng)
    };

    log_startup_config(
        session.domain(),
        session.position(),
        bank_path.as_deref().unwrap_or("builtin"),
        session.questions().len(),
    );

    if let Some(question) = session.current_question() {
        log_question(0, session.questions().len(), question);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while !session.is_finished() {
        prompt()?;
        let Some(line) = lines.next_line().await.context("failed to read answer")? else {
            break;
        };
        let answer = line.trim();
        if answer.is_empty() {
            continue;
        }
        if QUIT_COMMANDS.contains(&answer) {
            break;
        }

        let outcome = session.submit_answer(&evaluator, answer)?;
        log_turn(&outcome);
        log_next_step(&outcome.next);

        let (index, total) = session.progress();
        match &outcome.next {
            NextStep::FollowUp { .. } | NextStep::Finished => {}
            NextStep::Next { question } => log_question(index, total, question),
            NextStep::Hint { next, .. } | NextStep::RevealAnswer { next, .. } => {
                if let Some(question) = next {
                    log_question(index, total, question);
                } else {
                    log_next_step(&NextStep::Finished);
                }
            }
        }
    }

    let report = session.report(&evaluator);
    log_report(&report);

    if let Some(path) = report_path {
        let json = report.to_json().context("failed to serialize report")?;
        match tokio::fs::write(&path, json).await {
            Ok(()) => log_report_saved(&path),
            Err(e) => log_generic_error("[ERROR]", &format!("could not write {path}: {e}")),
        }
    }

    Ok(())
}
