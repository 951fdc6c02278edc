//! The `quizkit validate` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use quizkit_core::normalize::parse_questions;
use quizkit_core::traits::QuestionSource;
use quizkit_sources::config::{create_source, load_config_from};

use super::resolve_source;

pub async fn execute(source_arg: String, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let source = resolve_source(&source_arg, None)?;
    tracing::debug!(name = %source.name, location = %source.location, "resolved question source");
    let fetcher = create_source(&config)?;

    let text = fetcher
        .fetch(&source.location)
        .await
        .with_context(|| format!("failed to load {}", source.location))?;
    let questions = parse_questions(&text).context("question set is invalid")?;

    println!("Question set: {} ({} questions)", source.name, questions.len());

    let unexplained = questions.iter().filter(|q| q.explanation.is_empty()).count();
    if unexplained > 0 {
        println!("  NOTE: {unexplained} question(s) have no explanation");
    }
    let max_options = questions.iter().map(|q| q.options.len()).max().unwrap_or(0);
    println!("  Up to {max_options} options per question");

    println!("All questions valid.");
    Ok(())
}
