//! JSON export of a finished run.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use quizkit_core::results::QuizResults;

/// Results plus the name of the question set they came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsDocument {
    pub source: String,
    #[serde(flatten)]
    pub results: QuizResults,
}

impl ResultsDocument {
    pub fn new(source: impl Into<String>, results: QuizResults) -> Self {
        Self {
            source: source.into(),
            results,
        }
    }
}

/// Write `doc` as pretty JSON, creating parent directories.
pub fn write_json_report(doc: &ResultsDocument, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(doc).context("failed to serialize results")?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizkit_core::model::{Question, QuizMode};

    #[test]
    fn writes_flattened_document() {
        let questions = vec![Question {
            id: 1,
            question: "Capital of France?".into(),
            options: vec!["Paris".into(), "Lyon".into()],
            correct: 0,
            explanation: String::new(),
        }];
        let results = QuizResults::compute(&questions, &[Some(0)], QuizMode::Exam, Some(5), Some(240));
        let doc = ResultsDocument::new("Geography", results);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("results.json");
        write_json_report(&doc, &path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["source"], "Geography");
        assert_eq!(value["score"], 1);
        assert_eq!(value["percentage"], 100);
        assert_eq!(value["mode"], "exam");
        assert_eq!(value["time"]["used_secs"], 60);
        assert_eq!(value["breakdown"][0]["options"][0]["review"], "correct_selected");
    }
}
