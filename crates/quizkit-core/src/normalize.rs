//! Question set normalizer.
//!
//! Turns untrusted JSON question sets into validated [`Question`]s. Each
//! record is checked on its own: one feed may mix plain string options with
//! `{ text, isCorrect }` objects, and the encoding is resolved per option
//! while scanning the record. The first invalid record aborts the whole load.

use serde_json::Value;

use crate::error::{
    FlaggedOption, FormatError, LoadError, ValidationError, ValidationErrorKind,
};
use crate::model::Question;

/// One option as it appears in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RawOption<'a> {
    /// Legacy form: a bare string, correctness comes from the record's
    /// `correct` / `correctAnswer` index.
    Text(&'a str),
    /// Object form: correctness is carried by the option itself.
    Flagged { text: &'a str, is_correct: bool },
}

impl<'a> RawOption<'a> {
    /// `position` is 1-based.
    fn classify(position: usize, value: &'a Value) -> Result<Self, ValidationErrorKind> {
        match value {
            Value::String(text) => Ok(RawOption::Text(text)),
            Value::Object(map) => {
                let text = map
                    .get("text")
                    .and_then(Value::as_str)
                    .filter(|t| !t.is_empty());
                let is_correct = map.get("isCorrect").and_then(Value::as_bool);
                match (text, is_correct) {
                    (Some(text), Some(is_correct)) => Ok(RawOption::Flagged { text, is_correct }),
                    _ => Err(ValidationErrorKind::MalformedOption { position }),
                }
            }
            _ => Err(ValidationErrorKind::UnsupportedOption { position }),
        }
    }

    fn text(&self) -> &'a str {
        match self {
            RawOption::Text(text) | RawOption::Flagged { text, .. } => text,
        }
    }
}

/// A record that passed the structural checks but has not had its answer
/// key resolved yet.
#[derive(Debug)]
struct RawQuestionRecord<'a> {
    question: &'a str,
    options: Vec<RawOption<'a>>,
    correct: Option<usize>,
    correct_answer: Option<usize>,
    explanation: Option<&'a str>,
}

impl<'a> RawQuestionRecord<'a> {
    fn from_value(value: &'a Value) -> Result<Self, ValidationErrorKind> {
        let question = value
            .get("question")
            .and_then(Value::as_str)
            .filter(|q| !q.is_empty())
            .ok_or(ValidationErrorKind::MissingQuestion)?;

        let raw_options = value
            .get("options")
            .and_then(Value::as_array)
            .ok_or(ValidationErrorKind::MissingOptions)?;

        if raw_options.len() < 2 {
            return Err(ValidationErrorKind::TooFewOptions {
                found: raw_options.len(),
            });
        }

        let options = raw_options
            .iter()
            .enumerate()
            .map(|(i, option)| RawOption::classify(i + 1, option))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            question,
            options,
            correct: value.get("correct").and_then(index_field),
            correct_answer: value.get("correctAnswer").and_then(index_field),
            explanation: value.get("explanation").and_then(Value::as_str),
        })
    }

    fn is_marked_correct(&self, index: usize, option: &RawOption<'_>) -> bool {
        match option {
            RawOption::Text(_) => self.correct == Some(index) || self.correct_answer == Some(index),
            RawOption::Flagged { is_correct, .. } => *is_correct,
        }
    }

    fn resolve(self, id: u32) -> Result<Question, ValidationErrorKind> {
        let marked: Vec<usize> = self
            .options
            .iter()
            .enumerate()
            .filter(|(i, option)| self.is_marked_correct(*i, option))
            .map(|(i, _)| i)
            .collect();

        let correct = match marked.as_slice() {
            [] => return Err(ValidationErrorKind::NoCorrectAnswer),
            [only] => *only,
            many => {
                return Err(ValidationErrorKind::MultipleCorrect {
                    question: self.question.to_string(),
                    flagged: many
                        .iter()
                        .map(|&i| FlaggedOption {
                            position: i + 1,
                            text: self.options[i].text().to_string(),
                        })
                        .collect(),
                })
            }
        };

        Ok(Question {
            id,
            question: self.question.to_string(),
            options: self.options.iter().map(|o| o.text().to_string()).collect(),
            correct,
            explanation: self.explanation.unwrap_or_default().to_string(),
        })
    }
}

/// Accept integral JSON numbers, including ones written as `1.0`.
fn index_field(value: &Value) -> Option<usize> {
    if let Some(n) = value.as_u64() {
        return usize::try_from(n).ok();
    }
    value
        .as_f64()
        .filter(|f| *f >= 0.0 && f.fract() == 0.0)
        .map(|f| f as usize)
}

/// Normalize a single record. `position` is 1-based and becomes the id.
pub fn normalize_record(position: usize, value: &Value) -> Result<Question, ValidationError> {
    let outcome = RawQuestionRecord::from_value(value).and_then(|raw| raw.resolve(position as u32));

    outcome.map_err(|kind| {
        if let ValidationErrorKind::MultipleCorrect { flagged, .. } = &kind {
            let positions: Vec<usize> = flagged.iter().map(|f| f.position).collect();
            tracing::error!(
                record = position,
                flagged = ?positions,
                raw = %value,
                "question has more than one correct answer"
            );
        }
        ValidationError::new(position, kind)
    })
}

/// Normalize every record, all or nothing.
pub fn normalize_records(records: &[Value]) -> Result<Vec<Question>, ValidationError> {
    records
        .iter()
        .enumerate()
        .map(|(i, record)| normalize_record(i + 1, record))
        .collect()
}

/// Parse a raw payload into questions.
///
/// The payload must be a non-empty JSON array; every record must pass
/// validation or nothing is returned.
pub fn parse_questions(text: &str) -> Result<Vec<Question>, LoadError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| FormatError::InvalidJson(e.to_string()))?;

    let records = value.as_array().ok_or(FormatError::NotAnArray)?;
    if records.is_empty() {
        return Err(FormatError::Empty.into());
    }

    Ok(normalize_records(records)?)
}
