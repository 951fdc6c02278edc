//! Core data model types for quizkit.
//!
//! These are the canonical types every other module works with: normalized
//! questions, the per-run configuration, and session phases.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A validated question with exactly one correct option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// 1-based position in the source the question was loaded from.
    pub id: u32,
    /// Question text. May contain inline markup.
    pub question: String,
    /// Answer options, at least two.
    pub options: Vec<String>,
    /// Index into `options` of the single correct answer.
    pub correct: usize,
    /// Explanation shown after answering. Empty when the source had none.
    #[serde(default)]
    pub explanation: String,
}

impl Question {
    /// Returns `true` if `answer` is the correct option.
    pub fn is_correct(&self, answer: Option<usize>) -> bool {
        answer == Some(self.correct)
    }

    pub fn correct_text(&self) -> &str {
        &self.options[self.correct]
    }
}

/// How answers are revealed while the quiz runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizMode {
    /// Correctness and explanation shown as soon as an answer is picked.
    #[default]
    Study,
    /// Nothing revealed until the quiz is finished.
    Exam,
}

impl fmt::Display for QuizMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuizMode::Study => write!(f, "study"),
            QuizMode::Exam => write!(f, "exam"),
        }
    }
}

impl FromStr for QuizMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "study" => Ok(QuizMode::Study),
            "exam" => Ok(QuizMode::Exam),
            other => Err(format!("unknown quiz mode: {other}")),
        }
    }
}

/// How many questions a run uses. Serialized as `"all"` or an integer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QuestionCount {
    #[default]
    All,
    Limit(usize),
}

impl Serialize for QuestionCount {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            QuestionCount::All => s.serialize_str("all"),
            QuestionCount::Limit(n) => s.serialize_u64(*n as u64),
        }
    }
}

impl<'de> Deserialize<'de> for QuestionCount {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        struct CountVisitor;

        impl Visitor<'_> for CountVisitor {
            type Value = QuestionCount;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("\"all\" or a non-negative integer")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(QuestionCount::Limit(v as usize))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                usize::try_from(v)
                    .map(QuestionCount::Limit)
                    .map_err(|_| E::custom(format!("question count cannot be negative: {v}")))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                if v == "all" {
                    Ok(QuestionCount::All)
                } else {
                    Err(E::invalid_value(de::Unexpected::Str(v), &self))
                }
            }
        }

        d.deserialize_any(CountVisitor)
    }
}

impl fmt::Display for QuestionCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionCount::All => write!(f, "all"),
            QuestionCount::Limit(n) => write!(f, "{n}"),
        }
    }
}

/// Settings for one run, fixed once the quiz starts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizConfig {
    #[serde(default)]
    pub question_count: QuestionCount,
    #[serde(default)]
    pub randomize: bool,
    #[serde(default)]
    pub mode: QuizMode,
    /// Time limit in minutes; `None` means untimed.
    #[serde(default)]
    pub time_limit: Option<u32>,
}

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Empty,
    Loading,
    Error,
    Configuring,
    Active,
    Completed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Empty => "empty",
            Phase::Loading => "loading",
            Phase::Error => "error",
            Phase::Configuring => "configuring",
            Phase::Active => "active",
            Phase::Completed => "completed",
        };
        f.write_str(s)
    }
}

/// Where the raw question JSON comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum SourceLocation {
    /// An `http://` or `https://` URL.
    Url(String),
    /// A `data:` URL, usually base64 encoded JSON.
    DataUrl(String),
    /// JSON text supplied directly.
    Inline(String),
}

impl SourceLocation {
    /// Classify a user-supplied source string.
    pub fn parse(s: &str) -> Result<Self, String> {
        let trimmed = s.trim();
        if trimmed.starts_with("data:") {
            Ok(SourceLocation::DataUrl(trimmed.to_string()))
        } else if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            Ok(SourceLocation::Url(trimmed.to_string()))
        } else {
            Err(format!("not an http(s) or data URL: {trimmed}"))
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceLocation::Url(url) => f.write_str(url),
            SourceLocation::DataUrl(_) => f.write_str("data URL"),
            SourceLocation::Inline(_) => f.write_str("inline JSON"),
        }
    }
}

/// A named question source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizSourceRef {
    pub name: String,
    pub location: SourceLocation,
}

impl QuizSourceRef {
    pub fn new(name: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            name: name.into(),
            location,
        }
    }

    /// A source for JSON the user pasted or read from a local file.
    pub fn inline(json: impl Into<String>) -> Self {
        Self::new("Custom JSON", SourceLocation::Inline(json.into()))
    }

    pub fn url(url: impl Into<String>) -> Self {
        Self::new("Custom URL", SourceLocation::Url(url.into()))
    }
}
