//! Load error types.
//!
//! A failed load is always one of three kinds: the source could not be
//! fetched, the payload is not a usable question array, or a single record
//! broke a format rule. Defined in `quizkit-core` so every source
//! implementation and the session share one taxonomy.

use std::fmt;

use thiserror::Error;

/// Everything that can abort a question load.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// The source could not be fetched.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The payload is not a non-empty JSON array.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// A record inside the payload is invalid.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl LoadError {
    /// Returns `true` if re-issuing the same load could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LoadError::Transport(
                TransportError::Http { .. } | TransportError::Timeout(_) | TransportError::Network(_)
            )
        )
    }
}

/// Failures of the fetch collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The server answered with a non-success status.
    #[error("failed to load data: HTTP {status} {reason}")]
    Http { status: u16, reason: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    Network(String),

    /// The source string is neither an http(s) URL nor a data URL.
    #[error("invalid source: {0}")]
    InvalidSource(String),

    /// An inline payload could not be decoded.
    #[error("could not decode inline data: {0}")]
    Decode(String),
}

/// The payload is not a question array.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("data is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("data has the wrong shape: expected an array of questions")]
    NotAnArray,

    #[error("the question set contains no questions")]
    Empty,
}

/// A single record failed validation. `record` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("question {record} {kind}")]
pub struct ValidationError {
    pub record: usize,
    pub kind: ValidationErrorKind,
}

impl ValidationError {
    pub fn new(record: usize, kind: ValidationErrorKind) -> Self {
        Self { record, kind }
    }
}

/// An option flagged as correct, reported when a record has several.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlaggedOption {
    /// 1-based option position.
    pub position: usize,
    pub text: String,
}

/// What exactly is wrong with a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    MissingQuestion,
    MissingOptions,
    TooFewOptions { found: usize },
    /// An object option without string `text` and boolean `isCorrect`.
    MalformedOption { position: usize },
    /// An option that is neither a string nor an object.
    UnsupportedOption { position: usize },
    NoCorrectAnswer,
    MultipleCorrect {
        question: String,
        flagged: Vec<FlaggedOption>,
    },
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationErrorKind::MissingQuestion => write!(f, "is missing the \"question\" field"),
            ValidationErrorKind::MissingOptions => {
                write!(f, "is missing the \"options\" field or it is not an array")
            }
            ValidationErrorKind::TooFewOptions { found } => {
                write!(f, "needs at least 2 options (found {found})")
            }
            ValidationErrorKind::MalformedOption { position } => write!(
                f,
                "option {position} is malformed: it needs \"text\" and a boolean \"isCorrect\""
            ),
            ValidationErrorKind::UnsupportedOption { position } => write!(
                f,
                "option {position} is malformed: it must be a string or an object with \"text\" and \"isCorrect\""
            ),
            ValidationErrorKind::NoCorrectAnswer => write!(
                f,
                "has no correct answer specified; set \"isCorrect\": true on one option or use \"correct\"/\"correctAnswer\""
            ),
            ValidationErrorKind::MultipleCorrect { question, flagged } => {
                writeln!(
                    f,
                    "has {} correct answers; exactly 1 is allowed.",
                    flagged.len()
                )?;
                writeln!(f)?;
                writeln!(f, "Question:")?;
                writeln!(f, "\"{question}\"")?;
                writeln!(f)?;
                writeln!(f, "Options marked correct:")?;
                for option in flagged {
                    writeln!(f, "- Option {}: \"{}\"", option.position, option.text)?;
                }
                writeln!(f)?;
                write!(
                    f,
                    "Check the JSON so that only one option has \"isCorrect\": true or the \"correct\" field points at a single option."
                )
            }
        }
    }
}
