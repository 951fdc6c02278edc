//! Setup form validation.
//!
//! Front ends collect raw user input into a [`SetupForm`] and turn it into a
//! [`QuizConfig`] here, before calling `start_quiz`. The session itself
//! trusts the config it is given.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{QuestionCount, QuizConfig, QuizMode};

/// Bounds applied to user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetupLimits {
    pub min_questions: usize,
    pub max_custom_questions: usize,
    /// Minutes suggested when the user asks for a timed run.
    pub default_time_limit: u32,
    pub max_time_limit: u32,
}

impl Default for SetupLimits {
    fn default() -> Self {
        Self {
            min_questions: 1,
            max_custom_questions: 100,
            default_time_limit: 30,
            max_time_limit: 180,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CountChoice {
    #[default]
    All,
    /// Raw text of the custom count field.
    Custom(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TimeChoice {
    #[default]
    Unlimited,
    /// Raw text of the custom minutes field.
    Custom(String),
}

impl TimeChoice {
    /// A custom limit prefilled with the configured default.
    pub fn suggested(limits: &SetupLimits) -> Self {
        TimeChoice::Custom(limits.default_time_limit.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetupForm {
    pub mode: QuizMode,
    pub question_count: CountChoice,
    pub randomize: bool,
    pub time_limit: TimeChoice,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SetupError {
    #[error("no questions are loaded")]
    EmptyPool,

    #[error("at least {min} question(s) required, got {requested}")]
    TooFewQuestions { requested: usize, min: usize },

    #[error("time limit must be a whole number of minutes between 1 and {max}, got '{input}'")]
    InvalidTimeLimit { input: String, max: u32 },
}

impl SetupForm {
    /// Validate the form against a pool of `pool_size` questions.
    ///
    /// A custom count that does not parse falls back to the whole pool; a
    /// parsed count is clamped to the pool and to `max_custom_questions`.
    pub fn to_config(&self, pool_size: usize, limits: &SetupLimits) -> Result<QuizConfig, SetupError> {
        if pool_size == 0 {
            return Err(SetupError::EmptyPool);
        }

        let question_count = match &self.question_count {
            CountChoice::All => QuestionCount::All,
            CountChoice::Custom(raw) => match raw.trim().parse::<usize>() {
                Ok(requested) if requested < limits.min_questions => {
                    return Err(SetupError::TooFewQuestions {
                        requested,
                        min: limits.min_questions,
                    });
                }
                Ok(requested) => {
                    QuestionCount::Limit(requested.min(pool_size).min(limits.max_custom_questions))
                }
                Err(_) => {
                    tracing::debug!(input = %raw, "custom count not a number, using the whole pool");
                    QuestionCount::Limit(pool_size)
                }
            },
        };

        let time_limit = match &self.time_limit {
            TimeChoice::Unlimited => None,
            TimeChoice::Custom(raw) => Some(parse_minutes(raw, limits.max_time_limit)?),
        };

        Ok(QuizConfig {
            question_count,
            randomize: self.randomize,
            mode: self.mode,
            time_limit,
        })
    }
}

fn parse_minutes(raw: &str, max: u32) -> Result<u32, SetupError> {
    match raw.trim().parse::<u32>() {
        Ok(mins) if (1..=max).contains(&mins) => Ok(mins),
        _ => Err(SetupError::InvalidTimeLimit {
            input: raw.to_string(),
            max,
        }),
    }
}
