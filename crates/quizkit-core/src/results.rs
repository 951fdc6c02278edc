//! Scoring and result aggregation.
//!
//! Everything here is pure: results can be recomputed for a details panel as
//! often as needed without touching the session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Question, QuizMode};

/// Count positions where the selected option is the correct one.
///
/// Unanswered questions never count. Missing trailing answers are treated as
/// unanswered.
pub fn compute_score(questions: &[Question], answers: &[Option<usize>]) -> usize {
    questions
        .iter()
        .enumerate()
        .filter(|(i, q)| q.is_correct(answer_at(answers, *i)))
        .count()
}

fn answer_at(answers: &[Option<usize>], index: usize) -> Option<usize> {
    answers.get(index).copied().flatten()
}

/// Whole-number percentage, rounded half up. An empty run scores 0.
pub fn percentage(score: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (score as f64 / total as f64 * 100.0).round() as u32
}

/// Coarse performance band shown with the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Performance {
    Excellent,
    Good,
    Fair,
    NeedsImprovement,
}

impl Performance {
    pub fn from_percentage(percentage: u32) -> Self {
        if percentage >= 90 {
            Performance::Excellent
        } else if percentage >= 75 {
            Performance::Good
        } else if percentage >= 60 {
            Performance::Fair
        } else {
            Performance::NeedsImprovement
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Performance::Excellent => "Excellent",
            Performance::Good => "Good",
            Performance::Fair => "Fair",
            Performance::NeedsImprovement => "Needs improvement",
        }
    }
}

/// How a single option should be shown in the review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionReview {
    /// The correct option, and the user picked it.
    CorrectSelected,
    /// The correct option, not picked.
    CorrectMissed,
    /// A wrong option the user picked.
    WrongSelected,
    Neutral,
}

impl OptionReview {
    pub fn classify(index: usize, correct: usize, selected: Option<usize>) -> Self {
        let is_selected = selected == Some(index);
        match (index == correct, is_selected) {
            (true, true) => OptionReview::CorrectSelected,
            (true, false) => OptionReview::CorrectMissed,
            (false, true) => OptionReview::WrongSelected,
            (false, false) => OptionReview::Neutral,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionOutcome {
    pub text: String,
    pub review: OptionReview,
}

/// Correctness of one question in the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOutcome {
    /// Id of the question in its source.
    pub id: u32,
    pub question: String,
    pub selected: Option<usize>,
    pub correct: usize,
    pub is_correct: bool,
    pub options: Vec<OptionOutcome>,
    pub explanation: String,
}

impl QuestionOutcome {
    pub fn from_answer(question: &Question, selected: Option<usize>) -> Self {
        Self {
            id: question.id,
            question: question.question.clone(),
            selected,
            correct: question.correct,
            is_correct: question.is_correct(selected),
            options: question
                .options
                .iter()
                .enumerate()
                .map(|(i, text)| OptionOutcome {
                    text: text.clone(),
                    review: OptionReview::classify(i, question.correct, selected),
                })
                .collect(),
            explanation: question.explanation.clone(),
        }
    }

    pub fn is_answered(&self) -> bool {
        self.selected.is_some()
    }
}

/// Time accounting for a timed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSummary {
    pub limit_secs: u32,
    pub used_secs: u32,
    pub remaining_secs: u32,
    /// The countdown reached zero.
    pub timed_out: bool,
}

impl TimeSummary {
    /// `None` for untimed runs.
    pub fn from_limit(time_limit_mins: Option<u32>, time_remaining: Option<u32>) -> Option<Self> {
        let limit_secs = time_limit_mins?.saturating_mul(60);
        let remaining_secs = time_remaining?.min(limit_secs);
        Some(Self {
            limit_secs,
            used_secs: limit_secs - remaining_secs,
            remaining_secs,
            timed_out: remaining_secs == 0,
        })
    }
}

/// Everything a results screen needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizResults {
    pub score: usize,
    pub total: usize,
    pub percentage: u32,
    pub incorrect: usize,
    pub unanswered: usize,
    pub performance: Performance,
    pub mode: QuizMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<TimeSummary>,
    pub breakdown: Vec<QuestionOutcome>,
    pub completed_at: DateTime<Utc>,
}

impl QuizResults {
    pub fn compute(
        questions: &[Question],
        answers: &[Option<usize>],
        mode: QuizMode,
        time_limit: Option<u32>,
        time_remaining: Option<u32>,
    ) -> Self {
        let breakdown: Vec<QuestionOutcome> = questions
            .iter()
            .enumerate()
            .map(|(i, q)| QuestionOutcome::from_answer(q, answer_at(answers, i)))
            .collect();

        let total = questions.len();
        let score = compute_score(questions, answers);
        let percentage = percentage(score, total);

        Self {
            score,
            total,
            percentage,
            incorrect: total - score,
            unanswered: breakdown.iter().filter(|o| !o.is_answered()).count(),
            performance: Performance::from_percentage(percentage),
            mode,
            time: TimeSummary::from_limit(time_limit, time_remaining),
            breakdown,
            completed_at: Utc::now(),
        }
    }

    /// Outcomes the user got wrong or skipped.
    pub fn missed(&self) -> impl Iterator<Item = &QuestionOutcome> {
        self.breakdown.iter().filter(|o| !o.is_correct)
    }
}
