//! Quiz session state machine.
//!
//! [`QuizSession`] owns all mutable quiz state and exposes one method per
//! transition. It never schedules anything itself: the countdown lives in
//! [`crate::timer`] and drives [`QuizSession::tick`] from outside, and
//! fetching is done by the caller between [`QuizSession::begin_load`] and
//! [`QuizSession::complete_load`].

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::LoadError;
use crate::model::{Phase, Question, QuestionCount, QuizConfig, QuizMode, QuizSourceRef};
use crate::results::{compute_score, QuizResults};

/// Proof that a load was started. Completing with a ticket from an older
/// load is a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    source: QuizSourceRef,
}

impl LoadTicket {
    pub fn source(&self) -> &QuizSourceRef {
        &self.source
    }
}

/// Result of one countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No countdown is running for the given run.
    Ignored,
    /// Seconds left after this tick.
    Running(u32),
    /// The countdown hit zero and the quiz was finished.
    Expired,
}

/// What study mode shows right after an answer is picked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerFeedback {
    pub selected: usize,
    pub correct: usize,
    pub is_correct: bool,
    pub explanation: String,
}

/// All state for one interactive quiz.
#[derive(Debug, Default)]
pub struct QuizSession {
    all_questions: Vec<Question>,
    questions: Vec<Question>,
    current_question_index: usize,
    selected_answers: Vec<Option<usize>>,
    score: usize,
    phase: Phase,
    error: Option<LoadError>,
    mode: QuizMode,
    time_limit: Option<u32>,
    time_remaining: Option<u32>,
    is_timer_active: bool,
    source: Option<QuizSourceRef>,
    load_generation: u64,
    run_id: u64,
}

impl QuizSession {
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Loading
    // -----------------------------------------------------------------------

    /// Enter `Loading` for `source`. Any load still in flight becomes stale
    /// and any active run is dropped.
    pub fn begin_load(&mut self, source: QuizSourceRef) -> LoadTicket {
        self.clear_run();
        self.load_generation += 1;
        self.phase = Phase::Loading;
        self.error = None;
        self.source = Some(source.clone());
        tracing::debug!(generation = self.load_generation, source = %source.name, "load started");
        LoadTicket {
            generation: self.load_generation,
            source,
        }
    }

    /// Apply the outcome of a load. Returns `false` if the ticket is stale
    /// and the outcome was discarded.
    pub fn complete_load(
        &mut self,
        ticket: &LoadTicket,
        outcome: Result<Vec<Question>, LoadError>,
    ) -> bool {
        if ticket.generation != self.load_generation || self.phase != Phase::Loading {
            tracing::warn!(
                source = %ticket.source.name,
                "discarding response for a load that is no longer current"
            );
            return false;
        }

        match outcome {
            Ok(questions) => {
                tracing::info!(
                    count = questions.len(),
                    source = %ticket.source.name,
                    "loaded questions"
                );
                self.all_questions = questions;
                self.error = None;
                self.phase = Phase::Configuring;
            }
            Err(e) => {
                tracing::error!(source = %ticket.source.name, "failed to load questions: {e}");
                self.error = Some(e);
                self.phase = Phase::Error;
            }
        }
        true
    }

    // -----------------------------------------------------------------------
    // Running
    // -----------------------------------------------------------------------

    /// Start a run with a thread-local RNG. See [`Self::start_quiz_with_rng`].
    pub fn start_quiz(&mut self, config: &QuizConfig) -> bool {
        self.start_quiz_with_rng(config, &mut rand::thread_rng())
    }

    /// Build the active question set and enter `Active`.
    ///
    /// Shuffles first (Fisher-Yates) and truncates second, so a limited
    /// randomized run is a random sample of the pool. Only valid while
    /// `Configuring`; returns `false` otherwise.
    pub fn start_quiz_with_rng<R: Rng + ?Sized>(&mut self, config: &QuizConfig, rng: &mut R) -> bool {
        if self.phase != Phase::Configuring {
            tracing::warn!(phase = %self.phase, "start_quiz ignored outside configuring");
            return false;
        }

        let mut selected = self.all_questions.clone();
        if config.randomize {
            selected.shuffle(rng);
        }
        if let QuestionCount::Limit(n) = config.question_count {
            selected.truncate(n);
        }

        self.selected_answers = vec![None; selected.len()];
        self.questions = selected;
        self.current_question_index = 0;
        self.score = 0;
        self.mode = config.mode;
        // A zero-minute limit means untimed.
        self.time_limit = config.time_limit.filter(|&mins| mins > 0);
        self.arm_countdown();
        self.run_id += 1;
        self.phase = Phase::Active;

        tracing::info!(
            questions = self.questions.len(),
            mode = %self.mode,
            time_limit = ?self.time_limit,
            "quiz started"
        );
        true
    }

    /// Record an answer for the current question. Overwrites any earlier
    /// choice and does not move on.
    pub fn select_answer(&mut self, index: usize) -> bool {
        if self.phase != Phase::Active {
            return false;
        }
        match self.selected_answers.get_mut(self.current_question_index) {
            Some(slot) => {
                *slot = Some(index);
                true
            }
            None => false,
        }
    }

    pub fn next_question(&mut self) -> bool {
        if self.current_question_index + 1 < self.questions.len() {
            self.current_question_index += 1;
            true
        } else {
            false
        }
    }

    pub fn previous_question(&mut self) -> bool {
        if self.current_question_index > 0 {
            self.current_question_index -= 1;
            true
        } else {
            false
        }
    }

    /// Score the run and enter `Completed`. Only the first call from
    /// `Active` has any effect.
    pub fn finish_quiz(&mut self) -> bool {
        if self.phase != Phase::Active {
            return false;
        }
        self.is_timer_active = false;
        self.score = compute_score(&self.questions, &self.selected_answers);
        self.phase = Phase::Completed;
        tracing::info!(score = self.score, total = self.questions.len(), "quiz finished");
        true
    }

    /// Play the same questions again, in the same order.
    pub fn restart_quiz(&mut self) -> bool {
        if self.phase != Phase::Completed {
            return false;
        }
        self.selected_answers = vec![None; self.questions.len()];
        self.current_question_index = 0;
        self.score = 0;
        self.arm_countdown();
        self.run_id += 1;
        self.phase = Phase::Active;
        true
    }

    /// Drop the current run and go back to configuring the loaded pool.
    pub fn back_to_setup(&mut self) -> bool {
        if !matches!(self.phase, Phase::Active | Phase::Completed | Phase::Configuring) {
            return false;
        }
        self.clear_run();
        self.phase = Phase::Configuring;
        true
    }

    /// Forget everything, including the loaded pool and any load in flight.
    pub fn reset_quiz(&mut self) {
        let load_generation = self.load_generation + 1;
        let run_id = self.run_id + 1;
        *self = Self {
            load_generation,
            run_id,
            ..Self::default()
        };
    }

    /// Advance the countdown by one second for run `run_id`.
    ///
    /// Ticks for an older run, or when no countdown is armed, are ignored.
    /// When the remaining time reaches zero the quiz is finished exactly once.
    pub fn tick(&mut self, run_id: u64) -> TickOutcome {
        if run_id != self.run_id || self.phase != Phase::Active || !self.is_timer_active {
            return TickOutcome::Ignored;
        }
        let Some(remaining) = self.time_remaining else {
            return TickOutcome::Ignored;
        };

        let remaining = remaining.saturating_sub(1);
        self.time_remaining = Some(remaining);
        if remaining > 0 {
            return TickOutcome::Running(remaining);
        }

        self.is_timer_active = false;
        tracing::info!("time is up, finishing quiz");
        self.finish_quiz();
        TickOutcome::Expired
    }

    fn arm_countdown(&mut self) {
        self.time_remaining = self.time_limit.map(|mins| mins.saturating_mul(60));
        self.is_timer_active = self.time_remaining.is_some();
    }

    fn clear_run(&mut self) {
        self.questions.clear();
        self.selected_answers.clear();
        self.current_question_index = 0;
        self.score = 0;
        self.time_limit = None;
        self.time_remaining = None;
        self.is_timer_active = false;
        self.run_id += 1;
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn error(&self) -> Option<&LoadError> {
        self.error.as_ref()
    }

    pub fn all_questions(&self) -> &[Question] {
        &self.all_questions
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn selected_answers(&self) -> &[Option<usize>] {
        &self.selected_answers
    }

    pub fn current_question_index(&self) -> usize {
        self.current_question_index
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_question_index)
    }

    pub fn selected_answer(&self) -> Option<usize> {
        self.selected_answers
            .get(self.current_question_index)
            .copied()
            .flatten()
    }

    pub fn can_go_next(&self) -> bool {
        self.current_question_index + 1 < self.questions.len()
    }

    pub fn can_go_previous(&self) -> bool {
        self.current_question_index > 0
    }

    pub fn is_last_question(&self) -> bool {
        !self.questions.is_empty() && self.current_question_index + 1 == self.questions.len()
    }

    pub fn answered_count(&self) -> usize {
        self.selected_answers.iter().filter(|a| a.is_some()).count()
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn mode(&self) -> QuizMode {
        self.mode
    }

    pub fn time_limit(&self) -> Option<u32> {
        self.time_limit
    }

    pub fn time_remaining(&self) -> Option<u32> {
        self.time_remaining
    }

    pub fn is_timer_active(&self) -> bool {
        self.is_timer_active
    }

    pub fn source(&self) -> Option<&QuizSourceRef> {
        self.source.as_ref()
    }

    pub fn source_name(&self) -> &str {
        self.source.as_ref().map(|s| s.name.as_str()).unwrap_or_default()
    }

    /// Identifies the current run; changes on every start, restart, and
    /// teardown.
    pub fn run_id(&self) -> u64 {
        self.run_id
    }

    /// Immediate feedback for the current question. Study mode only.
    pub fn feedback(&self) -> Option<AnswerFeedback> {
        if self.mode != QuizMode::Study || self.phase != Phase::Active {
            return None;
        }
        let question = self.current_question()?;
        let selected = self.selected_answer()?;
        Some(AnswerFeedback {
            selected,
            correct: question.correct,
            is_correct: question.is_correct(Some(selected)),
            explanation: question.explanation.clone(),
        })
    }

    /// Aggregate the current run. Pure; valid while active or completed.
    pub fn results(&self) -> Option<QuizResults> {
        if !matches!(self.phase, Phase::Active | Phase::Completed) {
            return None;
        }
        Some(QuizResults::compute(
            &self.questions,
            &self.selected_answers,
            self.mode,
            self.time_limit,
            self.time_remaining,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FormatError, TransportError};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn pool(n: u32) -> Vec<Question> {
        (1..=n)
            .map(|id| Question {
                id,
                question: format!("Q{id}"),
                options: vec!["a".into(), "b".into(), "c".into()],
                correct: (id as usize) % 3,
                explanation: format!("because {id}"),
            })
            .collect()
    }

    fn loaded(n: u32) -> QuizSession {
        let mut session = QuizSession::new();
        let ticket = session.begin_load(QuizSourceRef::url("https://example.com/q.json"));
        assert!(session.complete_load(&ticket, Ok(pool(n))));
        session
    }

    fn config(count: QuestionCount, randomize: bool, time_limit: Option<u32>) -> QuizConfig {
        QuizConfig {
            question_count: count,
            randomize,
            mode: QuizMode::Exam,
            time_limit,
        }
    }

    fn ids(questions: &[Question]) -> Vec<u32> {
        questions.iter().map(|q| q.id).collect()
    }

    #[test]
    fn new_session_is_empty() {
        let session = QuizSession::new();
        assert_eq!(session.phase(), Phase::Empty);
        assert!(session.all_questions().is_empty());
        assert!(session.current_question().is_none());
        assert!(session.results().is_none());
    }

    #[test]
    fn successful_load_moves_to_configuring() {
        let session = loaded(5);
        assert_eq!(session.phase(), Phase::Configuring);
        assert_eq!(session.all_questions().len(), 5);
        assert!(session.error().is_none());
        assert_eq!(session.source_name(), "Custom URL");
    }

    #[test]
    fn failed_load_keeps_previous_pool() {
        let mut session = loaded(3);
        let ticket = session.begin_load(QuizSourceRef::url("https://example.com/bad.json"));
        assert!(session.complete_load(&ticket, Err(FormatError::Empty.into())));
        assert_eq!(session.phase(), Phase::Error);
        assert_eq!(session.error(), Some(&LoadError::Format(FormatError::Empty)));
        assert_eq!(session.all_questions().len(), 3);
    }

    #[test]
    fn stale_load_response_is_discarded() {
        let mut session = QuizSession::new();
        let slow = session.begin_load(QuizSourceRef::url("https://example.com/slow.json"));
        let fast = session.begin_load(QuizSourceRef::url("https://example.com/fast.json"));

        assert!(session.complete_load(&fast, Ok(pool(2))));
        assert!(!session.complete_load(&slow, Ok(pool(9))));
        assert_eq!(session.all_questions().len(), 2);
        assert_eq!(session.phase(), Phase::Configuring);
    }

    #[test]
    fn load_completing_after_reset_is_discarded() {
        let mut session = QuizSession::new();
        let ticket = session.begin_load(QuizSourceRef::url("https://example.com/q.json"));
        session.reset_quiz();
        assert!(!session.complete_load(
            &ticket,
            Err(TransportError::Network("boom".into()).into())
        ));
        assert_eq!(session.phase(), Phase::Empty);
        assert!(session.error().is_none());
    }

    #[test]
    fn start_all_without_shuffle_preserves_pool() {
        let mut session = loaded(6);
        assert!(session.start_quiz(&config(QuestionCount::All, false, None)));
        assert_eq!(session.phase(), Phase::Active);
        assert_eq!(ids(session.questions()), ids(session.all_questions()));
        assert_eq!(session.selected_answers(), &[None; 6]);
        assert_eq!(session.current_question_index(), 0);
        assert_eq!(session.time_remaining(), None);
        assert!(!session.is_timer_active());
    }

    #[test]
    fn start_only_valid_from_configuring() {
        let mut session = QuizSession::new();
        assert!(!session.start_quiz(&QuizConfig::default()));
        assert_eq!(session.phase(), Phase::Empty);

        let mut active = loaded(2);
        assert!(active.start_quiz(&QuizConfig::default()));
        assert!(!active.start_quiz(&QuizConfig::default()));
    }

    #[test]
    fn randomized_limit_is_a_sample_without_duplicates() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut session = loaded(20);
        assert!(session.start_quiz_with_rng(&config(QuestionCount::Limit(5), true, None), &mut rng));

        let picked = ids(session.questions());
        assert_eq!(picked.len(), 5);
        let unique: HashSet<u32> = picked.iter().copied().collect();
        assert_eq!(unique.len(), 5);
        assert!(picked.iter().all(|id| (1..=20).contains(id)));
    }

    #[test]
    fn limit_larger_than_pool_uses_whole_pool() {
        let mut session = loaded(3);
        session.start_quiz(&config(QuestionCount::Limit(10), false, None));
        assert_eq!(session.questions().len(), 3);
    }

    #[test]
    fn shuffle_is_roughly_uniform() {
        // Each question should land in the first slot about equally often.
        let mut rng = StdRng::seed_from_u64(42);
        let pool_size = 4u32;
        let trials = 4000;
        let mut first_slot = vec![0usize; pool_size as usize];
        let mut orderings = HashSet::new();

        for _ in 0..trials {
            let mut session = loaded(pool_size);
            session.start_quiz_with_rng(&config(QuestionCount::All, true, None), &mut rng);
            let order = ids(session.questions());
            first_slot[(order[0] - 1) as usize] += 1;
            orderings.insert(order);
        }

        let expected = trials / pool_size as usize;
        for count in &first_slot {
            let deviation = (*count as f64 - expected as f64).abs() / expected as f64;
            assert!(deviation < 0.15, "first-slot counts skewed: {first_slot:?}");
        }
        assert_eq!(orderings.len(), 24, "all 4! orderings should appear");
    }

    #[test]
    fn shuffle_quality_with_odd_pool() {
        let mut rng = StdRng::seed_from_u64(99);
        let pool_size = 5u32;
        let trials = 5000;
        let mut last_slot = vec![0usize; pool_size as usize];

        for _ in 0..trials {
            let mut session = loaded(pool_size);
            session.start_quiz_with_rng(&config(QuestionCount::All, true, None), &mut rng);
            let order = ids(session.questions());
            last_slot[(order[4] - 1) as usize] += 1;
        }

        let expected = (trials / pool_size as usize) as f64;
        for count in &last_slot {
            assert!((*count as f64 - expected).abs() / expected < 0.15, "{last_slot:?}");
        }
    }

    #[test]
    fn answers_are_recorded_and_overwritable() {
        let mut session = loaded(3);
        session.start_quiz(&QuizConfig::default());

        assert!(session.select_answer(2));
        assert_eq!(session.selected_answer(), Some(2));
        assert!(session.select_answer(0));
        assert_eq!(session.selected_answers(), &[Some(0), None, None]);
        assert_eq!(session.current_question_index(), 0);

        session.next_question();
        session.select_answer(1);
        session.previous_question();
        session.select_answer(1);
        assert_eq!(session.selected_answers(), &[Some(1), Some(1), None]);
        assert_eq!(session.answered_count(), 2);
    }

    #[test]
    fn navigation_is_clamped() {
        let mut session = loaded(2);
        session.start_quiz(&QuizConfig::default());

        assert!(!session.can_go_previous());
        assert!(!session.previous_question());
        assert!(session.next_question());
        assert!(session.is_last_question());
        assert!(!session.next_question());
        assert_eq!(session.current_question_index(), 1);
    }

    #[test]
    fn finish_scores_and_is_idempotent() {
        let mut session = loaded(3);
        session.start_quiz(&config(QuestionCount::All, false, None));
        // correct answers for ids 1, 2, 3 are 1, 2, 0
        session.select_answer(1);
        session.next_question();
        session.select_answer(0);

        assert!(session.finish_quiz());
        assert_eq!(session.phase(), Phase::Completed);
        assert_eq!(session.score(), 1);

        assert!(!session.finish_quiz());
        assert_eq!(session.score(), 1);
        assert!(!session.select_answer(2));
        assert_eq!(session.selected_answers(), &[Some(1), Some(0), None]);
    }

    #[test]
    fn countdown_seeded_from_time_limit() {
        let mut session = loaded(2);
        session.start_quiz(&config(QuestionCount::All, false, Some(1)));
        assert_eq!(session.time_remaining(), Some(60));
        assert!(session.is_timer_active());
    }

    #[test]
    fn sixty_ticks_finish_a_one_minute_quiz() {
        let mut session = loaded(2);
        session.start_quiz(&config(QuestionCount::All, false, Some(1)));
        session.select_answer(1);
        let run = session.run_id();

        for expected in (1..60).rev() {
            assert_eq!(session.tick(run), TickOutcome::Running(expected));
        }
        assert_eq!(session.tick(run), TickOutcome::Expired);
        assert_eq!(session.phase(), Phase::Completed);
        assert!(!session.is_timer_active());
        assert_eq!(session.time_remaining(), Some(0));
        assert_eq!(session.score(), 1);

        assert_eq!(session.tick(run), TickOutcome::Ignored);
        assert_eq!(session.time_remaining(), Some(0));
    }

    #[test]
    fn ticks_for_an_old_run_are_ignored() {
        let mut session = loaded(2);
        session.start_quiz(&config(QuestionCount::All, false, Some(1)));
        let old_run = session.run_id();
        session.finish_quiz();
        session.restart_quiz();

        assert_eq!(session.tick(old_run), TickOutcome::Ignored);
        assert_eq!(session.time_remaining(), Some(60));
        assert_eq!(session.tick(session.run_id()), TickOutcome::Running(59));
    }

    #[test]
    fn untimed_run_never_ticks() {
        let mut session = loaded(2);
        session.start_quiz(&QuizConfig::default());
        assert_eq!(session.tick(session.run_id()), TickOutcome::Ignored);
        assert_eq!(session.time_remaining(), None);
    }

    #[test]
    fn zero_minute_limit_is_untimed() {
        let mut session = loaded(2);
        session.start_quiz(&config(QuestionCount::All, false, Some(0)));
        assert_eq!(session.phase(), Phase::Active);
        assert_eq!(session.time_limit(), None);
        assert_eq!(session.time_remaining(), None);
        assert!(!session.is_timer_active());
        assert_eq!(session.tick(session.run_id()), TickOutcome::Ignored);
        assert_eq!(session.phase(), Phase::Active);
    }

    #[test]
    fn restart_keeps_question_order() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut session = loaded(10);
        session.start_quiz_with_rng(&config(QuestionCount::Limit(6), true, Some(2)), &mut rng);
        let order = ids(session.questions());
        session.select_answer(1);
        session.next_question();
        session.finish_quiz();

        assert!(session.restart_quiz());
        assert_eq!(session.phase(), Phase::Active);
        assert_eq!(ids(session.questions()), order);
        assert_eq!(session.selected_answers(), &[None; 6]);
        assert_eq!(session.current_question_index(), 0);
        assert_eq!(session.score(), 0);
        assert_eq!(session.time_remaining(), Some(120));
        assert!(session.is_timer_active());
    }

    #[test]
    fn restart_only_from_completed() {
        let mut session = loaded(2);
        session.start_quiz(&QuizConfig::default());
        assert!(!session.restart_quiz());
    }

    #[test]
    fn back_to_setup_clears_run_but_keeps_pool() {
        let mut session = loaded(4);
        session.start_quiz(&config(QuestionCount::All, false, Some(5)));
        let run = session.run_id();
        assert!(session.back_to_setup());

        assert_eq!(session.phase(), Phase::Configuring);
        assert_eq!(session.all_questions().len(), 4);
        assert!(session.questions().is_empty());
        assert!(session.selected_answers().is_empty());
        assert_eq!(session.time_remaining(), None);
        assert!(!session.is_timer_active());
        assert_eq!(session.tick(run), TickOutcome::Ignored);
    }

    #[test]
    fn reset_discards_everything() {
        let mut session = loaded(4);
        session.start_quiz(&config(QuestionCount::All, false, Some(5)));
        session.reset_quiz();
        assert_eq!(session.phase(), Phase::Empty);
        assert!(session.all_questions().is_empty());
        assert!(session.source().is_none());
        assert!(!session.is_timer_active());
    }

    #[test]
    fn study_feedback_only_after_answering() {
        let mut session = loaded(2);
        session.start_quiz(&QuizConfig::default());
        assert!(session.feedback().is_none());

        session.select_answer(1);
        let feedback = session.feedback().unwrap();
        assert_eq!(feedback.selected, 1);
        assert_eq!(feedback.correct, 1);
        assert!(feedback.is_correct);
        assert_eq!(feedback.explanation, "because 1");
    }

    #[test]
    fn exam_mode_gives_no_feedback() {
        let mut session = loaded(2);
        session.start_quiz(&config(QuestionCount::All, false, None));
        session.select_answer(1);
        assert!(session.feedback().is_none());
    }

    #[test]
    fn results_match_score_and_report_time() {
        let mut session = loaded(3);
        session.start_quiz(&config(QuestionCount::All, false, Some(1)));
        session.select_answer(1);
        let run = session.run_id();
        for _ in 0..15 {
            session.tick(run);
        }
        session.finish_quiz();

        let results = session.results().unwrap();
        assert_eq!(results.score, session.score());
        assert_eq!(results.total, 3);
        let time = results.time.unwrap();
        assert_eq!(time.used_secs, 15);
        assert_eq!(time.remaining_secs, 45);
        assert!(!time.timed_out);
    }
}
