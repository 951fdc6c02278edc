//! Shared quiz controller.
//!
//! [`Quiz`] is the explicitly owned container around a [`QuizSession`]. It
//! performs the asynchronous part of loading, keeps the countdown armed for
//! exactly the current timed run, and publishes phase changes on a watch
//! channel so a front end notices timer-forced completion.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use rand::Rng;
use tokio::runtime::Handle;
use tokio::sync::watch;

use crate::error::LoadError;
use crate::model::{Phase, QuizConfig, QuizSourceRef};
use crate::normalize::parse_questions;
use crate::results::QuizResults;
use crate::session::{QuizSession, TickOutcome};
use crate::timer::{CountdownHandle, CountdownTarget, TICK_PERIOD};
use crate::traits::QuestionSource;

/// What happened to a load request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    /// Questions were loaded; the session is configuring.
    Loaded(usize),
    /// The load failed; the session is in the error phase.
    Failed(LoadError),
    /// A newer load or a reset happened first; the result was dropped.
    Superseded,
}

struct Shared {
    session: Mutex<QuizSession>,
    countdown: Mutex<Option<CountdownHandle>>,
    source: Arc<dyn QuestionSource>,
    phase_tx: watch::Sender<Phase>,
    runtime: Handle,
    tick_period: Duration,
}

impl Shared {
    fn session(&self) -> MutexGuard<'_, QuizSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, phase: Phase) {
        self.phase_tx.send_if_modified(|current| {
            let changed = *current != phase;
            *current = phase;
            changed
        });
    }
}

impl CountdownTarget for Shared {
    fn on_tick(&self, run_id: u64) -> TickOutcome {
        let mut session = self.session();
        let outcome = session.tick(run_id);
        if outcome == TickOutcome::Expired {
            self.publish(session.phase());
        }
        outcome
    }
}

/// A quiz session plus its fetch collaborator and countdown.
///
/// Must be created inside a Tokio runtime; the countdown runs on it.
#[derive(Clone)]
pub struct Quiz {
    shared: Arc<Shared>,
}

impl Quiz {
    pub fn new(source: Arc<dyn QuestionSource>) -> Self {
        Self::with_tick_period(source, TICK_PERIOD)
    }

    /// Like [`Quiz::new`] with a custom countdown period.
    pub fn with_tick_period(source: Arc<dyn QuestionSource>, tick_period: Duration) -> Self {
        let (phase_tx, _) = watch::channel(Phase::Empty);
        Self {
            shared: Arc::new(Shared {
                session: Mutex::new(QuizSession::new()),
                countdown: Mutex::new(None),
                source,
                phase_tx,
                runtime: Handle::current(),
                tick_period,
            }),
        }
    }

    /// Watch phase changes, including timer-driven completion.
    pub fn subscribe(&self) -> watch::Receiver<Phase> {
        self.shared.phase_tx.subscribe()
    }

    /// Read the session under the lock.
    pub fn with_session<R>(&self, f: impl FnOnce(&QuizSession) -> R) -> R {
        f(&self.shared.session())
    }

    pub fn phase(&self) -> Phase {
        self.with_session(QuizSession::phase)
    }

    pub fn results(&self) -> Option<QuizResults> {
        self.with_session(QuizSession::results)
    }

    /// Fetch and normalize `source`.
    ///
    /// The fetch runs without holding the session lock. If another load or a
    /// reset is issued meanwhile, this result is dropped.
    pub async fn load_questions(&self, source: QuizSourceRef) -> LoadStatus {
        let ticket = self.mutate(|s| s.begin_load(source));

        let outcome = match self.shared.source.fetch(&ticket.source().location).await {
            Ok(text) => parse_questions(&text),
            Err(e) => Err(LoadError::from(e)),
        };
        let status = match &outcome {
            Ok(questions) => LoadStatus::Loaded(questions.len()),
            Err(e) => LoadStatus::Failed(e.clone()),
        };

        if self.mutate(|s| s.complete_load(&ticket, outcome)) {
            status
        } else {
            LoadStatus::Superseded
        }
    }

    /// Re-issue the last load. `None` if nothing was ever loaded.
    pub async fn retry(&self) -> Option<LoadStatus> {
        let source = self.with_session(|s| s.source().cloned())?;
        Some(self.load_questions(source).await)
    }

    pub fn start_quiz(&self, config: &QuizConfig) -> bool {
        self.mutate(|s| s.start_quiz(config))
    }

    pub fn start_quiz_with_rng<R: Rng + ?Sized>(&self, config: &QuizConfig, rng: &mut R) -> bool {
        self.mutate(|s| s.start_quiz_with_rng(config, rng))
    }

    pub fn select_answer(&self, index: usize) -> bool {
        self.mutate(|s| s.select_answer(index))
    }

    pub fn next_question(&self) -> bool {
        self.mutate(QuizSession::next_question)
    }

    pub fn previous_question(&self) -> bool {
        self.mutate(QuizSession::previous_question)
    }

    pub fn finish_quiz(&self) -> bool {
        self.mutate(QuizSession::finish_quiz)
    }

    pub fn restart_quiz(&self) -> bool {
        self.mutate(QuizSession::restart_quiz)
    }

    pub fn back_to_setup(&self) -> bool {
        self.mutate(QuizSession::back_to_setup)
    }

    pub fn reset_quiz(&self) {
        self.mutate(QuizSession::reset_quiz)
    }

    /// `true` while a countdown task is alive.
    pub fn countdown_running(&self) -> bool {
        self.shared
            .countdown
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    /// Apply a transition, then bring the countdown and watchers in line
    /// with the resulting state.
    ///
    /// Both happen under the session lock so a concurrent tick cannot slip
    /// in between the transition and its publication.
    fn mutate<R>(&self, f: impl FnOnce(&mut QuizSession) -> R) -> R {
        let mut session = self.shared.session();
        let result = f(&mut session);
        let timed_run = (session.phase() == Phase::Active && session.is_timer_active())
            .then(|| session.run_id());
        self.sync_countdown(timed_run);
        self.shared.publish(session.phase());
        result
    }

    fn sync_countdown(&self, timed_run: Option<u64>) {
        let mut slot = self
            .shared
            .countdown
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let current = slot.as_ref().map(|h| (h.run_id(), h.is_finished()));
        match (timed_run, current) {
            (Some(run), Some((armed, false))) if run == armed => {}
            (Some(run), _) => {
                *slot = Some(CountdownHandle::spawn(
                    &self.shared.runtime,
                    Arc::downgrade(&self.shared),
                    run,
                    self.shared.tick_period,
                ));
            }
            (None, _) => {
                if let Some(handle) = slot.take() {
                    handle.cancel();
                }
            }
        }
    }
}
