//! quizkit-core — Question normalization, quiz session and scoring.
//!
//! This crate defines the data model, the quiz state machine with its
//! countdown, and the scoring logic the rest of quizkit builds on. Loading
//! bytes from the network is left to implementors of
//! [`traits::QuestionSource`].

pub mod error;
pub mod model;
pub mod normalize;
pub mod quiz;
pub mod results;
pub mod session;
pub mod setup;
pub mod timer;
pub mod traits;

pub use error::{LoadError, TransportError};
pub use model::{Phase, Question, QuizConfig, QuizMode, QuizSourceRef, SourceLocation};
pub use quiz::{LoadStatus, Quiz};
pub use results::QuizResults;
pub use session::QuizSession;
