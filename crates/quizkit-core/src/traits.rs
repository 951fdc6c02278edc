//! Trait definitions for question sources.
//!
//! Implemented by the `quizkit-sources` crate. A source only moves bytes:
//! it returns the raw payload text or a transport error, and never looks at
//! the question format.

use async_trait::async_trait;

use crate::error::TransportError;
use crate::model::SourceLocation;

/// Fetches raw question set JSON.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Human-readable source name (e.g. "http").
    fn name(&self) -> &str;

    /// Fetch the payload at `location` as text.
    async fn fetch(&self, location: &SourceLocation) -> Result<String, TransportError>;
}
