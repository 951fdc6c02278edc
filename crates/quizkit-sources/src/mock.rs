//! Mock source for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use quizkit_core::error::TransportError;
use quizkit_core::model::SourceLocation;
use quizkit_core::traits::QuestionSource;

/// A source that serves canned payloads keyed by location string.
///
/// Inline locations are always served as-is.
pub struct MockSource {
    /// Map of location → payload or error.
    responses: HashMap<String, Result<String, TransportError>>,
    /// Served when no key matches.
    default_response: Result<String, TransportError>,
    /// Applied before every response.
    delay: Duration,
    call_count: AtomicU32,
    last_location: Mutex<Option<SourceLocation>>,
}

impl MockSource {
    pub fn new(responses: HashMap<String, Result<String, TransportError>>) -> Self {
        Self {
            responses,
            default_response: Err(TransportError::Http {
                status: 404,
                reason: "Not Found".into(),
            }),
            delay: Duration::ZERO,
            call_count: AtomicU32::new(0),
            last_location: Mutex::new(None),
        }
    }

    /// A mock that always returns the same payload.
    pub fn with_fixed_response(payload: &str) -> Self {
        Self {
            default_response: Ok(payload.to_string()),
            ..Self::new(HashMap::new())
        }
    }

    /// A mock that always fails with `error`.
    pub fn failing(error: TransportError) -> Self {
        Self {
            default_response: Err(error),
            ..Self::new(HashMap::new())
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    pub fn last_location(&self) -> Option<SourceLocation> {
        self.last_location
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl QuestionSource for MockSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch(&self, location: &SourceLocation) -> Result<String, TransportError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self
            .last_location
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(location.clone());

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let key = match location {
            SourceLocation::Inline(json) => return Ok(json.clone()),
            SourceLocation::Url(url) | SourceLocation::DataUrl(url) => url,
        };
        self.responses
            .get(key)
            .cloned()
            .unwrap_or_else(|| self.default_response.clone())
    }
}
