//! HTTP question loader.

use std::time::Duration;

use async_trait::async_trait;
use tracing::instrument;

use quizkit_core::error::TransportError;
use quizkit_core::model::SourceLocation;
use quizkit_core::traits::QuestionSource;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Loads question sets with a plain GET.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    timeout_secs: u64,
}

impl HttpSource {
    pub fn new(timeout_secs: u64) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| TransportError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            timeout_secs,
        })
    }

    /// GET `url` and return the body as text.
    #[instrument(skip(self))]
    pub async fn get_text(&self, url: &str) -> Result<String, TransportError> {
        let response = self
            .client
            .get(url)
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|e| self.map_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Http {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
            });
        }

        let body = response.text().await.map_err(|e| self.map_error(e))?;
        tracing::debug!(bytes = body.len(), "fetched source");
        Ok(body)
    }

    fn map_error(&self, e: reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::Timeout(self.timeout_secs)
        } else if e.is_connect() {
            TransportError::Network(format!("connection failed: {e}"))
        } else {
            TransportError::Network(e.to_string())
        }
    }
}

#[async_trait]
impl QuestionSource for HttpSource {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch(&self, location: &SourceLocation) -> Result<String, TransportError> {
        match location {
            SourceLocation::Url(url) => self.get_text(url).await,
            other => Err(TransportError::InvalidSource(format!(
                "http source cannot load {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn successful_fetch() {
        let server = MockServer::start().await;
        let body = serde_json::json!([
            {"question": "2 + 2?", "options": ["3", "4"], "correct": 1}
        ]);

        Mock::given(method("GET"))
            .and(path("/quiz/math.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let source = HttpSource::new(5).unwrap();
        let text = source
            .fetch(&SourceLocation::Url(format!("{}/quiz/math.json", server.uri())))
            .await
            .unwrap();
        assert!(text.contains("2 + 2?"));
    }

    #[tokio::test]
    async fn non_success_status_is_http_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("nope"))
            .mount(&server)
            .await;

        let source = HttpSource::new(5).unwrap();
        let err = source
            .get_text(&format!("{}/missing.json", server.uri()))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            TransportError::Http {
                status: 404,
                reason: "Not Found".into()
            }
        );
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn slow_server_times_out() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("[]")
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let source = HttpSource::new(1).unwrap();
        let err = source.get_text(&server.uri()).await.unwrap_err();
        assert_eq!(err, TransportError::Timeout(1));
    }

    #[tokio::test]
    async fn refused_connection_is_network_error() {
        let source = HttpSource::new(2).unwrap();
        let err = source.get_text("http://127.0.0.1:9/quiz.json").await.unwrap_err();
        assert!(matches!(err, TransportError::Network(_)));
    }

    #[tokio::test]
    async fn rejects_non_url_locations() {
        let source = HttpSource::new(2).unwrap();
        let err = source
            .fetch(&SourceLocation::Inline("[]".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::InvalidSource(_)));
    }
}
