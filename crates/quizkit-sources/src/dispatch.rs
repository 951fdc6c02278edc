//! Routes each source location to the loader that can read it.

use async_trait::async_trait;

use quizkit_core::error::TransportError;
use quizkit_core::model::SourceLocation;
use quizkit_core::traits::QuestionSource;

use crate::http::HttpSource;
use crate::inline::decode_data_url;

/// Source used by the CLI: HTTP for URLs, in-process decoding otherwise.
#[derive(Debug, Clone)]
pub struct DefaultSource {
    http: HttpSource,
}

impl DefaultSource {
    pub fn new(http: HttpSource) -> Self {
        Self { http }
    }

    pub fn http(&self) -> &HttpSource {
        &self.http
    }
}

#[async_trait]
impl QuestionSource for DefaultSource {
    fn name(&self) -> &str {
        "default"
    }

    async fn fetch(&self, location: &SourceLocation) -> Result<String, TransportError> {
        match location {
            SourceLocation::Url(_) => self.http.fetch(location).await,
            SourceLocation::DataUrl(url) => decode_data_url(url),
            SourceLocation::Inline(json) => Ok(json.clone()),
        }
    }
}
