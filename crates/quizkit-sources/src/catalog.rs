//! Catalog of predefined question sets.
//!
//! The catalog is a JSON array of `{name | title, url | link}` objects hosted
//! somewhere. When it cannot be loaded the configured fallback sources are
//! offered instead, together with the reason.

use serde_json::Value;
use tracing::instrument;

use quizkit_core::model::{QuizSourceRef, SourceLocation};

use crate::error::CatalogError;
use crate::http::HttpSource;

const UNNAMED: &str = "Unnamed Quiz";

/// Sources to offer, and whether they came from the fallback list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogListing {
    pub sources: Vec<QuizSourceRef>,
    /// Set when the catalog failed and fallback sources were used.
    pub fallback_reason: Option<CatalogError>,
}

impl CatalogListing {
    pub fn is_fallback(&self) -> bool {
        self.fallback_reason.is_some()
    }
}

pub struct Catalog {
    url: String,
    limit: usize,
    fallback: Vec<QuizSourceRef>,
}

impl Catalog {
    pub fn new(url: impl Into<String>, limit: usize, fallback: Vec<QuizSourceRef>) -> Self {
        Self {
            url: url.into(),
            limit,
            fallback,
        }
    }

    /// Fetch the catalog, falling back to the configured sources on error.
    #[instrument(skip(self, http), fields(url = %self.url))]
    pub async fn list(&self, http: &HttpSource) -> CatalogListing {
        match self.fetch(http).await {
            Ok(mut sources) => {
                sources.truncate(self.limit);
                tracing::info!(count = sources.len(), "loaded source catalog");
                CatalogListing {
                    sources,
                    fallback_reason: None,
                }
            }
            Err(e) => {
                tracing::warn!(
                    fallback = self.fallback.len(),
                    "source catalog unavailable, using fallback sources: {e}"
                );
                CatalogListing {
                    sources: self.fallback.iter().take(self.limit).cloned().collect(),
                    fallback_reason: Some(e),
                }
            }
        }
    }

    async fn fetch(&self, http: &HttpSource) -> Result<Vec<QuizSourceRef>, CatalogError> {
        let text = http.get_text(&self.url).await?;
        parse_catalog(&text)
    }
}

/// Parse a catalog document. Entries without a usable url are dropped.
pub fn parse_catalog(text: &str) -> Result<Vec<QuizSourceRef>, CatalogError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| CatalogError::InvalidJson(e.to_string()))?;
    let entries = value.as_array().ok_or(CatalogError::NotAnArray)?;

    Ok(entries.iter().filter_map(catalog_entry).collect())
}

fn catalog_entry(entry: &Value) -> Option<QuizSourceRef> {
    let text = |key: &str| {
        entry
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    };

    let url = text("url").or_else(|| text("link"))?;
    let location = match SourceLocation::parse(url) {
        Ok(location) => location,
        Err(e) => {
            tracing::debug!("skipping catalog entry: {e}");
            return None;
        }
    };
    let name = text("name").or_else(|| text("title")).unwrap_or(UNNAMED);
    Some(QuizSourceRef::new(name, location))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizkit_core::error::TransportError;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fallback() -> Vec<QuizSourceRef> {
        vec![QuizSourceRef::new(
            "Offline set",
            SourceLocation::Url("https://fallback.example.com/q.json".into()),
        )]
    }

    #[test]
    fn entries_are_normalized() {
        let text = r#"[
            {"name": "Rust", "url": "https://q.example.com/rust.json"},
            {"title": "Go", "link": "https://q.example.com/go.json"},
            {"url": "https://q.example.com/anon.json"},
            {"name": "No url"},
            {"name": "Bad url", "url": "not a url"},
            {"name": "Empty url", "url": ""},
            "just a string"
        ]"#;
        let sources = parse_catalog(text).unwrap();
        let names: Vec<&str> = sources.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Rust", "Go", "Unnamed Quiz"]);
        assert_eq!(
            sources[1].location,
            SourceLocation::Url("https://q.example.com/go.json".into())
        );
    }

    #[test]
    fn rejects_non_array() {
        assert_eq!(parse_catalog(r#"{"sources": []}"#), Err(CatalogError::NotAnArray));
        assert!(matches!(parse_catalog("nope"), Err(CatalogError::InvalidJson(_))));
    }

    #[tokio::test]
    async fn lists_remote_catalog_up_to_limit() {
        let server = MockServer::start().await;
        let body = serde_json::json!([
            {"name": "A", "url": "https://q.example.com/a.json"},
            {"name": "B", "url": "https://q.example.com/b.json"},
            {"name": "C", "url": "https://q.example.com/c.json"}
        ]);
        Mock::given(method("GET"))
            .and(path("/all.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let catalog = Catalog::new(format!("{}/all.json", server.uri()), 2, fallback());
        let listing = catalog.list(&HttpSource::new(5).unwrap()).await;

        assert!(!listing.is_fallback());
        assert_eq!(listing.sources.len(), 2);
        assert_eq!(listing.sources[1].name, "B");
    }

    #[tokio::test]
    async fn falls_back_on_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let catalog = Catalog::new(server.uri(), 4, fallback());
        let listing = catalog.list(&HttpSource::new(5).unwrap()).await;

        assert_eq!(listing.sources, fallback());
        assert!(matches!(
            listing.fallback_reason,
            Some(CatalogError::Transport(TransportError::Http { status: 503, .. }))
        ));
    }

    #[tokio::test]
    async fn falls_back_on_wrong_shape() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"items": 1}"#))
            .mount(&server)
            .await;

        let catalog = Catalog::new(server.uri(), 4, fallback());
        let listing = catalog.list(&HttpSource::new(5).unwrap()).await;
        assert_eq!(listing.fallback_reason, Some(CatalogError::NotAnArray));
        assert_eq!(listing.sources.len(), 1);
    }
}
