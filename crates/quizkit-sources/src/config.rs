//! Configuration and source factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use quizkit_core::model::{QuizSourceRef, SourceLocation};
use quizkit_core::setup::SetupLimits;
use quizkit_core::traits::QuestionSource;

use crate::dispatch::DefaultSource;
use crate::http::{HttpSource, DEFAULT_TIMEOUT_SECS};

/// Number of `QUIZKIT_FALLBACK_QUIZ_{n}_*` slots read from the environment.
pub const FALLBACK_ENV_SLOTS: usize = 4;

/// A predefined source from the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackSource {
    pub name: String,
    pub url: String,
}

impl FallbackSource {
    /// `None` if the url is neither http(s) nor a data URL.
    pub fn to_source_ref(&self) -> Option<QuizSourceRef> {
        let location = SourceLocation::parse(&self.url).ok()?;
        Some(QuizSourceRef::new(self.name.clone(), location))
    }
}

/// Top-level quizkit configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizkitConfig {
    /// URL of the JSON list of predefined question sets.
    #[serde(default = "default_catalog_url")]
    pub catalog_url: String,
    /// Max predefined sources shown.
    #[serde(default = "default_sources_limit")]
    pub sources_limit: usize,
    /// HTTP timeout in seconds.
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    /// Bounds for the setup form.
    #[serde(default)]
    pub limits: SetupLimits,
    /// Used when the catalog cannot be loaded.
    #[serde(default)]
    pub fallback: Vec<FallbackSource>,
}

fn default_catalog_url() -> String {
    "https://tuannt.me/static/quiz/all.json".to_string()
}
fn default_sources_limit() -> usize {
    4
}
fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for QuizkitConfig {
    fn default() -> Self {
        Self {
            catalog_url: default_catalog_url(),
            sources_limit: default_sources_limit(),
            request_timeout_secs: default_timeout(),
            limits: SetupLimits::default(),
            fallback: Vec::new(),
        }
    }
}

impl QuizkitConfig {
    /// Fallback sources with a usable location.
    pub fn fallback_sources(&self) -> Vec<QuizSourceRef> {
        self.fallback
            .iter()
            .filter_map(|f| {
                let source = f.to_source_ref();
                if source.is_none() {
                    tracing::warn!(name = %f.name, url = %f.url, "ignoring fallback source with invalid url");
                }
                source
            })
            .collect()
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are copied as-is and never expanded again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + end];
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `quizkit.toml` in the current directory
/// 2. `~/.config/quizkit/config.toml`
///
/// Environment overrides: `QUIZKIT_CATALOG_URL`,
/// `QUIZKIT_FALLBACK_QUIZ_{1..4}_NAME` / `_URL`, `QUIZKIT_SOURCES_LIMIT`,
/// `QUIZKIT_REQUEST_TIMEOUT`, `QUIZKIT_DEFAULT_TIME_LIMIT`,
/// `QUIZKIT_MAX_TIME_LIMIT`, `QUIZKIT_MIN_QUESTIONS`,
/// `QUIZKIT_MAX_CUSTOM_QUESTIONS`.
pub fn load_config() -> Result<QuizkitConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizkitConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("quizkit.toml");
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|dir| dir.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = toml::from_str::<QuizkitConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!(path = %path.display(), "loaded config");
            config
        }
        None => QuizkitConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;

    config.catalog_url = resolve_env_vars(&config.catalog_url);
    for source in &mut config.fallback {
        source.name = resolve_env_vars(&source.name);
        source.url = resolve_env_vars(&source.url);
    }

    Ok(config)
}

/// Apply `QUIZKIT_*` overrides read through `lookup`.
///
/// Fallback slots only count when both name and url are set; if any slot is
/// set the environment list replaces the file's.
fn apply_env_overrides(
    config: &mut QuizkitConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<()> {
    if let Some(url) = lookup("QUIZKIT_CATALOG_URL") {
        config.catalog_url = url;
    }

    let env_fallback: Vec<FallbackSource> = (1..=FALLBACK_ENV_SLOTS)
        .filter_map(|i| {
            let name = lookup(&format!("QUIZKIT_FALLBACK_QUIZ_{i}_NAME"))?;
            let url = lookup(&format!("QUIZKIT_FALLBACK_QUIZ_{i}_URL"))?;
            (!name.is_empty() && !url.is_empty()).then_some(FallbackSource { name, url })
        })
        .collect();
    if !env_fallback.is_empty() {
        config.fallback = env_fallback;
    }

    fn number<T: std::str::FromStr>(
        lookup: &impl Fn(&str) -> Option<String>,
        key: &str,
        slot: &mut T,
    ) -> Result<()>
    where
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        if let Some(raw) = lookup(key) {
            *slot = raw
                .trim()
                .parse()
                .with_context(|| format!("invalid value for {key}: '{raw}'"))?;
        }
        Ok(())
    }

    number(&lookup, "QUIZKIT_SOURCES_LIMIT", &mut config.sources_limit)?;
    number(&lookup, "QUIZKIT_REQUEST_TIMEOUT", &mut config.request_timeout_secs)?;
    number(&lookup, "QUIZKIT_DEFAULT_TIME_LIMIT", &mut config.limits.default_time_limit)?;
    number(&lookup, "QUIZKIT_MAX_TIME_LIMIT", &mut config.limits.max_time_limit)?;
    number(&lookup, "QUIZKIT_MIN_QUESTIONS", &mut config.limits.min_questions)?;
    number(&lookup, "QUIZKIT_MAX_CUSTOM_QUESTIONS", &mut config.limits.max_custom_questions)?;
    Ok(())
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizkit"))
}

/// Create the question source described by `config`.
pub fn create_source(config: &QuizkitConfig) -> Result<Arc<dyn QuestionSource>> {
    let http = HttpSource::new(config.request_timeout_secs).context("failed to set up HTTP")?;
    Ok(Arc::new(DefaultSource::new(http)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_QUIZKIT_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_QUIZKIT_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_QUIZKIT_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        assert_eq!(resolve_env_vars("no_close_${brace"), "no_close_${brace");
        std::env::remove_var("_QUIZKIT_TEST_VAR");
    }

    #[test]
    fn resolve_env_vars_does_not_expand_substituted_values() {
        std::env::set_var("_QUIZKIT_TEST_SELF_REF", "${_QUIZKIT_TEST_SELF_REF}");
        assert_eq!(
            resolve_env_vars("${_QUIZKIT_TEST_SELF_REF}"),
            "${_QUIZKIT_TEST_SELF_REF}"
        );

        std::env::set_var("_QUIZKIT_TEST_NESTED", "a${_QUIZKIT_TEST_VAR_UNSET}b");
        assert_eq!(
            resolve_env_vars("<${_QUIZKIT_TEST_NESTED}>${_QUIZKIT_TEST_VAR_UNSET}"),
            "<a${_QUIZKIT_TEST_VAR_UNSET}b>"
        );
    }

    #[test]
    fn default_config() {
        let config = QuizkitConfig::default();
        assert_eq!(config.sources_limit, 4);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.limits.default_time_limit, 30);
        assert_eq!(config.limits.max_time_limit, 180);
        assert_eq!(config.limits.min_questions, 1);
        assert_eq!(config.limits.max_custom_questions, 100);
        assert!(config.fallback.is_empty());
    }

    #[test]
    fn parse_full_config() {
        let toml_str = r#"
catalog_url = "https://quiz.example.com/all.json"
sources_limit = 6

[limits]
max_time_limit = 90

[[fallback]]
name = "Rust basics"
url = "https://quiz.example.com/rust.json"

[[fallback]]
name = "Broken"
url = "ftp://nowhere"
"#;
        let config: QuizkitConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.sources_limit, 6);
        assert_eq!(config.limits.max_time_limit, 90);
        assert_eq!(config.limits.default_time_limit, 30);
        assert_eq!(config.fallback.len(), 2);

        let sources = config.fallback_sources();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].name, "Rust basics");
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = QuizkitConfig {
            fallback: vec![FallbackSource {
                name: "From file".into(),
                url: "https://file.example.com/q.json".into(),
            }],
            ..QuizkitConfig::default()
        };
        let lookup = env(&[
            ("QUIZKIT_CATALOG_URL", "https://env.example.com/all.json"),
            ("QUIZKIT_FALLBACK_QUIZ_1_NAME", "One"),
            ("QUIZKIT_FALLBACK_QUIZ_1_URL", "https://env.example.com/1.json"),
            ("QUIZKIT_FALLBACK_QUIZ_2_NAME", "Name only"),
            ("QUIZKIT_FALLBACK_QUIZ_4_NAME", "Four"),
            ("QUIZKIT_FALLBACK_QUIZ_4_URL", "https://env.example.com/4.json"),
            ("QUIZKIT_MAX_TIME_LIMIT", "60"),
        ]);
        apply_env_overrides(&mut config, lookup).unwrap();

        assert_eq!(config.catalog_url, "https://env.example.com/all.json");
        let names: Vec<&str> = config.fallback.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["One", "Four"]);
        assert_eq!(config.limits.max_time_limit, 60);
    }

    #[test]
    fn bad_numeric_override_is_an_error() {
        let mut config = QuizkitConfig::default();
        let err = apply_env_overrides(&mut config, env(&[("QUIZKIT_MIN_QUESTIONS", "few")]))
            .unwrap_err();
        assert!(err.to_string().contains("QUIZKIT_MIN_QUESTIONS"));
    }

    #[test]
    fn explicit_path_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quizkit.toml");
        std::fs::write(&path, "request_timeout_secs = 5\n").unwrap();

        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.request_timeout_secs, 5);
    }

    #[test]
    fn missing_explicit_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config_from(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn malformed_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "sources_limit = \"many\"\n").unwrap();

        let err = load_config_from(Some(&path)).unwrap_err();
        assert!(format!("{err:#}").contains("failed to parse config"));
    }
}
