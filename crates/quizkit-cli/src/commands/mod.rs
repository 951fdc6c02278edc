pub mod init;
pub mod sources;
pub mod take;
pub mod validate;

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};

use quizkit_core::model::{QuizSourceRef, SourceLocation};

/// Turn a `--source` argument into a source reference.
///
/// URLs and data URLs are loaded through the configured source; local files
/// and `-` (stdin) are read here and passed on as inline JSON.
pub fn resolve_source(arg: &str, name: Option<String>) -> Result<QuizSourceRef> {
    if arg == "-" {
        let mut json = String::new();
        std::io::stdin()
            .read_to_string(&mut json)
            .context("failed to read questions from stdin")?;
        return Ok(QuizSourceRef::new(
            name.unwrap_or_else(|| "stdin".into()),
            SourceLocation::Inline(json),
        ));
    }

    if let Ok(location) = SourceLocation::parse(arg) {
        let default_name = match location {
            SourceLocation::DataUrl(_) => "Custom JSON",
            _ => "Custom URL",
        };
        return Ok(QuizSourceRef::new(
            name.unwrap_or_else(|| default_name.into()),
            location,
        ));
    }

    let path = Path::new(arg);
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read question file: {}", path.display()))?;
    let name = name.unwrap_or_else(|| {
        path.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Custom JSON".into())
    });
    Ok(QuizSourceRef::new(name, SourceLocation::Inline(json)))
}
