//! The `quizkit sources` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use quizkit_core::model::SourceLocation;
use quizkit_sources::catalog::Catalog;
use quizkit_sources::config::load_config_from;
use quizkit_sources::http::HttpSource;

pub async fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let http = HttpSource::new(config.request_timeout_secs)?;

    let catalog = Catalog::new(
        config.catalog_url.clone(),
        config.sources_limit,
        config.fallback_sources(),
    );
    let listing = catalog.list(&http).await;

    if let Some(reason) = &listing.fallback_reason {
        println!("Catalog unavailable ({reason}); showing fallback sources.");
    }

    if listing.sources.is_empty() {
        println!("No sources available. Run `quizkit init` to create a config file.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Name", "Source"]);
    for source in &listing.sources {
        let location = match &source.location {
            SourceLocation::Url(url) => url.clone(),
            other => other.to_string(),
        };
        table.add_row(vec![Cell::new(&source.name), Cell::new(location)]);
    }
    println!("{table}");
    println!("\nTake one with: quizkit take --source <url>");

    Ok(())
}
