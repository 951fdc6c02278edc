//! quizkit-sources — Question loaders and source catalog.
//!
//! Implements the `QuestionSource` trait for HTTP URLs, data URLs and inline
//! JSON, and loads the catalog of predefined question sets with a fallback
//! list from configuration.

pub mod catalog;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod inline;
pub mod mock;

pub use catalog::{Catalog, CatalogListing};
pub use config::{create_source, load_config, load_config_from, QuizkitConfig};
pub use dispatch::DefaultSource;
pub use error::CatalogError;
pub use http::HttpSource;
