//! quizkit-report — Review page and JSON export of a finished quiz.

pub mod html;
pub mod json;

pub use html::{generate_html, write_html_report};
pub use json::{write_json_report, ResultsDocument};
