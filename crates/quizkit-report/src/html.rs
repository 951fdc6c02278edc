//! HTML review page.
//!
//! Produces a self-contained HTML file with all CSS inlined: the score
//! summary, then every question with the chosen and correct options marked.

use std::path::Path;

use anyhow::Result;

use quizkit_core::results::{OptionReview, Performance, QuestionOutcome, QuizResults};
use quizkit_core::timer::format_clock;

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Generate the review page for a finished run of `source_name`.
pub fn generate_html(source_name: &str, results: &QuizResults) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>quizkit results: {}</title>\n",
        html_escape(source_name)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    html.push_str("<header>\n");
    html.push_str(&format!("<h1>{}</h1>\n", html_escape(source_name)));
    html.push_str(&format!(
        "<p class=\"meta\">{} mode | {} questions | {}</p>\n",
        results.mode,
        results.total,
        results.completed_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    html.push_str(&summary_section(results));

    html.push_str("<section class=\"review\">\n");
    html.push_str("<h2>Review</h2>\n");
    for (i, outcome) in results.breakdown.iter().enumerate() {
        html.push_str(&question_block(i + 1, outcome));
    }
    html.push_str("</section>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write the review page to a file.
pub fn write_html_report(source_name: &str, results: &QuizResults, path: &Path) -> Result<()> {
    let html = generate_html(source_name, results);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)?;
    Ok(())
}

fn performance_class(performance: Performance) -> &'static str {
    match performance {
        Performance::Excellent => "excellent",
        Performance::Good => "good",
        Performance::Fair => "fair",
        Performance::NeedsImprovement => "poor",
    }
}

fn summary_section(results: &QuizResults) -> String {
    let mut s = String::from("<section class=\"dashboard\">\n<h2>Summary</h2>\n");
    s.push_str(&format!(
        "<p class=\"score {}\"><strong>{}%</strong> {}</p>\n",
        performance_class(results.performance),
        results.percentage,
        results.performance.label()
    ));
    s.push_str("<table class=\"summary\">\n<tbody>\n");
    s.push_str(&format!(
        "<tr><th>Correct</th><td>{} / {}</td></tr>\n",
        results.score, results.total
    ));
    s.push_str(&format!(
        "<tr><th>Incorrect</th><td>{}</td></tr>\n",
        results.incorrect
    ));
    s.push_str(&format!(
        "<tr><th>Unanswered</th><td>{}</td></tr>\n",
        results.unanswered
    ));
    if let Some(time) = &results.time {
        s.push_str(&format!(
            "<tr><th>Time used</th><td>{} of {}{}</td></tr>\n",
            format_clock(time.used_secs),
            format_clock(time.limit_secs),
            if time.timed_out { " (time ran out)" } else { "" }
        ));
    }
    s.push_str("</tbody></table>\n</section>\n");
    s
}

fn option_class(review: OptionReview) -> &'static str {
    match review {
        OptionReview::CorrectSelected => "correct selected",
        OptionReview::CorrectMissed => "correct",
        OptionReview::WrongSelected => "wrong selected",
        OptionReview::Neutral => "neutral",
    }
}

fn question_block(number: usize, outcome: &QuestionOutcome) -> String {
    let status = match (outcome.is_answered(), outcome.is_correct) {
        (_, true) => "pass",
        (true, false) => "fail",
        (false, false) => "skipped",
    };

    let mut s = format!("<article class=\"question {status}\">\n");
    s.push_str(&format!(
        "<h3>{}. {}</h3>\n",
        number,
        html_escape(&outcome.question)
    ));
    s.push_str("<ol type=\"A\">\n");
    for option in &outcome.options {
        s.push_str(&format!(
            "<li class=\"{}\">{}</li>\n",
            option_class(option.review),
            html_escape(&option.text)
        ));
    }
    s.push_str("</ol>\n");
    if !outcome.is_answered() {
        s.push_str("<p class=\"note\">Not answered.</p>\n");
    }
    if !outcome.explanation.is_empty() {
        s.push_str(&format!(
            "<details><summary>Explanation</summary><p>{}</p></details>\n",
            html_escape(&outcome.explanation)
        ));
    }
    s.push_str("</article>\n");
    s
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --pass: #dcfce7; --fail: #fde2e2; --skip: #fef9c3; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --pass: #064e3b; --fail: #7f1d1d; --skip: #713f12; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); max-width: 60rem; }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
.score { font-size: 1.5rem; }
.score.excellent, .score.good { color: #16a34a; }
.score.fair { color: #ca8a04; }
.score.poor { color: #dc2626; }
table { border-collapse: collapse; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
.question { border: 1px solid var(--border); border-radius: 8px; padding: 0.5rem 1rem; margin: 1rem 0; }
.question.pass { border-left: 6px solid #16a34a; }
.question.fail { border-left: 6px solid #dc2626; }
.question.skipped { border-left: 6px solid #ca8a04; }
li { padding: 0.25rem 0.5rem; border-radius: 4px; margin: 0.2rem 0; }
li.correct { background: var(--pass); }
li.wrong { background: var(--fail); }
li.selected { font-weight: bold; }
.note { color: #6b7280; font-style: italic; }
details { margin: 0.5rem 0; }
summary { cursor: pointer; font-weight: bold; }
"#;
