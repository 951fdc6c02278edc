//! The `quizkit init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    if Path::new("quizkit.toml").exists() {
        println!("quizkit.toml already exists, skipping.");
    } else {
        std::fs::write("quizkit.toml", SAMPLE_CONFIG)?;
        println!("Created quizkit.toml");
    }

    std::fs::create_dir_all("questions")?;
    let sample_path = Path::new("questions/sample.json");
    if sample_path.exists() {
        println!("questions/sample.json already exists, skipping.");
    } else {
        std::fs::write(sample_path, SAMPLE_QUESTIONS)?;
        println!("Created questions/sample.json");
    }

    println!("\nNext steps:");
    println!("  1. Edit quizkit.toml to point at your question catalog");
    println!("  2. Run: quizkit validate --source questions/sample.json");
    println!("  3. Run: quizkit take --source questions/sample.json --mode exam --timed");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# quizkit configuration

# JSON array of {"name": ..., "url": ...} objects
catalog_url = "https://tuannt.me/static/quiz/all.json"
sources_limit = 4
request_timeout_secs = 30

[limits]
default_time_limit = 30
max_time_limit = 180
min_questions = 1
max_custom_questions = 100

# Shown when the catalog cannot be loaded
[[fallback]]
name = "Sample questions"
url = "https://example.com/quizzes/sample.json"
"#;

const SAMPLE_QUESTIONS: &str = r#"[
  {
    "question": "Which keyword declares an immutable binding in Rust?",
    "options": ["var", "let", "const mut", "static mut"],
    "correct": 1,
    "explanation": "`let` bindings are immutable unless marked `mut`."
  },
  {
    "question": "What does the `?` operator do with an `Err` value?",
    "options": [
      { "text": "Panics", "isCorrect": false },
      { "text": "Returns it early from the function", "isCorrect": true },
      { "text": "Ignores it", "isCorrect": false }
    ],
    "explanation": "`?` converts the error with `From` and returns it."
  },
  {
    "question": "Which type owns a growable UTF-8 string?",
    "options": ["&str", "String", "char"],
    "correctAnswer": 1
  }
]
"#;
