//! The `quizkit take` command.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};

use quizkit_core::model::{Phase, QuizMode, QuizSourceRef};
use quizkit_core::results::QuizResults;
use quizkit_core::setup::{CountChoice, SetupForm, TimeChoice};
use quizkit_core::timer::{format_clock, TimerUrgency};
use quizkit_core::{LoadStatus, Quiz};
use quizkit_report::json::{write_json_report, ResultsDocument};
use quizkit_report::html::write_html_report;
use quizkit_sources::config::{create_source, load_config_from};

use super::resolve_source;

pub struct TakeArgs {
    pub source: String,
    pub name: Option<String>,
    pub mode: QuizMode,
    pub count: Option<String>,
    pub shuffle: bool,
    pub time_limit: Option<String>,
    pub timed: bool,
    pub report: Option<PathBuf>,
    pub json: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

pub async fn execute(args: TakeArgs) -> Result<()> {
    if args.source == "-" {
        anyhow::bail!("answers are read from stdin; pass questions as a URL or file, not '-'");
    }

    let config = load_config_from(args.config.as_deref())?;
    let source = resolve_source(&args.source, args.name.clone())?;
    tracing::debug!(name = %source.name, location = %source.location, "resolved question source");
    let quiz = Quiz::new(create_source(&config)?);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    load(&quiz, source, &mut lines).await?;

    let form = SetupForm {
        mode: args.mode,
        question_count: args.count.map(CountChoice::Custom).unwrap_or_default(),
        randomize: args.shuffle,
        time_limit: if args.timed {
            TimeChoice::suggested(&config.limits)
        } else {
            args.time_limit.map(TimeChoice::Custom).unwrap_or_default()
        },
    };
    let pool = quiz.with_session(|s| s.all_questions().len());
    let quiz_config = form
        .to_config(pool, &config.limits)
        .context("invalid quiz settings")?;
    tracing::debug!(?quiz_config, pool, "starting quiz");
    quiz.start_quiz(&quiz_config);

    if !play(&quiz, &mut lines).await? {
        println!("Quiz abandoned.");
        return Ok(());
    }

    let results = quiz.results().context("quiz finished without results")?;
    let source_name = quiz.with_session(|s| s.source_name().to_string());
    print_results(&source_name, &results);

    if let Some(path) = &args.report {
        write_html_report(&source_name, &results, path)?;
        println!("HTML review written to {}", path.display());
    }
    if let Some(path) = &args.json {
        write_json_report(&ResultsDocument::new(source_name, results), path)?;
        println!("JSON results written to {}", path.display());
    }

    Ok(())
}

/// Load questions, offering a retry for transport failures.
async fn load<R>(quiz: &Quiz, source: QuizSourceRef, lines: &mut Lines<R>) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    println!("Loading {}...", source.name);
    let mut status = quiz.load_questions(source).await;
    loop {
        match status {
            LoadStatus::Loaded(count) => {
                println!("Loaded {count} questions.");
                return Ok(());
            }
            LoadStatus::Superseded => anyhow::bail!("load was superseded"),
            LoadStatus::Failed(e) if e.is_retryable() => {
                eprintln!("{e}");
                eprint!("Type r to retry, anything else to quit: ");
                match lines.next_line().await? {
                    Some(line) if line.trim().eq_ignore_ascii_case("r") => {}
                    _ => return Err(anyhow::Error::new(e).context("failed to load questions")),
                }
                status = quiz.retry().await.context("nothing to retry")?;
            }
            LoadStatus::Failed(e) => {
                return Err(anyhow::Error::new(e).context("failed to load questions"));
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Select(usize),
    Next,
    Previous,
    Finish,
    Quit,
    Help,
    Unknown(String),
}

fn parse_command(line: &str) -> Command {
    let line = line.trim();
    if let Ok(n) = line.parse::<usize>() {
        return Command::Select(n);
    }
    match line.to_lowercase().as_str() {
        "n" | "next" | "" => Command::Next,
        "p" | "prev" | "previous" => Command::Previous,
        "f" | "finish" => Command::Finish,
        "q" | "quit" => Command::Quit,
        "h" | "help" | "?" => Command::Help,
        _ => Command::Unknown(line.to_string()),
    }
}

const HELP: &str = "Commands: <number> answer, n next, p previous, f finish, q quit";

/// Run the active quiz until it completes. Returns `false` if the user quit.
async fn play<R>(quiz: &Quiz, lines: &mut Lines<R>) -> Result<bool>
where
    R: AsyncBufRead + Unpin,
{
    let mut phases = quiz.subscribe();
    println!("{HELP}");
    render_question(quiz);

    loop {
        if quiz.phase() == Phase::Completed {
            return Ok(true);
        }
        prompt(quiz);

        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    println!("\nInput closed, finishing quiz.");
                    quiz.finish_quiz();
                    continue;
                };
                match parse_command(&line) {
                    Command::Select(n) => select(quiz, n),
                    Command::Next => {
                        if quiz.next_question() {
                            render_question(quiz);
                        } else {
                            println!("This is the last question. Type f to finish.");
                        }
                    }
                    Command::Previous => {
                        if quiz.previous_question() {
                            render_question(quiz);
                        } else {
                            println!("This is the first question.");
                        }
                    }
                    Command::Finish => {
                        quiz.finish_quiz();
                    }
                    Command::Quit => {
                        quiz.back_to_setup();
                        return Ok(false);
                    }
                    Command::Help => println!("{HELP}"),
                    Command::Unknown(other) => println!("Unknown command '{other}'. {HELP}"),
                }
            }
            Ok(()) = phases.changed() => {
                if *phases.borrow_and_update() == Phase::Completed {
                    println!("\nTime is up!");
                }
            }
        }
    }
}

fn select(quiz: &Quiz, n: usize) {
    let option_count = quiz.with_session(|s| s.current_question().map_or(0, |q| q.options.len()));
    if n == 0 || n > option_count {
        println!("Pick an option between 1 and {option_count}.");
        return;
    }
    quiz.select_answer(n - 1);

    // Exam mode has no feedback until the end.
    let Some(feedback) = quiz.with_session(|s| s.feedback()) else {
        println!("Answer {n} recorded.");
        return;
    };
    if feedback.is_correct {
        println!("Correct!");
    } else {
        println!("Incorrect. The answer is {}.", feedback.correct + 1);
    }
    if !feedback.explanation.is_empty() {
        println!("  {}", feedback.explanation);
    }
}

fn render_question(quiz: &Quiz) {
    quiz.with_session(|s| {
        let Some(question) = s.current_question() else {
            return;
        };
        println!();
        println!(
            "Question {}/{} ({} answered)",
            s.current_question_index() + 1,
            s.questions().len(),
            s.answered_count()
        );
        println!("{}", question.question);
        let selected = s.selected_answer();
        for (i, option) in question.options.iter().enumerate() {
            let marker = if selected == Some(i) { '*' } else { ' ' };
            println!(" {marker}{}) {option}", i + 1);
        }
    });
}

fn prompt(quiz: &Quiz) {
    let remaining = quiz.with_session(|s| s.time_remaining().filter(|_| s.is_timer_active()));
    match remaining {
        Some(secs) => {
            let urgency = match TimerUrgency::from_remaining(secs) {
                TimerUrgency::Normal => "",
                TimerUrgency::Warning => " hurry",
                TimerUrgency::Critical => " last minute!",
            };
            print!("[{}{urgency}] > ", format_clock(secs));
        }
        None => print!("> "),
    }
    let _ = std::io::stdout().flush();
}

fn print_results(source_name: &str, results: &QuizResults) {
    use comfy_table::{Cell, Table};

    println!();
    println!("Results: {source_name}");
    println!(
        "Score: {}/{} ({}%) {}",
        results.score,
        results.total,
        results.percentage,
        results.performance.label()
    );
    println!(
        "Incorrect: {}  Unanswered: {}",
        results.incorrect, results.unanswered
    );
    if let Some(time) = &results.time {
        println!(
            "Time used: {} of {}{}",
            format_clock(time.used_secs),
            format_clock(time.limit_secs),
            if time.timed_out { " (time ran out)" } else { "" }
        );
    }

    let mut table = Table::new();
    table.set_header(vec!["#", "Question", "Your answer", "Correct answer", "Result"]);
    for (i, outcome) in results.breakdown.iter().enumerate() {
        let answer = outcome
            .selected
            .and_then(|s| outcome.options.get(s))
            .map_or("-".to_string(), |o| o.text.clone());
        let correct = outcome
            .options
            .get(outcome.correct)
            .map_or(String::new(), |o| o.text.clone());
        let verdict = match (outcome.is_answered(), outcome.is_correct) {
            (_, true) => "correct",
            (true, false) => "wrong",
            (false, false) => "skipped",
        };
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(truncate(&outcome.question, 60)),
            Cell::new(answer),
            Cell::new(correct),
            Cell::new(verdict),
        ]);
    }
    println!("\n{table}");

    let explained: Vec<_> = results
        .missed()
        .filter(|o| !o.explanation.is_empty())
        .collect();
    if !explained.is_empty() {
        println!("\nExplanations:");
        for outcome in explained {
            println!("  {}: {}", truncate(&outcome.question, 40), outcome.explanation);
        }
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}
