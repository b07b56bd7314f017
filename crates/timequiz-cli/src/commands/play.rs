//! The `timequiz play` command: the interactive quiz loop.

use std::io::{BufRead, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc;

use timequiz_core::bank::load_bank;
use timequiz_core::error::QuizError;
use timequiz_core::model::QuizOutcome;
use timequiz_core::session::{QuizSession, SessionConfig};
use timequiz_core::traits::{Clock, KvStore, QuestionBank};
use timequiz_store::FileStore;

use crate::clock::IntervalClock;
use crate::Settings;

const HELP: &str = "Enter an option number, 't' for time left, 'c' to cancel, 'q' to quit and resume later.";

/// What the loop does after handling one line of input.
enum Step {
    Continue,
    Stop,
}

pub async fn execute(settings: &Settings, quiz: Option<String>) -> Result<()> {
    let bank = load_bank(&settings.bank)
        .with_context(|| format!("failed to load quizzes from {}", settings.bank.display()))?;
    let bank: Arc<dyn QuestionBank> = Arc::new(bank);

    let (clock, mut ticks) = IntervalClock::new();
    let config = SessionConfig {
        duration_secs: settings.duration_secs,
    };
    let mut session = QuizSession::new(
        Arc::clone(&bank),
        FileStore::new(&settings.data_dir),
        clock,
        config,
    );

    if session.restore() {
        println!(
            "Resuming '{}' at question {} of {}.",
            session.quiz_name().unwrap_or_default(),
            session.question_number(),
            session.total_questions()
        );
        if let Some(requested) = quiz.as_deref().filter(|k| Some(*k) != session.quiz_key()) {
            println!("(Run `timequiz reset` first to start '{requested}' instead.)");
        }
    } else {
        let Some(key) = quiz else {
            anyhow::bail!(
                "no quiz to resume; choose one with --quiz (available: {})",
                bank.quiz_keys().join(", ")
            );
        };
        session.start(&key)?;
        println!(
            "Starting '{}': {} questions, {} on the clock.",
            session.quiz_name().unwrap_or_default(),
            session.total_questions(),
            session.formatted_time_remaining()
        );
    }
    println!("{HELP}");

    let mut lines = spawn_stdin_reader();
    let mut confirming_cancel = false;
    print_question(&session);

    loop {
        tokio::select! {
            Some(()) = ticks.recv() => {
                if let Some(outcome) = session.tick() {
                    println!("\nTime is up!");
                    print_outcome(&session, &outcome);
                    break;
                }
            }
            line = lines.recv() => {
                let Some(line) = line else {
                    println!("\nProgress saved. Run `timequiz play` to resume.");
                    break;
                };
                let step = if confirming_cancel {
                    confirming_cancel = false;
                    confirm_cancel(&mut session, line.trim())
                } else {
                    handle_input(&mut session, line.trim(), &mut confirming_cancel)?
                };
                if let Step::Stop = step {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Read stdin lines on a plain thread; a read blocked there must not delay
/// runtime shutdown.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn handle_input<S: KvStore, C: Clock>(
    session: &mut QuizSession<S, C>,
    input: &str,
    confirming_cancel: &mut bool,
) -> Result<Step> {
    match input {
        "" => {}
        "q" | "quit" => {
            session.pause();
            println!("Progress saved. Run `timequiz play` to resume.");
            return Ok(Step::Stop);
        }
        "t" | "time" => println!("Time left: {}", session.formatted_time_remaining()),
        "c" | "cancel" => {
            session.pause();
            *confirming_cancel = true;
            println!("Cancel this quiz? All progress will be lost. [y/N]");
        }
        "h" | "help" | "?" => println!("{HELP}"),
        _ => return submit(session, input),
    }
    Ok(Step::Continue)
}

fn confirm_cancel<S: KvStore, C: Clock>(session: &mut QuizSession<S, C>, input: &str) -> Step {
    if input.eq_ignore_ascii_case("y") || input.eq_ignore_ascii_case("yes") {
        session.cancel();
        println!("Quiz cancelled.");
        return Step::Stop;
    }
    session.resume();
    println!("Resuming quiz.");
    print_question(session);
    Step::Continue
}

fn submit<S: KvStore, C: Clock>(session: &mut QuizSession<S, C>, input: &str) -> Result<Step> {
    let Some(question) = session.current_question() else {
        return Err(QuizError::NotInProgress.into());
    };
    let count = question.answers.len();
    let selected = if count == 0 {
        // option-less question: record the input, graded incorrect
        input.to_string()
    } else {
        let choice = input
            .parse::<usize>()
            .ok()
            .filter(|n| (1..=count).contains(n));
        let Some(choice) = choice else {
            println!("Please enter a number between 1 and {count}.");
            return Ok(Step::Continue);
        };
        question.answers[choice - 1].clone()
    };

    let answered = match session.submit_answer(&selected) {
        Ok(answered) => answered,
        Err(QuizError::EmptySelection) => {
            println!("That option is blank; pick another.");
            return Ok(Step::Continue);
        }
        Err(e) => return Err(e.into()),
    };

    if let Some(outcome) = answered.outcome {
        println!("\nQuiz complete!");
        print_outcome(session, &outcome);
        return Ok(Step::Stop);
    }

    print_question(session);
    Ok(Step::Continue)
}

fn print_question<S: KvStore, C: Clock>(session: &QuizSession<S, C>) {
    let Some(question) = session.current_question() else {
        return;
    };

    println!(
        "\nQuestion {} of {}  [{} left]",
        session.question_number(),
        session.total_questions(),
        session.formatted_time_remaining()
    );
    println!("{}", question.prompt);
    if let Some(table) = &question.table {
        println!("{}", super::render_table(table));
    }
    for (i, answer) in question.answers.iter().enumerate() {
        println!("  {}. {answer}", i + 1);
    }
    if question.answers.is_empty() {
        println!("  (this question has no options; enter anything to move on)");
    }
    print!("> ");
    let _ = std::io::stdout().flush();
}

fn print_outcome<S: KvStore, C: Clock>(session: &QuizSession<S, C>, outcome: &QuizOutcome) {
    super::results::print_score_card(outcome, session.quiz_name().as_deref());
    println!("Run `timequiz review` to see each answer.");
}
