//! The `timequiz results` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use timequiz_core::error::QuizError;
use timequiz_core::model::QuizOutcome;
use timequiz_core::scoring::{ScoreResult, MAX_SCORE};

use crate::Settings;

pub fn execute(
    settings: &Settings,
    counts: Option<(u32, u32, u32)>,
    timed_out: bool,
    json: bool,
) -> Result<()> {
    let (outcome, quiz_key) = match counts {
        Some((correct, incorrect, total)) => {
            let answered = correct.saturating_add(incorrect);
            anyhow::ensure!(
                answered <= total,
                "correct + incorrect ({answered}) exceeds total ({total})"
            );
            let outcome = QuizOutcome {
                correct,
                incorrect,
                total,
                timed_out,
            };
            (outcome, None)
        }
        None => {
            let mut persistence = super::open_persistence(settings);
            match persistence.load_summary() {
                Some(summary) => (summary.outcome(), summary.quiz_key),
                None => {
                    println!("{}", QuizError::MissingNavigationContext);
                    return Ok(());
                }
            }
        }
    };

    if json {
        let score = ScoreResult::compute(outcome.correct, outcome.incorrect, outcome.total);
        let value = serde_json::json!({
            "quiz": quiz_key,
            "outcome": outcome,
            "score": score,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        print_score_card(&outcome, quiz_key.as_deref());
    }
    Ok(())
}

/// Print the score table and feedback line for a finished quiz.
pub fn print_score_card(outcome: &QuizOutcome, quiz: Option<&str>) {
    let score = ScoreResult::compute(outcome.correct, outcome.incorrect, outcome.total);
    let unanswered = outcome
        .total
        .saturating_sub(outcome.correct.saturating_add(outcome.incorrect));

    let mut table = Table::new();
    if let Some(quiz) = quiz {
        table.add_row(vec![Cell::new("Quiz"), Cell::new(quiz)]);
    }
    table.add_row(vec![Cell::new("Correct"), Cell::new(outcome.correct)]);
    table.add_row(vec![Cell::new("Incorrect"), Cell::new(outcome.incorrect)]);
    table.add_row(vec![Cell::new("Unanswered"), Cell::new(unanswered)]);
    table.add_row(vec![
        Cell::new("Score"),
        Cell::new(format!("{:.1} / {MAX_SCORE:.0}", score.final_score)),
    ]);
    table.add_row(vec![
        Cell::new("Progress"),
        Cell::new(format!("{:.0}%", score.progress_percent)),
    ]);
    if outcome.timed_out {
        table.add_row(vec![Cell::new("Status"), Cell::new("Time ran out")]);
    }

    println!("{table}");
    println!("{}", score.tier.message());
}
