//! The `timequiz review` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use timequiz_core::error::QuizError;
use timequiz_core::review::{OptionMark, QuizReview, ReviewItem};

use crate::Settings;

pub fn execute(settings: &Settings, json: bool) -> Result<()> {
    let mut persistence = super::open_persistence(settings);
    let review = match QuizReview::load(&mut persistence) {
        Ok(review) => review,
        Err(e @ QuizError::MissingNavigationContext) => {
            println!("{e}");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&review)?);
        return Ok(());
    }

    if let Some(summary) = &review.summary {
        super::results::print_score_card(&summary.outcome(), summary.quiz_key.as_deref());
        if let Some(completed_at) = summary.completed_at {
            println!("Completed {}", completed_at.format("%Y-%m-%d %H:%M:%S UTC"));
        }
    }

    if review.items.is_empty() {
        println!("\nNo answers were recorded.");
    }
    for item in &review.items {
        print_item(item);
    }

    Ok(())
}

fn mark_label(mark: OptionMark) -> &'static str {
    match mark {
        OptionMark::SelectedCorrect => "your answer (correct)",
        OptionMark::SelectedWrong => "your answer (wrong)",
        OptionMark::MissedCorrect => "correct answer",
        OptionMark::Neutral => "",
    }
}

fn print_item(item: &ReviewItem) {
    println!("\nQuestion {}: {}", item.number, item.question_text);
    if let Some(table) = &item.table {
        println!("{}", super::render_table(table));
    }

    let mut options = Table::new();
    options.set_header(vec!["#", "Option", ""]);
    for (i, option) in item.options.iter().enumerate() {
        options.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&option.text),
            Cell::new(mark_label(option.mark)),
        ]);
    }
    println!("{options}");

    println!("{}", item.verdict());
    if !item.explanation.is_empty() {
        println!("  {}", item.explanation);
    }
}
