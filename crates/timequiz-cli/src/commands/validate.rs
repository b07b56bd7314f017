//! The `timequiz validate` command.

use anyhow::Result;

use timequiz_core::bank::{load_quiz_directory, parse_quiz_set, validate_quiz_set};

use crate::Settings;

pub fn execute(settings: &Settings) -> Result<()> {
    let sets = if settings.bank.is_dir() {
        load_quiz_directory(&settings.bank)?
    } else {
        vec![parse_quiz_set(&settings.bank)?]
    };

    let mut total_warnings = 0;

    for set in &sets {
        println!("Quiz: {} ({} questions)", set.name, set.questions.len());

        let warnings = validate_quiz_set(set);
        for w in &warnings {
            let prefix = w
                .question_id
                .map(|id| format!("  [{id}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All quizzes valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
