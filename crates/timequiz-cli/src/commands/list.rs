//! The `timequiz list` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use timequiz_core::bank::load_bank;

use crate::Settings;

pub fn execute(settings: &Settings) -> Result<()> {
    let bank = load_bank(&settings.bank)?;

    if bank.is_empty() {
        println!("No quizzes found in {}", settings.bank.display());
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Key", "Name", "Questions", "Description"]);
    for set in bank.iter() {
        table.add_row(vec![
            Cell::new(&set.key),
            Cell::new(&set.name),
            Cell::new(set.questions.len()),
            Cell::new(&set.description),
        ]);
    }

    println!("{table}");
    Ok(())
}
