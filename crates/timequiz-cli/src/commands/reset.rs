//! The `timequiz reset` command.

use anyhow::{Context, Result};

use crate::Settings;

pub fn execute(settings: &Settings) -> Result<()> {
    let mut persistence = super::open_persistence(settings);
    persistence
        .clear_all()
        .with_context(|| format!("failed to clear {}", settings.data_dir.display()))?;
    println!("Cleared saved progress and results.");
    Ok(())
}
