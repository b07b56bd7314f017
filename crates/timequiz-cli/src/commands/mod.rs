pub mod init;
pub mod list;
pub mod play;
pub mod results;
pub mod reset;
pub mod review;
pub mod validate;

use comfy_table::Table;
use timequiz_core::model::Table as QuestionTable;
use timequiz_core::persistence::Persistence;
use timequiz_store::FileStore;

use crate::Settings;

/// Persistence over the configured data directory.
pub(crate) fn open_persistence(settings: &Settings) -> Persistence<FileStore> {
    Persistence::new(FileStore::new(&settings.data_dir), settings.duration_secs)
}

/// Render a question's data table for the terminal.
pub(crate) fn render_table(table: &QuestionTable) -> Table {
    let mut out = Table::new();
    out.set_header(&table.headers);
    for row in &table.rows {
        out.add_row(row);
    }
    out
}
