//! Storage side of the TUI: the editor, the config, and a runtime to drive
//! them from the synchronous event loop.

use std::path::Path;

use color_eyre::eyre::Result;
use formfill_core::editor::{Editor, EntryTable};
use formfill_core::fill::{LocalPageChannel, fill_after_save};
use formfill_core::import::import_csv_file;
use formfill_shared::{AppConfig, FormData, expand_home};
use formfill_storage::Storage;
use tokio::runtime::{Builder, Runtime};
use tracing::{info, warn};

use crate::screens::Action;
use crate::widgets::Status;

pub(crate) struct Session {
    runtime: Runtime,
    editor: Editor<Storage>,
    config: AppConfig,
}

impl Session {
    /// Open the configured database and load the stored entries.
    pub(crate) fn open(config: AppConfig) -> Result<Self> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        let path = config.db_path()?;
        let editor = runtime.block_on(async {
            let storage = Storage::open(&path).await?;
            Editor::open(storage).await
        })?;
        info!(db = %path.display(), rows = editor.table().len(), "session opened");
        Ok(Self {
            runtime,
            editor,
            config,
        })
    }

    pub(crate) fn config(&self) -> &AppConfig {
        &self.config
    }

    pub(crate) fn table(&self) -> &EntryTable {
        self.editor.table()
    }

    /// Carry out `action`. Returns the message to show, if any.
    pub(crate) fn apply(&mut self, action: Action) -> Option<Status> {
        match action {
            Action::AddRow => {
                self.editor.add_row();
                let result = self.runtime.block_on(self.editor.save());
                Some(self.after_save(result, "Row added"))
            }
            Action::SetKey(row, key) => {
                let result = self.runtime.block_on(self.editor.set_key(row, key));
                Some(self.after_save(result, "Saved"))
            }
            Action::SetValue(row, value) => {
                let result = self.runtime.block_on(self.editor.set_value(row, value));
                Some(self.after_save(result, "Saved"))
            }
            Action::RemoveRow(row) => {
                let result = self.runtime.block_on(self.editor.remove_row(row));
                Some(self.after_save(result, "Entry removed"))
            }
            Action::Import { path, overwrite } => Some(self.import(&path, overwrite)),
            Action::Fill => Some(self.fill()),
            Action::Notify(note) => Some(note.into()),
        }
    }

    fn after_save(&mut self, result: formfill_shared::Result<FormData>, done: &str) -> Status {
        match result {
            Ok(data) => {
                self.runtime
                    .block_on(fill_after_save(self.editor.store(), &self.config.fill));
                Status::success(format!("{done} ({} entries)", data.len()))
            }
            Err(e) => {
                warn!(error = %e, "save failed");
                Status::error(format!("Save failed: {e}"))
            }
        }
    }

    fn import(&mut self, path: &str, overwrite: bool) -> Status {
        let outcome = self.runtime.block_on(import_csv_file(
            self.editor.store(),
            Path::new(path),
            overwrite,
        ));
        if !outcome.success {
            return Status::error(outcome.message);
        }

        if let Err(e) = self.runtime.block_on(self.editor.reload()) {
            warn!(error = %e, "reload after import failed");
            return Status::error(format!("Imported, but reloading failed: {e}"));
        }
        self.runtime
            .block_on(fill_after_save(self.editor.store(), &self.config.fill));
        Status::success(outcome.message)
    }

    fn fill(&mut self) -> Status {
        let Some(page) = self.config.fill.page.as_deref() else {
            return Status::error("No form page configured (set [fill] page in formfill.toml)");
        };
        let page = match expand_home(page) {
            Ok(page) => page,
            Err(e) => return Status::error(e.to_string()),
        };

        let channel = LocalPageChannel::new(page, self.editor.store(), self.config.fill.date_order);
        match self.runtime.block_on(channel.fill()) {
            Ok(report) => Status::success(report.status()),
            Err(e) => {
                warn!(error = %e, "page fill failed");
                Status::error(format!("Communication error: {e}"))
            }
        }
    }
}
