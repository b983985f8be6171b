//! TUI screen definitions.
//!
//! Each screen corresponds to a tab in the TUI and owns its own input state.
//! Screens never touch storage: key handling returns an [`Action`] that the
//! session carries out.

mod entries;
mod import;

use std::fmt;

use crossterm::event::{KeyCode, KeyModifiers};
use formfill_core::editor::EntryTable;
use ratatui::prelude::*;

pub(crate) use entries::EntriesScreen;
pub(crate) use import::ImportScreen;

use crate::widgets::Status;

/// Screen identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScreenId {
    Entries,
    Import,
}

impl ScreenId {
    pub(crate) const ALL: [ScreenId; 2] = [ScreenId::Entries, ScreenId::Import];
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entries => write!(f, "Entries"),
            Self::Import => write!(f, "Import CSV"),
        }
    }
}

/// Something a screen asks the session to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Action {
    AddRow,
    SetKey(usize, String),
    SetValue(usize, String),
    RemoveRow(usize),
    Fill,
    Import { path: String, overwrite: bool },
    /// Show a message without touching storage.
    Notify(StatusNote),
}

/// Message a screen can raise on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StatusNote {
    Info(String),
    Error(String),
}

impl From<StatusNote> for Status {
    fn from(note: StatusNote) -> Self {
        match note {
            StatusNote::Info(text) => Status::info(text),
            StatusNote::Error(text) => Status::error(text),
        }
    }
}

/// State for every screen.
pub(crate) struct Screens {
    pub entries: EntriesScreen,
    pub import: ImportScreen,
}

impl Screens {
    pub(crate) fn new(overwrite_default: bool) -> Self {
        Self {
            entries: EntriesScreen::new(),
            import: ImportScreen::new(overwrite_default),
        }
    }

    /// Whether the screen has an active text input field.
    pub(crate) fn is_editing(&self, id: ScreenId) -> bool {
        match id {
            ScreenId::Entries => self.entries.is_editing(),
            ScreenId::Import => self.import.is_editing(),
        }
    }

    pub(crate) fn draw(&self, id: ScreenId, f: &mut Frame, area: Rect, table: &EntryTable) {
        match id {
            ScreenId::Entries => self.entries.draw(f, area, table),
            ScreenId::Import => self.import.draw(f, area),
        }
    }

    pub(crate) fn handle_key(
        &mut self,
        id: ScreenId,
        code: KeyCode,
        modifiers: KeyModifiers,
        table: &EntryTable,
    ) -> Option<Action> {
        match id {
            ScreenId::Entries => self.entries.handle_key(code, modifiers, table),
            ScreenId::Import => self.import.handle_key(code, modifiers),
        }
    }
}
