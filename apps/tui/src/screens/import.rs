//! "Import CSV" screen: file path, overwrite toggle, and import action.

use std::path::Path;

use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use super::{Action, StatusNote};

pub(crate) const NO_FILE_MESSAGE: &str = "Please select a CSV file first";

pub(crate) struct ImportScreen {
    path: String,
    editing: bool,
    overwrite: bool,
}

impl ImportScreen {
    pub(crate) fn new(overwrite: bool) -> Self {
        Self {
            path: String::new(),
            editing: false,
            overwrite,
        }
    }

    pub(crate) fn is_editing(&self) -> bool {
        self.editing
    }

    /// Hint naming the chosen file, once a path has been entered.
    fn selected_hint(&self) -> Option<String> {
        let path = self.path.trim();
        if path.is_empty() {
            return None;
        }
        let name = Path::new(path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string());
        Some(format!("File \"{name}\" selected. Press i to import."))
    }

    pub(crate) fn draw(&self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(3), // Path
                Constraint::Length(1), // Selected file
                Constraint::Length(3), // Options
                Constraint::Length(3), // Action hint
                Constraint::Min(1),
            ])
            .split(area);

        let path_style = if self.editing {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::Cyan)
        };
        let path_block = Block::default()
            .borders(Borders::ALL)
            .title(" CSV file ")
            .border_style(path_style);
        let path_text = Paragraph::new(self.path.as_str()).block(path_block);
        f.render_widget(path_text, chunks[0]);

        if let Some(hint) = self.selected_hint() {
            let hint = Paragraph::new(hint).style(Style::default().fg(Color::Green));
            f.render_widget(hint, chunks[1]);
        }

        let marker = if self.overwrite { "✓" } else { " " };
        let opts = Paragraph::new(format!(
            "[{marker}] Overwrite existing entries (o)"
        ))
        .block(Block::default().borders(Borders::ALL).title(" Options "));
        f.render_widget(opts, chunks[2]);

        let hint = if self.editing {
            "Type the file path · Enter or Esc to finish"
        } else {
            "Enter to edit path · o toggle overwrite · i import"
        };
        let hint_p = Paragraph::new(hint)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        f.render_widget(hint_p, chunks[3]);
    }

    pub(crate) fn handle_key(&mut self, code: KeyCode, _modifiers: KeyModifiers) -> Option<Action> {
        if self.editing {
            match code {
                KeyCode::Esc | KeyCode::Enter => {
                    self.editing = false;
                    return self.selected_hint().map(|hint| Action::Notify(StatusNote::Info(hint)));
                }
                KeyCode::Backspace => {
                    self.path.pop();
                }
                KeyCode::Char(c) => self.path.push(c),
                _ => {}
            }
            return None;
        }

        match code {
            KeyCode::Enter => self.editing = true,
            KeyCode::Char('o') => self.overwrite = !self.overwrite,
            KeyCode::Char('i') => {
                let path = self.path.trim();
                if path.is_empty() {
                    return Some(Action::Notify(StatusNote::Error(NO_FILE_MESSAGE.into())));
                }
                return Some(Action::Import {
                    path: path.to_string(),
                    overwrite: self.overwrite,
                });
            }
            _ => {}
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(screen: &mut ImportScreen, code: KeyCode) -> Option<Action> {
        screen.handle_key(code, KeyModifiers::NONE)
    }

    #[test]
    fn import_without_file_asks_for_one() {
        let mut screen = ImportScreen::new(false);
        assert_eq!(
            press(&mut screen, KeyCode::Char('i')),
            Some(Action::Notify(StatusNote::Error(NO_FILE_MESSAGE.into())))
        );
    }

    #[test]
    fn entering_a_path_shows_selected_file() {
        let mut screen = ImportScreen::new(false);
        press(&mut screen, KeyCode::Enter);
        for c in "/tmp/contacts.csv".chars() {
            press(&mut screen, KeyCode::Char(c));
        }
        let note = press(&mut screen, KeyCode::Enter);
        assert_eq!(
            note,
            Some(Action::Notify(StatusNote::Info(
                "File \"contacts.csv\" selected. Press i to import.".into()
            )))
        );
        assert!(!screen.is_editing());
    }

    #[test]
    fn import_carries_path_and_overwrite_choice() {
        let mut screen = ImportScreen::new(true);
        screen.path = " data.csv ".into();
        press(&mut screen, KeyCode::Char('o'));
        assert_eq!(
            press(&mut screen, KeyCode::Char('i')),
            Some(Action::Import {
                path: "data.csv".into(),
                overwrite: false,
            })
        );
    }
}
