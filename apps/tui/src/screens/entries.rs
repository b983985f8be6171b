//! "Entries" screen: the editable key/value table.

use crossterm::event::{KeyCode, KeyModifiers};
use formfill_core::editor::EntryTable;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};

use super::Action;

/// Which column of the selected row is focused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Key,
    Value,
}

pub(crate) struct EntriesScreen {
    selected: usize,
    column: Column,
    /// Edit buffer for the focused cell while editing.
    editing: Option<String>,
}

impl EntriesScreen {
    pub(crate) fn new() -> Self {
        Self {
            selected: 0,
            column: Column::Key,
            editing: None,
        }
    }

    pub(crate) fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    /// Focus the key cell of `row`.
    pub(crate) fn select(&mut self, row: usize) {
        self.selected = row;
        self.column = Column::Key;
    }

    /// Keep the selection inside a table of `len` rows.
    pub(crate) fn clamp(&mut self, len: usize) {
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    pub(crate) fn draw(&self, f: &mut Frame, area: Rect, table: &EntryTable) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Min(1),    // Table
                Constraint::Length(1), // Hint
            ])
            .split(area);

        let focused = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
        let editing = Style::default().fg(Color::Yellow);

        let rows: Vec<Row> = table
            .rows()
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let cell = |column: Column, text: &str| {
                    if i != self.selected || column != self.column {
                        return Cell::from(text.to_string());
                    }
                    match &self.editing {
                        Some(buffer) => Cell::from(format!("{buffer}▏")).style(editing),
                        None => Cell::from(text.to_string()).style(focused),
                    }
                };
                let key = if row.is_blank() && i != self.selected {
                    Cell::from("(empty)").style(Style::default().fg(Color::DarkGray))
                } else {
                    cell(Column::Key, &row.key)
                };
                Row::new(vec![key, cell(Column::Value, &row.value)])
            })
            .collect();

        let saved = table.to_form_data().len();
        let widget = Table::new(rows, [Constraint::Percentage(35), Constraint::Percentage(65)])
            .header(
                Row::new(vec!["Key", "Value"])
                    .style(Style::default().add_modifier(Modifier::BOLD))
                    .bottom_margin(1),
            )
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" Form Data ({saved}) ")),
            );
        f.render_widget(widget, chunks[0]);

        let hint = if self.is_editing() {
            "Type to edit · Enter to save · Tab to save and switch column · Esc to cancel"
        } else {
            "Enter edit · ←/→ column · a add · d delete · f fill page"
        };
        let hint_p = Paragraph::new(hint)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        f.render_widget(hint_p, chunks[1]);
    }

    pub(crate) fn handle_key(
        &mut self,
        code: KeyCode,
        _modifiers: KeyModifiers,
        table: &EntryTable,
    ) -> Option<Action> {
        if let Some(buffer) = self.editing.as_mut() {
            match code {
                KeyCode::Esc => self.editing = None,
                KeyCode::Enter => return self.commit(),
                KeyCode::Tab => {
                    let action = self.commit();
                    self.toggle_column();
                    return action;
                }
                KeyCode::Backspace => {
                    buffer.pop();
                }
                KeyCode::Char(c) => buffer.push(c),
                _ => {}
            }
            return None;
        }

        match code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < table.len() {
                    self.selected += 1;
                }
            }
            KeyCode::Left | KeyCode::Right | KeyCode::Char('h') | KeyCode::Char('l') => {
                self.toggle_column();
            }
            KeyCode::Enter => {
                let row = table.rows().get(self.selected)?;
                let current = match self.column {
                    Column::Key => &row.key,
                    Column::Value => &row.value,
                };
                self.editing = Some(current.clone());
            }
            KeyCode::Char('a') => return Some(Action::AddRow),
            KeyCode::Char('d') | KeyCode::Delete if self.selected < table.len() => {
                return Some(Action::RemoveRow(self.selected));
            }
            KeyCode::Char('f') => return Some(Action::Fill),
            _ => {}
        }
        None
    }

    fn commit(&mut self) -> Option<Action> {
        let buffer = self.editing.take()?;
        Some(match self.column {
            Column::Key => Action::SetKey(self.selected, buffer),
            Column::Value => Action::SetValue(self.selected, buffer),
        })
    }

    fn toggle_column(&mut self) {
        self.column = match self.column {
            Column::Key => Column::Value,
            Column::Value => Column::Key,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formfill_shared::FormData;
    use ratatui::backend::TestBackend;

    fn table() -> EntryTable {
        let data: FormData = [("Name", "Ayse"), ("City", "Ankara")].into_iter().collect();
        EntryTable::from_form_data(&data)
    }

    fn press(screen: &mut EntriesScreen, table: &EntryTable, code: KeyCode) -> Option<Action> {
        screen.handle_key(code, KeyModifiers::NONE, table)
    }

    #[test]
    fn edit_value_and_commit() {
        let table = table();
        let mut screen = EntriesScreen::new();

        press(&mut screen, &table, KeyCode::Down);
        press(&mut screen, &table, KeyCode::Right);
        press(&mut screen, &table, KeyCode::Enter);
        assert!(screen.is_editing());
        assert_eq!(screen.editing.as_deref(), Some("Ankara"));

        for _ in 0.."Ankara".len() {
            press(&mut screen, &table, KeyCode::Backspace);
        }
        for c in "Izmir".chars() {
            press(&mut screen, &table, KeyCode::Char(c));
        }
        let action = press(&mut screen, &table, KeyCode::Enter);
        assert_eq!(action, Some(Action::SetValue(1, "Izmir".into())));
        assert!(!screen.is_editing());
    }

    #[test]
    fn tab_commits_and_moves_to_value() {
        let table = table();
        let mut screen = EntriesScreen::new();

        press(&mut screen, &table, KeyCode::Enter);
        press(&mut screen, &table, KeyCode::Char('!'));
        let action = press(&mut screen, &table, KeyCode::Tab);
        assert_eq!(action, Some(Action::SetKey(0, "Name!".into())));
        assert_eq!(screen.column, Column::Value);
    }

    #[test]
    fn escape_discards_edit() {
        let table = table();
        let mut screen = EntriesScreen::new();
        press(&mut screen, &table, KeyCode::Enter);
        press(&mut screen, &table, KeyCode::Char('x'));
        assert_eq!(press(&mut screen, &table, KeyCode::Esc), None);
        assert!(!screen.is_editing());
    }

    #[test]
    fn selection_stays_in_bounds() {
        let table = table();
        let mut screen = EntriesScreen::new();
        for _ in 0..5 {
            press(&mut screen, &table, KeyCode::Down);
        }
        assert_eq!(screen.selected, 1);
        assert_eq!(
            press(&mut screen, &table, KeyCode::Char('d')),
            Some(Action::RemoveRow(1))
        );

        screen.clamp(1);
        assert_eq!(screen.selected, 0);
        screen.clamp(0);
        assert_eq!(screen.selected, 0);
    }

    #[test]
    fn add_and_fill_keys() {
        let table = table();
        let mut screen = EntriesScreen::new();
        assert_eq!(press(&mut screen, &table, KeyCode::Char('a')), Some(Action::AddRow));
        assert_eq!(press(&mut screen, &table, KeyCode::Char('f')), Some(Action::Fill));
    }

    #[test]
    fn draws_rows() {
        let table = table();
        let screen = EntriesScreen::new();
        let mut terminal = Terminal::new(TestBackend::new(60, 10)).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                screen.draw(f, area, &table);
            })
            .unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(text.contains("Form Data (2)"));
        assert!(text.contains("Ankara"));
    }
}
