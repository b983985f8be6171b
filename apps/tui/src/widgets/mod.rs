//! Reusable TUI widgets.

use std::time::{Duration, Instant};

use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Tone of a status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StatusKind {
    Info,
    Success,
    Error,
}

/// A transient message for the status bar.
#[derive(Debug, Clone)]
pub(crate) struct Status {
    pub text: String,
    pub kind: StatusKind,
    shown_at: Instant,
}

impl Status {
    pub(crate) fn new(kind: StatusKind, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind,
            shown_at: Instant::now(),
        }
    }

    pub(crate) fn info(text: impl Into<String>) -> Self {
        Self::new(StatusKind::Info, text)
    }

    pub(crate) fn success(text: impl Into<String>) -> Self {
        Self::new(StatusKind::Success, text)
    }

    pub(crate) fn error(text: impl Into<String>) -> Self {
        Self::new(StatusKind::Error, text)
    }

    /// Whether the message has been on screen for at least `timeout`.
    pub(crate) fn is_expired(&self, now: Instant, timeout: Duration) -> bool {
        now.saturating_duration_since(self.shown_at) >= timeout
    }
}

/// Bottom status bar.
pub(crate) fn status_bar(msg: &str, kind: StatusKind) -> Paragraph<'_> {
    let fg = match kind {
        StatusKind::Info => Color::White,
        StatusKind::Success => Color::Green,
        StatusKind::Error => Color::LightRed,
    };
    Paragraph::new(format!(" {msg}")).style(Style::default().bg(Color::DarkGray).fg(fg))
}
