//! Terminal event handling using crossterm EventStream.
//!
//! Key dispatch is a structured match over (code, modifiers) tuples; the
//! search overlay and the dashboard have separate maps because most keys
//! mean different things depending on whether the overlay is open.

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyModifiers};
use futures::StreamExt;

/// Actions available while the dashboard (search closed) has focus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardAction {
    Quit,
    /// A printable key opens the search overlay seeded with that character.
    /// Non-printable and modifier-only keys never open it.
    OpenSearch(char),
}

/// Actions available while the search overlay is open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchAction {
    /// Close the overlay, clearing input and suggestions.
    Close,
    /// Submit the focused suggestion or the input text.
    Submit,
    /// Move focus forward through the suggestion list, wrapping to the input.
    FocusNext,
    /// Move focus backward, wrapping to the input before the first item.
    FocusPrev,
    Insert(char),
    Backspace,
    Quit,
}

/// Reads terminal events asynchronously using crossterm's EventStream.
pub struct EventHandler {
    stream: EventStream,
}

impl EventHandler {
    pub fn new() -> Self {
        Self {
            stream: EventStream::new(),
        }
    }

    /// Read the next terminal event. Returns None if the stream ends.
    pub async fn next(&mut self) -> Option<Event> {
        self.stream.next().await.and_then(|r| r.ok())
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Map a key event while the search overlay is closed.
pub fn map_dashboard_key(event: &KeyEvent) -> Option<DashboardAction> {
    match (event.code, event.modifiers) {
        (KeyCode::Char('c'), KeyModifiers::CONTROL)
        | (KeyCode::Char('d'), KeyModifiers::CONTROL)
        | (KeyCode::Char('q'), KeyModifiers::CONTROL) => Some(DashboardAction::Quit),
        (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
            Some(DashboardAction::OpenSearch(c))
        }
        _ => None,
    }
}

/// Map a key event while the search overlay is open.
pub fn map_search_key(event: &KeyEvent) -> Option<SearchAction> {
    match (event.code, event.modifiers) {
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Some(SearchAction::Quit),
        (KeyCode::Esc, _) => Some(SearchAction::Close),
        (KeyCode::Enter, _) => Some(SearchAction::Submit),
        (KeyCode::Down, _)
        | (KeyCode::Tab, KeyModifiers::NONE)
        | (KeyCode::Char('n'), KeyModifiers::CONTROL) => Some(SearchAction::FocusNext),
        (KeyCode::Up, _)
        | (KeyCode::BackTab, _)
        | (KeyCode::Tab, KeyModifiers::SHIFT)
        | (KeyCode::Char('p'), KeyModifiers::CONTROL) => Some(SearchAction::FocusPrev),
        (KeyCode::Backspace, _) => Some(SearchAction::Backspace),
        (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
            Some(SearchAction::Insert(c))
        }
        _ => None,
    }
}
