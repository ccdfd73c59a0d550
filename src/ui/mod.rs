pub mod components;
pub mod renderfns;
pub mod view;
pub mod views;

use crate::app::App;
use ratatui::prelude::*;
use ratatui::widgets::ListState;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &mut App) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // Header
      Constraint::Min(1),    // Main content
    ])
    .split(frame.area());

  let context = app.view().context_label();
  let shortcuts = app.view().shortcuts();
  renderfns::draw_header(frame, chunks[0], app.origin(), &context, &shortcuts);

  app.view_mut().render(frame, chunks[1]);
}

/// Keep a list selection inside `0..len`, selecting the first row when nothing is selected
pub fn ensure_valid_selection(state: &mut ListState, len: usize) {
  if len == 0 {
    state.select(None);
    return;
  }
  match state.selected() {
    Some(i) if i >= len => state.select(Some(len - 1)),
    None => state.select(Some(0)),
    _ => {}
  }
}

/// Rows of a rendered buffer as plain text
#[cfg(test)]
pub fn buffer_lines(buffer: &Buffer) -> Vec<String> {
  let width = buffer.area.width.max(1) as usize;
  buffer
    .content()
    .chunks(width)
    .map(|row| row.iter().map(|cell| cell.symbol()).collect())
    .collect()
}
