use crate::api::ProjectPage;
use crate::query::EntrySnapshot;
use crate::ui::renderfns::entry_status_color;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};

/// Cache inspector panel listing every page entry
pub fn draw_devtools(
  frame: &mut Frame,
  area: Rect,
  entries: &[EntrySnapshot<'_, u32, ProjectPage>],
  current_page: u32,
) {
  let block = Block::default()
    .title(format!(" Cache ({}) ", entries.len()))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  if entries.is_empty() {
    let paragraph = Paragraph::new("No queries yet.")
      .block(block)
      .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, area);
    return;
  }

  let items: Vec<ListItem> = entries
    .iter()
    .map(|entry| ListItem::new(entry_line(entry, *entry.key == current_page)))
    .collect();

  frame.render_widget(List::new(items).block(block), area);
}

fn entry_line(entry: &EntrySnapshot<'_, u32, ProjectPage>, is_current: bool) -> Line<'static> {
  let marker = if is_current { "▶ " } else { "  " };
  let items = entry
    .data
    .map(|page| format!("{:>3} items", page.projects.len()))
    .unwrap_or_else(|| "        -".to_string());
  let updated = entry
    .updated_at
    .map(|t| t.format("%H:%M:%S").to_string())
    .unwrap_or_else(|| "--:--:--".to_string());

  Line::from(vec![
    Span::styled(marker, Style::default().fg(Color::Yellow)),
    Span::styled(
      format!("page {:<4}", entry.key + 1),
      Style::default().fg(Color::White),
    ),
    Span::styled(
      format!("{:<9}", entry.status.label()),
      Style::default().fg(entry_status_color(entry.status)),
    ),
    Span::raw(items),
    Span::styled(
      format!("  {}  x{}", updated, entry.fetch_count),
      Style::default().fg(Color::DarkGray),
    ),
  ])
}
