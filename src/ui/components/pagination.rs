use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Previous/next controls with the page label and a background-fetch indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationControls {
  /// Zero-based page index
  pub page: u32,
  pub can_go_previous: bool,
  pub can_go_next: bool,
  pub is_fetching: bool,
}

impl PaginationControls {
  pub fn line(&self) -> Line<'static> {
    let mut spans = vec![
      button("◀ Previous", self.can_go_previous),
      Span::styled(
        format!("   Page {}   ", self.page + 1),
        Style::default().fg(Color::White).bold(),
      ),
      button("Next ▶", self.can_go_next),
    ];

    if self.is_fetching {
      spans.push(Span::styled("  Loading...", Style::default().fg(Color::Cyan)));
    }

    Line::from(spans)
  }

  pub fn render(&self, frame: &mut Frame, area: Rect) {
    frame.render_widget(Paragraph::new(self.line()), area);
  }
}

fn button(label: &'static str, enabled: bool) -> Span<'static> {
  let style = if enabled {
    Style::default().fg(Color::Cyan)
  } else {
    Style::default()
      .fg(Color::DarkGray)
      .add_modifier(Modifier::CROSSED_OUT)
  };
  Span::styled(format!("[{}]", label), style)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn text(line: &Line) -> String {
    line.spans.iter().map(|s| s.content.as_ref()).collect()
  }

  #[test]
  fn test_page_label_is_one_based() {
    let controls = PaginationControls {
      page: 0,
      can_go_previous: false,
      can_go_next: true,
      is_fetching: false,
    };
    let line = controls.line();
    assert_eq!(text(&line), "[◀ Previous]   Page 1   [Next ▶]");
  }

  #[test]
  fn test_disabled_buttons_are_dimmed() {
    let controls = PaginationControls {
      page: 3,
      can_go_previous: true,
      can_go_next: false,
      is_fetching: false,
    };
    let line = controls.line();
    assert_eq!(line.spans[0].style.fg, Some(Color::Cyan));
    assert_eq!(line.spans[2].style.fg, Some(Color::DarkGray));
  }

  #[test]
  fn test_fetch_indicator() {
    let controls = PaginationControls {
      page: 1,
      can_go_previous: true,
      can_go_next: false,
      is_fetching: true,
    };
    assert!(text(&controls.line()).ends_with("Loading..."));
  }
}
