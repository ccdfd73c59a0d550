use crate::query::EntryStatus;
use ratatui::prelude::Color;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// Display color for a cache entry status
pub fn entry_status_color(status: EntryStatus) -> Color {
  match status {
    EntryStatus::Fresh => Color::Green,
    EntryStatus::Stale => Color::Yellow,
    EntryStatus::Fetching => Color::Cyan,
    EntryStatus::Error => Color::Red,
    EntryStatus::Idle => Color::DarkGray,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_truncate_short_string() {
    assert_eq!(truncate("hello", 10), "hello");
  }

  #[test]
  fn test_truncate_exact_length() {
    assert_eq!(truncate("hello", 5), "hello");
  }

  #[test]
  fn test_truncate_long_string() {
    assert_eq!(truncate("hello world", 8), "hello...");
  }

  #[test]
  fn test_truncate_multibyte() {
    assert_eq!(truncate("프로젝트 목록입니다", 6), "프로젝...");
  }

  #[test]
  fn test_entry_status_color() {
    assert_eq!(entry_status_color(EntryStatus::Fresh), Color::Green);
    assert_eq!(entry_status_color(EntryStatus::Stale), Color::Yellow);
    assert_eq!(entry_status_color(EntryStatus::Error), Color::Red);
  }
}
