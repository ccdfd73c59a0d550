use crate::api::ProjectPage;
use crate::config::QueryConfig;
use crate::query::{QueryClient, QueryObserver, QueryState};
use crate::ui::components::{draw_devtools, PaginationControls};
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::truncate;
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use tracing::{debug, info};

/// One page of projects with pagination controls.
///
/// Pages are cached per index. Whenever the current page is known to have a
/// successor, that page is prefetched in the background.
pub struct ProjectsView {
  client: QueryClient<u32, ProjectPage>,
  observer: QueryObserver<u32>,
  page: u32,
  list_state: ListState,
  devtools_open: bool,
  refetch_on_focus: bool,
}

impl ProjectsView {
  pub fn new(client: QueryClient<u32, ProjectPage>, options: &QueryConfig, devtools_open: bool) -> Self {
    let mut view = Self {
      client,
      observer: QueryObserver::new(0, options.keep_previous_data),
      page: 0,
      list_state: ListState::default(),
      devtools_open,
      refetch_on_focus: options.refetch_on_focus,
    };

    // Start fetching immediately
    view.observer.mount(&mut view.client);
    view.prefetch_next();
    view
  }

  /// Zero-based index of the page being shown
  pub fn page(&self) -> u32 {
    self.page
  }

  pub fn state(&self) -> QueryState<&ProjectPage> {
    self.observer.result(&self.client)
  }

  pub fn can_go_previous(&self) -> bool {
    self.page > 0
  }

  /// Only the current page's own result may unlock the next page, never
  /// data carried over from the page before.
  pub fn can_go_next(&self) -> bool {
    let state = self.state();
    !state.is_previous_data() && state.data().is_some_and(|page| page.has_more)
  }

  pub fn go_to_previous_page(&mut self) {
    if !self.can_go_previous() {
      return;
    }
    self.page -= 1;
    self.show_current_page();
  }

  pub fn go_to_next_page(&mut self) {
    if !self.can_go_next() {
      return;
    }
    self.page += 1;
    self.show_current_page();
  }

  /// Fetch the current page again even if it is fresh.
  pub fn refetch(&mut self) -> bool {
    info!(page = self.page, "manual refetch");
    self.client.refetch(self.page)
  }

  pub fn toggle_devtools(&mut self) {
    self.devtools_open = !self.devtools_open;
  }

  #[cfg(test)]
  pub fn client(&self) -> &QueryClient<u32, ProjectPage> {
    &self.client
  }

  fn show_current_page(&mut self) {
    info!(page = self.page, "showing page");
    self.observer.set_key(self.page, &mut self.client);
    self.list_state.select(None);
    self.prefetch_next();
  }

  /// Warm the cache for the following page if the current one says it exists.
  fn prefetch_next(&mut self) -> bool {
    if !self.can_go_next() {
      return false;
    }

    let started = self.client.prefetch_query(self.page + 1);
    if started {
      debug!(page = self.page + 1, "prefetching");
    }
    started
  }

  fn render_list(&mut self, frame: &mut Frame, area: Rect) {
    let state = self.observer.result(&self.client);

    let title = match &state {
      QueryState::Success {
        is_previous_data: true,
        ..
      } => " Projects (previous page) ".to_string(),
      QueryState::Success { data, .. } => format!(" Projects ({}) ", data.projects.len()),
      _ => " Projects ".to_string(),
    };

    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let (data, is_previous_data) = match state {
      QueryState::Loading => {
        let paragraph = Paragraph::new("Loading...")
          .block(block)
          .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(paragraph, area);
        return;
      }
      QueryState::Error(e) => {
        let paragraph = Paragraph::new(format!("Error: {}", e))
          .block(block)
          .style(Style::default().fg(Color::Red));
        frame.render_widget(paragraph, area);
        return;
      }
      QueryState::Success {
        data,
        is_previous_data,
        ..
      } => (data, is_previous_data),
    };

    if data.projects.is_empty() {
      let paragraph = Paragraph::new("No projects on this page.")
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    ensure_valid_selection(&mut self.list_state, data.projects.len());

    // Carried-over data is dimmed until the new page arrives
    let name_style = if is_previous_data {
      Style::default().fg(Color::DarkGray)
    } else {
      Style::default().fg(Color::White)
    };

    let name_width = (area.width as usize).saturating_sub(14).max(8);
    let items: Vec<ListItem> = data
      .projects
      .iter()
      .map(|project| {
        let line = Line::from(vec![
          Span::styled(
            format!("{:>6}", truncate(&project.id.to_string(), 6)),
            Style::default().fg(Color::DarkGray),
          ),
          Span::raw("  "),
          Span::styled(truncate(&project.name, name_width), name_style),
        ]);
        ListItem::new(line)
      })
      .collect();

    let list = List::new(items)
      .block(block)
      .highlight_style(
        Style::default()
          .bg(Color::DarkGray)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut self.list_state);
  }
}

impl View for ProjectsView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('p') => self.go_to_previous_page(),
      KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('n') => self.go_to_next_page(),
      KeyCode::Char('j') | KeyCode::Down => self.list_state.select_next(),
      KeyCode::Char('k') | KeyCode::Up => self.list_state.select_previous(),
      KeyCode::Char('r') => {
        self.refetch();
      }
      KeyCode::Char('d') => self.toggle_devtools(),
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Quit,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let (main_area, devtools_area) = if self.devtools_open {
      let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);
      (columns[0], Some(columns[1]))
    } else {
      (area, None)
    };

    let rows = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Min(1),    // Project list
        Constraint::Length(1), // Pagination controls
      ])
      .split(main_area);

    self.render_list(frame, rows[0]);

    let controls = PaginationControls {
      page: self.page,
      can_go_previous: self.can_go_previous(),
      can_go_next: self.can_go_next(),
      is_fetching: self.client.is_fetching(&self.page),
    };
    controls.render(frame, rows[1]);

    if let Some(area) = devtools_area {
      draw_devtools(frame, area, &self.client.snapshot(), self.page);
    }
  }

  fn context_label(&self) -> String {
    format!("page {}", self.page() + 1)
  }

  fn tick(&mut self) {
    let settled = self.client.poll();
    if settled.contains(&self.page) {
      self.prefetch_next();
    }
  }

  fn focus_gained(&mut self) {
    if self.refetch_on_focus && self.client.is_stale(&self.page) {
      debug!(page = self.page, "refetching stale page on focus");
      self.client.fetch_query(self.page);
    }
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("←", "prev").with_priority(10),
      ShortcutInfo::new("→", "next").with_priority(20),
      ShortcutInfo::new("r", "refetch").with_priority(30),
      ShortcutInfo::new("d", "devtools").with_priority(40),
      ShortcutInfo::new("q", "quit").with_priority(200),
    ]
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::types::{Project, ProjectId};
  use crate::ui::buffer_lines;
  use crossterm::event::KeyModifiers;
  use ratatui::backend::TestBackend;
  use std::sync::{Arc, Mutex};
  use std::time::Duration;

  fn fixture(page: u32) -> ProjectPage {
    let project = |id: u64, name: &str| Project {
      id: ProjectId::Number(id),
      name: name.to_string(),
    };
    match page {
      0 => ProjectPage {
        projects: vec![project(1, "A")],
        has_more: true,
      },
      1 => ProjectPage {
        projects: vec![project(2, "B"), project(3, "C")],
        has_more: true,
      },
      _ => ProjectPage {
        projects: Vec::new(),
        has_more: false,
      },
    }
  }

  /// Query client over canned pages. Pages in `slow` take an hour, pages in
  /// `failing` fail with "Network Error". Returns the log of requested pages.
  fn fake_client(
    slow: &'static [u32],
    failing: &'static [u32],
  ) -> (QueryClient<u32, ProjectPage>, Arc<Mutex<Vec<u32>>>) {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let log = calls.clone();
    let client = QueryClient::new(move |page: u32| {
      log.lock().unwrap().push(page);
      async move {
        if slow.contains(&page) {
          tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        if failing.contains(&page) {
          return Err("Network Error".to_string());
        }
        Ok(fixture(page))
      }
    });
    (client, calls)
  }

  fn view_with(client: QueryClient<u32, ProjectPage>) -> ProjectsView {
    ProjectsView::new(client, &QueryConfig::default(), false)
  }

  fn calls_for(calls: &Arc<Mutex<Vec<u32>>>, page: u32) -> usize {
    calls.lock().unwrap().iter().filter(|p| **p == page).count()
  }

  /// Let spawned fetches finish, then apply them like the event loop does
  async fn settle(view: &mut ProjectsView) {
    tokio::time::sleep(Duration::from_millis(10)).await;
    view.tick();
  }

  fn render(view: &mut ProjectsView) -> Vec<String> {
    let mut terminal = Terminal::new(TestBackend::new(60, 10)).unwrap();
    terminal
      .draw(|frame| {
        let area = frame.area();
        view.render(frame, area)
      })
      .unwrap();
    buffer_lines(terminal.backend().buffer())
  }

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn contains(lines: &[String], needle: &str) -> bool {
    lines.iter().any(|l| l.contains(needle))
  }

  #[tokio::test(start_paused = true)]
  async fn test_initial_load() {
    let (client, _calls) = fake_client(&[], &[]);
    let mut view = view_with(client);

    assert!(view.state().is_loading());
    assert!(contains(&render(&mut view), "Loading..."));

    settle(&mut view).await;

    let state = view.state();
    assert_eq!(state.data().map(|p| p.projects.len()), Some(1));
    assert!(view.can_go_next());
    assert!(!view.can_go_previous());

    let lines = render(&mut view);
    assert!(contains(&lines, "Page 1"));
    assert!(contains(&lines, "1  A"));
    assert!(!contains(&lines, "Loading..."));
  }

  #[tokio::test(start_paused = true)]
  async fn test_prefetches_next_page_without_navigating() {
    let (client, calls) = fake_client(&[], &[]);
    let mut view = view_with(client);
    settle(&mut view).await;

    assert_eq!(calls_for(&calls, 1), 1);
    assert_eq!(view.page(), 0);
    assert_eq!(
      view.state().data().map(|p| p.projects[0].name.as_str()),
      Some("A")
    );

    settle(&mut view).await;
    assert!(view.client().data(&1).is_some());
    assert_eq!(view.page(), 0);
  }

  #[tokio::test(start_paused = true)]
  async fn test_previous_page_floor() {
    let (client, _calls) = fake_client(&[], &[]);
    let mut view = view_with(client);
    settle(&mut view).await;

    view.go_to_previous_page();
    assert_eq!(view.page(), 0);
    view.handle_key(key(KeyCode::Left));
    assert_eq!(view.page(), 0);
  }

  #[tokio::test(start_paused = true)]
  async fn test_next_before_page_resolves_keeps_previous_data() {
    let (client, calls) = fake_client(&[1], &[]);
    let mut view = view_with(client);
    settle(&mut view).await;

    // Prefetch of page 1 is in flight; navigating must not issue a second request
    view.handle_key(key(KeyCode::Right));
    assert_eq!(view.page(), 1);
    assert_eq!(calls_for(&calls, 1), 1);

    let state = view.state();
    assert!(state.is_previous_data());
    assert!(state.is_fetching());
    assert_eq!(
      state.data().map(|p| p.projects[0].name.as_str()),
      Some("A")
    );
    assert!(!view.can_go_next());

    let lines = render(&mut view);
    assert!(contains(&lines, "Page 2"));
    assert!(contains(&lines, "1  A"));
    assert!(contains(&lines, "Loading..."));
    assert!(contains(&lines, "previous page"));
  }

  #[tokio::test(start_paused = true)]
  async fn test_last_page_disables_next() {
    let (client, _calls) = fake_client(&[], &[]);
    let mut view = view_with(client);
    settle(&mut view).await;
    settle(&mut view).await;

    view.go_to_next_page();
    assert_eq!(view.page(), 1);
    settle(&mut view).await;

    view.go_to_next_page();
    assert_eq!(view.page(), 2);
    settle(&mut view).await;

    let state = view.state();
    assert_eq!(state.data().map(|p| p.projects.is_empty()), Some(true));
    assert!(!view.can_go_next());

    view.go_to_next_page();
    assert_eq!(view.page(), 2);
    assert!(contains(&render(&mut view), "No projects on this page."));
  }

  #[tokio::test(start_paused = true)]
  async fn test_network_failure_shows_error() {
    let (client, _calls) = fake_client(&[], &[0]);
    let mut view = view_with(client);
    settle(&mut view).await;

    assert_eq!(view.state().error(), Some("Network Error"));
    assert!(!view.can_go_next());

    let lines = render(&mut view);
    assert!(contains(&lines, "Error: Network Error"));
    assert!(!contains(&lines, "Loading..."));
  }

  #[tokio::test(start_paused = true)]
  async fn test_revisit_within_stale_time_uses_cache() {
    let (client, calls) = fake_client(&[], &[]);
    let mut view = view_with(client);
    settle(&mut view).await;
    settle(&mut view).await;

    view.go_to_next_page();
    settle(&mut view).await;
    view.go_to_previous_page();

    assert_eq!(calls_for(&calls, 0), 1);
    assert_eq!(calls_for(&calls, 1), 1);
    assert!(!view.state().is_fetching());
  }

  #[tokio::test(start_paused = true)]
  async fn test_revisit_after_stale_time_revalidates() {
    let (client, calls) = fake_client(&[], &[]);
    let mut view = view_with(client);
    settle(&mut view).await;
    settle(&mut view).await;

    view.go_to_next_page();
    settle(&mut view).await;
    tokio::time::advance(Duration::from_secs(6)).await;
    view.go_to_previous_page();

    // Cached page stays on screen while it is refreshed
    let state = view.state();
    assert!(state.is_fetching());
    assert!(!state.is_previous_data());
    assert_eq!(calls_for(&calls, 0), 2);

    settle(&mut view).await;
    assert!(!view.state().is_fetching());
  }

  #[tokio::test(start_paused = true)]
  async fn test_prefetch_failure_is_silent() {
    let (client, calls) = fake_client(&[], &[1]);
    let mut view = view_with(client);
    settle(&mut view).await;
    settle(&mut view).await;

    assert_eq!(calls_for(&calls, 1), 1);
    assert!(view.state().is_success());
    assert!(!contains(&render(&mut view), "Error"));

    // Navigating retries the failed page on demand
    view.go_to_next_page();
    assert_eq!(calls_for(&calls, 1), 2);
    settle(&mut view).await;
    assert_eq!(view.state().error(), Some("Network Error"));
  }

  #[tokio::test(start_paused = true)]
  async fn test_refetch_key() {
    let (client, calls) = fake_client(&[], &[]);
    let mut view = view_with(client);
    settle(&mut view).await;

    view.handle_key(key(KeyCode::Char('r')));
    assert_eq!(calls_for(&calls, 0), 2);
    assert!(view.state().is_fetching());
  }

  #[tokio::test(start_paused = true)]
  async fn test_focus_refetches_only_stale_page() {
    let (client, calls) = fake_client(&[], &[]);
    let mut view = view_with(client);
    settle(&mut view).await;

    view.focus_gained();
    assert_eq!(calls_for(&calls, 0), 1);

    tokio::time::advance(Duration::from_secs(6)).await;
    view.focus_gained();
    assert_eq!(calls_for(&calls, 0), 2);
  }

  #[tokio::test(start_paused = true)]
  async fn test_focus_refetch_can_be_disabled() {
    let (client, calls) = fake_client(&[], &[]);
    let options = QueryConfig {
      refetch_on_focus: false,
      ..QueryConfig::default()
    };
    let mut view = ProjectsView::new(client, &options, false);
    settle(&mut view).await;

    tokio::time::advance(Duration::from_secs(6)).await;
    view.focus_gained();
    assert_eq!(calls_for(&calls, 0), 1);
  }

  #[tokio::test(start_paused = true)]
  async fn test_devtools_toggle() {
    let (client, _calls) = fake_client(&[], &[]);
    let mut view = view_with(client);
    settle(&mut view).await;

    assert!(!contains(&render(&mut view), "Cache"));
    view.handle_key(key(KeyCode::Char('d')));

    let lines = render(&mut view);
    assert!(contains(&lines, "Cache (2)"));
    assert!(contains(&lines, "fresh"));
  }

  #[tokio::test(start_paused = true)]
  async fn test_quit_key() {
    let (client, _calls) = fake_client(&[], &[]);
    let mut view = view_with(client);
    assert_eq!(view.handle_key(key(KeyCode::Char('q'))), ViewAction::Quit);
    assert_eq!(view.handle_key(key(KeyCode::Char('x'))), ViewAction::None);
  }
}
