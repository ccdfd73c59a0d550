use crate::api::ProjectsClient;
use crate::config::Config;
use crate::event::{Event, EventHandler};
use crate::query::QueryClient;
use crate::ui;
use crate::ui::view::{View, ViewAction};
use crate::ui::views::ProjectsView;
use color_eyre::{eyre::eyre, Result};
use crossterm::event::{DisableFocusChange, EnableFocusChange, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::{stdout, Stdout};
use std::time::Duration;
use tracing::info;

/// Main application state
pub struct App {
  /// The single screen of the application
  view: Box<dyn View>,

  /// Server origin shown in the header
  origin: String,

  tick_rate: Duration,

  /// Whether to quit
  should_quit: bool,
}

impl App {
  /// Build the HTTP client, query cache and view.
  ///
  /// Must run inside a tokio runtime: the first page starts loading here.
  pub fn new(config: &Config) -> Result<Self> {
    let api = ProjectsClient::new(&config.api)
      .map_err(|e| eyre!("Failed to create API client for {}: {}", config.api.base_url, e))?;
    let origin = api.origin();

    let client = QueryClient::new(move |page: u32| {
      let api = api.clone();
      async move { api.fetch_page(page).await.map_err(|e| e.to_string()) }
    })
    .with_stale_time(config.query.stale_time());

    info!(%origin, stale_time_ms = config.query.stale_time_ms, "starting");

    let view = ProjectsView::new(client, &config.query, config.ui.devtools_open);

    Ok(Self::with_view(
      Box::new(view),
      origin,
      config.ui.tick_rate(),
    ))
  }

  fn with_view(view: Box<dyn View>, origin: String, tick_rate: Duration) -> Self {
    Self {
      view,
      origin,
      tick_rate,
      should_quit: false,
    }
  }

  pub async fn run(&mut self) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    stdout().execute(EnableFocusChange)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = self.event_loop(&mut terminal).await;

    // Cleanup terminal, even if the loop failed
    stdout().execute(DisableFocusChange)?;
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
  }

  async fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    let mut events = EventHandler::new(self.tick_rate);

    while !self.should_quit {
      // Draw UI
      terminal.draw(|frame| ui::draw(frame, self))?;

      // Handle events
      match events.next().await {
        Some(event) => self.handle_event(event),
        None => break,
      }
    }

    Ok(())
  }

  fn handle_event(&mut self, event: Event) {
    match event {
      Event::Key(key) => self.handle_key(key),
      Event::FocusGained => self.view.focus_gained(),
      Event::Tick => {}
    }
    // Apply finished fetches after every event so input feels immediate
    self.view.tick();
  }

  fn handle_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    if self.view.handle_key(key) == ViewAction::Quit {
      self.should_quit = true;
    }
  }

  // Accessors for UI rendering
  pub fn view(&self) -> &dyn View {
    &*self.view
  }

  pub fn view_mut(&mut self) -> &mut dyn View {
    &mut *self.view
  }

  pub fn origin(&self) -> &str {
    &self.origin
  }
}
