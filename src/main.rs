mod api;
mod app;
mod config;
mod event;
mod logging;
mod query;
mod ui;

use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "projpage")]
#[command(about = "Page through projects with a cached, prefetching query layer")]
#[command(version)]
struct Args {
  /// Path to config file (default: ./projpage.yaml or $XDG_CONFIG_HOME/projpage/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Server base URL, e.g. http://localhost:3000
  #[arg(short, long)]
  url: Option<String>,

  /// How long a fetched page is served from cache, in milliseconds
  #[arg(long)]
  stale_time_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration
  let mut config = config::Config::load(args.config.as_deref())?;

  // Command line wins over file and environment
  if let Some(url) = args.url {
    config.api.base_url = url;
  }
  if let Some(stale_time_ms) = args.stale_time_ms {
    config.query.stale_time_ms = stale_time_ms;
  }

  // Logging goes to a file; a failure here should not stop the UI
  let _log_guard = match logging::init() {
    Ok(guard) => Some(guard),
    Err(e) => {
      eprintln!("Warning: {}", e);
      None
    }
  };

  // Initialize and run the app
  let mut app = app::App::new(&config)?;
  app.run().await?;

  Ok(())
}
