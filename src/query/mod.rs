//! Keyed query cache for async data fetching.
//!
//! Inspired by TanStack Query. A [`QueryClient`] owns one cache entry per key,
//! deduplicates in-flight requests and decides freshness from a stale time.
//! A [`QueryObserver`] follows one key at a time and turns the cache into a
//! [`QueryState`] for rendering, optionally keeping the previous key's data
//! on screen while the next key loads.
//!
//! # Example
//!
//! ```ignore
//! let mut client = QueryClient::new(move |page: u32| {
//!     let api = api.clone();
//!     async move { api.fetch_page(page).await.map_err(|e| e.to_string()) }
//! })
//! .with_stale_time(Duration::from_secs(5));
//!
//! let mut observer = QueryObserver::new(0, true);
//! observer.mount(&mut client);
//!
//! // In event loop tick
//! for key in client.poll() {
//!     // key settled, re-render
//! }
//!
//! // In render
//! match observer.result(&client) {
//!     QueryState::Loading => render_spinner(),
//!     QueryState::Error(e) => render_error(e),
//!     QueryState::Success { data, is_fetching, .. } => render_data(data, is_fetching),
//! }
//! ```

mod client;
mod observer;
mod state;

pub use client::{EntrySnapshot, QueryClient, QueryEntry, DEFAULT_STALE_TIME};
pub use observer::QueryObserver;
pub use state::{EntryStatus, QueryState};
