use super::state::EntryStatus;
use chrono::{DateTime, Local};
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use tokio::sync::mpsc;
use tokio::time::{Duration, Instant};
use tracing::{debug, warn};

/// How long a successful result counts as fresh unless configured otherwise
pub const DEFAULT_STALE_TIME: Duration = Duration::from_secs(5);

/// A factory function that creates the fetch future for a key
type FetcherFn<K, T> = Box<dyn Fn(K) -> BoxFuture<'static, Result<T, String>> + Send + Sync>;

/// Why a fetch was started. Only affects logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchKind {
  Fetch,
  Prefetch,
  Refetch,
}

/// A finished fetch travelling back to the owning task
struct Completion<K, T> {
  key: K,
  kind: FetchKind,
  result: Result<T, String>,
}

/// Cached state for one key
#[derive(Debug, Clone)]
pub struct QueryEntry<T> {
  data: Option<T>,
  error: Option<String>,
  data_updated_at: Option<Instant>,
  updated_at_wall: Option<DateTime<Local>>,
  is_fetching: bool,
  fetch_count: u32,
}

impl<T> QueryEntry<T> {
  fn new() -> Self {
    Self {
      data: None,
      error: None,
      data_updated_at: None,
      updated_at_wall: None,
      is_fetching: false,
      fetch_count: 0,
    }
  }

  pub fn data(&self) -> Option<&T> {
    self.data.as_ref()
  }

  /// Message of the most recent failed fetch, cleared by the next success
  pub fn error(&self) -> Option<&str> {
    self.error.as_deref()
  }

  pub fn is_fetching(&self) -> bool {
    self.is_fetching
  }

  /// Missing data is always stale.
  fn is_stale(&self, stale_time: Duration) -> bool {
    match self.data_updated_at {
      Some(at) => at.elapsed() >= stale_time,
      None => true,
    }
  }

  fn status(&self, stale_time: Duration) -> EntryStatus {
    if self.is_fetching {
      EntryStatus::Fetching
    } else if self.error.is_some() {
      EntryStatus::Error
    } else if self.data.is_none() {
      EntryStatus::Idle
    } else if self.is_stale(stale_time) {
      EntryStatus::Stale
    } else {
      EntryStatus::Fresh
    }
  }
}

/// Borrowed view of one cache entry
#[derive(Debug)]
pub struct EntrySnapshot<'a, K, T> {
  pub key: &'a K,
  pub data: Option<&'a T>,
  pub status: EntryStatus,
  pub updated_at: Option<DateTime<Local>>,
  pub fetch_count: u32,
}

/// Keyed cache with request deduplication and stale-time freshness.
///
/// The client is owned by a single task (the UI loop). Fetches run on spawned
/// tokio tasks and report back through a channel that `poll()` drains, so all
/// cache mutation happens on the owning task. At most one request per key is
/// in flight; fetches are never cancelled, and a result for a key nobody is
/// looking at any more still lands in the cache.
pub struct QueryClient<K, T> {
  entries: HashMap<K, QueryEntry<T>>,
  fetcher: FetcherFn<K, T>,
  stale_time: Duration,
  tx: mpsc::UnboundedSender<Completion<K, T>>,
  rx: mpsc::UnboundedReceiver<Completion<K, T>>,
}

impl<K, T> QueryClient<K, T>
where
  K: Clone + Eq + Hash + Debug + Send + 'static,
  T: Send + 'static,
{
  /// Create a client that fetches keys with the given function.
  pub fn new<F, Fut>(fetcher: F) -> Self
  where
    F: Fn(K) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, String>> + Send + 'static,
  {
    let (tx, rx) = mpsc::unbounded_channel();
    Self {
      entries: HashMap::new(),
      fetcher: Box::new(move |key| -> BoxFuture<'static, Result<T, String>> {
        Box::pin(fetcher(key))
      }),
      stale_time: DEFAULT_STALE_TIME,
      tx,
      rx,
    }
  }

  /// Set how long a successful result stays fresh.
  pub fn with_stale_time(mut self, stale_time: Duration) -> Self {
    self.stale_time = stale_time;
    self
  }

  pub fn entry(&self, key: &K) -> Option<&QueryEntry<T>> {
    self.entries.get(key)
  }

  pub fn data(&self, key: &K) -> Option<&T> {
    self.entries.get(key).and_then(|e| e.data())
  }

  pub fn is_fetching(&self, key: &K) -> bool {
    self.entries.get(key).is_some_and(|e| e.is_fetching)
  }

  /// Whether `key` would be fetched again by `fetch_query`.
  pub fn is_stale(&self, key: &K) -> bool {
    self
      .entries
      .get(key)
      .map(|e| e.is_stale(self.stale_time))
      .unwrap_or(true)
  }

  /// Fetch `key` unless it is fresh or already in flight.
  ///
  /// Returns `true` if a network request was started.
  pub fn fetch_query(&mut self, key: K) -> bool {
    self.fetch_if_needed(key, FetchKind::Fetch)
  }

  /// Warm the cache for `key` in the background.
  ///
  /// Same freshness and deduplication rules as `fetch_query`. A failure is
  /// recorded on the entry but only logged at debug level.
  pub fn prefetch_query(&mut self, key: K) -> bool {
    self.fetch_if_needed(key, FetchKind::Prefetch)
  }

  /// Fetch `key` even if it is fresh. Still a no-op while a request is in flight.
  pub fn refetch(&mut self, key: K) -> bool {
    if self.is_fetching(&key) {
      debug!(?key, "refetch skipped, request already in flight");
      return false;
    }
    self.start_fetch(key, FetchKind::Refetch);
    true
  }

  /// Apply finished fetches to the cache.
  ///
  /// Returns the keys that settled, in completion order. Call this from the
  /// owning task's tick handler.
  pub fn poll(&mut self) -> Vec<K> {
    let mut settled = Vec::new();

    while let Ok(completion) = self.rx.try_recv() {
      let Completion { key, kind, result } = completion;
      let entry = self.entries.entry(key.clone()).or_insert_with(QueryEntry::new);
      entry.is_fetching = false;

      match result {
        Ok(data) => {
          debug!(?key, ?kind, "query settled");
          entry.data = Some(data);
          entry.error = None;
          entry.data_updated_at = Some(Instant::now());
          entry.updated_at_wall = Some(Local::now());
        }
        Err(error) => {
          if kind == FetchKind::Prefetch {
            debug!(?key, %error, "prefetch failed");
          } else {
            warn!(?key, %error, "query failed");
          }
          entry.error = Some(error);
        }
      }

      settled.push(key);
    }

    settled
  }

  /// All entries ordered by key.
  pub fn snapshot(&self) -> Vec<EntrySnapshot<'_, K, T>>
  where
    K: Ord,
  {
    let mut entries: Vec<_> = self
      .entries
      .iter()
      .map(|(key, entry)| EntrySnapshot {
        key,
        data: entry.data(),
        status: entry.status(self.stale_time),
        updated_at: entry.updated_at_wall,
        fetch_count: entry.fetch_count,
      })
      .collect();
    entries.sort_by(|a, b| a.key.cmp(b.key));
    entries
  }

  fn fetch_if_needed(&mut self, key: K, kind: FetchKind) -> bool {
    if let Some(entry) = self.entries.get(&key) {
      if entry.is_fetching {
        debug!(?key, ?kind, "request already in flight");
        return false;
      }
      if !entry.is_stale(self.stale_time) {
        debug!(?key, ?kind, "cache hit");
        return false;
      }
    }

    self.start_fetch(key, kind);
    true
  }

  fn start_fetch(&mut self, key: K, kind: FetchKind) {
    debug!(?key, ?kind, "starting fetch");
    let entry = self.entries.entry(key.clone()).or_insert_with(QueryEntry::new);
    entry.is_fetching = true;
    entry.fetch_count += 1;

    let future = (self.fetcher)(key.clone());
    let tx = self.tx.clone();
    tokio::spawn(async move {
      let result = future.await;
      // The receiver lives as long as the client
      let _ = tx.send(Completion { key, kind, result });
    });
  }
}

impl<K: Debug, T: Debug> Debug for QueryClient<K, T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("QueryClient")
      .field("entries", &self.entries)
      .field("stale_time", &self.stale_time)
      .finish_non_exhaustive()
  }
}
