use super::client::QueryClient;
use super::state::QueryState;
use std::fmt::Debug;
use std::hash::Hash;

/// Follows one key of a [`QueryClient`] at a time.
///
/// With `keep_previous_data`, switching to a key that has no data yet keeps
/// reporting the last key that did, flagged as previous data, instead of
/// falling back to `Loading`.
#[derive(Debug, Clone)]
pub struct QueryObserver<K> {
  key: K,
  previous_key: Option<K>,
  keep_previous_data: bool,
}

impl<K> QueryObserver<K>
where
  K: Clone + Eq + Hash + Debug + Send + 'static,
{
  pub fn new(key: K, keep_previous_data: bool) -> Self {
    Self {
      key,
      previous_key: None,
      keep_previous_data,
    }
  }

  /// Start fetching the current key if it needs it.
  pub fn mount<T: Send + 'static>(&self, client: &mut QueryClient<K, T>) -> bool {
    client.fetch_query(self.key.clone())
  }

  /// Switch to `key` and fetch it if it is missing or stale.
  ///
  /// Returns `true` if a network request was started.
  pub fn set_key<T: Send + 'static>(&mut self, key: K, client: &mut QueryClient<K, T>) -> bool {
    if key != self.key {
      if client.data(&self.key).is_some() {
        self.previous_key = Some(self.key.clone());
      }
      self.key = key;
    }
    self.mount(client)
  }

  /// Current state for the observed key.
  pub fn result<'a, T: Send + 'static>(&self, client: &'a QueryClient<K, T>) -> QueryState<&'a T> {
    let entry = client.entry(&self.key);
    let is_fetching = entry.is_some_and(|e| e.is_fetching());

    if let Some(entry) = entry {
      if let (Some(error), false) = (entry.error(), is_fetching) {
        return QueryState::Error(error.to_string());
      }
      if let Some(data) = entry.data() {
        return QueryState::Success {
          data,
          is_fetching,
          is_previous_data: false,
        };
      }
    }

    if self.keep_previous_data {
      if let Some(data) = self.previous_key.as_ref().and_then(|k| client.data(k)) {
        return QueryState::Success {
          data,
          is_fetching,
          is_previous_data: true,
        };
      }
    }

    QueryState::Loading
  }
}
