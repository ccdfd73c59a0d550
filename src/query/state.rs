/// What an observer should render for its current key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryState<T> {
  /// No data to show yet
  Loading,
  /// The last fetch for this key failed
  Error(String),
  /// Data is available. `is_previous_data` means it belongs to the key the
  /// observer was on before, while the current key is still loading.
  Success {
    data: T,
    is_fetching: bool,
    is_previous_data: bool,
  },
}

#[allow(dead_code)]
impl<T> QueryState<T> {
  pub fn is_loading(&self) -> bool {
    matches!(self, QueryState::Loading)
  }

  pub fn is_success(&self) -> bool {
    matches!(self, QueryState::Success { .. })
  }

  pub fn is_error(&self) -> bool {
    matches!(self, QueryState::Error(_))
  }

  pub fn data(&self) -> Option<&T> {
    match self {
      QueryState::Success { data, .. } => Some(data),
      _ => None,
    }
  }

  pub fn error(&self) -> Option<&str> {
    match self {
      QueryState::Error(e) => Some(e),
      _ => None,
    }
  }

  /// Whether a request for the observed key is outstanding
  pub fn is_fetching(&self) -> bool {
    match self {
      QueryState::Loading => true,
      QueryState::Error(_) => false,
      QueryState::Success { is_fetching, .. } => *is_fetching,
    }
  }

  pub fn is_previous_data(&self) -> bool {
    matches!(
      self,
      QueryState::Success {
        is_previous_data: true,
        ..
      }
    )
  }
}

/// Cache bookkeeping for a single entry, as shown in the devtools panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
  /// Created but never settled and not fetching
  Idle,
  Fetching,
  Fresh,
  Stale,
  Error,
}

impl EntryStatus {
  pub fn label(&self) -> &'static str {
    match self {
      EntryStatus::Idle => "idle",
      EntryStatus::Fetching => "fetching",
      EntryStatus::Fresh => "fresh",
      EntryStatus::Stale => "stale",
      EntryStatus::Error => "error",
    }
  }
}
