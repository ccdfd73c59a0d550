use serde::{Deserialize, Serialize};
use std::fmt;

/// Project identifier. The endpoint may send numbers or strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProjectId {
  Number(u64),
  Text(String),
}

impl fmt::Display for ProjectId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ProjectId::Number(n) => write!(f, "{}", n),
      ProjectId::Text(s) => f.write_str(s),
    }
  }
}

/// A single entry in a page of results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
  pub id: ProjectId,
  pub name: String,
}

/// One page of projects as returned by `GET /api/projects?page=<n>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectPage {
  pub projects: Vec<Project>,
  #[serde(rename = "hasMore")]
  pub has_more: bool,
}
