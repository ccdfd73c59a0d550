pub mod client;
pub mod error;
pub mod types;

pub use client::ProjectsClient;
pub use error::ApiError;
pub use types::ProjectPage;
