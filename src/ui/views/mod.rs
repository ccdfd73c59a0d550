mod projects;

pub use projects::ProjectsView;
